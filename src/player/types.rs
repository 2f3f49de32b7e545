//! Engine-facing small types and handles: commands, playback state and the
//! shared observable snapshot.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::track::Track;

/// The playback state machine.
///
/// `Idle -> Loading -> Ready -> {Playing <-> Paused} -> Stopped`, with
/// `Error` reachable from `Loading` and from decode failures.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Stopped,
    Error(String),
}

#[derive(Debug)]
pub enum PlayerCmd {
    /// Load a file and start playing it; supersedes the current track.
    Load(PathBuf),
    /// Start or resume playback. No-op while already playing.
    Play,
    /// Pause playback; the position freezes at the last sampled value.
    Pause,
    /// Stop playback and reset the position to zero.
    Stop,
    /// Pause while playing, play otherwise.
    TogglePlayPause,
    /// Seek to an absolute position in seconds, clamped to the track.
    Seek(f64),
    /// Seek relative to the current position, in seconds.
    SeekBy(f64),
    /// Set the gain in `[0, 1]`; zero engages mute.
    SetVolume(f32),
    /// Swap between silence and the remembered volume.
    ToggleMute,
    /// Persist state and shut the engine thread down.
    Quit,
}

/// Snapshot of observable engine state shared with the runtime and MPRIS.
#[derive(Clone, Debug)]
pub struct PlayerInfo {
    pub state: PlaybackState,
    /// The current track, including analysis fields once they are merged.
    pub track: Option<Track>,
    pub position: Duration,
    pub volume: f32,
    pub muted: bool,
}

impl Default for PlayerInfo {
    fn default() -> Self {
        Self {
            state: PlaybackState::Idle,
            track: None,
            position: Duration::ZERO,
            volume: 1.0,
            muted: false,
        }
    }
}

pub type InfoHandle = Arc<Mutex<PlayerInfo>>;
