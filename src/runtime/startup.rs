use std::path::PathBuf;

use crate::config::{PlayerState, Settings};
use crate::player::{Player, PlayerCmd, VolumeState};

/// Construct the engine with the persisted volume state injected.
pub fn build_player(saved: &PlayerState, state_path: Option<PathBuf>) -> Player {
    let volume = VolumeState::new(saved.volume, saved.muted, saved.last_volume);
    Player::new(volume, state_path)
}

/// Queue the initial load: an explicit path argument, or the persisted last
/// track when resume is enabled. Loading implies playback, so a session that
/// was paused gets paused again right after the restored seek.
pub fn initial_load(player: &Player, arg: Option<PathBuf>, saved: &PlayerState, settings: &Settings) {
    if let Some(path) = arg {
        let _ = player.send(PlayerCmd::Load(path));
        return;
    }

    if !settings.playback.resume_last_track {
        return;
    }
    if let Some(path) = &saved.last_track {
        let _ = player.send(PlayerCmd::Load(path.clone()));
        if saved.position_secs > 0.0 {
            let _ = player.send(PlayerCmd::Seek(saved.position_secs));
        }
        if !saved.was_playing {
            let _ = player.send(PlayerCmd::Pause);
        }
    }
}
