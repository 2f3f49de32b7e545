//! The engine thread: single owner of the output stream, the sink, the
//! current track and every state transition.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::analysis::{AnalysisResult, spawn_analysis};
use crate::config::PlayerState;
use crate::track::{self, Track, TrackId};

use super::sink::create_sink_at;
use super::types::{InfoHandle, PlaybackState, PlayerCmd};
use super::volume::VolumeState;

/// Receive timeout while playing: doubles as the position-clock cadence.
const PLAYING_TICK: Duration = Duration::from_millis(10);
/// Receive timeout in every other state; no position sampling happens here.
const IDLE_TICK: Duration = Duration::from_millis(200);

pub(super) fn spawn_engine_thread(
    rx: Receiver<PlayerCmd>,
    info: InfoHandle,
    volume: VolumeState,
    state_path: Option<PathBuf>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                warn!("no audio output device: {e}");
                if let Ok(mut info) = info.lock() {
                    info.state = PlaybackState::Error(format!("no audio output device: {e}"));
                }
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for a terminal app.
        stream.log_on_drop(false);

        Engine::new(stream, rx, info, volume, state_path).run();
    })
}

struct Engine {
    stream: OutputStream,
    rx: Receiver<PlayerCmd>,
    info: InfoHandle,

    state: PlaybackState,
    current: Option<Track>,
    next_id: TrackId,
    sink: Option<Sink>,
    /// Position the current sink was built at; `Sink::get_pos()` counts from
    /// there, so the published position is `seek_base + get_pos()`.
    seek_base: Duration,
    volume: VolumeState,

    analysis_tx: Sender<AnalysisResult>,
    analysis_rx: Receiver<AnalysisResult>,
    /// Cancellation flag held by the in-flight analysis worker, if any.
    analysis_cancel: Option<Arc<AtomicBool>>,

    state_path: Option<PathBuf>,
}

impl Engine {
    fn new(
        stream: OutputStream,
        rx: Receiver<PlayerCmd>,
        info: InfoHandle,
        volume: VolumeState,
        state_path: Option<PathBuf>,
    ) -> Self {
        let (analysis_tx, analysis_rx) = mpsc::channel();
        Self {
            stream,
            rx,
            info,
            state: PlaybackState::Idle,
            current: None,
            next_id: TrackId::first(),
            sink: None,
            seek_base: Duration::ZERO,
            volume,
            analysis_tx,
            analysis_rx,
            analysis_cancel: None,
            state_path,
        }
    }

    fn run(&mut self) {
        loop {
            let timeout = if self.state == PlaybackState::Playing {
                PLAYING_TICK
            } else {
                IDLE_TICK
            };

            match self.rx.recv_timeout(timeout) {
                Ok(cmd) => {
                    if !self.handle(cmd) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            self.drain_analysis();
            self.tick();
        }

        self.cancel_analysis();
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    /// Apply one command; returns false when the engine should shut down.
    fn handle(&mut self, cmd: PlayerCmd) -> bool {
        match cmd {
            PlayerCmd::Load(path) => self.load(path),
            PlayerCmd::Play => self.play(),
            PlayerCmd::Pause => self.pause(),
            PlayerCmd::Stop => self.stop(),
            PlayerCmd::TogglePlayPause => {
                if self.state == PlaybackState::Playing {
                    self.pause();
                } else {
                    self.play();
                }
            }
            PlayerCmd::Seek(secs) => self.seek(secs),
            PlayerCmd::SeekBy(delta) => {
                let target = self.position().as_secs_f64() + delta;
                self.seek(target);
            }
            PlayerCmd::SetVolume(v) => {
                self.volume.set_volume(v);
                self.apply_volume();
            }
            PlayerCmd::ToggleMute => {
                self.volume.toggle_mute();
                self.apply_volume();
            }
            PlayerCmd::Quit => {
                self.persist();
                return false;
            }
        }
        true
    }

    fn load(&mut self, path: PathBuf) {
        info!("loading {}", path.display());
        self.set_state(PlaybackState::Loading);

        let id = self.next_id;
        let track = match track::load(&path, id) {
            Ok(t) => t,
            Err(e) => {
                warn!("load failed: {e}");
                self.teardown();
                self.current = None;
                self.set_state(PlaybackState::Error(e.to_string()));
                self.persist();
                return;
            }
        };
        self.next_id = id.next();

        // Release everything tied to the previous track before acquiring
        // resources for the new one.
        self.teardown();

        match create_sink_at(&self.stream, &track.path, Duration::ZERO) {
            Ok(sink) => {
                sink.set_volume(self.volume.volume());
                self.sink = Some(sink);
                self.current = Some(track);
                self.set_state(PlaybackState::Ready);
                // A fresh load starts playing right away.
                self.play();
                self.start_analysis();
            }
            Err(e) => {
                warn!("failed to prepare playback: {e}");
                self.current = None;
                self.set_state(PlaybackState::Error(e.to_string()));
            }
        }
        self.persist();
    }

    fn play(&mut self) {
        match self.state {
            PlaybackState::Playing => return,
            PlaybackState::Ready | PlaybackState::Paused => {
                if let Some(s) = &self.sink {
                    s.play();
                    self.set_state(PlaybackState::Playing);
                }
            }
            PlaybackState::Stopped => {
                // Stop dropped the sink; restart from the top.
                let Some(path) = self.current.as_ref().map(|t| t.path.clone()) else {
                    return;
                };
                match create_sink_at(&self.stream, &path, Duration::ZERO) {
                    Ok(sink) => {
                        sink.set_volume(self.volume.volume());
                        sink.play();
                        self.sink = Some(sink);
                        self.seek_base = Duration::ZERO;
                        self.set_state(PlaybackState::Playing);
                    }
                    Err(e) => {
                        warn!("failed to restart playback: {e}");
                        self.teardown();
                        self.current = None;
                        self.set_state(PlaybackState::Error(e.to_string()));
                    }
                }
            }
            PlaybackState::Idle | PlaybackState::Loading | PlaybackState::Error(_) => return,
        }
        self.persist();
    }

    fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if let Some(s) = &self.sink {
            s.pause();
        }
        self.set_state(PlaybackState::Paused);
        self.persist();
    }

    fn stop(&mut self) {
        if self.current.is_none() {
            return;
        }
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.seek_base = Duration::ZERO;
        self.set_state(PlaybackState::Stopped);
        self.persist();
    }

    /// Seek to `secs`, clamped to the track. Seeking implies intent to
    /// listen, so playback starts even from Paused/Stopped.
    fn seek(&mut self, secs: f64) {
        let Some((path, duration)) = self
            .current
            .as_ref()
            .map(|t| (t.path.clone(), t.duration))
        else {
            return;
        };
        let target = clamp_position(secs, duration);

        if let Some(s) = self.sink.take() {
            s.stop();
        }
        match create_sink_at(&self.stream, &path, target) {
            Ok(sink) => {
                sink.set_volume(self.volume.volume());
                sink.play();
                self.sink = Some(sink);
                self.seek_base = target;
                self.set_state(PlaybackState::Playing);
            }
            Err(e) => {
                warn!("seek failed: {e}");
                self.teardown();
                self.current = None;
                self.set_state(PlaybackState::Error(e.to_string()));
            }
        }
        self.persist();
    }

    /// Periodic work while playing: sample the position and catch the end
    /// of the stream. Suspended in every other state.
    fn tick(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }

        let drained = self.sink.as_ref().map(|s| s.empty()).unwrap_or(true);
        if drained {
            debug!("end of stream");
            if let Some(s) = self.sink.take() {
                s.stop();
            }
            self.seek_base = Duration::ZERO;
            self.set_state(PlaybackState::Stopped);
            self.persist();
            return;
        }

        self.publish_position();
    }

    fn drain_analysis(&mut self) {
        while let Ok(result) = self.analysis_rx.try_recv() {
            if merge_analysis(&mut self.current, result) {
                self.publish();
            }
        }
    }

    fn start_analysis(&mut self) {
        let Some(track) = &self.current else { return };
        let cancel = Arc::new(AtomicBool::new(false));
        self.analysis_cancel = Some(cancel.clone());
        // Fire and forget; the result comes back through analysis_rx.
        let _ = spawn_analysis(track.path.clone(), track.id, cancel, self.analysis_tx.clone());
    }

    fn cancel_analysis(&mut self) {
        if let Some(flag) = self.analysis_cancel.take() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Cancel the in-flight analysis and release the output sink. The order
    /// matters: nothing belonging to the old track may outlive this call.
    fn teardown(&mut self) {
        self.cancel_analysis();
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.seek_base = Duration::ZERO;
    }

    fn apply_volume(&mut self) {
        if let Some(s) = &self.sink {
            s.set_volume(self.volume.volume());
        }
        self.publish();
        self.persist();
    }

    fn position(&self) -> Duration {
        match &self.sink {
            Some(s) => self.seek_base + s.get_pos(),
            None => Duration::ZERO,
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        self.state = state;
        self.publish();
    }

    fn publish(&self) {
        if let Ok(mut info) = self.info.lock() {
            info.state = self.state.clone();
            info.track = self.current.clone();
            info.position = self.position();
            info.volume = self.volume.volume();
            info.muted = self.volume.muted();
        }
    }

    fn publish_position(&self) {
        if let Ok(mut info) = self.info.lock() {
            info.position = self.position();
        }
    }

    fn persist(&self) {
        let Some(path) = &self.state_path else { return };
        let snapshot = PlayerState {
            volume: self.volume.volume(),
            last_volume: self.volume.last_volume(),
            muted: self.volume.muted(),
            last_track: self.current.as_ref().map(|t| t.path.clone()),
            position_secs: self.position().as_secs_f64(),
            was_playing: self.state == PlaybackState::Playing,
        };
        if let Err(e) = snapshot.save(path) {
            warn!("failed to persist player state: {e}");
        }
    }
}

/// Clamp a seek target (seconds) into `[0, duration]`.
pub(crate) fn clamp_position(secs: f64, duration: Duration) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(secs).min(duration)
}

/// Apply `result` to the current track only when the ids still match;
/// returns whether anything changed. Stale results are discarded silently.
pub(crate) fn merge_analysis(current: &mut Option<Track>, result: AnalysisResult) -> bool {
    match current {
        Some(track) if track.id == result.track_id => {
            track.bpm = result.bpm;
            track.key = result.key;
            track.waveform = result.waveform;
            debug!("analysis merged into track {}", track.id);
            true
        }
        _ => {
            debug!("discarding stale analysis result for track {}", result.track_id);
            false
        }
    }
}
