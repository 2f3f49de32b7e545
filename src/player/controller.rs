use std::path::PathBuf;
use std::sync::mpsc::{self, SendError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::thread::spawn_engine_thread;
use super::types::{InfoHandle, PlayerCmd, PlayerInfo};
use super::volume::VolumeState;

/// Handle to the engine thread: the command sender plus the shared snapshot
/// of observable state. One instance per process, constructed at startup
/// with the persisted volume state injected.
pub struct Player {
    tx: Sender<PlayerCmd>,
    info: InfoHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    pub fn new(volume: VolumeState, state_path: Option<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let info: InfoHandle = Arc::new(Mutex::new(PlayerInfo {
            volume: volume.volume(),
            muted: volume.muted(),
            ..PlayerInfo::default()
        }));

        let join = spawn_engine_thread(rx, info.clone(), volume, state_path);

        Self {
            tx,
            info,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn info_handle(&self) -> InfoHandle {
        self.info.clone()
    }

    /// Clone of the current observable state.
    pub fn snapshot(&self) -> PlayerInfo {
        self.info
            .lock()
            .map(|i| i.clone())
            .unwrap_or_default()
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<(), SendError<PlayerCmd>> {
        self.tx.send(cmd)
    }

    /// Ask the engine to persist its state and shut down, then join it.
    pub fn quit(&self) {
        let _ = self.send(PlayerCmd::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
