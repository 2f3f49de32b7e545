//! MPRIS D-Bus integration: remote transport control plus now-playing
//! metadata for desktop environments.
//!
//! Inbound method calls are translated to [`ControlCmd`] values on a channel
//! the runtime drains; outbound properties are fed from a shared state the
//! runtime keeps in sync with the engine snapshot.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use log::warn;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::player::PlaybackState;
use crate::track::Track;

#[derive(Clone, Debug)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    /// Relative seek in seconds.
    SeekBy(f64),
    /// Absolute seek in seconds.
    SetPosition(f64),
    SetVolume(f32),
    /// Load a local file (MPRIS OpenUri).
    Load(PathBuf),
}

#[derive(Debug)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    artist: Option<String>,
    url: Option<String>,
    art_url: Option<String>,
    length_micros: Option<i64>,
    /// Auxiliary tag strings, surfaced as `xesam:comment`.
    comments: Vec<String>,
    position_micros: i64,
    volume: f32,
    track_id: Option<String>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            playback: PlaybackState::Idle,
            title: None,
            artist: None,
            url: None,
            art_url: None,
            length_micros: None,
            comments: Vec::new(),
            position_micros: 0,
            volume: 1.0,
            track_id: None,
        }
    }
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: &PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback.clone();
        }
    }

    /// Publish (or clear) the current track's metadata.
    pub fn set_track(&self, track: Option<&Track>) {
        let Ok(mut s) = self.state.lock() else { return };
        match track {
            Some(t) => {
                s.title = Some(t.title.clone());
                s.artist = Some(t.artist.clone());
                s.url = Some(format!("file://{}", t.path.display()));
                s.art_url = t
                    .artwork
                    .as_ref()
                    .map(|p| format!("file://{}", p.display()));
                s.length_micros = Some(t.duration.as_micros() as i64);
                s.comments = t.tags.clone();
                s.track_id = Some(format!("/org/mpris/MediaPlayer2/track/{}", t.id));
            }
            None => {
                s.title = None;
                s.artist = None;
                s.url = None;
                s.art_url = None;
                s.length_micros = None;
                s.comments = Vec::new();
                s.track_id = None;
            }
        }
    }

    pub fn set_position(&self, position: Duration) {
        if let Ok(mut s) = self.state.lock() {
            s.position_micros = position.as_micros() as i64;
        }
    }

    pub fn set_volume(&self, volume: f32) {
        if let Ok(mut s) = self.state.lock() {
            s.volume = volume;
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No window to raise.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "vivace"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        // Single-track player.
    }

    fn previous(&self) {}

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    fn seek(&self, offset: i64) {
        let _ = self.tx.send(ControlCmd::SeekBy(offset as f64 / 1_000_000.0));
    }

    fn set_position(&self, _track_id: ObjectPath<'_>, position: i64) {
        let _ = self
            .tx
            .send(ControlCmd::SetPosition(position as f64 / 1_000_000.0));
    }

    fn open_uri(&self, uri: &str) {
        // Only local files make sense here.
        if let Some(path) = uri.strip_prefix("file://") {
            let _ = self.tx.send(ControlCmd::Load(PathBuf::from(path)));
        }
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        // NOTE: This returns a &'static str; we map state into static strings.
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            _ => "Stopped",
        }
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.state.lock().map(|s| s.volume as f64).unwrap_or(1.0)
    }

    #[zbus(property)]
    fn set_volume(&self, volume: f64) {
        let _ = self
            .tx
            .send(ControlCmd::SetVolume(volume.clamp(0.0, 1.0) as f32));
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut insert_str = |key: &str, val: &Option<String>| {
            if let Some(v) = val {
                if let Ok(owned) = OwnedValue::try_from(Value::from(v.clone())) {
                    map.insert(key.to_string(), owned);
                }
            }
        };

        insert_str("xesam:title", &s.title);
        insert_str("xesam:url", &s.url);
        insert_str("mpris:artUrl", &s.art_url);

        if let Some(artist) = &s.artist {
            if let Ok(owned) = OwnedValue::try_from(Value::from(vec![artist.clone()])) {
                map.insert("xesam:artist".to_string(), owned);
            }
        }
        if !s.comments.is_empty() {
            if let Ok(owned) = OwnedValue::try_from(Value::from(s.comments.clone())) {
                map.insert("xesam:comment".to_string(), owned);
            }
        }
        if let Some(length) = s.length_micros {
            if let Ok(owned) = OwnedValue::try_from(Value::from(length)) {
                map.insert("mpris:length".to_string(), owned);
            }
        }
        if let Some(track_id) = &s.track_id {
            if let Ok(path) = ObjectPath::try_from(track_id.as_str()) {
                if let Ok(owned) = OwnedValue::try_from(Value::from(path)) {
                    map.insert("mpris:trackid".to_string(), owned);
                }
            }
        }

        map
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let path = "/org/mpris/MediaPlayer2";

            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!("MPRIS: failed to connect to session bus: {e}");
                    return;
                }
            };

            if let Err(e) = connection
                .request_name("org.mpris.MediaPlayer2.vivace")
                .await
            {
                warn!("MPRIS: failed to acquire name: {e}");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server.at(path, RootIface { tx: tx.clone() }).await {
                warn!("MPRIS: failed to register root iface: {e}");
                return;
            }

            if let Err(e) = object_server
                .at(
                    path,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!("MPRIS: failed to register player iface: {e}");
                return;
            }

            // Keep the service alive.
            loop {
                Timer::after(std::time::Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}

#[cfg(test)]
mod tests;
