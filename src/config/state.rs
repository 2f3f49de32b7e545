use std::path::{Path, PathBuf};
use std::{env, fs};

use log::warn;
use serde::{Deserialize, Serialize};

/// Player state persisted across process restarts: gain/mute plus the last
/// played track, its position and whether it was playing. The track fields
/// exist so a restart (e.g. after an update install) can put the session
/// back where it was; they are not a history feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    pub volume: f32,
    pub last_volume: f32,
    pub muted: bool,
    pub last_track: Option<PathBuf>,
    pub position_secs: f64,
    pub was_playing: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            volume: 1.0,
            last_volume: 1.0,
            muted: false,
            last_track: None,
            position_secs: 0.0,
            was_playing: false,
        }
    }
}

impl PlayerState {
    /// Read the persisted state, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(body) => toml::from_str(&body).unwrap_or_else(|e| {
                warn!("ignoring malformed state file {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let body = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, body)
    }
}

/// Resolve the state path from `VIVACE_STATE_PATH` or XDG defaults.
pub fn resolve_state_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("VIVACE_STATE_PATH") {
        return Some(PathBuf::from(p));
    }
    default_state_path()
}

/// Default state path next to the config file: `<config dir>/state.toml`.
pub fn default_state_path() -> Option<PathBuf> {
    super::load::config_dir().map(|d| d.join("state.toml"))
}
