use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/vivace/config.toml` or `~/.config/vivace/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `VIVACE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub controls: ControlsSettings,
    pub playback: PlaybackSettings,
    pub ui: UiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            controls: ControlsSettings::default(),
            playback: PlaybackSettings::default(),
            ui: UiSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when seeking with `h` / `l`.
    pub seek_seconds: f64,
    /// Volume change applied per `j` / `k` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_seconds: 5.0,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether startup reloads the last played track (and its position) when
    /// no path argument is given.
    pub resume_last_track: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            resume_last_track: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Whether the status line includes the waveform strip.
    pub show_waveform: bool,
    /// Width of the waveform strip in characters.
    pub waveform_width: usize,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_waveform: true,
            waveform_width: 40,
        }
    }
}
