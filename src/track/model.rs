use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Opaque identity assigned to a track at load time. Ids are handed out by
/// the engine in increasing order and never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(u64);

impl TrackId {
    pub fn first() -> Self {
        Self(1)
    }

    /// The id that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The unit of playback identity plus its derived metadata.
#[derive(Clone, Debug)]
pub struct Track {
    pub id: TrackId,
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    /// Total duration; fixed once decoded.
    pub duration: Duration,
    /// Embedded artwork extracted to a temporary file, when present.
    pub artwork: Option<PathBuf>,
    /// Auxiliary metadata strings (album, genre, year, ...), unordered.
    pub tags: Vec<String>,
    /// Tempo estimate; 0 until analysis completes.
    pub bpm: f32,
    /// Musical key placeholder; always "-".
    pub key: String,
    /// 200-point normalized amplitude envelope; empty until analysis completes.
    pub waveform: Vec<f32>,
}

impl Track {
    /// "Artist - Title" line used by the status display and MPRIS metadata.
    pub fn display(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}
