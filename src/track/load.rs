use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::{MimeType, Picture};
use lofty::tag::ItemKey;
use log::{debug, warn};
use rodio::{Decoder, Source};
use thiserror::Error;

use super::model::{Track, TrackId};

/// Extensions the loader accepts, matched case-insensitively. Anything else
/// is rejected before any file I/O happens.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["mp3", "aiff", "flac", "wav", "m4a"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported format: .{0}")]
    UnsupportedFormat(String),
    #[error("failed to load: {0}")]
    FailedToLoad(String),
}

/// Whether `path` carries one of the supported audio extensions.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|e| *e == ext)
        })
        .unwrap_or(false)
}

/// Open `path`, parse its metadata and verify it decodes.
///
/// Tag parsing failures are not load failures: title falls back to the file
/// stem and artist to "Unknown Artist". A file that the decoder rejects, or
/// whose duration cannot be determined, fails with [`LoadError::FailedToLoad`].
pub fn load(path: &Path, id: TrackId) -> Result<Track, LoadError> {
    if !is_supported(path) {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        return Err(LoadError::UnsupportedFormat(ext));
    }

    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown")
        .to_string();
    let mut artist = "Unknown Artist".to_string();
    let mut tags: Vec<String> = Vec::new();
    let mut artwork: Option<PathBuf> = None;
    let mut duration: Option<Duration> = None;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            let d = tagged.properties().duration();
            if !d.is_zero() {
                duration = Some(d);
            }

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.get_string(ItemKey::TrackTitle) {
                    if !v.trim().is_empty() {
                        title = v.trim().to_string();
                    }
                }
                if let Some(v) = tag.get_string(ItemKey::TrackArtist) {
                    if !v.trim().is_empty() {
                        artist = v.trim().to_string();
                    }
                }
                for key in [
                    ItemKey::AlbumTitle,
                    ItemKey::AlbumArtist,
                    ItemKey::Genre,
                    ItemKey::Year,
                    ItemKey::Comment,
                ] {
                    if let Some(v) = tag.get_string(key) {
                        if !v.trim().is_empty() {
                            tags.push(v.trim().to_string());
                        }
                    }
                }

                artwork = extract_artwork(tag.pictures(), id);
            }
        }
        Err(e) => {
            // Metadata-only failure; playback may still be possible.
            debug!("no readable tags in {}: {e}", path.display());
        }
    }

    // The sink re-opens the file for playback; a container the decoder
    // rejects must fail the load here, synchronously.
    let file = File::open(path)
        .map_err(|e| LoadError::FailedToLoad(format!("{}: {e}", path.display())))?;
    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| LoadError::FailedToLoad(format!("{}: {e}", path.display())))?;

    if duration.is_none() {
        duration = decoder.total_duration();
    }
    let duration = match duration {
        Some(d) if !d.is_zero() => d,
        _ => {
            return Err(LoadError::FailedToLoad(format!(
                "{}: could not determine duration",
                path.display()
            )));
        }
    };

    Ok(Track {
        id,
        path: path.to_path_buf(),
        title,
        artist,
        duration,
        artwork,
        tags,
        bpm: 0.0,
        key: "-".to_string(),
        waveform: Vec::new(),
    })
}

/// Write the first embedded picture to a temp file and return its path.
/// Extraction problems are logged and treated as "no artwork".
fn extract_artwork(pictures: &[Picture], id: TrackId) -> Option<PathBuf> {
    let pic = pictures.first()?;
    let ext = match pic.mime_type() {
        Some(MimeType::Png) => "png",
        _ => "jpg",
    };
    let dest = std::env::temp_dir().join(format!("vivace-artwork-{id}.{ext}"));
    match std::fs::write(&dest, pic.data()) {
        Ok(()) => Some(dest),
        Err(e) => {
            warn!("failed to extract artwork to {}: {e}", dest.display());
            None
        }
    }
}
