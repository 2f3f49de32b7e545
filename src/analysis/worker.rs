use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::track::TrackId;

use super::decode::{AnalysisError, decode_samples};
use super::tempo::estimate_bpm;
use super::waveform::waveform_envelope;

/// Output of one analysis run, tagged with the id of the track it was
/// computed for. The engine re-validates the id before merging, so a late
/// result for a superseded track is dropped on the floor.
#[derive(Clone, Debug)]
pub struct AnalysisResult {
    pub track_id: TrackId,
    pub bpm: f32,
    pub key: String,
    pub waveform: Vec<f32>,
}

/// Run the full analysis for `path` on a background thread.
///
/// `cancel` is checked between decode chunks and between stages; a cancelled
/// run exits without publishing. Analysis failures are logged and swallowed;
/// the track simply keeps its default bpm/waveform.
pub fn spawn_analysis(
    path: PathBuf,
    track_id: TrackId,
    cancel: Arc<AtomicBool>,
    tx: Sender<AnalysisResult>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let buffer = match decode_samples(&path, &cancel) {
            Ok(b) => b,
            Err(AnalysisError::Cancelled) => {
                debug!("analysis of track {track_id} cancelled during decode");
                return;
            }
            Err(e) => {
                warn!("analysis of {} failed: {e}", path.display());
                return;
            }
        };

        let waveform = waveform_envelope(&buffer.samples);
        if cancel.load(Ordering::Relaxed) {
            debug!("analysis of track {track_id} cancelled before tempo stage");
            return;
        }

        let bpm = estimate_bpm(&buffer.samples, buffer.channels, buffer.sample_rate);
        if cancel.load(Ordering::Relaxed) {
            return;
        }

        debug!("analysis of track {track_id} done: {bpm} bpm");
        let _ = tx.send(AnalysisResult {
            track_id,
            bpm,
            // Key detection is a permanent placeholder.
            key: "-".to_string(),
            waveform,
        });
    })
}
