use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use rodio::{Decoder, Source};
use thiserror::Error;

/// Interleaved PCM samples pulled out of a decoded file.
pub struct SampleBuffer {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("cancelled")]
    Cancelled,
}

/// How many samples to decode between cancellation checks.
const CANCEL_CHECK_INTERVAL: usize = 1 << 16;

/// Decode the entire file into an interleaved f32 buffer.
///
/// `cancel` is observed at chunk boundaries so a superseded run stops
/// promptly instead of chewing through the rest of the file.
pub fn decode_samples(path: &Path, cancel: &AtomicBool) -> Result<SampleBuffer, AnalysisError> {
    let file = File::open(path)
        .map_err(|e| AnalysisError::Decode(format!("{}: {e}", path.display())))?;
    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| AnalysisError::Decode(format!("{}: {e}", path.display())))?;

    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();

    let mut samples = Vec::new();
    for (i, sample) in decoder.enumerate() {
        if i % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            return Err(AnalysisError::Cancelled);
        }
        samples.push(sample);
    }

    Ok(SampleBuffer {
        samples,
        channels,
        sample_rate,
    })
}
