//! Background analysis pipeline: waveform envelope and tempo estimate.
//!
//! Analysis decodes the whole file to PCM on a worker thread, derives a
//! fixed-size amplitude envelope and a BPM estimate, and publishes an
//! id-tagged [`AnalysisResult`] back to the engine over a channel. The run
//! is cancellable at chunk boundaries; a cancelled run publishes nothing.

mod decode;
mod tempo;
mod waveform;
mod worker;

pub use decode::*;
pub use tempo::*;
pub use waveform::*;
pub use worker::*;

#[cfg(test)]
mod tests;
