/// Fallback when no usable peaks are found.
pub const DEFAULT_BPM: f32 = 120.0;

const MIN_BPM: f32 = 60.0;
const MAX_BPM: f32 = 200.0;

/// One-pole low-pass smoothing factor: `y[n] = y[n-1] + α·(x[n] - y[n-1])`.
const SMOOTHING: f32 = 0.1;

/// Peaks must exceed this fraction of the filtered signal's maximum.
const PEAK_THRESHOLD: f32 = 0.5;

/// Coarse tempo estimate from amplitude-peak spacing.
///
/// Takes the first channel of the interleaved buffer, rectifies it, smooths
/// it with a one-pole low-pass, finds local maxima above half the filtered
/// peak and averages the inter-peak intervals. The result is rounded to the
/// nearest integer and clamped to `[60, 200]`; fewer than two peaks (or an
/// empty buffer) yields [`DEFAULT_BPM`].
pub fn estimate_bpm(samples: &[f32], channels: u16, sample_rate: u32) -> f32 {
    if samples.is_empty() || channels == 0 || sample_rate == 0 {
        return DEFAULT_BPM;
    }

    let channels = channels as usize;
    let mut filtered = Vec::with_capacity(samples.len() / channels + 1);
    let mut y = 0.0f32;
    for frame in samples.chunks(channels) {
        let x = frame[0].abs();
        y += SMOOTHING * (x - y);
        filtered.push(y);
    }

    let peak = filtered.iter().cloned().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return DEFAULT_BPM;
    }
    let threshold = peak * PEAK_THRESHOLD;

    let mut peaks: Vec<usize> = Vec::new();
    for n in 1..filtered.len().saturating_sub(1) {
        let v = filtered[n];
        if v > threshold && v > filtered[n - 1] && v >= filtered[n + 1] {
            peaks.push(n);
        }
    }
    if peaks.len() < 2 {
        return DEFAULT_BPM;
    }

    let intervals: Vec<f32> = peaks
        .windows(2)
        .map(|w| (w[1] - w[0]) as f32 / sample_rate as f32)
        .filter(|&dt| dt > 0.0)
        .collect();
    if intervals.is_empty() {
        return DEFAULT_BPM;
    }

    let avg = intervals.iter().sum::<f32>() / intervals.len() as f32;
    (60.0 / avg).round().clamp(MIN_BPM, MAX_BPM)
}
