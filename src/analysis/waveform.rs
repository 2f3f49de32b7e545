/// Number of points in the envelope. The seek/scrub display assumes exactly
/// this many values.
pub const WAVEFORM_POINTS: usize = 200;

/// Absolute amplitude below which a sample is treated as noise and zeroed
/// before the RMS is taken.
const NOISE_GATE: f32 = 0.1;

/// Downsample a raw sample buffer to a 200-point normalized envelope.
///
/// Per point: gate the window's samples, take the RMS, then normalize by the
/// maximum RMS across all points and square. Squaring emphasizes loud
/// transients and visually suppresses the low-level remainder. Values are in
/// `[0, 1]`; an empty (or fully gated) buffer yields 200 zeros.
pub fn waveform_envelope(samples: &[f32]) -> Vec<f32> {
    if samples.is_empty() {
        return vec![0.0; WAVEFORM_POINTS];
    }

    let mut rms = vec![0.0f32; WAVEFORM_POINTS];
    for (i, out) in rms.iter_mut().enumerate() {
        let start = i * samples.len() / WAVEFORM_POINTS;
        let end = (i + 1) * samples.len() / WAVEFORM_POINTS;
        let window = &samples[start..end];
        if window.is_empty() {
            continue;
        }

        let energy: f32 = window
            .iter()
            .map(|&s| if s.abs() < NOISE_GATE { 0.0 } else { s * s })
            .sum();
        *out = (energy / window.len() as f32).sqrt();
    }

    let max = rms.iter().cloned().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return vec![0.0; WAVEFORM_POINTS];
    }

    rms.iter()
        .map(|&v| {
            let n = v / max;
            n * n
        })
        .collect()
}
