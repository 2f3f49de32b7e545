use super::*;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::time::Duration;

use tempfile::tempdir;

use crate::track::TrackId;

/// Mono click train: a single full-scale sample every `period` samples,
/// starting at `offset`.
fn click_train(len: usize, offset: usize, period: usize) -> Vec<f32> {
    let mut samples = vec![0.0f32; len];
    let mut n = offset;
    while n < len {
        samples[n] = 1.0;
        n += period;
    }
    samples
}

/// Deterministic pseudo-random buffer (LCG) for idempotence checks.
fn noise(len: usize) -> Vec<f32> {
    let mut state: u32 = 0x2545_f491;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) as f32 / (1 << 24) as f32 * 2.0 - 1.0
        })
        .collect()
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer
            .write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn envelope_is_always_exactly_200_points() {
    assert_eq!(waveform_envelope(&[]).len(), WAVEFORM_POINTS);
    assert_eq!(waveform_envelope(&[0.5; 50]).len(), WAVEFORM_POINTS);
    assert_eq!(waveform_envelope(&noise(100_000)).len(), WAVEFORM_POINTS);
}

#[test]
fn envelope_of_empty_buffer_is_all_zeros() {
    assert_eq!(waveform_envelope(&[]), vec![0.0; WAVEFORM_POINTS]);
}

#[test]
fn envelope_values_stay_in_unit_range() {
    for v in waveform_envelope(&noise(48_000)) {
        assert!((0.0..=1.0).contains(&v), "out of range: {v}");
    }
}

#[test]
fn envelope_noise_gate_zeroes_quiet_signal() {
    // Everything below the 0.1 gate counts as silence.
    let quiet: Vec<f32> = (0..4000).map(|i| 0.05 * ((i % 7) as f32 / 7.0)).collect();
    assert_eq!(waveform_envelope(&quiet), vec![0.0; WAVEFORM_POINTS]);
}

#[test]
fn envelope_squares_after_normalizing() {
    // First half at full scale, second half at half scale: the half-scale
    // windows normalize to 0.5 and compress to 0.25.
    let mut samples = vec![1.0f32; 1000];
    samples.extend(std::iter::repeat_n(0.5f32, 1000));

    let env = waveform_envelope(&samples);
    assert!((env[10] - 1.0).abs() < 1e-6);
    assert!((env[190] - 0.25).abs() < 1e-6);
}

#[test]
fn envelope_is_idempotent() {
    let samples = noise(44_100);
    assert_eq!(waveform_envelope(&samples), waveform_envelope(&samples));
}

#[test]
fn bpm_of_regular_clicks_matches_their_spacing() {
    // One click every 0.5 s at 8 kHz -> 120 BPM.
    let samples = click_train(8000 * 6, 100, 4000);
    assert_eq!(estimate_bpm(&samples, 1, 8000), 120.0);
}

#[test]
fn bpm_clamps_to_range_bounds() {
    // 0.1 s spacing -> 600 BPM raw, clamped to 200.
    let fast = click_train(8000 * 2, 100, 800);
    assert_eq!(estimate_bpm(&fast, 1, 8000), 200.0);

    // 1.5 s spacing -> 40 BPM raw, clamped to 60.
    let slow = click_train(8000 * 8, 100, 12_000);
    assert_eq!(estimate_bpm(&slow, 1, 8000), 60.0);
}

#[test]
fn bpm_defaults_without_enough_peaks() {
    assert_eq!(estimate_bpm(&[], 1, 8000), DEFAULT_BPM);
    assert_eq!(estimate_bpm(&vec![0.0; 16_000], 1, 8000), DEFAULT_BPM);

    // A single click yields one peak, which is not enough for an interval.
    let one = click_train(8000, 4000, 100_000);
    assert_eq!(estimate_bpm(&one, 1, 8000), DEFAULT_BPM);
}

#[test]
fn bpm_uses_first_channel_of_interleaved_buffer() {
    // Clicks on channel 0 only; channel 1 carries junk that would change the
    // spacing if it leaked in.
    let mono = click_train(8000 * 6, 100, 4000);
    let mut stereo = Vec::with_capacity(mono.len() * 2);
    for (i, &s) in mono.iter().enumerate() {
        stereo.push(s);
        stereo.push(if i % 3 == 0 { 0.9 } else { 0.0 });
    }
    assert_eq!(estimate_bpm(&stereo, 2, 8000), 120.0);
}

#[test]
fn bpm_is_idempotent() {
    let samples = noise(44_100);
    let a = estimate_bpm(&samples, 1, 44_100);
    let b = estimate_bpm(&samples, 1, 44_100);
    assert_eq!(a.to_bits(), b.to_bits());
}

#[test]
fn worker_publishes_tagged_result() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clicks.wav");
    write_wav(&path, &click_train(8000 * 6, 100, 4000), 8000);

    let (tx, rx) = mpsc::channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let id = TrackId::first().next();
    spawn_analysis(path, id, cancel, tx).join().unwrap();

    let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(result.track_id, id);
    assert_eq!(result.key, "-");
    assert_eq!(result.waveform.len(), WAVEFORM_POINTS);
    assert!((60.0..=200.0).contains(&result.bpm));
}

#[test]
fn worker_for_silent_file_reports_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("silence.wav");
    write_wav(&path, &vec![0.0; 8000 * 10], 8000);

    let (tx, rx) = mpsc::channel();
    let cancel = Arc::new(AtomicBool::new(false));
    spawn_analysis(path, TrackId::first(), cancel, tx)
        .join()
        .unwrap();

    let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(result.bpm, DEFAULT_BPM);
    assert_eq!(result.waveform, vec![0.0; WAVEFORM_POINTS]);
}

#[test]
fn cancelled_worker_publishes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clicks.wav");
    write_wav(&path, &click_train(8000 * 6, 100, 4000), 8000);

    let (tx, rx) = mpsc::channel();
    let cancel = Arc::new(AtomicBool::new(true));
    spawn_analysis(path, TrackId::first(), cancel, tx)
        .join()
        .unwrap();

    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn worker_swallows_decode_failures() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.wav");
    std::fs::write(&path, b"not audio").unwrap();

    let (tx, rx) = mpsc::channel();
    let cancel = Arc::new(AtomicBool::new(false));
    spawn_analysis(path, TrackId::first(), cancel, tx)
        .join()
        .unwrap();

    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}
