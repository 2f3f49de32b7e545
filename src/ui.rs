//! Status-line rendering for the terminal runtime.
//!
//! One line, redrawn in place: state glyph, track, times, BPM once analysis
//! has landed, a block-glyph waveform strip and the volume.

use std::time::Duration;

use crate::config::UiSettings;
use crate::player::{PlaybackState, PlayerInfo};

/// Glyph ramp for the waveform strip, quietest to loudest.
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn render_status(info: &PlayerInfo, ui: &UiSettings) -> String {
    let glyph = state_glyph(&info.state);

    let Some(track) = &info.track else {
        return match &info.state {
            PlaybackState::Error(reason) => format!("{glyph} error: {reason}"),
            PlaybackState::Loading => format!("{glyph} loading..."),
            _ => format!("{glyph} no track loaded"),
        };
    };

    let mut line = format!(
        "{glyph} {}  {} / {}",
        track.display(),
        format_mmss(info.position),
        format_mmss(track.duration),
    );

    if track.bpm > 0.0 {
        // Key detection is a placeholder; the slot always reads "-".
        line.push_str(&format!("  {:.0} BPM {}", track.bpm, track.key));
    }

    if ui.show_waveform && !track.waveform.is_empty() {
        line.push_str("  ");
        line.push_str(&waveform_strip(&track.waveform, ui.waveform_width));
    }

    line.push_str(&format!(
        "  vol {:.0}%{}",
        info.volume * 100.0,
        if info.muted { " [muted]" } else { "" }
    ));

    line
}

fn state_glyph(state: &PlaybackState) -> char {
    match state {
        PlaybackState::Playing => '▶',
        PlaybackState::Paused => '‖',
        PlaybackState::Stopped => '■',
        PlaybackState::Loading => '…',
        PlaybackState::Idle | PlaybackState::Ready => '·',
        PlaybackState::Error(_) => '!',
    }
}

/// Compress the 200-point envelope into `width` block glyphs, keeping the
/// peak of each bucket so short transients stay visible.
pub fn waveform_strip(waveform: &[f32], width: usize) -> String {
    if waveform.is_empty() || width == 0 {
        return String::new();
    }

    (0..width)
        .map(|i| {
            let start = i * waveform.len() / width;
            let end = ((i + 1) * waveform.len() / width)
                .max(start + 1)
                .min(waveform.len());
            let peak = waveform[start..end].iter().cloned().fold(0.0f32, f32::max);
            let idx = ((peak.clamp(0.0, 1.0) * (BLOCKS.len() - 1) as f32).round() as usize)
                .min(BLOCKS.len() - 1);
            BLOCKS[idx]
        })
        .collect()
}

fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_mmss_pads_minutes_and_seconds() {
        assert_eq!(format_mmss(Duration::from_secs(0)), "00:00");
        assert_eq!(format_mmss(Duration::from_secs(62)), "01:02");
        assert_eq!(format_mmss(Duration::from_secs(600)), "10:00");
    }

    #[test]
    fn waveform_strip_has_requested_width_and_maps_extremes() {
        let mut env = vec![0.0f32; 200];
        for v in env.iter_mut().skip(100) {
            *v = 1.0;
        }

        let strip = waveform_strip(&env, 40);
        assert_eq!(strip.chars().count(), 40);
        assert_eq!(strip.chars().next().unwrap(), BLOCKS[0]);
        assert_eq!(strip.chars().last().unwrap(), BLOCKS[7]);
    }

    #[test]
    fn waveform_strip_is_empty_without_data() {
        assert_eq!(waveform_strip(&[], 40), "");
        assert_eq!(waveform_strip(&[0.5; 200], 0), "");
    }

    #[test]
    fn render_status_without_track_mentions_state() {
        let ui = UiSettings::default();
        let info = PlayerInfo::default();
        assert!(render_status(&info, &ui).contains("no track loaded"));

        let info = PlayerInfo {
            state: PlaybackState::Error("bad file".into()),
            ..PlayerInfo::default()
        };
        assert!(render_status(&info, &ui).contains("bad file"));
    }
}
