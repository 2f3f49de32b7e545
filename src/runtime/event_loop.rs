use std::io::Write;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::{cursor, execute, terminal};

use crate::config::Settings;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::{PlaybackState, Player, PlayerCmd};
use crate::runtime::mpris_sync::update_mpris;
use crate::track::TrackId;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
struct EventLoopState {
    /// Last status line drawn; redrawing only on change keeps the terminal quiet.
    last_line: String,
    /// Last-known track id as emitted to MPRIS.
    last_mpris_track: Option<TrackId>,
    /// Last-known playback state as emitted to MPRIS.
    last_mpris_playback: PlaybackState,
}

/// Main terminal event loop: drains MPRIS commands, handles key presses,
/// redraws the status line and keeps MPRIS metadata in sync. Returns when
/// shutdown is requested.
pub fn run(
    settings: &Settings,
    player: &Player,
    mpris: &MprisHandle,
    control_rx: &Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = EventLoopState {
        last_line: String::new(),
        last_mpris_track: None,
        last_mpris_playback: PlaybackState::Idle,
    };

    loop {
        // Remote commands first; they go through the same engine channel as keys.
        while let Ok(cmd) = control_rx.try_recv() {
            let mapped = match cmd {
                ControlCmd::Quit => {
                    finish_line()?;
                    return Ok(());
                }
                ControlCmd::Play => PlayerCmd::Play,
                ControlCmd::Pause => PlayerCmd::Pause,
                ControlCmd::PlayPause => PlayerCmd::TogglePlayPause,
                ControlCmd::Stop => PlayerCmd::Stop,
                ControlCmd::SeekBy(secs) => PlayerCmd::SeekBy(secs),
                ControlCmd::SetPosition(secs) => PlayerCmd::Seek(secs),
                ControlCmd::SetVolume(v) => PlayerCmd::SetVolume(v),
                ControlCmd::Load(path) => PlayerCmd::Load(path),
            };
            let _ = player.send(mapped);
        }

        let info = player.snapshot();

        // Metadata and playback status only on change; position and volume
        // are cheap and refresh every pass.
        let track_id = info.track.as_ref().map(|t| t.id);
        if track_id != state.last_mpris_track || info.state != state.last_mpris_playback {
            update_mpris(mpris, &info);
            state.last_mpris_track = track_id;
            state.last_mpris_playback = info.state.clone();
        } else {
            mpris.set_position(info.position);
            mpris.set_volume(info.volume);
        }

        let line = ui::render_status(&info, &settings.ui);
        if line != state.last_line {
            let mut stdout = std::io::stdout();
            execute!(
                stdout,
                cursor::MoveToColumn(0),
                terminal::Clear(terminal::ClearType::CurrentLine)
            )?;
            write!(stdout, "{line}")?;
            stdout.flush()?;
            state.last_line = line;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') => {
                        finish_line()?;
                        return Ok(());
                    }
                    KeyCode::Char(' ') | KeyCode::Char('p') => {
                        let _ = player.send(PlayerCmd::TogglePlayPause);
                    }
                    KeyCode::Char('s') => {
                        let _ = player.send(PlayerCmd::Stop);
                    }
                    KeyCode::Left | KeyCode::Char('h') => {
                        let _ = player.send(PlayerCmd::SeekBy(-settings.controls.seek_seconds));
                    }
                    KeyCode::Right | KeyCode::Char('l') => {
                        let _ = player.send(PlayerCmd::SeekBy(settings.controls.seek_seconds));
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        let v = (info.volume - settings.controls.volume_step).max(0.0);
                        let _ = player.send(PlayerCmd::SetVolume(v));
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        let v = (info.volume + settings.controls.volume_step).min(1.0);
                        let _ = player.send(PlayerCmd::SetVolume(v));
                    }
                    KeyCode::Char('m') => {
                        let _ = player.send(PlayerCmd::ToggleMute);
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Leave the status line behind cleanly before giving the terminal back.
fn finish_line() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    execute!(stdout, cursor::MoveToColumn(0))?;
    writeln!(stdout)?;
    stdout.flush()
}
