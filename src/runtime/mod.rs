use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::config;
use crate::mpris::ControlCmd;

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let state_path = config::resolve_state_path();
    let saved = state_path
        .as_deref()
        .map(config::PlayerState::load)
        .unwrap_or_default();

    let player = startup::build_player(&saved, state_path);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    // A path argument wins over the persisted last track.
    let arg = env::args().nth(1).map(PathBuf::from);
    startup::initial_load(&player, arg, &saved, &settings);

    enable_raw_mode()?;
    let run_result = event_loop::run(&settings, &player, &mpris, &control_rx);
    disable_raw_mode()?;

    // Joining the engine persists volume and the resume position.
    player.quit();

    run_result
}
