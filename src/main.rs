mod analysis;
mod config;
mod mpris;
mod player;
mod runtime;
mod track;
mod ui;

fn main() {
    // RUST_LOG-controlled; silent by default so the status line stays clean.
    env_logger::init();

    if let Err(e) = runtime::run() {
        eprintln!("vivace: {e}");
        std::process::exit(1);
    }
}
