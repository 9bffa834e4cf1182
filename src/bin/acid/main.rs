//! acid - terminal acid bass synthesizer
//!
//! Run with: cargo run -- [bpm]
//!
//! Log output goes to stderr; set `RUST_LOG=debug` and redirect stderr to a
//! file to keep the TUI clean.

mod app;
mod ui;

use app::Acid;
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};

const DEFAULT_BPM: f64 = 120.0;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let bpm = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<f64>()
            .wrap_err_with(|| format!("invalid bpm '{arg}'"))?,
        None => DEFAULT_BPM,
    };
    if !(20.0..=300.0).contains(&bpm) {
        return Err(eyre!("bpm must be between 20 and 300, got {bpm}"));
    }

    Acid::new().bpm(bpm).run()
}
