//! saavy-scope - terminal polyphonic synth with a live spectrum
//!
//! Run with: cargo run --bin saavy-scope -- --help

mod app;
mod assets;
mod cli;
mod keyboard;
mod midi_input;
mod ui;

use std::{fs::File, path::Path};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = cli::Args::parse();
    init_logging(args.log_file.as_deref())?;

    if args.list_midi {
        return midi_input::list_ports();
    }

    app::run(args)
}

/// The TUI owns the terminal, so log records only go to a file.
fn init_logging(path: Option<&Path>) -> EyreResult<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();

    log::info!("logging to {}", path.display());
    Ok(())
}
