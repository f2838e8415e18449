//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use saavy_scope::VoiceStealing;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "saavy-scope")]
#[command(about = "Polyphonic sine/sample synth with a live spectrum", long_about = None)]
pub struct Args {
    /// MIDI input to open, by index or by (partial) name
    #[arg(long, value_name = "PORT")]
    pub midi_port: Option<String>,

    /// Print the available MIDI inputs and exit
    #[arg(long)]
    pub list_midi: bool,

    /// WAV file for the sampled sound (root note D5); a built-in tone otherwise
    #[arg(long, value_name = "WAV")]
    pub sample: Option<PathBuf>,

    /// Steal the oldest voice instead of dropping notes when the pool is full
    #[arg(long)]
    pub steal: bool,

    /// Write log records to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Request a fixed device buffer size
    #[arg(long, value_name = "FRAMES")]
    pub block_size: Option<u32>,
}

impl Args {
    pub fn stealing(&self) -> VoiceStealing {
        if self.steal {
            VoiceStealing::StealOldest
        } else {
            VoiceStealing::Drop
        }
    }
}
