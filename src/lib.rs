pub mod analysis; // Spectrum and waveform taps for the UI thread
pub mod config;
pub mod dsp;
pub mod engine; // Realtime render callback
pub mod error;
pub mod io;
pub mod synth; // Voice management and polyphony

pub use config::{EngineConfig, VoiceStealing};
pub use engine::{DeviceContext, EngineHandles, RenderCallback};
pub use error::Error;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
