// Purpose: hand rendered audio to the UI thread without blocking the audio thread

pub mod spectrum;
pub mod waveform;

pub use spectrum::{AnalyzerTap, SpectralAnalyzer};
pub use waveform::{waveform_channel, DisplaySink, NullDisplay, WaveformTap, WaveformView};
