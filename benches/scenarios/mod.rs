//! Real-world scenario benchmarks.
//!
//! Full synth blocks with a busy voice pool, and the render callback with
//! MIDI, analyzer and waveform tap all attached.

mod callback;
mod synth;

pub use callback::bench_callback;
pub use synth::bench_synth;
