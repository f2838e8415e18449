//! Benchmarks for the voices, the analyzer and the full render path.
//!
//! Run with: cargo bench
//!
//! Everything measured here runs on the audio thread (except the analyzer
//! frame, which runs at UI rate) and must finish well inside the block
//! deadline.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Single voices, the envelope and the spectrum analyzer
//!   - scenarios/*  Full synth blocks and the render callback

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    // Primitives
    dsp::bench_envelope,
    dsp::bench_voice,
    dsp::bench_spectrum,
    // Real-world scenarios
    scenarios::bench_synth,
    scenarios::bench_callback,
);
criterion_main!(benches);
