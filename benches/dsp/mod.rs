//! Benchmarks for voices and analysis primitives.

mod envelope;
mod spectrum;
mod voice;

pub use envelope::bench_envelope;
pub use spectrum::bench_spectrum;
pub use voice::bench_voice;
