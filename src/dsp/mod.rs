//! Low-level DSP primitives used by the voices and the analyzer.
//!
//! The envelope is allocation-free and safe to embed in voice structs. The
//! window table is built once at construction and only read afterwards.

/// Linear attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Analysis windows for the spectrum tap.
pub mod window;

pub use envelope::{Envelope, EnvelopeParams, EnvelopeState};
