//! Construction-time errors.
//!
//! Nothing on the audio thread returns these. They are raised while building
//! analyzers, sounds and callbacks, before streaming starts.

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("fft order {0} is out of range (expected 4..=16)")]
    InvalidFftOrder(u32),
    #[error("scope size must be at least one bin")]
    EmptyScope,
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(f64),
    #[error("channel count must be at least one")]
    NoChannels,
    #[error("sampled sound `{0}` has no audio data")]
    EmptySample(String),
    #[error("block size must be at least one frame")]
    EmptyBlock,
}

pub type Result<T> = std::result::Result<T, Error>;
