//! Engine tunables.
//!
//! Defaults reproduce the demo: four sine voices plus four sampler voices, a
//! 2048-point FFT reduced to 512 display bins refreshed at 30 Hz, and a
//! waveform copy scaled by 0.45 so the scrolling display never clips.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What to do with a note-on when every compatible voice is busy.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceStealing {
    /// Ignore the new note.
    #[default]
    Drop,
    /// Take over the oldest releasing voice, or the oldest voice overall.
    StealOldest,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sine_voices: usize,
    pub sampler_voices: usize,
    pub stealing: VoiceStealing,
    /// FFT size is `1 << fft_order`.
    pub fft_order: u32,
    pub scope_size: usize,
    pub spectrum_refresh_hz: f32,
    /// Gain applied to the copy sent to the waveform display.
    pub display_scale: f32,
    pub midi_queue_capacity: usize,
    /// Samples of scrolling waveform history buffered between audio and UI.
    pub waveform_ring_capacity: usize,
}

impl EngineConfig {
    pub fn fft_size(&self) -> usize {
        1 << self.fft_order
    }

    pub fn total_voices(&self) -> usize {
        self.sine_voices + self.sampler_voices
    }

    pub fn with_stealing(mut self, stealing: VoiceStealing) -> Self {
        self.stealing = stealing;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sine_voices: 4,
            sampler_voices: 4,
            stealing: VoiceStealing::Drop,
            fft_order: 11,
            scope_size: 512,
            spectrum_refresh_hz: 30.0,
            display_scale: 0.45,
            midi_queue_capacity: 512,
            waveform_ring_capacity: 16 * 1024,
        }
    }
}
