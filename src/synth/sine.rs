use std::f64::consts::TAU;

use crate::io::{buffer::AudioBuffer, converter::midi_note_to_freq};

/// Fixed headroom so eight full-velocity voices stay well under full scale.
pub const SINE_LEVEL_SCALE: f64 = 0.15;
/// Per-sample decay factor of the release tail.
pub const TAIL_OFF_DECAY: f64 = 0.99;
/// Tail level at which a released note is considered silent.
pub const TAIL_OFF_FLOOR: f64 = 0.005;

/// Plain sine oscillator with an exponential release tail.
///
/// `angle_delta == 0` means no note is sounding. `tail_off == 0` means the
/// note is sustaining; any positive value is the current release gain.
#[derive(Debug, Clone)]
pub struct SineVoice {
    angle: f64,
    angle_delta: f64,
    level: f64,
    tail_off: f64,
    sample_rate: f64,
}

#[inline]
fn is_zero(value: f64) -> bool {
    value.abs() <= f64::EPSILON
}

impl SineVoice {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            angle: 0.0,
            angle_delta: 0.0,
            level: 0.0,
            tail_off: 0.0,
            sample_rate,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    pub fn start_note(&mut self, note: u8, velocity: f32, _pitch_wheel: u16) {
        self.angle = 0.0;
        self.level = velocity as f64 * SINE_LEVEL_SCALE;
        self.tail_off = 0.0;

        let cycles_per_sample = if self.sample_rate > 0.0 {
            midi_note_to_freq(note) / self.sample_rate
        } else {
            0.0
        };
        self.angle_delta = cycles_per_sample * TAU;
    }

    /// Returns false when the note was cut off immediately.
    pub fn stop_note(&mut self, _velocity: f32, allow_tail_off: bool) -> bool {
        if allow_tail_off {
            // Only start the tail once; a second note-off keeps decaying
            if is_zero(self.tail_off) {
                self.tail_off = 1.0;
            }
            true
        } else {
            self.silence();
            false
        }
    }

    fn silence(&mut self) {
        self.angle_delta = 0.0;
        self.tail_off = 0.0;
    }

    pub fn is_sounding(&self) -> bool {
        !is_zero(self.angle_delta)
    }

    pub fn is_releasing(&self) -> bool {
        self.is_sounding() && self.tail_off > 0.0
    }

    /// Add this voice into every channel of `buffer`.
    ///
    /// Returns false once the release tail has died away; samples after that
    /// point are left untouched.
    pub fn render(&mut self, buffer: &mut AudioBuffer, start_sample: usize, num_samples: usize) -> bool {
        if !self.is_sounding() {
            return false;
        }

        let channels = buffer.num_channels();
        for index in start_sample..start_sample + num_samples {
            let current = if self.tail_off > 0.0 {
                (self.angle.sin() * self.level * self.tail_off) as f32
            } else {
                (self.angle.sin() * self.level) as f32
            };

            for ch in 0..channels {
                buffer.add_sample(ch, index, current);
            }

            self.angle += self.angle_delta;

            if self.tail_off > 0.0 {
                self.tail_off *= TAIL_OFF_DECAY;
                if self.tail_off <= TAIL_OFF_FLOOR {
                    self.silence();
                    return false;
                }
            }
        }

        true
    }
}
