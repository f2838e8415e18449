use crate::{
    dsp::envelope::{Envelope, EnvelopeParams},
    io::buffer::AudioBuffer,
    synth::sound::SampledSound,
};

/*
Sampler Voice
=============

Plays a `SampledSound` transposed relative to its root note:

    pitch_ratio = 2^((note - root) / 12) * source_rate / output_rate

Each output sample reads the source at a fractional position and linearly
interpolates between the two neighbouring frames, then applies the
attack/release envelope and the velocity gain.

Channel mapping: with at least two output channels the left source lands
on channel 0 and the right (or left again, for mono sources) on channel 1.
A single output channel receives the average of the two.

The voice ends in one of two ways: the read position runs past the end of
the sample, or the release ramp reaches zero.
*/

pub struct SamplerVoice {
    pitch_ratio: f64,
    position: f64,
    gain: f32,
    envelope: Envelope,
    sample_rate: f64,
    playing: bool,
}

impl SamplerVoice {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            pitch_ratio: 0.0,
            position: 0.0,
            gain: 0.0,
            envelope: Envelope::new(sample_rate as f32),
            sample_rate,
            playing: false,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.envelope.set_sample_rate(sample_rate as f32);
    }

    pub fn start_note(&mut self, sound: &SampledSound, note: u8, velocity: f32, _pitch_wheel: u16) {
        let semitones = note as f64 - sound.root_note() as f64;
        self.pitch_ratio = if self.sample_rate > 0.0 {
            2.0_f64.powf(semitones / 12.0) * sound.source_sample_rate() / self.sample_rate
        } else {
            0.0
        };
        self.position = 0.0;
        self.gain = velocity;

        self.envelope.set_params(EnvelopeParams::attack_release(
            sound.attack_seconds() as f32,
            sound.release_seconds() as f32,
        ));
        self.envelope.note_on();
        self.playing = true;
    }

    /// Returns false when the note was cut off immediately.
    pub fn stop_note(&mut self, _velocity: f32, allow_tail_off: bool) -> bool {
        if allow_tail_off && self.playing {
            self.envelope.note_off();
            self.playing = self.envelope.is_active();
        } else {
            self.playing = false;
            self.envelope.reset();
        }
        self.playing
    }

    pub fn is_sounding(&self) -> bool {
        self.playing
    }

    pub fn is_releasing(&self) -> bool {
        self.playing && self.envelope.state() == crate::dsp::EnvelopeState::Release
    }

    pub fn pitch_ratio(&self) -> f64 {
        self.pitch_ratio
    }

    /// Add this voice into `buffer`. Returns false once the voice has ended.
    pub fn render(
        &mut self,
        sound: &SampledSound,
        buffer: &mut AudioBuffer,
        start_sample: usize,
        num_samples: usize,
    ) -> bool {
        if !self.playing {
            return false;
        }

        let stereo_source = sound.num_channels() > 1;
        let stereo_output = buffer.num_channels() > 1;
        let length = sound.length() as f64;

        for index in start_sample..start_sample + num_samples {
            let pos = self.position as usize;
            let alpha = (self.position - pos as f64) as f32;
            let inv_alpha = 1.0 - alpha;

            let mut left = sound.frame(0, pos) * inv_alpha + sound.frame(0, pos + 1) * alpha;
            let mut right = if stereo_source {
                sound.frame(1, pos) * inv_alpha + sound.frame(1, pos + 1) * alpha
            } else {
                left
            };

            let env = self.envelope.next_sample();
            left *= self.gain * env;
            right *= self.gain * env;

            if stereo_output {
                buffer.add_sample(0, index, left);
                buffer.add_sample(1, index, right);
            } else {
                buffer.add_sample(0, index, (left + right) * 0.5);
            }

            self.position += self.pitch_ratio;

            if self.position > length || !self.envelope.is_active() {
                self.stop_note(0.0, false);
                return false;
            }
        }

        true
    }
}
