use crate::MIN_TIME;

/*
Linear ADSR
===========

Used by the sampler voice to fade samples in and out so note boundaries do
not click. Every stage is a straight ramp at a fixed per-sample step:

    step = distance / (stage_seconds * sample_rate)

  Level
    1.0 ┐   ╱‾‾‾‾‾‾‾‾‾‾‾‾╲
        │  ╱              ╲
    0.0 └─╱────────────────╲──→ Time
        Attack  Sustain   Release

With the sampler defaults (decay 0, sustain 1) the decay stage is skipped
on the first sample after the attack peaks.

Release ramps from whatever level the envelope is at when the gate drops,
so a note released mid-attack fades out from below full scale.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeParams {
    pub fn attack_release(attack: f32, release: f32) -> Self {
        Self {
            attack,
            decay: 0.0,
            sustain: 1.0,
            release,
        }
    }
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 0.1,
            decay: 0.1,
            sustain: 1.0,
            release: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

pub struct Envelope {
    params: EnvelopeParams,
    sample_rate: f32,
    stage: EnvelopeState,
    level: f32,
    attack_step: f32,
    decay_step: f32,
    release_step: f32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            params: EnvelopeParams::default(),
            sample_rate: sample_rate.max(1.0),
            stage: EnvelopeState::Idle,
            level: 0.0,
            attack_step: 0.0,
            decay_step: 0.0,
            release_step: 0.0,
        };
        env.recalculate();
        env
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.recalculate();
    }

    pub fn set_params(&mut self, params: EnvelopeParams) {
        self.params = EnvelopeParams {
            attack: params.attack.max(0.0),
            decay: params.decay.max(0.0),
            sustain: params.sustain.clamp(0.0, 1.0),
            release: params.release.max(0.0),
        };
        self.recalculate();
    }

    fn recalculate(&mut self) {
        let samples = |seconds: f32| (seconds.max(MIN_TIME) * self.sample_rate).max(1.0);
        self.attack_step = 1.0 / samples(self.params.attack);
        self.decay_step = (1.0 - self.params.sustain) / samples(self.params.decay);
        self.release_step = self.params.sustain.max(self.level) / samples(self.params.release);
    }

    /// Gate high: restart the attack from silence.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
    }

    /// Gate low: ramp to zero from the current level.
    pub fn note_off(&mut self) {
        if self.stage == EnvelopeState::Idle {
            return;
        }
        let samples = (self.params.release.max(MIN_TIME) * self.sample_rate).max(1.0);
        self.release_step = self.level / samples;
        if self.release_step <= 0.0 {
            self.reset();
        } else {
            self.stage = EnvelopeState::Release;
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {}

            EnvelopeState::Attack => {
                self.level += self.attack_step;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                self.level -= self.decay_step;
                if self.level <= self.params.sustain {
                    self.level = self.params.sustain;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.params.sustain;
            }

            EnvelopeState::Release => {
                self.level -= self.release_step;
                if self.level <= 0.0 {
                    self.reset();
                }
            }
        }

        self.level
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}
