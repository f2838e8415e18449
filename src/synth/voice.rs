use std::sync::Arc;

use crate::{
    io::buffer::AudioBuffer,
    synth::{
        sampler::SamplerVoice,
        sine::SineVoice,
        sound::{SoundDefinition, SoundKind},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Playing a held or sustained note
    Releasing, // Key released, tail or release ramp running
}

/// The family a voice belongs to. Decides which sounds it may play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceKind {
    Sine,
    Sampler,
}

impl VoiceKind {
    pub fn accepts(self, sound: SoundKind) -> bool {
        matches!(
            (self, sound),
            (VoiceKind::Sine, SoundKind::Sine) | (VoiceKind::Sampler, SoundKind::Sampled)
        )
    }
}

enum VoiceEngine {
    Sine(SineVoice),
    Sampler(SamplerVoice),
}

/// One slot of the synth's voice pool.
///
/// Wraps the signal generator with the bookkeeping the allocator needs:
/// which note and channel it holds, how old the note is, whether the key
/// is still down or held by the sustain pedal, and which sound definition
/// it was started with.
pub struct Voice {
    engine: VoiceEngine,
    note: Option<u8>,
    channel: u8,
    age: u64,
    key_down: bool,
    sustained: bool,
    sound: Option<Arc<SoundDefinition>>,
}

impl Voice {
    fn with_engine(engine: VoiceEngine) -> Self {
        Self {
            engine,
            note: None,
            channel: 0,
            age: 0,
            key_down: false,
            sustained: false,
            sound: None,
        }
    }

    pub fn sine(sample_rate: f64) -> Self {
        Self::with_engine(VoiceEngine::Sine(SineVoice::new(sample_rate)))
    }

    pub fn sampler(sample_rate: f64) -> Self {
        Self::with_engine(VoiceEngine::Sampler(SamplerVoice::new(sample_rate)))
    }

    pub fn kind(&self) -> VoiceKind {
        match self.engine {
            VoiceEngine::Sine(_) => VoiceKind::Sine,
            VoiceEngine::Sampler(_) => VoiceKind::Sampler,
        }
    }

    pub fn can_play(&self, sound: &SoundDefinition) -> bool {
        self.kind().accepts(sound.kind())
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        match &mut self.engine {
            VoiceEngine::Sine(voice) => voice.set_sample_rate(sample_rate),
            VoiceEngine::Sampler(voice) => voice.set_sample_rate(sample_rate),
        }
    }

    /// Start `note` with `sound`. Returns false when the sound is one this
    /// voice cannot play, leaving the voice untouched.
    pub fn start_note(
        &mut self,
        sound: &Arc<SoundDefinition>,
        channel: u8,
        note: u8,
        velocity: f32,
        pitch_wheel: u16,
        age: u64,
    ) -> bool {
        match (&mut self.engine, sound.as_ref()) {
            (VoiceEngine::Sine(voice), SoundDefinition::Sine) => {
                voice.start_note(note, velocity, pitch_wheel)
            }
            (VoiceEngine::Sampler(voice), SoundDefinition::Sampled(sampled)) => {
                voice.start_note(sampled, note, velocity, pitch_wheel)
            }
            _ => return false,
        }

        self.note = Some(note);
        self.channel = channel;
        self.age = age;
        self.key_down = true;
        self.sustained = false;
        self.sound = Some(Arc::clone(sound));
        true
    }

    pub fn stop_note(&mut self, velocity: f32, allow_tail_off: bool) {
        if self.note.is_none() {
            return;
        }

        let still_sounding = match &mut self.engine {
            VoiceEngine::Sine(voice) => voice.stop_note(velocity, allow_tail_off),
            VoiceEngine::Sampler(voice) => voice.stop_note(velocity, allow_tail_off),
        };

        self.key_down = false;
        self.sustained = false;
        if !still_sounding {
            self.clear_current_note();
        }
    }

    /// Mix this voice into `buffer[start_sample..start_sample + num_samples]`.
    pub fn render(&mut self, buffer: &mut AudioBuffer, start_sample: usize, num_samples: usize) {
        let Some(sound) = &self.sound else {
            return;
        };

        let still_sounding = match (&mut self.engine, sound.as_ref()) {
            (VoiceEngine::Sine(voice), _) => voice.render(buffer, start_sample, num_samples),
            (VoiceEngine::Sampler(voice), SoundDefinition::Sampled(sampled)) => {
                voice.render(sampled, buffer, start_sample, num_samples)
            }
            _ => false,
        };

        if !still_sounding {
            self.clear_current_note();
        }
    }

    fn clear_current_note(&mut self) {
        self.note = None;
        self.key_down = false;
        self.sustained = false;
        // The sound switch keeps its own reference, so this never frees
        self.sound = None;
    }

    pub fn state(&self) -> VoiceState {
        if self.note.is_none() {
            return VoiceState::Free;
        }
        let releasing = match &self.engine {
            VoiceEngine::Sine(voice) => voice.is_releasing(),
            VoiceEngine::Sampler(voice) => voice.is_releasing(),
        };
        if releasing {
            VoiceState::Releasing
        } else {
            VoiceState::Active
        }
    }

    pub fn is_free(&self) -> bool {
        self.note.is_none()
    }

    pub fn is_active(&self) -> bool {
        self.note.is_some()
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn is_key_down(&self) -> bool {
        self.key_down
    }

    pub fn is_sustained(&self) -> bool {
        self.sustained
    }

    /// Key released while the sustain pedal holds the note.
    pub(crate) fn hold_for_sustain(&mut self) {
        self.key_down = false;
        self.sustained = true;
    }

    pub fn is_playing_sound(&self, sound: &Arc<SoundDefinition>) -> bool {
        self.sound
            .as_ref()
            .is_some_and(|playing| Arc::ptr_eq(playing, sound))
    }
}
