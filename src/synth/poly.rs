use std::sync::Arc;

use crate::{
    config::{EngineConfig, VoiceStealing},
    io::{
        buffer::AudioBuffer,
        converter::velocity_to_gain,
        midi::{
            MidiEvent, MidiMessage, CC_ALL_NOTES_OFF, CC_ALL_SOUND_OFF, CC_SUSTAIN_PEDAL,
            PITCH_WHEEL_CENTRE,
        },
    },
    synth::{
        sound::{SoundBank, SoundDefinition, SoundKind},
        voice::{Voice, VoiceState},
    },
};

const MIDI_CHANNELS: usize = 16;

/*
Polyphonic Synth
================

A fixed pool of voices fed by sample-accurate MIDI events.

Rendering a block walks the event list in order. Voices are rendered
up to each event's offset, the event is applied, and rendering resumes
from there:

    start ─── render ───┬─ note-on ── render ──┬─ note-off ── render ─── end
                      offset a               offset b

Voices add into the buffer; the synth never clears it.

Allocation picks the first free voice whose kind accepts the active
sound. When none is free the note is dropped, or with
`VoiceStealing::StealOldest` the oldest releasing voice (else the oldest
voice of that kind) is cut off and reused.
*/
pub struct PolySynth {
    voices: Vec<Voice>,
    sounds: SoundBank,
    sample_rate: f64,
    stealing: VoiceStealing,
    note_counter: u64,
    sustain_down: [bool; MIDI_CHANNELS],
    pitch_wheel: [u16; MIDI_CHANNELS],
}

impl PolySynth {
    /// Build the voice pool. Sine and sampler voices are interleaved.
    pub fn new(config: &EngineConfig, sample_rate: f64, sounds: SoundBank) -> Self {
        let mut voices = Vec::with_capacity(config.total_voices());
        for i in 0..config.sine_voices.max(config.sampler_voices) {
            if i < config.sine_voices {
                voices.push(Voice::sine(sample_rate));
            }
            if i < config.sampler_voices {
                voices.push(Voice::sampler(sample_rate));
            }
        }

        Self {
            voices,
            sounds,
            sample_rate,
            stealing: config.stealing,
            note_counter: 0,
            sustain_down: [false; MIDI_CHANNELS],
            pitch_wheel: [PITCH_WHEEL_CENTRE; MIDI_CHANNELS],
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Changing rate cuts every voice; phase increments are rate-specific.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.clear_voices();
        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn sound_kind(&self) -> SoundKind {
        self.sounds.current().kind()
    }

    /// Render `num_samples` starting at `start_sample`, applying `events` at
    /// their offsets (relative to `start_sample`, sorted ascending).
    pub fn render_next_block(
        &mut self,
        buffer: &mut AudioBuffer,
        events: &[MidiEvent],
        start_sample: usize,
        num_samples: usize,
    ) {
        if self.sounds.refresh() {
            self.silence_stale_voices();
        }

        let end = start_sample + num_samples;
        let mut position = start_sample;

        for event in events {
            let offset = (start_sample + event.sample_offset as usize).clamp(position, end);
            if offset > position {
                self.render_voices(buffer, position, offset - position);
                position = offset;
            }
            self.handle_message(event.message);
        }

        if end > position {
            self.render_voices(buffer, position, end - position);
        }
    }

    fn render_voices(&mut self, buffer: &mut AudioBuffer, start_sample: usize, num_samples: usize) {
        for voice in &mut self.voices {
            if voice.is_active() {
                voice.render(buffer, start_sample, num_samples);
            }
        }
    }

    /// Cut voices still bound to a definition that is no longer active.
    fn silence_stale_voices(&mut self) {
        let current = self.sounds.current();
        for voice in &mut self.voices {
            if voice.is_active() && !voice.is_playing_sound(current) {
                voice.stop_note(0.0, false);
            }
        }
    }

    pub fn handle_message(&mut self, message: MidiMessage) {
        match message {
            MidiMessage::NoteOn {
                channel,
                key,
                velocity,
            } => {
                if velocity == 0 {
                    self.note_off(channel, key, 0.0);
                } else {
                    self.note_on(channel, key, velocity_to_gain(velocity));
                }
            }
            MidiMessage::NoteOff {
                channel,
                key,
                velocity,
            } => self.note_off(channel, key, velocity_to_gain(velocity)),
            MidiMessage::ControlChange {
                channel,
                controller,
                value,
            } => self.control_change(channel, controller, value),
            MidiMessage::PitchBend { channel, value } => {
                if let Some(wheel) = self.pitch_wheel.get_mut(channel as usize) {
                    *wheel = value;
                }
            }
            MidiMessage::ProgramChange { .. } | MidiMessage::Other => {}
        }
    }

    pub fn note_on(&mut self, channel: u8, note: u8, velocity: f32) {
        let sound = Arc::clone(self.sounds.current());
        if !sound.applies_to_note(note) {
            return;
        }

        // Retrigger: let the previous instance of this note ring out
        for voice in &mut self.voices {
            if voice.note() == Some(note) && voice.channel() == channel {
                voice.stop_note(1.0, true);
            }
        }

        let Some(index) = self.find_voice_for(&sound) else {
            return;
        };

        let pitch_wheel = self
            .pitch_wheel
            .get(channel as usize)
            .copied()
            .unwrap_or(PITCH_WHEEL_CENTRE);
        self.note_counter += 1;

        let voice = &mut self.voices[index];
        if voice.is_active() {
            voice.stop_note(0.0, false);
        }
        voice.start_note(&sound, channel, note, velocity, pitch_wheel, self.note_counter);
    }

    fn find_voice_for(&self, sound: &SoundDefinition) -> Option<usize> {
        let candidates = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.can_play(sound));

        if let Some((index, _)) = candidates.clone().find(|(_, v)| v.is_free()) {
            return Some(index);
        }

        match self.stealing {
            VoiceStealing::Drop => None,
            VoiceStealing::StealOldest => {
                let releasing = candidates
                    .clone()
                    .filter(|(_, v)| v.state() == VoiceState::Releasing)
                    .min_by_key(|(_, v)| v.age());

                releasing
                    .or_else(|| candidates.min_by_key(|(_, v)| v.age()))
                    .map(|(index, _)| index)
            }
        }
    }

    pub fn note_off(&mut self, channel: u8, note: u8, velocity: f32) {
        let sustained = self
            .sustain_down
            .get(channel as usize)
            .copied()
            .unwrap_or(false);

        for voice in &mut self.voices {
            if voice.note() == Some(note) && voice.channel() == channel && voice.is_key_down() {
                if sustained {
                    voice.hold_for_sustain();
                } else {
                    voice.stop_note(velocity, true);
                }
            }
        }
    }

    fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        match controller {
            CC_SUSTAIN_PEDAL => self.sustain_pedal(channel, value >= 64),
            CC_ALL_NOTES_OFF => self.channel_notes_off(channel, true),
            CC_ALL_SOUND_OFF => self.channel_notes_off(channel, false),
            _ => {}
        }
    }

    fn sustain_pedal(&mut self, channel: u8, down: bool) {
        let Some(pedal) = self.sustain_down.get_mut(channel as usize) else {
            return;
        };
        *pedal = down;

        if !down {
            for voice in &mut self.voices {
                if voice.channel() == channel && voice.is_sustained() {
                    voice.stop_note(0.0, true);
                }
            }
        }
    }

    fn channel_notes_off(&mut self, channel: u8, allow_tail_off: bool) {
        for voice in &mut self.voices {
            if voice.is_active() && voice.channel() == channel {
                voice.stop_note(0.0, allow_tail_off);
            }
        }
        if let Some(pedal) = self.sustain_down.get_mut(channel as usize) {
            *pedal = false;
        }
    }

    /// Stop every voice on every channel.
    pub fn all_notes_off(&mut self, allow_tail_off: bool) {
        for voice in &mut self.voices {
            voice.stop_note(0.0, allow_tail_off);
        }
        self.sustain_down = [false; MIDI_CHANNELS];
    }

    pub fn clear_voices(&mut self) {
        self.all_notes_off(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::sound::{DecodedAudio, SampledSound, SoundSwitch};
    use crate::synth::voice::VoiceKind;

    const SAMPLE_RATE: f64 = 44_100.0;

    fn synth(stealing: VoiceStealing) -> (PolySynth, SoundSwitch) {
        let config = EngineConfig::default().with_stealing(stealing);
        let (bank, switch) = SoundBank::new(SoundDefinition::Sine);
        (PolySynth::new(&config, SAMPLE_RATE, bank), switch)
    }

    fn flat_sample() -> SampledSound {
        let audio = DecodedAudio::mono(SAMPLE_RATE, vec![0.5; 44_100]);
        SampledSound::with_defaults("flat", audio).unwrap()
    }

    fn render(synth: &mut PolySynth, events: &[MidiEvent], len: usize) -> AudioBuffer {
        let mut buffer = AudioBuffer::new(1, len);
        synth.render_next_block(&mut buffer, events, 0, len);
        buffer
    }

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0, |acc, s| acc.max(s.abs()))
    }

    #[test]
    fn pool_interleaves_voice_kinds() {
        let (synth, _switch) = synth(VoiceStealing::Drop);
        let kinds: Vec<_> = synth.voices().iter().map(Voice::kind).collect();

        assert_eq!(kinds.len(), 8);
        assert_eq!(kinds[0], VoiceKind::Sine);
        assert_eq!(kinds[1], VoiceKind::Sampler);
        assert_eq!(kinds.iter().filter(|k| **k == VoiceKind::Sine).count(), 4);
    }

    #[test]
    fn a4_block_starts_at_zero_and_peaks_at_quarter_period() {
        let (mut synth, _switch) = synth(VoiceStealing::Drop);
        let buffer = render(&mut synth, &[MidiEvent::note_on(0, 69, 127)], 512);
        let out = buffer.channel(0);

        assert!(out[0].abs() < 1e-6);
        // 44100 / 440 / 4 = 25.06 samples to a quarter period
        assert!((out[25] - 0.15).abs() < 1e-3, "got {}", out[25]);
    }

    #[test]
    fn note_starts_at_its_sample_offset() {
        let (mut synth, _switch) = synth(VoiceStealing::Drop);
        let buffer = render(&mut synth, &[MidiEvent::note_on(100, 69, 127)], 256);
        let out = buffer.channel(0);

        assert!(out[..=100].iter().all(|&s| s == 0.0));
        assert!(out[101] > 0.0);
    }

    #[test]
    fn offsets_are_relative_to_start_sample() {
        let (mut synth, _switch) = synth(VoiceStealing::Drop);
        let mut buffer = AudioBuffer::new(1, 256);
        synth.render_next_block(&mut buffer, &[MidiEvent::note_on(10, 69, 127)], 128, 128);
        let out = buffer.channel(0);

        assert!(out[..=138].iter().all(|&s| s == 0.0));
        assert!(out[139] > 0.0);
    }

    #[test]
    fn two_notes_mix_additively() {
        let len = 1_024;
        let (mut a, _sa) = synth(VoiceStealing::Drop);
        let (mut b, _sb) = synth(VoiceStealing::Drop);
        let (mut both, _sc) = synth(VoiceStealing::Drop);

        let solo_a = render(&mut a, &[MidiEvent::note_on(0, 60, 100)], len);
        let solo_b = render(&mut b, &[MidiEvent::note_on(0, 67, 80)], len);
        let mixed = render(
            &mut both,
            &[MidiEvent::note_on(0, 60, 100), MidiEvent::note_on(0, 67, 80)],
            len,
        );

        for i in 0..len {
            let sum = solo_a.channel(0)[i] + solo_b.channel(0)[i];
            assert!((mixed.channel(0)[i] - sum).abs() < 1e-6, "sample {i}");
        }
    }

    #[test]
    fn tail_off_decreases_block_by_block_then_frees_voice() {
        let (mut synth, _switch) = synth(VoiceStealing::Drop);
        let block = 64;
        let mut buffer = AudioBuffer::new(1, block);
        let events = [MidiEvent::note_on(0, 69, 127), MidiEvent::note_off(0, 69)];

        synth.render_next_block(&mut buffer, &events, 0, block);
        let mut previous = peak(buffer.channel(0));
        assert!(previous > 0.0);

        for _ in 0..16 {
            buffer.clear();
            synth.render_next_block(&mut buffer, &[], 0, block);
            let current = peak(buffer.channel(0));
            if current == 0.0 {
                break;
            }
            assert!(current < previous, "{current} !< {previous}");
            previous = current;
        }

        assert_eq!(synth.active_voice_count(), 0);
    }

    #[test]
    fn switching_to_sampled_silences_sine_voices() {
        let (mut synth, mut switch) = synth(VoiceStealing::Drop);
        render(&mut synth, &[MidiEvent::note_on(0, 69, 127)], 128);
        assert_eq!(synth.active_voice_count(), 1);

        switch.use_sampled(flat_sample());
        let buffer = render(&mut synth, &[], 128);
        assert_eq!(synth.active_voice_count(), 0);
        assert_eq!(synth.sound_kind(), SoundKind::Sampled);
        assert!(buffer.channel(0).iter().all(|&s| s == 0.0));

        render(&mut synth, &[MidiEvent::note_on(0, 74, 127)], 128);
        let playing: Vec<_> = synth.voices().iter().filter(|v| v.is_active()).collect();
        assert_eq!(playing.len(), 1);
        assert_eq!(playing[0].kind(), VoiceKind::Sampler);
    }

    #[test]
    fn exhausted_pool_drops_new_notes_by_default() {
        let (mut synth, _switch) = synth(VoiceStealing::Drop);
        let events: Vec<_> = (60..65).map(|n| MidiEvent::note_on(0, n, 100)).collect();
        render(&mut synth, &events, 64);

        assert_eq!(synth.active_voice_count(), 4);
        assert!(synth.voices().iter().all(|v| v.note() != Some(64)));
    }

    #[test]
    fn steal_oldest_reuses_first_note() {
        let (mut synth, _switch) = synth(VoiceStealing::StealOldest);
        let events: Vec<_> = (60..65).map(|n| MidiEvent::note_on(0, n, 100)).collect();
        render(&mut synth, &events, 64);

        assert_eq!(synth.active_voice_count(), 4);
        assert!(synth.voices().iter().any(|v| v.note() == Some(64)));
        assert!(synth.voices().iter().all(|v| v.note() != Some(60)));
    }

    #[test]
    fn steal_prefers_releasing_voice() {
        let (mut synth, _switch) = synth(VoiceStealing::StealOldest);
        let mut events: Vec<_> = (60..64).map(|n| MidiEvent::note_on(0, n, 100)).collect();
        events.push(MidiEvent::note_off(0, 62));
        events.push(MidiEvent::note_on(0, 70, 100));
        render(&mut synth, &events, 64);

        assert!(synth.voices().iter().any(|v| v.note() == Some(60)));
        assert!(synth.voices().iter().all(|v| v.note() != Some(62)));
        assert!(synth.voices().iter().any(|v| v.note() == Some(70)));
    }

    #[test]
    fn retriggered_note_tails_off_previous_voice() {
        let (mut synth, _switch) = synth(VoiceStealing::Drop);
        let events = [MidiEvent::note_on(0, 60, 100), MidiEvent::note_on(32, 60, 100)];
        render(&mut synth, &events, 64);

        let states: Vec<_> = synth
            .voices()
            .iter()
            .filter(|v| v.note() == Some(60))
            .map(Voice::state)
            .collect();
        assert_eq!(states.len(), 2);
        assert!(states.contains(&VoiceState::Releasing));
        assert!(states.contains(&VoiceState::Active));
    }

    #[test]
    fn sustain_pedal_defers_note_off() {
        let (mut synth, _switch) = synth(VoiceStealing::Drop);
        let pedal = |value| {
            MidiEvent::new(
                0,
                MidiMessage::ControlChange {
                    channel: 0,
                    controller: CC_SUSTAIN_PEDAL,
                    value,
                },
            )
        };

        let events = [pedal(127), MidiEvent::note_on(0, 60, 100), MidiEvent::note_off(0, 60)];
        render(&mut synth, &events, 64);
        let voice = synth.voices().iter().find(|v| v.is_active()).unwrap();
        assert_eq!(voice.state(), VoiceState::Active);
        assert!(voice.is_sustained());

        render(&mut synth, &[pedal(0)], 64);
        let voice = synth.voices().iter().find(|v| v.is_active()).unwrap();
        assert_eq!(voice.state(), VoiceState::Releasing);
    }

    #[test]
    fn all_sound_off_is_immediate() {
        let (mut synth, _switch) = synth(VoiceStealing::Drop);
        let events = [
            MidiEvent::note_on(0, 60, 100),
            MidiEvent::note_on(0, 64, 100),
            MidiEvent::new(
                32,
                MidiMessage::ControlChange {
                    channel: 0,
                    controller: CC_ALL_SOUND_OFF,
                    value: 0,
                },
            ),
        ];
        let buffer = render(&mut synth, &events, 64);

        assert_eq!(synth.active_voice_count(), 0);
        assert!(buffer.channel(0)[32..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn sample_rate_change_cuts_voices() {
        let (mut synth, _switch) = synth(VoiceStealing::Drop);
        render(&mut synth, &[MidiEvent::note_on(0, 60, 100)], 64);
        synth.set_sample_rate(48_000.0);

        assert_eq!(synth.active_voice_count(), 0);
        assert_eq!(synth.sample_rate(), 48_000.0);
    }
}
