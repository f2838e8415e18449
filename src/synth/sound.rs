use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::error::{Error, Result};

/// Root note of the bundled demo sample.
pub const DEFAULT_ROOT_NOTE: u8 = 74;
pub const DEFAULT_ATTACK_SECONDS: f64 = 0.1;
pub const DEFAULT_RELEASE_SECONDS: f64 = 0.1;
pub const DEFAULT_MAX_LENGTH_SECONDS: f64 = 10.0;

/// Zero frames appended after the sample so interpolation can read `pos + 1`.
const INTERPOLATION_PADDING: usize = 4;

/// Which family of voices a sound needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    Sine,
    Sampled,
}

/// Set of MIDI note numbers, one bit per note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoteSet(u128);

impl NoteSet {
    pub fn all() -> Self {
        Self(u128::MAX)
    }

    pub fn none() -> Self {
        Self(0)
    }

    pub fn range(notes: std::ops::RangeInclusive<u8>) -> Self {
        let mut set = Self::none();
        for note in notes {
            set.insert(note);
        }
        set
    }

    pub fn insert(&mut self, note: u8) {
        if note < 128 {
            self.0 |= 1u128 << note;
        }
    }

    pub fn contains(&self, note: u8) -> bool {
        note < 128 && self.0 & (1u128 << note) != 0
    }
}

/// Decoded PCM handed over by whatever loaded the asset.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: f64,
    /// Planar channels, all assumed to share the first channel's length.
    pub channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    pub fn mono(sample_rate: f64, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels: vec![samples],
        }
    }

    pub fn frames(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }
}

/// A recorded waveform played back at a pitch relative to its root note.
#[derive(Debug, Clone)]
pub struct SampledSound {
    name: String,
    data: Vec<Vec<f32>>,
    length: usize,
    source_sample_rate: f64,
    root_note: u8,
    attack_seconds: f64,
    release_seconds: f64,
    notes: NoteSet,
}

impl SampledSound {
    /// Build a sampled sound, keeping at most two channels and at most
    /// `max_length_seconds` of audio.
    pub fn new(
        name: impl Into<String>,
        audio: DecodedAudio,
        notes: NoteSet,
        root_note: u8,
        attack_seconds: f64,
        release_seconds: f64,
        max_length_seconds: f64,
    ) -> Result<Self> {
        let name = name.into();
        if !(audio.sample_rate > 0.0) {
            return Err(Error::InvalidSampleRate(audio.sample_rate));
        }

        let max_frames = (max_length_seconds.max(0.0) * audio.sample_rate) as usize;
        let length = audio.frames().min(max_frames);
        if length == 0 {
            return Err(Error::EmptySample(name));
        }

        let data = audio
            .channels
            .into_iter()
            .take(2)
            .map(|mut channel| {
                channel.truncate(length);
                channel.resize(length + INTERPOLATION_PADDING, 0.0);
                channel
            })
            .collect();

        Ok(Self {
            name,
            data,
            length,
            source_sample_rate: audio.sample_rate,
            root_note,
            attack_seconds: attack_seconds.max(0.0),
            release_seconds: release_seconds.max(0.0),
            notes,
        })
    }

    /// The demo layout: root note 74, 0.1 s attack and release, 10 s cap,
    /// playable on every note.
    pub fn with_defaults(name: impl Into<String>, audio: DecodedAudio) -> Result<Self> {
        Self::new(
            name,
            audio,
            NoteSet::all(),
            DEFAULT_ROOT_NOTE,
            DEFAULT_ATTACK_SECONDS,
            DEFAULT_RELEASE_SECONDS,
            DEFAULT_MAX_LENGTH_SECONDS,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Playable frames, excluding interpolation padding.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn num_channels(&self) -> usize {
        self.data.len()
    }

    pub fn source_sample_rate(&self) -> f64 {
        self.source_sample_rate
    }

    pub fn root_note(&self) -> u8 {
        self.root_note
    }

    pub fn attack_seconds(&self) -> f64 {
        self.attack_seconds
    }

    pub fn release_seconds(&self) -> f64 {
        self.release_seconds
    }

    pub fn applies_to_note(&self, note: u8) -> bool {
        self.notes.contains(note)
    }

    #[inline]
    pub fn frame(&self, channel: usize, index: usize) -> f32 {
        self.data
            .get(channel)
            .and_then(|samples| samples.get(index))
            .copied()
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub enum SoundDefinition {
    Sine,
    Sampled(SampledSound),
}

impl SoundDefinition {
    pub fn kind(&self) -> SoundKind {
        match self {
            SoundDefinition::Sine => SoundKind::Sine,
            SoundDefinition::Sampled(_) => SoundKind::Sampled,
        }
    }

    pub fn applies_to_note(&self, note: u8) -> bool {
        match self {
            SoundDefinition::Sine => true,
            SoundDefinition::Sampled(sound) => sound.applies_to_note(note),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SoundDefinition::Sine => "sine",
            SoundDefinition::Sampled(sound) => sound.name(),
        }
    }
}

/*
Sound swapping
==============

The UI thread picks the sound, the audio thread plays it. They share one
`ArcSwap` slot:

  SoundSwitch (UI)  ──store──►  ArcSwap<SoundDefinition>  ◄──load──  SoundBank (audio)

Neither side blocks. The audio side checks the slot once per block and
caches the `Arc` it found, so a swap is heard from the next block on.

Freeing a sample buffer is an allocator call, which the audio thread must
never make. `SoundSwitch` therefore keeps every definition it installed
until it is the only owner left; the audio thread can only ever drop a
non-final reference.
*/

/// Audio-thread view of the active sound.
pub struct SoundBank {
    slot: Arc<ArcSwap<SoundDefinition>>,
    current: Arc<SoundDefinition>,
}

impl SoundBank {
    pub fn new(initial: SoundDefinition) -> (Self, SoundSwitch) {
        let initial = Arc::new(initial);
        let slot = Arc::new(ArcSwap::new(Arc::clone(&initial)));

        let bank = Self {
            slot: Arc::clone(&slot),
            current: Arc::clone(&initial),
        };
        let switch = SoundSwitch {
            slot,
            installed: vec![initial],
        };

        (bank, switch)
    }

    /// Pick up a pending swap. Returns true when the active sound changed.
    pub fn refresh(&mut self) -> bool {
        let latest = self.slot.load();
        if Arc::ptr_eq(&*latest, &self.current) {
            return false;
        }
        self.current = Arc::clone(&*latest);
        true
    }

    pub fn current(&self) -> &Arc<SoundDefinition> {
        &self.current
    }
}

/// UI-side handle that installs new sounds.
pub struct SoundSwitch {
    slot: Arc<ArcSwap<SoundDefinition>>,
    installed: Vec<Arc<SoundDefinition>>,
}

impl SoundSwitch {
    pub fn set(&mut self, sound: SoundDefinition) {
        let sound = Arc::new(sound);
        log::info!("switching sound to `{}`", sound.name());

        self.installed.push(Arc::clone(&sound));
        self.slot.store(sound);

        // Only definitions nobody else references are released here
        self.installed.retain(|sound| Arc::strong_count(sound) > 1);
    }

    pub fn use_sine(&mut self) {
        self.set(SoundDefinition::Sine);
    }

    pub fn use_sampled(&mut self, sound: SampledSound) {
        self.set(SoundDefinition::Sampled(sound));
    }

    pub fn current_kind(&self) -> SoundKind {
        self.slot.load().kind()
    }

    pub fn current_name(&self) -> String {
        self.slot.load().name().to_owned()
    }

    /// Definitions still kept alive on behalf of the audio thread.
    pub fn retained(&self) -> usize {
        self.installed.len()
    }
}
