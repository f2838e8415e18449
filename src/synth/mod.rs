// Purpose: Voice management, polyphony, MIDI handling
// Sits between the MIDI collector and the render callback

pub mod poly;
pub mod sampler;
pub mod sine;
pub mod sound;
pub mod voice;

pub use poly::PolySynth;
pub use sound::{DecodedAudio, NoteSet, SampledSound, SoundBank, SoundDefinition, SoundKind, SoundSwitch};
pub use voice::{Voice, VoiceKind, VoiceState};
