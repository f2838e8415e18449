// Purpose - external interfaces, format conversions

pub mod buffer;
pub mod collector;
pub mod converter;
pub mod midi;

pub use buffer::AudioBuffer;
pub use collector::{MidiEventCollector, MidiInputHandle};
pub use midi::{MidiEvent, MidiMessage};
