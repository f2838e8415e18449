#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const CC_SUSTAIN_PEDAL: u8 = 64;
pub const CC_ALL_SOUND_OFF: u8 = 120;
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// Centre position of the 14-bit pitch wheel.
pub const PITCH_WHEEL_CENTRE: u16 = 0x2000;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// 14-bit wheel position, 0x2000 is centre.
    PitchBend { channel: u8, value: u16 },
    ProgramChange { channel: u8, program: u8 },
    /// Anything the synth does not react to (aftertouch, clock, sysex...).
    Other,
}

impl MidiMessage {
    /// Decode a raw short message as delivered by a MIDI driver.
    ///
    /// Note-on with velocity zero is reported as note-off. Truncated
    /// messages yield `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let status = *bytes.first()?;
        if status < 0x80 {
            return None;
        }
        let channel = status & 0x0F;
        let data = |i: usize| bytes.get(i).map(|b| b & 0x7F);

        let message = match status & 0xF0 {
            0x80 => MidiMessage::NoteOff {
                channel,
                key: data(1)?,
                velocity: data(2)?,
            },
            0x90 => {
                let key = data(1)?;
                let velocity = data(2)?;
                if velocity == 0 {
                    MidiMessage::NoteOff {
                        channel,
                        key,
                        velocity: 0,
                    }
                } else {
                    MidiMessage::NoteOn {
                        channel,
                        key,
                        velocity,
                    }
                }
            }
            0xB0 => MidiMessage::ControlChange {
                channel,
                controller: data(1)?,
                value: data(2)?,
            },
            0xC0 => MidiMessage::ProgramChange {
                channel,
                program: data(1)?,
            },
            0xE0 => {
                let lsb = data(1)? as u16;
                let msb = data(2)? as u16;
                MidiMessage::PitchBend {
                    channel,
                    value: (msb << 7) | lsb,
                }
            }
            _ => MidiMessage::Other,
        };

        Some(message)
    }
}

/// A message positioned inside the block currently being rendered.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    /// Offset in samples from the start of the block.
    pub sample_offset: u32,
    pub message: MidiMessage,
}

impl MidiEvent {
    pub fn new(sample_offset: u32, message: MidiMessage) -> Self {
        Self {
            sample_offset,
            message,
        }
    }

    pub fn note_on(sample_offset: u32, key: u8, velocity: u8) -> Self {
        Self::new(
            sample_offset,
            MidiMessage::NoteOn {
                channel: 0,
                key,
                velocity,
            },
        )
    }

    pub fn note_off(sample_offset: u32, key: u8) -> Self {
        Self::new(
            sample_offset,
            MidiMessage::NoteOff {
                channel: 0,
                key,
                velocity: 0,
            },
        )
    }
}
