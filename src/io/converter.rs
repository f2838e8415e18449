/// Convert a MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69, twelve-tone equal temperament.
pub fn midi_note_to_freq(note: u8) -> f64 {
    440.0 * 2.0_f64.powf((note as f64 - 69.0) / 12.0)
}

/// MIDI velocity (0..=127) as a linear gain in 0.0..=1.0.
pub fn velocity_to_gain(velocity: u8) -> f32 {
    velocity.min(127) as f32 / 127.0
}
