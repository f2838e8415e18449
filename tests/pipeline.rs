//! End-to-end: MIDI from another thread, audio on this one, spectrum and
//! waveform read back on the UI side.

use std::thread;

use saavy_scope::{
    analysis::waveform_channel,
    io::{converter::midi_note_to_freq, MidiEvent},
    synth::SoundDefinition,
    EngineConfig, RenderCallback,
};

const SAMPLE_RATE: f64 = 48_000.0;

#[test]
fn note_from_midi_thread_shows_up_in_spectrum_and_waveform() {
    let config = EngineConfig::default();
    let (tap, mut view) = waveform_channel(config.waveform_ring_capacity, 1_024);
    let (mut callback, mut handles) =
        RenderCallback::build(&config, SAMPLE_RATE, SoundDefinition::Sine, tap).unwrap();
    callback.prepare(256, SAMPLE_RATE, 2).unwrap();

    let midi = handles.midi.clone();
    thread::spawn(move || midi.push_events(&[MidiEvent::note_on(0, 81, 127)], SAMPLE_RATE))
        .join()
        .unwrap();

    let mut data = vec![0.0; 256 * 2];
    for _ in 0..8 {
        callback.process_interleaved(&mut data, 2);
    }

    // Waveform sees the sum of both channels at 0.45 scale
    assert_eq!(view.poll(), 1_024 * 2);
    let peak = view.samples().fold(0.0f32, |acc, s| acc.max(s.abs()));
    assert!((peak - 2.0 * 0.45 * 0.15).abs() < 1e-3, "peak {peak}");

    let frame = handles.spectrum.frames().next().expect("one full window");
    let (bin, _) = frame
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .unwrap();
    let freq = handles.spectrum.bin_frequency(bin, SAMPLE_RATE);
    let expected = midi_note_to_freq(81);
    let bin_width = SAMPLE_RATE / handles.spectrum.fft_size() as f64;
    assert!((freq - expected).abs() < 2.0 * bin_width, "{freq} vs {expected}");
}

#[test]
fn sound_switch_mid_stream_does_not_disturb_rendering() {
    let config = EngineConfig::default();
    let (tap, _view) = waveform_channel(config.waveform_ring_capacity, 256);
    let (mut callback, handles) =
        RenderCallback::build(&config, SAMPLE_RATE, SoundDefinition::Sine, tap).unwrap();
    let mut sounds = handles.sounds;
    callback.prepare(128, SAMPLE_RATE, 1).unwrap();

    handles.midi.push_events(&[MidiEvent::note_on(0, 60, 100)], SAMPLE_RATE);
    let mut data = vec![0.0; 128];
    callback.process_interleaved(&mut data, 1);
    assert_eq!(callback.synth().active_voice_count(), 1);

    let switcher = thread::spawn(move || {
        for _ in 0..50 {
            sounds.use_sine();
        }
        sounds
    });
    for _ in 0..50 {
        callback.process_interleaved(&mut data, 1);
    }
    let mut sounds = switcher.join().unwrap();

    // The last installed definition is live and the old note was cut
    callback.process_interleaved(&mut data, 1);
    assert_eq!(callback.synth().active_voice_count(), 0);

    // Only the definition the synth holds and the new one stay alive
    sounds.use_sine();
    assert_eq!(sounds.retained(), 2);
}
