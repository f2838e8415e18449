//! Benchmarks for complete synth blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_scope::{
    io::{AudioBuffer, MidiEvent},
    synth::{DecodedAudio, PolySynth, SampledSound, SoundBank, SoundDefinition},
    EngineConfig,
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f64 = 48_000.0;
const CHORD: [u8; 4] = [60, 64, 67, 71];

fn chord_events() -> Vec<MidiEvent> {
    CHORD.iter().map(|&n| MidiEvent::note_on(0, n, 100)).collect()
}

pub fn bench_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/synth");
    let config = EngineConfig::default();

    for &size in BLOCK_SIZES {
        let mut buffer = AudioBuffer::new(2, size);

        // === FOUR SINE VOICES ===
        let (bank, _switch) = SoundBank::new(SoundDefinition::Sine);
        let mut synth = PolySynth::new(&config, SAMPLE_RATE, bank);
        synth.render_next_block(&mut buffer, &chord_events(), 0, size);
        group.bench_with_input(BenchmarkId::new("sine_chord", size), &size, |b, &size| {
            b.iter(|| {
                buffer.clear();
                synth.render_next_block(black_box(&mut buffer), &[], 0, size);
            })
        });

        // === FOUR SAMPLER VOICES ===
        let samples = (0..(SAMPLE_RATE as usize * 10))
            .map(|i| (i as f32 * 0.03).sin())
            .collect();
        let sample = SampledSound::with_defaults("bench", DecodedAudio::mono(SAMPLE_RATE, samples))
            .expect("bench sample is valid");
        let (bank, _switch) = SoundBank::new(SoundDefinition::Sampled(sample));
        let mut synth = PolySynth::new(&config, SAMPLE_RATE, bank);
        let events = chord_events();
        group.bench_with_input(BenchmarkId::new("sampler_chord", size), &size, |b, &size| {
            b.iter(|| {
                buffer.clear();
                // Retrigger once the pool has drained
                let events: &[MidiEvent] = if synth.active_voice_count() == 0 {
                    &events
                } else {
                    &[]
                };
                synth.render_next_block(black_box(&mut buffer), events, 0, size);
            })
        });

        // === EVENT-DENSE BLOCK ===
        // A note-on and note-off every 16 samples splits the block
        let (bank, _switch) = SoundBank::new(SoundDefinition::Sine);
        let mut synth = PolySynth::new(&config, SAMPLE_RATE, bank);
        let dense: Vec<MidiEvent> = (0..size as u32 / 16)
            .flat_map(|i| {
                let note = 48 + (i % 24) as u8;
                [MidiEvent::note_on(i * 16, note, 90), MidiEvent::note_off(i * 16 + 8, note)]
            })
            .collect();
        group.bench_with_input(BenchmarkId::new("dense_events", size), &size, |b, &size| {
            b.iter(|| {
                buffer.clear();
                synth.render_next_block(black_box(&mut buffer), black_box(&dense), 0, size);
            })
        });
    }

    group.finish();
}
