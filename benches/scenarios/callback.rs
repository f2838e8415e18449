//! Benchmarks for the render callback at the cpal boundary.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_scope::{
    analysis::waveform_channel,
    io::MidiMessage,
    synth::SoundDefinition,
    EngineConfig, RenderCallback,
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f64 = 48_000.0;

pub fn bench_callback(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/callback");
    let config = EngineConfig::default();

    for &size in BLOCK_SIZES {
        // UI never polls, so the waveform ring fills and the tap starts dropping
        let (tap, _view) = waveform_channel(config.waveform_ring_capacity, 1024);
        let (mut callback, handles) =
            RenderCallback::build(&config, SAMPLE_RATE, SoundDefinition::Sine, tap)
                .expect("valid config");
        callback
            .prepare(size, SAMPLE_RATE, 2)
            .expect("valid device settings");

        for key in [57, 60, 64, 69] {
            handles.midi.push_message(MidiMessage::NoteOn {
                channel: 0,
                key,
                velocity: 100,
            });
        }

        let mut data = vec![0.0f32; size * 2];
        group.bench_with_input(BenchmarkId::new("stereo", size), &size, |b, _| {
            b.iter(|| {
                callback.process_interleaved(black_box(&mut data), 2);
            })
        });
    }

    group.finish();
}
