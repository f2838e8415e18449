//! Benchmarks for single sine and sampler voices.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_scope::{
    io::AudioBuffer,
    synth::{sampler::SamplerVoice, sine::SineVoice, DecodedAudio, SampledSound},
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f64 = 48_000.0;

fn bench_sample() -> SampledSound {
    let samples = (0..SAMPLE_RATE as usize)
        .map(|i| (i as f32 * 0.05).sin())
        .collect();
    SampledSound::with_defaults("bench", DecodedAudio::mono(SAMPLE_RATE, samples))
        .expect("bench sample is valid")
}

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/voice");
    let sample = bench_sample();

    for &size in BLOCK_SIZES {
        let mut buffer = AudioBuffer::new(2, size);

        // === SINE ===
        let mut sine = SineVoice::new(SAMPLE_RATE);
        sine.start_note(69, 1.0, 0x2000);
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, &size| {
            b.iter(|| {
                sine.render(black_box(&mut buffer), 0, size);
            })
        });

        // === SINE TAIL-OFF ===
        // Restarted whenever the tail dies
        let mut tail = SineVoice::new(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("sine_tail_off", size), &size, |b, &size| {
            b.iter(|| {
                if !tail.is_sounding() {
                    tail.start_note(69, 1.0, 0x2000);
                    tail.stop_note(0.0, true);
                }
                tail.render(black_box(&mut buffer), 0, size);
            })
        });

        // === SAMPLER, TRANSPOSED ===
        // Fractional read position exercises the interpolation
        let mut sampler = SamplerVoice::new(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("sampler", size), &size, |b, &size| {
            b.iter(|| {
                if !sampler.is_sounding() {
                    sampler.start_note(&sample, 67, 1.0, 0x2000);
                }
                sampler.render(&sample, black_box(&mut buffer), 0, size);
            })
        });
    }

    group.finish();
}
