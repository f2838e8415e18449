//! Benchmarks for the sampler's linear envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_scope::dsp::{Envelope, EnvelopeParams};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        // Sustain phase (holding steady)
        let mut env = Envelope::new(48_000.0);
        env.set_params(EnvelopeParams::attack_release(0.001, 0.1));
        env.note_on();
        for _ in 0..200 {
            env.next_sample();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, &size| {
            b.iter(|| {
                let mut acc = 0.0;
                for _ in 0..size {
                    acc += env.next_sample();
                }
                black_box(acc)
            })
        });

        // Release phase, restarted whenever it runs out
        let mut env = Envelope::new(48_000.0);
        env.set_params(EnvelopeParams::attack_release(0.001, 10.0));
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, &size| {
            b.iter(|| {
                if !env.is_active() {
                    env.note_on();
                    env.next_sample();
                    env.note_off();
                }
                let mut acc = 0.0;
                for _ in 0..size {
                    acc += env.next_sample();
                }
                black_box(acc)
            })
        });
    }

    group.finish();
}
