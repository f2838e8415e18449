//! Benchmarks for the spectrum tap and frame production.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_scope::analysis::SpectralAnalyzer;

use crate::BLOCK_SIZES;

pub fn bench_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/spectrum");

    // Audio side: samples per block into the FIFO, frames dropped when pending
    for &size in BLOCK_SIZES {
        let (_analyzer, mut tap) = SpectralAnalyzer::new(11, 512).expect("valid geometry");
        group.bench_with_input(BenchmarkId::new("push_block", size), &size, |b, &size| {
            b.iter(|| {
                for i in 0..size {
                    tap.push_sample(black_box(i as f32 * 1e-3));
                }
            })
        });
    }

    // UI side: one full frame per tick
    for order in [10u32, 11, 12] {
        let (mut analyzer, mut tap) = SpectralAnalyzer::new(order, 512).expect("valid geometry");
        let fft_size = 1usize << order;
        group.bench_with_input(BenchmarkId::new("produce_frame", fft_size), &fft_size, |b, &n| {
            b.iter(|| {
                for i in 0..n {
                    tap.push_sample((i as f32 * 0.1).sin());
                }
                black_box(analyzer.produce_frame().map(|frame| frame[0]))
            })
        });
    }

    group.finish();
}
