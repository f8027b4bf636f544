//! Benchmarks for the attack/release envelope.

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion};
use piango::dsp::Envelope;

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        // Attack then hold at full level
        let mut env = Envelope::new(0.1, 0.001);
        group.bench_with_input(BenchmarkId::new("held", size), &size, |b, &size| {
            b.iter(|| {
                for _ in 0..size {
                    black_box(env.next_sample());
                }
            })
        });

        // Slow release from full level (never finishes inside one block)
        let mut released = Envelope::new(1.0, 0.0001);
        released.next_sample();
        released.stop();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, &size| {
            b.iter_batched(
                || released.clone(),
                |mut env| {
                    for _ in 0..size {
                        black_box(env.next_sample());
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}
