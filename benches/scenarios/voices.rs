//! Benchmarks for a single held voice, per instrument.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use piango::{
    dsp::Envelope,
    synth::{Voice, INSTRUMENTS},
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![[0.0f32; 2]; size];

        for instrument in INSTRUMENTS {
            // A2, typical left-hand note; sustained voices never finish
            let mut voice = Voice::new(
                instrument.waveform,
                110.0,
                SAMPLE_RATE,
                Envelope::new(0.1, 0.001),
                7,
            );
            group.bench_with_input(BenchmarkId::new(instrument.name, size), &size, |b, _| {
                b.iter(|| {
                    black_box(voice.render(black_box(&mut buffer)));
                })
            });
        }
    }

    group.finish();
}
