//! Benchmarks for oscillator waveform evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use piango::dsp::{NoiseSource, Waveform, TAU};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// Evaluate one block of a waveform at 440 Hz.
fn render(waveform: Waveform, phase: &mut f64, noise: &mut NoiseSource, out: &mut [f64]) {
    let step = TAU * 440.0 / SAMPLE_RATE;
    for sample in out.iter_mut() {
        *sample = waveform.sample(*phase, noise);
        *phase += step;
        if *phase >= TAU {
            *phase -= TAU;
        }
    }
}

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f64; size];
        let mut noise = NoiseSource::new(1);

        // Sine is the floor; additive stacks cost one sin() per partial
        for waveform in [
            Waveform::Sine,
            Waveform::Accordion,
            Waveform::Saw,
            Waveform::Fm,
            Waveform::SubBass,
            Waveform::Noise,
        ] {
            let mut phase = 0.0;
            let name = format!("{waveform:?}").to_lowercase();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    render(
                        black_box(waveform),
                        &mut phase,
                        &mut noise,
                        black_box(&mut buffer),
                    );
                })
            });
        }
    }

    group.finish();
}
