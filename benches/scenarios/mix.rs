//! Benchmarks for full engine renders with many voices.
//!
//! Polyphony is unbounded by default, so these show how the render cost
//! grows when keys are mashed and release tails pile up.

use std::{
    hint::black_box,
    time::{Duration, Instant},
};

use criterion::{BenchmarkId, Criterion};
use piango::{synth::EngineState, Articulation, EngineConfig};

use crate::BLOCK_SIZES;

/// Engine with `held` registered keys and `tails` superseded voices.
fn engine_with(held: usize, tails: usize) -> EngineState {
    let mut state = EngineState::new(EngineConfig::default());
    let t0 = Instant::now();
    let mut block = [[0.0f32; 2]; 64];

    for i in 0..held {
        let frequency = 110.0 * (1.0 + i as f64 * 0.25);
        state.trigger_at(format!("k{i}"), frequency, Articulation::Sustained, t0);
    }
    state.render(&mut block);

    // Re-strike after the debounce window; each strike leaves a tail
    for i in 0..tails {
        let key = format!("k{}", i % held.max(1));
        let at = t0 + Duration::from_millis(100 * (i as u64 + 1));
        state.trigger_at(key, 220.0, Articulation::Sustained, at);
    }
    state
}

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![[0.0f32; 2]; size];

        for (label, held, tails) in [
            ("chord_3", 3, 0),
            ("both_hands_10", 10, 0),
            ("mashing_21_plus_tails", 21, 40),
        ] {
            let mut state = engine_with(held, tails);
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| {
                    state.render(black_box(&mut buffer));
                })
            });
        }

        // Interleaved output as the device callback uses it
        let mut state = engine_with(10, 0);
        let mut interleaved = vec![0.0f32; size * 2];
        group.bench_with_input(BenchmarkId::new("interleaved_stereo", size), &size, |b, _| {
            b.iter(|| {
                state.render_interleaved(black_box(&mut interleaved), 2);
            })
        });
    }

    group.finish();
}
