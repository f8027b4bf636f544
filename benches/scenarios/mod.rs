//! Real-world scenario benchmarks.
//!
//! These model actual playing: a single held note per instrument, and
//! chords with release tails summed by the engine.

mod mix;
mod voices;

pub use mix::bench_mix;
pub use voices::bench_voices;
