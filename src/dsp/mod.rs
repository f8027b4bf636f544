//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math; lifecycle and ownership live in [`crate::synth`].

/// Waveshaping helpers used by the distorting waveforms.
pub mod distortion;
/// Linear attack/release envelope.
pub mod envelope;
/// Per-voice pseudo-random source for noisy waveforms.
pub mod noise;
/// Oscillator waveforms.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeState};
pub use noise::NoiseSource;
pub use oscillator::Waveform;

/// One full oscillator cycle in radians.
pub const TAU: f64 = std::f64::consts::TAU;
