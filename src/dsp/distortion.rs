//! Distortion / Waveshaping
//!
//! The distorting waveforms in the oscillator bank are plain sine or saw
//! shapes pushed through one of the transfer functions below. Each function
//! works on a single sample so it can run inside the per-sample voice loop.
//!
//! # Transfer Functions
//!
//! Hard Clip:
//!   f(x) = clamp(x * drive, -threshold, threshold)
//!   - Harsh, buzzy distortion
//!   - Creates odd harmonics (like square wave)
//!
//! Saturate (tanh):
//!   f(x) = tanh(x * drive)
//!   - Smooth, warm saturation that rounds a sine toward a square
//!   - Output stays within [-1, 1]; large drive reaches the rails exactly
//!
//! Wavefold (sine fold):
//!   f(x) = sin(x * drive)
//!   - Once |x * drive| passes π/2 the signal folds back on itself
//!   - Metallic, complex harmonics that grow with drive
//!
//! Crush (quantise):
//!   f(x) = round(x * levels) / levels
//!   - Staircase output with `2 * levels + 1` steps
//!   - Lo-fi, bit-reduced character
//!
//! # Drive Values
//!
//!   1.0  = Clean (no distortion)
//!   2-4  = Warm saturation
//!   5-10 = Obvious distortion

/// Hard clipping - simply clamps the driven signal at a threshold.
#[inline]
pub fn hard_clip(sample: f64, drive: f64, threshold: f64) -> f64 {
    let x = sample * drive;
    x.clamp(-threshold, threshold)
}

/// Hyperbolic-tangent saturation.
#[inline]
pub fn saturate(sample: f64, drive: f64) -> f64 {
    (sample * drive).tanh()
}

/// Sine wavefolder. Output stays within [-1, 1] for any input.
#[inline]
pub fn wavefold(sample: f64, drive: f64) -> f64 {
    (sample * drive).sin()
}

/// Quantise a [-1, 1] signal onto `levels` steps per polarity.
///
/// `levels` of zero passes the signal through unchanged.
#[inline]
pub fn crush(sample: f64, levels: u32) -> f64 {
    if levels == 0 {
        return sample;
    }
    let steps = levels as f64;
    (sample * steps).round() / steps
}
