#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{distortion, noise::NoiseSource, TAU};

/*
Oscillator Bank
===============

Every waveform here is a pure mapping from phase to amplitude:

    phase (radians, [0, 2π))  →  amplitude (pre-attenuated)

The voice owns the phase accumulator; a waveform never remembers anything
between calls. The one exception is `Noise`, which reads the next value from
the `NoiseSource` its voice carries. That source is seeded once per voice, so
the noise never collapses into a phase-locked pattern.

Families
--------

  Additive      Piano, Bell, Organ, Accordion, Sine
                Weighted sums of sine partials at integer multiples of the
                fundamental. Integer ratios keep the shape periodic in 2π, so
                the phase wrap never produces a discontinuity.

  Geometric     Square, Pulse, Saw, Triangle
                Built from the normalised phase n = phase / 2π. Naive (not
                band-limited): they alias at high pitches, which is part of
                their chiptune character.

  Modulation    Fm, RingMod, Ghost, Pwm
                Fm:      sin(p + k·sin(p·ratio))
                RingMod: triangle(p) × sin(p·ratio) with a high ratio
                Ghost:   harmonic sum × sin(p/2), a slow swell that is zero at
                         both ends of the cycle
                Pwm:     difference of two saws offset by the pulse width

  Shaped        Distortion, Crush, Wavefold, SubBass
                A sine or saw pushed through a transfer function from
                `dsp::distortion`.

  Noise         Half sine, half white noise.

Headroom
--------

Voices are summed without any limiter, so each waveform is scaled by an
attenuation constant between 0.09 and 0.3. Every waveform satisfies
|amplitude| ≤ 0.3 for all phases.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Piano,
    Bell,
    Organ,
    Accordion,
    Square,
    Pulse,
    Saw,
    Triangle,
    Fm,
    Distortion,
    Crush,
    RingMod,
    Ghost,
    Wavefold,
    SubBass,
    Pwm,
    Noise,
}

/// Largest absolute amplitude any waveform produces.
pub const PEAK_AMPLITUDE: f64 = 0.3;

const FM_INDEX: f64 = 1.5;
const FM_RATIO: f64 = 2.0;
const RING_RATIO: f64 = 7.0;
const PULSE_WIDTH: f64 = 0.3;
const CRUSH_LEVELS: u32 = 4;

impl Waveform {
    pub const ALL: [Waveform; 18] = [
        Waveform::Sine,
        Waveform::Piano,
        Waveform::Bell,
        Waveform::Organ,
        Waveform::Accordion,
        Waveform::Square,
        Waveform::Pulse,
        Waveform::Saw,
        Waveform::Triangle,
        Waveform::Fm,
        Waveform::Distortion,
        Waveform::Crush,
        Waveform::RingMod,
        Waveform::Ghost,
        Waveform::Wavefold,
        Waveform::SubBass,
        Waveform::Pwm,
        Waveform::Noise,
    ];

    /// Instantaneous amplitude at `phase`.
    ///
    /// `noise` is only consumed by [`Waveform::Noise`].
    #[inline]
    pub fn sample(self, phase: f64, noise: &mut NoiseSource) -> f64 {
        let p = phase;
        match self {
            Waveform::Sine => p.sin() * 0.3,
            Waveform::Piano => {
                let v = p.sin() + (p * 2.0).sin() * 0.5 + (p * 3.0).sin() * 0.2;
                v * 0.15
            }
            Waveform::Bell => {
                let v = p.sin()
                    + (p * 3.0).sin() * 0.6
                    + (p * 5.0).sin() * 0.35
                    + (p * 8.0).sin() * 0.2;
                v * 0.12
            }
            Waveform::Organ => {
                let v = p.sin()
                    + (p * 2.0).sin() * 0.5
                    + (p * 4.0).sin() * 0.25
                    + (p * 8.0).sin() * 0.125;
                v * 0.1
            }
            Waveform::Accordion => {
                let v = p.sin()
                    + (p * 2.0).sin() * 0.8
                    + (p * 3.0).sin() * 0.6
                    + (p * 4.0).sin() * 0.4
                    + (p * 6.0).sin() * 0.2;
                v * 0.09
            }
            Waveform::Square => {
                if p.sin() >= 0.0 {
                    0.1
                } else {
                    -0.1
                }
            }
            Waveform::Pulse => {
                // 25% duty cycle
                if p.rem_euclid(TAU) < TAU * 0.25 {
                    0.1
                } else {
                    -0.1
                }
            }
            Waveform::Saw => saw(normalized(p)) * 0.1,
            Waveform::Triangle => triangle(normalized(p)) * 0.2,
            Waveform::Fm => (p + FM_INDEX * (p * FM_RATIO).sin()).sin() * 0.2,
            Waveform::Distortion => {
                let threshold = 0.6;
                distortion::hard_clip(p.sin(), 3.0, threshold) / threshold * 0.12
            }
            Waveform::Crush => distortion::crush(saw(normalized(p)), CRUSH_LEVELS) * 0.1,
            Waveform::RingMod => triangle(normalized(p)) * (p * RING_RATIO).sin() * 0.25,
            Waveform::Ghost => {
                // Slow envelope over one period; sin(p/2) is zero at both ends of
                // the phase wrap, where a cosine would jump
                let harmonics = p.sin() + (p * 2.0).sin() * 0.5 + (p * 3.0).sin() * 0.25;
                harmonics * (p * 0.5).sin() * 0.15
            }
            Waveform::Wavefold => distortion::wavefold(p.sin(), 3.0) * 0.2,
            Waveform::SubBass => distortion::saturate(p.sin(), 2.5) * 0.3,
            Waveform::Pwm => {
                let n = normalized(p);
                let pulse = saw(n) - saw((n + PULSE_WIDTH).fract()) + (2.0 * PULSE_WIDTH - 1.0);
                pulse * 0.1
            }
            Waveform::Noise => {
                let tone = p.sin();
                (tone * 0.5 + noise.next_bipolar() * 0.5) * 0.15
            }
        }
    }

    /// True for waveforms whose output depends on more than the phase.
    pub fn is_noisy(self) -> bool {
        matches!(self, Waveform::Noise)
    }
}

/// Phase in radians → position in the cycle, [0, 1).
#[inline]
fn normalized(phase: f64) -> f64 {
    phase.rem_euclid(TAU) / TAU
}

/// Rising ramp from -1 to 1 over one cycle.
#[inline]
fn saw(n: f64) -> f64 {
    2.0 * n - 1.0
}

/// Triangle starting at 1, reaching -1 mid-cycle.
#[inline]
fn triangle(n: f64) -> f64 {
    2.0 * (2.0 * n - 1.0).abs() - 1.0
}
