use crate::dsp::{Envelope, EnvelopeState, NoiseSource, Waveform, TAU};

/// Lowest frequency a voice will play; non-positive requests land here.
pub const MIN_FREQUENCY: f64 = 1.0;

/// Result of a block render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendered {
    /// Leading frames of the block that hold valid output.
    pub frames: usize,
    /// False once the voice has faded out; the caller should drop it.
    pub live: bool,
}

/// A single sounding note: oscillator binding, phase accumulator, envelope.
///
/// The waveform is bound once at creation and never changes, even if the
/// selected instrument does.
#[derive(Debug)]
pub struct Voice {
    frequency: f64,
    phase: f64,
    step: f64,
    waveform: Waveform,
    envelope: Envelope,
    noise: NoiseSource,
}

impl Voice {
    /// New voice at level zero.
    ///
    /// `frequency` is clamped into `[MIN_FREQUENCY, sample_rate / 2]`;
    /// `seed` initialises the voice's private noise generator.
    pub fn new(
        waveform: Waveform,
        frequency: f64,
        sample_rate: f64,
        envelope: Envelope,
        seed: u64,
    ) -> Self {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            crate::config::DEFAULT_SAMPLE_RATE as f64
        };
        let nyquist = (sample_rate / 2.0).max(MIN_FREQUENCY);
        let frequency = if frequency.is_finite() && frequency > 0.0 {
            frequency.clamp(MIN_FREQUENCY, nyquist)
        } else {
            MIN_FREQUENCY
        };

        Self {
            frequency,
            phase: 0.0,
            step: TAU * frequency / sample_rate,
            waveform,
            envelope,
            noise: NoiseSource::new(seed),
        }
    }

    /// Begin the release. No effect once finished.
    pub fn stop(&mut self) {
        self.envelope.stop();
    }

    /// Release at no slower than `rate` per sample.
    pub fn fade_out(&mut self, rate: f64) {
        self.envelope.hasten(rate);
    }

    /// Cancel a pending release. A finished voice stays finished.
    pub fn sustain(&mut self) {
        self.envelope.sustain();
    }

    /// Fill `out` with stereo frames (the same signal on both channels).
    ///
    /// Stops early at the sample where the release reaches zero: only
    /// `frames` leading frames are valid and `live` is false. Rendering a
    /// finished voice is a caller bug.
    pub fn render(&mut self, out: &mut [[f32; 2]]) -> Rendered {
        debug_assert!(!self.is_finished(), "rendered a finished voice");
        if self.is_finished() {
            return Rendered {
                frames: 0,
                live: false,
            };
        }

        for (i, frame) in out.iter_mut().enumerate() {
            let raw = self.waveform.sample(self.phase, &mut self.noise);

            let Some(level) = self.envelope.next_sample() else {
                return Rendered {
                    frames: i,
                    live: false,
                };
            };

            let sample = (raw * level) as f32;
            *frame = [sample, sample];

            self.phase += self.step;
            if self.phase >= TAU {
                self.phase -= TAU;
            }
        }

        Rendered {
            frames: out.len(),
            live: true,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Current envelope level (0.0 - 1.0).
    pub fn level(&self) -> f64 {
        self.envelope.level()
    }

    pub fn state(&self) -> EnvelopeState {
        self.envelope.state()
    }

    pub fn release_rate(&self) -> f64 {
        self.envelope.release_rate()
    }

    pub fn is_releasing(&self) -> bool {
        self.envelope.is_releasing()
    }

    pub fn is_finished(&self) -> bool {
        self.envelope.is_finished()
    }
}
