/*
Attack / Release Envelope
=========================

A two-ramp linear envelope. There is no decay stage and no sustain level:
the input layer only reports "the key is still being hit", so a note either
ramps up and holds at full level, or fades out.

Vocabulary
----------

  level         Current output value (0.0 to 1.0). Multiplies the raw
                oscillator sample.

  attack_rate   Level added per sample while the note is held. The reference
                0.1 reaches full level in 10 samples (≈0.23 ms at 44.1 kHz),
                just enough to avoid a click on trigger.

  release_rate  Level removed per sample once the note is stopped.
                0.001 fades over ~1 s (sustained), 0.05 over ~20 ms
                (staccato).

The Shape
---------

  Level
    1.0 ┐ ╱‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾╲
        │╱                  ╲
        │                    ╲
    0.0 └─────────────────────╲──→ Time
        attack     held       release → Finished

The State Machine
-----------------

    ┌────────┐  stop()   ┌───────────┐  level ≤ 0  ┌──────────┐
    │ Active │ ────────→ │ Releasing │ ──────────→ │ Finished │
    └────────┘ ←──────── └───────────┘             └──────────┘
                sustain()

  - stop() from Active or Releasing enters (or stays in) Releasing.
  - sustain() cancels a release in flight. The level is NOT reset: the
    attack ramp resumes from wherever the release left it.
  - Finished is terminal. Neither stop() nor sustain() leaves it.

Numeric Notes
-------------

Level is kept in f64 so a thousand 0.001 decrements land on zero within a
rounding error. A level at or below SILENCE counts as zero; this keeps the
"finished within ceil(1 / release_rate) samples" bound exact.
*/

/// Default attack increment per sample.
pub const DEFAULT_ATTACK_RATE: f64 = 0.1;

/// Levels at or below this are treated as silence.
const SILENCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Active,    // Ramping up or holding at full level
    Releasing, // Fading out after stop()
    Finished,  // Reached zero while releasing; terminal
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack_rate: f64,
    release_rate: f64,
    level: f64,
    state: EnvelopeState,
}

impl Envelope {
    /// New envelope at level zero, ready to ramp up.
    ///
    /// Rates that are not finite and positive fall back to the attack default
    /// or to an instant release. Rates above 1.0 are capped at 1.0.
    pub fn new(attack_rate: f64, release_rate: f64) -> Self {
        Self {
            attack_rate: sanitize_rate(attack_rate, DEFAULT_ATTACK_RATE),
            release_rate: sanitize_rate(release_rate, 1.0),
            level: 0.0,
            state: EnvelopeState::Active,
        }
    }

    /// Begin the release from the current level.
    pub fn stop(&mut self) {
        if self.state == EnvelopeState::Active {
            self.state = EnvelopeState::Releasing;
        }
    }

    /// Release at no slower than `rate`, starting now.
    ///
    /// Only ever speeds the release up. No effect once finished.
    pub fn hasten(&mut self, rate: f64) {
        let rate = sanitize_rate(rate, 1.0);
        if !self.is_finished() {
            self.release_rate = self.release_rate.max(rate);
        }
        self.stop();
    }

    /// Cancel a release in flight. No effect on a finished envelope.
    pub fn sustain(&mut self) {
        if self.state == EnvelopeState::Releasing {
            self.state = EnvelopeState::Active;
        }
    }

    /// Advance by one sample.
    ///
    /// Returns the level to apply to this sample, or `None` once the release
    /// has reached zero. The sample that returns `None` must not be output.
    #[inline]
    pub fn next_sample(&mut self) -> Option<f64> {
        match self.state {
            EnvelopeState::Finished => None,
            EnvelopeState::Releasing => {
                self.level -= self.release_rate;
                if self.level <= SILENCE {
                    self.level = 0.0;
                    self.state = EnvelopeState::Finished;
                    return None;
                }
                self.level = self.level.min(1.0);
                Some(self.level)
            }
            EnvelopeState::Active => {
                if self.level < 1.0 {
                    self.level = (self.level + self.attack_rate).clamp(0.0, 1.0);
                }
                Some(self.level)
            }
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn release_rate(&self) -> f64 {
        self.release_rate
    }

    pub fn is_releasing(&self) -> bool {
        self.state == EnvelopeState::Releasing
    }

    pub fn is_finished(&self) -> bool {
        self.state == EnvelopeState::Finished
    }

    /// Upper bound on the samples a release from full level can take.
    pub fn max_release_samples(&self) -> usize {
        (1.0 / self.release_rate).ceil() as usize
    }
}

fn sanitize_rate(rate: f64, fallback: f64) -> f64 {
    if rate.is_finite() && rate > 0.0 {
        rate.min(1.0)
    } else {
        fallback
    }
}
