use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Persistent pseudo-random state owned by a single voice.
///
/// Seeded once when the voice is created and advanced once per noisy sample,
/// so consecutive samples are independent of the oscillator phase.
pub struct NoiseSource {
    rng: SmallRng,
}

impl NoiseSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Next bipolar sample in [-1.0, 1.0).
    #[inline]
    pub fn next_bipolar(&mut self) -> f64 {
        self.rng.gen_range(-1.0..1.0)
    }
}

impl std::fmt::Debug for NoiseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseSource").finish_non_exhaustive()
    }
}
