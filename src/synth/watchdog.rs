//! Inactivity sweep.
//!
//! With no key-up signal, a note ends when its key stops reporting activity.
//! The sweep runs on a fixed cadence (30 ms reference) and releases any entry
//! that has been quiet for longer than its articulation's timeout. Entries
//! whose voice has finished fading are removed; this is how the registry
//! reclaims voices.
//!
//! Timeouts must comfortably exceed the terminal's key-repeat interval, or a
//! held key would be cut between repeats.

use std::time::{Duration, Instant};

use super::registry::{Articulation, VoiceRegistry};
use crate::config::EngineConfig;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sweep {
    /// Entries that entered their release during this sweep.
    pub stopped: usize,
    /// Entries removed because their voice had finished.
    pub reclaimed: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Watchdog {
    sustained_timeout: Duration,
    staccato_timeout: Duration,
}

impl Watchdog {
    pub fn new(sustained_timeout: Duration, staccato_timeout: Duration) -> Self {
        Self {
            sustained_timeout,
            staccato_timeout,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.timeout(Articulation::Sustained),
            config.timeout(Articulation::Staccato),
        )
    }

    pub fn threshold(&self, articulation: Articulation) -> Duration {
        match articulation {
            Articulation::Sustained => self.sustained_timeout,
            Articulation::Staccato => self.staccato_timeout,
        }
    }

    /// Release stale entries and drop the ones that have finished.
    pub fn sweep(&self, registry: &mut VoiceRegistry, now: Instant) -> Sweep {
        let mut report = Sweep::default();

        registry.retain(|_, entry| {
            if entry.inactivity(now) <= self.threshold(entry.articulation) {
                return true;
            }

            if !entry.voice.is_releasing() && !entry.voice.is_finished() {
                report.stopped += 1;
            }
            entry.voice.stop();

            if entry.voice.is_finished() {
                report.reclaimed += 1;
                return false;
            }
            true
        });

        report
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
