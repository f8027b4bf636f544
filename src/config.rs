//! Engine configuration.
//!
//! Every field has a default equal to the reference tuning, so an empty
//! YAML document is a valid config.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    dsp::envelope::DEFAULT_ATTACK_RATE,
    error::ConfigError,
    synth::{instrument::INSTRUMENTS, Articulation},
};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz (default: 44100)
    pub sample_rate: u32,
    /// Audio buffer length in milliseconds (default: 50)
    pub buffer_ms: u64,
    /// Envelope level added per sample while a note is held (default: 0.1)
    pub attack_rate: f64,
    /// Envelope level removed per sample for sustained notes (default: 0.001)
    pub sustained_release_rate: f64,
    /// Envelope level removed per sample for staccato notes (default: 0.05)
    pub staccato_release_rate: f64,
    /// Repeated key activity closer than this refreshes the note (default: 75)
    pub debounce_ms: u64,
    /// Inactivity before a sustained note is released (default: 600)
    pub sustained_timeout_ms: u64,
    /// Inactivity before a staccato note is released (default: 100)
    pub staccato_timeout_ms: u64,
    /// Watchdog / UI tick period in milliseconds (default: 30)
    pub tick_ms: u64,
    /// Optional cap on simultaneously rendered voices (default: unbounded)
    pub max_voices: Option<usize>,
    /// Instrument selected at startup (default: 0)
    pub instrument: usize,
    /// Seed for the per-voice noise generators
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            buffer_ms: 50,
            attack_rate: DEFAULT_ATTACK_RATE,
            sustained_release_rate: 0.001,
            staccato_release_rate: 0.05,
            debounce_ms: 75,
            sustained_timeout_ms: 600,
            staccato_timeout_ms: 100,
            tick_ms: 30,
            max_voices: None,
            instrument: 0,
            seed: 0x5EED,
        }
    }
}

impl EngineConfig {
    /// Load and validate a YAML config file.
    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML (used by `piango config`).
    #[cfg(feature = "serde")]
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check ranges the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(8_000..=192_000).contains(&self.sample_rate) {
            return Err(ConfigError::out_of_range(
                "sample_rate",
                "between 8000 and 192000",
                self.sample_rate,
            ));
        }
        if self.buffer_ms == 0 {
            return Err(ConfigError::out_of_range("buffer_ms", "positive", self.buffer_ms));
        }
        for (field, rate) in [
            ("attack_rate", self.attack_rate),
            ("sustained_release_rate", self.sustained_release_rate),
            ("staccato_release_rate", self.staccato_release_rate),
        ] {
            if !(rate.is_finite() && rate > 0.0 && rate <= 1.0) {
                return Err(ConfigError::out_of_range(field, "in (0, 1]", rate));
            }
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::out_of_range("tick_ms", "positive", self.tick_ms));
        }
        // Timeouts shorter than the debounce window would cut held keys.
        for (field, timeout) in [
            ("sustained_timeout_ms", self.sustained_timeout_ms),
            ("staccato_timeout_ms", self.staccato_timeout_ms),
        ] {
            if timeout <= self.debounce_ms {
                return Err(ConfigError::out_of_range(
                    field,
                    "longer than debounce_ms",
                    timeout,
                ));
            }
        }
        if self.max_voices == Some(0) {
            return Err(ConfigError::out_of_range("max_voices", "at least 1", 0));
        }
        if self.instrument >= INSTRUMENTS.len() {
            return Err(ConfigError::out_of_range(
                "instrument",
                "an index into the instrument catalog",
                self.instrument,
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Frames per audio buffer at the configured sample rate.
    pub fn buffer_frames(&self) -> u32 {
        ((self.sample_rate as u64 * self.buffer_ms) / 1000).max(1) as u32
    }

    pub fn release_rate(&self, articulation: Articulation) -> f64 {
        match articulation {
            Articulation::Sustained => self.sustained_release_rate,
            Articulation::Staccato => self.staccato_release_rate,
        }
    }

    /// Inactivity after which the watchdog releases a note.
    pub fn timeout(&self, articulation: Articulation) -> Duration {
        Duration::from_millis(match articulation {
            Articulation::Sustained => self.sustained_timeout_ms,
            Articulation::Staccato => self.staccato_timeout_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.buffer_frames(), 2205);
        assert_eq!(config.timeout(Articulation::Sustained), Duration::from_millis(600));
        assert_eq!(config.timeout(Articulation::Staccato), Duration::from_millis(100));
        assert_eq!(config.release_rate(Articulation::Staccato), 0.05);
    }

    #[test]
    fn rejects_bad_rates() {
        let config = EngineConfig {
            staccato_release_rate: 0.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("staccato_release_rate"));

        let config = EngineConfig {
            attack_rate: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_timeout_inside_debounce_window() {
        let config = EngineConfig {
            staccato_timeout_ms: 50,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("staccato_timeout_ms"));
    }

    #[test]
    fn rejects_unknown_instrument() {
        let config = EngineConfig {
            instrument: INSTRUMENTS.len(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_voice_limit() {
        let config = EngineConfig {
            max_voices: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    mod yaml {
        use super::*;
        use std::io::Write;
        use tempfile::NamedTempFile;

        #[test]
        fn load_partial_config() {
            let yaml = r#"
sample_rate: 48000
staccato_timeout_ms: 120
max_voices: 32
"#;
            let mut file = NamedTempFile::new().unwrap();
            file.write_all(yaml.as_bytes()).unwrap();

            let config = EngineConfig::load(file.path()).unwrap();
            assert_eq!(config.sample_rate, 48_000);
            assert_eq!(config.staccato_timeout_ms, 120);
            assert_eq!(config.max_voices, Some(32));
            assert_eq!(config.debounce_ms, 75);
        }

        #[test]
        fn load_rejects_invalid_values() {
            let mut file = NamedTempFile::new().unwrap();
            file.write_all(b"sample_rate: 10\n").unwrap();
            assert!(matches!(
                EngineConfig::load(file.path()),
                Err(ConfigError::OutOfRange { field: "sample_rate", .. })
            ));
        }

        #[test]
        fn load_rejects_unknown_fields() {
            let mut file = NamedTempFile::new().unwrap();
            file.write_all(b"sampel_rate: 48000\n").unwrap();
            assert!(matches!(
                EngineConfig::load(file.path()),
                Err(ConfigError::Parse(_))
            ));
        }

        #[test]
        fn yaml_round_trip() {
            let config = EngineConfig {
                instrument: 3,
                ..Default::default()
            };
            let yaml = config.to_yaml().unwrap();
            let parsed: EngineConfig = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(parsed, config);
        }
    }
}
