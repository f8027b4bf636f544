use thiserror::Error;

/// Errors raised while loading or validating an [`EngineConfig`](crate::EngineConfig).
///
/// The voice engine itself never fails; this only covers startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ConfigError {
    pub(crate) fn out_of_range(
        field: &'static str,
        expected: &'static str,
        value: impl ToString,
    ) -> Self {
        Self::OutOfRange {
            field,
            expected,
            value: value.to_string(),
        }
    }
}
