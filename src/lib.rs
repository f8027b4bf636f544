pub mod config;
pub mod dsp; // Oscillators, envelope, waveshaping
pub mod error;
pub mod synth; // Voices, registry, watchdog, mixing

pub use config::EngineConfig;
pub use error::ConfigError;
pub use synth::{Articulation, Engine, KeyId, Snapshot};

pub const MAX_BLOCK_SIZE: usize = 2048;
