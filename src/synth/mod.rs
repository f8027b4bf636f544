// Purpose: Voice management, polyphony, key-activity handling
// This layer sits above the dsp primitives and owns every sounding note

pub mod engine;
pub mod instrument;
pub mod mixer;
pub mod registry;
pub mod voice;
pub mod watchdog;

pub use engine::{ActiveKey, Engine, EngineState, Snapshot};
pub use instrument::{Instrument, InstrumentBank, INSTRUMENTS};
pub use registry::{Articulation, KeyId, Trigger, VoiceRegistry};
pub use voice::{Rendered, Voice};
pub use watchdog::{Sweep, Watchdog};
