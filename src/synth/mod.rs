// Purpose: voice table, shared parameters, and the realtime engine that
// renders audio blocks inside the backend callback.

pub mod engine;
pub mod params;
pub mod status;
pub mod voice;

pub use engine::{Engine, EngineConfig};
pub use params::SynthParams;
pub use status::StatusSnapshot;
