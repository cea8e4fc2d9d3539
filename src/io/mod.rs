// Purpose: external interfaces — output-device discovery and the cpal
// stream that drives the engine.

pub mod devices;
pub mod output;
