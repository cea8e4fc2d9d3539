pub mod dsp;
pub mod io;
pub mod keys; // Key identifiers, key-to-pitch table, held-key state
pub mod synth; // Voice table, shared parameters, realtime engine

/// Largest block the engine renders in one call. The cpal callback chunks
/// whatever the backend hands it into pieces of at most this size.
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Floor for envelope stage durations so degenerate settings never divide by zero.
pub(crate) const MIN_TIME: f64 = 1.0 / 48_000.0;
