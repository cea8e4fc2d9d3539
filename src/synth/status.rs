//! Status snapshot published by the audio thread.
//!
//! The callback must not print or lock, so it pushes one `Copy` snapshot per
//! block into an rtrb ring and the UI polls at its own pace. A full ring
//! just drops the snapshot; the next block publishes a fresher one anyway.

use crate::dsp::Waveform;

/// One block's worth of engine status, allocation-free.
#[derive(Debug, Clone, Copy)]
pub struct StatusSnapshot {
    /// Effective held-note mask (one bit per `keys::KEYMAP` index).
    pub held: u32,
    /// Peak magnitude of the clipped output block.
    pub peak: f32,
    /// Master amplitude the block was rendered with.
    pub amplitude: f32,
    /// Active waveform.
    pub waveform: Waveform,
    pub chorus_on: bool,
    pub delay_on: bool,
    pub reverb_on: bool,
    /// False once every envelope has decayed; effect tails may still ring.
    pub sounding: bool,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            held: 0,
            peak: 0.0,
            amplitude: 0.5,
            waveform: Waveform::Sine,
            chorus_on: false,
            delay_on: false,
            reverb_on: false,
            sounding: false,
        }
    }
}
