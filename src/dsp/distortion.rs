//! Output-stage soft clipping.
//!
//! Summing several full-scale voices (plus effect tails) can push the mix
//! well past ±1.0. Rather than hard-clipping at full scale, the output stage
//! runs every sample through tanh: linear near zero, smoothly compressing
//! peaks, asymptotic to ±1. tanh(0) = 0, so silence passes through exactly.

/// Soft clip one sample with tanh saturation.
#[inline]
pub fn soft_clip(sample: f32) -> f32 {
    sample.tanh()
}

/// Scale a buffer by `gain` and soft clip it in place, returning the peak
/// magnitude of the clipped result.
pub fn scale_and_clip(buffer: &mut [f32], gain: f32) -> f32 {
    let mut peak = 0.0f32;
    for sample in buffer.iter_mut() {
        *sample = soft_clip(*sample * gain);
        peak = peak.max(sample.abs());
    }
    peak
}
