use crate::dsp::ring::Ring;

/*
Feedback Delay
==============

A single feedback delay line:

    out[i]  = in[i] + WET · buf[cursor]
    buf[cursor] = out[i] + buf[cursor] · feedback
    cursor += 1 (mod capacity)

Each pass of the cursor around the buffer is one echo period, so the echo
spacing equals the buffer length. An impulse comes back first at amplitude
WET, then decays by (WET + feedback) per cycle because the write mixes the
already-wet signal with the raw feedback tap.

The buffer is sized from the configured delay time once at construction.
Changing the delay time afterwards deliberately does not resize the buffer:
resizing would allocate on the audio thread and glitch the tail. The setter
exists for a future configuration surface and only takes effect on restart.
*/

const WET: f32 = 0.45;

/// Feedback delay line effect.
pub struct Delay {
    ring: Ring,
    time: f32, // configured delay in seconds; buffer length is fixed at new()
    feedback: f32,
}

impl Delay {
    pub fn new(sample_rate: f32, time: f32) -> Self {
        Self {
            ring: Ring::for_duration(sample_rate, time),
            time,
            feedback: 0.3,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    /// Record a new delay time. Takes effect the next time the effect is
    /// constructed; the live buffer keeps its length.
    pub fn set_time(&mut self, time: f32) {
        self.time = time.max(0.0);
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Echo spacing in samples (the fixed buffer length).
    pub fn period_samples(&self) -> usize {
        self.ring.capacity()
    }

    pub fn process(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            let delayed = self.ring.read();
            *sample += WET * delayed;
            self.ring.write(*sample + delayed * self.feedback);
            self.ring.advance();
        }
    }

    pub fn clear(&mut self) {
        self.ring.clear();
    }

    pub fn is_silent(&self) -> bool {
        self.ring.is_silent()
    }
}
