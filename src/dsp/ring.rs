/// Fixed-capacity circular sample buffer with a single write cursor.
///
/// This is the shared state shape behind all three effects: capacity is
/// derived from the sample rate once at construction and never changes, the
/// cursor always stays in `[0, capacity)`, and every read index is reduced
/// with a euclidean modulo so offsets computed from modulation can never
/// land outside the buffer, no matter their sign.
pub struct Ring {
    buffer: Vec<f32>,
    cursor: usize,
}

impl Ring {
    /// Allocate a zeroed ring holding `capacity` samples (at least 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            cursor: 0,
        }
    }

    /// Ring sized to hold `seconds` of audio at `sample_rate`.
    pub fn for_duration(sample_rate: f32, seconds: f32) -> Self {
        Self::new((sample_rate * seconds).round() as usize)
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Sample at `offset` relative to the cursor. Negative offsets reach
    /// back in time; any magnitude wraps.
    #[inline]
    pub fn read_offset(&self, offset: i64) -> f32 {
        let len = self.buffer.len() as i64;
        let idx = (self.cursor as i64 + offset).rem_euclid(len);
        self.buffer[idx as usize]
    }

    /// Sample currently under the cursor.
    #[inline]
    pub fn read(&self) -> f32 {
        self.buffer[self.cursor]
    }

    /// Overwrite the sample under the cursor without moving it.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.cursor] = sample;
    }

    /// Step the cursor forward one sample, wrapping at capacity.
    #[inline]
    pub fn advance(&mut self) {
        self.cursor += 1;
        if self.cursor == self.buffer.len() {
            self.cursor = 0;
        }
    }

    /// Zero the buffer and rewind the cursor. Used when an effect is toggled
    /// on so stale content can't bleed into the first blocks.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.cursor = 0;
    }

    /// True if every stored sample is exactly zero.
    pub fn is_silent(&self) -> bool {
        self.buffer.iter().all(|&s| s == 0.0)
    }
}
