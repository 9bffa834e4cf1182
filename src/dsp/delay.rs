/// Ring-buffer delay line with fractional (linearly interpolated) reads.
///
/// The buffer is sized once by [`DelayLine::allocate`] and never grows, so
/// reads and writes on the audio thread never allocate.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            write_pos: 0,
        }
    }

    /// Resize to `len` samples and clear. Not realtime safe.
    pub fn allocate(&mut self, len: usize) {
        self.buffer = vec![0.0; len.max(2)];
        self.write_pos = 0;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Read the sample written `delay` samples ago, interpolating between
    /// the two nearest whole offsets. `delay` is clamped to the buffer.
    pub fn read(&self, delay: f32) -> f32 {
        let len = self.buffer.len();
        if len == 0 {
            return 0.0;
        }

        let delay = delay.clamp(0.0, (len - 1) as f32);
        let whole = delay as usize;
        let frac = delay - whole as f32;

        let a = self.buffer[(self.write_pos + len - whole) % len];
        let b = self.buffer[(self.write_pos + len - (whole + 1).min(len - 1)) % len];
        a + (b - a) * frac
    }

    /// Write the next sample and advance.
    pub fn write(&mut self, sample: f32) {
        let len = self.buffer.len();
        if len == 0 {
            return;
        }
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % len;
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_sample_delay_reproduces_input() {
        let mut line = DelayLine::new();
        line.allocate(16);

        let mut out = Vec::new();
        for n in 0..10 {
            // Read before write: offset d returns the sample written d calls ago.
            out.push(line.read(3.0));
            line.write(if n == 0 { 1.0 } else { 0.0 });
        }
        assert_eq!(out[3], 1.0);
        assert_eq!(out.iter().filter(|&&s| s != 0.0).count(), 1);
    }

    #[test]
    fn fractional_delay_interpolates() {
        let mut line = DelayLine::new();
        line.allocate(8);
        line.write(1.0);
        line.write(0.0);
        // Offset 1 is the 0.0, offset 2 is the 1.0.
        assert!((line.read(1.5) - 0.5).abs() < 1e-6);
        assert!((line.read(1.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn delay_is_clamped_to_buffer() {
        let mut line = DelayLine::new();
        line.allocate(4);
        for _ in 0..4 {
            line.write(0.5);
        }
        assert!(line.read(100.0).is_finite());
        assert!(line.read(-3.0).is_finite());
    }

    #[test]
    fn unallocated_line_is_silent() {
        let mut line = DelayLine::new();
        line.write(1.0);
        assert_eq!(line.read(0.0), 0.0);
        assert!(line.is_empty());
    }

    #[test]
    fn reset_clears_history() {
        let mut line = DelayLine::new();
        line.allocate(8);
        line.write(1.0);
        line.reset();
        line.reset();
        assert!((0..8).all(|d| line.read(d as f32) == 0.0));
    }
}
