/// Circular delay line. The buffer is sized once up front; reads and writes
/// never allocate.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// `capacity` is the longest delay in samples the line can hold.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(2) + 1],
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Read the sample written `delay_samples` writes ago (clamped to 1..=capacity).
    #[inline]
    pub fn read(&self, delay_samples: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(1, len - 1);
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Fractional read, linearly interpolated between neighbouring samples.
    #[inline]
    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let max = (self.buffer.len() - 2) as f32;
        let delay = if delay_samples.is_finite() {
            delay_samples.clamp(1.0, max)
        } else {
            1.0
        };
        let whole = delay.floor();
        let frac = delay - whole;

        let a = self.read(whole as usize);
        let b = self.read(whole as usize + 1);
        a + (b - a) * frac
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Read `delay_samples` back, then write `sample`.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, delay_samples: usize) -> f32 {
        let delayed = self.read(delay_samples);
        self.write(sample);
        delayed
    }

    pub fn render(&mut self, buffer: &mut [f32], delay_samples: usize) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, delay_samples);
        }
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_comes_back_after_delay() {
        let mut line = DelayLine::new(16);
        let mut buffer = vec![0.0f32; 12];
        buffer[0] = 1.0;

        line.render(&mut buffer, 5);

        assert_eq!(buffer[5], 1.0);
        assert_eq!(buffer.iter().filter(|&&s| s != 0.0).count(), 1);
    }

    #[test]
    fn interpolated_read_blends_neighbours() {
        let mut line = DelayLine::new(8);
        line.write(1.0);
        line.write(0.0);

        // delay 1 -> 0.0, delay 2 -> 1.0
        assert!((line.read_interpolated(1.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn delay_is_clamped_to_capacity() {
        let mut line = DelayLine::new(4);
        for i in 0..4 {
            line.write(i as f32 + 1.0);
        }
        assert_eq!(line.read(100), line.read(4));
        assert_eq!(line.read(0), line.read(1));
    }
}
