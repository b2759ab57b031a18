// Purpose - audio buffers handed to and from the host, format conversions

pub mod converter;

/// One stereo sample pair, as produced by the voice backend per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub const SILENCE: Self = Self { left: 0.0, right: 0.0 };

    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    pub fn scale(self, gain: f32) -> Self {
        Self {
            left: self.left * gain,
            right: self.right * gain,
        }
    }
}

impl std::ops::Add for StereoFrame {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            left: self.left + rhs.left,
            right: self.right + rhs.right,
        }
    }
}

impl std::ops::AddAssign for StereoFrame {
    fn add_assign(&mut self, rhs: Self) {
        self.left += rhs.left;
        self.right += rhs.right;
    }
}

/// Planar stereo output of one block. Allocated by the host, written by the
/// renderer.
#[derive(Debug, Default, Clone)]
pub struct StereoOutput {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl StereoOutput {
    pub fn new(frames: usize) -> Self {
        Self {
            left: vec![0.0; frames],
            right: vec![0.0; frames],
        }
    }

    /// Frames both channels can hold.
    pub fn frames(&self) -> usize {
        self.left.len().min(self.right.len())
    }

    pub fn silence(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
    }

    /// Split `interleaved` (L R L R ...) into the two channels. Frames past
    /// the end of `interleaved` are zeroed.
    pub fn write_interleaved(&mut self, interleaved: &[f32]) {
        let frames = self.frames();
        let available = (interleaved.len() / 2).min(frames);

        for (i, pair) in interleaved.chunks_exact(2).take(available).enumerate() {
            self.left[i] = pair[0];
            self.right[i] = pair[1];
        }
        self.left[available..].fill(0.0);
        self.right[available..].fill(0.0);
    }

    /// Write the block back out as L R L R ..., as audio devices and WAV files
    /// expect.
    pub fn interleave_into(&self, destination: &mut [f32]) {
        for (i, pair) in destination.chunks_exact_mut(2).take(self.frames()).enumerate() {
            pair[0] = self.left[i];
            pair[1] = self.right[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deinterleaves_into_planar_channels() {
        let mut output = StereoOutput::new(3);
        output.write_interleaved(&[0.1, -0.1, 0.2, -0.2, 0.3, -0.3]);

        assert_eq!(output.left, vec![0.1, 0.2, 0.3]);
        assert_eq!(output.right, vec![-0.1, -0.2, -0.3]);
    }

    #[test]
    fn short_input_zeroes_remaining_frames() {
        let mut output = StereoOutput::new(3);
        output.left.fill(9.0);
        output.right.fill(9.0);

        output.write_interleaved(&[1.0, 2.0]);

        assert_eq!(output.left, vec![1.0, 0.0, 0.0]);
        assert_eq!(output.right, vec![2.0, 0.0, 0.0]);
    }

    #[test]
    fn interleave_round_trips() {
        let mut output = StereoOutput::new(2);
        output.left.copy_from_slice(&[0.5, 0.25]);
        output.right.copy_from_slice(&[-0.5, -0.25]);

        let mut interleaved = [0.0f32; 4];
        output.interleave_into(&mut interleaved);
        assert_eq!(interleaved, [0.5, -0.5, 0.25, -0.25]);
    }
}
