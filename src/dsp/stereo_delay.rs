use serde::{Deserialize, Serialize};

use crate::{dsp::delay::DelayLine, io::StereoFrame};

/*
Stereo Delay
============

Two delay lines, one per channel, with three ways of routing the feedback:

  Normal     L → L, R → R        two independent echoes
  Cross      L → R, R → L        echoes swap sides on every repeat
  PingPong   (L+R)/2 → L → R → L  a mono input that bounces across the field

Ratio skews the two delay times apart around `delay_ms`:

    left  = delay_ms · (1 - ratio/2)
    right = delay_ms · (1 + ratio/2)

The dry signal always passes at unity; `wet_level` scales the echoes.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StereoDelayMode {
    Normal,
    Cross,
    #[default]
    PingPong,
}

pub const MAX_DELAY_MS: f32 = 2_000.0;
const MAX_FEEDBACK: f32 = 0.95;

pub struct StereoDelay {
    left: DelayLine,
    right: DelayLine,
    mode: StereoDelayMode,
    sample_rate: f32,
    delay_ms: f32,
    ratio: f32,
    feedback: f32,
    wet_level: f32,
    left_samples: usize,
    right_samples: usize,
}

impl StereoDelay {
    /// Allocates both lines for the longest delay reachable at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        let sample_rate = sample_rate.max(1.0);
        // ratio can stretch one side to 1.5x the nominal delay
        let capacity = (MAX_DELAY_MS * 1.5 * sample_rate / 1000.0).ceil() as usize + 2;

        let mut delay = Self {
            left: DelayLine::new(capacity),
            right: DelayLine::new(capacity),
            mode: StereoDelayMode::default(),
            sample_rate,
            delay_ms: 350.0,
            ratio: 0.0,
            feedback: 0.0,
            wet_level: 0.0,
            left_samples: 1,
            right_samples: 1,
        };
        delay.update_times();
        delay
    }

    pub fn set_mode(&mut self, mode: StereoDelayMode) {
        self.mode = mode;
    }

    pub fn set_delay_ms(&mut self, delay_ms: f32) {
        self.delay_ms = if delay_ms.is_finite() {
            delay_ms.clamp(1.0, MAX_DELAY_MS)
        } else {
            MAX_DELAY_MS
        };
        self.update_times();
    }

    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio.clamp(0.0, 1.0);
        self.update_times();
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_FEEDBACK);
    }

    pub fn set_wet_level(&mut self, wet_level: f32) {
        self.wet_level = wet_level.clamp(0.0, 1.0);
    }

    pub fn delay_samples(&self) -> (usize, usize) {
        (self.left_samples, self.right_samples)
    }

    fn update_times(&mut self) {
        let to_samples = |ms: f32| ((ms * self.sample_rate / 1000.0).round() as usize).max(1);
        self.left_samples = to_samples(self.delay_ms * (1.0 - self.ratio * 0.5));
        self.right_samples = to_samples(self.delay_ms * (1.0 + self.ratio * 0.5));
    }

    #[inline]
    pub fn process(&mut self, input: StereoFrame) -> StereoFrame {
        let delayed_left = self.left.read(self.left_samples);
        let delayed_right = self.right.read(self.right_samples);
        let fb = self.feedback;

        let (into_left, into_right) = match self.mode {
            StereoDelayMode::Normal => (
                input.left + delayed_left * fb,
                input.right + delayed_right * fb,
            ),
            StereoDelayMode::Cross => (
                input.left + delayed_right * fb,
                input.right + delayed_left * fb,
            ),
            StereoDelayMode::PingPong => (
                (input.left + input.right) * 0.5 + delayed_right * fb,
                delayed_left * fb,
            ),
        };

        self.left.write(into_left);
        self.right.write(into_right);

        StereoFrame {
            left: input.left + delayed_left * self.wet_level,
            right: input.right + delayed_right * self.wet_level,
        }
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
