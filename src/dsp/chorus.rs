use std::f32::consts::{FRAC_PI_2, TAU};

use crate::{dsp::delay::DelayLine, io::StereoFrame};

/*
Stereo Chorus
=============

Mixes the dry signal with a short, LFO-modulated copy of itself. As the delay
time moves, the copy drifts slightly sharp and flat, which reads as several
players on the same part.

    delay(t) = base_delay + depth · sin(phase)

Each side has its own delay line. The right LFO runs a quarter cycle behind
the left so the two copies never detune in step, which widens the image.

  frequency   LFO speed in Hz. 0.5 - 1.5 Hz is the classic range.
  depth       Modulation swing in ms around the 20 ms base delay.
  feedback    Portion of the wet signal fed back into the line.
  wet_level   Blend of the modulated copy, dry always passes at unity minus wet.
*/

const BASE_DELAY_MS: f32 = 20.0;
const MAX_DEPTH_MS: f32 = 10.0;
const MAX_FEEDBACK: f32 = 0.9;

pub struct StereoChorus {
    left: DelayLine,
    right: DelayLine,
    sample_rate: f32,
    lfo_phase: f32,
    frequency: f32,
    depth_ms: f32,
    feedback: f32,
    wet_level: f32,
}

impl StereoChorus {
    pub fn new(sample_rate: f32) -> Self {
        let sample_rate = sample_rate.max(1.0);
        let capacity =
            ((BASE_DELAY_MS + MAX_DEPTH_MS) * sample_rate / 1000.0).ceil() as usize + 2;

        Self {
            left: DelayLine::new(capacity),
            right: DelayLine::new(capacity),
            sample_rate,
            lfo_phase: 0.0,
            frequency: 0.8,
            depth_ms: 2.0,
            feedback: 0.0,
            wet_level: 0.5,
        }
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency.clamp(0.01, 10.0);
    }

    pub fn set_depth_ms(&mut self, depth_ms: f32) {
        self.depth_ms = depth_ms.clamp(0.0, MAX_DEPTH_MS);
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_FEEDBACK);
    }

    pub fn set_wet_level(&mut self, wet_level: f32) {
        self.wet_level = wet_level.clamp(0.0, 1.0);
    }

    fn delay_samples(&self, phase: f32) -> f32 {
        let delay_ms = BASE_DELAY_MS + phase.sin() * self.depth_ms;
        (delay_ms * self.sample_rate / 1000.0).max(1.0)
    }

    #[inline]
    pub fn process(&mut self, input: StereoFrame) -> StereoFrame {
        let left_delay = self.delay_samples(self.lfo_phase);
        let right_delay = self.delay_samples(self.lfo_phase + FRAC_PI_2);

        let wet_left = self.left.read_interpolated(left_delay);
        let wet_right = self.right.read_interpolated(right_delay);

        self.left.write(input.left + wet_left * self.feedback);
        self.right.write(input.right + wet_right * self.feedback);

        self.lfo_phase += TAU * self.frequency / self.sample_rate;
        if self.lfo_phase >= TAU {
            self.lfo_phase -= TAU;
        }

        let dry = 1.0 - self.wet_level;
        StereoFrame {
            left: input.left * dry + wet_left * self.wet_level,
            right: input.right * dry + wet_right * self.wet_level,
        }
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.lfo_phase = 0.0;
    }
}
