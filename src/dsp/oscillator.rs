use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

/*
Audio Oscillator
================

A phase accumulator: `phase` walks from 0.0 to 1.0 once per cycle and each
waveform maps that phase to an amplitude in [-1, 1].

    phase += frequency / sample_rate      (wrapped back into [0, 1))

  Sine      sin(2π·phase)                 pure tone, no harmonics
  Saw       2·phase - 1                   all harmonics, bright
  Triangle  1 - 4·|phase - 0.5|           odd harmonics, falling fast
  Square    +1 below pulse width, else -1 odd harmonics (at 50% width)
  Noise     xorshift32 mapped to [-1, 1]  no pitch

The naive shapes alias at high pitches. That is acceptable for a voice
backend whose output goes straight through a low-pass filter.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    #[default]
    Saw,
    Triangle,
    Square,
    Noise,
}

pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f32,
    pulse_width: f32,
    noise_state: u32,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
            pulse_width: 0.5,
            noise_state: 0x9E37_79B9,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Saw)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn noise() -> Self {
        Self::new(Waveform::Noise)
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Duty cycle for the square wave, kept away from 0 and 1 so it never goes DC.
    pub fn set_pulse_width(&mut self, pulse_width: f32) {
        self.pulse_width = pulse_width.clamp(0.01, 0.99);
    }

    /// Restart the cycle (used on hard note retrigger).
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let value = match self.waveform {
            Waveform::Sine => (TAU * self.phase).sin(),
            Waveform::Saw => 2.0 * self.phase - 1.0,
            Waveform::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
            Waveform::Square => {
                if self.phase < self.pulse_width {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Noise => self.next_noise(),
        };

        self.phase += frequency / sample_rate;
        if self.phase >= 1.0 || self.phase < 0.0 {
            self.phase -= self.phase.floor();
        }

        value
    }

    pub fn render(&mut self, destination: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in destination.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    #[inline]
    fn next_noise(&mut self) -> f32 {
        let mut x = self.noise_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.noise_state = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::converter::midi_note_to_freq;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let frequency = midi_note_to_freq(69.0); // A4 = 440Hz

        let mut osc = OscillatorBlock::sine();
        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, frequency, sample_rate);

        // sample n should be sin(2pi f n / sr)
        let sample_index = 12;
        let expected = (TAU * frequency * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn waveforms_stay_in_range() {
        for waveform in [
            Waveform::Sine,
            Waveform::Saw,
            Waveform::Triangle,
            Waveform::Square,
            Waveform::Noise,
        ] {
            let mut osc = OscillatorBlock::new(waveform);
            let mut buffer = vec![0.0f32; 1024];
            osc.render(&mut buffer, 1_234.5, 48_000.0);
            assert!(
                buffer.iter().all(|s| (-1.0..=1.0).contains(s)),
                "{waveform:?} left [-1, 1]"
            );
        }
    }

    #[test]
    fn pulse_width_shapes_square_duty_cycle() {
        let mut osc = OscillatorBlock::square();
        osc.set_pulse_width(0.25);

        // 100 Hz at 10 kHz = exactly 100 samples per cycle
        let mut buffer = vec![0.0f32; 100];
        osc.render(&mut buffer, 100.0, 10_000.0);

        let high = buffer.iter().filter(|&&s| s > 0.0).count();
        assert!((24..=26).contains(&high), "high samples: {high}");
    }
}
