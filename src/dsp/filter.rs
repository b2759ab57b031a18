use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/*
| type              | passes          | rejects      |
| ----------------- | --------------- | ------------ |
| low-pass          | below cutoff    | above cutoff |
| high-pass         | above cutoff    | below cutoff |
| band-pass         | around cutoff   | outside      |
| band-stop (notch) | outside         | around cutoff|

Three topologies share one coefficient: the prewarped integrator gain

    g = tan(π · cutoff / sample_rate)

  OnePole        6 dB/oct TPT one-pole. Band modes chain a high-pass into a
                 low-pass at the same cutoff.
  StateVariable  12 dB/oct TPT SVF (Zavalishin). Q maps to damping k = 1/Q.
  Ladder         24 dB/oct: four one-poles in series with a tanh-limited
                 feedback path. Q maps to feedback 0..~3.8. Band modes mix
                 the stage outputs.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    #[default]
    LowPass,
    HighPass,
    BandPass,
    BandStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterAlgorithm {
    OnePole,
    StateVariable,
    #[default]
    Ladder,
}

const MIN_CUTOFF_HZ: f32 = 20.0;
const MIN_Q: f32 = 0.5;
const MAX_Q: f32 = 20.0;
const MAX_LADDER_FEEDBACK: f32 = 3.8;

pub struct Filter {
    algorithm: FilterAlgorithm,
    filter_type: FilterType,
    cutoff_hz: f32,
    q: f32,
    sample_rate: f32,

    // Derived coefficients
    g: f32,
    one_pole_gain: f32,
    k: f32,
    feedback: f32,

    // Integrator memories, meaning depends on the algorithm
    state: [f32; 4],
    ladder_out: f32,
}

impl Filter {
    pub fn new(algorithm: FilterAlgorithm, filter_type: FilterType, sample_rate: f32) -> Self {
        let mut filter = Self {
            algorithm,
            filter_type,
            cutoff_hz: 1_000.0,
            q: 0.707,
            sample_rate: sample_rate.max(1.0),
            g: 0.0,
            one_pole_gain: 0.0,
            k: 0.0,
            feedback: 0.0,
            state: [0.0; 4],
            ladder_out: 0.0,
        };
        filter.update_coefficients();
        filter
    }

    pub fn lowpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new(FilterAlgorithm::StateVariable, FilterType::LowPass, sample_rate);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn highpass(cutoff_hz: f32, sample_rate: f32) -> Self {
        let mut filter = Self::new(FilterAlgorithm::StateVariable, FilterType::HighPass, sample_rate);
        filter.set_cutoff(cutoff_hz);
        filter
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz;
        self.update_coefficients();
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q;
        self.update_coefficients();
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.update_coefficients();
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
    }

    pub fn set_algorithm(&mut self, algorithm: FilterAlgorithm) {
        if self.algorithm != algorithm {
            self.algorithm = algorithm;
            self.reset();
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn reset(&mut self) {
        self.state = [0.0; 4];
        self.ladder_out = 0.0;
    }

    fn update_coefficients(&mut self) {
        let nyquist_guard = self.sample_rate * 0.45;
        let cutoff = if self.cutoff_hz.is_finite() {
            self.cutoff_hz.clamp(MIN_CUTOFF_HZ, nyquist_guard.max(MIN_CUTOFF_HZ))
        } else {
            nyquist_guard
        };
        let q = if self.q.is_finite() { self.q.clamp(MIN_Q, MAX_Q) } else { MIN_Q };

        self.g = (PI * cutoff / self.sample_rate).tan();
        self.one_pole_gain = self.g / (1.0 + self.g);
        self.k = 1.0 / q;
        self.feedback = ((1.0 - 1.0 / q) * 4.0).clamp(0.0, MAX_LADDER_FEEDBACK);
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        match self.algorithm {
            FilterAlgorithm::OnePole => self.process_one_pole(sample),
            FilterAlgorithm::StateVariable => self.process_svf(sample),
            FilterAlgorithm::Ladder => self.process_ladder(sample),
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    #[inline]
    fn one_pole_stage(gain: f32, state: &mut f32, input: f32) -> f32 {
        let v = (input - *state) * gain;
        let lowpass = v + *state;
        *state = lowpass + v;
        lowpass
    }

    fn process_one_pole(&mut self, sample: f32) -> f32 {
        let gain = self.one_pole_gain;
        match self.filter_type {
            FilterType::LowPass => Self::one_pole_stage(gain, &mut self.state[0], sample),
            FilterType::HighPass => sample - Self::one_pole_stage(gain, &mut self.state[0], sample),
            FilterType::BandPass | FilterType::BandStop => {
                let highpass = sample - Self::one_pole_stage(gain, &mut self.state[0], sample);
                let bandpass = Self::one_pole_stage(gain, &mut self.state[1], highpass);
                if self.filter_type == FilterType::BandPass {
                    bandpass
                } else {
                    sample - bandpass
                }
            }
        }
    }

    fn process_svf(&mut self, sample: f32) -> f32 {
        let (g, k) = (self.g, self.k);
        let [ic1eq, ic2eq, ..] = &mut self.state;

        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - *ic2eq;
        let v1 = h * (*ic1eq + g * v3);
        let v2 = *ic2eq + g * v1;

        *ic1eq = 2.0 * v1 - *ic1eq;
        *ic2eq = 2.0 * v2 - *ic2eq;

        match self.filter_type {
            FilterType::LowPass => v2,
            FilterType::BandPass => k * v1,
            FilterType::HighPass => sample - k * v1 - v2,
            FilterType::BandStop => sample - k * v1,
        }
    }

    fn process_ladder(&mut self, sample: f32) -> f32 {
        let gain = self.one_pole_gain;
        // Feedback from the previous output, tanh keeps self-oscillation bounded
        let input = (sample - self.feedback * self.ladder_out).tanh();

        let y1 = Self::one_pole_stage(gain, &mut self.state[0], input);
        let y2 = Self::one_pole_stage(gain, &mut self.state[1], y1);
        let y3 = Self::one_pole_stage(gain, &mut self.state[2], y2);
        let y4 = Self::one_pole_stage(gain, &mut self.state[3], y3);
        self.ladder_out = y4;

        // Passband gain drops as feedback rises; compensate so Q doesn't thin the sound
        let makeup = 1.0 + self.feedback * 0.5;
        match self.filter_type {
            FilterType::LowPass => y4 * makeup,
            FilterType::HighPass => input - 4.0 * y1 + 6.0 * y2 - 4.0 * y3 + y4,
            FilterType::BandPass => 4.0 * (y2 - 2.0 * y3 + y4) * makeup,
            FilterType::BandStop => input - 4.0 * (y2 - 2.0 * y3 + y4),
        }
    }
}
