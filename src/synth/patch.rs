use serde::{Deserialize, Serialize};

use crate::dsp::{
    filter::{FilterAlgorithm, FilterType},
    oscillator::Waveform,
    stereo_delay::{StereoDelayMode, MAX_DELAY_MS},
};

/// Master gain range a patch may ask for.
pub const GAIN_DB_RANGE: (f32, f32) = (-96.0, 12.0);
/// Longest envelope stage, in milliseconds.
pub const MAX_STAGE_MS: f32 = 60_000.0;

/// `value` clamped to `min..=max`, or `fallback` when it is NaN or infinite.
fn bounded(value: f32, fallback: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Sound of the subtractive backend. Times are milliseconds, gains linear
/// unless the name says dB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthPatch {
    /// One voice at a time, new notes glide the envelope when legato is on.
    pub mono_mode: bool,
    pub oscillators: [OscillatorPatch; 2],
    /// Both oscillators on every voice detuned around the pitch by `spread`.
    pub unison: bool,
    pub spread: f32,
    pub gain_db: f32,
    /// Semitones reached at full bend.
    pub pitch_bend_range: f32,
    pub envelope: EnvelopePatch,
    pub filter: FilterPatch,
    pub delay: DelayPatch,
    pub chorus: ChorusPatch,
}

impl Default for SynthPatch {
    fn default() -> Self {
        Self {
            mono_mode: false,
            oscillators: [OscillatorPatch::default(); 2],
            unison: false,
            spread: 0.5,
            gain_db: -3.0,
            pitch_bend_range: 2.0,
            envelope: EnvelopePatch::default(),
            filter: FilterPatch::default(),
            delay: DelayPatch::default(),
            chorus: ChorusPatch::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorPatch {
    pub waveform: Waveform,
    pub cents: f32,
    pub pulse_width: f32,
    pub gain: f32,
}

impl Default for OscillatorPatch {
    fn default() -> Self {
        Self {
            waveform: Waveform::Saw,
            cents: 0.0,
            pulse_width: 0.5,
            gain: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopePatch {
    pub attack_ms: f32,
    pub decay_ms: f32,
    pub sustain: f32,
    pub release_ms: f32,
    pub legato: bool,
    pub retrigger: bool,
}

impl Default for EnvelopePatch {
    fn default() -> Self {
        Self {
            attack_ms: 10.0,
            decay_ms: 100.0,
            sustain: 0.707,
            release_ms: 5_000.0,
            legato: true,
            retrigger: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterPatch {
    pub cutoff_hz: f32,
    pub q: f32,
    pub filter_type: FilterType,
    pub algorithm: FilterAlgorithm,
}

impl Default for FilterPatch {
    fn default() -> Self {
        Self {
            cutoff_hz: 1_200.0,
            q: 2.0,
            filter_type: FilterType::LowPass,
            algorithm: FilterAlgorithm::Ladder,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayPatch {
    pub enabled: bool,
    pub mode: StereoDelayMode,
    pub delay_ms: f32,
    pub ratio: f32,
    pub feedback: f32,
    pub wet_level: f32,
}

impl Default for DelayPatch {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: StereoDelayMode::PingPong,
            delay_ms: 350.0,
            ratio: 0.2,
            feedback: 0.7,
            wet_level: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChorusPatch {
    pub enabled: bool,
    pub frequency: f32,
    pub depth_ms: f32,
    pub feedback: f32,
    pub wet_level: f32,
}

impl Default for ChorusPatch {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: 0.8,
            depth_ms: 2.0,
            feedback: 0.2,
            wet_level: 0.5,
        }
    }
}

impl SynthPatch {
    /// Dry patch: no delay, no chorus. Handy when a test needs to see exactly
    /// what the voices produce.
    pub fn dry() -> Self {
        Self {
            delay: DelayPatch {
                enabled: false,
                ..DelayPatch::default()
            },
            chorus: ChorusPatch {
                enabled: false,
                ..ChorusPatch::default()
            },
            ..Self::default()
        }
    }
}

/*
Patches arrive from TOML, so every number is untrusted. `sanitized` is applied
before a patch reaches the voices: finite values are clamped into range,
NaN and infinities fall back to the field's default.
*/

impl SynthPatch {
    pub fn sanitized(&self) -> Self {
        let default = Self::default();
        let (min_db, max_db) = GAIN_DB_RANGE;
        Self {
            mono_mode: self.mono_mode,
            oscillators: [self.oscillators[0].sanitized(), self.oscillators[1].sanitized()],
            unison: self.unison,
            spread: bounded(self.spread, default.spread, 0.0, 1.0),
            gain_db: bounded(self.gain_db, default.gain_db, min_db, max_db),
            pitch_bend_range: bounded(self.pitch_bend_range, default.pitch_bend_range, 0.0, 48.0),
            envelope: self.envelope.sanitized(),
            filter: self.filter.sanitized(),
            delay: self.delay.sanitized(),
            chorus: self.chorus.sanitized(),
        }
    }
}

impl OscillatorPatch {
    fn sanitized(&self) -> Self {
        let default = Self::default();
        Self {
            waveform: self.waveform,
            cents: bounded(self.cents, default.cents, -4_800.0, 4_800.0),
            pulse_width: bounded(self.pulse_width, default.pulse_width, 0.01, 0.99),
            gain: bounded(self.gain, default.gain, 0.0, 1.0),
        }
    }
}

impl EnvelopePatch {
    fn sanitized(&self) -> Self {
        let default = Self::default();
        Self {
            attack_ms: bounded(self.attack_ms, default.attack_ms, 0.0, MAX_STAGE_MS),
            decay_ms: bounded(self.decay_ms, default.decay_ms, 0.0, MAX_STAGE_MS),
            sustain: bounded(self.sustain, default.sustain, 0.0, 1.0),
            release_ms: bounded(self.release_ms, default.release_ms, 0.0, MAX_STAGE_MS),
            ..*self
        }
    }
}

impl FilterPatch {
    fn sanitized(&self) -> Self {
        let default = Self::default();
        Self {
            cutoff_hz: bounded(self.cutoff_hz, default.cutoff_hz, 20.0, 20_000.0),
            q: bounded(self.q, default.q, 0.5, 20.0),
            ..*self
        }
    }
}

impl DelayPatch {
    fn sanitized(&self) -> Self {
        let default = Self::default();
        Self {
            delay_ms: bounded(self.delay_ms, default.delay_ms, 1.0, MAX_DELAY_MS),
            ratio: bounded(self.ratio, default.ratio, 0.0, 1.0),
            feedback: bounded(self.feedback, default.feedback, 0.0, 0.95),
            wet_level: bounded(self.wet_level, default.wet_level, 0.0, 1.0),
            ..*self
        }
    }
}

impl ChorusPatch {
    fn sanitized(&self) -> Self {
        let default = Self::default();
        Self {
            frequency: bounded(self.frequency, default.frequency, 0.01, 10.0),
            depth_ms: bounded(self.depth_ms, default.depth_ms, 0.0, 10.0),
            feedback: bounded(self.feedback, default.feedback, 0.0, 0.9),
            wet_level: bounded(self.wet_level, default.wet_level, 0.0, 1.0),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_fields_fall_back_to_defaults() {
        let mut patch = SynthPatch::default();
        patch.gain_db = f32::NAN;
        patch.spread = f32::INFINITY;
        patch.envelope.sustain = f32::NAN;
        patch.envelope.release_ms = f32::NEG_INFINITY;
        patch.oscillators[1].gain = f32::NAN;
        patch.delay.feedback = f32::NAN;

        let clean = patch.sanitized();
        let default = SynthPatch::default();
        assert_eq!(clean.gain_db, default.gain_db);
        assert_eq!(clean.spread, default.spread);
        assert_eq!(clean.envelope.sustain, default.envelope.sustain);
        assert_eq!(clean.envelope.release_ms, default.envelope.release_ms);
        assert_eq!(clean.oscillators[1].gain, 1.0);
        assert_eq!(clean.delay.feedback, default.delay.feedback);
    }

    #[test]
    fn extreme_fields_are_clamped() {
        let mut patch = SynthPatch::default();
        patch.gain_db = 1_000.0;
        patch.pitch_bend_range = -5.0;
        patch.envelope.sustain = 3.0;
        patch.filter.q = 500.0;
        patch.delay.delay_ms = 1e9;
        patch.chorus.feedback = 4.0;

        let clean = patch.sanitized();
        assert_eq!(clean.gain_db, GAIN_DB_RANGE.1);
        assert_eq!(clean.pitch_bend_range, 0.0);
        assert_eq!(clean.envelope.sustain, 1.0);
        assert_eq!(clean.filter.q, 20.0);
        assert_eq!(clean.delay.delay_ms, MAX_DELAY_MS);
        assert_eq!(clean.chorus.feedback, 0.9);
    }

    #[test]
    fn default_patch_is_unchanged() {
        assert_eq!(SynthPatch::default().sanitized(), SynthPatch::default());
    }
}
