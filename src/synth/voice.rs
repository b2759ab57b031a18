use crate::{
    dsp::{
        envelope::Envelope,
        filter::Filter,
        oscillator::OscillatorBlock,
    },
    io::{
        converter::{midi_note_to_freq, velocity_to_gain},
        StereoFrame,
    },
    synth::patch::SynthPatch,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Key held, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release phase
}

/// Per-oscillator values shared by every voice, recomputed by the synth when
/// the patch or pitch bend changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    /// Frequency multiplier from detune, unison spread and bend.
    pub osc_ratio: [f32; 2],
    pub osc_gain: [f32; 2],
    /// -1 hard left, 0 centre, 1 hard right.
    pub osc_pan: [f32; 2],
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            osc_ratio: [1.0; 2],
            osc_gain: [0.5; 2],
            osc_pan: [0.0; 2],
        }
    }
}

/// One note's worth of signal chain: two oscillators into a stereo filter,
/// shaped by an amplitude envelope.
pub struct SynthVoice {
    note: u8,
    velocity_gain: f32,
    state: VoiceState,
    age: u64,
    sample_rate: f32,
    base_freq: f32,
    oscillators: [OscillatorBlock; 2],
    envelope: Envelope,
    filter_left: Filter,
    filter_right: Filter,
}

impl SynthVoice {
    pub fn new(sample_rate: f32) -> Self {
        let mut voice = Self {
            note: 0,
            velocity_gain: 0.0,
            state: VoiceState::Free,
            age: 0,
            sample_rate,
            base_freq: 0.0,
            oscillators: [OscillatorBlock::sawtooth(), OscillatorBlock::sawtooth()],
            envelope: Envelope::new(sample_rate),
            filter_left: Filter::lowpass(1_000.0, sample_rate),
            filter_right: Filter::lowpass(1_000.0, sample_rate),
        };
        voice.configure(&SynthPatch::default());
        voice
    }

    pub fn configure(&mut self, patch: &SynthPatch) {
        for (osc, settings) in self.oscillators.iter_mut().zip(&patch.oscillators) {
            osc.set_waveform(settings.waveform);
            osc.set_pulse_width(settings.pulse_width);
        }

        let env = &patch.envelope;
        self.envelope.set_adsr(
            env.attack_ms / 1000.0,
            env.decay_ms / 1000.0,
            env.sustain,
            env.release_ms / 1000.0,
        );
        self.envelope.set_retrigger(env.retrigger);

        for filter in [&mut self.filter_left, &mut self.filter_right] {
            filter.set_algorithm(patch.filter.algorithm);
            filter.set_filter_type(patch.filter.filter_type);
            filter.set_cutoff(patch.filter.cutoff_hz);
            filter.set_q(patch.filter.q);
        }
    }

    pub fn start(&mut self, note: u8, velocity: u8, age: u64) {
        if self.state == VoiceState::Free {
            // Fresh voice: no filter ringing or phase carried over from the last note
            self.filter_left.reset();
            self.filter_right.reset();
            for osc in &mut self.oscillators {
                osc.reset();
            }
        }
        self.set_note(note, velocity);
        self.age = age;
        self.state = VoiceState::Active;
        self.envelope.note_on();
    }

    /// Change pitch without re-gating the envelope (mono legato).
    pub fn glide_to(&mut self, note: u8, velocity: u8, age: u64) {
        self.set_note(note, velocity);
        self.age = age;
        self.state = VoiceState::Active;
    }

    fn set_note(&mut self, note: u8, velocity: u8) {
        self.note = note;
        self.velocity_gain = velocity_to_gain(velocity);
        self.base_freq = midi_note_to_freq(note as f32);
    }

    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            self.envelope.note_off();
        }
    }

    /// Stop immediately, skipping the release.
    pub fn kill(&mut self) {
        self.envelope.reset();
        self.filter_left.reset();
        self.filter_right.reset();
        self.free();
    }

    #[inline]
    pub fn next_frame(&mut self, params: &VoiceParams) -> StereoFrame {
        if self.state == VoiceState::Free {
            return StereoFrame::SILENCE;
        }

        let mut mix = StereoFrame::SILENCE;
        for (i, osc) in self.oscillators.iter_mut().enumerate() {
            let sample = osc.next_sample(self.base_freq * params.osc_ratio[i], self.sample_rate)
                * params.osc_gain[i];
            let pan = params.osc_pan[i].clamp(-1.0, 1.0);
            mix.left += sample * ((1.0 - pan) * 0.5).sqrt();
            mix.right += sample * ((1.0 + pan) * 0.5).sqrt();
        }

        let amp = self.envelope.next_sample() * self.velocity_gain;
        let frame = StereoFrame {
            left: self.filter_left.process(mix.left) * amp,
            right: self.filter_right.process(mix.right) * amp,
        };

        if self.state == VoiceState::Releasing && !self.envelope.is_active() {
            self.free();
        }

        frame
    }

    fn free(&mut self) {
        self.state = VoiceState::Free;
        self.note = 0;
        self.velocity_gain = 0.0;
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    /// Producing sound, held or releasing.
    pub fn is_sounding(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }
}
