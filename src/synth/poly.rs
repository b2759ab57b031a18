use crate::{
    dsp::{chorus::StereoChorus, stereo_delay::StereoDelay},
    io::{
        converter::{cents_to_ratio, db_to_gain},
        StereoFrame,
    },
    synth::{
        backend::SynthBackend,
        patch::SynthPatch,
        voice::{SynthVoice, VoiceParams, VoiceState},
        MAX_VOICES,
    },
};

/// Largest unison detune, in cents, at spread 1.0.
const UNISON_MAX_CENTS: f32 = 25.0;

/// Polyphonic two-oscillator subtractive synth.
///
/// `Default` builds an empty synth that outputs silence until
/// [`init`](SynthBackend::init) sizes its voice pool.
#[derive(Default)]
pub struct SubtractiveSynth {
    voices: Vec<SynthVoice>,
    sample_rate: f32,
    patch: SynthPatch,
    params: VoiceParams,
    bend: [f32; 2],
    master_gain: f32,
    delay: Option<StereoDelay>,
    chorus: Option<StereoChorus>,
    note_counter: u64,
}

impl SubtractiveSynth {
    pub fn new(sample_rate: f32, voice_count: usize) -> Self {
        let mut synth = Self::default();
        synth.init(sample_rate, voice_count);
        synth
    }

    pub fn patch(&self) -> &SynthPatch {
        &self.patch
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Voices not free, across all notes.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_sounding()).count()
    }

    fn update_params(&mut self) {
        let range_cents = self.patch.pitch_bend_range * 100.0;
        let spread = self.patch.spread.clamp(0.0, 1.0);

        for i in 0..2 {
            let osc = &self.patch.oscillators[i];
            // Unison pushes the two oscillators apart in pitch and across the stereo field
            let side = if i == 0 { -1.0 } else { 1.0 };
            let (unison_cents, pan) = if self.patch.unison {
                (side * spread * UNISON_MAX_CENTS, side * spread)
            } else {
                (0.0, 0.0)
            };

            let cents = osc.cents + unison_cents + self.bend[i] * range_cents;
            self.params.osc_ratio[i] = cents_to_ratio(cents);
            self.params.osc_gain[i] = osc.gain.clamp(0.0, 1.0) * 0.5;
            self.params.osc_pan[i] = pan;
        }
    }

    fn next_age(&mut self) -> u64 {
        self.note_counter += 1;
        self.note_counter
    }

    /// Same note first (retrigger), then a free voice, then the oldest
    /// releasing voice, then the oldest voice outright.
    fn allocate_voice(&mut self, note: u8) -> Option<usize> {
        if let Some(idx) = self
            .voices
            .iter()
            .position(|v| v.is_sounding() && v.note() == note)
        {
            return Some(idx);
        }

        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return Some(idx);
        }

        let oldest_in = |state: Option<VoiceState>| {
            self.voices
                .iter()
                .enumerate()
                .filter(|(_, v)| state.map_or(true, |s| v.state() == s))
                .min_by_key(|(_, v)| v.age())
                .map(|(idx, _)| idx)
        };

        oldest_in(Some(VoiceState::Releasing)).or_else(|| oldest_in(None))
    }

    fn mono_note_on(&mut self, note: u8, velocity: u8) {
        let age = self.next_age();
        let legato = self.patch.envelope.legato;
        let Some(voice) = self.voices.first_mut() else {
            return;
        };

        if legato && voice.state() == VoiceState::Active {
            voice.glide_to(note, velocity, age);
        } else {
            voice.start(note, velocity, age);
        }
    }
}

impl SynthBackend for SubtractiveSynth {
    fn init(&mut self, sample_rate: f32, voice_count: usize) {
        let voice_count = voice_count.clamp(1, MAX_VOICES);
        self.sample_rate = sample_rate;
        self.voices = (0..voice_count)
            .map(|_| SynthVoice::new(sample_rate))
            .collect();
        self.delay = Some(StereoDelay::new(sample_rate));
        self.chorus = Some(StereoChorus::new(sample_rate));
        self.bend = [0.0; 2];
        self.note_counter = 0;

        let patch = self.patch.clone();
        self.apply_patch(&patch);
    }

    fn apply_patch(&mut self, patch: &SynthPatch) {
        self.patch = patch.sanitized();
        let patch = &self.patch;
        self.master_gain = db_to_gain(patch.gain_db);

        for voice in &mut self.voices {
            voice.configure(patch);
        }

        if let Some(delay) = &mut self.delay {
            delay.set_mode(patch.delay.mode);
            delay.set_delay_ms(patch.delay.delay_ms);
            delay.set_ratio(patch.delay.ratio);
            delay.set_feedback(patch.delay.feedback);
            delay.set_wet_level(patch.delay.wet_level);
        }

        if let Some(chorus) = &mut self.chorus {
            chorus.set_frequency(patch.chorus.frequency);
            chorus.set_depth_ms(patch.chorus.depth_ms);
            chorus.set_feedback(patch.chorus.feedback);
            chorus.set_wet_level(patch.chorus.wet_level);
        }

        self.update_params();
    }

    fn note_on(&mut self, note: u8, velocity: u8) {
        if self.patch.mono_mode {
            self.mono_note_on(note, velocity);
            return;
        }

        let age = self.next_age();
        if let Some(idx) = self.allocate_voice(note) {
            self.voices[idx].start(note, velocity, age);
        }
    }

    fn note_off(&mut self, note: u8) {
        for voice in &mut self.voices {
            if voice.note() == note {
                voice.release();
            }
        }
    }

    fn set_osc_pitch_bend(&mut self, osc: usize, bend: f32) {
        if let Some(slot) = self.bend.get_mut(osc) {
            *slot = if bend.is_finite() { bend.clamp(-1.0, 1.0) } else { 0.0 };
            self.update_params();
        }
    }

    fn generate_frame(&mut self) -> StereoFrame {
        let mut mix = StereoFrame::SILENCE;
        for voice in &mut self.voices {
            if voice.is_sounding() {
                mix += voice.next_frame(&self.params);
            }
        }
        let mut frame = mix.scale(self.master_gain);

        if self.patch.chorus.enabled {
            if let Some(chorus) = &mut self.chorus {
                frame = chorus.process(frame);
            }
        }
        if self.patch.delay.enabled {
            if let Some(delay) = &mut self.delay {
                frame = delay.process(frame);
            }
        }

        frame
    }

    fn sounding_voices(&self, note: u8) -> u32 {
        self.voices
            .iter()
            .filter(|v| v.is_sounding() && v.note() == note)
            .count() as u32
    }

    fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.release();
        }
    }

    fn kill_all_voices(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
        if let Some(delay) = &mut self.delay {
            delay.reset();
        }
        if let Some(chorus) = &mut self.chorus {
            chorus.reset();
        }
    }
}
