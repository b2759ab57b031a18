use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    synth::{patch::SynthPatch, MAX_VOICES},
    MAX_BLOCK_SIZE, MAX_SAMPLE_RATE,
};

/// Everything a renderer needs before its first block.
///
/// Every field has a default, so a TOML file only has to name what it
/// changes:
///
/// ```toml
/// sample_rate = 44100
/// track = 2
///
/// [patch]
/// gain_db = -6.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub sample_rate: f32,
    pub block_frames: usize,
    pub voice_count: usize,
    pub pitch_bend_ramp_ms: f32,
    /// Slots in the realtime event queue between other threads and the renderer.
    pub event_queue_capacity: usize,
    pub track: u16,
    pub channel: u8,
    /// When false (default) only the track has to match.
    pub match_channel: bool,
    pub patch: SynthPatch,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_frames: 256,
            voice_count: 8,
            pitch_bend_ramp_ms: 5.0,
            event_queue_capacity: 256,
            track: 0,
            channel: 0,
            match_channel: false,
            patch: SynthPatch::default(),
        }
    }
}

impl RendererConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate > 0.0 && self.sample_rate <= MAX_SAMPLE_RATE) {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        if self.block_frames == 0 {
            return Err(Error::InvalidBlockSize(self.block_frames));
        }
        if self.block_frames > MAX_BLOCK_SIZE {
            return Err(Error::BlockTooLarge {
                requested: self.block_frames,
                max: MAX_BLOCK_SIZE,
            });
        }
        if self.voice_count == 0 || self.voice_count > MAX_VOICES {
            return Err(Error::InvalidVoiceCount(self.voice_count));
        }
        if self.channel > 15 {
            return Err(Error::InvalidChannel(self.channel));
        }
        Ok(())
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_block_frames(mut self, block_frames: usize) -> Self {
        self.block_frames = block_frames;
        self
    }

    pub fn with_voice_count(mut self, voice_count: usize) -> Self {
        self.voice_count = voice_count;
        self
    }

    pub fn with_track(mut self, track: u16) -> Self {
        self.track = track;
        self
    }

    /// Also require events to arrive on `channel`.
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self.match_channel = true;
        self
    }

    pub fn with_patch(mut self, patch: SynthPatch) -> Self {
        self.patch = patch;
        self
    }
}
