//! Error types for renderer construction and configuration.
//!
//! Nothing on the per-block path returns these; every failure mode is
//! surfaced while preparing.

use std::{fmt, io};

#[derive(Debug)]
pub enum Error {
    /// Sample rate was not a positive number up to `MAX_SAMPLE_RATE`.
    InvalidSampleRate(f32),
    /// Block size of zero frames.
    InvalidBlockSize(usize),
    /// Block size larger than the renderer supports.
    BlockTooLarge { requested: usize, max: usize },
    /// Voice count outside `1..=MAX_VOICES`.
    InvalidVoiceCount(usize),
    /// MIDI channel above 15.
    InvalidChannel(u8),
    /// Reading a config file failed.
    Io(io::Error),
    /// A config file was not valid TOML for `RendererConfig`.
    Config(toml::de::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSampleRate(rate) => write!(f, "invalid sample rate: {rate}"),
            Self::InvalidBlockSize(frames) => write!(f, "invalid block size: {frames} frames"),
            Self::BlockTooLarge { requested, max } => {
                write!(f, "block of {requested} frames exceeds maximum of {max}")
            }
            Self::InvalidVoiceCount(count) => write!(f, "invalid voice count: {count}"),
            Self::InvalidChannel(channel) => write!(f, "invalid midi channel: {channel}"),
            Self::Io(err) => write!(f, "config i/o error: {err}"),
            Self::Config(err) => write!(f, "config parse error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
