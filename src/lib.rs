//! Block-based audio rendering driven by a timestamped MIDI stream.
//!
//! A [`RenderNode`] is prepared once with a sample rate and block size, then
//! asked to fill one stereo block per audio callback. Each block it filters
//! the incoming MIDI by track, releases notes the stream no longer holds,
//! smooths pitch bend at control rate and pulls one frame per sample from a
//! polyphonic [`SynthBackend`](synth::SynthBackend).

pub mod config;
pub mod dsp;
pub mod error;
pub mod io;
pub mod midi; // Events, streams, filtering and stuck-note handling
pub mod render; // Per-block orchestration
pub mod synth; // Voice backend seam and the bundled subtractive synth

pub use config::RendererConfig;
pub use error::{Error, Result};
pub use render::{BlockInputs, BlockProcessor, RenderNode};

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Highest sample rate accepted at prepare; effect buffers scale with it.
pub const MAX_SAMPLE_RATE: f32 = 384_000.0;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
