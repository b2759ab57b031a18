//! Low-level DSP primitives used by the synthesizer backend.
//!
//! Everything here is allocation-free once constructed and processes one
//! sample (or one stereo frame) at a time, so the voice engine can pull
//! frames at exactly the rate the block processor asks for.

/// Modulated stereo delay for thickening.
pub mod chorus;
/// Time-domain delay line with optional interpolation.
pub mod delay;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// One-pole, state-variable and ladder filters with multiple responses.
pub mod filter;
/// Oscillator waveforms and noise sources.
pub mod oscillator;
/// Control-rate linear smoothing (pitch bend).
pub mod ramp;
/// Two-line delay with normal, cross and ping-pong feedback.
pub mod stereo_delay;

pub use envelope::EnvelopeState;
