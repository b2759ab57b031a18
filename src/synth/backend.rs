use crate::{io::StereoFrame, synth::patch::SynthPatch};

/// The polyphonic engine the renderer drives.
///
/// The renderer owns its backend exclusively and calls everything from the
/// audio thread, so implementations need no internal locking. Every method
/// except [`init`](Self::init) runs inside the realtime block and must not
/// allocate or block.
pub trait SynthBackend: Send {
    /// Size internal state for `voice_count` voices at `sample_rate`. Called
    /// once, before any other method.
    fn init(&mut self, sample_rate: f32, voice_count: usize);

    fn apply_patch(&mut self, patch: &SynthPatch);

    fn note_on(&mut self, note: u8, velocity: u8);

    fn note_off(&mut self, note: u8);

    /// Bend oscillator path `osc` by `bend` in [-1, 1] of the patch's range.
    fn set_osc_pitch_bend(&mut self, osc: usize, bend: f32);

    /// Produce exactly one stereo frame and advance time by one sample.
    fn generate_frame(&mut self) -> StereoFrame;

    /// Voices currently producing sound for `note`, releasing ones included.
    fn sounding_voices(&self, note: u8) -> u32;

    /// Release every voice through its envelope.
    fn all_notes_off(&mut self);

    /// Silence every voice immediately, effect tails included.
    fn kill_all_voices(&mut self);
}
