// Purpose: the voice backend seam and the bundled polyphonic synth
// The renderer only sees SynthBackend; SubtractiveSynth is one implementation

pub mod backend;
pub mod patch;
pub mod poly;
pub mod voice;

pub use backend::SynthBackend;
pub use patch::SynthPatch;
pub use poly::SubtractiveSynth;

/// Upper bound on the voice pool a renderer may request.
pub const MAX_VOICES: usize = 32;
