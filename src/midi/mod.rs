//! MIDI as the renderer consumes it.
//!
//! [`event`] is the message record, [`stream`] the per-block view the host
//! provides, [`filter`] picks out one track and [`stuck_notes`] cleans up
//! after streams that drop note-offs.

pub mod event;
pub mod filter;
pub mod stream;
pub mod stuck_notes;

pub use event::{MidiEvent, MidiStatus, VoiceId};
pub use filter::TrackFilter;
pub use stream::{FixedClock, MidiBlock, MidiClock, MidiStream};
pub use stuck_notes::StuckNoteGuard;
