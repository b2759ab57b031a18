// Purpose: per-block orchestration between the MIDI stream and the backend

pub mod inputs;
pub mod node;
pub mod processor;
pub mod queue;
pub mod voice_engine;

pub use inputs::BlockInputs;
pub use node::RenderNode;
pub use processor::{BlockProcessor, BlockStats, TransportSnapshot};
#[cfg(feature = "rtrb")]
pub use queue::{event_queue, EventQueue, EventSender};
pub use queue::EventReceiver;
pub use voice_engine::{NoteStatus, NoteTable, VoiceEngine};
