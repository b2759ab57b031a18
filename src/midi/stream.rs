use crate::midi::event::{MidiEvent, MidiStatus, VoiceId};

/// Tempo information the stream's transport exposes for the current block.
pub trait MidiClock {
    /// Beats per minute at `frame` within the block.
    fn tempo_at_frame(&self, frame: u32) -> f32;
    /// Playback speed multiplier at `frame` (1.0 = normal).
    fn speed_at_frame(&self, frame: u32) -> f32;
}

/// The host's view of MIDI for one block.
pub trait MidiStream {
    /// Events landing in this block, in time order.
    fn events_in_block(&self) -> &[MidiEvent];

    /// Whether the stream still considers the note behind `voice_id` held.
    fn is_note_active(&self, voice_id: VoiceId) -> bool;

    fn clock(&self) -> Option<&dyn MidiClock> {
        None
    }
}

/// A transport that never changes tempo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock {
    pub tempo_bpm: f32,
    pub speed: f32,
}

impl FixedClock {
    pub fn new(tempo_bpm: f32) -> Self {
        Self {
            tempo_bpm,
            speed: 1.0,
        }
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(120.0)
    }
}

impl MidiClock for FixedClock {
    fn tempo_at_frame(&self, _frame: u32) -> f32 {
        self.tempo_bpm
    }

    fn speed_at_frame(&self, _frame: u32) -> f32 {
        self.speed
    }
}

/// Reusable block of events plus the set of notes the stream holds.
///
/// Usage per block: [`begin_block`](Self::begin_block), then
/// [`push`](Self::push) each event in time order. A note-off keeps its note
/// active until the next `begin_block`, so the note is still confirmed in the
/// block that releases it. [`seek`](Self::seek) models a jump in the source
/// (loop, scrub): every held note is forgotten without a note-off.
#[derive(Debug, Default, Clone)]
pub struct MidiBlock {
    events: Vec<MidiEvent>,
    active: Vec<VoiceId>,
    releasing: Vec<VoiceId>,
    clock: Option<FixedClock>,
}

impl MidiBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate so pushing up to `events` events never reallocates.
    pub fn with_capacity(events: usize) -> Self {
        Self {
            events: Vec::with_capacity(events),
            active: Vec::with_capacity(events),
            releasing: Vec::with_capacity(events),
            clock: None,
        }
    }

    pub fn begin_block(&mut self) {
        let releasing = &self.releasing;
        self.active.retain(|id| !releasing.contains(id));
        self.releasing.clear();
        self.events.clear();
    }

    pub fn push(&mut self, event: MidiEvent) {
        if event.is_note_on() {
            self.releasing.retain(|id| *id != event.voice_id);
            if !self.active.contains(&event.voice_id) {
                self.active.push(event.voice_id);
            }
        } else if event.is_note_off() {
            if !self.releasing.contains(&event.voice_id) {
                self.releasing.push(event.voice_id);
            }
        } else if matches!(
            event.status,
            MidiStatus::AllNotesOff | MidiStatus::AllNotesKill
        ) {
            self.releasing.clone_from(&self.active);
        }
        self.events.push(event);
    }

    /// Discontinuity: forget every held note.
    pub fn seek(&mut self) {
        self.active.clear();
        self.releasing.clear();
    }

    /// Mark a note held without an event, for hosts that track notes themselves.
    pub fn confirm_active(&mut self, voice_id: VoiceId) {
        if !self.active.contains(&voice_id) {
            self.active.push(voice_id);
        }
    }

    /// Replace the held-note set outright.
    pub fn set_active(&mut self, voices: impl IntoIterator<Item = VoiceId>) {
        self.active.clear();
        self.active.extend(voices);
        self.releasing.clear();
    }

    pub fn set_clock(&mut self, clock: Option<FixedClock>) {
        self.clock = clock;
    }

    pub fn active_notes(&self) -> &[VoiceId] {
        &self.active
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl MidiStream for MidiBlock {
    fn events_in_block(&self) -> &[MidiEvent] {
        &self.events
    }

    fn is_note_active(&self, voice_id: VoiceId) -> bool {
        self.active.contains(&voice_id)
    }

    fn clock(&self) -> Option<&dyn MidiClock> {
        self.clock.as_ref().map(|clock| clock as &dyn MidiClock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_off_keeps_note_active_until_next_block() {
        let on = MidiEvent::note_on(0, 60, 100);
        let mut block = MidiBlock::new();

        block.begin_block();
        block.push(on);
        assert!(block.is_note_active(on.voice_id));

        block.begin_block();
        block.push(MidiEvent::note_off(0, 60).at_frame(10));
        assert!(block.is_note_active(on.voice_id));

        block.begin_block();
        assert!(!block.is_note_active(on.voice_id));
        assert!(block.is_empty());
    }

    #[test]
    fn retrigger_in_same_block_cancels_release() {
        let on = MidiEvent::note_on(0, 60, 100);
        let mut block = MidiBlock::new();

        block.push(on);
        block.begin_block();
        block.push(MidiEvent::note_off(0, 60));
        block.push(on.at_frame(20));
        block.begin_block();

        assert!(block.is_note_active(on.voice_id));
    }

    #[test]
    fn seek_forgets_held_notes() {
        let on = MidiEvent::note_on(0, 60, 100);
        let mut block = MidiBlock::new();
        block.push(on);

        block.seek();
        assert!(!block.is_note_active(on.voice_id));
        assert!(block.active_notes().is_empty());
    }

    #[test]
    fn clock_is_optional() {
        let mut block = MidiBlock::new();
        assert!(block.clock().is_none());

        block.set_clock(Some(FixedClock::new(96.0)));
        let clock = block.clock().unwrap();
        assert_eq!(clock.tempo_at_frame(0), 96.0);
        assert_eq!(clock.speed_at_frame(17), 1.0);
    }
}
