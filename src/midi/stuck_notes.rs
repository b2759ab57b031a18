use heapless::Vec;

use crate::midi::{
    event::{MidiEvent, VoiceId},
    filter::TrackFilter,
    stream::MidiStream,
};

/*
Stuck Notes
===========

A note gets stuck when its note-off never arrives: the sequence loops or
seeks past it, a clip is muted mid-note, the host drops events. The guard
remembers every note-on it has let through and, at the start of each block,
asks the stream whether that note is still held. Anything the stream no
longer confirms is released with a synthesized note-off.

    block N     note-on 60     tracked {60}
    block N+1   (seek)         stream holds {}  → release 60, tracked {}

A note whose real note-off arrives is still confirmed by the stream during
that block, so the guard stops tracking it through the normal path and never
releases it twice.

Backends release by note number alone. While another tracked note with the
same number is still held (same note on a different channel, or a second
voice id) the stale entry is dropped silently, otherwise its release would
cut the held note too.

Runs on the audio thread: no logging here. Callers count the return value.
*/

pub const MAX_TRACKED_NOTES: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrackedNote {
    voice_id: VoiceId,
    track: u16,
    channel: u8,
    note: u8,
}

impl TrackedNote {
    fn from_event(event: &MidiEvent) -> Self {
        Self {
            voice_id: event.voice_id,
            track: event.track,
            channel: event.channel,
            note: event.note(),
        }
    }

    fn release_event(&self) -> MidiEvent {
        MidiEvent::note_off(self.channel, self.note)
            .on_track(self.track)
            .with_voice_id(self.voice_id)
            .at_frame(0)
    }
}

#[derive(Debug, Default)]
pub struct StuckNoteGuard {
    tracked: Vec<TrackedNote, MAX_TRACKED_NOTES>,
}

impl StuckNoteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release tracked notes `stream` no longer holds, then start or stop
    /// tracking from this block's events. Returns how many note-offs were sent.
    pub fn unstick_notes<S, F>(&mut self, stream: &S, filter: &TrackFilter, mut release: F) -> usize
    where
        S: MidiStream + ?Sized,
        F: FnMut(MidiEvent),
    {
        let mut released = 0;
        let mut stale: Vec<TrackedNote, MAX_TRACKED_NOTES> = Vec::new();

        self.tracked.retain(|tracked| {
            let held = stream.is_note_active(tracked.voice_id);
            if !held {
                // Same capacity as `tracked`, cannot overflow
                let _ = stale.push(*tracked);
            }
            held
        });

        for (i, note) in stale.iter().enumerate() {
            let still_sounding = self.tracked.iter().any(|t| t.note == note.note)
                || stale[..i].iter().any(|t| t.note == note.note);
            if !still_sounding {
                release(note.release_event());
                released += 1;
            }
        }

        for event in stream.events_in_block() {
            if !filter.accepts(event) {
                continue;
            }

            if TrackFilter::is_stream_wide(event) {
                self.tracked.clear();
            } else if event.is_note_on() {
                if self.is_tracking(event.voice_id) {
                    continue;
                }
                if self.tracked.is_full() {
                    let oldest = self.tracked.remove(0);
                    release(oldest.release_event());
                    released += 1;
                }
                // is_full was handled above, push cannot fail
                let _ = self.tracked.push(TrackedNote::from_event(event));
            } else if event.is_note_off() {
                self.tracked.retain(|tracked| tracked.voice_id != event.voice_id);
            }
        }

        released
    }

    pub fn is_tracking(&self, voice_id: VoiceId) -> bool {
        self.tracked.iter().any(|tracked| tracked.voice_id == voice_id)
    }

    pub fn tracked_len(&self) -> usize {
        self.tracked.len()
    }

    pub fn reset(&mut self) {
        self.tracked.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::stream::MidiBlock;

    fn note_on(note: u8) -> MidiEvent {
        MidiEvent::note_on(0, note, 100).on_track(1)
    }

    fn run(guard: &mut StuckNoteGuard, block: &MidiBlock) -> std::vec::Vec<MidiEvent> {
        let mut released = std::vec::Vec::new();
        guard.unstick_notes(block, &TrackFilter::new(1), |event| released.push(event));
        released
    }

    #[test]
    fn releases_exactly_the_unconfirmed_note_once() {
        let (a, b) = (note_on(60), note_on(64));
        let mut guard = StuckNoteGuard::new();
        let mut block = MidiBlock::new();

        block.push(a);
        block.push(b);
        assert!(run(&mut guard, &block).is_empty());
        assert_eq!(guard.tracked_len(), 2);

        // Stream now only holds A
        block.begin_block();
        block.set_active([a.voice_id]);
        let released = run(&mut guard, &block);

        assert_eq!(released.len(), 1);
        let off = released[0];
        assert!(off.is_note_off());
        assert_eq!(off.note(), 64);
        assert_eq!(off.voice_id, b.voice_id);
        assert_eq!(off.track, 1);
        assert_eq!(off.frame, 0);
        assert_eq!(off.velocity(), 0);

        // Next block: nothing more to release
        block.begin_block();
        assert!(run(&mut guard, &block).is_empty());
        assert!(guard.is_tracking(a.voice_id));
    }

    #[test]
    fn regular_note_off_is_never_released_again() {
        let a = note_on(60);
        let mut guard = StuckNoteGuard::new();
        let mut block = MidiBlock::new();

        block.push(a);
        run(&mut guard, &block);

        block.begin_block();
        block.push(MidiEvent::note_off(0, 60).on_track(1).at_frame(30));
        assert!(run(&mut guard, &block).is_empty());

        block.begin_block();
        assert!(run(&mut guard, &block).is_empty());
        assert_eq!(guard.tracked_len(), 0);
    }

    #[test]
    fn seek_releases_everything_held() {
        let mut guard = StuckNoteGuard::new();
        let mut block = MidiBlock::new();
        block.push(note_on(60));
        block.push(note_on(62));
        run(&mut guard, &block);

        block.begin_block();
        block.seek();
        assert_eq!(run(&mut guard, &block).len(), 2);
    }

    #[test]
    fn held_note_on_another_channel_is_not_cut() {
        let stuck = MidiEvent::note_on(0, 60, 100).on_track(1);
        let held = MidiEvent::note_on(1, 60, 100).on_track(1);
        assert_ne!(stuck.voice_id, held.voice_id);

        let mut guard = StuckNoteGuard::new();
        let mut block = MidiBlock::new();
        block.push(stuck);
        block.push(held);
        run(&mut guard, &block);

        block.begin_block();
        block.set_active([held.voice_id]);
        assert!(run(&mut guard, &block).is_empty());
        assert!(!guard.is_tracking(stuck.voice_id));
        assert!(guard.is_tracking(held.voice_id));

        // Once the other one goes stale too, note 60 is released once
        block.begin_block();
        block.seek();
        let released = run(&mut guard, &block);
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].note(), 60);
        assert_eq!(guard.tracked_len(), 0);
    }

    #[test]
    fn duplicate_stale_notes_release_once() {
        let mut guard = StuckNoteGuard::new();
        let mut block = MidiBlock::new();
        block.push(MidiEvent::note_on(0, 60, 100).on_track(1));
        block.push(MidiEvent::note_on(3, 60, 100).on_track(1));
        block.push(note_on(67));
        run(&mut guard, &block);

        block.begin_block();
        block.seek();
        let notes: std::vec::Vec<u8> = run(&mut guard, &block).iter().map(|e| e.note()).collect();
        assert_eq!(notes, vec![60, 67]);
    }

    #[test]
    fn other_tracks_are_not_tracked() {
        let mut guard = StuckNoteGuard::new();
        let mut block = MidiBlock::new();
        block.push(MidiEvent::note_on(0, 60, 100).on_track(3));
        run(&mut guard, &block);

        assert_eq!(guard.tracked_len(), 0);
    }

    #[test]
    fn overflow_releases_oldest() {
        let mut guard = StuckNoteGuard::new();
        let mut block = MidiBlock::with_capacity(MAX_TRACKED_NOTES + 1);
        let voices: std::vec::Vec<MidiEvent> = (0..=MAX_TRACKED_NOTES as u32)
            .map(|i| note_on(60).with_voice_id(VoiceId(i)))
            .collect();
        for &event in &voices {
            block.push(event);
        }

        let released = run(&mut guard, &block);
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].voice_id, VoiceId(0));
        assert_eq!(guard.tracked_len(), MAX_TRACKED_NOTES);
    }
}
