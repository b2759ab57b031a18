use crate::midi::event::{MidiEvent, MidiStatus};

/// Selects the events meant for one renderer.
///
/// Track is always compared; channel only once [`with_channel`](Self::with_channel)
/// has been called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackFilter {
    track: u16,
    channel: Option<u8>,
}

impl TrackFilter {
    pub fn new(track: u16) -> Self {
        Self {
            track,
            channel: None,
        }
    }

    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = Some(channel & 0x0F);
        self
    }

    pub fn track(&self) -> u16 {
        self.track
    }

    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    pub fn matches(&self, event: &MidiEvent) -> bool {
        event.track == self.track && self.channel.map_or(true, |ch| ch == event.channel)
    }

    /// All-notes messages act on the whole stream regardless of track.
    pub fn is_stream_wide(event: &MidiEvent) -> bool {
        matches!(
            event.status,
            MidiStatus::AllNotesOff | MidiStatus::AllNotesKill
        )
    }

    pub fn accepts(&self, event: &MidiEvent) -> bool {
        Self::is_stream_wide(event) || self.matches(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_only_by_default() {
        let filter = TrackFilter::new(2);
        assert!(filter.matches(&MidiEvent::note_on(0, 60, 100).on_track(2)));
        assert!(filter.matches(&MidiEvent::note_on(9, 60, 100).on_track(2)));
        assert!(!filter.matches(&MidiEvent::note_on(0, 60, 100).on_track(1)));
    }

    #[test]
    fn channel_matching_is_opt_in() {
        let filter = TrackFilter::new(2).with_channel(3);
        assert!(filter.matches(&MidiEvent::note_on(3, 60, 100).on_track(2)));
        assert!(!filter.matches(&MidiEvent::note_on(4, 60, 100).on_track(2)));
    }

    #[test]
    fn all_notes_messages_cross_tracks() {
        let filter = TrackFilter::new(2);
        let panic = MidiEvent::all_notes_off(0).on_track(7);
        assert!(!filter.matches(&panic));
        assert!(filter.accepts(&panic));
        assert!(filter.accepts(&MidiEvent::all_notes_kill(0)));
    }
}
