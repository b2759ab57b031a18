use crate::io::converter::{pitch_bend_from_data, pitch_bend_to_data};

/// Identifies one sounding note across blocks.
///
/// Streams that assign their own ids pass them through untouched; otherwise
/// the id is derived from track, channel and note so the same key on the same
/// track always maps to the same voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct VoiceId(pub u32);

impl VoiceId {
    pub fn from_parts(track: u16, channel: u8, note: u8) -> Self {
        Self((track as u32) << 16 | ((channel & 0x0F) as u32) << 8 | (note & 0x7F) as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiStatus {
    NoteOff,
    NoteOn,
    PolyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    /// Channel mode message CC 123.
    AllNotesOff,
    /// Channel mode message CC 120 (all sound off). Voices stop without release.
    AllNotesKill,
    /// System or unknown status byte, kept verbatim.
    Other(u8),
}

impl MidiStatus {
    /// Split a raw status byte into status and channel.
    pub fn from_status_byte(byte: u8) -> (Self, u8) {
        let channel = byte & 0x0F;
        let status = match byte & 0xF0 {
            0x80 => Self::NoteOff,
            0x90 => Self::NoteOn,
            0xA0 => Self::PolyPressure,
            0xB0 => Self::ControlChange,
            0xC0 => Self::ProgramChange,
            0xD0 => Self::ChannelPressure,
            0xE0 => Self::PitchBend,
            _ => return (Self::Other(byte), 0),
        };
        (status, channel)
    }

    pub fn is_note(self) -> bool {
        matches!(self, Self::NoteOn | Self::NoteOff)
    }
}

const CC_ALL_SOUND_OFF: u8 = 120;
const CC_ALL_NOTES_OFF: u8 = 123;

/// A MIDI message as the renderer sees it: the raw bytes plus where it came
/// from and where in the block it lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidiEvent {
    pub status: MidiStatus,
    pub channel: u8,
    pub data1: u8,
    pub data2: u8,
    pub track: u16,
    /// Tick the event was written at in the source sequence.
    pub authored_tick: i64,
    /// Tick the stream was at when the event was emitted (differs after loops).
    pub current_tick: i64,
    pub voice_id: VoiceId,
    /// Sample frame inside the current block, 0 when the source has no
    /// sub-block timing.
    pub frame: u32,
}

impl MidiEvent {
    fn new(status: MidiStatus, channel: u8, data1: u8, data2: u8) -> Self {
        let channel = channel & 0x0F;
        Self {
            status,
            channel,
            data1: data1 & 0x7F,
            data2: data2 & 0x7F,
            track: 0,
            authored_tick: 0,
            current_tick: 0,
            voice_id: VoiceId::from_parts(0, channel, data1),
            frame: 0,
        }
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(MidiStatus::NoteOn, channel, note, velocity)
    }

    pub fn note_off(channel: u8, note: u8) -> Self {
        Self::new(MidiStatus::NoteOff, channel, note, 0)
    }

    /// Pitch bend from a normalised value in [-1, 1].
    pub fn pitch_bend(channel: u8, value: f32) -> Self {
        let (lsb, msb) = pitch_bend_to_data(value);
        Self::pitch_bend_raw(channel, lsb, msb)
    }

    pub fn pitch_bend_raw(channel: u8, lsb: u8, msb: u8) -> Self {
        Self::new(MidiStatus::PitchBend, channel, lsb, msb)
    }

    pub fn all_notes_off(channel: u8) -> Self {
        Self::new(MidiStatus::AllNotesOff, channel, CC_ALL_NOTES_OFF, 0)
    }

    pub fn all_notes_kill(channel: u8) -> Self {
        Self::new(MidiStatus::AllNotesKill, channel, CC_ALL_SOUND_OFF, 0)
    }

    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self::new(MidiStatus::ControlChange, channel, controller, value)
    }

    /// Decode a raw three-byte message. Channel mode controllers 120 and 123
    /// are promoted to [`MidiStatus::AllNotesKill`] / [`MidiStatus::AllNotesOff`].
    pub fn from_bytes(status: u8, data1: u8, data2: u8) -> Self {
        let (status, channel) = MidiStatus::from_status_byte(status);
        let status = match (status, data1 & 0x7F) {
            (MidiStatus::ControlChange, CC_ALL_NOTES_OFF) => MidiStatus::AllNotesOff,
            (MidiStatus::ControlChange, CC_ALL_SOUND_OFF) => MidiStatus::AllNotesKill,
            (status, _) => status,
        };
        Self::new(status, channel, data1, data2)
    }

    /// Move the event to `track`. The derived voice id follows unless one was
    /// set explicitly afterwards with [`with_voice_id`](Self::with_voice_id).
    pub fn on_track(mut self, track: u16) -> Self {
        self.track = track;
        self.voice_id = VoiceId::from_parts(track, self.channel, self.data1);
        self
    }

    pub fn at_frame(mut self, frame: u32) -> Self {
        self.frame = frame;
        self
    }

    pub fn at_tick(mut self, authored_tick: i64, current_tick: i64) -> Self {
        self.authored_tick = authored_tick;
        self.current_tick = current_tick;
        self
    }

    pub fn with_voice_id(mut self, voice_id: VoiceId) -> Self {
        self.voice_id = voice_id;
        self
    }

    pub fn note(&self) -> u8 {
        self.data1
    }

    pub fn velocity(&self) -> u8 {
        self.data2
    }

    /// Note-on with a non-zero velocity.
    pub fn is_note_on(&self) -> bool {
        self.status == MidiStatus::NoteOn && self.data2 > 0
    }

    /// Note-off, or the running-status idiom of note-on at velocity 0.
    pub fn is_note_off(&self) -> bool {
        match self.status {
            MidiStatus::NoteOff => true,
            MidiStatus::NoteOn => self.data2 == 0,
            _ => false,
        }
    }

    pub fn pitch_bend_value(&self) -> Option<f32> {
        (self.status == MidiStatus::PitchBend).then(|| pitch_bend_from_data(self.data1, self.data2))
    }
}
