use crate::{
    io::StereoFrame,
    midi::event::VoiceId,
    synth::{backend::SynthBackend, patch::SynthPatch},
};

/// What the renderer knows about one MIDI note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteStatus {
    pub note: u8,
    pub voice_id: VoiceId,
    /// Note-on seen and no note-off yet.
    pub keyed_on: bool,
    /// Backend voices still sounding this note, as of the last refresh.
    pub active_voices: u32,
}

/// One slot per MIDI note number.
///
/// An entry exists while the key is held or any voice still sounds the note;
/// there is never an entry with `keyed_on == false` and `active_voices == 0`.
#[derive(Debug, Clone)]
pub struct NoteTable {
    slots: [Option<NoteStatus>; 128],
}

impl Default for NoteTable {
    fn default() -> Self {
        Self { slots: [None; 128] }
    }
}

impl NoteTable {
    pub fn get(&self, note: u8) -> Option<&NoteStatus> {
        self.slots.get(note as usize).and_then(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteStatus> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    fn slot_mut(&mut self, note: u8) -> Option<&mut Option<NoteStatus>> {
        self.slots.get_mut(note as usize)
    }

    fn clear(&mut self) {
        self.slots = [None; 128];
    }
}

/// Turns note actions into backend calls and keeps the note table in step.
pub struct VoiceEngine<B: SynthBackend> {
    backend: B,
    notes: NoteTable,
}

impl<B: SynthBackend> VoiceEngine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            notes: NoteTable::default(),
        }
    }

    pub fn init(&mut self, sample_rate: f32, voice_count: usize, patch: &SynthPatch) {
        self.backend.init(sample_rate, voice_count);
        self.backend.apply_patch(patch);
        self.notes.clear();
    }

    pub fn note_on(&mut self, note: u8, velocity: u8, voice_id: VoiceId) {
        let note = note & 0x7F;
        self.backend.note_on(note, velocity);
        let active_voices = self.backend.sounding_voices(note);
        if let Some(slot) = self.notes.slot_mut(note) {
            *slot = Some(NoteStatus {
                note,
                voice_id,
                keyed_on: true,
                active_voices,
            });
        }
    }

    pub fn note_off(&mut self, note: u8) {
        let note = note & 0x7F;
        self.backend.note_off(note);
        let active_voices = self.backend.sounding_voices(note);
        if let Some(slot) = self.notes.slot_mut(note) {
            if let Some(status) = slot {
                status.keyed_on = false;
                status.active_voices = active_voices;
                if active_voices == 0 {
                    *slot = None;
                }
            }
        }
    }

    /// Same bend on both oscillator paths.
    pub fn set_pitch_bend(&mut self, value: f32) {
        self.backend.set_osc_pitch_bend(0, value);
        self.backend.set_osc_pitch_bend(1, value);
    }

    #[inline]
    pub fn generate_frame(&mut self) -> StereoFrame {
        self.backend.generate_frame()
    }

    pub fn all_notes_off(&mut self) {
        self.backend.all_notes_off();
        for status in self.notes.slots.iter_mut().flatten() {
            status.keyed_on = false;
        }
        self.refresh_note_status();
    }

    pub fn kill_all_voices(&mut self) {
        self.backend.kill_all_voices();
        self.notes.clear();
    }

    /// Pull voice counts from the backend and drop notes that have finished.
    pub fn refresh_note_status(&mut self) {
        let backend = &self.backend;
        for slot in self.notes.slots.iter_mut() {
            let Some(status) = slot else { continue };
            status.active_voices = backend.sounding_voices(status.note);
            if status.active_voices == 0 && !status.keyed_on {
                *slot = None;
            }
        }
    }

    pub fn notes(&self) -> &NoteTable {
        &self.notes
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
