//! Sequencer - sample-accurate demo playback into a MIDI stream
//!
//! Converts tick-based note lists into frame-stamped events for each block.
//! When the loop wraps, held notes are dropped without note-offs and the
//! stream is told to seek, so the renderer's stuck-note guard has real work.

use saavy_render::midi::{FixedClock, MidiBlock, MidiEvent};

/// One note in a demo track, in ticks.
#[derive(Debug, Clone, Copy)]
pub struct SeqNote {
    pub start: u32,
    pub duration: u32,
    pub note: u8,
    pub velocity: u8,
}

pub struct SeqTrack {
    pub track: u16,
    pub channel: u8,
    pub notes: Vec<SeqNote>,
}

/// Playback state for a single track
struct TrackPlayback {
    /// Index into the track's (start-sorted) notes
    next_note: usize,
    /// Held notes: (note, end_tick)
    held: Vec<(u8, u32)>,
}

impl TrackPlayback {
    fn new() -> Self {
        Self {
            next_note: 0,
            held: Vec::with_capacity(16),
        }
    }

    fn reset(&mut self) {
        self.next_note = 0;
        self.held.clear();
    }
}

pub struct Sequencer {
    bpm: f64,
    /// Current position in ticks (fractional for sub-tick accuracy)
    tick_position: f64,
    /// Samples per tick (computed from bpm, ppq, sample_rate)
    samples_per_tick: f64,
    loop_ticks: u32,
    tracks: Vec<SeqTrack>,
    playback: Vec<TrackPlayback>,
    loops: u32,
}

impl Sequencer {
    pub fn new(bpm: f64, ppq: u32, sample_rate: f64, loop_ticks: u32, mut tracks: Vec<SeqTrack>) -> Self {
        // ticks per second = (bpm / 60) * ppq
        let ticks_per_second = (bpm / 60.0) * ppq as f64;
        for track in &mut tracks {
            track.notes.sort_by_key(|n| n.start);
        }

        Self {
            bpm,
            tick_position: 0.0,
            samples_per_tick: sample_rate / ticks_per_second,
            loop_ticks: loop_ticks.max(1),
            playback: (0..tracks.len()).map(|_| TrackPlayback::new()).collect(),
            tracks,
            loops: 0,
        }
    }

    pub fn loops(&self) -> u32 {
        self.loops
    }

    /// Fill `block` with the events of the next `frames` samples.
    pub fn fill_block(&mut self, block: &mut MidiBlock, frames: usize) {
        block.begin_block();
        block.set_clock(Some(FixedClock::new(self.bpm as f32)));

        for frame in 0..frames as u32 {
            let current_tick = self.tick_position as u32;

            for (track, state) in self.tracks.iter().zip(&mut self.playback) {
                state.held.retain(|&(note, end_tick)| {
                    if current_tick >= end_tick {
                        block.push(
                            MidiEvent::note_off(track.channel, note)
                                .on_track(track.track)
                                .at_frame(frame)
                                .at_tick(end_tick as i64, current_tick as i64),
                        );
                        false
                    } else {
                        true
                    }
                });

                while let Some(note) = track.notes.get(state.next_note) {
                    if note.start > current_tick {
                        break;
                    }
                    block.push(
                        MidiEvent::note_on(track.channel, note.note, note.velocity)
                            .on_track(track.track)
                            .at_frame(frame)
                            .at_tick(note.start as i64, current_tick as i64),
                    );
                    state.held.push((note.note, note.start + note.duration));
                    state.next_note += 1;
                }
            }

            self.tick_position += 1.0 / self.samples_per_tick;

            if self.tick_position >= self.loop_ticks as f64 {
                self.tick_position -= self.loop_ticks as f64;
                self.loops += 1;
                // Notes ringing past the loop point never get their note-off
                for state in &mut self.playback {
                    state.reset();
                }
                block.seek();
            }
        }
    }
}

/// Four bars at 96 ppq: a held-chord lead on track 1 whose last chord
/// crosses the loop point, and a mono bass line on track 2.
pub fn demo_tracks(ppq: u32) -> (Vec<SeqTrack>, u32) {
    let beat = ppq;
    let bar = 4 * beat;

    let chords: [[u8; 3]; 4] = [[60, 64, 67], [57, 60, 64], [53, 57, 60], [55, 59, 62]];
    let mut lead = Vec::new();
    for (i, chord) in chords.iter().enumerate() {
        let start = i as u32 * bar;
        // Last chord is held for two bars, past the end of the loop
        let duration = if i == chords.len() - 1 { 2 * bar } else { bar - beat / 4 };
        for &note in chord {
            lead.push(SeqNote {
                start,
                duration,
                note,
                velocity: 90,
            });
        }
    }

    let roots = [36u8, 33, 29, 31];
    let mut bass = Vec::new();
    for (i, &root) in roots.iter().enumerate() {
        for step in 0..8 {
            bass.push(SeqNote {
                start: i as u32 * bar + step * beat / 2,
                duration: beat / 2 - beat / 8,
                note: if step % 4 == 3 { root + 12 } else { root },
                velocity: if step % 2 == 0 { 110 } else { 80 },
            });
        }
    }

    let tracks = vec![
        SeqTrack {
            track: 1,
            channel: 0,
            notes: lead,
        },
        SeqTrack {
            track: 2,
            channel: 1,
            notes: bass,
        },
    ];
    (tracks, 4 * bar)
}
