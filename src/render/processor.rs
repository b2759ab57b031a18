use heapless::Vec as FixedVec;

use crate::{
    config::RendererConfig,
    dsp::ramp::LinearRamper,
    error::Result,
    io::{converter::pitch_bend_from_data, StereoOutput},
    midi::{
        event::{MidiEvent, MidiStatus, VoiceId},
        filter::TrackFilter,
        stream::MidiStream,
        stuck_notes::StuckNoteGuard,
    },
    render::{inputs::BlockInputs, queue::EventReceiver, voice_engine::VoiceEngine},
    synth::{backend::SynthBackend, poly::SubtractiveSynth},
};

/*
Block Processing
================

Every call to `execute` renders one block:

  1. forget last block's note actions
  2. bail out with silence if disabled (killing voices on the falling edge)
  3. release notes the stream stopped holding
  4. route live queue events, then the block's events: notes become
     frame-stamped actions, bends retarget the ramper
  5. snapshot tempo/speed if the stream has a clock
  6. advance the bend ramp one step and push it to the backend
  7. per sample: fire actions due at this frame, pull one stereo frame
  8. deinterleave into the output
  9. refresh which notes are still sounding

The ramper runs at control rate (once per block), so its call rate is
sample_rate / block_frames and a 5 ms ramp at 48 kHz / 256 frames is one step.

Nothing after `prepare` logs: a formatted record allocates and the logger
locks stderr. Everything worth reporting lands in `BlockStats` instead.
*/

/// Note actions one block can hold before they start firing immediately.
pub const MAX_PENDING_ACTIONS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
enum NoteAction {
    NoteOn { note: u8, velocity: u8, voice_id: VoiceId },
    NoteOff { note: u8 },
    AllNotesOff,
    KillAll,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingNoteAction {
    frame: u32,
    action: NoteAction,
}

/// Tempo and speed at frame 0 of the last block whose stream had a clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportSnapshot {
    pub tempo_bpm: f32,
    pub speed: f32,
}

/// Running totals since prepare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockStats {
    pub blocks: u64,
    pub events_seen: u64,
    pub events_matched: u64,
    /// Matched events whose status the renderer does not act on.
    pub events_ignored: u64,
    pub notes_unstuck: u64,
    pub pending_overflows: u64,
    pub frames_rendered: u64,
}

pub struct BlockProcessor<B: SynthBackend = SubtractiveSynth> {
    config: RendererConfig,
    engine: VoiceEngine<B>,
    ramper: LinearRamper,
    filter: TrackFilter,
    guard: StuckNoteGuard,
    scratch: Vec<f32>,
    pending: FixedVec<PendingNoteAction, MAX_PENDING_ACTIONS>,
    live_events: Option<Box<dyn EventReceiver>>,
    transport: Option<TransportSnapshot>,
    enabled: bool,
    stats: BlockStats,
}

impl<B: SynthBackend> BlockProcessor<B> {
    /// Validate `config` and bring `backend` up. All allocation the renderer
    /// will ever do happens here.
    pub fn prepare(config: RendererConfig, backend: B) -> Result<Self> {
        config.validate()?;

        let mut engine = VoiceEngine::new(backend);
        engine.init(config.sample_rate, config.voice_count, &config.patch);

        let mut ramper = LinearRamper::new();
        let call_rate_hz = config.sample_rate / config.block_frames as f32;
        ramper.set_ramp_time(call_rate_hz, config.pitch_bend_ramp_ms);
        ramper.set_target(0.0);
        ramper.snap_to_target();
        engine.set_pitch_bend(ramper.current());

        let mut filter = TrackFilter::new(config.track);
        if config.match_channel {
            filter = filter.with_channel(config.channel);
        }

        log::info!(
            "renderer prepared: {} Hz, {} frames/block, {} voices, track {}{}",
            config.sample_rate,
            config.block_frames,
            config.voice_count,
            config.track,
            if config.match_channel {
                " (channel matched)"
            } else {
                ""
            }
        );
        log::debug!(
            "pitch bend ramp: {} steps at {call_rate_hz:.1} Hz",
            ramper.steps_per_ramp()
        );

        Ok(Self {
            scratch: vec![0.0; 2 * config.block_frames],
            config,
            engine,
            ramper,
            filter,
            guard: StuckNoteGuard::new(),
            pending: FixedVec::new(),
            live_events: None,
            transport: None,
            enabled: true,
            stats: BlockStats::default(),
        })
    }

    /// Drain `queue` at the start of every block from now on.
    pub fn attach_event_queue(&mut self, queue: impl EventReceiver + 'static) {
        self.live_events = Some(Box::new(queue));
    }

    pub(crate) fn attach_boxed_queue(&mut self, queue: Box<dyn EventReceiver>) {
        self.live_events = Some(queue);
    }

    /// Render one block into `output`.
    ///
    /// Renders `min(output.frames(), block_frames)` frames; any further frames
    /// in `output` are zeroed.
    pub fn execute<S>(&mut self, inputs: &BlockInputs, stream: &S, output: &mut StereoOutput)
    where
        S: MidiStream + ?Sized,
    {
        self.pending.clear();
        self.stats.blocks += 1;

        if !inputs.enabled {
            if self.enabled {
                self.engine.kill_all_voices();
                self.guard.reset();
                self.enabled = false;
            }
            output.silence();
            return;
        }
        self.enabled = true;

        let frames = output.frames().min(self.config.block_frames);

        let engine = &mut self.engine;
        let released = self
            .guard
            .unstick_notes(stream, &self.filter, |event| engine.note_off(event.note()));
        self.stats.notes_unstuck += released as u64;

        if let Some(mut queue) = self.live_events.take() {
            while let Some(event) = queue.pop_event() {
                self.route_event(&event, frames);
            }
            self.live_events = Some(queue);
        }
        for event in stream.events_in_block() {
            self.route_event(event, frames);
        }

        if let Some(clock) = stream.clock() {
            self.transport = Some(TransportSnapshot {
                tempo_bpm: clock.tempo_at_frame(0),
                speed: clock.speed_at_frame(0),
            });
        }

        self.ramper.advance();
        self.engine.set_pitch_bend(self.ramper.current());

        let mut next_action = 0;
        for i in 0..frames {
            while let Some(pending) = self.pending.get(next_action) {
                if pending.frame as usize > i {
                    break;
                }
                let action = pending.action;
                self.apply_action(action);
                next_action += 1;
            }

            let frame = self.engine.generate_frame();
            self.scratch[2 * i] = frame.left;
            self.scratch[2 * i + 1] = frame.right;
        }
        // Only reachable for zero-length blocks, actions are clamped below `frames`
        while let Some(pending) = self.pending.get(next_action) {
            let action = pending.action;
            self.apply_action(action);
            next_action += 1;
        }

        output.write_interleaved(&self.scratch[..2 * frames]);

        self.engine.refresh_note_status();
        self.stats.frames_rendered += frames as u64;
    }

    fn route_event(&mut self, event: &MidiEvent, frames: usize) {
        self.stats.events_seen += 1;
        if !self.filter.accepts(event) {
            return;
        }
        self.stats.events_matched += 1;

        let action = match event.status {
            MidiStatus::NoteOn | MidiStatus::NoteOff => {
                if event.is_note_on() {
                    NoteAction::NoteOn {
                        note: event.note(),
                        velocity: event.velocity(),
                        voice_id: event.voice_id,
                    }
                } else {
                    NoteAction::NoteOff { note: event.note() }
                }
            }
            MidiStatus::PitchBend => {
                self.ramper
                    .set_target(pitch_bend_from_data(event.data1, event.data2));
                return;
            }
            MidiStatus::AllNotesOff => NoteAction::AllNotesOff,
            MidiStatus::AllNotesKill => NoteAction::KillAll,
            _ => {
                self.stats.events_ignored += 1;
                return;
            }
        };

        self.queue_action(event.frame, action, frames);
    }

    fn queue_action(&mut self, frame: u32, action: NoteAction, frames: usize) {
        let last_frame = frames.saturating_sub(1) as u32;
        let earliest = self.pending.last().map_or(0, |p| p.frame);
        let frame = frame.min(last_frame).max(earliest);

        if let Err(overflow) = self.pending.push(PendingNoteAction { frame, action }) {
            self.stats.pending_overflows += 1;
            self.apply_action(overflow.action);
        }
    }

    fn apply_action(&mut self, action: NoteAction) {
        match action {
            NoteAction::NoteOn {
                note,
                velocity,
                voice_id,
            } => self.engine.note_on(note, velocity, voice_id),
            NoteAction::NoteOff { note } => self.engine.note_off(note),
            NoteAction::AllNotesOff => self.engine.all_notes_off(),
            NoteAction::KillAll => self.engine.kill_all_voices(),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn engine(&self) -> &VoiceEngine<B> {
        &self.engine
    }

    pub fn backend(&self) -> &B {
        self.engine.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.engine.backend_mut()
    }

    pub fn pitch_bend(&self) -> &LinearRamper {
        &self.ramper
    }

    pub fn transport(&self) -> Option<TransportSnapshot> {
        self.transport
    }

    pub fn stats(&self) -> BlockStats {
        self.stats
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn track_filter(&self) -> &TrackFilter {
        &self.filter
    }
}
