//! Allocation-free render path tests.
//!
//! Every MIDI block is built up front; only `execute` runs inside
//! `assert_no_alloc`, so any heap allocation on the audio path aborts the test.
//! A logger is installed at the most verbose level so a log call on the
//! audio path would allocate and fail here too.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use saavy_render::{
    io::StereoOutput,
    midi::{FixedClock, MidiBlock, MidiEvent},
    BlockInputs, RenderNode, RendererConfig,
};

const BLOCK_FRAMES: usize = 256;
const TRACK: u16 = 2;

/// Two seconds of blocks: chords, bends, a loop seek that strands notes and
/// traffic on another track.
fn scripted_blocks() -> Vec<MidiBlock> {
    let mut blocks = Vec::new();
    let mut block = MidiBlock::with_capacity(64);
    block.set_clock(Some(FixedClock::new(128.0)));

    for i in 0..375u32 {
        block.begin_block();
        match i % 50 {
            0 => {
                for (n, note) in [60, 64, 67, 71].into_iter().enumerate() {
                    block.push(
                        MidiEvent::note_on(0, note, 100)
                            .on_track(TRACK)
                            .at_frame(n as u32 * 16),
                    );
                }
                block.push(MidiEvent::note_on(0, 36, 100).on_track(TRACK + 1));
            }
            10 => block.push(MidiEvent::pitch_bend(0, 0.7).on_track(TRACK)),
            20 => {
                block.push(MidiEvent::note_off(0, 60).on_track(TRACK).at_frame(100));
                block.push(MidiEvent::control_change(0, 64, 127).on_track(TRACK));
            }
            30 => block.push(MidiEvent::pitch_bend(0, -0.4).on_track(TRACK)),
            // Loop wrap: held notes vanish without note-offs
            40 => block.seek(),
            45 => block.push(MidiEvent::all_notes_off(0)),
            _ => {}
        }
        blocks.push(block.clone());
    }
    blocks
}

fn verbose_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

fn prepared_node() -> RenderNode {
    verbose_logging();
    let mut node = RenderNode::new(RendererConfig::default());
    node.prepare(48_000.0, BLOCK_FRAMES, &BlockInputs::for_track(TRACK))
        .unwrap();
    node
}

#[test]
fn execute_does_not_allocate() {
    let blocks = scripted_blocks();
    let mut node = prepared_node();
    let inputs = BlockInputs::for_track(TRACK);
    let mut output = StereoOutput::new(BLOCK_FRAMES);

    assert_no_alloc(|| {
        for block in &blocks {
            node.execute(&inputs, block, &mut output);
        }
    });

    let stats = node.processor().unwrap().stats();
    assert_eq!(stats.frames_rendered, (blocks.len() * BLOCK_FRAMES) as u64);
    assert!(stats.notes_unstuck > 0);
}

#[cfg(feature = "rtrb")]
#[test]
fn live_queue_drain_does_not_allocate() {
    let blocks = scripted_blocks();
    let mut node = prepared_node();
    let mut sender = node.event_sender();
    let inputs = BlockInputs::for_track(TRACK);
    let mut output = StereoOutput::new(BLOCK_FRAMES);

    for i in 0..32u8 {
        sender
            .send(MidiEvent::pitch_bend(0, (i as f32 / 32.0) - 0.5).on_track(TRACK))
            .unwrap();
    }

    assert_no_alloc(|| {
        for block in blocks.iter().take(64) {
            node.execute(&inputs, block, &mut output);
        }
    });
}

#[test]
fn disabling_does_not_allocate() {
    let blocks = scripted_blocks();
    let mut node = prepared_node();
    let mut output = StereoOutput::new(BLOCK_FRAMES);
    let on = BlockInputs::for_track(TRACK);
    let off = BlockInputs::for_track(TRACK).with_enabled(false);

    assert_no_alloc(|| {
        for (i, block) in blocks.iter().take(100).enumerate() {
            let inputs = if (i / 10) % 2 == 0 { &on } else { &off };
            node.execute(inputs, block, &mut output);
        }
    });
}

#[test]
fn overflowing_block_does_not_allocate() {
    let mut node = prepared_node();
    let inputs = BlockInputs::for_track(TRACK);
    let mut output = StereoOutput::new(BLOCK_FRAMES);

    // More note actions than one block holds, more notes than the guard tracks
    let mut busy = MidiBlock::with_capacity(512);
    for i in 0..300u32 {
        let note = (i % 128) as u8;
        busy.push(
            MidiEvent::note_on((i / 128) as u8, note, 90)
                .on_track(TRACK)
                .at_frame(i % BLOCK_FRAMES as u32),
        );
    }
    busy.push(MidiEvent::from_bytes(0xC0, 5, 0).on_track(TRACK));
    let mut stranded = busy.clone();
    stranded.begin_block();
    stranded.seek();

    assert_no_alloc(|| {
        node.execute(&inputs, &busy, &mut output);
        node.execute(&inputs, &stranded, &mut output);
    });

    let stats = node.processor().unwrap().stats();
    assert!(stats.pending_overflows > 0);
    assert!(stats.notes_unstuck > 0);
}
