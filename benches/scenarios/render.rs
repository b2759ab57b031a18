//! Full `RenderNode::execute` cost with realistic note loads.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_render::{
    io::StereoOutput,
    midi::{MidiBlock, MidiEvent},
    synth::patch::SynthPatch,
    BlockInputs, RenderNode, RendererConfig,
};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

fn prepared_node(size: usize, patch: SynthPatch) -> RenderNode {
    let config = RendererConfig::default()
        .with_block_frames(size)
        .with_voice_count(16)
        .with_patch(patch);
    let mut node = RenderNode::new(config);
    node.prepare(SAMPLE_RATE, size, &BlockInputs::default())
        .expect("bench config is valid");
    node
}

/// A chord held in the stream, so every block renders `notes` sounding voices.
fn held_chord(notes: &[u8]) -> MidiBlock {
    let mut stream = MidiBlock::new();
    for &note in notes {
        stream.push(MidiEvent::note_on(0, note, 100));
    }
    stream
}

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");
    let inputs = BlockInputs::default();

    for &size in BLOCK_SIZES {
        let mut output = StereoOutput::new(size);

        // Idle renderer: event handling and bookkeeping only
        let mut idle = prepared_node(size, SynthPatch::dry());
        let empty = MidiBlock::new();
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| idle.execute(&inputs, black_box(&empty), &mut output))
        });

        for (name, patch) in [("chord_dry", SynthPatch::dry()), ("chord_fx", SynthPatch::default())] {
            let mut node = prepared_node(size, patch);
            let mut stream = held_chord(&[48, 55, 60, 64, 67]);
            node.execute(&inputs, &stream, &mut output);
            stream.begin_block();

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| node.execute(&inputs, black_box(&stream), &mut output))
            });
        }

        // A bend per block keeps the ramper and both oscillator paths moving
        let mut bending = prepared_node(size, SynthPatch::dry());
        let mut stream = held_chord(&[57, 64]);
        bending.execute(&inputs, &stream, &mut output);
        let mut step = 0u32;
        group.bench_with_input(BenchmarkId::new("pitch_bend", size), &size, |b, _| {
            b.iter(|| {
                step = step.wrapping_add(1);
                stream.begin_block();
                stream.push(MidiEvent::pitch_bend(0, ((step % 64) as f32 / 32.0) - 1.0));
                bending.execute(&inputs, black_box(&stream), &mut output);
            })
        });
    }

    group.finish();
}
