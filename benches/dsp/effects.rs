//! Benchmarks for the stereo effects on the synth's output bus.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_render::{
    dsp::{
        chorus::StereoChorus,
        stereo_delay::{StereoDelay, StereoDelayMode},
    },
    io::StereoFrame,
};

use crate::BLOCK_SIZES;

pub fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/effects");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let input: Vec<StereoFrame> = (0..size)
            .map(|i| {
                let s = (i as f32 * 0.05).sin();
                StereoFrame::new(s, -s)
            })
            .collect();

        for (name, mode) in [
            ("delay_normal", StereoDelayMode::Normal),
            ("delay_ping_pong", StereoDelayMode::PingPong),
        ] {
            let mut delay = StereoDelay::new(sample_rate);
            delay.set_mode(mode);
            delay.set_delay_ms(350.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut sum = StereoFrame::SILENCE;
                    for &frame in &input {
                        sum += delay.process(black_box(frame));
                    }
                    sum
                })
            });
        }

        let mut chorus = StereoChorus::new(sample_rate);
        group.bench_with_input(BenchmarkId::new("chorus", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = StereoFrame::SILENCE;
                for &frame in &input {
                    sum += chorus.process(black_box(frame));
                }
                sum
            })
        });
    }

    group.finish();
}
