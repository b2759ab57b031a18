use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_render::dsp::envelope::Envelope;

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut sustaining = Envelope::adsr(sample_rate, 0.001, 0.001, 0.7, 0.3);
        sustaining.note_on();
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| sustaining.render(black_box(&mut buffer)))
        });

        // Retrigger each iteration so the attack and decay stages get measured
        let mut cycling = Envelope::adsr(sample_rate, 0.002, 0.002, 0.5, 0.002);
        group.bench_with_input(BenchmarkId::new("full_cycle", size), &size, |b, _| {
            b.iter(|| {
                cycling.note_on();
                cycling.render(black_box(&mut buffer[..size / 2]));
                cycling.note_off();
                cycling.render(black_box(&mut buffer[size / 2..]));
            })
        });
    }

    group.finish();
}
