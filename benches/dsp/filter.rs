use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_render::dsp::filter::{Filter, FilterAlgorithm, FilterType};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        // Naive saw, rich enough to keep the filter busy
        let input: Vec<f32> = (0..size).map(|i| (i % 64) as f32 / 32.0 - 1.0).collect();
        let mut buffer = input.clone();

        for (name, algorithm) in [
            ("one_pole", FilterAlgorithm::OnePole),
            ("state_variable", FilterAlgorithm::StateVariable),
            ("ladder", FilterAlgorithm::Ladder),
        ] {
            let mut filter = Filter::new(algorithm, FilterType::LowPass, sample_rate);
            filter.set_cutoff(1200.0);
            filter.set_q(2.0);

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
