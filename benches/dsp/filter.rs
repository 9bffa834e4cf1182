//! Benchmarks for the ladder filter.

use std::hint::black_box;

use acid_dsp::dsp::{DspModule, LadderFilter};
use criterion::{BenchmarkId, Criterion};

use crate::{ramp, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let input = ramp(size);

        for (name, resonance, env_amount) in [
            ("open", 0.0, 0.0),
            ("resonant", 0.9, 0.0),
            ("env_swept", 0.6, 1.0),
        ] {
            let mut filter = LadderFilter::new();
            filter.set_cutoff(800.0);
            filter.set_resonance(resonance);
            filter.set_envelope_amount(env_amount);
            filter.prepare(SAMPLE_RATE, size);

            let mut buffer = input.clone();
            let mut env = 0.0f32;
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    // Moving target keeps the cutoff smoother busy
                    env = if env > 0.9 { 0.0 } else { env + 0.1 };
                    filter.set_envelope_value(env);
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
