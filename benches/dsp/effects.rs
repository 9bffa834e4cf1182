//! Benchmarks for each effects algorithm.

use std::hint::black_box;

use acid_dsp::dsp::{DspModule, EffectType, Effects};
use criterion::{BenchmarkId, Criterion};

use crate::{ramp, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/effects");

    for &size in BLOCK_SIZES {
        let input = ramp(size);

        for effect in EffectType::ALL {
            let mut fx = Effects::new();
            fx.set_type(effect);
            fx.set_mix(0.5);
            fx.set_feedback(0.6);
            fx.prepare(SAMPLE_RATE, size);

            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(effect.name(), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    fx.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
