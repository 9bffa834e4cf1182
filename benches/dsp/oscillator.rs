//! Benchmarks for every oscillator waveform.

use std::hint::black_box;

use acid_dsp::dsp::{DspModule, Oscillator, Waveform};
use criterion::{BenchmarkId, Criterion};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // SuperSaw runs seven blep'd saws; FM two sines
        for waveform in Waveform::ALL {
            let mut osc = Oscillator::new();
            osc.set_waveform(waveform);
            osc.set_frequency(110.0);
            osc.prepare(SAMPLE_RATE, size);

            group.bench_with_input(BenchmarkId::new(waveform.name(), size), &size, |b, _| {
                b.iter(|| osc.render(black_box(&mut buffer)))
            });
        }
    }

    group.finish();
}
