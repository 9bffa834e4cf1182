//! Benchmarks for the interpolating delay line.

use std::hint::black_box;

use acid_dsp::dsp::delay::DelayLine;
use criterion::{BenchmarkId, Criterion};

use crate::{ramp, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    for &size in BLOCK_SIZES {
        let input = ramp(size);

        let mut line = DelayLine::new();
        line.allocate((SAMPLE_RATE * 2.0) as usize);

        // Fixed fractional offset with feedback
        group.bench_with_input(BenchmarkId::new("feedback", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &x in &input {
                    let delayed = line.read(black_box(12_000.5));
                    line.write(x + delayed * 0.5);
                    sum += delayed;
                }
                sum
            })
        });

        // Offset changing every sample, as chorus and flanger do
        let mut line = DelayLine::new();
        line.allocate((SAMPLE_RATE * 2.0) as usize);
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for (i, &x) in input.iter().enumerate() {
                    let delayed = line.read(black_box(960.0 + i as f32 * 0.37));
                    line.write(x);
                    sum += delayed;
                }
                sum
            })
        });
    }

    group.finish();
}
