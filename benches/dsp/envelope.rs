//! Benchmarks for the ADSR envelope.

use std::hint::black_box;

use acid_dsp::dsp::{DspModule, Envelope};
use criterion::{BenchmarkId, Criterion};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Retriggered every block: attack/decay math every sample
        let mut env = Envelope::adsr(0.005, 0.2, 0.5, 0.1);
        env.prepare(SAMPLE_RATE, size);
        group.bench_with_input(BenchmarkId::new("retrigger", size), &size, |b, _| {
            b.iter(|| {
                env.note_on();
                env.render(black_box(&mut buffer));
            })
        });

        // Steady sustain: parameter re-read per sample
        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 0.1);
        env.prepare(SAMPLE_RATE, size);
        env.note_on();
        env.render(&mut vec![0.0; 4096]);
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| env.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}
