//! Benchmarks for the overdrive modes.

use std::hint::black_box;

use acid_dsp::dsp::{DriveMode, DspModule, Overdrive};
use criterion::{BenchmarkId, Criterion};

use crate::{ramp, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        let input = ramp(size);

        for mode in DriveMode::ALL {
            let mut drive = Overdrive::new();
            drive.set_drive(5.0);
            drive.set_mode(mode);
            drive.prepare(SAMPLE_RATE, size);

            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(mode.name(), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    drive.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
