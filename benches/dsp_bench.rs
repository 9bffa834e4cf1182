//! Benchmarks for the DSP modules and the full synth voice.
//!
//! Run with: cargo bench
//!
//! Everything here runs per sample on the audio thread, so each block must
//! finish well within its real-time deadline.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Individual modules (oscillator, ladder filter, effects, ...)
//!   - scenarios/*  The complete acid voice, with and without the arpeggiator

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

/// Sample rate every benchmark prepares at.
pub const SAMPLE_RATE: f32 = 48_000.0;

/// Sawtooth-like ramp used as filter / shaper input.
pub fn ramp(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
        .collect()
}

criterion_group!(
    benches,
    // Modules
    dsp::bench_oscillator,
    dsp::bench_envelope,
    dsp::bench_filter,
    dsp::bench_distortion,
    dsp::bench_delay,
    dsp::bench_reverb,
    dsp::bench_effects,
    // Full voice
    scenarios::bench_synth,
    scenarios::bench_arpeggiator,
);
criterion_main!(benches);
