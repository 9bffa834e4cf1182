//! Benchmarks for the complete acid voice.

use std::collections::VecDeque;
use std::hint::black_box;

use acid_dsp::{dsp::DspModule, synth::SynthMessage, AcidSynth, ParamId, Transport};
use criterion::{BenchmarkId, Criterion};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn synth_with(settings: &[(ParamId, f32)]) -> AcidSynth {
    let mut synth = AcidSynth::new();
    let controls = synth.controls();
    for &(id, value) in settings {
        controls.set(id, value);
    }
    synth.prepare(SAMPLE_RATE, 512);
    synth
}

pub fn bench_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/synth");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut queue: VecDeque<SynthMessage> = VecDeque::with_capacity(4);

        // Baseline 303: saw, squelchy filter, no drive, no effect
        let mut synth = synth_with(&[
            (ParamId::Resonance, 0.8),
            (ParamId::EnvMod, 0.8),
            (ParamId::FxMix, 0.0),
        ]);
        let mut position = 0i64;
        group.bench_with_input(BenchmarkId::new("dry", size), &size, |b, _| {
            b.iter(|| {
                queue.push_back(SynthMessage::NoteOn {
                    note: 36,
                    velocity: 1.0,
                });
                synth.render_block(
                    black_box(&mut buffer),
                    Transport::new(120.0, position),
                    &mut queue,
                );
                position += size as i64;
            })
        });

        // Worst case: supersaw through fuzz into the phaser
        let mut synth = synth_with(&[
            (ParamId::Waveform, 6.0),
            (ParamId::Resonance, 0.9),
            (ParamId::Drive, 8.0),
            (ParamId::DriveMode, 3.0),
            (ParamId::FxType, 6.0),
            (ParamId::FxMix, 0.6),
        ]);
        synth.note_on(36, 1.0);
        group.bench_with_input(BenchmarkId::new("heavy", size), &size, |b, _| {
            b.iter(|| synth.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}

pub fn bench_arpeggiator(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/arpeggiator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // 1/32 notes over three octaves keeps triggers frequent
        let mut synth = synth_with(&[
            (ParamId::ArpEnabled, 1.0),
            (ParamId::ArpMode, 2.0),
            (ParamId::ArpDivision, 5.0),
            (ParamId::ArpOctaves, 3.0),
            (ParamId::ArpSwing, 0.3),
        ]);
        for note in [36, 39, 43, 46] {
            synth.note_on(note, 0.9);
        }

        group.bench_with_input(BenchmarkId::new("updown_32nd", size), &size, |b, _| {
            b.iter(|| synth.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}
