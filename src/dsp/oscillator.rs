use std::f32::consts::TAU;
use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::node::DspModule;
use crate::dsp::param::{AtomicChoice, AtomicF32, Choice};
use crate::DEFAULT_SAMPLE_RATE;

/*
Band-Limited Oscillator
=======================

The oscillator is the raw sound source of the acid voice. It runs a phase
accumulator in [0, 1) and turns that phase into one of twelve waveforms.

Vocabulary
----------

  phase       Position inside the current cycle, 0.0 to 1.0. Wraps to 0.0
              when it passes 1.0.

  dt          Phase increment per sample = frequency / sample_rate. Also the
              width (in phase units) of the band-limiting correction.

  slide       Portamento. The running frequency chases the target frequency
              exponentially, so a new note glides instead of jumping:

                  running = running * c + target * (1 - c)
                  c       = exp(-1 / (slide_time * sample_rate))


Aliasing and PolyBLEP
---------------------

A naive sawtooth (2 * phase - 1) has an infinitely sharp drop at the wrap.
That edge contains harmonics above Nyquist which fold back down as
inharmonic junk. PolyBLEP subtracts a tiny two-sample polynomial around each
hard edge, rounding it off just enough to kill most of the aliasing:

    naive saw        with polyBLEP

      /|  /|           /\   /\
     / | / |          /  | /  |
    /  |/  |         /   \/   \

Sawtooth, square and the pulse shapes get the correction. Triangle, sine and
FM have no hard edge and are computed directly.


Waveform Set
------------

  Sawtooth     Classic acid source, all harmonics.
  Square       Odd harmonics, hollow.
  Triangle     Soft, weak odd harmonics.
  Sine         Fundamental only.
  Pulse        25% duty pulse, nasal.
  NarrowPulse  12.5% duty pulse, thin and buzzy.
  SuperSaw     Seven detuned saws, centre voice loudest.
  Sync         Slave saw at 2.5x the master, reset on every master cycle.
  Fm           Sine carrier phase-modulated by a sine at 2x, index 2.
  Noise        Uniform white noise from a seeded generator.
  SawSquare    Saw and square blended 50/50.
  SubSaw       Saw plus a square one octave below.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Waveform {
    #[default]
    Sawtooth,
    Square,
    Triangle,
    Sine,
    Pulse,
    NarrowPulse,
    SuperSaw,
    Sync,
    Fm,
    Noise,
    SawSquare,
    SubSaw,
}

impl Waveform {
    pub const ALL: [Waveform; 12] = [
        Waveform::Sawtooth,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sine,
        Waveform::Pulse,
        Waveform::NarrowPulse,
        Waveform::SuperSaw,
        Waveform::Sync,
        Waveform::Fm,
        Waveform::Noise,
        Waveform::SawSquare,
        Waveform::SubSaw,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sawtooth => "Saw",
            Waveform::Square => "Square",
            Waveform::Triangle => "Triangle",
            Waveform::Sine => "Sine",
            Waveform::Pulse => "Pulse",
            Waveform::NarrowPulse => "Narrow Pulse",
            Waveform::SuperSaw => "SuperSaw",
            Waveform::Sync => "Sync",
            Waveform::Fm => "FM",
            Waveform::Noise => "Noise",
            Waveform::SawSquare => "Saw+Square",
            Waveform::SubSaw => "Sub Saw",
        }
    }
}

impl Choice for Waveform {
    const COUNT: u8 = 12;

    fn index(self) -> u8 {
        self as u8
    }

    fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

const MIN_FREQUENCY: f32 = 20.0;
/// Highest target frequency as a fraction of the sample rate (0.98 x Nyquist).
const MAX_FREQUENCY_RATIO: f32 = 0.49;
const MAX_FINE_TUNE_CENTS: f32 = 50.0;
const MIN_SLIDE_TIME: f32 = 0.001;
const MAX_SLIDE_TIME: f32 = 0.5;

/// Relative frequencies of the seven SuperSaw voices. Index 3 is the centre.
const SUPERSAW_DETUNE: [f32; 7] = [
    0.988_998, 0.993_712, 0.998_048, 1.0, 1.001_991, 1.006_217, 1.010_745,
];
const SUPERSAW_SIDE_GAIN: f32 = 0.5;
/// 1 / (centre gain + 6 side gains)
const SUPERSAW_NORM: f32 = 0.25;

const SYNC_RATIO: f32 = 2.5;
const FM_RATIO: f32 = 2.0;
const FM_INDEX: f32 = 2.0;
const NOISE_SEED: u64 = 0x303;

/// Shared oscillator parameters.
#[derive(Debug)]
pub struct OscillatorParams {
    frequency: AtomicF32,
    waveform: AtomicChoice<Waveform>,
    fine_tune_cents: AtomicF32,
    slide_time: AtomicF32,
    max_frequency: AtomicF32,
}

impl OscillatorParams {
    fn new() -> Self {
        Self {
            frequency: AtomicF32::new(440.0),
            waveform: AtomicChoice::new(Waveform::Sawtooth),
            fine_tune_cents: AtomicF32::new(0.0),
            slide_time: AtomicF32::new(0.02),
            max_frequency: AtomicF32::new(DEFAULT_SAMPLE_RATE * MAX_FREQUENCY_RATIO),
        }
    }

    /// Target frequency in Hz, clamped to (20 Hz, 0.98 x Nyquist).
    pub fn set_frequency(&self, hz: f32) {
        self.frequency
            .store_clamped(hz, MIN_FREQUENCY, self.max_frequency.load());
    }

    pub fn frequency(&self) -> f32 {
        self.frequency.load()
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform);
    }

    /// Select by host choice index (0-11). Out-of-range is ignored.
    pub fn set_waveform_index(&self, index: u8) {
        self.waveform.store_index(index);
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform.load()
    }

    /// Fine tune in cents, clamped to +-50.
    pub fn set_fine_tune(&self, cents: f32) {
        self.fine_tune_cents
            .store_clamped(cents, -MAX_FINE_TUNE_CENTS, MAX_FINE_TUNE_CENTS);
    }

    pub fn fine_tune(&self) -> f32 {
        self.fine_tune_cents.load()
    }

    /// Portamento time constant in seconds (1 ms - 500 ms).
    pub fn set_slide_time(&self, seconds: f32) {
        self.slide_time
            .store_clamped(seconds, MIN_SLIDE_TIME, MAX_SLIDE_TIME);
    }

    pub fn slide_time(&self) -> f32 {
        self.slide_time.load()
    }
}

pub struct Oscillator {
    params: Arc<OscillatorParams>,
    sample_rate: f32,

    phase: f32,
    /// Running frequency after slide smoothing.
    frequency: f32,

    supersaw_phases: [f32; 7],
    sync_phase: f32,
    fm_phase: f32,
    sub_phase: f32,
    rng: StdRng,
}

impl Oscillator {
    pub fn new() -> Self {
        let params = Arc::new(OscillatorParams::new());
        let frequency = params.frequency();
        Self {
            params,
            sample_rate: DEFAULT_SAMPLE_RATE,
            phase: 0.0,
            frequency,
            supersaw_phases: [0.0; 7],
            sync_phase: 0.0,
            fm_phase: 0.0,
            sub_phase: 0.0,
            rng: StdRng::seed_from_u64(NOISE_SEED),
        }
    }

    /// Handle for a control thread.
    pub fn params(&self) -> Arc<OscillatorParams> {
        Arc::clone(&self.params)
    }

    pub fn set_frequency(&self, hz: f32) {
        self.params.set_frequency(hz);
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.params.set_waveform(waveform);
    }

    pub fn set_fine_tune(&self, cents: f32) {
        self.params.set_fine_tune(cents);
    }

    pub fn set_slide_time(&self, seconds: f32) {
        self.params.set_slide_time(seconds);
    }

    /// Current running (slid) frequency in Hz.
    pub fn current_frequency(&self) -> f32 {
        self.frequency
    }

    fn target_frequency(&self) -> f32 {
        let mut target = self
            .params
            .frequency()
            .clamp(MIN_FREQUENCY, self.sample_rate * MAX_FREQUENCY_RATIO);
        let cents = self.params.fine_tune();
        if cents != 0.0 {
            target *= 2.0_f32.powf(cents / 1200.0);
        }
        target
    }

    #[inline]
    fn saw(phase: f32, dt: f32) -> f32 {
        2.0 * phase - 1.0 - poly_blep(phase, dt)
    }

    #[inline]
    fn pulse(phase: f32, dt: f32, duty: f32) -> f32 {
        let naive = if phase < duty { 1.0 } else { -1.0 };
        let mut falling = phase + (1.0 - duty);
        if falling >= 1.0 {
            falling -= 1.0;
        }
        naive + poly_blep(phase, dt) - poly_blep(falling, dt)
    }

    fn supersaw(&mut self, dt: f32) -> f32 {
        let mut sum = 0.0;
        for (i, (phase, ratio)) in self
            .supersaw_phases
            .iter_mut()
            .zip(SUPERSAW_DETUNE)
            .enumerate()
        {
            let voice_dt = dt * ratio;
            let gain = if i == 3 { 1.0 } else { SUPERSAW_SIDE_GAIN };
            sum += Self::saw(*phase, voice_dt) * gain;
            *phase = wrap(*phase + voice_dt);
        }
        sum * SUPERSAW_NORM
    }

    fn sync(&mut self, dt: f32) -> f32 {
        let slave_dt = dt * SYNC_RATIO;
        let out = Self::saw(self.sync_phase, slave_dt);
        self.sync_phase = wrap(self.sync_phase + slave_dt);
        out
    }

    fn fm(&mut self, dt: f32) -> f32 {
        let modulator = (TAU * self.fm_phase).sin();
        self.fm_phase = wrap(self.fm_phase + dt * FM_RATIO);
        (TAU * self.phase + FM_INDEX * modulator).sin()
    }

    fn sub_saw(&mut self, dt: f32) -> f32 {
        let sub_dt = dt * 0.5;
        let sub = Self::pulse(self.sub_phase, sub_dt, 0.5);
        self.sub_phase = wrap(self.sub_phase + sub_dt);
        Self::saw(self.phase, dt) * 0.65 + sub * 0.35
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl DspModule for Oscillator {
    fn prepare(&mut self, sample_rate: f32, _max_block: usize) {
        self.sample_rate = sample_rate;
        self.params
            .max_frequency
            .store(sample_rate * MAX_FREQUENCY_RATIO);
        self.frequency = self.target_frequency();
        self.reset();
        log::debug!("oscillator prepared at {sample_rate} Hz");
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.supersaw_phases = [0.0; 7];
        self.sync_phase = 0.0;
        self.fm_phase = 0.0;
        self.sub_phase = 0.0;
        self.rng = StdRng::seed_from_u64(NOISE_SEED);
    }

    fn process_sample(&mut self, _input: f32) -> f32 {
        let target = self.target_frequency();
        let coeff = (-1.0 / (self.params.slide_time() * self.sample_rate)).exp();
        self.frequency = self.frequency * coeff + target * (1.0 - coeff);

        let dt = self.frequency / self.sample_rate;
        let phase = self.phase;

        let output = match self.params.waveform() {
            Waveform::Sawtooth => Self::saw(phase, dt),
            Waveform::Square => Self::pulse(phase, dt, 0.5),
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Pulse => Self::pulse(phase, dt, 0.25),
            Waveform::NarrowPulse => Self::pulse(phase, dt, 0.125),
            Waveform::SuperSaw => self.supersaw(dt),
            Waveform::Sync => self.sync(dt),
            Waveform::Fm => self.fm(dt),
            Waveform::Noise => self.rng.gen_range(-1.0..=1.0),
            Waveform::SawSquare => 0.5 * (Self::saw(phase, dt) + Self::pulse(phase, dt, 0.5)),
            Waveform::SubSaw => self.sub_saw(dt),
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
            // Hard sync: slave restarts with every master cycle
            self.sync_phase = 0.0;
        }

        output.clamp(-1.0, 1.0)
    }
}

#[inline]
fn wrap(phase: f32) -> f32 {
    if phase >= 1.0 {
        phase - 1.0
    } else {
        phase
    }
}

/// Polynomial band-limited step correction for a discontinuity at phase 0.
///
/// `t` is the phase in [0, 1), `dt` the per-sample increment.
#[inline]
pub fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }

    if t < dt {
        let t = t / dt;
        t * t - 2.0 * t + 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt + 1.0;
        t * t + 2.0 * t - 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(waveform: Waveform, frequency: f32, sample_rate: f32) -> Oscillator {
        let mut osc = Oscillator::new();
        osc.set_waveform(waveform);
        osc.set_frequency(frequency);
        osc.prepare(sample_rate, 512);
        // set again now that the Nyquist limit is known
        osc.set_frequency(frequency);
        osc.prepare(sample_rate, 512);
        osc
    }

    fn rising_zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| w[0] < 0.0 && w[1] >= 0.0)
            .count()
    }

    #[test]
    fn every_waveform_stays_finite_and_bounded() {
        for &sample_rate in &[44_100.0, 48_000.0, 96_000.0] {
            for waveform in Waveform::ALL {
                for &frequency in &[20.0, 110.0, 440.0, 5_000.0, 18_000.0] {
                    let mut osc = prepared(waveform, frequency, sample_rate);
                    for _ in 0..10_000 {
                        let out = osc.process_sample(0.0);
                        assert!(out.is_finite(), "{waveform:?} at {frequency} Hz");
                        assert!(out.abs() <= 1.5, "{waveform:?} at {frequency} Hz: {out}");
                    }
                }
            }
        }
    }

    #[test]
    fn sawtooth_period_matches_frequency() {
        let mut osc = prepared(Waveform::Sawtooth, 440.0, 44_100.0);
        let samples: Vec<f32> = (0..44_100).map(|_| osc.process_sample(0.0)).collect();
        let crossings = rising_zero_crossings(&samples);
        assert!((438..=442).contains(&crossings), "got {crossings}");
    }

    #[test]
    fn fine_tune_raises_pitch() {
        let mut plain = prepared(Waveform::Sine, 1_000.0, 44_100.0);
        let mut tuned = prepared(Waveform::Sine, 1_000.0, 44_100.0);
        tuned.set_fine_tune(50.0);
        tuned.prepare(44_100.0, 512);

        let plain: Vec<f32> = (0..44_100).map(|_| plain.process_sample(0.0)).collect();
        let tuned: Vec<f32> = (0..44_100).map(|_| tuned.process_sample(0.0)).collect();
        // +50 cents = x1.0293
        let expected = (1_000.0 * 2.0_f32.powf(50.0 / 1200.0)).round() as usize;
        assert!(rising_zero_crossings(&tuned) > rising_zero_crossings(&plain));
        assert!(rising_zero_crossings(&tuned).abs_diff(expected) <= 2);
    }

    #[test]
    fn setters_clamp_to_valid_ranges() {
        let mut osc = Oscillator::new();
        osc.prepare(44_100.0, 512);
        let params = osc.params();

        osc.set_frequency(1.0);
        assert_eq!(params.frequency(), MIN_FREQUENCY);
        osc.set_frequency(1.0e6);
        assert!((params.frequency() - 44_100.0 * 0.49).abs() < 1e-2);
        osc.set_fine_tune(-400.0);
        assert_eq!(params.fine_tune(), -50.0);
        osc.set_slide_time(10.0);
        assert_eq!(params.slide_time(), MAX_SLIDE_TIME);
    }

    #[test]
    fn slide_glides_towards_new_target() {
        let mut osc = prepared(Waveform::Sawtooth, 110.0, 44_100.0);
        osc.set_slide_time(0.05);
        osc.set_frequency(220.0);

        osc.process_sample(0.0);
        let after_one = osc.current_frequency();
        assert!(after_one > 110.0 && after_one < 115.0, "got {after_one}");

        // ten time constants
        for _ in 0..(0.5 * 44_100.0) as usize {
            osc.process_sample(0.0);
        }
        assert!((osc.current_frequency() - 220.0).abs() < 0.1);
    }

    #[test]
    fn noise_is_reproducible_after_reset() {
        let mut osc = prepared(Waveform::Noise, 440.0, 44_100.0);
        let first: Vec<f32> = (0..64).map(|_| osc.process_sample(0.0)).collect();
        osc.reset();
        let second: Vec<f32> = (0..64).map(|_| osc.process_sample(0.0)).collect();
        assert_eq!(first, second);
        assert!(first.iter().any(|s| *s > 0.0) && first.iter().any(|s| *s < 0.0));
    }

    #[test]
    fn hard_sync_differs_from_plain_saw() {
        let mut saw = prepared(Waveform::Sawtooth, 220.0, 44_100.0);
        let mut sync = prepared(Waveform::Sync, 220.0, 44_100.0);
        let diff: f32 = (0..1_000)
            .map(|_| (saw.process_sample(0.0) - sync.process_sample(0.0)).abs())
            .sum();
        assert!(diff > 10.0);
    }

    #[test]
    fn reset_twice_matches_reset_once() {
        let mut a = prepared(Waveform::SuperSaw, 330.0, 48_000.0);
        let mut b = prepared(Waveform::SuperSaw, 330.0, 48_000.0);
        for _ in 0..777 {
            a.process_sample(0.0);
            b.process_sample(0.0);
        }
        a.reset();
        b.reset();
        b.reset();
        for _ in 0..256 {
            assert_eq!(a.process_sample(0.0), b.process_sample(0.0));
        }
    }

    #[test]
    fn waveform_index_round_trips_and_ignores_garbage() {
        let osc = Oscillator::new();
        osc.params().set_waveform_index(8);
        assert_eq!(osc.params().waveform(), Waveform::Fm);
        osc.params().set_waveform_index(12);
        assert_eq!(osc.params().waveform(), Waveform::Fm);
    }
}
