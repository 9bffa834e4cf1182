use std::f32::consts::PI;
use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::delay::DelayLine;
use crate::dsp::lfo::{bipolar_to_unipolar, Lfo};
use crate::dsp::node::DspModule;
use crate::dsp::param::{AtomicChoice, AtomicF32, Choice};
use crate::dsp::reverb::SchroederReverb;
use crate::DEFAULT_SAMPLE_RATE;

/*
Time-Based Effects
==================

The last stage of the voice. One of eight algorithms runs at a time and the
result is blended with the dry signal:

    out = dry * (1 - mix) + wet * mix

    ┌────────────┬───────────────────────────────────────────────────────┐
    │ TapeDelay  │ delay read wobbles with wow (0.3 Hz sine) and flutter │
    │            │ (random jitter), feedback saturates through tanh      │
    │ Digital    │ clean delay, clean feedback                           │
    │ PingPong   │ two lines feeding each other, mono-summed             │
    │ Reverb     │ 4 combs + 2 allpasses (see reverb.rs)                 │
    │ Chorus     │ 10-30 ms delay swept by the LFO                       │
    │ Flanger    │ ~0-7 ms delay swept by the LFO, with feedback         │
    │ Phaser     │ 6 first-order allpasses swept 200-1600 Hz             │
    │ Bitcrush   │ 16..2 bit quantizer plus sample-and-hold              │
    └────────────┴───────────────────────────────────────────────────────┘

Vocabulary
----------

  time        Delay time in ms (10-2000). Used by the three delays.

  feedback    How much of the wet output is fed back in (0-0.95). The reverb
              uses it as decay, comb feedback 0.7 + 0.25 * feedback.

  mod depth   0-1. LFO sweep width for chorus/flanger/phaser, bit reduction
              for bitcrush.

  mod rate    0.1-10 Hz. LFO speed for chorus/flanger/phaser, hold length
              for bitcrush.

Every delay line is two seconds long and allocated in prepare(). Delay reads
interpolate linearly between the two nearest whole-sample offsets.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EffectType {
    #[default]
    TapeDelay,
    DigitalDelay,
    PingPong,
    Reverb,
    Chorus,
    Flanger,
    Phaser,
    Bitcrush,
}

impl EffectType {
    pub const ALL: [EffectType; 8] = [
        EffectType::TapeDelay,
        EffectType::DigitalDelay,
        EffectType::PingPong,
        EffectType::Reverb,
        EffectType::Chorus,
        EffectType::Flanger,
        EffectType::Phaser,
        EffectType::Bitcrush,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectType::TapeDelay => "Tape Delay",
            EffectType::DigitalDelay => "Digital Delay",
            EffectType::PingPong => "Ping Pong",
            EffectType::Reverb => "Reverb",
            EffectType::Chorus => "Chorus",
            EffectType::Flanger => "Flanger",
            EffectType::Phaser => "Phaser",
            EffectType::Bitcrush => "Bitcrush",
        }
    }
}

impl Choice for EffectType {
    const COUNT: u8 = 8;

    fn index(self) -> u8 {
        self as u8
    }

    fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

const MAX_DELAY_SECONDS: f32 = 2.0;
const MIN_TIME_MS: f32 = 10.0;
const MAX_TIME_MS: f32 = 2000.0;
const MAX_FEEDBACK: f32 = 0.95;
const MIN_MOD_RATE: f32 = 0.1;
const MAX_MOD_RATE: f32 = 10.0;

const WOW_RATE: f32 = 0.3;
const WOW_DEPTH: f32 = 0.002;
const FLUTTER_DEPTH: f32 = 0.002;
const FLUTTER_SEED: u64 = 0x7a9e;

const CHORUS_CENTRE_MS: f32 = 20.0;
const CHORUS_SWING_MS: f32 = 10.0;
const FLANGER_CENTRE_MS: f32 = 2.0;
const FLANGER_SWING_MS: f32 = 5.0;

const PHASER_STAGES: usize = 6;
const PHASER_MIN_HZ: f32 = 200.0;
const PHASER_MAX_HZ: f32 = 1600.0;

/// Shared effect parameters.
#[derive(Debug)]
pub struct EffectsParams {
    effect: AtomicChoice<EffectType>,
    time_ms: AtomicF32,
    feedback: AtomicF32,
    mix: AtomicF32,
    mod_depth: AtomicF32,
    mod_rate: AtomicF32,
}

impl EffectsParams {
    fn new() -> Self {
        Self {
            effect: AtomicChoice::new(EffectType::TapeDelay),
            time_ms: AtomicF32::new(250.0),
            feedback: AtomicF32::new(0.5),
            mix: AtomicF32::new(0.3),
            mod_depth: AtomicF32::new(0.5),
            mod_rate: AtomicF32::new(0.5),
        }
    }

    pub fn set_type(&self, effect: EffectType) {
        self.effect.store(effect);
    }

    /// Select by host choice index (0-7). Out-of-range is ignored.
    pub fn set_type_index(&self, index: u8) {
        self.effect.store_index(index);
    }

    pub fn effect_type(&self) -> EffectType {
        self.effect.load()
    }

    /// Delay time in ms, clamped to [10, 2000].
    pub fn set_time(&self, ms: f32) {
        self.time_ms.store_clamped(ms, MIN_TIME_MS, MAX_TIME_MS);
    }

    pub fn time(&self) -> f32 {
        self.time_ms.load()
    }

    pub fn set_feedback(&self, feedback: f32) {
        self.feedback.store_clamped(feedback, 0.0, MAX_FEEDBACK);
    }

    pub fn feedback(&self) -> f32 {
        self.feedback.load()
    }

    pub fn set_mix(&self, mix: f32) {
        self.mix.store_clamped(mix, 0.0, 1.0);
    }

    pub fn mix(&self) -> f32 {
        self.mix.load()
    }

    pub fn set_mod_depth(&self, depth: f32) {
        self.mod_depth.store_clamped(depth, 0.0, 1.0);
    }

    pub fn mod_depth(&self) -> f32 {
        self.mod_depth.load()
    }

    /// Modulation rate in Hz, clamped to [0.1, 10].
    pub fn set_mod_rate(&self, hz: f32) {
        self.mod_rate.store_clamped(hz, MIN_MOD_RATE, MAX_MOD_RATE);
    }

    pub fn mod_rate(&self) -> f32 {
        self.mod_rate.load()
    }
}

pub struct Effects {
    params: Arc<EffectsParams>,
    sample_rate: f32,

    delay: DelayLine,
    delay_right: DelayLine,
    reverb: SchroederReverb,

    lfo: Lfo,
    wow: Lfo,
    flutter: StdRng,

    phaser_state: [f32; PHASER_STAGES],
    phaser_last: f32,

    crush_held: f32,
    crush_counter: u32,
}

impl Effects {
    pub fn new() -> Self {
        Self {
            params: Arc::new(EffectsParams::new()),
            sample_rate: DEFAULT_SAMPLE_RATE,
            delay: DelayLine::new(),
            delay_right: DelayLine::new(),
            reverb: SchroederReverb::new(),
            lfo: Lfo::new(),
            wow: Lfo::new(),
            flutter: StdRng::seed_from_u64(FLUTTER_SEED),
            phaser_state: [0.0; PHASER_STAGES],
            phaser_last: 0.0,
            crush_held: 0.0,
            crush_counter: 0,
        }
    }

    /// Handle for a control thread.
    pub fn params(&self) -> Arc<EffectsParams> {
        Arc::clone(&self.params)
    }

    pub fn set_type(&self, effect: EffectType) {
        self.params.set_type(effect);
    }

    pub fn set_time(&self, ms: f32) {
        self.params.set_time(ms);
    }

    pub fn set_feedback(&self, feedback: f32) {
        self.params.set_feedback(feedback);
    }

    pub fn set_mix(&self, mix: f32) {
        self.params.set_mix(mix);
    }

    pub fn set_mod_depth(&self, depth: f32) {
        self.params.set_mod_depth(depth);
    }

    pub fn set_mod_rate(&self, hz: f32) {
        self.params.set_mod_rate(hz);
    }

    fn ms_to_samples(&self, ms: f32) -> f32 {
        let max = (self.delay.len().max(2) - 1) as f32;
        (ms / 1000.0 * self.sample_rate).clamp(1.0, max)
    }

    fn tape_delay(&mut self, input: f32) -> f32 {
        let wow = self.wow.next(WOW_RATE, self.sample_rate) * WOW_DEPTH;
        let flutter = self.flutter.gen_range(-FLUTTER_DEPTH..FLUTTER_DEPTH);
        let delay = self.ms_to_samples(self.params.time() * (1.0 + wow + flutter));

        let delayed = self.delay.read(delay);
        let saturated = (delayed * 1.5).tanh() * 0.9;
        self.delay.write(input + saturated * self.params.feedback());
        delayed
    }

    fn digital_delay(&mut self, input: f32) -> f32 {
        let delay = self.ms_to_samples(self.params.time());
        let delayed = self.delay.read(delay);
        self.delay.write(input + delayed * self.params.feedback());
        delayed
    }

    fn ping_pong(&mut self, input: f32) -> f32 {
        let delay = self.ms_to_samples(self.params.time());
        let feedback = self.params.feedback();

        let left = self.delay.read(delay);
        let right = self.delay_right.read(delay);
        self.delay.write(input + right * feedback);
        self.delay_right.write(left * feedback);

        (left + right) * 0.5
    }

    fn chorus(&mut self, input: f32) -> f32 {
        let lfo = self.lfo.next(self.params.mod_rate(), self.sample_rate);
        let ms = CHORUS_CENTRE_MS + lfo * self.params.mod_depth() * CHORUS_SWING_MS;
        let delayed = self.delay.read(self.ms_to_samples(ms));
        self.delay.write(input);
        (input + delayed) * 0.5
    }

    fn flanger(&mut self, input: f32) -> f32 {
        let lfo = self.lfo.next(self.params.mod_rate(), self.sample_rate);
        let ms = FLANGER_CENTRE_MS + lfo * self.params.mod_depth() * FLANGER_SWING_MS;
        let delayed = self.delay.read(self.ms_to_samples(ms));
        self.delay
            .write(input + delayed * self.params.feedback() * 0.7);
        (input + delayed) * 0.5
    }

    fn phaser(&mut self, input: f32) -> f32 {
        let sweep = bipolar_to_unipolar(self.lfo.next(self.params.mod_rate(), self.sample_rate));
        let freq = PHASER_MIN_HZ + sweep * (PHASER_MAX_HZ - PHASER_MIN_HZ) * self.params.mod_depth();

        // First-order allpass (a + z^-1) / (1 + a z^-1), 90 degrees at `freq`.
        let t = (PI * freq / self.sample_rate).tan();
        let a = (t - 1.0) / (t + 1.0);

        let mut x = input + self.phaser_last * self.params.feedback() * 0.5;
        for state in self.phaser_state.iter_mut() {
            let y = a * x + *state;
            *state = x - a * y;
            x = y;
        }
        self.phaser_last = x;

        (input + x) * 0.5
    }

    fn bitcrush(&mut self, input: f32) -> f32 {
        let bits = (16.0 - self.params.mod_depth() * 14.0).clamp(2.0, 16.0) as i32;
        let levels = (1u32 << bits) as f32;
        let crushed = (input * levels).round() / levels;

        let hold = (1.0 + self.params.mod_rate() * 20.0) as u32;
        self.crush_counter += 1;
        if self.crush_counter >= hold {
            self.crush_held = crushed;
            self.crush_counter = 0;
        }
        self.crush_held
    }
}

impl Default for Effects {
    fn default() -> Self {
        Self::new()
    }
}

impl DspModule for Effects {
    fn prepare(&mut self, sample_rate: f32, _max_block: usize) {
        self.sample_rate = sample_rate;
        let len = (sample_rate * MAX_DELAY_SECONDS) as usize;
        self.delay.allocate(len);
        self.delay_right.allocate(len);
        self.reverb.prepare(sample_rate);
        self.reset();
        log::debug!("effects prepared: {len} sample delay lines at {sample_rate} Hz");
    }

    fn reset(&mut self) {
        self.delay.reset();
        self.delay_right.reset();
        self.reverb.reset();
        self.lfo.reset();
        self.wow.reset();
        self.flutter = StdRng::seed_from_u64(FLUTTER_SEED);
        self.phaser_state = [0.0; PHASER_STAGES];
        self.phaser_last = 0.0;
        self.crush_held = 0.0;
        self.crush_counter = 0;
    }

    fn process_sample(&mut self, input: f32) -> f32 {
        let wet = match self.params.effect_type() {
            EffectType::TapeDelay => self.tape_delay(input),
            EffectType::DigitalDelay => self.digital_delay(input),
            EffectType::PingPong => self.ping_pong(input),
            EffectType::Reverb => {
                self.reverb.set_decay(self.params.feedback());
                self.reverb.process(input)
            }
            EffectType::Chorus => self.chorus(input),
            EffectType::Flanger => self.flanger(input),
            EffectType::Phaser => self.phaser(input),
            EffectType::Bitcrush => self.bitcrush(input),
        };

        let mix = self.params.mix();
        input * (1.0 - mix) + wet * mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    const SAMPLE_RATE: f32 = 44_100.0;

    fn effect(effect: EffectType) -> Effects {
        let mut fx = Effects::new();
        fx.set_type(effect);
        fx.prepare(SAMPLE_RATE, 512);
        fx
    }

    fn sine(n: usize) -> f32 {
        (TAU * 220.0 * n as f32 / SAMPLE_RATE).sin()
    }

    #[test]
    fn digital_delay_reproduces_an_impulse() {
        let mut fx = effect(EffectType::DigitalDelay);
        fx.set_time(250.0);
        fx.set_feedback(0.0);
        fx.set_mix(1.0);

        let target = (0.25 * SAMPLE_RATE) as usize;
        for n in 0..target + 2_000 {
            let y = fx.process_sample(if n == 0 { 1.0 } else { 0.0 });
            if n == target {
                assert!((y - 1.0).abs() < 1e-3, "echo at {n} was {y}");
            } else {
                assert!(y.abs() < 1e-6, "unexpected output {y} at {n}");
            }
        }
    }

    #[test]
    fn zero_mix_is_dry() {
        for effect_type in EffectType::ALL {
            let mut fx = effect(effect_type);
            fx.set_mix(0.0);
            for n in 0..500 {
                let x = sine(n);
                assert!((fx.process_sample(x) - x).abs() < 1e-6, "{effect_type:?}");
            }
        }
    }

    #[test]
    fn every_algorithm_stays_bounded_at_maximum_settings() {
        for effect_type in EffectType::ALL {
            let mut fx = effect(effect_type);
            fx.set_time(MIN_TIME_MS);
            fx.set_feedback(1.0);
            fx.set_mix(1.0);
            fx.set_mod_depth(1.0);
            fx.set_mod_rate(MAX_MOD_RATE);

            for n in 0..44_100 {
                let y = fx.process_sample(sine(n));
                assert!(y.is_finite(), "{effect_type:?} at {n}");
                assert!(y.abs() < 25.0, "{effect_type:?} blew up: {y}");
            }
        }
    }

    #[test]
    fn feedback_repeats_the_echo() {
        let mut fx = effect(EffectType::DigitalDelay);
        fx.set_time(10.0);
        fx.set_feedback(0.5);
        fx.set_mix(1.0);

        let step = 441; // 10 ms
        let out: Vec<f32> = (0..step * 3 + 1)
            .map(|n| fx.process_sample(if n == 0 { 1.0 } else { 0.0 }))
            .collect();
        assert!((out[step] - 1.0).abs() < 1e-3);
        assert!((out[step * 2] - 0.5).abs() < 1e-3);
        assert!((out[step * 3] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn ping_pong_alternates_between_lines() {
        let mut fx = effect(EffectType::PingPong);
        fx.set_time(10.0);
        fx.set_feedback(0.5);
        fx.set_mix(1.0);

        let step = 441; // 10 ms
        let out: Vec<f32> = (0..step * 2 + 1)
            .map(|n| fx.process_sample(if n == 0 { 1.0 } else { 0.0 }))
            .collect();
        // Left echo, then the right line's copy at half level. Both are
        // averaged into the mono output.
        assert!((out[step] - 0.5).abs() < 1e-3);
        assert!((out[step * 2] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn reverb_tail_outlasts_the_input() {
        let mut fx = effect(EffectType::Reverb);
        fx.set_mix(1.0);
        fx.process_sample(1.0);
        let energy: f32 = (0..10_000).map(|_| fx.process_sample(0.0).powi(2)).sum();
        assert!(energy > 1e-3);
    }

    #[test]
    fn phaser_passes_dc_unchanged() {
        // Allpass stages have unity gain at DC, so a constant settles to itself.
        let mut fx = effect(EffectType::Phaser);
        fx.set_feedback(0.0);
        fx.set_mod_depth(0.0);
        fx.set_mix(1.0);
        let mut y = 0.0;
        for _ in 0..44_100 {
            y = fx.process_sample(0.5);
        }
        assert!((y - 0.5).abs() < 1e-3, "{y}");
    }

    #[test]
    fn bitcrush_quantizes_and_holds() {
        let mut fx = effect(EffectType::Bitcrush);
        fx.set_mix(1.0);
        fx.set_mod_depth(1.0); // 2 bits: steps of 0.25
        fx.set_mod_rate(0.1); // hold for 3 samples

        let out: Vec<f32> = (0..12).map(|n| fx.process_sample(0.3 + n as f32 * 0.01)).collect();
        for value in &out {
            assert_eq!((value * 4.0).fract(), 0.0, "{value} is not on the 2-bit grid");
        }
        assert!(out.windows(3).any(|w| w[0] == w[1] && w[1] == w[2]));
    }

    #[test]
    fn bitcrush_state_is_per_instance() {
        let mut a = effect(EffectType::Bitcrush);
        let mut b = effect(EffectType::Bitcrush);
        for fx in [&mut a, &mut b] {
            fx.set_mix(1.0);
            fx.set_mod_rate(1.0);
        }

        // Hold is 21 samples at full rate; run past it so `a` latches.
        let mut latched = 0.0;
        for _ in 0..25 {
            latched = a.process_sample(0.8);
        }
        assert!(latched > 0.5, "a never latched, got {latched}");

        // b keeps its own counter and held value.
        assert_eq!(b.process_sample(0.8), 0.0);
    }

    #[test]
    fn reverb_feedback_drives_comb_feedback_directly() {
        let mut fx = effect(EffectType::Reverb);
        fx.set_mix(1.0);
        fx.set_feedback(0.95);

        // 0.7 + 0.95 * 0.25
        let mut expected = SchroederReverb::new();
        expected.prepare(SAMPLE_RATE);
        expected.set_decay(0.95);

        for n in 0..4_000 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            assert_eq!(fx.process_sample(x), expected.process(x), "sample {n}");
        }
    }

    #[test]
    fn setters_clamp() {
        let fx = Effects::new();
        let params = fx.params();
        params.set_time(1.0);
        assert_eq!(params.time(), MIN_TIME_MS);
        params.set_time(9_999.0);
        assert_eq!(params.time(), MAX_TIME_MS);
        params.set_feedback(2.0);
        assert_eq!(params.feedback(), MAX_FEEDBACK);
        params.set_mod_rate(0.0);
        assert_eq!(params.mod_rate(), MIN_MOD_RATE);
        params.set_type_index(8);
        assert_eq!(params.effect_type(), EffectType::TapeDelay);
        params.set_type_index(7);
        assert_eq!(params.effect_type(), EffectType::Bitcrush);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut fx = effect(EffectType::Flanger);
        fx.set_mix(1.0);
        for n in 0..1_000 {
            fx.process_sample(sine(n));
        }

        fx.reset();
        let first: Vec<f32> = (0..64).map(|n| fx.process_sample(sine(n))).collect();
        fx.reset();
        fx.reset();
        let second: Vec<f32> = (0..64).map(|n| fx.process_sample(sine(n))).collect();
        assert_eq!(first, second);
    }
}
