use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::dsp::node::DspModule;
use crate::dsp::param::AtomicF32;
use crate::DEFAULT_SAMPLE_RATE;

/*
ADSR Envelope Implementation
============================

This module implements an exponential ADSR envelope generator. In the acid
voice its output drives both the amplitude and the filter cutoff modulation.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0).

  stage       Idle, Attack, Decay, Sustain or Release. A state machine
              governs transitions.

  coefficient Fraction of the remaining distance to the stage target that is
              covered each sample.


The Shape: Exponential Chase
----------------------------

  Level
    1.0 ┐    _
        │   / `.
    S   │  /    `-.______
        │ |              `.
    0.0 └─'────────────────`-.___→ Time
         A    D      S      R

Every stage moves the level a fixed fraction of the way towards its target:

    level += coeff * (target - level)

This is a one-pole lowpass chasing a step, which is how analog envelope
circuits (a capacitor charging through a resistor) behave. It never reaches
the target exactly, so each stage hands over once it is within EPSILON.


The Math: Time to Coefficient
-----------------------------

After n samples the remaining distance is (1 - coeff)^n. Five time constants
leave ~0.7% (99.3% complete), so for a stage time T:

    coeff = 1 - exp(-5 / (T * sample_rate))

Coefficients are recalculated at note_on and prepare, picking up whatever
times the control thread last wrote.


The State Machine
-----------------

    Idle --note_on--> Attack --~1.0--> Decay --~S--> Sustain
                        ^                              |
                        |  note_on (any stage)         | note_off
                        |                              v
    Idle <----~0.0---------------------------------- Release

note_on is a hard retrigger: from any stage it jumps back to Attack, and the
attack chase starts from the current level. note_off from any stage enters
Release. Sustain re-reads the sustain parameter every sample so live edits
are heard immediately.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,    // Gate low, level = 0
    Attack,  // Chasing 1.0
    Decay,   // Chasing sustain level
    Sustain, // Pinned to sustain level while gate is high
    Release, // Chasing 0.0
}

impl EnvelopeStage {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => EnvelopeStage::Attack,
            2 => EnvelopeStage::Decay,
            3 => EnvelopeStage::Sustain,
            4 => EnvelopeStage::Release,
            _ => EnvelopeStage::Idle,
        }
    }
}

const MIN_TIME: f32 = 0.001;
const MAX_TIME: f32 = 10.0;
const EPSILON: f32 = 1.0e-3;

/// Shared envelope parameters (times in seconds).
#[derive(Debug)]
pub struct EnvelopeParams {
    attack: AtomicF32,
    decay: AtomicF32,
    sustain: AtomicF32,
    release: AtomicF32,
}

impl EnvelopeParams {
    fn new() -> Self {
        Self {
            attack: AtomicF32::new(0.001),
            decay: AtomicF32::new(0.3),
            sustain: AtomicF32::new(0.7),
            release: AtomicF32::new(0.3),
        }
    }

    pub fn set_attack(&self, seconds: f32) {
        self.attack.store_clamped(seconds, MIN_TIME, MAX_TIME);
    }

    pub fn set_decay(&self, seconds: f32) {
        self.decay.store_clamped(seconds, MIN_TIME, MAX_TIME);
    }

    pub fn set_sustain(&self, level: f32) {
        self.sustain.store_clamped(level, 0.0, 1.0);
    }

    pub fn set_release(&self, seconds: f32) {
        self.release.store_clamped(seconds, MIN_TIME, MAX_TIME);
    }

    pub fn attack(&self) -> f32 {
        self.attack.load()
    }

    pub fn decay(&self) -> f32 {
        self.decay.load()
    }

    pub fn sustain(&self) -> f32 {
        self.sustain.load()
    }

    pub fn release(&self) -> f32 {
        self.release.load()
    }
}

pub struct Envelope {
    params: Arc<EnvelopeParams>,
    sample_rate: f32,

    // Runtime state. The stage is atomic so a meter can read it from another
    // thread through `stage_handle`.
    stage: Arc<AtomicU8>,
    level: f32,

    attack_coeff: f32,
    decay_coeff: f32,
    release_coeff: f32,
}

impl Envelope {
    pub fn new() -> Self {
        let mut env = Self {
            params: Arc::new(EnvelopeParams::new()),
            sample_rate: DEFAULT_SAMPLE_RATE,
            stage: Arc::new(AtomicU8::new(EnvelopeStage::Idle as u8)),
            level: 0.0,
            attack_coeff: 0.0,
            decay_coeff: 0.0,
            release_coeff: 0.0,
        };
        env.update_coefficients();
        env
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let mut env = Self::new();
        env.set_attack(attack);
        env.set_decay(decay);
        env.set_sustain(sustain);
        env.set_release(release);
        env.update_coefficients();
        env
    }

    /// Handle for a control thread.
    pub fn params(&self) -> Arc<EnvelopeParams> {
        Arc::clone(&self.params)
    }

    pub fn set_attack(&self, seconds: f32) {
        self.params.set_attack(seconds);
    }

    pub fn set_decay(&self, seconds: f32) {
        self.params.set_decay(seconds);
    }

    pub fn set_sustain(&self, level: f32) {
        self.params.set_sustain(level);
    }

    pub fn set_release(&self, seconds: f32) {
        self.params.set_release(seconds);
    }

    /// Gate high: (re)enter Attack from wherever we are.
    pub fn note_on(&mut self) {
        self.update_coefficients();
        self.set_stage(EnvelopeStage::Attack);
    }

    /// Gate low: enter Release from wherever we are.
    pub fn note_off(&mut self) {
        self.set_stage(EnvelopeStage::Release);
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        self.stage() != EnvelopeStage::Idle
    }

    /// Get the current envelope level (0.0 to 1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Get the current envelope stage
    pub fn stage(&self) -> EnvelopeStage {
        EnvelopeStage::from_raw(self.stage.load(Ordering::Relaxed))
    }

    fn set_stage(&self, stage: EnvelopeStage) {
        self.stage.store(stage as u8, Ordering::Relaxed);
    }

    fn coefficient(&self, seconds: f32) -> f32 {
        if seconds <= 0.0 || self.sample_rate <= 0.0 {
            return 1.0;
        }
        1.0 - (-5.0 / (seconds * self.sample_rate)).exp()
    }

    fn update_coefficients(&mut self) {
        self.attack_coeff = self.coefficient(self.params.attack());
        self.decay_coeff = self.coefficient(self.params.decay());
        self.release_coeff = self.coefficient(self.params.release());
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl DspModule for Envelope {
    fn prepare(&mut self, sample_rate: f32, _max_block: usize) {
        self.sample_rate = sample_rate;
        self.update_coefficients();
        self.reset();
    }

    fn reset(&mut self) {
        self.level = 0.0;
        self.set_stage(EnvelopeStage::Idle);
    }

    /// Advance the envelope by one sample. `input` is ignored.
    fn process_sample(&mut self, _input: f32) -> f32 {
        match self.stage() {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                self.level += self.attack_coeff * (1.0 - self.level);

                if self.level >= 1.0 - EPSILON {
                    self.level = 1.0;
                    self.set_stage(EnvelopeStage::Decay);
                }
            }

            EnvelopeStage::Decay => {
                let sustain = self.params.sustain();
                self.level += self.decay_coeff * (sustain - self.level);

                if (self.level - sustain).abs() < EPSILON {
                    self.level = sustain;
                    self.set_stage(EnvelopeStage::Sustain);
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.params.sustain();
            }

            EnvelopeStage::Release => {
                self.level -= self.release_coeff * self.level;

                if self.level < EPSILON {
                    self.level = 0.0;
                    self.set_stage(EnvelopeStage::Idle);
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }
}
