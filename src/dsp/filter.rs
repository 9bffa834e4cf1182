use std::f32::consts::PI;
use std::sync::Arc;

use crate::dsp::node::DspModule;
use crate::dsp::param::AtomicF32;
use crate::DEFAULT_SAMPLE_RATE;

/*
Four-Pole Transistor Ladder
===========================

    in ──sat──(−)──▶[pole 1]──▶[pole 2]──▶[pole 3]──▶[pole 4]──┬──▶ out
               ▲                                               │
               └───────────────── k × feedback ◀───────────────┘

Each pole is a one-pole lowpass whose state is re-saturated every sample:

    stage[i] += g * (input[i] - sat(stage[i]))
    output[i] = sat(stage[i])

with sat(x) = 1.5x / (1 + |1.5x|), a cheap tanh stand-in. The saturation at
the input node and inside every pole is what bounds the loop, so resonance
can be pushed to self-oscillation without the output running away.

| symbol | meaning                    | derived from                        |
| ------ | -------------------------- | ----------------------------------- |
| g      | per-pole cutoff gain       | tan(pi * fc / sr), clamped to 0.99  |
| k      | feedback (resonance) gain  | 4r(1 + 0.5r), reaches 6 at r = 1    |
| fc     | smoothed cutoff            | cutoff * 2^(4 * env_amount * env)   |

The envelope sweeps the cutoff by up to four octaves either way. The running
cutoff chases its target with a slow one-pole (0.9995 per sample) so knob
moves and envelope steps don't zipper.
*/

const MIN_CUTOFF: f32 = 20.0;
const MAX_CUTOFF: f32 = 20_000.0;
const CUTOFF_SMOOTHING: f32 = 0.9995;
const SATURATION: f32 = 1.5;
const MAX_G: f32 = 0.99;
/// Highest usable cutoff as a fraction of the sample rate (just under Nyquist).
const MAX_CUTOFF_RATIO: f32 = 0.49;
/// Envelope modulation range in octaves.
const ENV_OCTAVES: f32 = 4.0;

/// Shared filter parameters.
#[derive(Debug)]
pub struct FilterParams {
    cutoff: AtomicF32,
    resonance: AtomicF32,
    env_amount: AtomicF32,
    env_value: AtomicF32,
}

impl FilterParams {
    fn new() -> Self {
        Self {
            cutoff: AtomicF32::new(1000.0),
            resonance: AtomicF32::new(0.0),
            env_amount: AtomicF32::new(0.0),
            env_value: AtomicF32::new(0.0),
        }
    }

    /// Cutoff in Hz, clamped to [20, 20000].
    pub fn set_cutoff(&self, hz: f32) {
        self.cutoff.store_clamped(hz, MIN_CUTOFF, MAX_CUTOFF);
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff.load()
    }

    pub fn set_resonance(&self, resonance: f32) {
        self.resonance.store_clamped(resonance, 0.0, 1.0);
    }

    pub fn resonance(&self) -> f32 {
        self.resonance.load()
    }

    /// Bipolar envelope depth, -1 (four octaves down) to 1 (four octaves up).
    pub fn set_envelope_amount(&self, amount: f32) {
        self.env_amount.store_clamped(amount, -1.0, 1.0);
    }

    pub fn envelope_amount(&self) -> f32 {
        self.env_amount.load()
    }

    /// Current envelope level, pushed once per sample by the voice.
    pub fn set_envelope_value(&self, value: f32) {
        self.env_value.store_clamped(value, 0.0, 1.0);
    }

    pub fn envelope_value(&self) -> f32 {
        self.env_value.load()
    }

    /// Cutoff after envelope modulation, before smoothing.
    fn target_cutoff(&self) -> f32 {
        let cutoff = self.cutoff();
        let amount = self.envelope_amount();
        if amount == 0.0 {
            return cutoff;
        }

        let modulation = amount * self.envelope_value();
        (cutoff * (modulation * ENV_OCTAVES).exp2()).clamp(MIN_CUTOFF, MAX_CUTOFF)
    }
}

pub struct LadderFilter {
    params: Arc<FilterParams>,
    sample_rate: f32,

    stage: [f32; 4],
    stage_sat: [f32; 4],
    feedback: f32,

    cutoff_smoothed: f32,
    g: f32,
    k: f32,
}

impl LadderFilter {
    pub fn new() -> Self {
        let params = Arc::new(FilterParams::new());
        let cutoff_smoothed = params.cutoff();
        let mut filter = Self {
            params,
            sample_rate: DEFAULT_SAMPLE_RATE,
            stage: [0.0; 4],
            stage_sat: [0.0; 4],
            feedback: 0.0,
            cutoff_smoothed,
            g: 0.0,
            k: 0.0,
        };
        filter.update_coefficients();
        filter
    }

    /// Handle for a control thread.
    pub fn params(&self) -> Arc<FilterParams> {
        Arc::clone(&self.params)
    }

    pub fn set_cutoff(&self, hz: f32) {
        self.params.set_cutoff(hz);
    }

    pub fn set_resonance(&self, resonance: f32) {
        self.params.set_resonance(resonance);
    }

    pub fn set_envelope_amount(&self, amount: f32) {
        self.params.set_envelope_amount(amount);
    }

    pub fn set_envelope_value(&self, value: f32) {
        self.params.set_envelope_value(value);
    }

    pub fn cutoff(&self) -> f32 {
        self.params.cutoff()
    }

    /// The cutoff the filter is actually running at right now.
    pub fn smoothed_cutoff(&self) -> f32 {
        self.cutoff_smoothed
    }

    #[inline]
    fn saturate(x: f32) -> f32 {
        let x = x * SATURATION;
        x / (1.0 + x.abs())
    }

    fn update_coefficients(&mut self) {
        let resonance = self.params.resonance();

        // Bilinear prewarp: wa * T / 2 reduces to tan(pi * fc / sr).
        // Past Nyquist the tangent wraps negative, so cap the cutoff first.
        let cutoff = self
            .cutoff_smoothed
            .min(self.sample_rate * MAX_CUTOFF_RATIO);
        self.g = (PI * cutoff / self.sample_rate)
            .tan()
            .clamp(f32::EPSILON, MAX_G);
        self.k = 4.0 * resonance * (1.0 + 0.5 * resonance);
    }
}

impl Default for LadderFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DspModule for LadderFilter {
    fn prepare(&mut self, sample_rate: f32, _max_block: usize) {
        self.sample_rate = sample_rate;
        self.cutoff_smoothed = self.params.target_cutoff();
        self.update_coefficients();
        self.reset();
    }

    fn reset(&mut self) {
        self.stage = [0.0; 4];
        self.stage_sat = [0.0; 4];
        self.feedback = 0.0;
    }

    fn process_sample(&mut self, input: f32) -> f32 {
        let target = self.params.target_cutoff();
        self.cutoff_smoothed =
            self.cutoff_smoothed * CUTOFF_SMOOTHING + target * (1.0 - CUTOFF_SMOOTHING);
        self.update_coefficients();

        let mut x = Self::saturate(input) - self.k * self.feedback;

        for i in 0..4 {
            self.stage[i] += self.g * (x - self.stage_sat[i]);
            self.stage_sat[i] = Self::saturate(self.stage[i]);
            x = self.stage_sat[i];
        }

        self.feedback = x;
        x
    }
}
