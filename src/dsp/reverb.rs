//! Reverb - Room Simulation via Delay Networks
//!
//! Reverb simulates the sound of a space by creating many delayed
//! reflections of the input signal. This implementation uses the classic
//! Schroeder reverb algorithm.
//!
//! # Schroeder Reverb Architecture
//!
//! ```text
//! Input ──┬──→ [Comb 1] ──┐
//!         ├──→ [Comb 2] ──┤
//!         ├──→ [Comb 3] ──┼──→ (+) / 4 ──→ [Allpass 1] ──→ [Allpass 2] ──→ Output
//!         └──→ [Comb 4] ──┘
//! ```
//!
//! ## Comb Filters
//!
//! A comb filter creates a series of equally-spaced echoes that decay over time.
//!
//! ```text
//! y[n] = x[n - delay] where the line stores x[n] + feedback * y[n]
//! ```
//!
//! The four lengths (1557, 1617, 1491, 1422 samples at 44.1 kHz) share no
//! common factors, so their echo trains never line up into a metallic ring.
//!
//! ## Allpass Filters
//!
//! Allpass filters pass all frequencies equally but smear their phase, which
//! thickens the echo density without coloring the tone.
//!
//! ```text
//! y[n] = -g * x[n] + x[n - delay] + g * y[n - delay]
//! ```
//!
//! All lengths are scaled by `sample_rate / 44100` when the reverb is
//! prepared, and the buffers are allocated there once.

const REFERENCE_RATE: f32 = 44_100.0;
const COMB_LENGTHS: [usize; 4] = [1557, 1617, 1491, 1422];
const ALLPASS_LENGTHS: [usize; 2] = [225, 341];
const ALLPASS_GAIN: f32 = 0.5;

fn scaled_length(length: usize, sample_rate: f32) -> usize {
    ((length as f32 * (sample_rate / REFERENCE_RATE)) as usize).max(1)
}

/// Feedback comb filter backed by a fixed-length ring buffer.
pub struct CombFilter {
    buffer: Vec<f32>,
    pos: usize,
    feedback: f32,
}

impl CombFilter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            pos: 0,
            feedback: 0.84,
        }
    }

    /// Allocate `len` samples. Not realtime safe.
    pub fn allocate(&mut self, len: usize) {
        self.buffer = vec![0.0; len.max(1)];
        self.pos = 0;
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let Some(slot) = self.buffer.get_mut(self.pos) else {
            return 0.0;
        };

        let output = *slot;
        *slot = input + output * self.feedback;
        self.pos = (self.pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

impl Default for CombFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Schroeder allpass backed by a fixed-length ring buffer.
pub struct AllpassFilter {
    buffer: Vec<f32>,
    pos: usize,
    gain: f32,
}

impl AllpassFilter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            pos: 0,
            gain: ALLPASS_GAIN,
        }
    }

    /// Allocate `len` samples. Not realtime safe.
    pub fn allocate(&mut self, len: usize) {
        self.buffer = vec![0.0; len.max(1)];
        self.pos = 0;
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let Some(slot) = self.buffer.get_mut(self.pos) else {
            return input;
        };

        let delayed = *slot;
        let output = -self.gain * input + delayed;
        *slot = input + self.gain * output;
        self.pos = (self.pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

impl Default for AllpassFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Schroeder reverb with 4 comb filters and 2 allpass filters
pub struct SchroederReverb {
    combs: [CombFilter; 4],
    allpasses: [AllpassFilter; 2],
}

impl SchroederReverb {
    pub fn new() -> Self {
        Self {
            combs: Default::default(),
            allpasses: Default::default(),
        }
    }

    /// Size every buffer for `sample_rate` and clear. Not realtime safe.
    pub fn prepare(&mut self, sample_rate: f32) {
        for (comb, &len) in self.combs.iter_mut().zip(COMB_LENGTHS.iter()) {
            comb.allocate(scaled_length(len, sample_rate));
        }
        for (allpass, &len) in self.allpasses.iter_mut().zip(ALLPASS_LENGTHS.iter()) {
            allpass.allocate(scaled_length(len, sample_rate));
        }
    }

    /// Decay amount 0..1, mapped to comb feedback 0.7..0.95.
    pub fn set_decay(&mut self, amount: f32) {
        let feedback = 0.7 + amount.clamp(0.0, 1.0) * 0.25;
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
        }
    }

    /// Process a single sample through the reverb
    pub fn process(&mut self, input: f32) -> f32 {
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input);
        }
        output *= 0.25;

        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }

        output
    }

    /// Reset all filter states
    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}

impl Default for SchroederReverb {
    fn default() -> Self {
        Self::new()
    }
}
