//! Overdrive / Waveshaping
//!
//! Distortion adds harmonics by reshaping the waveform. The "drive" parameter
//! controls how hard the signal is pushed into the nonlinear region of the
//! transfer function:
//!
//!   output = f(input * drive)
//!
//! # Modes
//!
//! Soft:
//!   f(x) = tanh(x) / tanh(drive)
//!   - Warm, tube-like, normalized so full-scale input stays near full scale
//!
//! Classic:
//!   f(x) = 0.9 tanh(1.2x) for x > 0, 1.1 tanh(0.8x) otherwise
//!   - Asymmetric clipper, adds even harmonics (and DC, see below)
//!
//! Saturated:
//!   f(x) = x - x^3/3 on x clamped to +-1.5
//!   - Cubic soft clip, the classic polynomial saturator
//!
//! Fuzz:
//!   0.7 * hard_clip(2x) + 0.3 * |2x| * sign(input)
//!   - The rectified part adds octave-up content
//!
//! Tape:
//!   Linear below 0.5, half slope to 1.0, one tenth slope beyond
//!   - Gentle soft-knee compression
//!
//! Asymmetric curves leave a DC offset, so the shaped signal runs through a
//! one-pole DC blocker before the dry/wet mix:
//!
//!   y[n] = x[n] - x[n-1] + 0.995 * y[n-1]
//!
//! # Drive Values
//!
//!   1.0  = Clean (stage bypassed)
//!   2-4  = Warm saturation
//!   5-10 = Obvious distortion

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::node::DspModule;
use crate::dsp::param::{AtomicChoice, AtomicF32, Choice};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DriveMode {
    Soft,
    #[default]
    Classic,
    Saturated,
    Fuzz,
    Tape,
}

impl DriveMode {
    pub const ALL: [DriveMode; 5] = [
        DriveMode::Soft,
        DriveMode::Classic,
        DriveMode::Saturated,
        DriveMode::Fuzz,
        DriveMode::Tape,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DriveMode::Soft => "Soft",
            DriveMode::Classic => "Classic",
            DriveMode::Saturated => "Saturated",
            DriveMode::Fuzz => "Fuzz",
            DriveMode::Tape => "Tape",
        }
    }
}

impl Choice for DriveMode {
    const COUNT: u8 = 5;

    fn index(self) -> u8 {
        self as u8
    }

    fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

const MIN_DRIVE: f32 = 1.0;
const MAX_DRIVE: f32 = 10.0;
/// Drive at or below this is treated as clean and skips the stage entirely.
const BYPASS_DRIVE: f32 = 1.01;
const DC_COEFF: f32 = 0.995;

/// Soft clipping, normalized by tanh(drive).
#[inline]
pub fn soft(sample: f32, drive: f32) -> f32 {
    (sample * drive).tanh() / drive.tanh()
}

/// Asymmetric tanh clipper, harder on the positive half.
#[inline]
pub fn classic(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    if x > 0.0 {
        (x * 1.2).tanh() * 0.9
    } else {
        (x * 0.8).tanh() * 1.1
    }
}

/// Cubic saturator x - x^3/3.
#[inline]
pub fn saturated(sample: f32, drive: f32) -> f32 {
    let x = (sample * drive).clamp(-1.5, 1.5);
    (x - x * x * x / 3.0).clamp(-1.0, 1.0)
}

/// Hard clip blended with a full-wave rectified copy.
#[inline]
pub fn fuzz(sample: f32, drive: f32) -> f32 {
    let x = sample * drive * 2.0;
    let clipped = x.clamp(-1.0, 1.0);
    clipped * 0.7 + x.abs() * 0.3
}

/// Three-segment soft-knee compression curve.
#[inline]
pub fn tape(sample: f32, drive: f32) -> f32 {
    let x = sample * drive * 0.7;
    let magnitude = x.abs();
    let sign = if x >= 0.0 { 1.0 } else { -1.0 };

    if magnitude < 0.5 {
        x
    } else if magnitude < 1.0 {
        sign * (0.5 + (magnitude - 0.5) * 0.5)
    } else {
        sign * (0.75 + (magnitude - 1.0) * 0.1)
    }
}

/// Shared overdrive parameters.
#[derive(Debug)]
pub struct OverdriveParams {
    drive: AtomicF32,
    mode: AtomicChoice<DriveMode>,
    mix: AtomicF32,
}

impl OverdriveParams {
    fn new() -> Self {
        Self {
            drive: AtomicF32::new(MIN_DRIVE),
            mode: AtomicChoice::new(DriveMode::Classic),
            mix: AtomicF32::new(1.0),
        }
    }

    /// Drive amount, clamped to [1, 10].
    pub fn set_drive(&self, drive: f32) {
        self.drive.store_clamped(drive, MIN_DRIVE, MAX_DRIVE);
    }

    pub fn drive(&self) -> f32 {
        self.drive.load()
    }

    pub fn set_mode(&self, mode: DriveMode) {
        self.mode.store(mode);
    }

    /// Select by host choice index (0-4). Out-of-range is ignored.
    pub fn set_mode_index(&self, index: u8) {
        self.mode.store_index(index);
    }

    pub fn mode(&self) -> DriveMode {
        self.mode.load()
    }

    pub fn set_mix(&self, mix: f32) {
        self.mix.store_clamped(mix, 0.0, 1.0);
    }

    pub fn mix(&self) -> f32 {
        self.mix.load()
    }
}

pub struct Overdrive {
    params: Arc<OverdriveParams>,
    dc_in: f32,
    dc_out: f32,
}

impl Overdrive {
    pub fn new() -> Self {
        Self {
            params: Arc::new(OverdriveParams::new()),
            dc_in: 0.0,
            dc_out: 0.0,
        }
    }

    /// Handle for a control thread.
    pub fn params(&self) -> Arc<OverdriveParams> {
        Arc::clone(&self.params)
    }

    pub fn set_drive(&self, drive: f32) {
        self.params.set_drive(drive);
    }

    pub fn set_mode(&self, mode: DriveMode) {
        self.params.set_mode(mode);
    }

    pub fn set_mix(&self, mix: f32) {
        self.params.set_mix(mix);
    }
}

impl Default for Overdrive {
    fn default() -> Self {
        Self::new()
    }
}

impl DspModule for Overdrive {
    fn prepare(&mut self, _sample_rate: f32, _max_block: usize) {
        self.reset();
    }

    fn reset(&mut self) {
        self.dc_in = 0.0;
        self.dc_out = 0.0;
    }

    fn process_sample(&mut self, input: f32) -> f32 {
        let drive = self.params.drive();
        if drive <= BYPASS_DRIVE {
            return input;
        }

        let shaped = match self.params.mode() {
            DriveMode::Soft => soft(input, drive),
            DriveMode::Classic => classic(input, drive),
            DriveMode::Saturated => saturated(input, drive),
            DriveMode::Fuzz => fuzz(input, drive),
            DriveMode::Tape => tape(input, drive),
        };

        let blocked = shaped - self.dc_in + DC_COEFF * self.dc_out;
        self.dc_in = shaped;
        self.dc_out = blocked;

        let mix = self.params.mix();
        input * (1.0 - mix) + blocked * mix
    }
}
