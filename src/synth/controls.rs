//! Flat parameter surface of the synth.
//!
//! Hosts and UIs address parameters by [`ParamId`] (or its stable string
//! name) and push plain `f32` values. Choice parameters take their index,
//! toggles take `0.0`/`1.0`. Every value lands in its own atomic cell; no two
//! parameters are ever written together.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::distortion::OverdriveParams;
use crate::dsp::effects::EffectsParams;
use crate::dsp::envelope::EnvelopeParams;
use crate::dsp::filter::FilterParams;
use crate::dsp::oscillator::OscillatorParams;
use crate::dsp::param::AtomicF32;
use crate::sequencing::arpeggiator::ArpeggiatorParams;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Waveform,
    FineTune,
    Cutoff,
    Resonance,
    EnvMod,
    Decay,
    Accent,
    SlideTime,
    Drive,
    DriveMode,
    DriveMix,
    FxType,
    FxTime,
    FxFeedback,
    FxMix,
    FxModDepth,
    FxModRate,
    ArpEnabled,
    ArpMode,
    ArpDivision,
    ArpGate,
    ArpOctaves,
    ArpSwing,
    OutputGain,
}

/// How a parameter's `f32` value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Float,
    /// Index into a closed list of `count` options.
    Choice { count: u8 },
    Integer,
    Toggle,
}

impl ParamId {
    pub const ALL: [ParamId; 24] = [
        ParamId::Waveform,
        ParamId::FineTune,
        ParamId::Cutoff,
        ParamId::Resonance,
        ParamId::EnvMod,
        ParamId::Decay,
        ParamId::Accent,
        ParamId::SlideTime,
        ParamId::Drive,
        ParamId::DriveMode,
        ParamId::DriveMix,
        ParamId::FxType,
        ParamId::FxTime,
        ParamId::FxFeedback,
        ParamId::FxMix,
        ParamId::FxModDepth,
        ParamId::FxModRate,
        ParamId::ArpEnabled,
        ParamId::ArpMode,
        ParamId::ArpDivision,
        ParamId::ArpGate,
        ParamId::ArpOctaves,
        ParamId::ArpSwing,
        ParamId::OutputGain,
    ];

    /// Stable identifier used for persistence.
    pub fn name(self) -> &'static str {
        match self {
            ParamId::Waveform => "waveform",
            ParamId::FineTune => "fineTune",
            ParamId::Cutoff => "cutoff",
            ParamId::Resonance => "resonance",
            ParamId::EnvMod => "envMod",
            ParamId::Decay => "decay",
            ParamId::Accent => "accent",
            ParamId::SlideTime => "slideTime",
            ParamId::Drive => "drive",
            ParamId::DriveMode => "driveMode",
            ParamId::DriveMix => "driveMix",
            ParamId::FxType => "fxType",
            ParamId::FxTime => "fxTime",
            ParamId::FxFeedback => "fxFeedback",
            ParamId::FxMix => "fxMix",
            ParamId::FxModDepth => "fxModDepth",
            ParamId::FxModRate => "fxModRate",
            ParamId::ArpEnabled => "arpEnabled",
            ParamId::ArpMode => "arpMode",
            ParamId::ArpDivision => "arpDivision",
            ParamId::ArpGate => "arpGate",
            ParamId::ArpOctaves => "arpOctaves",
            ParamId::ArpSwing => "arpSwing",
            ParamId::OutputGain => "outputGain",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }

    pub fn kind(self) -> ParamKind {
        match self {
            ParamId::Waveform => ParamKind::Choice { count: 12 },
            ParamId::DriveMode => ParamKind::Choice { count: 5 },
            ParamId::FxType => ParamKind::Choice { count: 8 },
            ParamId::ArpMode => ParamKind::Choice { count: 7 },
            ParamId::ArpDivision => ParamKind::Choice { count: 10 },
            ParamId::ArpOctaves => ParamKind::Integer,
            ParamId::ArpEnabled => ParamKind::Toggle,
            _ => ParamKind::Float,
        }
    }

    /// Host-facing value range (inclusive).
    pub fn range(self) -> (f32, f32) {
        match self {
            ParamId::Waveform => (0.0, 11.0),
            ParamId::FineTune => (-50.0, 50.0),
            ParamId::Cutoff => (20.0, 20_000.0),
            ParamId::Resonance => (0.0, 1.0),
            ParamId::EnvMod => (0.0, 1.0),
            ParamId::Decay => (0.01, 2.0),
            ParamId::Accent => (0.0, 1.0),
            ParamId::SlideTime => (0.001, 0.5),
            ParamId::Drive => (1.0, 10.0),
            ParamId::DriveMode => (0.0, 4.0),
            ParamId::DriveMix => (0.0, 1.0),
            ParamId::FxType => (0.0, 7.0),
            ParamId::FxTime => (10.0, 2000.0),
            ParamId::FxFeedback => (0.0, 0.95),
            ParamId::FxMix => (0.0, 1.0),
            ParamId::FxModDepth => (0.0, 1.0),
            ParamId::FxModRate => (0.1, 10.0),
            ParamId::ArpEnabled => (0.0, 1.0),
            ParamId::ArpMode => (0.0, 6.0),
            ParamId::ArpDivision => (0.0, 9.0),
            ParamId::ArpGate => (0.1, 1.0),
            ParamId::ArpOctaves => (1.0, 4.0),
            ParamId::ArpSwing => (0.0, 1.0),
            ParamId::OutputGain => (-12.0, 12.0),
        }
    }

    pub fn default_value(self) -> f32 {
        match self {
            ParamId::Waveform => 0.0,
            ParamId::FineTune => 0.0,
            ParamId::Cutoff => 1000.0,
            ParamId::Resonance => 0.5,
            ParamId::EnvMod => 0.5,
            ParamId::Decay => 0.5,
            ParamId::Accent => 0.0,
            ParamId::SlideTime => 0.1,
            ParamId::Drive => 1.0,
            ParamId::DriveMode => 1.0,
            ParamId::DriveMix => 1.0,
            ParamId::FxType => 0.0,
            ParamId::FxTime => 250.0,
            ParamId::FxFeedback => 0.5,
            ParamId::FxMix => 0.3,
            ParamId::FxModDepth => 0.5,
            ParamId::FxModRate => 0.5,
            ParamId::ArpEnabled => 0.0,
            ParamId::ArpMode => 0.0,
            ParamId::ArpDivision => 3.0,
            ParamId::ArpGate => 0.5,
            ParamId::ArpOctaves => 1.0,
            ParamId::ArpSwing => 0.0,
            ParamId::OutputGain => 0.0,
        }
    }

    /// Clamp into range; NaN becomes the range minimum. Discrete kinds round.
    pub fn normalize(self, value: f32) -> f32 {
        let (min, max) = self.range();
        let value = if value.is_nan() {
            min
        } else {
            value.clamp(min, max)
        };
        match self.kind() {
            ParamKind::Float => value,
            ParamKind::Toggle => {
                if value >= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            ParamKind::Choice { .. } | ParamKind::Integer => value.round(),
        }
    }
}

/// Voice-level parameters that belong to no single DSP module.
#[derive(Debug)]
pub struct VoiceParams {
    accent: AtomicF32,
    output_gain_db: AtomicF32,
}

impl VoiceParams {
    pub(crate) fn new() -> Self {
        Self {
            accent: AtomicF32::new(0.0),
            output_gain_db: AtomicF32::new(0.0),
        }
    }

    pub fn set_accent(&self, accent: f32) {
        self.accent.store_clamped(accent, 0.0, 1.0);
    }

    pub fn accent(&self) -> f32 {
        self.accent.load()
    }

    pub fn set_output_gain_db(&self, db: f32) {
        self.output_gain_db.store_clamped(db, -12.0, 12.0);
    }

    pub fn output_gain_db(&self) -> f32 {
        self.output_gain_db.load()
    }
}

/// Cloneable bundle of every parameter handle of one synth.
#[derive(Debug, Clone)]
pub struct Controls {
    pub oscillator: Arc<OscillatorParams>,
    pub envelope: Arc<EnvelopeParams>,
    pub filter: Arc<FilterParams>,
    pub overdrive: Arc<OverdriveParams>,
    pub effects: Arc<EffectsParams>,
    pub arpeggiator: Arc<ArpeggiatorParams>,
    pub voice: Arc<VoiceParams>,
}

impl Controls {
    pub fn set(&self, id: ParamId, value: f32) {
        let value = id.normalize(value);
        let index = value as u8;

        match id {
            ParamId::Waveform => self.oscillator.set_waveform_index(index),
            ParamId::FineTune => self.oscillator.set_fine_tune(value),
            ParamId::Cutoff => self.filter.set_cutoff(value),
            ParamId::Resonance => self.filter.set_resonance(value),
            ParamId::EnvMod => self.filter.set_envelope_amount(value),
            ParamId::Decay => self.envelope.set_decay(value),
            ParamId::Accent => self.voice.set_accent(value),
            ParamId::SlideTime => self.oscillator.set_slide_time(value),
            ParamId::Drive => self.overdrive.set_drive(value),
            ParamId::DriveMode => self.overdrive.set_mode_index(index),
            ParamId::DriveMix => self.overdrive.set_mix(value),
            ParamId::FxType => self.effects.set_type_index(index),
            ParamId::FxTime => self.effects.set_time(value),
            ParamId::FxFeedback => self.effects.set_feedback(value),
            ParamId::FxMix => self.effects.set_mix(value),
            ParamId::FxModDepth => self.effects.set_mod_depth(value),
            ParamId::FxModRate => self.effects.set_mod_rate(value),
            ParamId::ArpEnabled => self.arpeggiator.set_enabled(value >= 0.5),
            ParamId::ArpMode => self.arpeggiator.set_mode_index(index),
            ParamId::ArpDivision => self.arpeggiator.set_division_index(index),
            ParamId::ArpGate => self.arpeggiator.set_gate(value),
            ParamId::ArpOctaves => self.arpeggiator.set_octaves(index),
            ParamId::ArpSwing => self.arpeggiator.set_swing(value),
            ParamId::OutputGain => self.voice.set_output_gain_db(value),
        }
    }

    pub fn get(&self, id: ParamId) -> f32 {
        use crate::dsp::param::Choice;

        match id {
            ParamId::Waveform => self.oscillator.waveform().index() as f32,
            ParamId::FineTune => self.oscillator.fine_tune(),
            ParamId::Cutoff => self.filter.cutoff(),
            ParamId::Resonance => self.filter.resonance(),
            ParamId::EnvMod => self.filter.envelope_amount(),
            ParamId::Decay => self.envelope.decay(),
            ParamId::Accent => self.voice.accent(),
            ParamId::SlideTime => self.oscillator.slide_time(),
            ParamId::Drive => self.overdrive.drive(),
            ParamId::DriveMode => self.overdrive.mode().index() as f32,
            ParamId::DriveMix => self.overdrive.mix(),
            ParamId::FxType => self.effects.effect_type().index() as f32,
            ParamId::FxTime => self.effects.time(),
            ParamId::FxFeedback => self.effects.feedback(),
            ParamId::FxMix => self.effects.mix(),
            ParamId::FxModDepth => self.effects.mod_depth(),
            ParamId::FxModRate => self.effects.mod_rate(),
            ParamId::ArpEnabled => {
                if self.arpeggiator.enabled() {
                    1.0
                } else {
                    0.0
                }
            }
            ParamId::ArpMode => self.arpeggiator.mode().index() as f32,
            ParamId::ArpDivision => self.arpeggiator.division().index() as f32,
            ParamId::ArpGate => self.arpeggiator.gate(),
            ParamId::ArpOctaves => self.arpeggiator.octaves() as f32,
            ParamId::ArpSwing => self.arpeggiator.swing(),
            ParamId::OutputGain => self.voice.output_gain_db(),
        }
    }

    /// Set by stable name. Returns false for an unknown name.
    pub fn set_by_name(&self, name: &str, value: f32) -> bool {
        match ParamId::from_name(name) {
            Some(id) => {
                self.set(id, value);
                true
            }
            None => false,
        }
    }

    /// Nudge a parameter by `steps` increments of 1/100 of its range (one
    /// whole step for discrete kinds).
    pub fn nudge(&self, id: ParamId, steps: f32) {
        let (min, max) = id.range();
        let step = match id.kind() {
            ParamKind::Float => (max - min) / 100.0,
            _ => 1.0,
        };
        self.set(id, self.get(id) + step * steps);
    }

    pub fn apply_defaults(&self) {
        for id in ParamId::ALL {
            self.set(id, id.default_value());
        }
    }
}
