//! Low-level DSP modules that make up the acid voice.
//!
//! Every module is allocation-free once `prepare` has run, making them safe to
//! drive from the audio callback one sample at a time. Tunable parameters live
//! in shared atomic cells so a control thread can adjust them while audio is
//! running.

/// Fractional ring-buffer delay line.
pub mod delay;
/// Overdrive / waveshaping stage with five modes.
pub mod distortion;
/// Multi-algorithm time-based effects processor.
pub mod effects;
/// Exponential ADSR envelope generator.
pub mod envelope;
/// Four-pole transistor ladder low-pass filter.
pub mod filter;
/// Low frequency oscillator used by the modulation effects.
pub mod lfo;
/// Shared module trait.
pub mod node;
/// Band-limited oscillator with twelve waveforms.
pub mod oscillator;
/// Lock-free parameter cells.
pub mod param;
/// Comb/allpass building blocks for the reverb.
pub mod reverb;

pub use distortion::{DriveMode, Overdrive};
pub use effects::{EffectType, Effects};
pub use envelope::{Envelope, EnvelopeStage};
pub use filter::LadderFilter;
pub use node::DspModule;
pub use oscillator::{Oscillator, Waveform};
