pub mod dsp;
pub mod io;
pub mod patch;
pub mod sequencing; // Tempo-synced note generation
pub mod synth; // Monophonic voice coordination

pub use synth::{AcidSynth, Controls, ParamId, Transport};

/// Largest block the coordinator renders in one call.
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Sample rate assumed until `prepare` is called.
pub(crate) const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;
