//! Full-voice benchmarks.
//!
//! The complete chain as the audio callback runs it, including message
//! draining and arpeggiator timing.

mod synth;

pub use synth::{bench_arpeggiator, bench_synth};
