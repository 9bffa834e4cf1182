pub mod arpeggiator;
pub mod duration;

pub use arpeggiator::{ArpMode, Arpeggiator, ArpeggiatorParams, Division};
pub use duration::Duration;
