// Purpose: monophonic voice coordination, parameter surface, note messages
// This layer sits above the DSP modules and the arpeggiator

pub mod controls;
pub mod message;
pub mod mono;
pub mod voice;

pub use controls::{Controls, ParamId, ParamKind, VoiceParams};
pub use message::{MessageReceiver, SynthMessage};
pub use mono::{AcidSynth, Transport};
pub use voice::Voice;
