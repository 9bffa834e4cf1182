// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;

pub use converter::{db_to_gain, midi_note_to_freq, midi_to_synth};
pub use midi::MidiEvent;
