use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// MIDI "all notes off" channel-mode controller.
pub const CC_ALL_NOTES_OFF: u8 = 123;
/// MIDI "all sound off" channel-mode controller.
pub const CC_ALL_SOUND_OFF: u8 = 120;

/// Translate a MIDI event on `channel_filter` into a synth message.
///
/// Velocity is normalized to 0..1. Events on other channels and
/// controllers the voice does not react to yield `None`.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    if midi.channel() != channel_filter {
        return None;
    }

    match midi {
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::NoteOn {
            note: key,
            velocity: velocity as f32 / 127.0,
        }),
        MidiEvent::NoteOff { key, .. } => Some(SynthMessage::NoteOff { note: key }),
        MidiEvent::ControlChange { controller, .. }
            if controller == CC_ALL_NOTES_OFF || controller == CC_ALL_SOUND_OFF =>
        {
            Some(SynthMessage::AllNotesOff)
        }
        _ => None,
    }
}

/// Equal-tempered frequency of a MIDI note, A4 (69) = 440 Hz.
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_frequencies() {
        assert!((midi_note_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_note_to_freq(57) - 220.0).abs() < 1e-3);
        assert!((midi_note_to_freq(60) - 261.6256).abs() < 1e-2);
    }

    #[test]
    fn decibels() {
        assert_eq!(db_to_gain(0.0), 1.0);
        assert!((db_to_gain(-6.0) - 0.501).abs() < 1e-3);
        assert!((db_to_gain(12.0) - 3.981).abs() < 1e-3);
    }

    #[test]
    fn converts_notes_on_matching_channel() {
        let on = MidiEvent::NoteOn {
            channel: 0,
            key: 36,
            velocity: 127,
        };
        assert_eq!(
            midi_to_synth(on, 0),
            Some(SynthMessage::NoteOn {
                note: 36,
                velocity: 1.0
            })
        );
        assert_eq!(midi_to_synth(on, 1), None);

        let off = MidiEvent::NoteOff {
            channel: 0,
            key: 36,
            velocity: 0,
        };
        assert_eq!(midi_to_synth(off, 0), Some(SynthMessage::NoteOff { note: 36 }));
    }

    #[test]
    fn channel_mode_controllers_silence_the_voice() {
        let cc = |controller| MidiEvent::ControlChange {
            channel: 0,
            controller,
            value: 0,
        };
        assert_eq!(midi_to_synth(cc(123), 0), Some(SynthMessage::AllNotesOff));
        assert_eq!(midi_to_synth(cc(120), 0), Some(SynthMessage::AllNotesOff));
        assert_eq!(midi_to_synth(cc(1), 0), None);
    }
}
