/// Channel-voice MIDI messages the synth understands.
///
/// Channels are zero-based (0-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;
const PROGRAM_CHANGE: u8 = 0xC0;
const PITCH_BEND: u8 = 0xE0;

impl MidiEvent {
    /// Decode one raw message. System and unsupported messages yield `None`.
    ///
    /// A note-on with velocity 0 is a note-off, per the MIDI running-status
    /// convention.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status < 0x80 || status >= 0xF0 {
            return None;
        }
        let channel = status & 0x0F;
        let byte = |i: usize| data.get(i).map(|b| b & 0x7F);

        let event = match status & 0xF0 {
            NOTE_OFF => MidiEvent::NoteOff {
                channel,
                key: byte(0)?,
                velocity: byte(1)?,
            },
            NOTE_ON => {
                let key = byte(0)?;
                match byte(1)? {
                    0 => MidiEvent::NoteOff {
                        channel,
                        key,
                        velocity: 0,
                    },
                    velocity => MidiEvent::NoteOn {
                        channel,
                        key,
                        velocity,
                    },
                }
            }
            CONTROL_CHANGE => MidiEvent::ControlChange {
                channel,
                controller: byte(0)?,
                value: byte(1)?,
            },
            PROGRAM_CHANGE => MidiEvent::ProgramChange {
                channel,
                program: byte(0)?,
            },
            PITCH_BEND => {
                let raw = (byte(1)? as i16) << 7 | byte(0)? as i16;
                MidiEvent::PitchBend {
                    channel,
                    value: raw - 8192,
                }
            }
            _ => return None,
        };
        Some(event)
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_messages() {
        assert_eq!(
            MidiEvent::parse(&[0x92, 60, 100]),
            Some(MidiEvent::NoteOn {
                channel: 2,
                key: 60,
                velocity: 100
            })
        );
        assert_eq!(
            MidiEvent::parse(&[0x80, 60, 64]),
            Some(MidiEvent::NoteOff {
                channel: 0,
                key: 60,
                velocity: 64
            })
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        assert!(matches!(
            MidiEvent::parse(&[0x90, 48, 0]),
            Some(MidiEvent::NoteOff { key: 48, .. })
        ));
    }

    #[test]
    fn pitch_bend_is_centered() {
        assert_eq!(
            MidiEvent::parse(&[0xE0, 0x00, 0x40]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 0
            })
        );
        assert_eq!(
            MidiEvent::parse(&[0xE1, 0x7F, 0x7F]),
            Some(MidiEvent::PitchBend {
                channel: 1,
                value: 8191
            })
        );
    }

    #[test]
    fn rejects_truncated_and_system_messages() {
        assert_eq!(MidiEvent::parse(&[]), None);
        assert_eq!(MidiEvent::parse(&[0x90, 60]), None);
        assert_eq!(MidiEvent::parse(&[0xF8]), None);
        assert_eq!(MidiEvent::parse(&[0x40, 1, 2]), None);
        assert_eq!(MidiEvent::parse(&[0xA0, 60, 10]), None);
    }

    #[test]
    fn channel_accessor() {
        let event = MidiEvent::ControlChange {
            channel: 9,
            controller: 123,
            value: 0,
        };
        assert_eq!(event.channel(), 9);
    }
}
