/*
The monophonic voice coordinator.

`AcidSynth` owns one instance of every module in the chain and runs them in a
fixed order, one sample at a time:

    notes ──> arpeggiator ──> Voice ──┐
                                      │ start / release
                                      v
    Oscillator ──> x Envelope ──> x Voice gain ──> LadderFilter ──> Overdrive
                       │                               ^
                       └──── envelope level ───────────┘
                                                            │
    soft clip <── output gain <── Effects <─────────────────┘

Vocabulary
----------
- Transport: host tempo and absolute sample position, supplied once per block
- Direct notes: note messages that start or release the voice themselves
  (arpeggiator disabled)
- Arpeggiated notes: note messages that only edit the arpeggiator's held
  list; the arpeggiator decides when the voice starts and stops

Messages are applied at block boundaries by `render_block`. Parameter
changes arrive through `Controls` atomics at any time.
*/

use std::sync::Arc;

use crate::dsp::distortion::Overdrive;
use crate::dsp::effects::Effects;
use crate::dsp::envelope::Envelope;
use crate::dsp::filter::LadderFilter;
use crate::dsp::node::DspModule;
use crate::dsp::oscillator::Oscillator;
use crate::io::converter::{db_to_gain, midi_note_to_freq};
use crate::sequencing::arpeggiator::Arpeggiator;
use crate::synth::controls::{Controls, VoiceParams};
use crate::synth::message::{MessageReceiver, SynthMessage};
use crate::synth::voice::Voice;
use crate::DEFAULT_SAMPLE_RATE;

/// Fixed drive of the final `tanh` clipper.
const SOFT_CLIP_DRIVE: f32 = 0.8;
const ATTACK_SECONDS: f32 = 0.001;
const RELEASE_SECONDS: f32 = 0.01;

/// Host timing for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transport {
    pub bpm: f64,
    pub sample_position: i64,
}

impl Transport {
    pub fn new(bpm: f64, sample_position: i64) -> Self {
        Self {
            bpm,
            sample_position,
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(120.0, 0)
    }
}

pub struct AcidSynth {
    oscillator: Oscillator,
    envelope: Envelope,
    filter: LadderFilter,
    overdrive: Overdrive,
    effects: Effects,
    arpeggiator: Arpeggiator,

    voice: Voice,
    voice_params: Arc<VoiceParams>,
    /// The sounding note was started by the arpeggiator.
    voice_from_arp: bool,

    transport: Transport,
    sample_rate: f32,
    gain_db: f32,
    gain: f32,
}

impl AcidSynth {
    pub fn new() -> Self {
        let envelope = Envelope::new();
        envelope.set_attack(ATTACK_SECONDS);
        envelope.set_sustain(0.0);
        envelope.set_release(RELEASE_SECONDS);

        let synth = Self {
            oscillator: Oscillator::new(),
            envelope,
            filter: LadderFilter::new(),
            overdrive: Overdrive::new(),
            effects: Effects::new(),
            arpeggiator: Arpeggiator::new(),
            voice: Voice::new(),
            voice_params: Arc::new(VoiceParams::new()),
            voice_from_arp: false,
            transport: Transport::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            gain_db: 0.0,
            gain: 1.0,
        };
        synth.controls().apply_defaults();
        synth
    }

    /// Parameter handles for a control thread.
    pub fn controls(&self) -> Controls {
        Controls {
            oscillator: self.oscillator.params(),
            envelope: self.envelope.params(),
            filter: self.filter.params(),
            overdrive: self.overdrive.params(),
            effects: self.effects.params(),
            arpeggiator: self.arpeggiator.params(),
            voice: Arc::clone(&self.voice_params),
        }
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn arpeggiator(&self) -> &Arpeggiator {
        &self.arpeggiator
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn handle_message(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
            SynthMessage::NoteOff { note } => self.note_off(note),
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    pub fn note_on(&mut self, note: u8, velocity: f32) {
        if self.arpeggiator.is_enabled() {
            self.arpeggiator.note_on(note, velocity);
        } else {
            self.voice_from_arp = false;
            self.start_voice(note, velocity);
        }
    }

    /// Releases the voice only if `note` is the one sounding. The key is
    /// always dropped from the arpeggiator's held list, enabled or not.
    pub fn note_off(&mut self, note: u8) {
        self.arpeggiator.note_off(note);
        if !self.arpeggiator.is_enabled() && self.voice.note() == Some(note) {
            self.release_voice();
        }
    }

    pub fn all_notes_off(&mut self) {
        self.arpeggiator.all_notes_off();
        self.release_voice();
        self.voice_from_arp = false;
    }

    /// Apply queued messages, then render `out` starting at `transport`.
    pub fn render_block<R>(&mut self, out: &mut [f32], transport: Transport, rx: &mut R)
    where
        R: MessageReceiver + ?Sized,
    {
        self.begin_block(transport, rx);
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Like [`Self::render_block`] but writes the mono signal to every
    /// channel of interleaved frames.
    pub fn render_interleaved<R>(
        &mut self,
        out: &mut [f32],
        channels: usize,
        transport: Transport,
        rx: &mut R,
    ) where
        R: MessageReceiver + ?Sized,
    {
        self.begin_block(transport, rx);
        for frame in out.chunks_exact_mut(channels.max(1)) {
            frame.fill(self.next_sample());
        }
    }

    pub fn render_stereo<R>(&mut self, out: &mut [f32], transport: Transport, rx: &mut R)
    where
        R: MessageReceiver + ?Sized,
    {
        self.render_interleaved(out, 2, transport, rx);
    }

    fn begin_block<R>(&mut self, transport: Transport, rx: &mut R)
    where
        R: MessageReceiver + ?Sized,
    {
        while let Some(message) = rx.pop() {
            self.handle_message(message);
        }
        self.transport = transport;
    }

    fn start_voice(&mut self, note: u8, velocity: f32) {
        self.voice.start(note, velocity);
        self.oscillator.set_frequency(midi_note_to_freq(note));
        self.envelope.note_on();
    }

    fn release_voice(&mut self) {
        if self.voice.release() {
            self.envelope.note_off();
        }
    }

    fn tick_arpeggiator(&mut self) {
        let Transport {
            bpm,
            sample_position,
        } = self.transport;

        if self.arpeggiator.process(bpm, sample_position) {
            if let Some(note) = self.arpeggiator.current_note() {
                let velocity = self.arpeggiator.current_velocity();
                self.start_voice(note, velocity);
                self.voice_from_arp = true;
            }
        } else if self.voice_from_arp && !self.arpeggiator.is_note_active() {
            self.release_voice();
            self.voice_from_arp = false;
        }
    }

    fn output_gain(&mut self) -> f32 {
        let db = self.voice_params.output_gain_db();
        if db != self.gain_db {
            self.gain_db = db;
            self.gain = db_to_gain(db);
        }
        self.gain
    }

    fn next_sample(&mut self) -> f32 {
        self.tick_arpeggiator();
        self.voice.set_accent(self.voice_params.accent());

        let raw = self.oscillator.process_sample(0.0);
        let level = self.envelope.process_sample(0.0);
        let shaped = raw * level * self.voice.gain();

        self.filter.set_envelope_value(level);
        let filtered = self.filter.process_sample(shaped);
        let driven = self.overdrive.process_sample(filtered);
        let wet = self.effects.process_sample(driven);

        let out = (wet * self.output_gain() * SOFT_CLIP_DRIVE).tanh();
        self.transport.sample_position += 1;
        out
    }
}

impl Default for AcidSynth {
    fn default() -> Self {
        Self::new()
    }
}

impl DspModule for AcidSynth {
    fn prepare(&mut self, sample_rate: f32, max_block: usize) {
        self.sample_rate = sample_rate;
        self.oscillator.prepare(sample_rate, max_block);
        self.envelope.prepare(sample_rate, max_block);
        self.filter.prepare(sample_rate, max_block);
        self.overdrive.prepare(sample_rate, max_block);
        self.effects.prepare(sample_rate, max_block);
        self.arpeggiator.prepare(sample_rate);
        self.voice.clear();
        self.voice_from_arp = false;
        log::info!("acid synth prepared: {sample_rate} Hz, max block {max_block}");
    }

    fn reset(&mut self) {
        self.oscillator.reset();
        self.envelope.reset();
        self.filter.reset();
        self.overdrive.reset();
        self.effects.reset();
        self.arpeggiator.reset();
        self.voice.clear();
        self.voice_from_arp = false;
        log::debug!("acid synth reset");
    }

    /// Render one sample using the stored transport. The input is ignored.
    fn process_sample(&mut self, _input: f32) -> f32 {
        self.next_sample()
    }
}
