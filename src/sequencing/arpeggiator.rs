use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::param::{AtomicChoice, AtomicF32, Choice};
use crate::sequencing::duration::Duration;
use crate::DEFAULT_SAMPLE_RATE;

/*
Arpeggiator
===========

Turns a set of held keys into a tempo-synced stream of single notes.

Vocabulary
----------

  held notes    Keys currently down, in the order they were pressed.

  sorted notes  The same keys ordered by pitch. Resynchronized on every
                note on/off so the two lists always agree.

  step          Position in the traversal. Always reduced modulo the step
                count of the active mode.

  division      Rhythmic value of one step (1/1 .. 1/32, dotted, triplet).

  gate          Fraction of a step the note is held before it is released.

  swing         Odd steps are stretched by (1 + swing * 0.5).


Timing
------

    samples_per_beat = sample_rate * 60 / bpm
    note_length      = samples_per_beat * division.beats()   (swung if odd)
    gate_length      = note_length * gate

    counter: 0 ─────────── gate_length ──────── note_length
             │ gate open    │ gate closed        │ next step, gate reopens
             ▼              ▼                    ▼
             ████████████████                    ███████████...

The first key pressed into an empty arpeggiator fires on the very next
process() call instead of waiting for a whole step.


Traversal Modes
---------------

Held C E G, two octaves (6 steps):

    Up       C  E  G  C' E' G'   C  ...
    Down     G' E' C' G  E  C    G' ...
    UpDown   C  E  G  C' E' G' E' C' G  E    C  ...   (cycle 2*6-2)
    DownUp   G' E' C' G  E  C  E  G  C' E'   G' ...
    Random   uniform note, uniform octave
    Order    like Up, but in the order keys were pressed
    Chord    always the lowest held note, base octave
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArpMode {
    #[default]
    Up,
    Down,
    UpDown,
    DownUp,
    Random,
    Order,
    Chord,
}

impl ArpMode {
    pub const ALL: [ArpMode; 7] = [
        ArpMode::Up,
        ArpMode::Down,
        ArpMode::UpDown,
        ArpMode::DownUp,
        ArpMode::Random,
        ArpMode::Order,
        ArpMode::Chord,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ArpMode::Up => "Up",
            ArpMode::Down => "Down",
            ArpMode::UpDown => "Up/Down",
            ArpMode::DownUp => "Down/Up",
            ArpMode::Random => "Random",
            ArpMode::Order => "Order",
            ArpMode::Chord => "Chord",
        }
    }
}

impl Choice for ArpMode {
    const COUNT: u8 = 7;

    fn index(self) -> u8 {
        self as u8
    }

    fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Step length of the arpeggiator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Division {
    Whole,
    Half,
    Quarter,
    #[default]
    Eighth,
    Sixteenth,
    ThirtySecond,
    DottedQuarter,
    DottedEighth,
    TripletQuarter,
    TripletEighth,
}

impl Division {
    pub const ALL: [Division; 10] = [
        Division::Whole,
        Division::Half,
        Division::Quarter,
        Division::Eighth,
        Division::Sixteenth,
        Division::ThirtySecond,
        Division::DottedQuarter,
        Division::DottedEighth,
        Division::TripletQuarter,
        Division::TripletEighth,
    ];

    pub fn duration(self) -> Duration {
        match self {
            Division::Whole => Duration::WHOLE,
            Division::Half => Duration::HALF,
            Division::Quarter => Duration::QUARTER,
            Division::Eighth => Duration::EIGHTH,
            Division::Sixteenth => Duration::SIXTEENTH,
            Division::ThirtySecond => Duration::THIRTY_SECOND,
            Division::DottedQuarter => Duration::QUARTER.dotted(),
            Division::DottedEighth => Duration::EIGHTH.dotted(),
            Division::TripletQuarter => Duration::QUARTER.triplet(),
            Division::TripletEighth => Duration::EIGHTH.triplet(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Division::Whole => "1/1",
            Division::Half => "1/2",
            Division::Quarter => "1/4",
            Division::Eighth => "1/8",
            Division::Sixteenth => "1/16",
            Division::ThirtySecond => "1/32",
            Division::DottedQuarter => "1/4.",
            Division::DottedEighth => "1/8.",
            Division::TripletQuarter => "1/4T",
            Division::TripletEighth => "1/8T",
        }
    }
}

impl Choice for Division {
    const COUNT: u8 = 10;

    fn index(self) -> u8 {
        self as u8
    }

    fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

const MIN_GATE: f32 = 0.1;
const MAX_OCTAVES: u8 = 4;
const MAX_HELD: usize = 128;
const RANDOM_SEED: u64 = 0xa2b;

/// Shared arpeggiator parameters.
#[derive(Debug)]
pub struct ArpeggiatorParams {
    enabled: AtomicBool,
    mode: AtomicChoice<ArpMode>,
    division: AtomicChoice<Division>,
    gate: AtomicF32,
    octaves: AtomicU8,
    swing: AtomicF32,
}

impl ArpeggiatorParams {
    fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            mode: AtomicChoice::new(ArpMode::Up),
            division: AtomicChoice::new(Division::Eighth),
            gate: AtomicF32::new(0.5),
            octaves: AtomicU8::new(1),
            swing: AtomicF32::new(0.0),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_mode(&self, mode: ArpMode) {
        self.mode.store(mode);
    }

    /// Select by host choice index (0-6). Out-of-range is ignored.
    pub fn set_mode_index(&self, index: u8) {
        self.mode.store_index(index);
    }

    pub fn mode(&self) -> ArpMode {
        self.mode.load()
    }

    pub fn set_division(&self, division: Division) {
        self.division.store(division);
    }

    /// Select by host choice index (0-9). Out-of-range is ignored.
    pub fn set_division_index(&self, index: u8) {
        self.division.store_index(index);
    }

    pub fn division(&self) -> Division {
        self.division.load()
    }

    /// Gate as a fraction of the step, clamped to [0.1, 1].
    pub fn set_gate(&self, gate: f32) {
        self.gate.store_clamped(gate, MIN_GATE, 1.0);
    }

    pub fn gate(&self) -> f32 {
        self.gate.load()
    }

    /// Octave range, clamped to 1-4.
    pub fn set_octaves(&self, octaves: u8) {
        self.octaves
            .store(octaves.clamp(1, MAX_OCTAVES), Ordering::Relaxed);
    }

    pub fn octaves(&self) -> u8 {
        self.octaves.load(Ordering::Relaxed)
    }

    pub fn set_swing(&self, swing: f32) {
        self.swing.store_clamped(swing, 0.0, 1.0);
    }

    pub fn swing(&self) -> f32 {
        self.swing.load()
    }
}

pub struct Arpeggiator {
    params: Arc<ArpeggiatorParams>,
    sample_rate: f64,

    held: Vec<(u8, f32)>,
    sorted: Vec<u8>,
    step: usize,
    octave: usize,

    current_note: Option<u8>,
    current_velocity: f32,
    gate_open: bool,

    counter: f64,
    pending_trigger: bool,
    rng: StdRng,
}

impl Arpeggiator {
    pub fn new() -> Self {
        Self {
            params: Arc::new(ArpeggiatorParams::new()),
            sample_rate: DEFAULT_SAMPLE_RATE as f64,
            held: Vec::with_capacity(MAX_HELD),
            sorted: Vec::with_capacity(MAX_HELD),
            step: 0,
            octave: 0,
            current_note: None,
            current_velocity: 0.0,
            gate_open: false,
            counter: 0.0,
            pending_trigger: false,
            rng: StdRng::seed_from_u64(RANDOM_SEED),
        }
    }

    /// Handle for a control thread.
    pub fn params(&self) -> Arc<ArpeggiatorParams> {
        Arc::clone(&self.params)
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate as f64;
        self.reset();
    }

    /// Rewind the traversal and close the gate. Held keys are kept.
    pub fn reset(&mut self) {
        self.step = 0;
        self.octave = 0;
        self.counter = 0.0;
        self.gate_open = false;
        self.current_note = None;
        self.current_velocity = 0.0;
        self.pending_trigger = !self.held.is_empty();
        self.rng = StdRng::seed_from_u64(RANDOM_SEED);
    }

    pub fn is_enabled(&self) -> bool {
        self.params.enabled()
    }

    pub fn current_note(&self) -> Option<u8> {
        self.current_note
    }

    pub fn current_velocity(&self) -> f32 {
        self.current_velocity
    }

    pub fn is_note_active(&self) -> bool {
        self.gate_open && !self.held.is_empty()
    }

    pub fn held_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.held.iter().map(|&(note, _)| note)
    }

    /// Advance one sample of timing. Returns true exactly on the sample a
    /// new note should start; read it from [`Self::current_note`].
    ///
    /// `_sample_position` is accepted for host-timeline alignment; the
    /// step clock itself is free-running from the first held key.
    pub fn process(&mut self, bpm: f64, _sample_position: i64) -> bool {
        if !self.params.enabled() || self.held.is_empty() || bpm <= 0.0 {
            self.gate_open = false;
            self.current_note = None;
            return false;
        }

        let samples_per_beat = self.sample_rate * 60.0 / bpm;
        let mut note_length = samples_per_beat * self.params.division().duration().beats();
        let swing = self.params.swing();
        if self.step % 2 == 1 && swing > 0.0 {
            note_length *= 1.0 + swing as f64 * 0.5;
        }
        let gate_length = note_length * self.params.gate() as f64;

        if self.pending_trigger {
            self.pending_trigger = false;
            return self.trigger();
        }

        self.counter += 1.0;

        if self.gate_open && self.counter >= gate_length {
            self.gate_open = false;
        }

        if self.counter >= note_length {
            return self.trigger();
        }

        false
    }

    fn trigger(&mut self) -> bool {
        self.counter = 0.0;
        self.advance_step();
        self.gate_open = true;
        true
    }

    fn advance_step(&mut self) {
        let num_notes = self.sorted.len();
        if num_notes == 0 {
            return;
        }

        let octaves = self.params.octaves().max(1) as usize;
        let total = num_notes * octaves;

        let index = match self.params.mode() {
            ArpMode::Up => {
                let pos = self.step % total;
                self.octave = pos / num_notes;
                self.step = (pos + 1) % total;
                pos % num_notes
            }
            ArpMode::Down => {
                let pos = total - 1 - self.step % total;
                self.octave = pos / num_notes;
                self.step = (self.step % total + 1) % total;
                pos % num_notes
            }
            ArpMode::UpDown | ArpMode::DownUp if total <= 1 => {
                self.octave = 0;
                0
            }
            ArpMode::UpDown => {
                let cycle = total * 2 - 2;
                let pos = self.step % cycle;
                let pos = if pos < total { pos } else { cycle - pos };
                self.octave = pos / num_notes;
                self.step = (self.step % cycle + 1) % cycle;
                pos % num_notes
            }
            ArpMode::DownUp => {
                let cycle = total * 2 - 2;
                let pos = self.step % cycle;
                let pos = if pos < total {
                    total - 1 - pos
                } else {
                    pos - total + 1
                };
                self.octave = pos / num_notes;
                self.step = (self.step % cycle + 1) % cycle;
                pos % num_notes
            }
            ArpMode::Random => {
                self.octave = self.rng.gen_range(0..octaves);
                self.step = (self.step + 1) % total;
                self.rng.gen_range(0..num_notes)
            }
            ArpMode::Order => {
                let pos = self.step % total;
                self.octave = pos / num_notes;
                self.step = (pos + 1) % total;

                let (note, velocity) = self.held[pos % num_notes];
                self.emit(note, velocity);
                return;
            }
            ArpMode::Chord => {
                self.octave = 0;
                0
            }
        };

        let note = self.sorted[index];
        let velocity = self
            .held
            .iter()
            .find(|&&(held, _)| held == note)
            .map_or(self.current_velocity, |&(_, velocity)| velocity);
        self.emit(note, velocity);
    }

    fn emit(&mut self, note: u8, velocity: f32) {
        let shifted = note as usize + self.octave * 12;
        self.current_note = Some(shifted.min(127) as u8);
        self.current_velocity = velocity;
    }

    fn sort_notes(&mut self) {
        self.sorted.clear();
        self.sorted.extend(self.held.iter().map(|&(note, _)| note));
        self.sorted.sort_unstable();
    }

    pub fn note_on(&mut self, note: u8, velocity: f32) {
        let note = note.min(127);
        let velocity = velocity.clamp(0.0, 1.0);

        if let Some(entry) = self.held.iter_mut().find(|(held, _)| *held == note) {
            entry.1 = velocity;
            return;
        }

        self.held.push((note, velocity));
        self.sort_notes();

        if self.held.len() == 1 {
            self.step = 0;
            self.octave = 0;
            self.counter = 0.0;
            self.pending_trigger = true;
        }
    }

    pub fn note_off(&mut self, note: u8) {
        self.held.retain(|&(held, _)| held != note);
        self.sort_notes();

        if self.held.is_empty() {
            self.gate_open = false;
            self.current_note = None;
            self.pending_trigger = false;
        }
    }

    pub fn all_notes_off(&mut self) {
        self.held.clear();
        self.sorted.clear();
        self.gate_open = false;
        self.current_note = None;
        self.step = 0;
        self.octave = 0;
        self.pending_trigger = false;
    }
}

impl Default for Arpeggiator {
    fn default() -> Self {
        Self::new()
    }
}
