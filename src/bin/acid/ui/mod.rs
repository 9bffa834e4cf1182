//! TUI for acid
//!
//! Oscilloscope, spectrum, parameter panel and a computer-keyboard piano.

mod panel;
mod spectrum;
mod status;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::sync::Arc;
use std::time::Duration;

use acid_dsp::{dsp::param::AtomicF32, synth::SynthMessage, Controls, ParamId};

use panel::render_panel;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats, StatusInfo};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;
/// Velocity sent for keyboard notes
const KEY_VELOCITY: f32 = 100.0 / 127.0;
/// Lowest and highest C selectable as the keyboard root
const MIN_ROOT: u8 = 12;
const MAX_ROOT: u8 = 96;

/// Piano layout on the home row, semitone offsets from the root
const PIANO_KEYS: [(char, u8); 13] = [
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
];

pub struct UiApp {
    controls: Controls,
    note_tx: Producer<SynthMessage>,
    scope_rx: Consumer<f32>,
    bpm: Arc<AtomicF32>,
    sample_rate: f32,

    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,

    /// Index into `ParamId::ALL`
    selected: usize,
    root: u8,
    /// Keys latched for the arpeggiator (terminals report no key release)
    latched: [bool; 128],
    last_note: Option<u8>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        controls: Controls,
        note_tx: Producer<SynthMessage>,
        scope_rx: Consumer<f32>,
        bpm: Arc<AtomicF32>,
        sample_rate: f32,
    ) -> Self {
        Self {
            controls,
            note_tx,
            scope_rx,
            bpm,
            sample_rate,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            selected: 0,
            root: 36,
            latched: [false; 128],
            last_note: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.spectrum.update(&self.audio_buffer);

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking, ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.send(SynthMessage::AllNotesOff);
        Ok(())
    }

    /// Keep the last VIS_BUFFER_SIZE samples from the scope queue
    fn poll_audio(&mut self) {
        let available = self.scope_rx.slots();
        if available == 0 {
            return;
        }
        self.audio_buffer
            .extend(std::iter::from_fn(|| self.scope_rx.pop().ok()).take(available));
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn send(&mut self, message: SynthMessage) {
        if self.note_tx.push(message).is_err() {
            log::warn!("note queue full, dropping {message:?}");
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up => {
                self.selected = self
                    .selected
                    .checked_sub(1)
                    .unwrap_or(ParamId::ALL.len() - 1);
            }
            KeyCode::Down => {
                self.selected = (self.selected + 1) % ParamId::ALL.len();
            }
            KeyCode::Left => self.controls.nudge(self.selected_param(), -1.0),
            KeyCode::Right => self.controls.nudge(self.selected_param(), 1.0),
            KeyCode::PageDown => self.controls.nudge(self.selected_param(), -10.0),
            KeyCode::PageUp => self.controls.nudge(self.selected_param(), 10.0),
            KeyCode::Char('z') => self.root = self.root.saturating_sub(12).max(MIN_ROOT),
            KeyCode::Char('x') => self.root = (self.root + 12).min(MAX_ROOT),
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_bpm(1.0),
            KeyCode::Char('-') => self.nudge_bpm(-1.0),
            KeyCode::Char(' ') => {
                self.latched = [false; 128];
                self.last_note = None;
                self.send(SynthMessage::AllNotesOff);
            }
            KeyCode::Char(c) => {
                if let Some(&(_, offset)) = PIANO_KEYS.iter().find(|(key, _)| *key == c) {
                    self.play_key(offset);
                }
            }
            _ => {}
        }
    }

    fn selected_param(&self) -> ParamId {
        ParamId::ALL[self.selected]
    }

    fn nudge_bpm(&self, delta: f32) {
        self.bpm.store_clamped(self.bpm.load() + delta, 20.0, 300.0);
    }

    /// Direct mode plays the note; arpeggiator mode toggles it in the held list.
    fn play_key(&mut self, offset: u8) {
        let note = (self.root + offset).min(127);
        let arp_enabled = self.controls.get(ParamId::ArpEnabled) >= 0.5;

        if arp_enabled && self.latched[note as usize] {
            self.latched[note as usize] = false;
            self.send(SynthMessage::NoteOff { note });
            return;
        }

        self.latched[note as usize] = arp_enabled;
        self.last_note = Some(note);
        self.send(SynthMessage::NoteOn {
            note,
            velocity: KEY_VELOCITY,
        });
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(10),   // Panel + scopes
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let info = StatusInfo {
            bpm: self.bpm.load(),
            sample_rate: self.sample_rate,
            root: self.root,
            last_note: self.last_note,
            latched: self.latched.iter().filter(|&&held| held).count(),
        };
        render_status(frame, rows[0], &info, &AudioStats::from_buffer(&self.audio_buffer));

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(20)])
            .split(rows[1]);

        render_panel(frame, columns[0], &self.controls, self.selected);

        let scopes = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        render_waveform(frame, scopes[0], &self.audio_buffer);
        render_spectrum(frame, scopes[1], self.spectrum.data());

        let help = Paragraph::new(
            " [Q] Quit  [Up/Down] Select  [Left/Right] Adjust  [A-K] Play  [Z/X] Octave  [+/-] BPM  [Space] Stop",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, rows[2]);
    }
}
