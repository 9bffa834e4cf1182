//! Status bar - tempo, keyboard root, output level

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub struct StatusInfo {
    pub bpm: f32,
    pub sample_rate: f32,
    pub root: u8,
    pub last_note: Option<u8>,
    pub latched: usize,
}

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Scientific pitch name, MIDI 60 = C4
pub fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}

pub fn render_status(frame: &mut Frame, area: Rect, info: &StatusInfo, stats: &AudioStats) {
    let block = Block::default().title(" acid ").borders(Borders::ALL);

    let note = info.last_note.map_or_else(|| "--".to_owned(), note_name);

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {:.0}  ", info.bpm),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Keys: {}  ", note_name(info.root)),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Note: {note}  Latched: {}  ", info.latched),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!("{:.1}kHz  ", info.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_names() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(36), "C2");
        assert_eq!(note_name(69), "A4");
    }

    #[test]
    fn stats_of_square_wave() {
        let stats = AudioStats::from_buffer(&[0.5, -0.5, 0.5, -0.5]);
        assert_eq!(stats.peak, 0.5);
        assert!((stats.rms - 0.5).abs() < 1e-6);
    }
}
