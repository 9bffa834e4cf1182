//! Parameter panel

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use acid_dsp::{Controls, ParamId};

/// Human-readable value of one parameter
pub fn format_value(controls: &Controls, id: ParamId) -> String {
    let value = controls.get(id);
    match id {
        ParamId::Waveform => controls.oscillator.waveform().name().to_owned(),
        ParamId::DriveMode => controls.overdrive.mode().name().to_owned(),
        ParamId::FxType => controls.effects.effect_type().name().to_owned(),
        ParamId::ArpMode => controls.arpeggiator.mode().name().to_owned(),
        ParamId::ArpDivision => controls.arpeggiator.division().name().to_owned(),
        ParamId::ArpEnabled => (if value >= 0.5 { "on" } else { "off" }).to_owned(),
        ParamId::ArpOctaves => format!("{value:.0}"),
        ParamId::Cutoff => format!("{value:.0} Hz"),
        ParamId::FxTime => format!("{value:.0} ms"),
        ParamId::FxModRate => format!("{value:.2} Hz"),
        ParamId::Decay | ParamId::SlideTime => format!("{value:.3} s"),
        ParamId::FineTune => format!("{value:+.0} ct"),
        ParamId::OutputGain => format!("{value:+.1} dB"),
        _ => format!("{value:.2}"),
    }
}

pub fn render_panel(frame: &mut Frame, area: Rect, controls: &Controls, selected: usize) {
    let block = Block::default().title(" Parameters ").borders(Borders::ALL);

    let items: Vec<ListItem> = ParamId::ALL
        .iter()
        .map(|&id| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<12}", id.name()),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(format_value(controls, id), Style::default().fg(Color::Yellow)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}
