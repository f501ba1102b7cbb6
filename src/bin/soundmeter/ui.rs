//! Meter screen rendering.

use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;
use soundmeter::presenter::{LevelBand, LevelPresenter, MeterState};

pub(crate) fn draw(frame: &mut Frame, presenter: &LevelPresenter, status: &str) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(frame.size());

    let readout = Paragraph::new(format!("Sound Level: {} dB", presenter.display_value()))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("SoundMeter"));
    frame.render_widget(readout, areas[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(band_color(presenter.band())))
        .ratio(f64::from(presenter.normalized_level()))
        .label(format!("{} dB", presenter.display_value()));
    frame.render_widget(gauge, areas[1]);

    let mut lines = vec![Line::from(status.to_string())];
    if presenter.is_dangerous() {
        lines.push(Line::styled(
            "Dangerous Level",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    lines.push(Line::from(key_hint(presenter.state())));
    let footer = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(footer, areas[2]);
}

fn band_color(band: LevelBand) -> Color {
    match band {
        LevelBand::Safe => Color::Green,
        LevelBand::Caution => Color::Yellow,
        LevelBand::Danger => Color::Red,
    }
}

fn key_hint(state: MeterState) -> &'static str {
    match state {
        MeterState::Idle => "s: start  q: quit",
        MeterState::Recording => "t: stop  q: quit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_colors_match_thresholds() {
        assert_eq!(band_color(LevelBand::Safe), Color::Green);
        assert_eq!(band_color(LevelBand::Caution), Color::Yellow);
        assert_eq!(band_color(LevelBand::Danger), Color::Red);
    }

    #[test]
    fn key_hints_follow_state() {
        assert!(key_hint(MeterState::Idle).contains("s: start"));
        assert!(key_hint(MeterState::Recording).contains("t: stop"));
    }
}
