use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::Paragraph,
    Frame,
};

use crate::errors::LoadState;
use crate::ui::colors::{ERROR_FG, TEXT_DIM};

/// Centered sub-rectangle, sized as percentages of `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Renders the loading/empty/error states of a panel. Returns true if a
/// state line was drawn (the caller skips its normal content).
pub fn render_load_state(f: &mut Frame, area: Rect, state: &LoadState, empty_text: &str) -> bool {
    let (text, style) = match state {
        LoadState::Loading => (
            "loading…".to_string(),
            Style::default().fg(TEXT_DIM).add_modifier(Modifier::ITALIC),
        ),
        LoadState::Empty => (empty_text.to_string(), Style::default().fg(TEXT_DIM)),
        LoadState::Failed(message) => (
            format!("✗ {message}  (r to retry)"),
            Style::default().fg(ERROR_FG),
        ),
        LoadState::Idle | LoadState::Ready => return false,
    };
    let p = Paragraph::new(text).style(style).alignment(Alignment::Center);
    let line = Rect {
        y: area.y + area.height / 2,
        height: 1.min(area.height),
        ..area
    };
    f.render_widget(p, line);
    true
}

pub fn format_clock(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant.with_timezone(tz).format("%H:%M").to_string()
}

pub fn format_day_clock(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant.with_timezone(tz).format("%a %H:%M").to_string()
}
