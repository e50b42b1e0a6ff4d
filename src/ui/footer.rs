use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::nav::{OverlayKind, PanelId};

pub fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let label_style = Style::default().fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [Span::styled(format!(" {key} "), key_style), Span::styled(format!("{label}  "), label_style)]
    };

    let mut spans: Vec<Span> = Vec::new();
    match app.nav.overlay {
        Some(OverlayKind::SearchResults) => {
            spans.extend(hint("↑↓", "Pick"));
            spans.extend(hint("Enter", "Jump to program"));
            spans.extend(hint("Esc", "Dismiss"));
        }
        Some(OverlayKind::DatePicker) => {
            spans.extend(hint("←→", "Day"));
            spans.extend(hint("↑↓", "Week"));
            spans.extend(hint("Enter", "Pick"));
            spans.extend(hint("Esc", "Close"));
        }
        None => match app.nav.active_panel {
            PanelId::Header => {
                spans.extend(hint("type", "Search"));
                spans.extend(hint("←→", "Day"));
                spans.extend(hint("Ctrl+d", "Date"));
                spans.extend(hint("↓", "Channels"));
            }
            PanelId::Channels => {
                spans.extend(hint("↑↓", "Channel"));
                spans.extend(hint("→", "Schedule"));
                spans.extend(hint("n", "Now"));
                spans.extend(hint("p", "Prime time"));
                spans.extend(hint("m", "Tomorrow AM"));
                spans.extend(hint(", .", "±Day"));
                spans.extend(hint("r", "Refresh"));
                spans.extend(hint("q", "Quit"));
            }
            PanelId::Schedule => {
                spans.extend(hint("↑↓", "Program"));
                spans.extend(hint("←", "Channels"));
                spans.extend(hint("Enter", "Details"));
                spans.extend(hint("/", "Search"));
                spans.extend(hint("d", "Date"));
                spans.extend(hint("q", "Quit"));
            }
            PanelId::Details => {
                spans.extend(hint("←", "Back to schedule"));
                spans.extend(hint("Esc", "Close"));
            }
        },
    }

    f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Left), area);
}
