use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::nav::PanelId;
use crate::ui::colors::{ACCENT, ACCENT_DIM, ERROR_FG, TEXT_DIM, TEXT_PRIMARY};
use crate::ui::common::format_day_clock;

pub fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let active = app.nav.active_panel == PanelId::Header;
    let border_color = if active { ACCENT } else { ACCENT_DIM };
    let block = Block::default()
        .title(" GUIDE ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    render_search_line(f, app, rows[0], active);
    render_day_bar(f, app, rows[1]);
}

fn render_search_line(f: &mut Frame, app: &App, area: Rect, active: bool) {
    let mut spans = vec![Span::styled(" search: ", Style::default().fg(TEXT_DIM))];
    let query = app.search.query();
    let query_style = if active {
        Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_PRIMARY)
    };
    spans.push(Span::styled(query.to_string(), query_style));
    if active {
        spans.push(Span::styled("_", Style::default().fg(ACCENT)));
    }

    if app.search.in_flight {
        spans.push(Span::styled("  searching…", Style::default().fg(TEXT_DIM)));
    } else if let Some(error) = &app.search.error {
        spans.push(Span::styled(
            format!("  ✗ {error}"),
            Style::default().fg(ERROR_FG),
        ));
    } else if app.search.no_matches() {
        spans.push(Span::styled("  no matches", Style::default().fg(TEXT_DIM)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);

    // wall clock on the right
    let clock = format_day_clock(app.status_now, &app.tz);
    let clock_p = Paragraph::new(clock)
        .alignment(Alignment::Right)
        .style(Style::default().fg(TEXT_DIM));
    f.render_widget(clock_p, area);
}

fn render_day_bar(f: &mut Frame, app: &App, area: Rect) {
    let selected_style = Style::default()
        .bg(ACCENT)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD);
    let idle_style = Style::default().fg(TEXT_PRIMARY);

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    let mut selected_in_set = false;
    for option in &app.day_options.options {
        let selected =
            option.id == app.selected_day.id && option.anchor_date == app.selected_day.anchor_date;
        selected_in_set |= selected;
        spans.push(Span::styled(
            format!(" {} ", option.label),
            if selected { selected_style } else { idle_style },
        ));
        spans.push(Span::styled(" · ", Style::default().fg(TEXT_DIM)));
    }
    // an ad-hoc picked date gets its own trailing chip
    if !selected_in_set {
        spans.push(Span::styled(
            format!(" {} {} ", app.selected_day.label, app.selected_day.anchor_date.format("%d")),
            selected_style,
        ));
    } else {
        spans.pop();
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
