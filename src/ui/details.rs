use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::nav::PanelId;
use crate::status::{self, ProgramStatus};
use crate::ui::colors::{ACCENT, ACCENT_DIM, NOW_FG, TEXT_DIM, TEXT_PRIMARY};
use crate::ui::common::{self, format_day_clock};

pub fn render_details(f: &mut Frame, app: &App, area: Rect) {
    let active = app.nav.active_panel == PanelId::Details;
    let block = Block::default()
        .title(" DETAILS ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if active { ACCENT } else { ACCENT_DIM }));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if common::render_load_state(f, inner, &app.detail_state, "nothing selected") {
        return;
    }
    let Some(detail) = &app.detail else {
        return;
    };
    let program = &detail.program;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title + channel
            Constraint::Length(2), // time range + category
            Constraint::Length(1), // progress
            Constraint::Min(0),    // description
        ])
        .split(inner);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            program.title.clone(),
            Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            detail.channel_name.clone(),
            Style::default().fg(ACCENT),
        )),
    ]);
    f.render_widget(title, chunks[0]);

    let tz = &app.tz;
    let mut meta = vec![Line::from(Span::styled(
        format!(
            "{} – {}",
            format_day_clock(program.start, tz),
            common::format_clock(program.end, tz)
        ),
        Style::default().fg(TEXT_PRIMARY),
    ))];
    if let Some(category) = &program.category {
        meta.push(Line::from(Span::styled(
            category.clone(),
            Style::default().fg(TEXT_DIM),
        )));
    }
    f.render_widget(Paragraph::new(meta), chunks[1]);

    match status::classify(program, app.status_now) {
        ProgramStatus::Now => {
            let progress = status::elapsed_progress(program, app.status_now);
            let gauge = Gauge::default()
                .ratio(progress / 100.0)
                .label(format!("{progress:.0}%"))
                .gauge_style(Style::default().fg(NOW_FG));
            f.render_widget(gauge, chunks[2]);
        }
        ProgramStatus::Past => {
            f.render_widget(
                Paragraph::new("ended").style(Style::default().fg(TEXT_DIM)),
                chunks[2],
            );
        }
        ProgramStatus::Future => {
            f.render_widget(
                Paragraph::new("upcoming").style(Style::default().fg(TEXT_DIM)),
                chunks[2],
            );
        }
    }

    if let Some(description) = &program.description {
        let body = Paragraph::new(description.clone())
            .style(Style::default().fg(TEXT_PRIMARY))
            .wrap(Wrap { trim: true });
        f.render_widget(body, chunks[3]);
    }
}
