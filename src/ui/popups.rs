use chrono::Datelike;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::nav::{DateGrid, DATE_GRID_COLUMNS, DATE_GRID_DAYS};
use crate::ui::colors::{ACCENT, SELECTED_BG, SELECTED_FG, TEXT_DIM, TEXT_PRIMARY};
use crate::ui::common::{centered_rect, format_day_clock};

/// Search results dropdown, anchored under the header.
pub fn render_search_dropdown(f: &mut Frame, app: &App, area: Rect) {
    let height = (app.search.results.len() as u16 + 2).min(12);
    let width = (area.width * 2 / 3).max(40).min(area.width);
    let popup = Rect {
        x: area.x + 1,
        y: area.y + 4,
        width: width.min(area.width.saturating_sub(2)),
        height: height.min(area.height.saturating_sub(5)),
    };
    f.render_widget(Clear, popup);

    let items: Vec<ListItem> = app
        .search
        .results
        .iter()
        .map(|hit| {
            let mut spans = vec![
                Span::styled(hit.title.clone(), Style::default().fg(TEXT_PRIMARY)),
                Span::styled(
                    format!("  {}", hit.channel_name),
                    Style::default().fg(ACCENT),
                ),
                Span::styled(
                    format!("  {}", format_day_clock(hit.start, &app.tz)),
                    Style::default().fg(TEXT_DIM),
                ),
            ];
            if let Some(category) = &hit.category {
                spans.push(Span::styled(
                    format!("  [{category}]"),
                    Style::default().fg(TEXT_DIM),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" RESULTS ({}) ", app.search.results.len()))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT)),
        )
        .highlight_style(
            Style::default()
                .bg(SELECTED_BG)
                .fg(SELECTED_FG)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(" » ");

    let mut state = ListState::default();
    state.select(Some(app.search.cursor));
    f.render_stateful_widget(list, popup, &mut state);
}

/// Date-picker grid: 5 rows × 7 days, anchored at today.
pub fn render_date_picker(f: &mut Frame, app: &App, area: Rect) {
    let Some(grid) = &app.date_grid else {
        return;
    };
    let popup = centered_rect(40, 50, area);
    let popup = Rect {
        width: popup.width.max(31).min(area.width),
        height: popup.height.max(9).min(area.height),
        ..popup
    };
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" PICK DATE — {} ", grid.cursor.format("%a %d %b %Y")))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        weekday_ruler(grid),
        Style::default().fg(TEXT_DIM),
    )));
    let rows = DATE_GRID_DAYS as usize / DATE_GRID_COLUMNS;
    for row in 0..rows {
        let mut spans = Vec::new();
        for col in 0..DATE_GRID_COLUMNS {
            let date = grid.origin + chrono::Duration::days((row * DATE_GRID_COLUMNS + col) as i64);
            let style = if date == grid.cursor {
                Style::default()
                    .bg(SELECTED_BG)
                    .fg(SELECTED_FG)
                    .add_modifier(Modifier::BOLD)
            } else if date.month() == grid.origin.month() {
                Style::default().fg(TEXT_PRIMARY)
            } else {
                Style::default().fg(TEXT_DIM)
            };
            spans.push(Span::styled(format!(" {:>2} ", date.day()), style));
        }
        lines.push(Line::from(spans));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

fn weekday_ruler(grid: &DateGrid) -> String {
    (0..DATE_GRID_COLUMNS)
        .map(|col| {
            let date = grid.origin + chrono::Duration::days(col as i64);
            format!(" {} ", &date.format("%a").to_string()[..2])
        })
        .collect()
}
