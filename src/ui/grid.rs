//! The channel×time matrix. Only the rows and slot columns inside the
//! visible+overscan window are drawn; everything else is skipped before
//! any cell text is built.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders},
    Frame,
};

use crate::app::App;
use crate::nav::PanelId;
use crate::status::{self, ProgramStatus};
use crate::ui::colors::{
    ACCENT, ACCENT_DIM, CELL_ALT_BG, CELL_BG, NOW_FG, NOW_MARKER, PAST_FG, SELECTED_BG,
    SELECTED_FG, TEXT_DIM, TEXT_PRIMARY,
};
use crate::ui::common::{self, format_clock};
use crate::viewport::{self, GuideLayout};

pub fn render_guide(f: &mut Frame, app: &mut App, area: Rect) {
    let geometry = app.geometry;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(geometry.label_width), Constraint::Min(0)])
        .split(area);

    let channels_active = app.nav.active_panel == PanelId::Channels;
    let schedule_active = matches!(app.nav.active_panel, PanelId::Schedule | PanelId::Details);

    let label_block = Block::default()
        .title(format!(" CHANNELS ({}) ", app.channels.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if channels_active { ACCENT } else { ACCENT_DIM }));
    let label_inner = label_block.inner(chunks[0]);
    f.render_widget(label_block, chunks[0]);

    let tz = app.tz;
    let window_title = format!(
        " SCHEDULE {} – {} ",
        common::format_day_clock(app.window.start, &tz),
        format_clock(app.window.end, &tz),
    );
    let grid_block = Block::default()
        .title(window_title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if schedule_active { ACCENT } else { ACCENT_DIM }));
    let grid_inner = grid_block.inner(chunks[1]);
    f.render_widget(grid_block, chunks[1]);

    if common::render_load_state(f, grid_inner, &app.guide_state, "no programs in this window") {
        return;
    }
    let layout = match viewport::compute_layout(app.window, &app.channels) {
        GuideLayout::Ready(layout) => layout,
        GuideLayout::Empty => {
            common::render_load_state(
                f,
                grid_inner,
                &crate::errors::LoadState::Empty,
                "no programs in this window",
            );
            return;
        }
    };

    if grid_inner.height < 2 || grid_inner.width == 0 {
        return;
    }
    // first row is the slot header, the rest scrolls channels
    let slots_area = Rect { height: 1, ..grid_inner };
    let rows_area = Rect {
        y: grid_inner.y + 1,
        height: grid_inner.height - 1,
        ..grid_inner
    };

    follow_cursors(app, &layout, rows_area, grid_inner.width);

    let visible = viewport::visible_window(
        &layout,
        &geometry,
        app.channels.len(),
        app.row_scroll,
        app.col_scroll,
        rows_area.height,
        grid_inner.width,
    );

    // slot header
    let buf = f.buffer_mut();
    for slot in visible.cols.range() {
        let cell_x = slot as i64 * geometry.slot_width as i64 - app.col_scroll as i64;
        let label = format_clock(layout.slot_time(slot), &tz);
        draw_clipped(
            buf,
            slots_area,
            cell_x,
            geometry.slot_width as i64,
            &label,
            Style::default().fg(TEXT_DIM),
        );
    }

    let visible_cells_start = app.col_scroll as i64;
    let visible_cells_end = visible_cells_start + grid_inner.width as i64
        + (geometry.overscan as i64 * geometry.slot_width as i64);
    let selected_channel = app.nav.channel_cursor;
    let selected_program = app.nav.schedule_cursor;

    for row in visible.rows.range() {
        let y = rows_area.y as i64 + row as i64 * geometry.row_height as i64 - app.row_scroll as i64;
        if y < rows_area.y as i64 || y >= rows_area.y as i64 + rows_area.height as i64 {
            continue;
        }
        let y = y as u16;
        let channel = &app.channels[row];
        let row_selected = selected_channel == Some(row);

        // channel label pane shares the row windowing
        let label_style = if row_selected && channels_active {
            Style::default().bg(SELECTED_BG).fg(SELECTED_FG).add_modifier(Modifier::BOLD)
        } else if row_selected {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_PRIMARY)
        };
        if y >= label_inner.y && y < label_inner.y + label_inner.height {
            let text = format!(" {:<width$}", channel.display_name, width = label_inner.width as usize);
            buf.set_stringn(label_inner.x, y, text, label_inner.width as usize, label_style);
        }

        for (index, program) in channel.programs.iter().enumerate() {
            let Some(span) = layout.program_span(program.start, program.end, geometry.slot_width)
            else {
                continue;
            };
            if (span.x as i64) >= visible_cells_end || (span.x + span.width) as i64 <= visible_cells_start
            {
                continue;
            }
            let program_status = status::classify(program, app.status_now);
            let selected = row_selected && selected_program == Some(index) && schedule_active;
            let style = cell_style(program_status, selected, index % 2 == 0);

            let mut text = format!("▏{}", program.title);
            if program_status == ProgramStatus::Now {
                let progress = status::elapsed_progress(program, app.status_now);
                text = format!("▏● {} {:.0}%", program.title, progress);
            }
            let cell_x = span.x as i64 - app.col_scroll as i64;
            draw_cell(buf, rows_area, cell_x, y, span.width as i64, &text, style);
        }
    }

    // NOW marker line over the grid
    if let Some(marker) = layout.now_marker_x(app.status_now, geometry.slot_width) {
        let x = marker as i64 - app.col_scroll as i64;
        if x >= 0 && x < grid_inner.width as i64 {
            let x = grid_inner.x + x as u16;
            for y in slots_area.y..rows_area.y + rows_area.height {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_style(Style::default().fg(NOW_MARKER));
                }
            }
            buf.set_stringn(x, slots_area.y, "▼", 1, Style::default().fg(NOW_MARKER));
        }
    }
}

/// Keeps the selected channel row and program cell inside the viewport,
/// moving the scroll offsets the minimum distance.
fn follow_cursors(app: &mut App, layout: &viewport::GridLayout, rows_area: Rect, grid_width: u16) {
    let geometry = app.geometry;
    if let Some(row) = app.nav.channel_cursor {
        app.row_scroll = viewport::scroll_into_view(
            row,
            geometry.row_height as u32,
            app.row_scroll,
            rows_area.height as u32,
        );
    }
    let max_row = viewport::max_scroll(app.channels.len(), geometry.row_height as u32, rows_area.height as u32);
    app.row_scroll = app.row_scroll.min(max_row);

    let target = app
        .selected_program_span(layout)
        .map(|span| span.x)
        .or_else(|| layout.now_marker_x(app.status_now, geometry.slot_width));
    if let Some(x) = target {
        if x < app.col_scroll {
            app.col_scroll = x;
        } else if x >= app.col_scroll + grid_width as u32 {
            app.col_scroll = x.saturating_sub(grid_width as u32 / 2);
        }
    }
    let max_col = viewport::max_scroll(layout.slot_count, geometry.slot_width as u32, grid_width as u32);
    app.col_scroll = app.col_scroll.min(max_col);
}

fn cell_style(program_status: ProgramStatus, selected: bool, alt: bool) -> Style {
    if selected {
        return Style::default()
            .bg(SELECTED_BG)
            .fg(SELECTED_FG)
            .add_modifier(Modifier::BOLD);
    }
    let bg = if alt { CELL_BG } else { CELL_ALT_BG };
    match program_status {
        ProgramStatus::Now => Style::default().bg(bg).fg(NOW_FG),
        ProgramStatus::Past => Style::default().bg(bg).fg(PAST_FG),
        ProgramStatus::Future => Style::default().bg(bg).fg(TEXT_PRIMARY),
    }
}

/// Writes one cell, clipping to the pane and padding to the cell width so
/// the background covers the whole span.
fn draw_cell(
    buf: &mut ratatui::buffer::Buffer,
    pane: Rect,
    cell_x: i64,
    y: u16,
    cell_width: i64,
    text: &str,
    style: Style,
) {
    let padded = format!("{:<width$}", text, width = cell_width.max(0) as usize);
    draw_clipped_at(buf, pane, cell_x, y, cell_width, &padded, style);
}

fn draw_clipped(
    buf: &mut ratatui::buffer::Buffer,
    pane: Rect,
    cell_x: i64,
    cell_width: i64,
    text: &str,
    style: Style,
) {
    draw_clipped_at(buf, pane, cell_x, pane.y, cell_width, text, style);
}

fn draw_clipped_at(
    buf: &mut ratatui::buffer::Buffer,
    pane: Rect,
    cell_x: i64,
    y: u16,
    cell_width: i64,
    text: &str,
    style: Style,
) {
    let pane_w = pane.width as i64;
    let start = cell_x.max(0);
    let end = (cell_x + cell_width).min(pane_w);
    if start >= end {
        return;
    }
    let skip = (start - cell_x) as usize;
    let visible: String = text.chars().skip(skip).take((end - start) as usize).collect();
    buf.set_stringn(pane.x + start as u16, y, visible, (end - start) as usize, style);
}
