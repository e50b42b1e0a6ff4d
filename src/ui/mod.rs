pub mod colors;
pub mod common;
pub mod details;
pub mod footer;
pub mod grid;
pub mod header;
pub mod popups;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::App;
use crate::nav::OverlayKind;

pub fn ui(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header: search + day bar
            Constraint::Min(0),    // guide body
            Constraint::Length(1), // footer hints
        ])
        .split(area);

    header::render_header(f, app, chunks[0]);

    if app.nav.details_open {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(38)])
            .split(chunks[1]);
        grid::render_guide(f, app, body[0]);
        details::render_details(f, app, body[1]);
    } else {
        grid::render_guide(f, app, chunks[1]);
    }

    footer::render_footer(f, app, chunks[2]);

    // overlays draw last; they own directional input while up
    match app.nav.overlay {
        Some(OverlayKind::SearchResults) => popups::render_search_dropdown(f, app, area),
        Some(OverlayKind::DatePicker) => popups::render_date_picker(f, app, area),
        None => {}
    }
}
