//! Decodes key events and routes them: overlays first (they capture
//! directional input), then the header's edit/day-bar handling, then the
//! panel transition table.

use std::time::Instant;

use chrono::{DateTime, Utc};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tui_input::backend::crossterm::EventHandler;

use crate::app::{App, AsyncAction};
use crate::nav::{NavEvent, OverlayKind, PanelId};
use crate::timewin;

pub fn handle_key_event(
    app: &mut App,
    key: KeyEvent,
    now: DateTime<Utc>,
    now_instant: Instant,
    tx: &mpsc::Sender<AsyncAction>,
) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.nav.overlay_capturing() {
        handle_overlay_key(app, key, now, now_instant, tx);
        return;
    }

    match app.nav.active_panel {
        PanelId::Header => handle_header_key(app, key, now, now_instant, tx),
        _ => handle_panel_key(app, key, now, tx),
    }
}

/// While an overlay is up, the top-level machine must not see directional
/// keys; they belong to the overlay's own navigation.
fn handle_overlay_key(
    app: &mut App,
    key: KeyEvent,
    now: DateTime<Utc>,
    now_instant: Instant,
    tx: &mpsc::Sender<AsyncAction>,
) {
    match app.nav.overlay {
        Some(OverlayKind::SearchResults) => match key.code {
            KeyCode::Up => app.search.move_cursor(-1),
            KeyCode::Down => app.search.move_cursor(1),
            KeyCode::Enter => {
                let cursor = app.search.cursor;
                if let Some(selection) = app.search.take_selection(cursor) {
                    app.close_overlay();
                    app.pending_target = Some((selection.channel_id, selection.program_id));
                    app.set_window(selection.window, tx);
                }
            }
            KeyCode::Esc => {
                app.search.clear();
                app.close_overlay();
            }
            // typing continues to edit the query under the dropdown
            _ => edit_query(app, key, now_instant),
        },
        Some(OverlayKind::DatePicker) => {
            let grid_event = match key.code {
                KeyCode::Up => Some(NavEvent::Up),
                KeyCode::Down => Some(NavEvent::Down),
                KeyCode::Left => Some(NavEvent::Left),
                KeyCode::Right => Some(NavEvent::Right),
                _ => None,
            };
            if let Some(event) = grid_event {
                if let Some(grid) = app.date_grid.as_mut() {
                    grid.handle(event);
                }
                return;
            }
            match key.code {
                KeyCode::Enter => app.pick_date(now, tx),
                KeyCode::Esc => app.close_overlay(),
                _ => {}
            }
        }
        None => {}
    }
}

/// Header: printable keys edit the search query, horizontal arrows walk
/// the day bar, Down drops into the channel list.
fn handle_header_key(
    app: &mut App,
    key: KeyEvent,
    now: DateTime<Utc>,
    now_instant: Instant,
    tx: &mpsc::Sender<AsyncAction>,
) {
    match key.code {
        KeyCode::Down => app.handle_nav(NavEvent::Down, tx),
        KeyCode::Left => app.step_day(-1, now, tx),
        KeyCode::Right => app.step_day(1, now, tx),
        KeyCode::Esc => app.search.clear(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.open_date_picker(now);
        }
        _ => edit_query(app, key, now_instant),
    }
}

fn handle_panel_key(app: &mut App, key: KeyEvent, now: DateTime<Utc>, tx: &mpsc::Sender<AsyncAction>) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('/') => app.focus_panel(PanelId::Header),
        // explicit refresh; also the only retry path after a fetch error
        KeyCode::Char('r') => app.request_guide(tx),
        KeyCode::Char('n') => {
            app.set_window(timewin::window_centered_on(now, timewin::DEFAULT_SPAN_HOURS), tx);
        }
        KeyCode::Char('p') => app.set_window(timewin::canonical_prime_time_window(now, app.tz), tx),
        KeyCode::Char('m') => app.set_window(timewin::canonical_morning_window(now, app.tz), tx),
        KeyCode::Char('d') => app.open_date_picker(now),
        KeyCode::Char(',') => app.shift_window_days(-1, now, tx),
        KeyCode::Char('.') => app.shift_window_days(1, now, tx),
        KeyCode::Char('j') | KeyCode::Down => app.handle_nav(NavEvent::Down, tx),
        KeyCode::Char('k') | KeyCode::Up => app.handle_nav(NavEvent::Up, tx),
        KeyCode::Char('h') | KeyCode::Left => app.handle_nav(NavEvent::Left, tx),
        KeyCode::Char('l') | KeyCode::Right => app.handle_nav(NavEvent::Right, tx),
        KeyCode::Enter => app.handle_nav(NavEvent::Activate, tx),
        KeyCode::Esc | KeyCode::Backspace => app.handle_nav(NavEvent::Back, tx),
        _ => {}
    }
}

fn edit_query(app: &mut App, key: KeyEvent, now_instant: Instant) {
    if let Some(change) = app.search.input.handle_event(&Event::Key(key)) {
        if change.value {
            app.search.note_input(now_instant);
        }
    }
}
