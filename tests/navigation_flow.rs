//! End-to-end key-event flows against the app with the fixture backend:
//! guide load, panel navigation, details, and the search round trip.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use tokio::sync::mpsc;

use tvgrid_lib::api::JsonFileBackend;
use tvgrid_lib::app::{App, AsyncAction, ShellSignal};
use tvgrid_lib::config::AppConfig;
use tvgrid_lib::errors::LoadState;
use tvgrid_lib::handlers::{async_actions, input};
use tvgrid_lib::nav::{OverlayKind, PanelId};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 22, 12, 0, 0).unwrap()
}

fn make_key(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::empty(),
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

struct Harness {
    app: App,
    tx: mpsc::Sender<AsyncAction>,
    rx: mpsc::Receiver<AsyncAction>,
    clock: Instant,
}

impl Harness {
    fn new() -> Self {
        let now = fixed_now();
        let config = AppConfig {
            timezone: Some("UTC".to_string()),
            ..AppConfig::default()
        };
        let app = App::new(config, Arc::new(JsonFileBackend::sample(now)), now);
        let (tx, rx) = mpsc::channel(32);
        Harness {
            app,
            tx,
            rx,
            clock: Instant::now(),
        }
    }

    fn key(&mut self, code: KeyCode) {
        input::handle_key_event(&mut self.app, make_key(code), fixed_now(), self.clock, &self.tx);
    }

    /// Waits for one action and applies it.
    async fn settle_one(&mut self) {
        let action = self.rx.recv().await.expect("channel closed");
        async_actions::handle_async_action(&mut self.app, action);
    }
}

#[tokio::test]
async fn guide_loads_and_panels_navigate() {
    let mut h = Harness::new();
    h.app.request_guide(&h.tx);
    h.settle_one().await;

    assert_eq!(h.app.guide_state, LoadState::Ready);
    assert!(!h.app.channels.is_empty());
    assert_eq!(h.app.nav.active_panel, PanelId::Channels);
    assert_eq!(h.app.nav.channel_cursor, Some(0));

    // channels -> schedule, auto-selecting the airing program
    h.key(KeyCode::Right);
    assert_eq!(h.app.nav.active_panel, PanelId::Schedule);
    let cursor = h.app.nav.schedule_cursor.expect("schedule auto-selection");
    let airing = h.app.schedule_programs()[cursor].clone();
    assert!(airing.start <= fixed_now() && fixed_now() < airing.end);

    // activate -> details, with the program-activated shell signal
    h.key(KeyCode::Enter);
    assert_eq!(h.app.nav.active_panel, PanelId::Details);
    assert!(h.app.nav.details_open);
    assert!(h
        .app
        .drain_signals()
        .contains(&ShellSignal::ProgramActivated(airing.program_id.clone())));
    h.settle_one().await;
    assert_eq!(h.app.detail_state, LoadState::Ready);
    assert_eq!(h.app.detail.as_ref().unwrap().program.program_id, airing.program_id);

    // close details, then schedule -> channels
    h.key(KeyCode::Esc);
    assert_eq!(h.app.nav.active_panel, PanelId::Schedule);
    assert!(!h.app.nav.details_open);
    h.key(KeyCode::Left);
    assert_eq!(h.app.nav.active_panel, PanelId::Channels);

    // up at the top of the channel list crosses into the header
    h.key(KeyCode::Up);
    assert_eq!(h.app.nav.active_panel, PanelId::Header);
    h.key(KeyCode::Down);
    assert_eq!(h.app.nav.active_panel, PanelId::Channels);
}

#[tokio::test]
async fn moving_channel_resets_schedule_selection() {
    let mut h = Harness::new();
    h.app.request_guide(&h.tx);
    h.settle_one().await;

    h.key(KeyCode::Right);
    let first = h.app.nav.schedule_cursor;
    assert!(first.is_some());
    h.key(KeyCode::Left);
    h.key(KeyCode::Down);
    assert_eq!(h.app.nav.channel_cursor, Some(1));
    // the new channel's schedule re-selects on entry
    h.key(KeyCode::Right);
    assert!(h.app.nav.schedule_cursor.is_some());
}

#[tokio::test]
async fn search_round_trip_recenters_the_window() {
    let mut h = Harness::new();
    h.app.request_guide(&h.tx);
    h.settle_one().await;

    // focus the header and type a query
    h.key(KeyCode::Up);
    assert_eq!(h.app.nav.active_panel, PanelId::Header);
    for c in "atlas".chars() {
        h.key(KeyCode::Char(c));
    }
    assert_eq!(h.app.search.query(), "atlas");

    // nothing fires before the debounce elapses
    h.app.tick(h.clock + Duration::from_millis(100), fixed_now(), &h.tx.clone());
    assert!(!h.app.search.in_flight);

    let tx = h.tx.clone();
    h.app.tick(h.clock + Duration::from_millis(350), fixed_now(), &tx);
    assert!(h.app.search.in_flight);
    h.settle_one().await;

    assert!(!h.app.search.results.is_empty());
    assert_eq!(h.app.nav.overlay, Some(OverlayKind::SearchResults));
    assert!(h.app.nav.overlay_capturing());

    // pick the second result; the guide re-fetches a centered window
    h.key(KeyCode::Down);
    let hit = h.app.search.results[h.app.search.cursor].clone();
    h.key(KeyCode::Enter);
    assert_eq!(h.app.nav.overlay, None);
    assert_eq!(h.app.search.query(), "");
    assert!(h.app.window.contains(hit.start));
    let signals = h.app.drain_signals();
    assert!(signals.iter().any(|s| matches!(s, ShellSignal::WindowChanged(_))));

    h.settle_one().await;
    // the target program is focused once the new window lands
    assert_eq!(h.app.nav.active_panel, PanelId::Schedule);
    let selected = h.app.selected_program().expect("target focused");
    assert_eq!(selected.program_id, hit.program_id);
}

#[tokio::test]
async fn escape_dismisses_search_and_returns_focus() {
    let mut h = Harness::new();
    h.app.request_guide(&h.tx);
    h.settle_one().await;

    h.key(KeyCode::Up);
    for c in "news".chars() {
        h.key(KeyCode::Char(c));
    }
    let tx = h.tx.clone();
    h.app.tick(h.clock + Duration::from_millis(400), fixed_now(), &tx);
    h.settle_one().await;
    assert!(h.app.nav.overlay_capturing());

    h.key(KeyCode::Esc);
    assert!(!h.app.nav.overlay_capturing());
    // focus returns to the panel that opened the overlay
    assert_eq!(h.app.nav.active_panel, PanelId::Header);
    assert_eq!(h.app.search.query(), "");
    assert!(h.app.search.results.is_empty());
}

#[tokio::test]
async fn date_picker_overlay_owns_directional_keys() {
    let mut h = Harness::new();
    h.app.request_guide(&h.tx);
    h.settle_one().await;

    h.key(KeyCode::Char('d'));
    assert_eq!(h.app.nav.overlay, Some(OverlayKind::DatePicker));

    // directional keys move the grid cursor, not the panels
    h.key(KeyCode::Right);
    h.key(KeyCode::Down);
    let grid = h.app.date_grid.expect("grid open");
    let origin = grid.origin;
    assert_eq!(grid.cursor, origin + chrono::Duration::days(8));
    assert_eq!(h.app.nav.active_panel, PanelId::Channels);

    h.key(KeyCode::Enter);
    assert_eq!(h.app.nav.overlay, None);
    assert_eq!(
        h.app.selected_day.anchor_date,
        origin + chrono::Duration::days(8)
    );
    // picking a date supersedes the old guide fetch
    assert!(h.app.guide_state.is_loading());
}

#[tokio::test]
async fn stale_fetches_are_discarded_silently() {
    let mut h = Harness::new();
    h.app.request_guide(&h.tx);
    let stale = h.rx.recv().await.expect("first result");

    // a new request supersedes the not-yet-applied result
    h.app.request_guide(&h.tx);
    let fresh = h.rx.recv().await.expect("second result");
    async_actions::handle_async_action(&mut h.app, fresh);
    let loaded_len = h.app.channels.len();
    assert_eq!(h.app.guide_state, LoadState::Ready);

    // the superseded result must not overwrite fresher state or surface
    async_actions::handle_async_action(&mut h.app, stale);
    assert_eq!(h.app.channels.len(), loaded_len);
    assert_eq!(h.app.guide_state, LoadState::Ready);
}

#[tokio::test]
async fn explicit_refresh_is_the_only_retry_path() {
    let mut h = Harness::new();
    h.app.request_guide(&h.tx);
    h.settle_one().await;
    let generation_after_load = {
        // ticking without the refresh interval elapsing issues no fetch
        let tx = h.tx.clone();
        h.app.tick(h.clock + Duration::from_millis(100), fixed_now(), &tx);
        assert!(h.rx.try_recv().is_err());
        h.app.guide_state.clone()
    };
    assert_eq!(generation_after_load, LoadState::Ready);

    // 'r' re-fetches on demand
    h.key(KeyCode::Char('r'));
    assert!(h.app.guide_state.is_loading());
    h.settle_one().await;
    assert_eq!(h.app.guide_state, LoadState::Ready);
}

#[tokio::test]
async fn quit_keys_set_the_flag() {
    let mut h = Harness::new();
    h.key(KeyCode::Char('q'));
    assert!(h.app.should_quit);

    let mut h = Harness::new();
    input::handle_key_event(
        &mut h.app,
        KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        },
        fixed_now(),
        h.clock,
        &h.tx.clone(),
    );
    assert!(h.app.should_quit);
}
