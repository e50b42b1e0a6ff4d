//! Owning application state. Every shared field has a single writer: key
//! handlers and async-action application both go through the methods here.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::api::{self, Channel, ChannelDto, ChannelId, GuideBackend, Program, ProgramDetail, ProgramDetailDto, ProgramId, SearchResultDto};
use crate::config::AppConfig;
use crate::days::{self, DayOption, DayOptions};
use crate::errors::LoadState;
use crate::nav::{self, DateGrid, NavContext, NavEffect, NavEvent, NavigationState, OverlayKind, PanelId};
use crate::scheduler::{self, Scheduler};
use crate::search::SearchController;
use crate::status::{self, ProgramStatus};
use crate::timewin::{self, TimeWindow};
use crate::viewport::{self, GridGeometry};

/// Messages completed async work sends back into the event loop.
#[derive(Debug)]
pub enum AsyncAction {
    GuideLoaded { generation: u64, channels: Vec<ChannelDto> },
    GuideFailed { generation: u64, message: String },
    SearchLoaded { generation: u64, results: Vec<SearchResultDto> },
    SearchFailed { generation: u64, message: String },
    DetailLoaded { generation: u64, detail: ProgramDetailDto },
    DetailFailed { generation: u64, message: String },
}

/// Signals the surrounding shell consumes (details routing, re-query
/// notifications). Drained once per loop iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellSignal {
    WindowChanged(TimeWindow),
    ProgramActivated(ProgramId),
}

pub struct App {
    pub config: AppConfig,
    pub tz: Tz,
    pub backend: Arc<dyn GuideBackend>,
    pub geometry: GridGeometry,

    // Time axis
    pub window: TimeWindow,
    pub day_options: DayOptions,
    pub selected_day: DayOption,
    /// Classifier clock; advanced by the reclassification task, never by
    /// renders, so statuses change on the fixed cadence
    pub status_now: DateTime<Utc>,

    // Guide data (owned for the lifetime of the window)
    pub channels: Vec<Channel>,
    pub guide_state: LoadState,
    pub(crate) guide_generation: u64,
    guide_abort: Option<AbortHandle>,
    /// Channel/program to focus once the next guide fetch lands
    pub pending_target: Option<(ChannelId, ProgramId)>,

    // Details panel
    pub detail: Option<ProgramDetail>,
    pub detail_state: LoadState,
    pub(crate) detail_generation: u64,
    detail_abort: Option<AbortHandle>,

    // Navigation + viewport
    pub nav: NavigationState,
    pub row_scroll: u32,
    pub col_scroll: u32,
    pub date_grid: Option<DateGrid>,

    // Search
    pub search: SearchController,
    search_abort: Option<AbortHandle>,

    pub scheduler: Scheduler,
    pub should_quit: bool,
    signals: Vec<ShellSignal>,
}

impl App {
    pub fn new(config: AppConfig, backend: Arc<dyn GuideBackend>, now: DateTime<Utc>) -> App {
        let tz = config.user_tz();
        let geometry = GridGeometry {
            row_height: config.row_height,
            slot_width: config.slot_width,
            overscan: config.overscan,
            ..GridGeometry::default()
        };
        let day_options = days::compute_day_options(now, tz);
        let selected_day = day_options.today().clone();
        let window = selected_day.window;
        let mut scheduler = Scheduler::for_guide();
        scheduler.start_all(Instant::now());

        App {
            config,
            tz,
            backend,
            geometry,
            window,
            day_options,
            selected_day,
            status_now: now,
            channels: Vec::new(),
            guide_state: LoadState::Idle,
            guide_generation: 0,
            guide_abort: None,
            pending_target: None,
            detail: None,
            detail_state: LoadState::Idle,
            detail_generation: 0,
            detail_abort: None,
            nav: NavigationState::default(),
            row_scroll: 0,
            col_scroll: 0,
            date_grid: None,
            search: SearchController::new(),
            search_abort: None,
            scheduler,
            should_quit: false,
            signals: Vec::new(),
        }
    }

    // -- selection accessors -------------------------------------------------

    pub fn selected_channel(&self) -> Option<&Channel> {
        self.channels.get(self.nav.channel_cursor?)
    }

    /// The schedule panel lists the selected channel's programs.
    pub fn schedule_programs(&self) -> &[Program] {
        self.selected_channel().map(|c| c.programs.as_slice()).unwrap_or(&[])
    }

    pub fn selected_program(&self) -> Option<&Program> {
        self.schedule_programs().get(self.nav.schedule_cursor?)
    }

    /// Grid span of the selected program, for scroll-into-view.
    pub fn selected_program_span(&self, layout: &viewport::GridLayout) -> Option<viewport::CellSpan> {
        let program = self.selected_program()?;
        layout.program_span(program.start, program.end, self.geometry.slot_width)
    }

    pub fn now_playing_index(&self) -> Option<usize> {
        self.schedule_programs()
            .iter()
            .position(|p| status::classify(p, self.status_now) == ProgramStatus::Now)
    }

    pub fn nav_context(&self) -> NavContext {
        NavContext {
            channel_count: self.channels.len(),
            schedule_count: self.schedule_programs().len(),
            now_playing_index: self.now_playing_index(),
        }
    }

    pub fn drain_signals(&mut self) -> Vec<ShellSignal> {
        std::mem::take(&mut self.signals)
    }

    /// Imperative focus hook for the shell (e.g. after a route change).
    pub fn focus_panel(&mut self, panel: PanelId) {
        self.nav.active_panel = panel;
        let ctx = self.nav_context();
        if panel == PanelId::Channels && self.nav.channel_cursor.is_none() && ctx.channel_count > 0 {
            self.nav.channel_cursor = Some(0);
        }
        if panel == PanelId::Schedule && self.nav.schedule_cursor.is_none() && ctx.schedule_count > 0 {
            self.nav.schedule_cursor = Some(ctx.now_playing_index.unwrap_or(0));
        }
    }

    // -- window changes ------------------------------------------------------

    /// Replaces the window wholesale and re-fetches. Supersedes any fetch
    /// started under the previous window.
    pub fn set_window(&mut self, window: TimeWindow, tx: &mpsc::Sender<AsyncAction>) {
        self.window = window;
        self.col_scroll = 0;
        self.nav.schedule_cursor = None;
        self.signals.push(ShellSignal::WindowChanged(window));
        self.request_guide(tx);
    }

    pub fn select_day(&mut self, option: DayOption, tx: &mpsc::Sender<AsyncAction>) {
        info!(day = %option.id, "day selected");
        self.selected_day = option.clone();
        self.set_window(option.window, tx);
    }

    /// Steps the day bar. Earlier than today is refused by the engine.
    pub fn step_day(&mut self, delta: i64, now: DateTime<Utc>, tx: &mpsc::Sender<AsyncAction>) {
        if let Some(option) = self.day_options.step(&self.selected_day, delta, now, self.tz) {
            self.select_day(option, tx);
        }
    }

    /// Shifts the current window by whole days, floored at today.
    pub fn shift_window_days(&mut self, n: i64, now: DateTime<Utc>, tx: &mpsc::Sender<AsyncAction>) {
        let shifted = timewin::shift_by_days(self.window, n);
        let today = now.with_timezone(&self.tz).date_naive();
        if shifted.start.with_timezone(&self.tz).date_naive() < today {
            return;
        }
        self.set_window(shifted, tx);
    }

    // -- fetches -------------------------------------------------------------

    pub fn request_guide(&mut self, tx: &mpsc::Sender<AsyncAction>) {
        self.guide_generation += 1;
        let generation = self.guide_generation;
        if let Some(handle) = self.guide_abort.take() {
            handle.abort();
        }
        self.guide_state = LoadState::Loading;
        let backend = Arc::clone(&self.backend);
        let tx = tx.clone();
        let start = api::format_instant(self.window.start);
        let end = api::format_instant(self.window.end);
        debug!(%start, %end, generation, "guide fetch");
        let handle = tokio::spawn(async move {
            match backend.fetch_channels_with_programs(start, end).await {
                Ok(channels) => {
                    let _ = tx.send(AsyncAction::GuideLoaded { generation, channels }).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(AsyncAction::GuideFailed { generation, message: e.to_string() })
                        .await;
                }
            }
        });
        self.guide_abort = Some(handle.abort_handle());
    }

    pub fn request_search(&mut self, generation: u64, query: String, tx: &mpsc::Sender<AsyncAction>) {
        if let Some(handle) = self.search_abort.take() {
            handle.abort();
        }
        let backend = Arc::clone(&self.backend);
        let tx = tx.clone();
        debug!(%query, generation, "search fetch");
        let handle = tokio::spawn(async move {
            match backend.search_programs(query).await {
                Ok(results) => {
                    let _ = tx.send(AsyncAction::SearchLoaded { generation, results }).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(AsyncAction::SearchFailed { generation, message: e.to_string() })
                        .await;
                }
            }
        });
        self.search_abort = Some(handle.abort_handle());
    }

    pub fn request_detail(&mut self, id: ProgramId, tx: &mpsc::Sender<AsyncAction>) {
        self.detail_generation += 1;
        let generation = self.detail_generation;
        if let Some(handle) = self.detail_abort.take() {
            handle.abort();
        }
        self.detail_state = LoadState::Loading;
        let backend = Arc::clone(&self.backend);
        let tx = tx.clone();
        let handle = tokio::spawn(async move {
            match backend.fetch_program_by_id(id).await {
                Ok(detail) => {
                    let _ = tx.send(AsyncAction::DetailLoaded { generation, detail }).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(AsyncAction::DetailFailed { generation, message: e.to_string() })
                        .await;
                }
            }
        });
        self.detail_abort = Some(handle.abort_handle());
    }

    pub fn close_detail(&mut self) {
        if let Some(handle) = self.detail_abort.take() {
            handle.abort();
        }
        self.detail = None;
        self.detail_state = LoadState::Idle;
    }

    // -- navigation ----------------------------------------------------------

    pub fn handle_nav(&mut self, event: NavEvent, tx: &mpsc::Sender<AsyncAction>) {
        let ctx = self.nav_context();
        let old_channel = self.nav.channel_cursor;
        let (next, effect) = nav::transition(&self.nav, event, &ctx);
        self.nav = next;
        if self.nav.channel_cursor != old_channel {
            // different channel, different schedule list
            self.nav.schedule_cursor = None;
            if self.nav.active_panel == PanelId::Schedule {
                let ctx = self.nav_context();
                self.nav.schedule_cursor = ctx.now_playing_index.or(if ctx.schedule_count > 0 {
                    Some(0)
                } else {
                    None
                });
            }
        }
        match effect {
            Some(NavEffect::ProgramActivated(index)) => {
                let id = self
                    .schedule_programs()
                    .get(index)
                    .map(|p| p.program_id.clone());
                if let Some(id) = id {
                    self.signals.push(ShellSignal::ProgramActivated(id.clone()));
                    self.request_detail(id, tx);
                }
            }
            Some(NavEffect::DetailsClosed) => self.close_detail(),
            _ => {}
        }
    }

    pub fn open_date_picker(&mut self, now: DateTime<Utc>) {
        self.date_grid = Some(DateGrid::new(now.with_timezone(&self.tz).date_naive()));
        self.nav = nav::open_overlay(&self.nav, OverlayKind::DatePicker);
    }

    /// Applies the date under the picker cursor and closes the overlay.
    pub fn pick_date(&mut self, now: DateTime<Utc>, tx: &mpsc::Sender<AsyncAction>) {
        let Some(grid) = self.date_grid.take() else {
            return;
        };
        let (next, _opener) = nav::close_overlay(&self.nav);
        self.nav = next;
        let option = match self.day_options.find_for_date(grid.cursor) {
            Some(index) => Some(self.day_options.options[index].clone()),
            None => days::synthesize_option(grid.cursor, now, self.tz),
        };
        if let Some(option) = option {
            self.select_day(option, tx);
        }
    }

    pub fn close_overlay(&mut self) {
        let (next, _opener) = nav::close_overlay(&self.nav);
        self.nav = next;
        self.date_grid = None;
    }

    // -- periodic work -------------------------------------------------------

    /// Runs due scheduler tasks and the search debounce. Called from the
    /// event loop on every poll timeout.
    pub fn tick(&mut self, now_instant: Instant, now: DateTime<Utc>, tx: &mpsc::Sender<AsyncAction>) {
        for task in self.scheduler.due(now_instant) {
            match task {
                scheduler::STATUS_RECLASSIFY => self.status_now = now,
                scheduler::GUIDE_REFRESH => self.request_guide(tx),
                scheduler::DAY_ROLLOVER => {
                    if self.day_options.needs_recompute(now, self.tz) {
                        info!("calendar day rolled over, recomputing day options");
                        self.day_options = days::compute_day_options(now, self.tz);
                        let today = self.day_options.today().clone();
                        self.select_day(today, tx);
                    }
                }
                _ => {}
            }
        }
        if let Some((generation, query)) = self.search.poll_due(now_instant) {
            self.request_search(generation, query, tx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::JsonFileBackend;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 22, 12, 0, 0).unwrap()
    }

    fn app() -> App {
        let now = fixed_now();
        App::new(
            AppConfig {
                timezone: Some("UTC".to_string()),
                ..AppConfig::default()
            },
            Arc::new(JsonFileBackend::sample(now)),
            now,
        )
    }

    #[test]
    fn starts_on_today_with_an_idle_guide() {
        let app = app();
        assert_eq!(app.selected_day.id, days::TODAY_ID);
        assert_eq!(app.window, app.day_options.today().window);
        assert_eq!(app.guide_state, LoadState::Idle);
        assert!(app.scheduler.is_running(scheduler::DAY_ROLLOVER));
    }

    #[tokio::test]
    async fn window_change_emits_a_shell_signal_and_supersedes() {
        let mut app = app();
        let (tx, _rx) = mpsc::channel(8);
        let before = app.guide_generation;
        let window = timewin::window_centered_on(fixed_now(), 3);
        app.set_window(window, &tx);
        assert_eq!(app.guide_generation, before + 1);
        assert_eq!(app.drain_signals(), vec![ShellSignal::WindowChanged(window)]);
        assert!(app.guide_state.is_loading());
    }

    #[tokio::test]
    async fn day_step_floors_at_today() {
        let mut app = app();
        let (tx, _rx) = mpsc::channel(8);
        app.step_day(-1, fixed_now(), &tx);
        assert_eq!(app.selected_day.id, days::TODAY_ID);
        app.step_day(1, fixed_now(), &tx);
        assert_eq!(app.selected_day.id, days::TONIGHT_ID);
    }

    #[test]
    fn focus_panel_hook_applies_defaults() {
        let mut app = app();
        app.channels = vec![Channel {
            channel_id: "c1".into(),
            display_name: "One".into(),
            icon_ref: None,
            display_order: 0,
            programs: vec![],
        }];
        app.focus_panel(PanelId::Channels);
        assert_eq!(app.nav.active_panel, PanelId::Channels);
        assert_eq!(app.nav.channel_cursor, Some(0));
    }
}
