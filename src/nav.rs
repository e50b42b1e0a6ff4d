//! Spatial focus navigation between the four guide panels. Transitions are
//! a pure function `(state, event, ctx) -> (state, effect)` consulted
//! centrally, so every boundary crossing lives in one table instead of
//! per-panel key handling.

use chrono::{Duration, NaiveDate};

/// The four independently scrolling focus regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelId {
    Header,
    Channels,
    Schedule,
    Details,
}

/// Directional/activation input after key decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Up,
    Down,
    Left,
    Right,
    Activate,
    Back,
}

/// A transient overlay that captures directional input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    SearchResults,
    DatePicker,
}

/// Side effects a transition asks the caller to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEffect {
    /// The program at this schedule index was activated (open details)
    ProgramActivated(usize),
    /// The details panel was closed
    DetailsClosed,
    /// Focus crossed into this panel
    EnteredPanel(PanelId),
}

/// The complete navigation state. One value, replaced on every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    pub active_panel: PanelId,
    pub channel_cursor: Option<usize>,
    pub schedule_cursor: Option<usize>,
    /// The details panel stays open when focus moves back to the schedule;
    /// while open, Up at the top of the schedule is swallowed.
    pub details_open: bool,
    pub overlay: Option<OverlayKind>,
    /// Panel that opened the overlay; focus returns here on close
    pub overlay_opener: Option<PanelId>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            active_panel: PanelId::Channels,
            channel_cursor: None,
            schedule_cursor: None,
            details_open: false,
            overlay: None,
            overlay_opener: None,
        }
    }
}

impl NavigationState {
    /// While true the top-level machine must not interpret directional
    /// keys; they belong to the overlay's own grid.
    pub fn overlay_capturing(&self) -> bool {
        self.overlay.is_some()
    }
}

/// Read-only facts the transition needs about the surrounding data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavContext {
    pub channel_count: usize,
    pub schedule_count: usize,
    /// Index of the currently airing program in the schedule list, used as
    /// the auto-selection when entering the schedule with no prior cursor
    pub now_playing_index: Option<usize>,
}

fn enter_channels(state: &mut NavigationState, ctx: &NavContext) {
    state.active_panel = PanelId::Channels;
    if state.channel_cursor.is_none() && ctx.channel_count > 0 {
        state.channel_cursor = Some(0);
    }
}

fn enter_schedule(state: &mut NavigationState, ctx: &NavContext) {
    state.active_panel = PanelId::Schedule;
    if state.schedule_cursor.is_none() && ctx.schedule_count > 0 {
        state.schedule_cursor = Some(ctx.now_playing_index.unwrap_or(0));
    }
}

/// Bounded cursor walk, no wraparound. Returns the new cursor.
fn step_cursor(cursor: Option<usize>, delta: i64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    match cursor {
        None => Some(0),
        Some(index) => {
            let next = (index as i64 + delta).clamp(0, count as i64 - 1);
            Some(next as usize)
        }
    }
}

/// The transition table. Must not be consulted while an overlay captures
/// input; callers route to the overlay first and only hand control back
/// through [`close_overlay`].
pub fn transition(
    state: &NavigationState,
    event: NavEvent,
    ctx: &NavContext,
) -> (NavigationState, Option<NavEffect>) {
    debug_assert!(!state.overlay_capturing());
    let mut next = state.clone();
    let mut effect = None;

    match state.active_panel {
        PanelId::Header => match event {
            NavEvent::Down => {
                enter_channels(&mut next, ctx);
                effect = Some(NavEffect::EnteredPanel(PanelId::Channels));
            }
            _ => {}
        },
        PanelId::Channels => match event {
            NavEvent::Up => match state.channel_cursor {
                Some(0) | None => {
                    next.active_panel = PanelId::Header;
                    effect = Some(NavEffect::EnteredPanel(PanelId::Header));
                }
                Some(index) => next.channel_cursor = Some(index - 1),
            },
            NavEvent::Down => {
                next.channel_cursor = step_cursor(state.channel_cursor, 1, ctx.channel_count);
            }
            NavEvent::Right | NavEvent::Activate => {
                enter_schedule(&mut next, ctx);
                effect = Some(NavEffect::EnteredPanel(PanelId::Schedule));
            }
            NavEvent::Left => {
                if state.details_open {
                    next.details_open = false;
                    effect = Some(NavEffect::DetailsClosed);
                }
            }
            NavEvent::Back => {}
        },
        PanelId::Schedule => match event {
            NavEvent::Up => match state.schedule_cursor {
                Some(0) | None => {
                    // swallowed while details is open; close it first
                    if !state.details_open {
                        next.active_panel = PanelId::Header;
                        effect = Some(NavEffect::EnteredPanel(PanelId::Header));
                    }
                }
                Some(index) => next.schedule_cursor = Some(index - 1),
            },
            NavEvent::Down => {
                next.schedule_cursor = step_cursor(state.schedule_cursor, 1, ctx.schedule_count);
            }
            NavEvent::Left => {
                enter_channels(&mut next, ctx);
                effect = Some(NavEffect::EnteredPanel(PanelId::Channels));
            }
            NavEvent::Right | NavEvent::Activate => {
                if let Some(index) = state.schedule_cursor {
                    next.active_panel = PanelId::Details;
                    next.details_open = true;
                    effect = Some(NavEffect::ProgramActivated(index));
                }
            }
            NavEvent::Back => {
                if state.details_open {
                    next.details_open = false;
                    effect = Some(NavEffect::DetailsClosed);
                }
            }
        },
        PanelId::Details => match event {
            NavEvent::Left => {
                // focus returns to the schedule, the panel stays open
                next.active_panel = PanelId::Schedule;
                effect = Some(NavEffect::EnteredPanel(PanelId::Schedule));
            }
            NavEvent::Back => {
                next.active_panel = PanelId::Schedule;
                next.details_open = false;
                effect = Some(NavEffect::DetailsClosed);
            }
            _ => {}
        },
    }

    (next, effect)
}

/// Puts an overlay in charge of directional input.
pub fn open_overlay(state: &NavigationState, kind: OverlayKind) -> NavigationState {
    let mut next = state.clone();
    next.overlay = Some(kind);
    next.overlay_opener = Some(state.active_panel);
    next
}

/// Closes the overlay and returns focus to the panel that opened it.
pub fn close_overlay(state: &NavigationState) -> (NavigationState, PanelId) {
    let mut next = state.clone();
    let opener = next.overlay_opener.take().unwrap_or(PanelId::Header);
    next.overlay = None;
    next.active_panel = opener;
    (next, opener)
}

// ---------------------------------------------------------------------------
// Date-picker overlay grid
// ---------------------------------------------------------------------------

/// Days per picker page.
pub const DATE_GRID_DAYS: i64 = 35;
pub const DATE_GRID_COLUMNS: usize = 7;

/// 2-D cursor over a 35-day page anchored at today. Left/right move one
/// day, up/down move a week, all clamped to the grid bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateGrid {
    pub origin: NaiveDate,
    pub cursor: NaiveDate,
}

impl DateGrid {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            origin: today,
            cursor: today,
        }
    }

    pub fn last_day(&self) -> NaiveDate {
        self.origin + Duration::days(DATE_GRID_DAYS - 1)
    }

    fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.max(self.origin).min(self.last_day())
    }

    pub fn handle(&mut self, event: NavEvent) {
        let delta = match event {
            NavEvent::Left => -1,
            NavEvent::Right => 1,
            NavEvent::Up => -(DATE_GRID_COLUMNS as i64),
            NavEvent::Down => DATE_GRID_COLUMNS as i64,
            _ => return,
        };
        self.cursor = self.clamp(self.cursor + Duration::days(delta));
    }

    /// Row/column of the cursor within the page, for rendering.
    pub fn cursor_cell(&self) -> (usize, usize) {
        let offset = (self.cursor - self.origin).num_days() as usize;
        (offset / DATE_GRID_COLUMNS, offset % DATE_GRID_COLUMNS)
    }
}
