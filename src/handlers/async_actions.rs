//! Applies completed async work to the app. Every action carries the
//! generation it was started under; anything stale is discarded here and
//! never touches state.

use tracing::debug;

use crate::api;
use crate::app::{App, AsyncAction};
use crate::errors::LoadState;
use crate::nav::{self, OverlayKind, PanelId};

pub fn handle_async_action(app: &mut App, action: AsyncAction) {
    match action {
        AsyncAction::GuideLoaded { generation, channels } => {
            if generation != app.guide_generation {
                debug!(generation, "discarding superseded guide fetch");
                return;
            }
            let channels = api::channels_from_dtos(channels);
            app.guide_state = if channels.iter().all(|c| c.programs.is_empty()) {
                LoadState::Empty
            } else {
                LoadState::Ready
            };
            app.channels = channels;
            clamp_cursors(app);
            apply_pending_target(app);
        }
        AsyncAction::GuideFailed { generation, message } => {
            if generation != app.guide_generation {
                debug!(generation, "discarding superseded guide failure");
                return;
            }
            app.guide_state = LoadState::Failed(message);
        }
        AsyncAction::SearchLoaded { generation, results } => {
            let hits = results.iter().filter_map(api::search_hit_from_dto).collect::<Vec<_>>();
            if !app.search.accept_results(generation, hits) {
                return;
            }
            if app.search.results.is_empty() {
                // explicit empty state rendered inline, no overlay to walk
                if app.nav.overlay == Some(OverlayKind::SearchResults) {
                    app.close_overlay();
                }
            } else if app.nav.overlay.is_none() {
                app.nav = nav::open_overlay(&app.nav, OverlayKind::SearchResults);
            }
        }
        AsyncAction::SearchFailed { generation, message } => {
            if !app.search.accept_error(generation, message) {
                return;
            }
            if app.nav.overlay == Some(OverlayKind::SearchResults) {
                app.close_overlay();
            }
        }
        AsyncAction::DetailLoaded { generation, detail } => {
            if generation != app.detail_generation {
                debug!(generation, "discarding superseded detail fetch");
                return;
            }
            match api::detail_from_dto(&detail) {
                Some(detail) => {
                    app.detail = Some(detail);
                    app.detail_state = LoadState::Ready;
                }
                None => {
                    app.detail_state = LoadState::Failed("malformed program record".to_string());
                }
            }
        }
        AsyncAction::DetailFailed { generation, message } => {
            if generation != app.detail_generation {
                return;
            }
            app.detail_state = LoadState::Failed(message);
        }
    }
}

/// Keeps cursors valid against the freshly replaced channel set.
fn clamp_cursors(app: &mut App) {
    match app.nav.channel_cursor {
        Some(index) if index >= app.channels.len() => {
            app.nav.channel_cursor = app.channels.len().checked_sub(1);
        }
        None if !app.channels.is_empty() => {
            app.nav.channel_cursor = Some(0);
        }
        _ => {}
    }
    let schedule_len = app.schedule_programs().len();
    match app.nav.schedule_cursor {
        Some(index) if index >= schedule_len => {
            app.nav.schedule_cursor = schedule_len.checked_sub(1);
        }
        None if app.nav.active_panel == PanelId::Schedule && schedule_len > 0 => {
            app.nav.schedule_cursor = Some(app.now_playing_index().unwrap_or(0));
        }
        _ => {}
    }
}

/// Focuses the channel/program a search selection asked for, once the
/// fetch for its window has landed.
fn apply_pending_target(app: &mut App) {
    let Some((channel_id, program_id)) = app.pending_target.take() else {
        return;
    };
    let Some(channel_index) = app.channels.iter().position(|c| c.channel_id == channel_id) else {
        return;
    };
    app.nav.channel_cursor = Some(channel_index);
    let program_index = app.channels[channel_index]
        .programs
        .iter()
        .position(|p| p.program_id == program_id);
    app.nav.schedule_cursor = program_index.or(Some(0));
    app.focus_panel(PanelId::Schedule);
}
