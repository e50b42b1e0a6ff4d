//! Dual-axis windowing for the guide grid. Rows (channels) and columns
//! (30-minute slots) are virtualized independently: each axis computes the
//! index range intersecting the visible rectangle, expanded by overscan,
//! and nothing outside that range is rendered. All arithmetic is pure and
//! independent of the rendering layer.

use std::ops::Range;

use chrono::{DateTime, Duration, Utc};

use crate::api::Channel;
use crate::timewin::{self, TimeWindow, SLOT_MINUTES};

/// Cell geometry for grid layout. Units are terminal cells.
#[derive(Debug, Clone, Copy)]
pub struct GridGeometry {
    /// Height of one channel row
    pub row_height: u16,
    /// Width of one 30-minute slot
    pub slot_width: u16,
    /// Width of the channel-label column
    pub label_width: u16,
    /// Extra rows/columns kept rendered beyond the viewport on each side
    pub overscan: usize,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            row_height: 1,
            slot_width: 14,
            label_width: 22,
            overscan: 5,
        }
    }
}

/// Contiguous index window along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSlice {
    pub first: usize,
    pub len: usize,
}

impl AxisSlice {
    pub const EMPTY: AxisSlice = AxisSlice { first: 0, len: 0 };

    pub fn range(&self) -> Range<usize> {
        self.first..self.first + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Index range of items intersecting `[scroll, scroll + viewport)` on one
/// axis, expanded by `overscan` on both sides and clamped to the data.
pub fn axis_slice(scroll: u32, viewport: u32, item_size: u32, total: usize, overscan: usize) -> AxisSlice {
    if total == 0 || item_size == 0 || viewport == 0 {
        return AxisSlice::EMPTY;
    }
    let first_visible = (scroll / item_size) as usize;
    if first_visible >= total {
        return AxisSlice::EMPTY;
    }
    let last_visible = (((scroll + viewport - 1) / item_size) as usize).min(total - 1);
    let first = first_visible.saturating_sub(overscan);
    let last = (last_visible + overscan).min(total - 1);
    AxisSlice {
        first,
        len: last - first + 1,
    }
}

/// Largest scroll offset that still keeps the viewport full (0 when the
/// content fits).
pub fn max_scroll(total: usize, item_size: u32, viewport: u32) -> u32 {
    (total as u32).saturating_mul(item_size).saturating_sub(viewport)
}

/// Adjusts a scroll offset so the item at `index` is fully inside the
/// viewport, moving the minimum distance.
pub fn scroll_into_view(index: usize, item_size: u32, scroll: u32, viewport: u32) -> u32 {
    let top = index as u32 * item_size;
    let bottom = top + item_size;
    if top < scroll {
        top
    } else if bottom > scroll.saturating_add(viewport) {
        bottom.saturating_sub(viewport)
    } else {
        scroll
    }
}

/// Horizontal extent of one program cell on the time axis, in cells from
/// the grid origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub x: u32,
    pub width: u32,
}

/// Grid layout for the active window. Column zero starts at the snapped
/// window start so slot boundaries always land on :00/:30.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub snapped_start: DateTime<Utc>,
    pub slot_count: usize,
}

/// Layout result; an empty channel/program set short-circuits to `Empty`
/// before any slot geometry is computed.
#[derive(Debug, Clone, PartialEq)]
pub enum GuideLayout {
    Empty,
    Ready(GridLayout),
}

impl GridLayout {
    /// `slot_count = ceil(window_duration / 30min)`, columns anchored at
    /// the snapped start.
    pub fn compute(window: TimeWindow) -> Self {
        let minutes = (window.end - window.start).num_minutes().max(1);
        let slot_count = (minutes as usize).div_ceil(SLOT_MINUTES as usize);
        Self {
            snapped_start: timewin::snap_to_half_hour_floor(window.start),
            slot_count,
        }
    }

    /// Start instant of slot `index`.
    pub fn slot_time(&self, index: usize) -> DateTime<Utc> {
        self.snapped_start + Duration::minutes(SLOT_MINUTES * index as i64)
    }

    /// End of the laid-out grid on the time axis.
    pub fn grid_end(&self) -> DateTime<Utc> {
        self.slot_time(self.slot_count)
    }

    /// Total grid width in cells.
    pub fn width_cells(&self, slot_width: u16) -> u32 {
        self.slot_count as u32 * slot_width as u32
    }

    /// Horizontal span of one program. Programs straddling the left edge
    /// are clipped to it; programs outside the grid yield `None`. Every
    /// rendered program is at least one slot wide.
    pub fn program_span(&self, start: DateTime<Utc>, end: DateTime<Utc>, slot_width: u16) -> Option<CellSpan> {
        let grid_minutes = self.slot_count as i64 * SLOT_MINUTES;
        let start_min = (start - self.snapped_start).num_minutes();
        let end_min = (end - self.snapped_start).num_minutes().min(grid_minutes);
        if end_min <= 0 || start_min >= grid_minutes {
            return None;
        }
        let clipped_start = start_min.max(0);
        let x = (clipped_start * slot_width as i64 / SLOT_MINUTES) as u32;
        let span_minutes = end_min - clipped_start;
        let width = (span_minutes * slot_width as i64 / SLOT_MINUTES).max(slot_width as i64) as u32;
        Some(CellSpan { x, width })
    }

    /// Grid-cell x position of the NOW marker, if `now` falls inside the
    /// laid-out grid.
    pub fn now_marker_x(&self, now: DateTime<Utc>, slot_width: u16) -> Option<u32> {
        let minutes = (now - self.snapped_start).num_minutes();
        if minutes < 0 || minutes >= self.slot_count as i64 * SLOT_MINUTES {
            return None;
        }
        Some((minutes * slot_width as i64 / SLOT_MINUTES) as u32)
    }
}

/// Computes the layout for the window, or `Empty` when there is nothing to
/// lay out.
pub fn compute_layout(window: TimeWindow, channels: &[Channel]) -> GuideLayout {
    if channels.is_empty() || channels.iter().all(|c| c.programs.is_empty()) {
        return GuideLayout::Empty;
    }
    GuideLayout::Ready(GridLayout::compute(window))
}

/// The two independent axis slices for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportWindow {
    pub rows: AxisSlice,
    pub cols: AxisSlice,
}

/// Windows both axes for the given scroll offsets and viewport extent.
pub fn visible_window(
    layout: &GridLayout,
    geometry: &GridGeometry,
    channel_count: usize,
    row_scroll: u32,
    col_scroll: u32,
    viewport_height: u16,
    viewport_width: u16,
) -> ViewportWindow {
    ViewportWindow {
        rows: axis_slice(
            row_scroll,
            viewport_height as u32,
            geometry.row_height as u32,
            channel_count,
            geometry.overscan,
        ),
        cols: axis_slice(
            col_scroll,
            viewport_width as u32,
            geometry.slot_width as u32,
            layout.slot_count,
            geometry.overscan,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Program;
    use chrono::TimeZone;

    fn at(h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 22, h, mi, 0).unwrap()
    }

    fn layout_for(start: DateTime<Utc>, end: DateTime<Utc>) -> GridLayout {
        GridLayout::compute(TimeWindow::new(start, end))
    }

    #[test]
    fn snapped_grid_example() {
        // window [18:05, 21:05) -> snapped grid starts 18:00, 6 slots up to 21:00
        let layout = layout_for(at(18, 5), at(21, 5));
        assert_eq!(layout.snapped_start, at(18, 0));
        assert_eq!(layout.slot_count, 6);
        assert_eq!(layout.grid_end(), at(21, 0));
        assert_eq!(layout.slot_time(1), at(18, 30));
    }

    #[test]
    fn axis_slice_matches_overscan_example() {
        // 500 channels, row 64, viewport 640, overscan 5 -> 20 rows, never 500
        let slice = axis_slice(640, 640, 64, 500, 5);
        assert_eq!(slice.len, 20);
        assert_eq!(slice.first, 5);

        let top = axis_slice(0, 640, 64, 500, 5);
        assert_eq!(top.first, 0);
        assert_eq!(top.len, 15);
    }

    #[test]
    fn axis_slice_never_exceeds_total_plus_overscan() {
        for scroll in (0..5000).step_by(37) {
            for total in [0usize, 1, 9, 100, 500] {
                let slice = axis_slice(scroll, 640, 64, total, 5);
                assert!(slice.len <= total + 2 * 5);
                assert!(slice.first + slice.len <= total.max(1));
            }
        }
    }

    #[test]
    fn axis_slice_is_empty_for_degenerate_inputs() {
        assert!(axis_slice(0, 640, 64, 0, 5).is_empty());
        assert!(axis_slice(0, 0, 64, 10, 5).is_empty());
        assert!(axis_slice(0, 640, 0, 10, 5).is_empty());
        // scrolled past the end of the data
        assert!(axis_slice(10_000, 640, 64, 10, 5).is_empty());
    }

    #[test]
    fn program_span_offsets_and_minimum_width() {
        let layout = layout_for(at(18, 0), at(21, 0));
        let span = layout.program_span(at(18, 0), at(18, 30), 14).unwrap();
        assert_eq!(span, CellSpan { x: 0, width: 14 });

        let span = layout.program_span(at(19, 0), at(20, 30), 14).unwrap();
        assert_eq!(span, CellSpan { x: 28, width: 42 });

        // 10-minute program still occupies one full slot width
        let span = layout.program_span(at(18, 0), at(18, 10), 14).unwrap();
        assert_eq!(span.width, 14);
    }

    #[test]
    fn program_span_clips_to_the_window() {
        let layout = layout_for(at(18, 0), at(21, 0));
        // straddles the left edge: clipped to x = 0
        let span = layout.program_span(at(17, 30), at(18, 30), 14).unwrap();
        assert_eq!(span, CellSpan { x: 0, width: 14 });

        // overhangs the right edge: width stops at the grid end
        let span = layout.program_span(at(20, 30), at(22, 0), 14).unwrap();
        assert_eq!(span, CellSpan { x: 70, width: 14 });

        // entirely outside
        assert!(layout.program_span(at(16, 0), at(18, 0), 14).is_none());
        assert!(layout.program_span(at(21, 0), at(22, 0), 14).is_none());
    }

    #[test]
    fn empty_input_short_circuits_before_geometry() {
        let window = TimeWindow::new(at(18, 0), at(21, 0));
        assert_eq!(compute_layout(window, &[]), GuideLayout::Empty);

        let bare_channel = Channel {
            channel_id: "c1".into(),
            display_name: "One".into(),
            icon_ref: None,
            display_order: 0,
            programs: vec![],
        };
        assert_eq!(compute_layout(window, &[bare_channel.clone()]), GuideLayout::Empty);

        let with_program = Channel {
            programs: vec![Program {
                program_id: "p".into(),
                channel_id: "c1".into(),
                title: "t".into(),
                category: None,
                description: None,
                start: at(18, 0),
                end: at(19, 0),
            }],
            ..bare_channel
        };
        assert!(matches!(
            compute_layout(window, &[with_program]),
            GuideLayout::Ready(_)
        ));
    }

    #[test]
    fn now_marker_tracks_the_clock() {
        let layout = layout_for(at(18, 0), at(21, 0));
        assert_eq!(layout.now_marker_x(at(18, 0), 14), Some(0));
        assert_eq!(layout.now_marker_x(at(19, 30), 14), Some(42));
        assert_eq!(layout.now_marker_x(at(17, 59), 14), None);
        assert_eq!(layout.now_marker_x(at(21, 0), 14), None);
    }

    #[test]
    fn scroll_into_view_moves_minimally() {
        // item above the viewport
        assert_eq!(scroll_into_view(2, 10, 50, 40), 20);
        // item below the viewport
        assert_eq!(scroll_into_view(12, 10, 50, 40), 90);
        // already visible
        assert_eq!(scroll_into_view(6, 10, 50, 40), 50);
    }

    #[test]
    fn axes_are_windowed_independently() {
        let layout = layout_for(at(0, 0), at(23, 59));
        let geometry = GridGeometry::default();
        let w = visible_window(&layout, &geometry, 200, 30, 140, 20, 70);
        // moving one axis leaves the other slice untouched
        let w2 = visible_window(&layout, &geometry, 200, 90, 140, 20, 70);
        assert_eq!(w.cols, w2.cols);
        assert_ne!(w.rows, w2.rows);
    }
}
