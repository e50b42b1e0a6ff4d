//! Debounced search state. The controller owns query text and results but
//! never touches navigation state; selecting a result hands the derived
//! window and target identity back to the caller.

use std::time::{Duration, Instant};

use tui_input::Input;

use crate::api::{ChannelId, ProgramId, SearchHit};
use crate::timewin::{self, TimeWindow, DEFAULT_SPAN_HOURS};

pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// What a result selection resolves to: a window centered on the program
/// plus the identity to focus once the guide has re-fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSelection {
    pub window: TimeWindow,
    pub channel_id: ChannelId,
    pub program_id: ProgramId,
}

#[derive(Default)]
pub struct SearchController {
    pub input: Input,
    pub results: Vec<SearchHit>,
    pub cursor: usize,
    pub in_flight: bool,
    pub error: Option<String>,
    /// Query text of the last fetch that actually fired
    last_fired: Option<String>,
    deadline: Option<Instant>,
    generation: u64,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        self.input.value()
    }

    /// Arms (or re-arms) the debounce deadline after an edit. A newer
    /// keystroke supersedes the pending one: last write wins.
    pub fn note_input(&mut self, now: Instant) {
        self.deadline = Some(now + DEBOUNCE);
    }

    /// Fires the pending query once its deadline has passed. An empty
    /// query clears results instead of searching. Returns the generation
    /// to stamp on the fetch plus the query text.
    pub fn poll_due(&mut self, now: Instant) -> Option<(u64, String)> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        let query = self.query().trim().to_string();
        self.generation += 1;
        if query.is_empty() {
            self.results.clear();
            self.cursor = 0;
            self.in_flight = false;
            self.error = None;
            self.last_fired = None;
            return None;
        }
        self.in_flight = true;
        self.error = None;
        self.last_fired = Some(query.clone());
        Some((self.generation, query))
    }

    /// Explicit empty state: the last fired query completed with no hits.
    pub fn no_matches(&self) -> bool {
        !self.in_flight
            && self.error.is_none()
            && self.results.is_empty()
            && self
                .last_fired
                .as_deref()
                .is_some_and(|q| q == self.query().trim())
    }

    /// Accepts results for a generation; stale generations are discarded.
    pub fn accept_results(&mut self, generation: u64, results: Vec<SearchHit>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.in_flight = false;
        self.results = results;
        self.cursor = 0;
        true
    }

    pub fn accept_error(&mut self, generation: u64, message: String) -> bool {
        if generation != self.generation {
            return false;
        }
        self.in_flight = false;
        self.results.clear();
        self.cursor = 0;
        self.error = Some(message);
        true
    }

    /// Whether the results dropdown should be showing.
    pub fn dropdown_open(&self) -> bool {
        !self.results.is_empty() || self.in_flight || self.error.is_some()
    }

    pub fn move_cursor(&mut self, delta: i64) {
        if self.results.is_empty() {
            return;
        }
        let last = self.results.len() - 1;
        let next = self.cursor as i64 + delta;
        self.cursor = next.clamp(0, last as i64) as usize;
    }

    /// Resolves the result under `index` into a centered window and target
    /// identity, then clears query and results.
    pub fn take_selection(&mut self, index: usize) -> Option<SearchSelection> {
        let hit = self.results.get(index)?;
        let selection = SearchSelection {
            window: timewin::window_centered_on(hit.start, DEFAULT_SPAN_HOURS),
            channel_id: hit.channel_id.clone(),
            program_id: hit.program_id.clone(),
        };
        self.clear();
        Some(selection)
    }

    /// Resets query, results, and error atomically. Bumps the generation
    /// so any in-flight fetch lands stale.
    pub fn clear(&mut self) {
        self.input.reset();
        self.results.clear();
        self.cursor = 0;
        self.in_flight = false;
        self.error = None;
        self.last_fired = None;
        self.deadline = None;
        self.generation += 1;
    }
}
