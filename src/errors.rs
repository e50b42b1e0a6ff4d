use thiserror::Error;

/// Errors produced by guide data fetches.
#[derive(Debug, Error, Clone)]
pub enum FetchError {
    /// Backend call failed (network, backend fault, bad response)
    #[error("fetch failed: {0}")]
    Failed(String),

    /// Response could not be decoded into guide data
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Fetch was superseded by a newer request for the same resource.
    /// Never surfaced to the user.
    #[error("fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// Whether this error should be shown inline. Cancellations are
    /// discarded silently.
    pub fn is_visible(&self) -> bool {
        !matches!(self, FetchError::Cancelled)
    }
}

/// Load lifecycle of a panel's data. Empty results are an explicit state,
/// distinct from both loading and error.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Empty,
    /// Inline, dismissible error message scoped to the panel that issued
    /// the fetch. Retried only on explicit user refresh.
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_never_visible() {
        assert!(!FetchError::Cancelled.is_visible());
        assert!(FetchError::Failed("boom".into()).is_visible());
    }

    #[test]
    fn load_state_error_accessor() {
        assert_eq!(LoadState::Failed("x".into()).error(), Some("x"));
        assert_eq!(LoadState::Empty.error(), None);
    }
}
