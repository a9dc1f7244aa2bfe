//! Planning error types.
//!
//! None of these are fatal. They describe why an operation produced a
//! degraded or empty result, or why an edit was rejected, so callers can
//! log and carry on.

use super::stop::StopId;

/// Non-fatal outcomes of route planning and suggestion search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanningError {
    /// Origin or destination is missing
    #[error("route is incomplete: origin and destination are both required")]
    IncompleteRoute,

    /// Live provider failed or is absent
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// An async result arrived after a newer request superseded it
    #[error("stale response discarded (generation {issued}, current {current})")]
    StaleResponseDiscarded { issued: u64, current: u64 },

    /// Query is below the minimum length
    #[error("query must be at least {min_chars} characters")]
    InvalidQuery { min_chars: usize },

    /// No stop with this id exists in the route
    #[error("unknown stop: {0}")]
    UnknownStop(StopId),

    /// Origin and destination cannot be reordered or removed
    #[error("{0} is an anchor and cannot be moved or removed")]
    AnchorImmutable(StopId),
}
