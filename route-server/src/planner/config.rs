//! Tuning knobs for the trip planner.

use std::time::Duration;

/// Configuration parameters for suggestions, detours and recompute.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Queries shorter than this (after trimming) return nothing and issue
    /// no provider call.
    pub min_query_chars: usize,

    /// Maximum number of merged suggestions returned.
    pub max_suggestions: usize,

    /// Maximum number of remembered recent searches.
    pub max_recent: usize,

    /// Detour budget (miles). Candidates adding at most this much are on
    /// route.
    pub detour_threshold_miles: f64,

    /// Minutes charged per mile of detour.
    pub detour_minutes_per_mile: f64,

    /// Quiet period after an edit before the route is recomputed.
    pub debounce_ms: u64,

    /// Cap on contextual (event) suggestions.
    pub max_recommended: usize,

    /// Cap on time-of-day suggestions.
    pub max_time_based: usize,

    /// Cap on essentials suggestions.
    pub max_nearby: usize,
}

impl PlannerConfig {
    /// Returns the debounce window as a Duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn with_detour_threshold(mut self, miles: f64) -> Self {
        self.detour_threshold_miles = miles;
        self
    }

    pub fn with_max_suggestions(mut self, n: usize) -> Self {
        self.max_suggestions = n;
        self
    }

    pub fn with_min_query_chars(mut self, n: usize) -> Self {
        self.min_query_chars = n;
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_query_chars: 2,
            max_suggestions: 10,
            max_recent: 5,
            detour_threshold_miles: 2.0,
            detour_minutes_per_mile: 3.0,
            debounce_ms: 300,
            max_recommended: 3,
            max_time_based: 2,
            max_nearby: 2,
        }
    }
}
