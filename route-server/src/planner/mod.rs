//! Trip planning.
//!
//! This module answers the questions a household asks while putting a trip
//! together: "which place did I mean?", "how long will this take with these
//! stops?" and "what could I pick up on the way?".
//!
//! - [`SuggestionAggregator`] merges saved locations, recent searches and
//!   provider results for a partial query, discarding stale responses.
//! - [`RouteComposer`] owns the ordered stop list and recomputes the route;
//!   [`RouteController`] debounces that recompute for interactive editing.
//! - [`DetourCalculator`] scores candidate stops by how far they pull the
//!   trip off its path.
//! - [`SmartStopSuggester`] proposes stops for an event, the time of day and
//!   everyday errands.

mod aggregate;
mod compose;
mod config;
mod controller;
mod detour;
mod dwell;
mod rank;
mod recent;
mod smart;

pub use aggregate::{CommittedSuggestions, SearchOutcome, SuggestionAggregator, SuggestionContext};
pub use compose::{RecomputeTicket, RouteComposer, route_or_estimate};
pub use config::PlannerConfig;
pub use controller::RouteController;
pub use detour::{Confidence, DetourAssessment, DetourCalculator, candidate_stop, is_on_route};
pub use dwell::{DEFAULT_DWELL_MINUTES, DwellRule, StopTimeEstimator, estimate_dwell_minutes};
pub use rank::{dedupe_by_address, rank_along_route, rank_suggestions};
pub use recent::{DEFAULT_MAX_RECENT, RecentSearch, RecentSearches};
pub use smart::{EventType, SmartStopSuggester, SmartSuggestions, SuggestedStop};
