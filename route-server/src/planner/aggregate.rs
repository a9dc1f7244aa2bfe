//! Location suggestions merged from every source.
//!
//! A search consults four sources: saved locations, recent searches, live
//! place search and address autocomplete. The two live lookups run
//! concurrently. Results are merged in that order, deduplicated by address
//! and ranked (see [`rank_suggestions`]).
//!
//! Searches are issued as the user types, so responses can arrive out of
//! order. Every search takes a sequence number when it starts, and only the
//! most recently issued search may commit its results.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::{PlanningError, SavedLocation, SuggestionResult};
use crate::resolver::{AddressResolver, LocationBias};

use super::config::PlannerConfig;
use super::rank::rank_suggestions;
use super::recent::RecentSearches;

/// Caller-owned state a search draws on.
#[derive(Debug, Clone, Default)]
pub struct SuggestionContext {
    pub saved_locations: Vec<SavedLocation>,
    pub recent_searches: RecentSearches,
    pub bias: Option<LocationBias>,
}

impl SuggestionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_saved(mut self, saved: Vec<SavedLocation>) -> Self {
        self.saved_locations = saved;
        self
    }

    pub fn with_recent(mut self, recent: RecentSearches) -> Self {
        self.recent_searches = recent;
        self
    }

    pub fn with_bias(mut self, bias: LocationBias) -> Self {
        self.bias = Some(bias);
        self
    }
}

/// What happened to a search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// This search was the latest; its results are now the committed list.
    Committed(Vec<SuggestionResult>),
    /// A newer search started while this one was in flight.
    Superseded { issued: u64, current: u64 },
}

impl SearchOutcome {
    pub fn into_result(self) -> Result<Vec<SuggestionResult>, PlanningError> {
        match self {
            SearchOutcome::Committed(results) => Ok(results),
            SearchOutcome::Superseded { issued, current } => {
                Err(PlanningError::StaleResponseDiscarded { issued, current })
            }
        }
    }
}

/// The last committed search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommittedSuggestions {
    pub sequence: u64,
    pub query: String,
    pub results: Vec<SuggestionResult>,
}

/// Merges and ranks suggestions, committing only the latest search.
pub struct SuggestionAggregator {
    resolver: Arc<dyn AddressResolver>,
    config: PlannerConfig,
    sequence: AtomicU64,
    committed: RwLock<CommittedSuggestions>,
}

impl SuggestionAggregator {
    pub fn new(resolver: Arc<dyn AddressResolver>, config: PlannerConfig) -> Self {
        Self {
            resolver,
            config,
            sequence: AtomicU64::new(0),
            committed: RwLock::new(CommittedSuggestions::default()),
        }
    }

    /// Sequence number of the most recently issued search.
    pub fn latest_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Snapshot of the committed results.
    pub async fn committed(&self) -> CommittedSuggestions {
        self.committed.read().await.clone()
    }

    /// Run a search for `query`.
    ///
    /// Queries shorter than the configured minimum commit an empty list
    /// without touching the provider. Provider failures contribute no
    /// results from that source.
    pub async fn search(&self, query: &str, ctx: &SuggestionContext) -> SearchOutcome {
        let issued = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim();

        if query.chars().count() < self.config.min_query_chars {
            return self.commit(issued, query, Vec::new()).await;
        }

        let query_lower = query.to_lowercase();
        let mut merged: Vec<SuggestionResult> = ctx
            .saved_locations
            .iter()
            .map(SavedLocation::to_suggestion)
            .filter(|s| s.matches(&query_lower))
            .collect();
        merged.extend(ctx.recent_searches.matching(query));

        let (places, predictions) = tokio::join!(
            self.resolver.search(query, ctx.bias.as_ref()),
            self.resolver.autocomplete(query),
        );

        match places {
            Ok(places) => merged.extend(places.iter().map(|p| p.to_suggestion())),
            Err(e) => warn!(provider = self.resolver.name(), error = %e, query, "place search failed"),
        }
        match predictions {
            Ok(predictions) => merged.extend(predictions.iter().map(|p| p.to_suggestion())),
            Err(e) => warn!(provider = self.resolver.name(), error = %e, query, "autocomplete failed"),
        }

        let ranked = rank_suggestions(merged, self.config.max_suggestions);
        self.commit(issued, query, ranked).await
    }

    async fn commit(&self, issued: u64, query: &str, results: Vec<SuggestionResult>) -> SearchOutcome {
        let mut committed = self.committed.write().await;
        let current = self.latest_sequence();
        if issued != current || issued <= committed.sequence {
            debug!(issued, current, query, "discarding superseded suggestions");
            return SearchOutcome::Superseded { issued, current };
        }

        committed.sequence = issued;
        committed.query = query.to_string();
        committed.results = results.clone();
        debug!(issued, query, count = results.len(), "committed suggestions");
        SearchOutcome::Committed(results)
    }
}
