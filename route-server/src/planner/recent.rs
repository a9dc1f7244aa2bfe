//! Recently selected locations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{SuggestionResult, SuggestionSource, normalize_address, text_matches};

/// Most searches ever remembered.
pub const DEFAULT_MAX_RECENT: usize = 5;

/// One remembered selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub name: Option<String>,
    pub address: String,
    /// Source of the suggestion when it was selected.
    pub selected_from: SuggestionSource,
    pub searched_at: DateTime<Utc>,
}

impl RecentSearch {
    pub fn to_suggestion(&self) -> SuggestionResult {
        SuggestionResult {
            source: SuggestionSource::Recent,
            name: self.name.clone(),
            address: self.address.clone(),
            rating: None,
            distance_hint: None,
            place_id: None,
            types: Vec::new(),
        }
    }
}

/// Bounded most-recent-first list of selections, deduplicated by address.
///
/// Owned by the caller and serializable so it can be persisted between
/// sessions. Only the entries are persisted; a loaded list is capped at
/// [`DEFAULT_MAX_RECENT`] whatever the payload says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredRecentSearches")]
pub struct RecentSearches {
    entries: Vec<RecentSearch>,
    #[serde(skip_serializing)]
    capacity: usize,
}

/// Wire form of [`RecentSearches`].
#[derive(Deserialize)]
struct StoredRecentSearches {
    #[serde(default)]
    entries: Vec<RecentSearch>,
}

impl From<StoredRecentSearches> for RecentSearches {
    fn from(stored: StoredRecentSearches) -> Self {
        let mut recent = Self::new();
        for entry in stored.entries {
            let key = normalize_address(&entry.address);
            let duplicate = recent.entries.iter().any(|e| normalize_address(&e.address) == key);
            if !duplicate && !key.is_empty() {
                recent.entries.push(entry);
            }
        }
        recent.entries.truncate(recent.capacity);
        recent
    }
}

impl Default for RecentSearches {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_RECENT)
    }
}

impl RecentSearches {
    pub fn new() -> Self {
        Self::default()
    }

    /// A list remembering at most `capacity` searches, itself capped at
    /// [`DEFAULT_MAX_RECENT`].
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(DEFAULT_MAX_RECENT);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn entries(&self) -> &[RecentSearch] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remember a selected suggestion.
    ///
    /// Saved locations and entries that already came from this list are not
    /// recorded. Returns whether the list changed.
    pub fn record(&mut self, selected: &SuggestionResult, at: DateTime<Utc>) -> bool {
        if matches!(selected.source, SuggestionSource::Saved | SuggestionSource::Recent) {
            return false;
        }
        if selected.address.trim().is_empty() || self.capacity == 0 {
            return false;
        }

        let key = selected.key();
        self.entries.retain(|e| normalize_address(&e.address) != key);
        self.entries.insert(
            0,
            RecentSearch {
                name: selected.name.clone(),
                address: selected.address.clone(),
                selected_from: selected.source,
                searched_at: at,
            },
        );
        self.entries.truncate(self.capacity);
        true
    }

    /// Entries whose name or address contains `query`, case-insensitively,
    /// as suggestions.
    pub fn matching(&self, query: &str) -> Vec<SuggestionResult> {
        let q = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| text_matches(e.name.as_deref(), &e.address, &q))
            .map(RecentSearch::to_suggestion)
            .collect()
    }
}
