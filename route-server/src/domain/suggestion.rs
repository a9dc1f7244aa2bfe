//! Location suggestions, normalized from every source into one shape.

use serde::{Deserialize, Serialize};

/// Where a suggestion came from.
///
/// Variants are declared in ranking priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Saved,
    Recent,
    Place,
    Address,
}

/// A single suggestion offered for a search query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResult {
    pub source: SuggestionSource,
    pub name: Option<String>,
    pub address: String,
    pub rating: Option<f32>,
    /// Low-confidence distance text such as `"0.5 miles"`. Informational
    /// only; never used for ranking.
    pub distance_hint: Option<String>,
    pub place_id: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl SuggestionResult {
    pub fn new(source: SuggestionSource, address: impl Into<String>) -> Self {
        Self {
            source,
            name: None,
            address: address.into(),
            rating: None,
            distance_hint: None,
            place_id: None,
            types: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Deduplication key.
    pub fn key(&self) -> String {
        normalize_address(&self.address)
    }

    /// A rating that counts for ranking. Zero means "unrated".
    pub fn effective_rating(&self) -> Option<f32> {
        self.rating.filter(|r| *r > 0.0)
    }

    /// True if `query` (already lowercased) occurs in the name or address.
    pub fn matches(&self, query_lower: &str) -> bool {
        text_matches(self.name.as_deref(), &self.address, query_lower)
    }
}

/// A location the household has saved (home, work, school, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub id: String,
    pub name: String,
    pub address: String,
}

impl SavedLocation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
        }
    }

    pub fn to_suggestion(&self) -> SuggestionResult {
        SuggestionResult {
            source: SuggestionSource::Saved,
            name: Some(self.name.clone()),
            address: self.address.clone(),
            rating: None,
            distance_hint: None,
            place_id: Some(format!("saved_{}", self.id)),
            types: Vec::new(),
        }
    }
}

/// Trimmed, lowercased address used as a deduplication key.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Case-insensitive substring match over an optional name and an address.
pub(crate) fn text_matches(name: Option<&str>, address: &str, query_lower: &str) -> bool {
    name.is_some_and(|n| n.to_lowercase().contains(query_lower))
        || address.to_lowercase().contains(query_lower)
}
