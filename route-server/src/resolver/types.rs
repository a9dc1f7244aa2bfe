//! Provider-neutral types exchanged with an address resolver.

use serde::{Deserialize, Serialize};

use crate::domain::{Coordinates, RouteLeg, SuggestionResult, SuggestionSource};

/// Default search radius around a bias point (50 km).
pub const DEFAULT_BIAS_RADIUS_METERS: u32 = 50_000;

/// Hint for where results should cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationBias {
    /// Free-text location to search near, resolved by the provider.
    pub near: Option<String>,
    pub center: Option<Coordinates>,
    pub radius_meters: u32,
}

impl LocationBias {
    pub fn near(address: impl Into<String>) -> Self {
        Self {
            near: Some(address.into()),
            center: None,
            radius_meters: DEFAULT_BIAS_RADIUS_METERS,
        }
    }

    pub fn around(center: Coordinates) -> Self {
        Self {
            near: None,
            center: Some(center),
            radius_meters: DEFAULT_BIAS_RADIUS_METERS,
        }
    }

    /// Stable string form, used in cache keys.
    pub fn cache_key(&self) -> String {
        match (&self.near, &self.center) {
            (_, Some(c)) => format!("@{:.4},{:.4}/{}", c.lat, c.lng, self.radius_meters),
            (Some(near), None) => format!("near:{}/{}", near.trim().to_lowercase(), self.radius_meters),
            (None, None) => String::new(),
        }
    }
}

/// A place returned by a live or local search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub id: String,
    pub name: String,
    pub address: String,
    pub rating: Option<f32>,
    pub distance_hint: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    pub coordinates: Option<Coordinates>,
}

impl PlaceCandidate {
    /// Primary type, or `"place"`.
    pub fn primary_type(&self) -> &str {
        self.types.first().map(String::as_str).unwrap_or("place")
    }

    pub fn to_suggestion(&self) -> SuggestionResult {
        SuggestionResult {
            source: SuggestionSource::Place,
            name: Some(self.name.clone()),
            address: self.address.clone(),
            rating: self.rating,
            distance_hint: self.distance_hint.clone(),
            place_id: Some(self.id.clone()),
            types: self.types.clone(),
        }
    }
}

/// An address completion returned by autocomplete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressPrediction {
    pub place_id: String,
    pub address: String,
    pub main_text: Option<String>,
    pub secondary_text: Option<String>,
}

impl AddressPrediction {
    pub fn to_suggestion(&self) -> SuggestionResult {
        SuggestionResult {
            source: SuggestionSource::Address,
            name: None,
            address: self.address.clone(),
            rating: None,
            distance_hint: None,
            place_id: Some(self.place_id.clone()),
            types: Vec::new(),
        }
    }
}

/// Route geometry and timing from a directions provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub distance_miles: f64,
    /// Travel time only; dwell is added by the composer.
    pub duration_mins: i64,
    pub steps: Vec<String>,
    /// Per-leg breakdown. May be empty if the provider does not report it.
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}
