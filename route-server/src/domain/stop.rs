//! Stops: the anchors and waypoints a route is built from.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geo::{Coordinates, synthetic_coordinates};

/// Identifier of a stop within one route.
///
/// Ids are allocated by the composer that owns the route; a freshly
/// constructed stop carries the placeholder id `0` until it is added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(pub u64);

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stop-{}", self.0)
    }
}

/// Role a stop plays in a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    Origin,
    Waypoint,
    Destination,
    /// A waypoint created from an accepted place suggestion.
    Place,
}

impl StopKind {
    /// Origin and destination are fixed-position anchors.
    pub fn is_anchor(self) -> bool {
        matches!(self, StopKind::Origin | StopKind::Destination)
    }
}

/// Which anchor of a route an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Origin,
    Destination,
}

impl Anchor {
    pub fn kind(self) -> StopKind {
        match self {
            Anchor::Origin => StopKind::Origin,
            Anchor::Destination => StopKind::Destination,
        }
    }
}

/// Provider metadata kept for stops that came from a place search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceMetadata {
    pub place_id: String,
    pub rating: Option<f32>,
}

/// One stop of a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub address: String,
    pub coordinates: Option<Coordinates>,
    pub name: Option<String>,
    pub kind: StopKind,
    pub estimated_dwell_minutes: u32,
    pub place_metadata: Option<PlaceMetadata>,
}

impl Stop {
    /// Create a stop with no dwell time, name or metadata.
    pub fn new(kind: StopKind, address: impl Into<String>) -> Self {
        Self {
            id: StopId::default(),
            address: address.into(),
            coordinates: None,
            name: None,
            kind,
            estimated_dwell_minutes: 0,
            place_metadata: None,
        }
    }

    /// Shorthand for a plain waypoint.
    pub fn waypoint(address: impl Into<String>) -> Self {
        Self::new(StopKind::Waypoint, address)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn with_dwell_minutes(mut self, minutes: u32) -> Self {
        self.estimated_dwell_minutes = minutes;
        self
    }

    pub fn with_place(mut self, place_id: impl Into<String>, rating: Option<f32>) -> Self {
        self.place_metadata = Some(PlaceMetadata {
            place_id: place_id.into(),
            rating,
        });
        self
    }

    pub fn is_anchor(&self) -> bool {
        self.kind.is_anchor()
    }

    /// True if the address is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.address.trim().is_empty()
    }

    /// Rating from the place metadata, if any.
    pub fn rating(&self) -> Option<f32> {
        self.place_metadata.as_ref().and_then(|m| m.rating)
    }

    /// Name if known, otherwise the address.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.address)
    }

    /// Known coordinates, or a deterministic placement derived from the
    /// address. The flag is `true` when the coordinates are real.
    pub fn position(&self) -> (Coordinates, bool) {
        match self.coordinates.filter(Coordinates::is_valid) {
            Some(c) => (c, true),
            None => (synthetic_coordinates(&self.address), false),
        }
    }
}

/// A stop as handed to the task/event store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedStop {
    pub address: String,
    pub name: Option<String>,
    pub place_id: Option<String>,
    pub estimated_dwell_minutes: u32,
    pub order: usize,
}

impl PersistedStop {
    pub fn from_stop(stop: &Stop, order: usize) -> Self {
        Self {
            address: stop.address.clone(),
            name: stop.name.clone(),
            place_id: stop.place_metadata.as_ref().map(|m| m.place_id.clone()),
            estimated_dwell_minutes: stop.estimated_dwell_minutes,
            order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors() {
        assert!(StopKind::Origin.is_anchor());
        assert!(StopKind::Destination.is_anchor());
        assert!(!StopKind::Waypoint.is_anchor());
        assert!(!StopKind::Place.is_anchor());
        assert_eq!(Anchor::Origin.kind(), StopKind::Origin);
    }

    #[test]
    fn label_prefers_name() {
        let stop = Stop::waypoint("123 Main St");
        assert_eq!(stop.label(), "123 Main St");

        let named = stop.clone().with_name("Dunkin'");
        assert_eq!(named.label(), "Dunkin'");

        let blank_name = stop.with_name("  ");
        assert_eq!(blank_name.label(), "123 Main St");
    }

    #[test]
    fn blank_address() {
        assert!(Stop::waypoint("   ").is_blank());
        assert!(!Stop::waypoint("1 A St").is_blank());
    }

    #[test]
    fn position_falls_back_to_synthetic() {
        let stop = Stop::waypoint("1 A St");
        let (coords, real) = stop.position();
        assert!(!real);
        assert_eq!(coords, synthetic_coordinates("1 A St"));

        let real_coords = Coordinates::new(42.0, -71.0);
        let located = stop.clone().with_coordinates(real_coords);
        assert_eq!(located.position(), (real_coords, true));

        let garbled = stop.with_coordinates(Coordinates::new(f64::NAN, f64::NAN));
        assert_eq!(garbled.position(), (synthetic_coordinates("1 A St"), false));
    }

    #[test]
    fn persisted_projection() {
        let stop = Stop::waypoint("147 Market St")
            .with_name("CVS Pharmacy")
            .with_place("cvs_1", Some(4.1))
            .with_dwell_minutes(12);

        let persisted = PersistedStop::from_stop(&stop, 2);
        assert_eq!(persisted.place_id.as_deref(), Some("cvs_1"));
        assert_eq!(persisted.estimated_dwell_minutes, 12);
        assert_eq!(persisted.order, 2);
    }

    #[test]
    fn stop_id_display() {
        assert_eq!(StopId(7).to_string(), "stop-7");
    }
}
