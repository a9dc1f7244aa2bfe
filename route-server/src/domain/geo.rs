//! Coordinates and straight-line distance estimates.
//!
//! The engine never needs real road geometry. Great-circle distance scaled
//! by a road factor is good enough to order candidates and to price a detour,
//! and it is always available.

use serde::{Deserialize, Serialize};

/// Earth radius in miles.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Ratio of typical driving distance to straight-line distance.
pub const DEFAULT_ROAD_FACTOR: f64 = 1.3;

/// Centre used when an address has to be placed without a geocoder.
const SYNTHETIC_CENTER: Coordinates = Coordinates {
    lat: 42.3601,
    lng: -71.0589,
};

/// Width of the box (in degrees) synthetic coordinates are spread over.
const SYNTHETIC_SPAN_DEG: f64 = 0.3;

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and within latitude/longitude range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance to `other` in miles.
    pub fn haversine_miles(&self, other: &Coordinates) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_MILES * c
    }

    /// Estimated driving distance to `other` in miles.
    pub fn road_miles(&self, other: &Coordinates, road_factor: f64) -> f64 {
        self.haversine_miles(other) * road_factor
    }
}

/// Place an address deterministically when no geocoder result exists.
///
/// The same (normalized) address always lands on the same point, so every
/// estimate derived from it is reproducible. The point carries no real-world
/// meaning.
pub fn synthetic_coordinates(address: &str) -> Coordinates {
    let hash = fnv1a(address.trim().to_lowercase().as_bytes());

    let lat_unit = (hash & 0xffff) as f64 / 65535.0;
    let lng_unit = ((hash >> 16) & 0xffff) as f64 / 65535.0;

    Coordinates {
        lat: SYNTHETIC_CENTER.lat + (lat_unit - 0.5) * SYNTHETIC_SPAN_DEG,
        lng: SYNTHETIC_CENTER.lng + (lng_unit - 0.5) * SYNTHETIC_SPAN_DEG,
    }
}

/// 64-bit FNV-1a. Stable across platforms and toolchains.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes.iter().fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}
