//! Local fallback resolver.
//!
//! Serves place searches from a static catalog and prices routes from
//! straight-line distances, so planning keeps working with no provider
//! configured. Every answer is deterministic.

use std::cmp::Ordering;

use async_trait::async_trait;

use crate::domain::{Coordinates, DEFAULT_ROAD_FACTOR, RouteLeg, Stop, normalize_address};

use super::capability::AddressResolver;
use super::error::ResolverError;
use super::types::{LocationBias, PlaceCandidate, RouteInfo};

/// Maximum results returned from a local search.
const MAX_LOCAL_RESULTS: usize = 8;

/// Assumed driving pace (30 mph).
const DEFAULT_DRIVING_MINS_PER_MILE: f64 = 2.0;

/// Resolver backed by a static place catalog.
#[derive(Debug, Clone)]
pub struct LocalResolver {
    places: Vec<PlaceCandidate>,
    road_factor: f64,
    driving_mins_per_mile: f64,
}

impl Default for LocalResolver {
    fn default() -> Self {
        anytown_catalog()
    }
}

impl LocalResolver {
    /// Create a resolver with an empty catalog.
    pub fn empty() -> Self {
        Self {
            places: Vec::new(),
            road_factor: DEFAULT_ROAD_FACTOR,
            driving_mins_per_mile: DEFAULT_DRIVING_MINS_PER_MILE,
        }
    }

    pub fn places(&self) -> &[PlaceCandidate] {
        &self.places
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Search the catalog.
    ///
    /// A place matches if the query occurs in its name or one of its types,
    /// or if the query itself contains the name or a type ("shell gas
    /// station near me" finds "Shell Gas Station"). Exact name matches come
    /// first, then higher ratings.
    pub fn search_catalog(&self, query: &str) -> Vec<PlaceCandidate> {
        let term = query.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<PlaceCandidate> = self
            .places
            .iter()
            .filter(|place| {
                let name = place.name.to_lowercase();
                name.contains(&term)
                    || term.contains(&name)
                    || place.types.iter().any(|t| {
                        let t = t.to_lowercase().replace('_', " ");
                        t.contains(&term) || term.contains(&t)
                    })
            })
            .cloned()
            .collect();

        results.sort_by(|a, b| {
            let a_exact = a.name.to_lowercase() == term;
            let b_exact = b.name.to_lowercase() == term;
            b_exact.cmp(&a_exact).then_with(|| {
                b.rating
                    .unwrap_or(0.0)
                    .partial_cmp(&a.rating.unwrap_or(0.0))
                    .unwrap_or(Ordering::Equal)
            })
        });

        results.truncate(MAX_LOCAL_RESULTS);
        results
    }

    /// Coordinates for a stop: its own, a catalog match on address, or a
    /// synthetic placement.
    fn locate(&self, stop: &Stop) -> Coordinates {
        if let Some(c) = stop.coordinates.filter(Coordinates::is_valid) {
            return c;
        }
        let key = normalize_address(&stop.address);
        self.places
            .iter()
            .find(|p| normalize_address(&p.address) == key)
            .and_then(|p| p.coordinates)
            .unwrap_or_else(|| stop.position().0)
    }

    /// Price a route from straight-line legs.
    pub fn estimate_route(&self, origin: &Stop, destination: &Stop, waypoints: &[Stop]) -> RouteInfo {
        let ordered: Vec<&Stop> = std::iter::once(origin)
            .chain(waypoints.iter())
            .chain(std::iter::once(destination))
            .collect();

        let legs: Vec<RouteLeg> = ordered
            .windows(2)
            .map(|pair| {
                let miles = self
                    .locate(pair[0])
                    .road_miles(&self.locate(pair[1]), self.road_factor);
                RouteLeg {
                    distance_miles: miles,
                    duration_mins: (miles * self.driving_mins_per_mile).round() as i64,
                }
            })
            .collect();

        let mut steps = Vec::with_capacity(waypoints.len() + 2);
        steps.push(format!("Depart from {}", origin.label()));
        for (i, wp) in waypoints.iter().enumerate() {
            steps.push(format!("Stop {}: {}", i + 1, wp.label()));
        }
        steps.push(format!("Arrive at {}", destination.label()));

        RouteInfo {
            distance_miles: legs.iter().map(|l| l.distance_miles).sum(),
            duration_mins: legs.iter().map(|l| l.duration_mins).sum(),
            steps,
            legs,
        }
    }
}

#[async_trait]
impl AddressResolver for LocalResolver {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn search(
        &self,
        query: &str,
        _bias: Option<&LocationBias>,
    ) -> Result<Vec<PlaceCandidate>, ResolverError> {
        Ok(self.search_catalog(query))
    }

    async fn route(
        &self,
        origin: &Stop,
        destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RouteInfo, ResolverError> {
        Ok(self.estimate_route(origin, destination, waypoints))
    }
}

/// Builder for a local place catalog.
#[derive(Debug)]
pub struct LocalResolverBuilder {
    inner: LocalResolver,
}

impl Default for LocalResolverBuilder {
    fn default() -> Self {
        Self {
            inner: LocalResolver::empty(),
        }
    }
}

impl LocalResolverBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a place. `types` are provider-style identifiers such as
    /// `gas_station`.
    pub fn place(
        mut self,
        id: &str,
        name: &str,
        address: &str,
        rating: f32,
        distance: &str,
        types: &[&str],
    ) -> Self {
        self.inner.places.push(PlaceCandidate {
            id: id.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            rating: Some(rating),
            distance_hint: Some(distance.to_string()),
            types: types.iter().map(|t| (*t).to_string()).collect(),
            coordinates: None,
        });
        self
    }

    pub fn road_factor(mut self, factor: f64) -> Self {
        self.inner.road_factor = factor;
        self
    }

    pub fn driving_mins_per_mile(mut self, mins: f64) -> Self {
        self.inner.driving_mins_per_mile = mins;
        self
    }

    pub fn build(self) -> LocalResolver {
        self.inner
    }
}

/// The default catalog: a small town's worth of everyday stops.
pub fn anytown_catalog() -> LocalResolver {
    LocalResolverBuilder::new()
        .place("dunkin_1", "Dunkin'", "123 Main St, Anytown, ST 12345", 4.2, "0.5 miles", &["cafe", "coffee_shop"])
        .place("dunkin_2", "Dunkin'", "456 Oak Ave, Anytown, ST 12345", 4.0, "1.2 miles", &["cafe", "coffee_shop"])
        .place("starbucks_1", "Starbucks", "789 Pine St, Anytown, ST 12345", 4.3, "0.8 miles", &["cafe", "coffee_shop"])
        .place("shell_1", "Shell Gas Station", "321 Highway 1, Anytown, ST 12345", 3.9, "0.3 miles", &["gas_station"])
        .place("bp_1", "BP Gas Station", "654 Route 9, Anytown, ST 12345", 3.7, "1.5 miles", &["gas_station"])
        .place("mcdonalds_1", "McDonald's", "987 Center St, Anytown, ST 12345", 3.8, "0.7 miles", &["fast_food_restaurant", "restaurant"])
        .place("olive_garden_1", "Olive Garden", "222 Dinner Blvd, Anytown, ST 12345", 4.1, "2.0 miles", &["restaurant"])
        .place("cvs_1", "CVS Pharmacy", "147 Market St, Anytown, ST 12345", 4.1, "0.9 miles", &["pharmacy"])
        .place("whole_foods_1", "Whole Foods Market", "258 Shopping Center Dr, Anytown, ST 12345", 4.4, "1.1 miles", &["grocery_store", "supermarket"])
        .place("seven_eleven_1", "7-Eleven", "12 Corner Rd, Anytown, ST 12345", 3.6, "0.4 miles", &["convenience_store"])
        .place("target_1", "Target", "369 Plaza Blvd, Anytown, ST 12345", 4.2, "1.8 miles", &["department_store"])
        .place("bank_america_1", "Bank of America", "741 Financial Way, Anytown, ST 12345", 3.5, "0.6 miles", &["bank", "atm"])
        .place("toys_1", "Toy Town", "852 Kids Plaza, Anytown, ST 12345", 4.3, "2.1 miles", &["toy_store"])
        .place("party_city_1", "Party City", "963 Celebration Ave, Anytown, ST 12345", 4.0, "1.3 miles", &["party_supplies"])
        .place("hallmark_1", "Hallmark Store", "159 Gift Lane, Anytown, ST 12345", 4.5, "0.8 miles", &["gift_shop"])
        .place("bakery_1", "Sweet Dreams Bakery", "357 Dessert Dr, Anytown, ST 12345", 4.7, "1.0 miles", &["bakery", "dessert_shop"])
        .place("ice_cream_1", "Ben & Jerry's", "486 Frozen Treat Way, Anytown, ST 12345", 4.6, "0.9 miles", &["ice_cream_shop", "dessert_shop"])
        .place("sports_store_1", "Dick's Sporting Goods", "789 Athletic Blvd, Anytown, ST 12345", 4.1, "1.6 miles", &["sporting_goods", "sports_store"])
        .place("bookstore_1", "Barnes & Noble", "321 Reading Rd, Anytown, ST 12345", 4.4, "1.4 miles", &["bookstore"])
        .place("office_depot_1", "Office Depot", "654 Business Center, Anytown, ST 12345", 3.9, "1.2 miles", &["office_supplies"])
        .place("garage_1", "Municipal Parking Garage", "18 Civic Sq, Anytown, ST 12345", 3.4, "0.2 miles", &["parking_garage"])
        .place("cinema_1", "Regal Cinemas", "75 Marquee Way, Anytown, ST 12345", 4.0, "2.4 miles", &["movie_theater"])
        .place("smoothie_1", "Juice Junction", "31 Fitness Ct, Anytown, ST 12345", 4.2, "1.1 miles", &["smoothie_bar"])
        .place("health_food_1", "Green Basket", "44 Wellness Way, Anytown, ST 12345", 4.3, "1.7 miles", &["health_food_store"])
        .build()
}
