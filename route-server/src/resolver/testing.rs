//! Scripted resolver for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Coordinates, Stop};

use super::capability::AddressResolver;
use super::error::ResolverError;
use super::local::LocalResolver;
use super::types::{AddressPrediction, LocationBias, PlaceCandidate, RouteInfo};

/// Resolver with canned answers, optional per-query latency and call
/// counters.
#[derive(Default)]
pub struct ScriptedResolver {
    places: Vec<PlaceCandidate>,
    predictions: Vec<AddressPrediction>,
    delays: HashMap<String, Duration>,
    route_delay: Option<Duration>,
    failing: bool,
    search_calls: AtomicUsize,
    autocomplete_calls: AtomicUsize,
    route_calls: AtomicUsize,
    last_waypoints: Mutex<Vec<String>>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(
        mut self,
        id: &str,
        name: &str,
        address: &str,
        rating: Option<f32>,
        types: &[&str],
    ) -> Self {
        self.places.push(PlaceCandidate {
            id: id.to_string(),
            name: name.to_string(),
            address: address.to_string(),
            rating,
            distance_hint: None,
            types: types.iter().map(|t| (*t).to_string()).collect(),
            coordinates: None,
        });
        self
    }

    pub fn with_located_place(mut self, id: &str, name: &str, types: &[&str], at: Coordinates) -> Self {
        self = self.with_place(id, name, &format!("{name} address"), Some(4.0), types);
        if let Some(last) = self.places.last_mut() {
            last.coordinates = Some(at);
        }
        self
    }

    pub fn with_prediction(mut self, place_id: &str, address: &str) -> Self {
        self.predictions.push(AddressPrediction {
            place_id: place_id.to_string(),
            address: address.to_string(),
            main_text: None,
            secondary_text: None,
        });
        self
    }

    /// Delay answers to `query` by `delay`.
    pub fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub fn with_route_delay(mut self, delay: Duration) -> Self {
        self.route_delay = Some(delay);
        self
    }

    /// Every call fails with a provider error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn autocomplete_calls(&self) -> usize {
        self.autocomplete_calls.load(Ordering::SeqCst)
    }

    pub fn route_calls(&self) -> usize {
        self.route_calls.load(Ordering::SeqCst)
    }

    /// Waypoint addresses of the most recent route request.
    pub fn last_waypoints(&self) -> Vec<String> {
        self.last_waypoints.lock().map(|w| w.clone()).unwrap_or_default()
    }

    async fn pause_for(&self, query: &str) {
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
    }

    fn unavailable() -> ResolverError {
        ResolverError::Api {
            status: 503,
            message: "scripted outage".to_string(),
        }
    }
}

#[async_trait]
impl AddressResolver for ScriptedResolver {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn search(
        &self,
        query: &str,
        _bias: Option<&LocationBias>,
    ) -> Result<Vec<PlaceCandidate>, ResolverError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.pause_for(query).await;
        if self.failing {
            return Err(Self::unavailable());
        }
        let q = query.trim().to_lowercase();
        Ok(self
            .places
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&q)
                    || p.types.iter().any(|t| t.replace('_', " ").contains(&q) || q.contains(&t.replace('_', " ")))
            })
            .cloned()
            .collect())
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<AddressPrediction>, ResolverError> {
        self.autocomplete_calls.fetch_add(1, Ordering::SeqCst);
        self.pause_for(query).await;
        if self.failing {
            return Err(Self::unavailable());
        }
        let q = query.trim().to_lowercase();
        Ok(self
            .predictions
            .iter()
            .filter(|p| p.address.to_lowercase().contains(&q))
            .cloned()
            .collect())
    }

    async fn route(
        &self,
        origin: &Stop,
        destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RouteInfo, ResolverError> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_waypoints.lock() {
            *last = waypoints.iter().map(|w| w.address.clone()).collect();
        }
        if let Some(delay) = self.route_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(Self::unavailable());
        }
        Ok(LocalResolver::empty().estimate_route(origin, destination, waypoints))
    }
}
