//! HTTP client for a JSON places/directions provider.
//!
//! The provider exposes three endpoints:
//! - `GET  {base}/places/search?query=..&near=..&lat=..&lng=..&radius=..`
//! - `GET  {base}/places/autocomplete?input=..`
//! - `POST {base}/directions` with `{origin, destination, waypoints}`

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::trace;

use crate::domain::{Coordinates, RouteLeg, Stop};

use super::capability::AddressResolver;
use super::error::ResolverError;
use super::types::{AddressPrediction, LocationBias, PlaceCandidate, RouteInfo};

/// Default base URL for the places provider.
const DEFAULT_BASE_URL: &str = "https://places.example.com/v1";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

const METERS_PER_MILE: f64 = 1609.344;

/// Configuration for the HTTP resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// API key for authentication
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ResolverConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Live places/directions client.
///
/// A semaphore caps concurrent requests so bursts of typing don't trip the
/// provider's rate limit.
#[derive(Debug, Clone)]
pub struct HttpResolver {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl HttpResolver {
    /// Create a new client with the given configuration.
    pub fn new(config: ResolverConfig) -> Result<Self, ResolverError> {
        if config.api_key.trim().is_empty() {
            return Err(ResolverError::NotConfigured("empty API key".to_string()));
        }

        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key).map_err(|_| ResolverError::Api {
            status: 0,
            message: "Invalid API key format".to_string(),
        })?;
        headers.insert("x-api-key", api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ResolverError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ResolverError::NotConfigured("client is shut down".to_string()))?;

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ResolverError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ResolverError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResolverError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ResolverError::Json {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl AddressResolver for HttpResolver {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn search(
        &self,
        query: &str,
        bias: Option<&LocationBias>,
    ) -> Result<Vec<PlaceCandidate>, ResolverError> {
        let url = format!("{}/places/search", self.base_url);
        let mut params: Vec<(&str, String)> = vec![("query", query.to_string())];
        if let Some(bias) = bias {
            if let Some(near) = &bias.near {
                params.push(("near", near.clone()));
            }
            if let Some(center) = bias.center {
                params.push(("lat", center.lat.to_string()));
                params.push(("lng", center.lng.to_string()));
            }
            params.push(("radius", bias.radius_meters.to_string()));
        }

        trace!(query, "places search");
        let response: WireSearchResponse = self.send(self.http.get(&url).query(&params)).await?;
        Ok(response.places.into_iter().map(convert_place).collect())
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<AddressPrediction>, ResolverError> {
        let url = format!("{}/places/autocomplete", self.base_url);
        let response: WireAutocompleteResponse = self
            .send(self.http.get(&url).query(&[("input", query)]))
            .await?;
        Ok(response
            .predictions
            .into_iter()
            .map(convert_prediction)
            .collect())
    }

    async fn route(
        &self,
        origin: &Stop,
        destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RouteInfo, ResolverError> {
        let url = format!("{}/directions", self.base_url);
        let body = WireDirectionsRequest {
            origin: origin.address.trim(),
            destination: destination.address.trim(),
            waypoints: waypoints.iter().map(|w| w.address.trim()).collect(),
        };
        let response: WireDirectionsResponse = self.send(self.http.post(&url).json(&body)).await?;
        Ok(convert_directions(response))
    }
}

#[derive(Debug, Deserialize)]
struct WireSearchResponse {
    #[serde(default)]
    places: Vec<WirePlace>,
}

#[derive(Debug, Deserialize)]
struct WirePlace {
    id: String,
    #[serde(alias = "display_name")]
    name: Option<String>,
    #[serde(alias = "formatted_address")]
    address: Option<String>,
    rating: Option<f32>,
    #[serde(default)]
    types: Vec<String>,
    location: Option<WireLatLng>,
}

#[derive(Debug, Deserialize)]
struct WireLatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct WireAutocompleteResponse {
    #[serde(default)]
    predictions: Vec<WirePrediction>,
}

#[derive(Debug, Deserialize)]
struct WirePrediction {
    place_id: String,
    description: String,
    main_text: Option<String>,
    secondary_text: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireDirectionsRequest<'a> {
    origin: &'a str,
    destination: &'a str,
    waypoints: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct WireDirectionsResponse {
    distance_meters: f64,
    duration_seconds: i64,
    #[serde(default)]
    steps: Vec<String>,
    #[serde(default)]
    legs: Vec<WireLeg>,
}

#[derive(Debug, Deserialize)]
struct WireLeg {
    distance_meters: f64,
    duration_seconds: i64,
}

fn convert_place(place: WirePlace) -> PlaceCandidate {
    PlaceCandidate {
        id: place.id,
        name: place.name.unwrap_or_else(|| "Unknown".to_string()),
        address: place.address.unwrap_or_default(),
        // Providers report 0 for unrated places
        rating: place.rating.filter(|r| *r > 0.0),
        distance_hint: None,
        types: place.types,
        coordinates: place.location.map(|l| Coordinates::new(l.lat, l.lng)),
    }
}

fn convert_prediction(p: WirePrediction) -> AddressPrediction {
    AddressPrediction {
        place_id: p.place_id,
        main_text: p.main_text.or_else(|| Some(p.description.clone())),
        secondary_text: p.secondary_text,
        address: p.description,
    }
}

fn seconds_to_mins(seconds: i64) -> i64 {
    (seconds + 30) / 60
}

fn convert_directions(response: WireDirectionsResponse) -> RouteInfo {
    RouteInfo {
        distance_miles: response.distance_meters / METERS_PER_MILE,
        duration_mins: seconds_to_mins(response.duration_seconds),
        steps: response.steps,
        legs: response
            .legs
            .into_iter()
            .map(|l| RouteLeg {
                distance_miles: l.distance_meters / METERS_PER_MILE,
                duration_mins: seconds_to_mins(l.duration_seconds),
            })
            .collect(),
    }
}
