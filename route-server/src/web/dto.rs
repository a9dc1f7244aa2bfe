//! Data transfer objects for web requests and responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Route, RouteStatus, RouteSummary, SavedLocation, Stop, StopId, SuggestionResult, TripSchedule, format_drive_time,
};
use crate::planner::{DetourAssessment, EventType, RecentSearches, SmartSuggestions};

/// Request for location suggestions.
#[derive(Debug, Deserialize)]
pub struct SuggestionsRequest {
    /// Partial query typed by the user
    pub q: String,

    /// Household saved locations
    #[serde(default)]
    pub saved: Vec<SavedLocation>,

    /// Recent searches as last returned by the select endpoint
    #[serde(default)]
    pub recent: Option<RecentSearches>,

    /// Optional free-text location to bias provider results
    pub near: Option<String>,
}

/// Response for suggestions.
#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub results: Vec<SuggestionResult>,
}

/// Request to remember a selected suggestion.
#[derive(Debug, Deserialize)]
pub struct SelectSuggestionRequest {
    pub selected: SuggestionResult,

    #[serde(default)]
    pub recent: Option<RecentSearches>,
}

/// Updated recent searches.
#[derive(Debug, Serialize)]
pub struct SelectSuggestionResponse {
    pub recorded: bool,
    pub recent: RecentSearches,
}

/// A waypoint in a route request.
#[derive(Debug, Clone, Deserialize)]
pub struct WaypointRequest {
    pub address: String,

    /// Place name, if picked from a place search
    pub name: Option<String>,

    /// Provider place id, if picked from a place search
    pub place_id: Option<String>,

    pub rating: Option<f32>,

    /// Dwell time override (minutes); estimated when omitted
    pub dwell_minutes: Option<u32>,
}

impl WaypointRequest {
    pub fn to_stop(&self) -> Stop {
        let mut stop = Stop::waypoint(self.address.clone());
        if let Some(name) = &self.name {
            stop = stop.with_name(name.clone());
        }
        if let Some(place_id) = &self.place_id {
            stop = stop.with_place(place_id.clone(), self.rating);
        }
        if let Some(minutes) = self.dwell_minutes {
            stop = stop.with_dwell_minutes(minutes);
        }
        stop
    }
}

/// Request to compose and compute a route.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub origin: String,
    pub destination: String,

    #[serde(default)]
    pub waypoints: Vec<WaypointRequest>,

    /// Desired departure (e.g. "2026-04-11T08:00:00")
    pub departure: Option<NaiveDateTime>,

    /// Desired arrival; takes precedence over departure when both are set
    pub arrival: Option<NaiveDateTime>,
}

/// Estimated arrival at one stop.
#[derive(Debug, Serialize)]
pub struct StopEta {
    pub stop_id: StopId,
    pub eta: String,
}

/// A computed route.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub status: RouteStatus,
    pub stops: Vec<Stop>,
    pub steps: Vec<String>,
    pub total_distance_miles: f64,
    pub travel_mins: i64,
    pub dwell_mins: i64,
    pub total_duration_mins: i64,

    /// Human-readable drive time, e.g. "1h 5m"
    pub duration_text: String,

    pub navigation_url: String,
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub etas: Vec<StopEta>,
    pub summary: RouteSummary,
}

impl RouteResponse {
    pub fn from_route(route: &Route, schedule: &TripSchedule, etas: Vec<(StopId, NaiveDateTime)>) -> Self {
        Self {
            status: route.status,
            stops: route.stops.clone(),
            steps: route.steps.clone(),
            total_distance_miles: route.total_distance_miles,
            travel_mins: route.travel_mins,
            dwell_mins: route.dwell_mins,
            total_duration_mins: route.total_duration_mins,
            duration_text: format_drive_time(route.total_duration_mins),
            navigation_url: route.navigation_url.clone(),
            departure: schedule.departure().map(|t| format_time(&t)),
            arrival: schedule.arrival().map(|t| format_time(&t)),
            etas: etas
                .into_iter()
                .map(|(stop_id, eta)| StopEta {
                    stop_id,
                    eta: format_time(&eta),
                })
                .collect(),
            summary: route.summary(),
        }
    }
}

/// Request to price candidate stops against a route.
#[derive(Debug, Deserialize)]
pub struct DetourRequest {
    pub origin: String,
    pub destination: String,

    #[serde(default)]
    pub waypoints: Vec<WaypointRequest>,

    /// What to look for along the way, e.g. "coffee"
    pub query: String,

    /// Detour budget; defaults to the planner's threshold
    pub max_detour_miles: Option<f64>,
}

/// One priced candidate.
#[derive(Debug, Serialize)]
pub struct DetourResult {
    pub name: Option<String>,
    pub address: String,
    pub rating: Option<f32>,
    pub dwell_minutes: u32,
    pub added_distance: String,
    pub added_time: String,
    pub added_distance_miles: f64,
    pub added_time_mins: i64,
    pub on_route: bool,
    pub route_position: f64,
}

impl DetourResult {
    pub fn from_assessment(a: &DetourAssessment) -> Self {
        Self {
            name: a.candidate.name.clone(),
            address: a.candidate.address.clone(),
            rating: a.candidate.rating(),
            dwell_minutes: a.candidate.estimated_dwell_minutes,
            added_distance: a.distance_text(),
            added_time: a.time_text(),
            added_distance_miles: a.added_distance_miles,
            added_time_mins: a.added_time_mins,
            on_route: a.on_route,
            route_position: a.route_position,
        }
    }
}

/// Response for detour pricing.
#[derive(Debug, Serialize)]
pub struct DetourResponse {
    pub results: Vec<DetourResult>,
}

/// Request for smart stop suggestions.
#[derive(Debug, Deserialize)]
pub struct SmartStopsRequest {
    pub origin: String,
    pub destination: String,
    pub departure: NaiveDateTime,
    pub event_type: Option<EventType>,

    /// Addresses already added to the trip
    #[serde(default)]
    pub accepted: Vec<String>,
}

/// Response for smart stop suggestions.
pub type SmartStopsResponse = SmartSuggestions;

/// Query for a dwell estimate.
#[derive(Debug, Deserialize)]
pub struct DwellRequest {
    pub name: String,

    /// Comma-separated place types
    pub types: Option<String>,
}

impl DwellRequest {
    pub fn type_list(&self) -> Vec<String> {
        self.types
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Dwell estimate.
#[derive(Debug, Serialize)]
pub struct DwellResponse {
    pub minutes: u32,

    /// Matched category, if any
    pub category: Option<&'static str>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Format a date-time as HH:MM.
pub fn format_time(time: &NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}
