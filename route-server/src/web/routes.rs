//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::{Anchor, PlanningError};
use crate::planner::{
    DetourCalculator, RouteComposer, SmartStopSuggester, SuggestionAggregator, SuggestionContext,
    estimate_dwell_minutes,
};
use crate::resolver::LocationBias;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/suggestions", post(suggestions))
        .route("/api/suggestions/select", post(select_suggestion))
        .route("/api/route", post(plan_route))
        .route("/api/detour", post(detour))
        .route("/api/smart-stops", post(smart_stops))
        .route("/api/dwell", get(dwell))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Merged saved, recent and provider suggestions for a partial query.
async fn suggestions(
    State(state): State<AppState>,
    Json(req): Json<SuggestionsRequest>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let mut ctx = SuggestionContext::new()
        .with_saved(req.saved)
        .with_recent(req.recent.unwrap_or_default());
    if let Some(near) = req.near.filter(|n| !n.trim().is_empty()) {
        ctx = ctx.with_bias(LocationBias::near(near));
    }

    let aggregator = SuggestionAggregator::new(state.resolver.clone(), (*state.config).clone());
    let results = aggregator.search(&req.q, &ctx).await.into_result()?;
    Ok(Json(SuggestionsResponse { results }))
}

/// Remember a selected suggestion in the recent list.
async fn select_suggestion(Json(req): Json<SelectSuggestionRequest>) -> Json<SelectSuggestionResponse> {
    let mut recent = req.recent.unwrap_or_default();
    let recorded = recent.record(&req.selected, Utc::now());
    Json(SelectSuggestionResponse { recorded, recent })
}

/// Build a composer for the given anchors and waypoints.
fn compose(state: &AppState, origin: &str, destination: &str, waypoints: &[WaypointRequest]) -> RouteComposer {
    let mut composer = RouteComposer::new(state.nav.clone()).with_estimator((*state.estimator).clone());
    composer.set_anchor(Anchor::Origin, origin);
    composer.set_anchor(Anchor::Destination, destination);
    for waypoint in waypoints {
        match waypoint.dwell_minutes {
            Some(_) => composer.add_stop(waypoint.to_stop()),
            None => composer.add_estimated_stop(waypoint.to_stop()),
        };
    }
    composer
}

/// Compose and compute a route.
///
/// A blank anchor is not an error: the response carries the incomplete
/// route with no navigation link.
async fn plan_route(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, AppError> {
    let mut composer = compose(&state, &req.origin, &req.destination, &req.waypoints);

    if let Some(arrival) = req.arrival {
        composer.set_arrival(arrival);
    } else if let Some(departure) = req.departure {
        composer.set_departure(departure);
    }

    match composer.compute(state.resolver.as_ref()).await {
        Ok(_) | Err(PlanningError::IncompleteRoute) => {}
        Err(e) => return Err(e.into()),
    }
    debug!(
        status = ?composer.route().status,
        stops = composer.route().stops.len(),
        total_mins = composer.route().total_duration_mins,
        "route planned"
    );

    Ok(Json(RouteResponse::from_route(
        composer.route(),
        composer.schedule(),
        composer.stop_etas(),
    )))
}

/// Search along a route and price every hit as a detour.
///
/// Short queries and incomplete routes have no results.
async fn detour(
    State(state): State<AppState>,
    Json(req): Json<DetourRequest>,
) -> Result<Json<DetourResponse>, AppError> {
    let query = req.query.trim();
    if query.chars().count() < state.config.min_query_chars {
        debug!(query, "detour query too short");
        return Ok(Json(DetourResponse { results: Vec::new() }));
    }

    let mut composer = compose(&state, &req.origin, &req.destination, &req.waypoints);
    let route = match composer.compute(state.resolver.as_ref()).await {
        Ok(route) => route,
        Err(PlanningError::IncompleteRoute) => return Ok(Json(DetourResponse { results: Vec::new() })),
        Err(e) => return Err(e.into()),
    };

    let threshold = req.max_detour_miles.unwrap_or(state.config.detour_threshold_miles);
    let assessments = DetourCalculator::new(&state.config)
        .along_route(state.resolver.as_ref(), &state.estimator, route, query, threshold)
        .await;

    Ok(Json(DetourResponse {
        results: assessments.iter().map(DetourResult::from_assessment).collect(),
    }))
}

/// Contextual, time-of-day and essentials suggestions for a trip.
///
/// Nothing is suggested until both anchors are set.
async fn smart_stops(
    State(state): State<AppState>,
    Json(req): Json<SmartStopsRequest>,
) -> Result<Json<SmartStopsResponse>, AppError> {
    if req.origin.trim().is_empty() || req.destination.trim().is_empty() {
        return Ok(Json(SmartStopsResponse::default()));
    }

    let mut suggester = SmartStopSuggester::new(state.resolver.clone(), (*state.config).clone());
    for address in &req.accepted {
        suggester.mark_accepted(address);
    }

    let suggestions = suggester
        .suggest(&req.origin, &req.destination, req.departure, req.event_type.as_ref())
        .await;
    Ok(Json(suggestions))
}

/// Dwell estimate for a named place.
async fn dwell(State(state): State<AppState>, Query(req): Query<DwellRequest>) -> Json<DwellResponse> {
    let types = req.type_list();
    Json(DwellResponse {
        minutes: estimate_dwell_minutes(&req.name, &types),
        category: state.estimator.classify(&req.name, &types).map(|rule| rule.label),
    })
}

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    Upstream { message: String },
}

impl From<PlanningError> for AppError {
    fn from(e: PlanningError) -> Self {
        let message = e.to_string();
        match e {
            PlanningError::StaleResponseDiscarded { .. } => AppError::Conflict { message },
            PlanningError::ProviderUnavailable(_) => AppError::Upstream { message },
            PlanningError::IncompleteRoute
            | PlanningError::InvalidQuery { .. }
            | PlanningError::UnknownStop(_)
            | PlanningError::AnchorImmutable(_) => AppError::BadRequest { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        };
        let message = self.to_string();

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
