//! Detour assessment: how far out of the way is a candidate stop?
//!
//! The cost of a candidate is the cheapest-insertion cost: for each leg
//! `a → b` of the current route, detouring through `c` adds
//! `d(a,c) + d(c,b) − d(a,b)`. The smallest such value is the added
//! distance, and the leg it came from gives the candidate's position along
//! the route.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{Coordinates, DEFAULT_ROAD_FACTOR, Route, Stop, StopKind};
use crate::resolver::{AddressResolver, LocationBias, PlaceCandidate};

use super::config::PlannerConfig;
use super::dwell::StopTimeEstimator;
use super::rank::rank_along_route;

/// How much the numbers can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Every point had real coordinates.
    Geometric,
    /// At least one point was placed from its address alone.
    Estimated,
}

/// Result of assessing one candidate against a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetourAssessment {
    pub candidate: Stop,
    pub added_distance_miles: f64,
    pub added_time_mins: i64,
    pub on_route: bool,
    /// Fraction of the way along the route, in `[0, 1]`.
    pub route_position: f64,
    pub confidence: Confidence,
}

impl DetourAssessment {
    /// `"+1.2 miles"`
    pub fn distance_text(&self) -> String {
        format!("+{:.1} miles", self.added_distance_miles)
    }

    /// `"+4 min"`
    pub fn time_text(&self) -> String {
        format!("+{} min", self.added_time_mins)
    }
}

/// Inclusive detour budget check.
pub fn is_on_route(added_distance_miles: f64, threshold_miles: f64) -> bool {
    added_distance_miles <= threshold_miles
}

/// Prices candidate stops against a route.
#[derive(Debug, Clone)]
pub struct DetourCalculator {
    road_factor: f64,
    minutes_per_mile: f64,
}

impl Default for DetourCalculator {
    fn default() -> Self {
        Self::new(&PlannerConfig::default())
    }
}

impl DetourCalculator {
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            road_factor: DEFAULT_ROAD_FACTOR,
            minutes_per_mile: config.detour_minutes_per_mile,
        }
    }

    pub fn with_road_factor(mut self, factor: f64) -> Self {
        self.road_factor = factor;
        self
    }

    fn miles(&self, a: &Coordinates, b: &Coordinates) -> f64 {
        a.road_miles(b, self.road_factor)
    }

    /// Assess `candidate` against the ordered stops of `route`.
    ///
    /// Never fails: blank stops are skipped, and missing or non-finite
    /// coordinates are synthesized from addresses, which marks the result
    /// `Estimated`.
    pub fn assess(&self, route: &Route, candidate: &Stop, threshold_miles: f64) -> DetourAssessment {
        let mut geometric = true;
        let mut points: Vec<Coordinates> = Vec::with_capacity(route.stops.len());
        for stop in route.stops.iter().filter(|s| !s.is_blank()) {
            let (c, real) = stop.position();
            geometric &= real;
            points.push(c);
        }
        let (c, real) = candidate.position();
        geometric &= real;

        let (added, position) = self.cheapest_insertion(&points, &c);
        let added = added.max(0.0);

        DetourAssessment {
            candidate: candidate.clone(),
            added_distance_miles: added,
            added_time_mins: (added * self.minutes_per_mile).round() as i64,
            on_route: is_on_route(added, threshold_miles),
            route_position: position.clamp(0.0, 1.0),
            confidence: if geometric {
                Confidence::Geometric
            } else {
                Confidence::Estimated
            },
        }
    }

    /// Returns (added miles, position along route).
    fn cheapest_insertion(&self, points: &[Coordinates], c: &Coordinates) -> (f64, f64) {
        match points {
            [] => (0.0, 0.0),
            // Out and back from the only known point
            [only] => (2.0 * self.miles(only, c), 0.0),
            _ => {
                let legs: Vec<f64> = points.windows(2).map(|w| self.miles(&w[0], &w[1])).collect();
                let total: f64 = legs.iter().sum();

                let mut best: Option<(f64, usize, f64)> = None;
                for (i, w) in points.windows(2).enumerate() {
                    let to_c = self.miles(&w[0], c);
                    let from_c = self.miles(c, &w[1]);
                    let added = to_c + from_c - legs[i];
                    let fraction = if to_c + from_c > 0.0 {
                        to_c / (to_c + from_c)
                    } else {
                        0.0
                    };
                    if best.is_none_or(|(b, _, _)| added < b) {
                        best = Some((added, i, fraction));
                    }
                }

                let Some((added, leg, fraction)) = best else {
                    return (0.0, 0.0);
                };
                if total <= 0.0 {
                    return (added, 0.0);
                }
                let before: f64 = legs[..leg].iter().sum();
                (added, (before + fraction * legs[leg]) / total)
            }
        }
    }

    /// Search for `query` near the route's origin and price every hit.
    ///
    /// Results are ordered by position along the route, then rating. A
    /// failed search yields no results.
    pub async fn along_route(
        &self,
        resolver: &dyn AddressResolver,
        estimator: &StopTimeEstimator,
        route: &Route,
        query: &str,
        threshold_miles: f64,
    ) -> Vec<DetourAssessment> {
        let bias = route.origin().map(|o| match o.coordinates.filter(Coordinates::is_valid) {
            Some(c) => LocationBias::around(c),
            None => LocationBias::near(o.address.clone()),
        });

        let places = match resolver.search(query, bias.as_ref()).await {
            Ok(places) => places,
            Err(e) => {
                warn!(provider = resolver.name(), error = %e, query, "along-route search failed");
                return Vec::new();
            }
        };

        let assessments: Vec<DetourAssessment> = places
            .iter()
            .map(|p| self.assess(route, &candidate_stop(p, estimator), threshold_miles))
            .collect();
        debug!(
            query,
            hits = assessments.len(),
            on_route = assessments.iter().filter(|a| a.on_route).count(),
            "assessed along-route search"
        );
        rank_along_route(assessments)
    }
}

/// Stop for a searched place, with its dwell estimate.
pub fn candidate_stop(place: &PlaceCandidate, estimator: &StopTimeEstimator) -> Stop {
    let mut stop = Stop::new(StopKind::Place, place.address.clone())
        .with_name(place.name.clone())
        .with_dwell_minutes(estimator.estimate(&place.name, &place.types))
        .with_place(place.id.clone(), place.rating);
    stop.coordinates = place.coordinates;
    stop
}
