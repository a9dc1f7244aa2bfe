//! Computed routes.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::stop::{Stop, StopId, StopKind};

/// Lifecycle of a route.
///
/// `Incomplete` while an anchor is missing; `Computing` while a recompute is
/// pending or in flight; `Ready` once committed; `Stale` after an edit to a
/// route that had already been computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStatus {
    Incomplete,
    Computing,
    Ready,
    Stale,
}

/// Travel between two consecutive stops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_miles: f64,
    pub duration_mins: i64,
}

/// A computed route.
///
/// `total_duration_mins` is always `travel_mins + dwell_mins`, where
/// `dwell_mins` sums the dwell estimate of every stop except the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub stops: Vec<Stop>,
    pub legs: Vec<RouteLeg>,
    pub total_distance_miles: f64,
    pub travel_mins: i64,
    pub dwell_mins: i64,
    pub total_duration_mins: i64,
    pub steps: Vec<String>,
    pub navigation_url: String,
    pub status: RouteStatus,
}

impl Route {
    /// A route that cannot be computed yet. Carries the stops known so far
    /// but no distance, duration, steps or link.
    pub fn incomplete(stops: Vec<Stop>) -> Self {
        Self {
            stops,
            legs: Vec::new(),
            total_distance_miles: 0.0,
            travel_mins: 0,
            dwell_mins: 0,
            total_duration_mins: 0,
            steps: Vec::new(),
            navigation_url: String::new(),
            status: RouteStatus::Incomplete,
        }
    }

    pub fn total_duration(&self) -> Duration {
        Duration::minutes(self.total_duration_mins)
    }

    pub fn origin(&self) -> Option<&Stop> {
        self.stops.iter().find(|s| s.kind == StopKind::Origin)
    }

    pub fn destination(&self) -> Option<&Stop> {
        self.stops.iter().find(|s| s.kind == StopKind::Destination)
    }

    /// Stops between the anchors, in traversal order.
    pub fn waypoints(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter().filter(|s| !s.is_anchor())
    }

    /// Human-readable total duration.
    pub fn duration_text(&self) -> String {
        format_drive_time(self.total_duration_mins)
    }

    /// Estimated arrival at each stop after the origin, given a departure
    /// time.
    ///
    /// Uses per-leg durations when the provider supplied them; otherwise
    /// travel time is spread across legs in proportion to their count.
    pub fn stop_etas(&self, departure: NaiveDateTime) -> Vec<(StopId, NaiveDateTime)> {
        if self.stops.len() < 2 {
            return Vec::new();
        }

        let leg_count = self.stops.len() - 1;
        let leg_mins: Vec<i64> = if self.legs.len() == leg_count {
            self.legs.iter().map(|l| l.duration_mins).collect()
        } else {
            spread_evenly(self.travel_mins, leg_count)
        };

        let mut etas = Vec::with_capacity(leg_count);
        let mut clock = departure;
        for (i, stop) in self.stops.iter().enumerate().skip(1) {
            clock += Duration::minutes(leg_mins[i - 1]);
            etas.push((stop.id, clock));
            clock += Duration::minutes(i64::from(stop.estimated_dwell_minutes));
        }

        etas
    }

    /// Summary handed to the task/event store.
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            total_distance_miles: self.total_distance_miles,
            total_duration_mins: self.total_duration_mins,
            stop_count: self.stops.len(),
            navigation_url: self.navigation_url.clone(),
            status: self.status,
        }
    }
}

/// The last computed route, as persisted alongside the stop list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub total_distance_miles: f64,
    pub total_duration_mins: i64,
    pub stop_count: usize,
    pub navigation_url: String,
    pub status: RouteStatus,
}

/// Split `total` minutes across `parts` legs, earlier legs taking the
/// remainder.
fn spread_evenly(total: i64, parts: usize) -> Vec<i64> {
    let parts_i = parts as i64;
    let base = total / parts_i;
    let remainder = total % parts_i;
    (0..parts_i)
        .map(|i| base + i64::from(i < remainder))
        .collect()
}

/// Format a drive time as `"25 min"`, `"1h 5m"` or `"2h"`.
pub fn format_drive_time(total_minutes: i64) -> String {
    if total_minutes < 60 {
        return format!("{total_minutes} min");
    }
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if minutes > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{hours}h")
    }
}
