//! Departure/arrival back-propagation.
//!
//! Exactly one of the two times is authoritative. The other is always
//! derived from it and the route's total duration, using whole minutes so
//! that switching authority back and forth never drifts.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Which trip time the user set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeAuthority {
    Arrival,
    #[default]
    Departure,
}

/// Departure and arrival times of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TripSchedule {
    authority: TimeAuthority,
    departure: Option<NaiveDateTime>,
    arrival: Option<NaiveDateTime>,
    duration_mins: i64,
}

impl TripSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authority(&self) -> TimeAuthority {
        self.authority
    }

    pub fn departure(&self) -> Option<NaiveDateTime> {
        self.departure
    }

    pub fn arrival(&self) -> Option<NaiveDateTime> {
        self.arrival
    }

    pub fn duration_mins(&self) -> i64 {
        self.duration_mins
    }

    /// Make arrival authoritative at `time`; departure becomes
    /// `time - duration`.
    pub fn set_arrival(&mut self, time: NaiveDateTime) {
        self.authority = TimeAuthority::Arrival;
        self.arrival = Some(time);
        self.propagate();
    }

    /// Make departure authoritative at `time`; arrival becomes
    /// `time + duration`.
    pub fn set_departure(&mut self, time: NaiveDateTime) {
        self.authority = TimeAuthority::Departure;
        self.departure = Some(time);
        self.propagate();
    }

    /// Switch which field is authoritative without changing either value.
    pub fn set_authority(&mut self, authority: TimeAuthority) {
        self.authority = authority;
    }

    /// Clear both times.
    pub fn clear(&mut self) {
        self.departure = None;
        self.arrival = None;
    }

    /// Record a new total duration and re-derive the dependent time.
    pub fn apply_duration(&mut self, duration_mins: i64) {
        self.duration_mins = duration_mins;
        self.propagate();
    }

    fn propagate(&mut self) {
        let duration = Duration::minutes(self.duration_mins);
        match self.authority {
            TimeAuthority::Arrival => self.departure = self.arrival.map(|t| t - duration),
            TimeAuthority::Departure => self.arrival = self.departure.map(|t| t + duration),
        }
    }
}
