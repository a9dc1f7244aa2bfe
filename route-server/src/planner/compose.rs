//! Route composition.
//!
//! [`RouteComposer`] owns the ordered stop list of one trip: an origin, a
//! destination and the waypoints between them. Edits never compute a route
//! directly. They bump a generation counter and move the route to
//! `Computing` (first complete route) or `Stale` (a computed route that no
//! longer matches the stops). A recompute is a two-step exchange:
//!
//! 1. [`RouteComposer::begin_recompute`] snapshots the stops into a
//!    [`RecomputeTicket`] carrying the current generation
//! 2. the caller asks a resolver for directions and hands the answer to
//!    [`RouteComposer::commit`], which rejects it if any edit happened in
//!    between
//!
//! Keeping the resolver call outside the composer lets the controller
//! release its lock while directions are in flight.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::domain::{
    Anchor, PersistedStop, PlanningError, Route, RouteStatus, RouteSummary, Stop, StopId,
    StopKind, TimeAuthority, TripSchedule,
};
use crate::navigation::NavigationLinkBuilder;
use crate::resolver::{AddressResolver, LocalResolver, RouteInfo};

use super::dwell::StopTimeEstimator;

/// Snapshot of the stops a recompute was started for.
#[derive(Debug, Clone, PartialEq)]
pub struct RecomputeTicket {
    pub generation: u64,
    pub origin: Stop,
    pub destination: Stop,
    /// Non-blank waypoints in traversal order.
    pub waypoints: Vec<Stop>,
}

impl RecomputeTicket {
    /// All stops in traversal order.
    pub fn stops(&self) -> Vec<Stop> {
        let mut stops = Vec::with_capacity(self.waypoints.len() + 2);
        stops.push(self.origin.clone());
        stops.extend(self.waypoints.iter().cloned());
        stops.push(self.destination.clone());
        stops
    }
}

/// Ask `resolver` for directions, estimating locally if it fails.
pub async fn route_or_estimate(resolver: &dyn AddressResolver, ticket: &RecomputeTicket) -> RouteInfo {
    match resolver
        .route(&ticket.origin, &ticket.destination, &ticket.waypoints)
        .await
    {
        Ok(info) => info,
        Err(e) => {
            let err = PlanningError::from(e);
            warn!(provider = resolver.name(), error = %err, generation = ticket.generation, "estimating route locally");
            LocalResolver::default().estimate_route(&ticket.origin, &ticket.destination, &ticket.waypoints)
        }
    }
}

/// Ordered stop list with recompute bookkeeping.
#[derive(Debug, Clone)]
pub struct RouteComposer {
    origin: Option<Stop>,
    destination: Option<Stop>,
    waypoints: Vec<Stop>,
    next_id: u64,
    generation: u64,
    route: Route,
    schedule: TripSchedule,
    nav: NavigationLinkBuilder,
    estimator: StopTimeEstimator,
}

impl Default for RouteComposer {
    fn default() -> Self {
        Self::new(NavigationLinkBuilder::default())
    }
}

impl RouteComposer {
    pub fn new(nav: NavigationLinkBuilder) -> Self {
        Self {
            origin: None,
            destination: None,
            waypoints: Vec::new(),
            next_id: 1,
            generation: 0,
            route: Route::incomplete(Vec::new()),
            schedule: TripSchedule::new(),
            nav,
            estimator: StopTimeEstimator::default(),
        }
    }

    /// Use `estimator` for stops added with [`Self::add_estimated_stop`].
    pub fn with_estimator(mut self, estimator: StopTimeEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Rebuild a composer from a stored stop list.
    ///
    /// Entries are placed by `order`; the first becomes the origin and the
    /// last the destination. Entries with a place id become place stops.
    pub fn from_persisted(nav: NavigationLinkBuilder, mut persisted: Vec<PersistedStop>) -> Self {
        persisted.sort_by_key(|p| p.order);
        let mut composer = Self::new(nav);
        let last = persisted.len().saturating_sub(1);

        for (i, p) in persisted.into_iter().enumerate() {
            let kind = if i == 0 {
                StopKind::Origin
            } else if i == last {
                StopKind::Destination
            } else if p.place_id.is_some() {
                StopKind::Place
            } else {
                StopKind::Waypoint
            };
            let mut stop = Stop::new(kind, p.address).with_dwell_minutes(p.estimated_dwell_minutes);
            stop.name = p.name;
            if let Some(place_id) = p.place_id {
                stop = stop.with_place(place_id, None);
            }
            stop.id = composer.allocate_id();
            match kind {
                StopKind::Origin => composer.origin = Some(stop),
                StopKind::Destination => composer.destination = Some(stop),
                _ => composer.waypoints.push(stop),
            }
        }

        composer.mark_edited();
        composer
    }

    fn allocate_id(&mut self) -> StopId {
        let id = StopId(self.next_id);
        self.next_id += 1;
        id
    }

    // ---- queries ----

    pub fn origin(&self) -> Option<&Stop> {
        self.origin.as_ref()
    }

    pub fn destination(&self) -> Option<&Stop> {
        self.destination.as_ref()
    }

    pub fn waypoints(&self) -> &[Stop] {
        &self.waypoints
    }

    /// Current stops in traversal order, including blank waypoints.
    pub fn stops(&self) -> Vec<&Stop> {
        self.origin
            .iter()
            .chain(self.waypoints.iter())
            .chain(self.destination.iter())
            .collect()
    }

    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.stops().into_iter().find(|s| s.id == id)
    }

    /// Both anchors present with non-blank addresses.
    pub fn is_complete(&self) -> bool {
        let usable = |s: &Option<Stop>| s.as_ref().is_some_and(|s| !s.is_blank());
        usable(&self.origin) && usable(&self.destination)
    }

    /// The last computed route, or an incomplete placeholder.
    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn status(&self) -> RouteStatus {
        self.route.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn schedule(&self) -> &TripSchedule {
        &self.schedule
    }

    pub fn navigation_url(&self) -> &str {
        &self.route.navigation_url
    }

    // ---- edits ----

    /// Set the origin or destination address, creating the anchor if
    /// needed. Returns the anchor's id.
    pub fn set_anchor(&mut self, anchor: Anchor, address: impl Into<String>) -> StopId {
        let address = address.into();
        let existing = match anchor {
            Anchor::Origin => self.origin.as_mut(),
            Anchor::Destination => self.destination.as_mut(),
        };
        let id = match existing {
            Some(stop) => {
                readdress(stop, address);
                stop.id
            }
            None => {
                let mut stop = Stop::new(anchor.kind(), address);
                stop.id = self.allocate_id();
                let id = stop.id;
                match anchor {
                    Anchor::Origin => self.origin = Some(stop),
                    Anchor::Destination => self.destination = Some(stop),
                }
                id
            }
        };
        self.mark_edited();
        id
    }

    /// Append a waypoint before the destination.
    ///
    /// The stop gets a fresh id and anchor kinds are demoted to waypoints.
    /// Its dwell time is kept as given, zero included.
    pub fn add_stop(&mut self, mut stop: Stop) -> StopId {
        if stop.is_anchor() {
            stop.kind = StopKind::Waypoint;
        }
        stop.id = self.allocate_id();
        let id = stop.id;
        self.waypoints.push(stop);
        self.mark_edited();
        id
    }

    /// Append a waypoint whose dwell time is estimated from its name.
    pub fn add_estimated_stop(&mut self, mut stop: Stop) -> StopId {
        let tags: &[&str] = &[];
        stop.estimated_dwell_minutes = self.estimator.estimate(stop.label(), tags);
        self.add_stop(stop)
    }

    fn waypoint_index(&self, id: StopId) -> Result<usize, PlanningError> {
        if let Some(i) = self.waypoints.iter().position(|s| s.id == id) {
            return Ok(i);
        }
        let is_anchor = [&self.origin, &self.destination]
            .into_iter()
            .flatten()
            .any(|s| s.id == id);
        if is_anchor {
            Err(PlanningError::AnchorImmutable(id))
        } else {
            Err(PlanningError::UnknownStop(id))
        }
    }

    /// Remove a waypoint. Anchors cannot be removed.
    pub fn remove_stop(&mut self, id: StopId) -> Result<Stop, PlanningError> {
        let index = self.waypoint_index(id)?;
        let stop = self.waypoints.remove(index);
        self.mark_edited();
        Ok(stop)
    }

    /// Move a waypoint to `new_index` among the waypoints. Out-of-range
    /// indices move it to the end.
    pub fn reorder(&mut self, id: StopId, new_index: usize) -> Result<(), PlanningError> {
        let index = self.waypoint_index(id)?;
        let target = new_index.min(self.waypoints.len() - 1);
        if index == target {
            return Ok(());
        }
        let stop = self.waypoints.remove(index);
        self.waypoints.insert(target, stop);
        self.mark_edited();
        Ok(())
    }

    /// Change the address of any stop, anchors included.
    ///
    /// Coordinates and place metadata (with the place's name) described the
    /// old address and are dropped.
    pub fn update_address(&mut self, id: StopId, address: impl Into<String>) -> Result<(), PlanningError> {
        let stop = self
            .origin
            .iter_mut()
            .chain(self.waypoints.iter_mut())
            .chain(self.destination.iter_mut())
            .find(|s| s.id == id)
            .ok_or(PlanningError::UnknownStop(id))?;
        readdress(stop, address.into());
        self.mark_edited();
        Ok(())
    }

    /// Change the dwell time of a waypoint or the destination.
    ///
    /// Time spent at the origin is never part of the trip, so the origin
    /// is rejected with `AnchorImmutable`.
    pub fn set_dwell(&mut self, id: StopId, minutes: u32) -> Result<(), PlanningError> {
        let is_destination = self.destination.as_ref().is_some_and(|d| d.id == id);
        let stop = if is_destination {
            self.destination.as_mut()
        } else {
            let index = self.waypoint_index(id)?;
            self.waypoints.get_mut(index)
        };
        if let Some(stop) = stop {
            stop.estimated_dwell_minutes = minutes;
        }
        self.mark_edited();
        Ok(())
    }

    fn mark_edited(&mut self) {
        self.generation += 1;
        if !self.is_complete() {
            let stops = self.stops().into_iter().cloned().collect();
            // The schedule keeps the last known duration until a route is
            // computed again
            self.route = Route::incomplete(stops);
            return;
        }
        self.route.status = match self.route.status {
            RouteStatus::Incomplete => RouteStatus::Computing,
            RouteStatus::Ready | RouteStatus::Computing | RouteStatus::Stale => RouteStatus::Stale,
        };
    }

    // ---- recompute ----

    /// Snapshot the stops for a recompute, or `None` while incomplete.
    pub fn begin_recompute(&mut self) -> Option<RecomputeTicket> {
        let (Some(origin), Some(destination)) = (&self.origin, &self.destination) else {
            return None;
        };
        if origin.is_blank() || destination.is_blank() {
            return None;
        }

        let ticket = RecomputeTicket {
            generation: self.generation,
            origin: origin.clone(),
            destination: destination.clone(),
            waypoints: self.waypoints.iter().filter(|s| !s.is_blank()).cloned().collect(),
        };
        self.route.status = RouteStatus::Computing;
        Some(ticket)
    }

    /// Install the directions for `ticket`.
    ///
    /// Fails with `StaleResponseDiscarded` if the stops changed after the
    /// ticket was issued; the current route is left untouched.
    pub fn commit(&mut self, ticket: RecomputeTicket, info: RouteInfo) -> Result<&Route, PlanningError> {
        if ticket.generation != self.generation {
            debug!(issued = ticket.generation, current = self.generation, "discarding stale route");
            return Err(PlanningError::StaleResponseDiscarded {
                issued: ticket.generation,
                current: self.generation,
            });
        }

        let stops = ticket.stops();
        let dwell_mins: i64 = stops
            .iter()
            .filter(|s| s.kind != StopKind::Origin)
            .map(|s| i64::from(s.estimated_dwell_minutes))
            .sum();
        let travel_mins = info.duration_mins.max(0);
        let navigation_url = self.nav.for_stops(&stops);

        self.route = Route {
            stops,
            legs: info.legs,
            total_distance_miles: info.distance_miles,
            travel_mins,
            dwell_mins,
            total_duration_mins: travel_mins + dwell_mins,
            steps: info.steps,
            navigation_url,
            status: RouteStatus::Ready,
        };
        self.schedule.apply_duration(self.route.total_duration_mins);

        debug!(
            generation = self.generation,
            stops = self.route.stops.len(),
            miles = self.route.total_distance_miles,
            minutes = self.route.total_duration_mins,
            "committed route"
        );
        Ok(&self.route)
    }

    /// Recompute immediately against `resolver`.
    pub async fn compute(&mut self, resolver: &dyn AddressResolver) -> Result<&Route, PlanningError> {
        let ticket = self.begin_recompute().ok_or(PlanningError::IncompleteRoute)?;
        let info = route_or_estimate(resolver, &ticket).await;
        self.commit(ticket, info)
    }

    // ---- schedule ----

    /// Arrive at `time`; departure is derived from the route duration.
    pub fn set_arrival(&mut self, time: NaiveDateTime) {
        self.schedule.set_arrival(time);
    }

    /// Leave at `time`; arrival is derived from the route duration.
    pub fn set_departure(&mut self, time: NaiveDateTime) {
        self.schedule.set_departure(time);
    }

    pub fn set_time_authority(&mut self, authority: TimeAuthority) {
        self.schedule.set_authority(authority);
    }

    /// Estimated arrival at each stop after the origin. Empty until a
    /// route is ready and a departure time is known.
    pub fn stop_etas(&self) -> Vec<(StopId, NaiveDateTime)> {
        match (self.route.status, self.schedule.departure()) {
            (RouteStatus::Ready, Some(departure)) => self.route.stop_etas(departure),
            _ => Vec::new(),
        }
    }

    // ---- persistence ----

    /// Current stops as handed to the task/event store.
    pub fn persisted_stops(&self) -> Vec<PersistedStop> {
        self.stops()
            .into_iter()
            .enumerate()
            .map(|(order, stop)| PersistedStop::from_stop(stop, order))
            .collect()
    }

    pub fn summary(&self) -> RouteSummary {
        self.route.summary()
    }
}

fn readdress(stop: &mut Stop, address: String) {
    if stop.address == address {
        return;
    }
    stop.address = address;
    stop.coordinates = None;
    // A place's name no longer applies once it points somewhere else
    if stop.place_metadata.take().is_some() {
        stop.name = None;
    }
}

#[cfg(test)]
#[path = "compose_tests.rs"]
mod tests;
