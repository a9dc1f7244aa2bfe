//! Unit tests for route composition.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use super::*;
use crate::resolver::testing::ScriptedResolver;

fn nav() -> NavigationLinkBuilder {
    NavigationLinkBuilder::new("scheme://dir")
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 4, 11)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn anchored() -> RouteComposer {
    let mut composer = RouteComposer::new(nav());
    composer.set_anchor(Anchor::Origin, "100 A St");
    composer.set_anchor(Anchor::Destination, "200 B Ave");
    composer
}

fn info(minutes: i64) -> RouteInfo {
    RouteInfo {
        distance_miles: 10.0,
        duration_mins: minutes,
        steps: vec!["Head north".to_string()],
        legs: Vec::new(),
    }
}

fn local() -> LocalResolver {
    LocalResolver::default()
}

#[tokio::test]
async fn anchors_only_route() {
    let mut composer = anchored();
    let route = composer.compute(&local()).await.unwrap().clone();

    assert_eq!(route.status, RouteStatus::Ready);
    assert_eq!(route.navigation_url, "scheme://dir/100%20A%20St/200%20B%20Ave");
    assert_eq!(route.steps.first().map(String::as_str), Some("Depart from 100 A St"));
    assert_eq!(route.steps.last().map(String::as_str), Some("Arrive at 200 B Ave"));
    assert!(!route.steps.iter().any(|s| s.starts_with("Stop ")));
    assert_eq!(route.stops.len(), 2);
    assert_eq!(nav().decode_segments(&route.navigation_url).unwrap().len(), 2);
}

#[tokio::test]
async fn missing_anchor_is_incomplete() {
    let mut composer = RouteComposer::new(nav());
    assert_eq!(composer.status(), RouteStatus::Incomplete);

    composer.set_anchor(Anchor::Origin, "100 A St");
    assert_eq!(composer.status(), RouteStatus::Incomplete);
    assert_eq!(composer.navigation_url(), "");
    assert_eq!(composer.route().total_duration_mins, 0);
    assert!(composer.begin_recompute().is_none());
    assert_eq!(
        composer.compute(&local()).await.unwrap_err(),
        PlanningError::IncompleteRoute
    );
}

#[tokio::test]
async fn blank_anchor_is_incomplete() {
    let mut composer = anchored();
    composer.compute(&local()).await.unwrap();

    let origin = composer.origin().unwrap().id;
    composer.update_address(origin, "   ").unwrap();

    assert_eq!(composer.status(), RouteStatus::Incomplete);
    assert_eq!(composer.navigation_url(), "");
    assert!(composer.route().steps.is_empty());
    assert_eq!(composer.route().total_distance_miles, 0.0);
}

#[tokio::test]
async fn status_lifecycle() {
    let mut composer = RouteComposer::new(nav());
    composer.set_anchor(Anchor::Origin, "100 A St");
    assert_eq!(composer.status(), RouteStatus::Incomplete);

    composer.set_anchor(Anchor::Destination, "200 B Ave");
    assert_eq!(composer.status(), RouteStatus::Computing);

    composer.compute(&local()).await.unwrap();
    assert_eq!(composer.status(), RouteStatus::Ready);

    composer.add_stop(Stop::waypoint("50 Mid Rd"));
    assert_eq!(composer.status(), RouteStatus::Stale);

    let ticket = composer.begin_recompute().unwrap();
    assert_eq!(composer.status(), RouteStatus::Computing);

    composer.commit(ticket, info(20)).unwrap();
    assert_eq!(composer.status(), RouteStatus::Ready);
}

#[test]
fn stale_commit_is_discarded() {
    let mut composer = anchored();
    let ticket = composer.begin_recompute().unwrap();
    let issued = ticket.generation;

    composer.add_stop(Stop::waypoint("50 Mid Rd"));
    let err = composer.commit(ticket, info(20)).unwrap_err();

    assert_eq!(
        err,
        PlanningError::StaleResponseDiscarded {
            issued,
            current: issued + 1
        }
    );
    assert_eq!(composer.status(), RouteStatus::Stale);
    assert!(composer.route().steps.is_empty());

    // A fresh ticket succeeds
    let ticket = composer.begin_recompute().unwrap();
    assert!(composer.commit(ticket, info(20)).is_ok());
}

#[tokio::test]
async fn add_then_remove_restores_totals() {
    let mut composer = anchored();
    let before = composer.compute(&local()).await.unwrap().clone();

    let id = composer.add_estimated_stop(Stop::waypoint("789 Pine St, Anytown, ST 12345").with_name("Starbucks"));
    let with_stop = composer.compute(&local()).await.unwrap().clone();
    assert_eq!(with_stop.stops.len(), 3);
    assert!(with_stop.total_duration_mins > before.total_duration_mins);

    composer.remove_stop(id).unwrap();
    let after = composer.compute(&local()).await.unwrap().clone();

    assert_eq!(after.total_distance_miles, before.total_distance_miles);
    assert_eq!(after.total_duration_mins, before.total_duration_mins);
    assert_eq!(after.navigation_url, before.navigation_url);
}

#[tokio::test]
async fn total_is_travel_plus_dwell() {
    let mut composer = anchored();
    composer.add_estimated_stop(Stop::waypoint("1 Bean St").with_name("Starbucks"));
    composer.add_stop(Stop::waypoint("2 Fuel Rd").with_dwell_minutes(7));

    let route = composer.compute(&local()).await.unwrap();
    // Starbucks is classified as coffee, 12 minutes
    assert_eq!(route.dwell_mins, 12 + 7);
    assert_eq!(route.total_duration_mins, route.travel_mins + route.dwell_mins);
    let leg_sum: i64 = route.legs.iter().map(|l| l.duration_mins).sum();
    assert_eq!(route.travel_mins, leg_sum);
}

#[test]
fn origin_dwell_is_not_counted() {
    let mut composer = anchored();
    let ticket = composer.begin_recompute().unwrap();
    let mut ticket_with_dwell = ticket.clone();
    ticket_with_dwell.origin.estimated_dwell_minutes = 30;
    ticket_with_dwell.destination.estimated_dwell_minutes = 5;

    let route = composer.commit(ticket_with_dwell, info(20)).unwrap();
    assert_eq!(route.dwell_mins, 5);
    assert_eq!(route.total_duration_mins, 25);
}

#[tokio::test]
async fn reorder_changes_traversal_order() {
    let resolver = Arc::new(ScriptedResolver::new());
    let mut composer = anchored();
    let a = composer.add_stop(Stop::waypoint("1 First St"));
    composer.add_stop(Stop::waypoint("2 Second St"));
    let c = composer.add_stop(Stop::waypoint("3 Third St"));

    composer.reorder(c, 0).unwrap();
    composer.compute(resolver.as_ref()).await.unwrap();
    assert_eq!(resolver.last_waypoints(), vec!["3 Third St", "1 First St", "2 Second St"]);

    // Past the end moves to the end
    composer.reorder(a, 99).unwrap();
    let route = composer.compute(resolver.as_ref()).await.unwrap();
    assert_eq!(
        route.navigation_url,
        "scheme://dir/100%20A%20St/3%20Third%20St/2%20Second%20St/1%20First%20St/200%20B%20Ave"
    );
}

#[test]
fn anchors_cannot_be_moved_or_removed() {
    let mut composer = anchored();
    let origin = composer.origin().unwrap().id;
    let destination = composer.destination().unwrap().id;

    assert_eq!(composer.remove_stop(origin).unwrap_err(), PlanningError::AnchorImmutable(origin));
    assert_eq!(
        composer.reorder(destination, 0).unwrap_err(),
        PlanningError::AnchorImmutable(destination)
    );
    assert_eq!(
        composer.remove_stop(StopId(404)).unwrap_err(),
        PlanningError::UnknownStop(StopId(404))
    );
    assert_eq!(
        composer.update_address(StopId(404), "x").unwrap_err(),
        PlanningError::UnknownStop(StopId(404))
    );
    // Rejected edits leave the generation alone
    let generation = composer.generation();
    let _ = composer.remove_stop(origin);
    assert_eq!(composer.generation(), generation);
}

#[test]
fn add_stop_demotes_anchor_kinds() {
    let mut composer = anchored();
    let id = composer.add_stop(Stop::new(StopKind::Origin, "9 Sneaky Rd"));
    assert_eq!(composer.stop(id).unwrap().kind, StopKind::Waypoint);
    assert_eq!(composer.origin().unwrap().address, "100 A St");
}

#[test]
fn add_estimated_stop_classifies_by_name() {
    let mut composer = anchored();
    let coffee = composer.add_estimated_stop(Stop::waypoint("1 Bean St").with_name("Dunkin'"));
    let plain = composer.add_estimated_stop(Stop::waypoint("5 Elm St"));
    let fixed = composer.add_stop(Stop::waypoint("6 Elm St").with_dwell_minutes(3));

    assert_eq!(composer.stop(coffee).unwrap().estimated_dwell_minutes, 12);
    assert_eq!(composer.stop(plain).unwrap().estimated_dwell_minutes, 20);
    assert_eq!(composer.stop(fixed).unwrap().estimated_dwell_minutes, 3);
}

#[test]
fn explicit_zero_dwell_is_kept() {
    let mut composer = anchored();
    let pickup = composer.add_stop(Stop::waypoint("Pick up Sam at 5 Elm St").with_dwell_minutes(0));
    assert_eq!(composer.stop(pickup).unwrap().estimated_dwell_minutes, 0);

    let ticket = composer.begin_recompute().unwrap();
    let route = composer.commit(ticket, info(20)).unwrap();
    assert_eq!(route.dwell_mins, 0);
    assert_eq!(route.total_duration_mins, 20);
}

#[test]
fn destination_dwell_is_editable() {
    let mut composer = anchored();
    let origin = composer.origin().unwrap().id;
    let destination = composer.destination().unwrap().id;

    composer.set_dwell(destination, 15).unwrap();
    assert_eq!(composer.destination().unwrap().estimated_dwell_minutes, 15);

    let ticket = composer.begin_recompute().unwrap();
    let route = composer.commit(ticket, info(20)).unwrap();
    assert_eq!(route.dwell_mins, 15);
    assert_eq!(route.total_duration_mins, 35);

    // Origin dwell never counts, so it cannot be set
    assert_eq!(composer.set_dwell(origin, 5).unwrap_err(), PlanningError::AnchorImmutable(origin));
}

#[tokio::test]
async fn blank_waypoints_are_skipped() {
    let mut composer = anchored();
    composer.add_stop(Stop::waypoint("   "));
    let route = composer.compute(&local()).await.unwrap();

    assert_eq!(route.stops.len(), 2);
    assert_eq!(route.navigation_url, "scheme://dir/100%20A%20St/200%20B%20Ave");
    assert_eq!(composer.waypoints().len(), 1);
}

#[test]
fn update_address_drops_place_details() {
    let mut composer = anchored();
    let id = composer.add_stop(
        Stop::new(StopKind::Place, "789 Pine St")
            .with_name("Starbucks")
            .with_place("starbucks_1", Some(4.3))
            .with_coordinates(crate::domain::Coordinates::new(42.0, -71.0)),
    );
    composer.update_address(id, "12 New Rd").unwrap();

    let stop = composer.stop(id).unwrap();
    assert_eq!(stop.address, "12 New Rd");
    assert!(stop.coordinates.is_none());
    assert!(stop.place_metadata.is_none());
    assert!(stop.name.is_none());
}

#[test]
fn arrival_back_propagates_and_round_trips() {
    let mut composer = anchored();
    let ticket = composer.begin_recompute().unwrap();
    composer.commit(ticket, info(35)).unwrap();

    composer.set_arrival(at(17, 0));
    assert_eq!(composer.schedule().departure(), Some(at(16, 25)));

    composer.set_time_authority(TimeAuthority::Departure);
    composer.set_departure(at(16, 25));
    assert_eq!(composer.schedule().arrival(), Some(at(17, 0)));
}

#[test]
fn clearing_an_anchor_keeps_derived_time() {
    let mut composer = anchored();
    let ticket = composer.begin_recompute().unwrap();
    composer.commit(ticket, info(35)).unwrap();
    composer.set_arrival(at(17, 0));
    assert_eq!(composer.schedule().departure(), Some(at(16, 25)));

    let destination = composer.destination().unwrap().id;
    composer.update_address(destination, "  ").unwrap();
    assert_eq!(composer.status(), RouteStatus::Incomplete);
    assert_eq!(composer.schedule().departure(), Some(at(16, 25)));
    assert_eq!(composer.schedule().arrival(), Some(at(17, 0)));
}

#[test]
fn recompute_rederives_dependent_time() {
    let mut composer = anchored();
    composer.set_departure(at(9, 0));

    let ticket = composer.begin_recompute().unwrap();
    composer.commit(ticket, info(40)).unwrap();
    assert_eq!(composer.schedule().arrival(), Some(at(9, 40)));

    composer.add_stop(Stop::waypoint("1 Bean St").with_dwell_minutes(15));
    let ticket = composer.begin_recompute().unwrap();
    composer.commit(ticket, info(50)).unwrap();
    assert_eq!(composer.schedule().departure(), Some(at(9, 0)));
    assert_eq!(composer.schedule().arrival(), Some(at(10, 5)));
}

#[test]
fn stop_etas_follow_departure() {
    let mut composer = anchored();
    assert!(composer.stop_etas().is_empty());

    composer.add_stop(Stop::waypoint("1 Bean St").with_dwell_minutes(10));
    let ticket = composer.begin_recompute().unwrap();
    let mut route_info = info(30);
    route_info.legs = vec![
        crate::domain::RouteLeg {
            distance_miles: 4.0,
            duration_mins: 12,
        },
        crate::domain::RouteLeg {
            distance_miles: 6.0,
            duration_mins: 18,
        },
    ];
    composer.commit(ticket, route_info).unwrap();
    composer.set_departure(at(8, 0));

    let etas = composer.stop_etas();
    assert_eq!(etas.len(), 2);
    assert_eq!(etas[0].1, at(8, 12));
    assert_eq!(etas[1].1, at(8, 40));
}

#[tokio::test]
async fn failing_provider_estimates_locally() {
    let resolver = ScriptedResolver::new().failing();
    let mut composer = anchored();
    let route = composer.compute(&resolver).await.unwrap();

    assert_eq!(route.status, RouteStatus::Ready);
    assert!(route.total_distance_miles > 0.0);
    assert_eq!(resolver.route_calls(), 1);
}

#[test]
fn persisted_round_trip() {
    let mut composer = anchored();
    composer.add_stop(Stop::waypoint("1 Bean St").with_name("Starbucks").with_place("starbucks_1", Some(4.3)));
    composer.add_stop(Stop::waypoint("5 Elm St").with_dwell_minutes(9));

    let persisted = composer.persisted_stops();
    assert_eq!(persisted.len(), 4);
    assert_eq!(persisted[1].place_id.as_deref(), Some("starbucks_1"));
    assert_eq!(persisted[3].order, 3);

    // Order, not position in the list, decides placement
    let mut shuffled = persisted.clone();
    shuffled.reverse();
    let restored = RouteComposer::from_persisted(nav(), shuffled);

    assert_eq!(restored.origin().unwrap().address, "100 A St");
    assert_eq!(restored.destination().unwrap().address, "200 B Ave");
    assert_eq!(restored.waypoints()[0].kind, StopKind::Place);
    assert_eq!(restored.waypoints()[1].kind, StopKind::Waypoint);
    assert_eq!(restored.status(), RouteStatus::Computing);
    assert_eq!(restored.persisted_stops(), persisted);
}
