//! Domain types for trip planning.
//!
//! Stops, routes, suggestions and trip schedules. These types carry no I/O;
//! the planner and resolver layers build on them.

mod error;
mod geo;
mod route;
mod schedule;
mod stop;
mod suggestion;

pub use error::PlanningError;
pub use geo::{Coordinates, DEFAULT_ROAD_FACTOR, synthetic_coordinates};
pub use route::{Route, RouteLeg, RouteStatus, RouteSummary, format_drive_time};
pub use schedule::{TimeAuthority, TripSchedule};
pub use stop::{Anchor, PersistedStop, PlaceMetadata, Stop, StopId, StopKind};
pub use suggestion::{SavedLocation, SuggestionResult, SuggestionSource, normalize_address};

pub(crate) use suggestion::text_matches;
