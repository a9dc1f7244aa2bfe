//! The address resolver capability.

use async_trait::async_trait;

use crate::domain::Stop;

use super::error::ResolverError;
use super::types::{AddressPrediction, LocationBias, PlaceCandidate, RouteInfo};

/// Place search, address autocomplete and directions.
///
/// This abstraction lets the planner run against a live provider, the local
/// fallback table, or a test double.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Search for places matching `query`, optionally biased to a location.
    async fn search(
        &self,
        query: &str,
        bias: Option<&LocationBias>,
    ) -> Result<Vec<PlaceCandidate>, ResolverError>;

    /// Complete a partially typed street address.
    ///
    /// Providers without an autocomplete endpoint return nothing.
    async fn autocomplete(&self, _query: &str) -> Result<Vec<AddressPrediction>, ResolverError> {
        Ok(Vec::new())
    }

    /// Directions from `origin` through `waypoints` (in order) to
    /// `destination`.
    async fn route(
        &self,
        origin: &Stop,
        destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RouteInfo, ResolverError>;
}
