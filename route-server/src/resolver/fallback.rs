//! Primary provider with a local fallback.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::Stop;

use super::capability::AddressResolver;
use super::error::ResolverError;
use super::local::LocalResolver;
use super::types::{AddressPrediction, LocationBias, PlaceCandidate, RouteInfo};

/// Resolver that asks the live provider first and answers from the local
/// catalog when it fails.
///
/// With no primary configured every call goes straight to the local
/// catalog. Autocomplete has no local equivalent and yields nothing on
/// failure.
#[derive(Clone)]
pub struct FallbackResolver {
    primary: Option<Arc<dyn AddressResolver>>,
    local: LocalResolver,
}

impl FallbackResolver {
    pub fn new(primary: Arc<dyn AddressResolver>, local: LocalResolver) -> Self {
        Self {
            primary: Some(primary),
            local,
        }
    }

    /// Local-only resolver.
    pub fn local_only(local: LocalResolver) -> Self {
        Self {
            primary: None,
            local,
        }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn local(&self) -> &LocalResolver {
        &self.local
    }
}

#[async_trait]
impl AddressResolver for FallbackResolver {
    fn name(&self) -> &'static str {
        match &self.primary {
            Some(p) => p.name(),
            None => self.local.name(),
        }
    }

    async fn search(
        &self,
        query: &str,
        bias: Option<&LocationBias>,
    ) -> Result<Vec<PlaceCandidate>, ResolverError> {
        if let Some(primary) = &self.primary {
            match primary.search(query, bias).await {
                Ok(places) => return Ok(places),
                Err(e) => {
                    warn!(provider = primary.name(), error = %e, "place search failed, using local catalog");
                }
            }
        }
        Ok(self.local.search_catalog(query))
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<AddressPrediction>, ResolverError> {
        let Some(primary) = &self.primary else {
            return Ok(Vec::new());
        };
        match primary.autocomplete(query).await {
            Ok(predictions) => Ok(predictions),
            Err(e) => {
                warn!(provider = primary.name(), error = %e, "autocomplete failed");
                Ok(Vec::new())
            }
        }
    }

    async fn route(
        &self,
        origin: &Stop,
        destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RouteInfo, ResolverError> {
        if let Some(primary) = &self.primary {
            match primary.route(origin, destination, waypoints).await {
                Ok(info) => return Ok(info),
                Err(e) => {
                    warn!(provider = primary.name(), error = %e, "directions failed, estimating locally");
                }
            }
        }
        Ok(self.local.estimate_route(origin, destination, waypoints))
    }
}
