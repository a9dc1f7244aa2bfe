//! Caching layer for resolver responses.
//!
//! Typing a location fires a search per keystroke burst, and users often
//! retype or backspace into a query they already ran. Place searches and
//! autocomplete answers are cached by normalized query text. Directions are
//! not cached: they depend on the full ordered stop list and are already
//! debounced by the route controller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::Stop;
use crate::resolver::{
    AddressPrediction, AddressResolver, LocationBias, PlaceCandidate, ResolverError, RouteInfo,
};

/// Cache key for place searches: (normalized query, bias key).
type SearchKey = (String, String);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per kind.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 1000,
        }
    }
}

fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Resolver wrapper that caches successful searches.
///
/// Errors are never cached, so a transient outage is retried on the next
/// keystroke.
pub struct CachedResolver {
    inner: Arc<dyn AddressResolver>,
    searches: MokaCache<SearchKey, Arc<Vec<PlaceCandidate>>>,
    completions: MokaCache<String, Arc<Vec<AddressPrediction>>>,
}

impl CachedResolver {
    /// Create a new cached resolver.
    pub fn new(inner: Arc<dyn AddressResolver>, config: &CacheConfig) -> Self {
        let searches = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let completions = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            searches,
            completions,
        }
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.searches.entry_count() + self.completions.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.searches.invalidate_all();
        self.completions.invalidate_all();
    }
}

#[async_trait]
impl AddressResolver for CachedResolver {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn search(
        &self,
        query: &str,
        bias: Option<&LocationBias>,
    ) -> Result<Vec<PlaceCandidate>, ResolverError> {
        let key = (
            normalize_query(query),
            bias.map(LocationBias::cache_key).unwrap_or_default(),
        );

        // Try cache first
        if let Some(cached) = self.searches.get(&key).await {
            return Ok(cached.as_ref().clone());
        }

        let places = self.inner.search(query, bias).await?;
        self.searches.insert(key, Arc::new(places.clone())).await;
        Ok(places)
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<AddressPrediction>, ResolverError> {
        let key = normalize_query(query);
        if let Some(cached) = self.completions.get(&key).await {
            return Ok(cached.as_ref().clone());
        }

        let predictions = self.inner.autocomplete(query).await?;
        self.completions
            .insert(key, Arc::new(predictions.clone()))
            .await;
        Ok(predictions)
    }

    async fn route(
        &self,
        origin: &Stop,
        destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RouteInfo, ResolverError> {
        self.inner.route(origin, destination, waypoints).await
    }
}
