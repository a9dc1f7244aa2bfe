use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use route_server::cache::{CacheConfig, CachedResolver};
use route_server::navigation::{DEFAULT_NAV_BASE, NavigationLinkBuilder};
use route_server::planner::PlannerConfig;
use route_server::resolver::{AddressResolver, FallbackResolver, HttpResolver, LocalResolver, ResolverConfig};
use route_server::web::{AppState, create_router};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Live provider with local fallback if `PLACES_API_KEY` is set, otherwise
/// the local catalog alone.
fn build_resolver() -> Result<Arc<dyn AddressResolver>, Box<dyn std::error::Error>> {
    let local = LocalResolver::default();

    let fallback = match std::env::var("PLACES_API_KEY").ok().filter(|k| !k.trim().is_empty()) {
        Some(key) => {
            let mut config = ResolverConfig::new(key);
            if let Ok(base_url) = std::env::var("PLACES_BASE_URL") {
                config = config.with_base_url(base_url);
            }
            info!(base_url = %config.base_url, "using live places provider");
            FallbackResolver::new(Arc::new(HttpResolver::new(config)?), local)
        }
        None => {
            warn!("PLACES_API_KEY not set; answering from the local catalog");
            FallbackResolver::local_only(local)
        }
    };

    Ok(Arc::new(CachedResolver::new(Arc::new(fallback), &CacheConfig::default())))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("route_server=info")),
        )
        .init();

    let resolver = build_resolver()?;

    let nav_base = std::env::var("NAV_BASE_URL").unwrap_or_else(|_| DEFAULT_NAV_BASE.to_string());
    let nav = NavigationLinkBuilder::new(nav_base);

    let state = AppState::new(resolver, PlannerConfig::default(), nav);
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()?;
    info!(%addr, "trip planner listening");
    info!("  GET  /health                  - Health check");
    info!("  POST /api/suggestions         - Location suggestions");
    info!("  POST /api/suggestions/select  - Record a recent search");
    info!("  POST /api/route               - Compose and compute a route");
    info!("  POST /api/detour              - Price stops along a route");
    info!("  POST /api/smart-stops         - Smart stop suggestions");
    info!("  GET  /api/dwell               - Dwell time estimate");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
