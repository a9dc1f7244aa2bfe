//! Application state for the web layer.

use std::sync::Arc;

use crate::navigation::NavigationLinkBuilder;
use crate::planner::{PlannerConfig, StopTimeEstimator};
use crate::resolver::AddressResolver;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Place search and directions (usually cached, with local fallback)
    pub resolver: Arc<dyn AddressResolver>,

    /// Planner configuration
    pub config: Arc<PlannerConfig>,

    /// Directions link generator
    pub nav: NavigationLinkBuilder,

    /// Dwell time rules
    pub estimator: Arc<StopTimeEstimator>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(resolver: Arc<dyn AddressResolver>, config: PlannerConfig, nav: NavigationLinkBuilder) -> Self {
        Self {
            resolver,
            config: Arc::new(config),
            nav,
            estimator: Arc::new(StopTimeEstimator::default()),
        }
    }
}
