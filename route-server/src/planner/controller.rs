//! Debounced route recompute.
//!
//! [`RouteController`] is the single owner of one trip's [`RouteComposer`].
//! Every edit goes through it; after each edit it (re)starts a debounce
//! timer, and only when the stops have been quiet for the debounce window
//! does it ask the resolver for directions. Newer edits abort the pending
//! recompute. Computed routes are published on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::{Anchor, PlanningError, Route, Stop, StopId};
use crate::resolver::AddressResolver;

use super::compose::{RouteComposer, route_or_estimate};
use super::config::PlannerConfig;

/// Async owner of a [`RouteComposer`].
pub struct RouteController {
    composer: Arc<Mutex<RouteComposer>>,
    resolver: Arc<dyn AddressResolver>,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    updates: watch::Sender<Route>,
}

impl RouteController {
    pub fn new(composer: RouteComposer, resolver: Arc<dyn AddressResolver>, config: &PlannerConfig) -> Self {
        let (updates, _) = watch::channel(composer.route().clone());
        Self {
            composer: Arc::new(Mutex::new(composer)),
            resolver,
            debounce: config.debounce(),
            pending: Mutex::new(None),
            updates,
        }
    }

    /// Receive every published route: edits publish the pending state,
    /// commits publish the computed route.
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.updates.subscribe()
    }

    /// Snapshot of the current route.
    pub async fn route(&self) -> Route {
        self.composer.lock().await.route().clone()
    }

    /// Apply an edit and schedule a recompute.
    pub async fn edit<R>(&self, f: impl FnOnce(&mut RouteComposer) -> R) -> R {
        let result = {
            let mut composer = self.composer.lock().await;
            let result = f(&mut composer);
            self.updates.send_replace(composer.route().clone());
            result
        };
        self.schedule_recompute().await;
        result
    }

    pub async fn set_anchor(&self, anchor: Anchor, address: impl Into<String>) -> StopId {
        let address = address.into();
        self.edit(|c| c.set_anchor(anchor, address)).await
    }

    pub async fn add_stop(&self, stop: Stop) -> StopId {
        self.edit(|c| c.add_stop(stop)).await
    }

    pub async fn remove_stop(&self, id: StopId) -> Result<Stop, PlanningError> {
        self.edit(|c| c.remove_stop(id)).await
    }

    pub async fn reorder(&self, id: StopId, new_index: usize) -> Result<(), PlanningError> {
        self.edit(|c| c.reorder(id, new_index)).await
    }

    pub async fn update_address(&self, id: StopId, address: impl Into<String>) -> Result<(), PlanningError> {
        let address = address.into();
        self.edit(|c| c.update_address(id, address)).await
    }

    /// Abort any pending recompute and start a new debounce window.
    async fn schedule_recompute(&self) {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let composer = self.composer.clone();
        let resolver = self.resolver.clone();
        let updates = self.updates.clone();
        let debounce = self.debounce;

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let ticket = {
                let mut composer = composer.lock().await;
                let Some(ticket) = composer.begin_recompute() else {
                    return;
                };
                updates.send_replace(composer.route().clone());
                ticket
            };

            // Lock released while directions are in flight
            let info = route_or_estimate(resolver.as_ref(), &ticket).await;

            let mut composer = composer.lock().await;
            match composer.commit(ticket, info) {
                Ok(route) => {
                    updates.send_replace(route.clone());
                }
                Err(e) => debug!(error = %e, "recompute superseded"),
            }
        }));
    }
}

impl Drop for RouteController {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
