//! Web layer for the trip planner.
//!
//! Provides HTTP endpoints for suggestions, route composition, detour
//! pricing and smart stops.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
