//! Address resolution: place search, autocomplete and directions.
//!
//! Everything the planner needs from the outside world goes through the
//! [`AddressResolver`] trait. Implementations:
//! - [`HttpResolver`] talks to a live JSON provider
//! - [`LocalResolver`] answers from a static catalog with straight-line
//!   distance estimates
//! - [`FallbackResolver`] tries a primary and drops to the local catalog on
//!   error
//!
//! Provider failures never surface to the user as errors; they degrade to
//! fewer results or estimated geometry.

mod capability;
mod client;
mod error;
mod fallback;
mod local;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use capability::AddressResolver;
pub use client::{HttpResolver, ResolverConfig};
pub use error::ResolverError;
pub use fallback::FallbackResolver;
pub use local::{LocalResolver, LocalResolverBuilder, anytown_catalog};
pub use types::{AddressPrediction, DEFAULT_BIAS_RADIUS_METERS, LocationBias, PlaceCandidate, RouteInfo};
