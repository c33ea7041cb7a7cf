//! The ambient HTTP surface: health/readiness handlers and shutdown control.
//!
//! Diameter wire handling and XML rendering are the provisioning front
//! end's job, not this crate's; the only outward-facing transport here is
//! the small JSON health/readiness API orchestrators poll.

pub mod handlers;
pub mod shutdown;

pub use handlers::AppState;
pub use shutdown::{HealthState, InFlightGuard, ShutdownController};

use axum::routing::get;
use axum::Router;

/// Builds the health/readiness router mounted by the server binary.
#[must_use]
pub fn health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/healthz/live", get(handlers::liveness_handler))
        .route("/healthz/ready", get(handlers::readiness_handler))
        .with_state(state)
}
