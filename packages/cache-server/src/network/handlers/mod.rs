//! HTTP handler definitions for the cache server's ambient health surface.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports the handler functions used to build the
//! router.

pub mod health;

pub use health::{health_handler, liveness_handler, readiness_handler};

use std::sync::Arc;
use std::time::Instant;

use ims_cache_core::Trail;

use super::ShutdownController;
use crate::service::config::CacheConfig;
use crate::service::processor::CacheProcessor;

/// Shared application state passed to all axum handlers via `State` extraction.
#[derive(Clone)]
pub struct AppState {
    /// The cache processor whose queue depth feeds the health report.
    pub processor: Arc<CacheProcessor>,
    /// Graceful shutdown controller with health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Process-wide configuration.
    pub config: Arc<CacheConfig>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// A trail value reserved for requests originating from the ambient
    /// HTTP surface rather than a Diameter transaction.
    pub const HTTP_TRAIL: Trail = Trail::NONE;
}
