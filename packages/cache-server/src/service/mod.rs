//! The cache server's service layer.
//!
//! - [`config`]: process-wide configuration (`CacheConfig`)
//! - [`reconciler`]: the IRS Reconciler (component D) -- read/write/delete
//!   paths over the Blob Store Interface
//! - [`worker`]: the bounded worker pool the Cache Processor runs jobs on
//! - [`processor`]: the Cache Processor (component E) -- the async façade
//!   submitting reconciliation jobs to the worker pool
//! - [`hss`]: the HSS collaborator contract (component F's dependency)
//! - [`orchestrator`]: the HSS Orchestrator (component F) -- per-request
//!   dispatch and HSS-answer-to-status mapping
//! - [`metrics`]: named wrappers over the `metrics` crate's macros

pub mod config;
pub mod hss;
pub mod metrics;
pub mod orchestrator;
pub mod processor;
pub mod reconciler;
pub mod worker;

pub use config::CacheConfig;
pub use orchestrator::{Orchestrator, OrchestratorStatus, RequestType};
pub use processor::{CacheProcessor, JobStatus};
pub use reconciler::{DeleteIrsOutcome, GetIrsResult, PutIrsOutcome, Reconciler};
