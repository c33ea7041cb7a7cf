//! IRS cache server: the Blob Store Interface, the IMPU Store, the IRS
//! Reconciler, the Cache Processor, and the HSS Orchestrator that sit in
//! front of a Home Subscriber Server for an IMS core.

pub mod network;
pub mod service;
pub mod storage;

pub use service::{CacheConfig, CacheProcessor, JobStatus, Orchestrator, OrchestratorStatus, Reconciler, RequestType};
pub use storage::{BlobStore, ImpuStore, Status, Table};
