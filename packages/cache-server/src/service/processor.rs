//! The Cache Processor: an async façade over the worker pool that submits
//! IRS reconciliation jobs and reports back through callbacks, so callers
//! on the Diameter request path never block on the reconciliation itself.

use std::sync::Arc;
use std::time::Instant;

use ims_cache_core::{ImplicitRegistrationSet, ImsSubscription, Trail};

use crate::service::config::CacheConfig;
use crate::service::metrics;
use crate::service::reconciler::{DeleteIrsOutcome, GetIrsResult, PutIrsOutcome};
use crate::service::worker::{QueueFull, WorkerPool};
use crate::storage::ImpuStore;

use super::reconciler::Reconciler;

/// Outcome delivered to a `put_irs`/`delete_irs` caller once its job has
/// either run or been rejected for lack of queue space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Submitted,
    QueueFull,
}

pub struct CacheProcessor {
    reconciler: Arc<Reconciler>,
    pool: WorkerPool,
}

impl CacheProcessor {
    #[must_use]
    pub fn new(local: Arc<ImpuStore>, remotes: Vec<Arc<ImpuStore>>, config: Arc<CacheConfig>) -> Self {
        let reconciler = Arc::new(Reconciler::new(
            local,
            remotes,
            config.cas_retry_limit,
            config.default_ttl_seconds,
        ));
        Self {
            reconciler,
            pool: WorkerPool::start(config.worker_count, config.queue_capacity),
        }
    }

    #[must_use]
    pub fn reconciler(&self) -> Arc<Reconciler> {
        Arc::clone(&self.reconciler)
    }

    #[must_use]
    pub fn queue_depth(&self) -> usize {
        self.pool.queue_depth()
    }

    /// Reads bypass the worker pool: they are cheap, and a caller blocked on
    /// a queue slot for a pure lookup would defeat the point of the cache.
    pub async fn get_irs(&self, impu: &str, trail: Trail) -> anyhow::Result<GetIrsResult> {
        self.reconciler.get_irs(impu, trail).await
    }

    /// Submits a reconciliation job to the worker pool. `on_done` runs on a
    /// worker task once the write completes or fails; it never runs inline.
    pub fn put_irs<F>(&self, irs: ImplicitRegistrationSet, trail: Trail, on_done: F) -> JobStatus
    where
        F: FnOnce(anyhow::Result<PutIrsOutcome>) + Send + 'static,
    {
        let reconciler = Arc::clone(&self.reconciler);
        let job = Box::pin(async move {
            let started = Instant::now();
            let result = reconciler.put_irs(&irs, trail).await;
            let outcome = match &result {
                Ok(PutIrsOutcome::Stored) => "stored",
                Ok(PutIrsOutcome::Contention) => "contention",
                Err(_) => "error",
            };
            metrics::record_job_duration("put_irs", outcome, started.elapsed());
            on_done(result);
        });

        self.submit("put_irs", job)
    }

    pub fn delete_irs<F>(&self, impu: String, trail: Trail, on_done: F) -> JobStatus
    where
        F: FnOnce(anyhow::Result<DeleteIrsOutcome>) + Send + 'static,
    {
        let reconciler = Arc::clone(&self.reconciler);
        let job = Box::pin(async move {
            let started = Instant::now();
            let result = reconciler.delete_irs(&impu, trail).await;
            let outcome = match &result {
                Ok(DeleteIrsOutcome::Deleted) => "deleted",
                Ok(DeleteIrsOutcome::NotFound) => "not_found",
                Ok(DeleteIrsOutcome::Contention) => "contention",
                Err(_) => "error",
            };
            metrics::record_job_duration("delete_irs", outcome, started.elapsed());
            on_done(result);
        });

        self.submit("delete_irs", job)
    }

    /// Reads bypass the worker pool, same rationale as `get_irs`.
    pub async fn get_ims_subscription(&self, impi: &str, trail: Trail) -> anyhow::Result<ImsSubscription> {
        self.reconciler.get_ims_subscription(impi, trail).await
    }

    pub fn put_ims_subscription<F>(&self, sub: ImsSubscription, trail: Trail, on_done: F) -> JobStatus
    where
        F: FnOnce(anyhow::Result<()>) + Send + 'static,
    {
        let reconciler = Arc::clone(&self.reconciler);
        let job = Box::pin(async move {
            let started = Instant::now();
            let result = reconciler.put_ims_subscription(&sub, trail).await;
            let outcome = if result.is_ok() { "stored" } else { "error" };
            metrics::record_job_duration("put_ims_subscription", outcome, started.elapsed());
            on_done(result);
        });

        self.submit("put_ims_subscription", job)
    }

    fn submit(&self, operation: &str, job: crate::service::worker::Job) -> JobStatus {
        match self.pool.submit(job) {
            Ok(()) => {
                metrics::record_queue_depth(self.pool.queue_depth());
                JobStatus::Submitted
            }
            Err(QueueFull) => {
                metrics::record_queue_full(operation);
                JobStatus::QueueFull
            }
        }
    }

    pub async fn shutdown(self) {
        self.pool.shutdown().await;
    }
}
