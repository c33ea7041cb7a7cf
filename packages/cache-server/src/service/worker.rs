//! Bounded worker pool backing the Cache Processor.
//!
//! A fixed number of tokio tasks drain a bounded job queue. `submit` uses
//! `try_send` so a full queue fails fast instead of applying backpressure
//! to the caller -- callers are expected to surface that as a distinguished
//! failure status rather than block.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

pub type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Debug, thiserror::Error)]
#[error("worker pool queue is at capacity")]
pub struct QueueFull;

pub struct WorkerPool {
    sender: mpsc::Sender<Job>,
    handles: Vec<JoinHandle<()>>,
    queued: Arc<AtomicUsize>,
}

impl WorkerPool {
    #[must_use]
    pub fn start(worker_count: usize, queue_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let queued = Arc::new(AtomicUsize::new(0));

        let handles = (0..worker_count)
            .map(|worker_id| {
                let receiver = Arc::clone(&receiver);
                let queued = Arc::clone(&queued);
                tokio::spawn(async move {
                    loop {
                        let job = { receiver.lock().await.recv().await };
                        let Some(job) = job else {
                            break;
                        };
                        queued.fetch_sub(1, Ordering::Relaxed);
                        job.await;
                    }
                    tracing::debug!(worker_id, "worker pool task stopped");
                })
            })
            .collect();

        Self { sender, handles, queued }
    }

    /// Enqueues `job`. Fails immediately, without waiting, if the queue is full.
    pub fn submit(&self, job: Job) -> Result<(), QueueFull> {
        self.queued.fetch_add(1, Ordering::Relaxed);
        self.sender.try_send(job).map_err(|_| {
            self.queued.fetch_sub(1, Ordering::Relaxed);
            QueueFull
        })
    }

    #[must_use]
    pub fn queue_depth(&self) -> usize {
        self.queued.load(Ordering::Relaxed)
    }

    /// Closes the queue and waits for in-flight and already-queued jobs to
    /// drain before returning.
    pub async fn shutdown(self) {
        drop(self.sender);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}
