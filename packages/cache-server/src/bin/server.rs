//! Process entry point: parses configuration, wires the local Blob Store
//! and Cache Processor, serves the health/readiness and metrics surface,
//! and drains in-flight work on shutdown.
//!
//! Wiring a concrete [`HssConnection`](ims_cache_server::service::hss::HssConnection)
//! onto a real Diameter Cx transport, and running the HSS Orchestrator
//! against it, is the provisioning front end's job and lives outside this
//! crate; this binary brings up the cache tier on its own.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::routing::get;
use clap::Parser;
use ims_cache_server::network::{self, AppState, ShutdownController};
use ims_cache_server::service::CacheConfig;
use ims_cache_server::storage::engines::HashMapStorage;
use ims_cache_server::storage::impls::{LocalBlobStore, StorageConfig};
use ims_cache_server::storage::remote::LoopbackRemoteStore;
use ims_cache_server::storage::ImpuStore;
use ims_cache_server::CacheProcessor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(CacheConfig::parse());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install the prometheus metrics recorder");

    let local = Arc::new(ImpuStore::new(Arc::new(LocalBlobStore::new(
        "local",
        Box::new(HashMapStorage::new()),
        Box::new(HashMapStorage::new()),
        StorageConfig {
            default_ttl_seconds: config.default_ttl_seconds,
        },
    ))));

    // No remote tier is provisioned for this single-node deployment; the
    // loopback stand-in keeps the Reconciler's fan-out path exercised so a
    // real remote can be swapped in without touching the write path.
    let remotes: Vec<Arc<ImpuStore>> = vec![Arc::new(ImpuStore::new(Arc::new(LoopbackRemoteStore::new("loopback"))))];
    let processor = Arc::new(CacheProcessor::new(local, remotes, Arc::clone(&config)));
    let shutdown = Arc::new(ShutdownController::new());

    let state = AppState {
        processor: Arc::clone(&processor),
        shutdown: Arc::clone(&shutdown),
        config: Arc::clone(&config),
        start_time: Instant::now(),
    };
    let router = network::health_router(state).route("/metrics", get(move || async move { metrics_handle.render() }));

    let listener = tokio::net::TcpListener::bind(&config.health_addr).await?;
    tracing::info!(node_id = %config.node_id, addr = %config.health_addr, "cache server listening");
    shutdown.set_ready();

    let mut shutdown_rx = shutdown.shutdown_receiver();
    let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
        let _ = shutdown_rx.changed().await;
    });

    tokio::select! {
        result = serve => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received interrupt, draining");
            shutdown.trigger_shutdown();
        }
    }

    shutdown.wait_for_drain(Duration::from_secs(10)).await;
    match Arc::try_unwrap(processor) {
        Ok(processor) => processor.shutdown().await,
        Err(_) => tracing::warn!("cache processor still has outstanding references at shutdown; worker tasks left running"),
    }
    Ok(())
}
