use clap::Parser;

/// Process-wide configuration for the cache server.
#[derive(Debug, Clone, Parser)]
#[command(name = "ims-cache-server")]
pub struct CacheConfig {
    /// Identifier of this server node, used in log fields only.
    #[arg(long, env = "CACHE_NODE_ID", default_value = "")]
    pub node_id: String,

    /// Number of worker tasks the Cache Processor runs.
    #[arg(long, env = "CACHE_WORKER_COUNT", default_value_t = 8)]
    pub worker_count: usize,

    /// Bound on the Cache Processor's job queue. A full queue fails fast.
    #[arg(long, env = "CACHE_QUEUE_CAPACITY", default_value_t = 1000)]
    pub queue_capacity: usize,

    /// Maximum CAS retry attempts the Reconciler spends per store before
    /// giving up and surfacing an error.
    #[arg(long, env = "CACHE_CAS_RETRY_LIMIT", default_value_t = 3)]
    pub cas_retry_limit: u32,

    /// Default TTL, in seconds, applied to newly registered IRSs.
    #[arg(long, env = "CACHE_DEFAULT_TTL_SECONDS", default_value_t = 7200)]
    pub default_ttl_seconds: u64,

    /// Deadline for a single HSS round-trip before the Orchestrator treats
    /// it as a timeout.
    #[arg(long, env = "CACHE_HSS_TIMEOUT_MS", default_value_t = 5000)]
    pub hss_timeout_ms: u64,

    /// Server name advertised in a fabricated User-Authorization answer.
    #[arg(long, env = "CACHE_DEFAULT_SERVER_NAME", default_value = "")]
    pub default_server_name: String,

    /// Address the ambient health/readiness router listens on.
    #[arg(long, env = "CACHE_HEALTH_ADDR", default_value = "0.0.0.0:8080")]
    pub health_addr: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            node_id: String::new(),
            worker_count: 8,
            queue_capacity: 1000,
            cas_retry_limit: 3,
            default_ttl_seconds: 7200,
            hss_timeout_ms: 5000,
            default_server_name: String::new(),
            health_addr: "0.0.0.0:8080".to_string(),
        }
    }
}
