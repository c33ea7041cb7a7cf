//! A second, independent [`BlobStore`] implementation standing in for a
//! remote replica. Real remote transports are a narrow collaborator
//! interface; this crate ships only this in-process loopback, used for
//! tests and for single-node deployments where no remote tier is wired up.

use async_trait::async_trait;

use crate::storage::blob_store::{BlobStore, Status, Table};
use crate::storage::engines::HashMapStorage;
use crate::storage::impls::{LocalBlobStore, StorageConfig};

/// A remote-tier stand-in, structurally identical to the local store but
/// named distinctly so the Reconciler's fan-out logging tells them apart.
pub struct LoopbackRemoteStore {
    inner: LocalBlobStore,
}

impl LoopbackRemoteStore {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: LocalBlobStore::new(
                name,
                Box::new(HashMapStorage::new()),
                Box::new(HashMapStorage::new()),
                StorageConfig::default(),
            ),
        }
    }
}

#[async_trait]
impl BlobStore for LoopbackRemoteStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn get(&self, table: Table, key: &str) -> anyhow::Result<(Status, Option<Vec<u8>>, u64)> {
        self.inner.get(table, key).await
    }

    async fn set(
        &self,
        table: Table,
        key: &str,
        value: Vec<u8>,
        cas: u64,
        ttl_seconds: u64,
    ) -> anyhow::Result<Status> {
        self.inner.set(table, key, value, cas, ttl_seconds).await
    }

    async fn set_without_cas(
        &self,
        table: Table,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: u64,
    ) -> anyhow::Result<Status> {
        self.inner.set_without_cas(table, key, value, ttl_seconds).await
    }

    async fn delete(&self, table: Table, key: &str, cas: u64) -> anyhow::Result<Status> {
        self.inner.delete(table, key, cas).await
    }
}
