//! In-memory [`BlobStore`] implementation: the fast local tier every
//! reconciliation touches first.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::storage::blob_store::{BlobStore, Status, Table};
use crate::storage::engine::StorageEngine;
use crate::storage::blob::Blob;

/// Current time as seconds since the Unix epoch.
#[allow(clippy::cast_possible_truncation)]
fn now_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Configuration applied to a `LocalBlobStore`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageConfig {
    /// TTL applied when a caller passes `ttl_seconds = 0`. `0` = no default.
    pub default_ttl_seconds: u64,
}

/// A keyed, CAS-guarded, TTL-aware in-memory store covering both the `impu`
/// and `impi_mapping` tables.
pub struct LocalBlobStore {
    name: String,
    impu: Box<dyn StorageEngine>,
    impi_mapping: Box<dyn StorageEngine>,
    config: StorageConfig,
}

impl LocalBlobStore {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        impu: Box<dyn StorageEngine>,
        impi_mapping: Box<dyn StorageEngine>,
        config: StorageConfig,
    ) -> Self {
        Self {
            name: name.into(),
            impu,
            impi_mapping,
            config,
        }
    }

    fn engine(&self, table: Table) -> &dyn StorageEngine {
        match table {
            Table::Impu => &*self.impu,
            Table::ImpiMapping => &*self.impi_mapping,
        }
    }

    fn expiry_for(&self, ttl_seconds: u64) -> i64 {
        let ttl = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            self.config.default_ttl_seconds
        };
        if ttl > 0 {
            now_seconds() + ttl as i64
        } else {
            0
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, table: Table, key: &str) -> anyhow::Result<(Status, Option<Vec<u8>>, u64)> {
        // Step 1: look up the engine entry.
        let Some(blob) = self.engine(table).get(key) else {
            return Ok((Status::NotFound, None, 0));
        };

        // Step 2: an expired entry is semantically absent.
        if blob.is_expired(now_seconds()) {
            return Ok((Status::NotFound, None, 0));
        }

        // Step 3: return the value with its current CAS token.
        Ok((Status::Ok, Some(blob.value), blob.cas_token))
    }

    async fn set(
        &self,
        table: Table,
        key: &str,
        value: Vec<u8>,
        cas: u64,
        ttl_seconds: u64,
    ) -> anyhow::Result<Status> {
        let engine = self.engine(table);

        // Step 1: load current state, treating an expired entry as absent.
        let current = engine.get(key).filter(|b| !b.is_expired(now_seconds()));

        // Step 2: enforce the CAS contract.
        match (&current, cas) {
            (None, 0) => {}
            (None, _) => return Ok(Status::DataContention),
            (Some(existing), supplied) if existing.cas_token == supplied => {}
            (Some(_), _) => return Ok(Status::DataContention),
        }

        // Step 3: write with an advanced CAS token.
        let next_cas = current.map_or(1, |b| b.cas_token + 1);
        let expiry = self.expiry_for(ttl_seconds);
        engine.put(key, Blob::new(value, next_cas, expiry));

        tracing::debug!(store = %self.name, ?table, key = %key, cas = next_cas, "blob set");
        Ok(Status::Ok)
    }

    async fn set_without_cas(
        &self,
        table: Table,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: u64,
    ) -> anyhow::Result<Status> {
        let engine = self.engine(table);
        let next_cas = engine.get(key).map_or(1, |b| b.cas_token + 1);
        let expiry = self.expiry_for(ttl_seconds);
        engine.put(key, Blob::new(value, next_cas, expiry));
        Ok(Status::Ok)
    }

    async fn delete(&self, table: Table, key: &str, cas: u64) -> anyhow::Result<Status> {
        let engine = self.engine(table);
        let Some(existing) = engine.get(key) else {
            return Ok(Status::NotFound);
        };
        if existing.is_expired(now_seconds()) {
            return Ok(Status::NotFound);
        }
        if existing.cas_token != cas {
            return Ok(Status::DataContention);
        }
        engine.remove(key);
        Ok(Status::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::engines::HashMapStorage;

    fn make_store() -> LocalBlobStore {
        LocalBlobStore::new(
            "local",
            Box::new(HashMapStorage::new()),
            Box::new(HashMapStorage::new()),
            StorageConfig::default(),
        )
    }

    #[tokio::test]
    async fn create_only_write_succeeds_with_cas_zero() {
        let store = make_store();
        let status = store
            .set(Table::Impu, "sip:a@x", b"v1".to_vec(), 0, 0)
            .await
            .unwrap();
        assert_eq!(status, Status::Ok);

        let (status, value, cas) = store.get(Table::Impu, "sip:a@x").await.unwrap();
        assert_eq!(status, Status::Ok);
        assert_eq!(value.unwrap(), b"v1");
        assert_eq!(cas, 1);
    }

    #[tokio::test]
    async fn create_only_write_fails_when_already_present() {
        let store = make_store();
        store.set(Table::Impu, "k", b"v1".to_vec(), 0, 0).await.unwrap();
        let status = store.set(Table::Impu, "k", b"v2".to_vec(), 0, 0).await.unwrap();
        assert_eq!(status, Status::DataContention);
    }

    #[tokio::test]
    async fn cas_mismatch_is_rejected() {
        let store = make_store();
        store.set(Table::Impu, "k", b"v1".to_vec(), 0, 0).await.unwrap();
        let status = store.set(Table::Impu, "k", b"v2".to_vec(), 99, 0).await.unwrap();
        assert_eq!(status, Status::DataContention);
    }

    #[tokio::test]
    async fn cas_token_advances_monotonically() {
        let store = make_store();
        store.set(Table::Impu, "k", b"v1".to_vec(), 0, 0).await.unwrap();
        let (_, _, cas1) = store.get(Table::Impu, "k").await.unwrap();
        store.set(Table::Impu, "k", b"v2".to_vec(), cas1, 0).await.unwrap();
        let (_, _, cas2) = store.get(Table::Impu, "k").await.unwrap();
        assert!(cas2 > cas1);
    }

    #[tokio::test]
    async fn delete_requires_matching_cas() {
        let store = make_store();
        store.set(Table::Impu, "k", b"v1".to_vec(), 0, 0).await.unwrap();
        assert_eq!(
            store.delete(Table::Impu, "k", 99).await.unwrap(),
            Status::DataContention
        );
        assert_eq!(store.delete(Table::Impu, "k", 1).await.unwrap(), Status::Ok);
        assert_eq!(store.get(Table::Impu, "k").await.unwrap().0, Status::NotFound);
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let store = make_store();
        assert_eq!(store.get(Table::Impu, "missing").await.unwrap().0, Status::NotFound);
    }

    #[tokio::test]
    async fn expired_entry_reads_as_not_found() {
        let store = make_store();
        store.set(Table::Impu, "k", b"v1".to_vec(), 0, 1).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert_eq!(store.get(Table::Impu, "k").await.unwrap().0, Status::NotFound);
    }

    #[tokio::test]
    async fn set_without_cas_overwrites_blindly() {
        let store = make_store();
        store.set(Table::Impu, "k", b"v1".to_vec(), 0, 0).await.unwrap();
        store.set_without_cas(Table::Impu, "k", b"v2".to_vec(), 0).await.unwrap();
        let (_, value, _) = store.get(Table::Impu, "k").await.unwrap();
        assert_eq!(value.unwrap(), b"v2");
    }

    #[tokio::test]
    async fn impu_and_impi_mapping_tables_are_independent() {
        let store = make_store();
        store.set(Table::Impu, "k", b"impu".to_vec(), 0, 0).await.unwrap();
        store.set(Table::ImpiMapping, "k", b"impi".to_vec(), 0, 0).await.unwrap();
        let (_, impu_value, _) = store.get(Table::Impu, "k").await.unwrap();
        let (_, impi_value, _) = store.get(Table::ImpiMapping, "k").await.unwrap();
        assert_eq!(impu_value.unwrap(), b"impu");
        assert_eq!(impi_value.unwrap(), b"impi");
    }
}
