//! Typed wrapper over a [`BlobStore`], translating between the wire codec
//! and [`ImpuRecord`]/[`ImpiMapping`] values.

use std::sync::Arc;

use ims_cache_core::codec::{decode_impi_mapping, decode_impu, encode_impi_mapping, encode_impu};
use ims_cache_core::{ImpiMapping, ImpuRecord, Trail};

use crate::storage::blob_store::{BlobStore, Status, Table};

/// `get_impu`/`set_impu`/... return this instead of a bare `BlobStore`
/// status: decoder errors (corruption) are distinguished from "not found"
/// even though both originate from the same underlying read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpuResult<T> {
    Found(T),
    NotFound,
    Contention,
    /// The stored bytes failed to decode. Never collapsed into `NotFound`.
    Corrupt,
}

pub struct ImpuStore {
    store: Arc<dyn BlobStore>,
}

impl ImpuStore {
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub async fn get_impu(&self, impu: &str, trail: Trail) -> anyhow::Result<ImpuResult<ImpuRecord>> {
        let (status, value, _cas) = self.store.get(Table::Impu, impu).await?;
        match status {
            Status::NotFound => Ok(ImpuResult::NotFound),
            Status::DataContention => Ok(ImpuResult::Contention),
            Status::Error => Ok(ImpuResult::Corrupt),
            Status::Ok => {
                let bytes = value.expect("Status::Ok always carries a value");
                match decode_impu(impu, &bytes) {
                    Ok(record) => Ok(ImpuResult::Found(record)),
                    Err(err) => {
                        tracing::warn!(store = %self.store.name(), %impu, %trail, error = %err, "corrupt impu record");
                        Ok(ImpuResult::Corrupt)
                    }
                }
            }
        }
    }

    pub async fn set_impu(&self, record: &ImpuRecord, ttl_seconds: u64, trail: Trail) -> anyhow::Result<Status> {
        let bytes = encode_impu(record);
        let status = self
            .store
            .set(Table::Impu, record.impu(), bytes, record.cas_token(), ttl_seconds)
            .await?;
        tracing::debug!(store = %self.store.name(), impu = %record.impu(), %trail, ?status, "set_impu");
        Ok(status)
    }

    pub async fn set_impu_without_cas(
        &self,
        record: &ImpuRecord,
        ttl_seconds: u64,
        trail: Trail,
    ) -> anyhow::Result<Status> {
        let bytes = encode_impu(record);
        let _ = trail;
        self.store
            .set_without_cas(Table::Impu, record.impu(), bytes, ttl_seconds)
            .await
    }

    pub async fn delete_impu(&self, record: &ImpuRecord, trail: Trail) -> anyhow::Result<Status> {
        let _ = trail;
        self.store.delete(Table::Impu, record.impu(), record.cas_token()).await
    }

    pub async fn get_impi_mapping(
        &self,
        impi: &str,
        trail: Trail,
    ) -> anyhow::Result<ImpuResult<ImpiMapping>> {
        let (status, value, _cas) = self.store.get(Table::ImpiMapping, impi).await?;
        match status {
            Status::NotFound => Ok(ImpuResult::NotFound),
            Status::DataContention => Ok(ImpuResult::Contention),
            Status::Error => Ok(ImpuResult::Corrupt),
            Status::Ok => {
                let bytes = value.expect("Status::Ok always carries a value");
                match decode_impi_mapping(impi, &bytes) {
                    Ok(mapping) => Ok(ImpuResult::Found(mapping)),
                    Err(err) => {
                        tracing::warn!(store = %self.store.name(), %impi, %trail, error = %err, "corrupt impi mapping record");
                        Ok(ImpuResult::Corrupt)
                    }
                }
            }
        }
    }

    pub async fn set_impi_mapping(
        &self,
        mapping: &ImpiMapping,
        ttl_seconds: u64,
        trail: Trail,
    ) -> anyhow::Result<Status> {
        let bytes = encode_impi_mapping(mapping);
        let _ = trail;
        self.store
            .set(Table::ImpiMapping, &mapping.impi, bytes, mapping.cas_token, ttl_seconds)
            .await
    }

    pub async fn delete_impi_mapping(&self, mapping: &ImpiMapping, trail: Trail) -> anyhow::Result<Status> {
        let _ = trail;
        self.store
            .delete(Table::ImpiMapping, &mapping.impi, mapping.cas_token)
            .await
    }
}
