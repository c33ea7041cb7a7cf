//! The Blob Store Interface: a keyed, CAS-guarded, TTL-aware store of opaque
//! values. `LocalBlobStore` (in `storage::impls`) is the primary
//! implementation; a second implementation stands in for a remote tier.

use async_trait::async_trait;

/// Logical table a key belongs to. The two tables never share keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Impu,
    ImpiMapping,
}

/// Outcome of a Blob Store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    /// The supplied CAS token did not match the stored token.
    DataContention,
    Error,
}

/// Keyed, CAS-guarded, TTL-aware store of opaque byte values.
///
/// `cas = 0` on `set` means "create only": the write fails with
/// `DataContention` if a value is already present. TTL is seconds from now;
/// `0` means "use the store's default". Used as `Arc<dyn BlobStore>` so the
/// Reconciler can fan a single write out across the local store and any
/// number of remote stores uniformly.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// A short name for logging (e.g. "local", "remote-dc2").
    fn name(&self) -> &str;

    /// Fetch the current value and its CAS token.
    async fn get(&self, table: Table, key: &str) -> anyhow::Result<(Status, Option<Vec<u8>>, u64)>;

    /// Write `value` under `key`, guarded by `cas`.
    async fn set(
        &self,
        table: Table,
        key: &str,
        value: Vec<u8>,
        cas: u64,
        ttl_seconds: u64,
    ) -> anyhow::Result<Status>;

    /// Blind overwrite, bypassing CAS. Used only by reconciliation recovery
    /// paths that already hold proof of intent.
    async fn set_without_cas(
        &self,
        table: Table,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: u64,
    ) -> anyhow::Result<Status>;

    /// Delete the value at `key`, guarded by `cas`.
    async fn delete(&self, table: Table, key: &str, cas: u64) -> anyhow::Result<Status>;
}
