//! [`BlobStore`](super::blob_store::BlobStore) implementations.

mod local_blob_store;

pub use local_blob_store::{LocalBlobStore, StorageConfig};
