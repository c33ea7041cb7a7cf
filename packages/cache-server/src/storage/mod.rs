//! Storage layers backing the IRS cache.
//!
//! - **Layer 1** ([`engine`]): synchronous keyed [`Blob`](blob::Blob) storage
//! - **Layer 2** ([`blob_store`]): the Blob Store Interface -- CAS + TTL
//!   guarded get/set/delete, implemented by [`impls::LocalBlobStore`] and
//!   [`remote::LoopbackRemoteStore`]
//! - **Layer 3** ([`impu_store`]): typed `ImpuStore` translating codec <-> blobs

pub mod blob_store;
pub mod engine;
pub mod engines;
pub mod impls;
pub mod impu_store;
pub mod blob;
pub mod remote;

pub use blob_store::{BlobStore, Status, Table};
pub use engine::StorageEngine;
pub use impu_store::{ImpuResult, ImpuStore};
pub use blob::Blob;
