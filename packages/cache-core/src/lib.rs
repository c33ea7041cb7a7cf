//! IRS cache core -- the record model, the wire codec, and the request
//! trail context shared by every layer of the cache server.
//!
//! - **Record** ([`record`]): `DefaultImpu`, `AssociatedImpu`, `ImpiMapping`,
//!   and the in-memory `ImplicitRegistrationSet`/`ImsSubscription` assembled
//!   from them.
//! - **Codec** ([`codec`]): the version-tagged, varbyte-length, deflate-
//!   compressed JSON wire format each record is persisted as.
//! - **Types** ([`types`]): `RegistrationState`, `ChargingAddresses`.
//! - **Context** ([`context`]): `Trail`, the per-request correlation id.

pub mod codec;
pub mod context;
pub mod record;
pub mod types;

pub use codec::CodecError;
pub use context::Trail;
pub use record::{
    AssociatedImpu, CasToken, DefaultImpu, Expiry, ImpiMapping, ImplicitRegistrationSet,
    ImpuRecord, ImsSubscription,
};
pub use types::{ChargingAddresses, RegistrationState};
