//! The three record variants stored under the `impu` and `impi_mapping`
//! tables, and the in-memory Implicit Registration Set assembled from them.

use std::collections::BTreeSet;

use crate::types::{ChargingAddresses, RegistrationState};

/// Opaque CAS token returned by the blob store on every read and required on
/// every guarded write. `0` means "no record observed yet" and is only valid
/// as the token on a create.
pub type CasToken = u64;

/// Absolute expiry, seconds since the Unix epoch. `0` means "no expiry".
pub type Expiry = i64;

/// Canonical default-IMPU record: the source of truth for one Implicit
/// Registration Set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultImpu {
    pub impu: String,
    pub associated_impus: BTreeSet<String>,
    pub impis: BTreeSet<String>,
    pub registration_state: RegistrationState,
    pub charging_addresses: ChargingAddresses,
    pub service_profile: String,
    pub cas_token: CasToken,
    pub expiry: Expiry,
}

impl DefaultImpu {
    /// A fresh, unpersisted default record ready to be populated and `put`.
    #[must_use]
    pub fn new(impu: impl Into<String>) -> Self {
        Self {
            impu: impu.into(),
            associated_impus: BTreeSet::new(),
            impis: BTreeSet::new(),
            registration_state: RegistrationState::NotRegistered,
            charging_addresses: ChargingAddresses::default(),
            service_profile: String::new(),
            cas_token: 0,
            expiry: 0,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: Expiry) -> bool {
        self.expiry != 0 && self.expiry <= now
    }
}

/// Index record: a non-canonical IMPU pointing back at its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociatedImpu {
    pub impu: String,
    pub default_impu: String,
    pub cas_token: CasToken,
    pub expiry: Expiry,
}

impl AssociatedImpu {
    #[must_use]
    pub fn is_expired(&self, now: Expiry) -> bool {
        self.expiry != 0 && self.expiry <= now
    }
}

/// Index record: a private identity mapped to the default IMPUs it currently
/// authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpiMapping {
    pub impi: String,
    pub default_impus: BTreeSet<String>,
    pub cas_token: CasToken,
    pub expiry: Expiry,
}

impl ImpiMapping {
    #[must_use]
    pub fn new(impi: impl Into<String>) -> Self {
        Self {
            impi: impi.into(),
            default_impus: BTreeSet::new(),
            cas_token: 0,
            expiry: 0,
        }
    }
}

/// The `impu` table holds two shapes, discriminated by whether the payload
/// carries `default_impu`. This enum is what the codec decodes into and what
/// the Blob Store Interface's `impu` table stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpuRecord {
    Default(DefaultImpu),
    Associated(AssociatedImpu),
}

impl ImpuRecord {
    #[must_use]
    pub fn impu(&self) -> &str {
        match self {
            Self::Default(d) => &d.impu,
            Self::Associated(a) => &a.impu,
        }
    }

    #[must_use]
    pub fn cas_token(&self) -> CasToken {
        match self {
            Self::Default(d) => d.cas_token,
            Self::Associated(a) => a.cas_token,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: Expiry) -> bool {
        match self {
            Self::Default(d) => d.is_expired(now),
            Self::Associated(a) => a.is_expired(now),
        }
    }
}

/// The in-memory Implicit Registration Set assembled by the Reconciler's read
/// path: a Default-IMPU record plus the associated-IMPU and IMPI-mapping
/// index records it implies. The index records are not owned here -- they
/// live in the store and are re-derived on every write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitRegistrationSet {
    pub default: DefaultImpu,
}

impl ImplicitRegistrationSet {
    /// An empty, default-state IRS for a caller to populate before the first
    /// `put_irs`.
    #[must_use]
    pub fn create(impu: impl Into<String>) -> Self {
        Self {
            default: DefaultImpu::new(impu),
        }
    }
}

/// Every IRS reachable from one IMPI, keyed by default IMPU.
#[derive(Debug, Clone, Default)]
pub struct ImsSubscription {
    pub irss: Vec<ImplicitRegistrationSet>,
}

impl ImsSubscription {
    pub fn set_charging_addrs(&mut self, addrs: ChargingAddresses) {
        for irs in &mut self.irss {
            irs.default.charging_addresses = addrs.clone();
        }
    }
}
