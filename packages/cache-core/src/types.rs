use serde::{Deserialize, Serialize};

/// Registration state carried on a Default-IMPU record.
///
/// `Unchanged` is a legal value to persist: it means the caller's write did
/// not intend to alter registration state, only other fields (e.g. a
/// push-profile update), and the Reconciler must not clobber a previously
/// stored `Registered`/`Unregistered` with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationState {
    NotRegistered,
    Unregistered,
    Registered,
    Unchanged,
}

impl RegistrationState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotRegistered => "NOT_REGISTERED",
            Self::Unregistered => "UNREGISTERED",
            Self::Registered => "REGISTERED",
            Self::Unchanged => "UNCHANGED",
        }
    }
}

/// Charging server addresses broadcast across every IRS reachable from one IMPI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargingAddresses {
    pub ccfs: Vec<String>,
    pub ecfs: Vec<String>,
}

impl ChargingAddresses {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ccfs.is_empty() && self.ecfs.is_empty()
    }

    /// Sorts both sequences so two logically-equal addresses encode identically.
    pub fn canonicalize(&mut self) {
        self.ccfs.sort();
        self.ecfs.sort();
    }
}
