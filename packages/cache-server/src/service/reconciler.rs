//! The IRS Reconciler: the read path that assembles an Implicit
//! Registration Set by following pointers, and the write path that diffs a
//! caller's desired IRS against what is stored and brings the index records
//! (associated IMPUs, IMPI mappings) into line with it.
//!
//! Every multi-record write goes to the local store first; remote replicas
//! are updated afterwards, best-effort, without CAS -- a replica that
//! misses an update is caught up by the next reconciliation of the same
//! IRS rather than by retrying the broadcast.

use std::collections::BTreeSet;
use std::sync::Arc;

use ims_cache_core::{
    DefaultImpu, ImpiMapping, ImplicitRegistrationSet, ImpuRecord, ImsSubscription, Trail,
};

use crate::service::metrics;
use crate::storage::{ImpuResult, ImpuStore, Status};

/// Outcome of `get_irs` and its batch variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetIrsResult {
    Found(ImplicitRegistrationSet),
    NotFound,
    Corrupt,
}

/// Outcome of `put_irs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutIrsOutcome {
    Stored,
    /// CAS contention on the default record outlasted the retry budget.
    Contention,
}

/// Outcome of `delete_irs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteIrsOutcome {
    Deleted,
    NotFound,
    Contention,
}

pub struct Reconciler {
    local: Arc<ImpuStore>,
    remotes: Vec<Arc<ImpuStore>>,
    cas_retry_limit: u32,
    default_ttl_seconds: u64,
}

impl Reconciler {
    #[must_use]
    pub fn new(
        local: Arc<ImpuStore>,
        remotes: Vec<Arc<ImpuStore>>,
        cas_retry_limit: u32,
        default_ttl_seconds: u64,
    ) -> Self {
        Self {
            local,
            remotes,
            cas_retry_limit,
            default_ttl_seconds,
        }
    }

    /// A fresh, unpersisted IRS for a caller to populate and `put_irs`.
    #[must_use]
    pub fn create_irs(&self, impu: impl Into<String>) -> ImplicitRegistrationSet {
        ImplicitRegistrationSet::create(impu)
    }

    // ---- read path ----------------------------------------------------

    pub async fn get_irs(&self, impu: &str, trail: Trail) -> anyhow::Result<GetIrsResult> {
        match self.local.get_impu(impu, trail).await? {
            ImpuResult::Found(ImpuRecord::Default(default)) => Ok(GetIrsResult::Found(ImplicitRegistrationSet { default })),
            ImpuResult::Found(ImpuRecord::Associated(assoc)) => {
                match self.local.get_impu(&assoc.default_impu, trail).await? {
                    ImpuResult::Found(ImpuRecord::Default(default)) => Ok(GetIrsResult::Found(ImplicitRegistrationSet { default })),
                    // The pointer is dangling: the default it names was
                    // deleted or reclaimed without this index entry being
                    // cleaned up yet. Treat as if the IMPU were unknown.
                    ImpuResult::Found(ImpuRecord::Associated(_)) | ImpuResult::NotFound => Ok(GetIrsResult::NotFound),
                    ImpuResult::Contention | ImpuResult::Corrupt => Ok(GetIrsResult::Corrupt),
                }
            }
            ImpuResult::NotFound => Ok(GetIrsResult::NotFound),
            ImpuResult::Contention | ImpuResult::Corrupt => Ok(GetIrsResult::Corrupt),
        }
    }

    /// Flattens each `impu` lookup to its found IRS, dropping NOT_FOUND
    /// entries silently; a single Corrupt/contended entry fails the whole
    /// call rather than silently under-returning.
    pub async fn get_irss_for_impus(&self, impus: &[String], trail: Trail) -> anyhow::Result<Vec<ImplicitRegistrationSet>> {
        let mut found = Vec::with_capacity(impus.len());
        for impu in impus {
            match self.get_irs(impu, trail).await? {
                GetIrsResult::Found(irs) => found.push(irs),
                GetIrsResult::NotFound => {}
                GetIrsResult::Corrupt => anyhow::bail!("impu {impu} is corrupt"),
            }
        }
        Ok(found)
    }

    /// All IRSs reachable from `impis`, resolving each IMPI mapping to its
    /// default-IMPU set and delegating to [`Self::get_irss_for_impus`].
    pub async fn get_irss_for_impis(&self, impis: &[String], trail: Trail) -> anyhow::Result<Vec<ImplicitRegistrationSet>> {
        let mut found = Vec::new();
        for impi in impis {
            match self.local.get_impi_mapping(impi, trail).await? {
                ImpuResult::Found(mapping) => {
                    let default_impus: Vec<String> = mapping.default_impus.into_iter().collect();
                    found.extend(self.get_irss_for_impus(&default_impus, trail).await?);
                }
                ImpuResult::NotFound => {}
                ImpuResult::Contention | ImpuResult::Corrupt => anyhow::bail!("impi mapping {impi} is corrupt"),
            }
        }
        Ok(found)
    }

    /// Singular convenience wrapper over [`Self::get_irss_for_impis`].
    pub async fn get_irss_for_impi(&self, impi: &str, trail: Trail) -> anyhow::Result<Vec<ImplicitRegistrationSet>> {
        self.get_irss_for_impis(std::slice::from_ref(&impi.to_string()), trail).await
    }

    /// Assembles the IMS Subscription reachable from one IMPI: every IRS its
    /// IMPI-Mapping currently resolves to.
    pub async fn get_ims_subscription(&self, impi: &str, trail: Trail) -> anyhow::Result<ImsSubscription> {
        let irss = self.get_irss_for_impi(impi, trail).await?;
        Ok(ImsSubscription { irss })
    }

    // ---- write path -----------------------------------------------------

    pub async fn put_irs(&self, irs: &ImplicitRegistrationSet, trail: Trail) -> anyhow::Result<PutIrsOutcome> {
        let impu = irs.default.impu.clone();

        let previous = self.local.get_impu(&impu, trail).await?;
        let (prev_associated, prev_impis, existing_cas) = match previous {
            ImpuResult::Found(ImpuRecord::Default(d)) => (d.associated_impus, d.impis, d.cas_token),
            // Claiming an IMPU that used to be an index pointer, or was
            // absent entirely: there is nothing previously owned to diff
            // against, and the write is a create (cas 0).
            _ => (BTreeSet::new(), BTreeSet::new(), 0),
        };

        let mut draft = irs.default.clone();
        draft.cas_token = existing_cas;

        let Some(stored) = self.write_default_with_retry(&impu, draft, trail).await? else {
            return Ok(PutIrsOutcome::Contention);
        };

        for assoc_impu in stored.associated_impus.difference(&prev_associated) {
            self.claim_associated_impu(assoc_impu, &impu, stored.expiry, trail).await?;
        }
        for assoc_impu in prev_associated.difference(&stored.associated_impus) {
            self.release_associated_impu(assoc_impu, &impu, trail).await?;
        }
        for impi in stored.impis.difference(&prev_impis) {
            self.claim_impi_mapping(impi, &impu, stored.expiry, trail).await?;
        }
        for impi in prev_impis.difference(&stored.impis) {
            self.release_impi_mapping(impi, &impu, trail).await?;
        }

        self.fan_out_irs(&stored, trail).await;

        Ok(PutIrsOutcome::Stored)
    }

    pub async fn delete_irs(&self, impu: &str, trail: Trail) -> anyhow::Result<DeleteIrsOutcome> {
        let GetIrsResult::Found(irs) = self.get_irs(impu, trail).await? else {
            return Ok(DeleteIrsOutcome::NotFound);
        };

        // Reverse order of creation: drop index records before the default,
        // so a crash mid-delete never leaves a pointer to a gone default.
        for impi in &irs.default.impis {
            self.release_impi_mapping(impi, impu, trail).await?;
        }
        for assoc_impu in &irs.default.associated_impus {
            self.release_associated_impu(assoc_impu, impu, trail).await?;
        }

        let record = ImpuRecord::Default(irs.default);
        match self.local.delete_impu(&record, trail).await? {
            Status::Ok => {
                for remote in &self.remotes {
                    let _ = remote.delete_impu(&record, trail).await;
                }
                Ok(DeleteIrsOutcome::Deleted)
            }
            Status::DataContention => Ok(DeleteIrsOutcome::Contention),
            Status::NotFound => Ok(DeleteIrsOutcome::NotFound),
            Status::Error => anyhow::bail!("blob store error deleting default impu {impu}"),
        }
    }

    pub async fn delete_irss(&self, impus: &[String], trail: Trail) -> anyhow::Result<Vec<DeleteIrsOutcome>> {
        let mut outcomes = Vec::with_capacity(impus.len());
        for impu in impus {
            outcomes.push(self.delete_irs(impu, trail).await?);
        }
        Ok(outcomes)
    }

    /// Rewrites every IRS the subscription carries, via the per-IRS write
    /// path. Typically called after [`Self::get_ims_subscription`] and
    /// `ImsSubscription::set_charging_addrs` to broadcast an address change
    /// across an IMPI's whole subscription.
    pub async fn put_ims_subscription(&self, sub: &ImsSubscription, trail: Trail) -> anyhow::Result<()> {
        for irs in &sub.irss {
            self.put_irs(irs, trail).await?;
        }
        Ok(())
    }

    // ---- internals ------------------------------------------------------

    async fn write_default_with_retry(
        &self,
        impu: &str,
        mut draft: DefaultImpu,
        trail: Trail,
    ) -> anyhow::Result<Option<DefaultImpu>> {
        let mut attempts = 0u32;
        loop {
            let record = ImpuRecord::Default(draft.clone());
            match self.local.set_impu(&record, self.default_ttl_seconds, trail).await? {
                Status::Ok => match self.local.get_impu(impu, trail).await? {
                    ImpuResult::Found(ImpuRecord::Default(stored)) => return Ok(Some(stored)),
                    other => anyhow::bail!("default impu {impu} vanished right after a successful write: {other:?}"),
                },
                Status::DataContention => {
                    attempts += 1;
                    metrics::record_cas_retry(self.local.store_name());
                    if attempts > self.cas_retry_limit {
                        metrics::record_cas_exhausted(self.local.store_name());
                        return Ok(None);
                    }
                    draft.cas_token = match self.local.get_impu(impu, trail).await? {
                        ImpuResult::Found(ImpuRecord::Default(current)) => current.cas_token,
                        ImpuResult::Found(ImpuRecord::Associated(_)) | ImpuResult::NotFound => 0,
                        ImpuResult::Contention | ImpuResult::Corrupt => anyhow::bail!("default impu {impu} is corrupt"),
                    };
                }
                Status::NotFound => anyhow::bail!("blob store returned NotFound from a set of {impu}"),
                Status::Error => anyhow::bail!("blob store error writing default impu {impu}"),
            }
        }
    }

    /// Points `assoc_impu` at `owner_impu`, stealing it from whatever it
    /// previously pointed to. Refuses silently if `assoc_impu` is itself a
    /// Default-IMPU record -- an IMPU cannot be both.
    async fn claim_associated_impu(&self, assoc_impu: &str, owner_impu: &str, expiry: i64, trail: Trail) -> anyhow::Result<()> {
        let mut cas = 0;
        let mut attempts = 0u32;
        loop {
            match self.local.get_impu(assoc_impu, trail).await? {
                ImpuResult::Found(ImpuRecord::Default(_)) => {
                    tracing::warn!(%assoc_impu, %owner_impu, %trail, "refusing to claim an impu that is itself a default record");
                    return Ok(());
                }
                ImpuResult::Found(ImpuRecord::Associated(existing)) => cas = existing.cas_token,
                ImpuResult::NotFound => cas = 0,
                ImpuResult::Contention | ImpuResult::Corrupt => {
                    tracing::warn!(%assoc_impu, %owner_impu, %trail, "skipping claim of a corrupt associated-impu record");
                    return Ok(());
                }
            }

            let record = ImpuRecord::Associated(ims_cache_core::AssociatedImpu {
                impu: assoc_impu.to_string(),
                default_impu: owner_impu.to_string(),
                cas_token: cas,
                expiry,
            });
            match self.local.set_impu(&record, self.default_ttl_seconds, trail).await? {
                Status::Ok => {
                    self.fan_out_set(&record, trail).await;
                    return Ok(());
                }
                Status::DataContention => {
                    attempts += 1;
                    metrics::record_cas_retry(self.local.store_name());
                    if attempts > self.cas_retry_limit {
                        metrics::record_cas_exhausted(self.local.store_name());
                        return Ok(());
                    }
                }
                Status::NotFound => anyhow::bail!("blob store returned NotFound from a set of {assoc_impu}"),
                Status::Error => anyhow::bail!("blob store error claiming associated impu {assoc_impu}"),
            }
        }
    }

    /// Removes `assoc_impu`'s pointer, but only if it still points at
    /// `owner_impu` -- if another `put_irs` already stole it, leave it alone.
    async fn release_associated_impu(&self, assoc_impu: &str, owner_impu: &str, trail: Trail) -> anyhow::Result<()> {
        if let ImpuResult::Found(ImpuRecord::Associated(existing)) = self.local.get_impu(assoc_impu, trail).await? {
            if existing.default_impu == owner_impu {
                let record = ImpuRecord::Associated(existing);
                match self.local.delete_impu(&record, trail).await? {
                    Status::Ok => self.fan_out_delete(&record, trail).await,
                    Status::DataContention | Status::NotFound => {}
                    Status::Error => anyhow::bail!("blob store error releasing associated impu {assoc_impu}"),
                }
            }
        }
        Ok(())
    }

    async fn claim_impi_mapping(&self, impi: &str, owner_impu: &str, expiry: i64, trail: Trail) -> anyhow::Result<()> {
        let mut attempts = 0u32;
        loop {
            let mut mapping = match self.local.get_impi_mapping(impi, trail).await? {
                ImpuResult::Found(mapping) => mapping,
                ImpuResult::NotFound => ImpiMapping::new(impi),
                ImpuResult::Contention | ImpuResult::Corrupt => {
                    tracing::warn!(%impi, %owner_impu, %trail, "skipping claim of a corrupt impi mapping");
                    return Ok(());
                }
            };
            mapping.default_impus.insert(owner_impu.to_string());
            mapping.expiry = expiry;

            match self.local.set_impi_mapping(&mapping, self.default_ttl_seconds, trail).await? {
                Status::Ok => return Ok(()),
                Status::DataContention => {
                    attempts += 1;
                    metrics::record_cas_retry(self.local.store_name());
                    if attempts > self.cas_retry_limit {
                        metrics::record_cas_exhausted(self.local.store_name());
                        return Ok(());
                    }
                }
                Status::NotFound => anyhow::bail!("blob store returned NotFound from a set of impi mapping {impi}"),
                Status::Error => anyhow::bail!("blob store error claiming impi mapping {impi}"),
            }
        }
    }

    async fn release_impi_mapping(&self, impi: &str, owner_impu: &str, trail: Trail) -> anyhow::Result<()> {
        let mut attempts = 0u32;
        loop {
            let ImpuResult::Found(mut mapping) = self.local.get_impi_mapping(impi, trail).await? else {
                return Ok(());
            };
            mapping.default_impus.remove(owner_impu);

            let status = if mapping.default_impus.is_empty() {
                self.local.delete_impi_mapping(&mapping, trail).await?
            } else {
                self.local.set_impi_mapping(&mapping, self.default_ttl_seconds, trail).await?
            };

            match status {
                Status::Ok => return Ok(()),
                Status::DataContention => {
                    attempts += 1;
                    metrics::record_cas_retry(self.local.store_name());
                    if attempts > self.cas_retry_limit {
                        metrics::record_cas_exhausted(self.local.store_name());
                        return Ok(());
                    }
                }
                Status::NotFound => return Ok(()),
                Status::Error => anyhow::bail!("blob store error releasing impi mapping {impi}"),
            }
        }
    }

    async fn fan_out_irs(&self, default: &DefaultImpu, trail: Trail) {
        self.fan_out_set(&ImpuRecord::Default(default.clone()), trail).await;
    }

    async fn fan_out_set(&self, record: &ImpuRecord, trail: Trail) {
        for remote in &self.remotes {
            if let Err(err) = remote.set_impu_without_cas(record, self.default_ttl_seconds, trail).await {
                tracing::warn!(remote = %remote.store_name(), impu = %record.impu(), %trail, error = %err, "remote fan-out failed");
            }
        }
    }

    async fn fan_out_delete(&self, record: &ImpuRecord, trail: Trail) {
        for remote in &self.remotes {
            if let Err(err) = remote.delete_impu(record, trail).await {
                tracing::warn!(remote = %remote.store_name(), impu = %record.impu(), %trail, error = %err, "remote fan-out delete failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ims_cache_core::RegistrationState;

    use super::*;
    use crate::storage::engines::HashMapStorage;
    use crate::storage::impls::{LocalBlobStore, StorageConfig};

    fn make_store(name: &str) -> Arc<ImpuStore> {
        Arc::new(ImpuStore::new(Arc::new(LocalBlobStore::new(
            name,
            Box::new(HashMapStorage::new()),
            Box::new(HashMapStorage::new()),
            StorageConfig::default(),
        ))))
    }

    fn make_reconciler() -> (Reconciler, Arc<ImpuStore>) {
        let local = make_store("local");
        let remote = make_store("remote");
        let reconciler = Reconciler::new(local.clone(), vec![remote.clone()], 3, 7200);
        (reconciler, remote)
    }

    #[tokio::test]
    async fn put_then_get_round_trips_default_record() {
        let (reconciler, _remote) = make_reconciler();
        let mut irs = reconciler.create_irs("sip:a@x");
        irs.default.registration_state = RegistrationState::Registered;

        assert_eq!(reconciler.put_irs(&irs, Trail::NONE).await.unwrap(), PutIrsOutcome::Stored);

        match reconciler.get_irs("sip:a@x", Trail::NONE).await.unwrap() {
            GetIrsResult::Found(found) => assert_eq!(found.default.registration_state, RegistrationState::Registered),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_irs_follows_associated_impu_pointer() {
        let (reconciler, _remote) = make_reconciler();
        let mut irs = reconciler.create_irs("sip:default@x");
        irs.default.associated_impus = BTreeSet::from(["sip:assoc@x".to_string()]);
        reconciler.put_irs(&irs, Trail::NONE).await.unwrap();

        match reconciler.get_irs("sip:assoc@x", Trail::NONE).await.unwrap() {
            GetIrsResult::Found(found) => assert_eq!(found.default.impu, "sip:default@x"),
            other => panic!("expected Found via pointer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn removing_associated_impu_releases_its_pointer() {
        let (reconciler, _remote) = make_reconciler();
        let mut irs = reconciler.create_irs("sip:default@x");
        irs.default.associated_impus = BTreeSet::from(["sip:assoc@x".to_string()]);
        reconciler.put_irs(&irs, Trail::NONE).await.unwrap();

        let mut updated = match reconciler.get_irs("sip:default@x", Trail::NONE).await.unwrap() {
            GetIrsResult::Found(irs) => irs,
            other => panic!("expected Found, got {other:?}"),
        };
        updated.default.associated_impus.clear();
        reconciler.put_irs(&updated, Trail::NONE).await.unwrap();

        assert_eq!(reconciler.get_irs("sip:assoc@x", Trail::NONE).await.unwrap(), GetIrsResult::NotFound);
    }

    #[tokio::test]
    async fn associated_impu_can_be_stolen_by_another_default() {
        let (reconciler, _remote) = make_reconciler();
        let mut first = reconciler.create_irs("sip:first@x");
        first.default.associated_impus = BTreeSet::from(["sip:shared@x".to_string()]);
        reconciler.put_irs(&first, Trail::NONE).await.unwrap();

        let mut second = reconciler.create_irs("sip:second@x");
        second.default.associated_impus = BTreeSet::from(["sip:shared@x".to_string()]);
        reconciler.put_irs(&second, Trail::NONE).await.unwrap();

        match reconciler.get_irs("sip:shared@x", Trail::NONE).await.unwrap() {
            GetIrsResult::Found(found) => assert_eq!(found.default.impu, "sip:second@x"),
            other => panic!("expected the second default to own it, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn claiming_a_default_impu_as_associated_is_refused() {
        let (reconciler, _remote) = make_reconciler();
        let victim = reconciler.create_irs("sip:victim@x");
        reconciler.put_irs(&victim, Trail::NONE).await.unwrap();

        let mut attacker = reconciler.create_irs("sip:attacker@x");
        attacker.default.associated_impus = BTreeSet::from(["sip:victim@x".to_string()]);
        reconciler.put_irs(&attacker, Trail::NONE).await.unwrap();

        match reconciler.get_irs("sip:victim@x", Trail::NONE).await.unwrap() {
            GetIrsResult::Found(found) => assert_eq!(found.default.impu, "sip:victim@x"),
            other => panic!("expected the default to remain intact, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn impi_mapping_is_claimed_and_released() {
        let (reconciler, _remote) = make_reconciler();
        let mut irs = reconciler.create_irs("sip:default@x");
        irs.default.impis = BTreeSet::from(["impi@x".to_string()]);
        reconciler.put_irs(&irs, Trail::NONE).await.unwrap();

        let sets = reconciler.get_irss_for_impi("impi@x", Trail::NONE).await.unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].default.impu, "sip:default@x");

        let mut updated = sets[0].clone();
        updated.default.impis.clear();
        reconciler.put_irs(&updated, Trail::NONE).await.unwrap();

        let sets = reconciler.get_irss_for_impi("impi@x", Trail::NONE).await.unwrap();
        assert!(sets.is_empty());
    }

    #[tokio::test]
    async fn delete_irs_removes_default_and_index_records() {
        let (reconciler, _remote) = make_reconciler();
        let mut irs = reconciler.create_irs("sip:default@x");
        irs.default.associated_impus = BTreeSet::from(["sip:assoc@x".to_string()]);
        irs.default.impis = BTreeSet::from(["impi@x".to_string()]);
        reconciler.put_irs(&irs, Trail::NONE).await.unwrap();

        assert_eq!(reconciler.delete_irs("sip:default@x", Trail::NONE).await.unwrap(), DeleteIrsOutcome::Deleted);
        assert_eq!(reconciler.get_irs("sip:default@x", Trail::NONE).await.unwrap(), GetIrsResult::NotFound);
        assert_eq!(reconciler.get_irs("sip:assoc@x", Trail::NONE).await.unwrap(), GetIrsResult::NotFound);
        assert!(reconciler.get_irss_for_impi("impi@x", Trail::NONE).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_irs_on_missing_impu_is_not_found() {
        let (reconciler, _remote) = make_reconciler();
        assert_eq!(reconciler.delete_irs("sip:missing@x", Trail::NONE).await.unwrap(), DeleteIrsOutcome::NotFound);
    }

    #[tokio::test]
    async fn put_irs_fans_default_record_out_to_remotes() {
        let (reconciler, remote) = make_reconciler();
        let irs = reconciler.create_irs("sip:a@x");
        reconciler.put_irs(&irs, Trail::NONE).await.unwrap();

        match remote.get_impu("sip:a@x", Trail::NONE).await.unwrap() {
            ImpuResult::Found(ImpuRecord::Default(d)) => assert_eq!(d.impu, "sip:a@x"),
            other => panic!("expected the remote to have the fanned-out record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn put_ims_subscription_updates_every_reachable_irs() {
        let (reconciler, _remote) = make_reconciler();
        let mut first = reconciler.create_irs("sip:a@x");
        let mut second = reconciler.create_irs("sip:b@x");
        first.default.impis = BTreeSet::from(["impi@x".to_string()]);
        second.default.impis = BTreeSet::from(["impi@x".to_string()]);
        reconciler.put_irs(&first, Trail::NONE).await.unwrap();
        reconciler.put_irs(&second, Trail::NONE).await.unwrap();

        let addrs = ims_cache_core::ChargingAddresses {
            ccfs: vec!["ccf1".to_string()],
            ecfs: vec!["ecf1".to_string()],
        };
        let mut sub = reconciler.get_ims_subscription("impi@x", Trail::NONE).await.unwrap();
        assert_eq!(sub.irss.len(), 2);
        sub.set_charging_addrs(addrs.clone());
        reconciler.put_ims_subscription(&sub, Trail::NONE).await.unwrap();

        for impu in ["sip:a@x", "sip:b@x"] {
            match reconciler.get_irs(impu, Trail::NONE).await.unwrap() {
                GetIrsResult::Found(found) => assert_eq!(found.default.charging_addresses, addrs),
                other => panic!("expected Found, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn get_irss_for_impus_suppresses_not_found_and_fails_on_corrupt() {
        let (reconciler, _remote) = make_reconciler();
        let irs = reconciler.create_irs("sip:a@x");
        reconciler.put_irs(&irs, Trail::NONE).await.unwrap();

        let found = reconciler
            .get_irss_for_impus(&["sip:a@x".to_string(), "sip:missing@x".to_string()], Trail::NONE)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].default.impu, "sip:a@x");
    }
}
