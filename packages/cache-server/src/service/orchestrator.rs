//! The HSS Orchestrator: dispatches each inbound request type to the
//! Reconciler and, where the cache cannot answer on its own, the HSS.
//!
//! `GET reg-data`, `REGISTRATION`, and `RE_REGISTRATION` try the cache
//! first; `RE_REGISTRATION` answers purely from cache when the requested
//! server already owns the registration. `UNREGISTERED_USER` always
//! consults the HSS because it changes registration state the cache
//! cannot derive on its own; `DEREGISTRATION` always consults the HSS too
//! and then drops the IRS unconditionally, independent of the HSS
//! answer. `USER_AUTH` never consults the HSS at all -- it answers with a
//! fabricated success immediately, mirroring the provisioning front end's
//! own User-Authorization shortcut.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ims_cache_core::{ImplicitRegistrationSet, RegistrationState, Trail};

use crate::service::hss::{
    AssignmentType, HssAnswerCode, HssConnection, LocationInfoRequest, ServerAssignmentRequest,
    UserAuthAnswer, UserAuthRequest,
};
use crate::service::metrics;
use crate::service::reconciler::{DeleteIrsOutcome, GetIrsResult, PutIrsOutcome, Reconciler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    GetRegData,
    Registration,
    ReRegistration,
    UnregisteredUser,
    Deregistration,
    PushProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorStatus {
    Success,
    NotFound,
    Forbidden,
    Timeout,
    ServerUnavailable,
    Error,
}

impl From<HssAnswerCode> for OrchestratorStatus {
    fn from(code: HssAnswerCode) -> Self {
        match code {
            HssAnswerCode::Success => OrchestratorStatus::Success,
            HssAnswerCode::NotFound => OrchestratorStatus::NotFound,
            HssAnswerCode::Forbidden => OrchestratorStatus::Forbidden,
            HssAnswerCode::Timeout => OrchestratorStatus::Timeout,
            HssAnswerCode::ServerUnavailable => OrchestratorStatus::ServerUnavailable,
            HssAnswerCode::Unknown => OrchestratorStatus::Error,
        }
    }
}

pub struct Orchestrator<H: HssConnection> {
    reconciler: Arc<Reconciler>,
    hss: Arc<H>,
    default_server_name: String,
    hss_timeout: Duration,
}

impl<H: HssConnection> Orchestrator<H> {
    #[must_use]
    pub fn new(reconciler: Arc<Reconciler>, hss: Arc<H>, default_server_name: String, hss_timeout_ms: u64) -> Self {
        Self {
            reconciler,
            hss,
            default_server_name,
            hss_timeout: Duration::from_millis(hss_timeout_ms),
        }
    }

    /// Runs an HSS round-trip under the configured deadline, recording its
    /// outcome. `Ok(None)` means the deadline elapsed; the trait itself
    /// never reports `TIMEOUT` since it has no visibility into the
    /// deadline applied here.
    async fn call_hss<Fut, T>(&self, request_type: &str, fut: Fut) -> anyhow::Result<Option<T>>
    where
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let started = Instant::now();
        match tokio::time::timeout(self.hss_timeout, fut).await {
            Ok(Ok(answer)) => {
                metrics::record_hss_roundtrip(request_type, "success", started.elapsed());
                Ok(Some(answer))
            }
            Ok(Err(err)) => {
                metrics::record_hss_roundtrip(request_type, "error", started.elapsed());
                Err(err)
            }
            Err(_) => {
                metrics::record_hss_roundtrip(request_type, "timeout", started.elapsed());
                Ok(None)
            }
        }
    }

    pub async fn handle(
        &self,
        request_type: RequestType,
        impu: &str,
        server_name: &str,
        trail: Trail,
    ) -> anyhow::Result<(OrchestratorStatus, Option<ImplicitRegistrationSet>)> {
        match request_type {
            RequestType::GetRegData => self.get_reg_data(impu, trail).await,
            RequestType::Registration => self.registration(impu, server_name, AssignmentType::Registration, trail).await,
            RequestType::ReRegistration => self.re_registration(impu, server_name, trail).await,
            RequestType::UnregisteredUser => {
                self.registration(impu, server_name, AssignmentType::UnregisteredUser, trail).await
            }
            RequestType::Deregistration => self.deregistration(impu, trail).await,
            RequestType::PushProfile => self.push_profile(impu, trail).await,
        }
    }

    /// `GET reg-data`: answer from cache if present, otherwise pull the
    /// profile from the HSS via a Location-Info lookup and cache it.
    async fn get_reg_data(&self, impu: &str, trail: Trail) -> anyhow::Result<(OrchestratorStatus, Option<ImplicitRegistrationSet>)> {
        if let GetIrsResult::Found(irs) = self.reconciler.get_irs(impu, trail).await? {
            return Ok((OrchestratorStatus::Success, Some(irs)));
        }

        let Some(answer) = self
            .call_hss("location_info", self.hss.location_info(LocationInfoRequest { impu: impu.to_string() }, trail))
            .await?
        else {
            return Ok((OrchestratorStatus::Timeout, None));
        };
        if answer.code != HssAnswerCode::Success {
            return Ok((answer.code.into(), None));
        }

        let mut irs = self.reconciler.create_irs(impu);
        irs.default.registration_state = RegistrationState::Unregistered;
        self.reconciler.put_irs(&irs, trail).await?;
        Ok((OrchestratorStatus::Success, Some(irs)))
    }

    async fn registration(
        &self,
        impu: &str,
        server_name: &str,
        assignment_type: AssignmentType,
        trail: Trail,
    ) -> anyhow::Result<(OrchestratorStatus, Option<ImplicitRegistrationSet>)> {
        let Some(answer) = self
            .call_hss(
                "server_assignment",
                self.hss.server_assignment(
                    ServerAssignmentRequest {
                        impu: impu.to_string(),
                        server_name: server_name.to_string(),
                        assignment_type,
                    },
                    trail,
                ),
            )
            .await?
        else {
            return Ok((OrchestratorStatus::Timeout, None));
        };
        if answer.code != HssAnswerCode::Success {
            return Ok((answer.code.into(), None));
        }

        let mut irs = match self.reconciler.get_irs(impu, trail).await? {
            GetIrsResult::Found(irs) => irs,
            GetIrsResult::NotFound | GetIrsResult::Corrupt => self.reconciler.create_irs(impu),
        };
        irs.default.registration_state = match assignment_type {
            AssignmentType::UnregisteredUser => RegistrationState::Unregistered,
            _ => RegistrationState::Registered,
        };
        // An empty service profile on the answer means the HSS has nothing
        // new to say; keep serving whatever profile is already cached.
        if let Some(profile) = answer.service_profile.filter(|p| !p.is_empty()) {
            irs.default.service_profile = profile;
        }
        irs.default.charging_addresses = answer.charging_addresses;

        let outcome = self.reconciler.put_irs(&irs, trail).await?;
        Ok(match outcome {
            PutIrsOutcome::Stored => (OrchestratorStatus::Success, Some(irs)),
            PutIrsOutcome::Contention => (OrchestratorStatus::Error, None),
        })
    }

    /// Re-registration is a cache hit whenever the requesting server
    /// already owns this registration -- no need to round-trip the HSS.
    async fn re_registration(
        &self,
        impu: &str,
        server_name: &str,
        trail: Trail,
    ) -> anyhow::Result<(OrchestratorStatus, Option<ImplicitRegistrationSet>)> {
        if let GetIrsResult::Found(irs) = self.reconciler.get_irs(impu, trail).await? {
            if irs.default.registration_state == RegistrationState::Registered && !server_name.is_empty() {
                return Ok((OrchestratorStatus::Success, Some(irs)));
            }
        }
        self.registration(impu, server_name, AssignmentType::ReRegistration, trail).await
    }

    /// Deregistration always tells the HSS, then always drops the IRS --
    /// the cache holds no state the HSS outcome should gate the deletion
    /// on.
    async fn deregistration(&self, impu: &str, trail: Trail) -> anyhow::Result<(OrchestratorStatus, Option<ImplicitRegistrationSet>)> {
        let _ = self
            .call_hss(
                "server_assignment",
                self.hss.server_assignment(
                    ServerAssignmentRequest {
                        impu: impu.to_string(),
                        server_name: String::new(),
                        assignment_type: AssignmentType::Deregistration,
                    },
                    trail,
                ),
            )
            .await?;

        match self.reconciler.delete_irs(impu, trail).await? {
            DeleteIrsOutcome::Deleted => Ok((OrchestratorStatus::Success, None)),
            DeleteIrsOutcome::NotFound => Ok((OrchestratorStatus::NotFound, None)),
            DeleteIrsOutcome::Contention => Ok((OrchestratorStatus::Error, None)),
        }
    }

    /// The HSS pushed an unsolicited profile update; merge it into whatever
    /// is cached without altering registration state.
    async fn push_profile(&self, impu: &str, trail: Trail) -> anyhow::Result<(OrchestratorStatus, Option<ImplicitRegistrationSet>)> {
        let Some(answer) = self
            .call_hss("location_info", self.hss.location_info(LocationInfoRequest { impu: impu.to_string() }, trail))
            .await?
        else {
            return Ok((OrchestratorStatus::Timeout, None));
        };
        if answer.code != HssAnswerCode::Success {
            return Ok((answer.code.into(), None));
        }

        let irs = match self.reconciler.get_irs(impu, trail).await? {
            GetIrsResult::Found(irs) => irs,
            GetIrsResult::NotFound | GetIrsResult::Corrupt => self.reconciler.create_irs(impu),
        };
        self.reconciler.put_irs(&irs, trail).await?;
        Ok((OrchestratorStatus::Success, Some(irs)))
    }

    /// User-Authorization always answers immediately with a fabricated
    /// success and this node's default server name -- there is no cache
    /// lookup and no HSS round-trip on this path at all.
    pub async fn user_auth(&self, _request: UserAuthRequest, _trail: Trail) -> anyhow::Result<UserAuthAnswer> {
        Ok(UserAuthAnswer {
            code: HssAnswerCode::Success,
            server_name: Some(self.default_server_name.clone()),
        })
    }

    #[must_use]
    pub fn assigned_impis(&self, irs: &ImplicitRegistrationSet) -> BTreeSet<String> {
        irs.default.impis.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use ims_cache_core::ChargingAddresses;

    use super::*;
    use crate::service::hss::{
        LocationInfoAnswer, MultimediaAuthAnswer, MultimediaAuthRequest, ServerAssignmentAnswer,
    };
    use crate::storage::engines::HashMapStorage;
    use crate::storage::impls::{LocalBlobStore, StorageConfig};
    use crate::storage::ImpuStore;

    struct StubHss {
        assignment_code: HssAnswerCode,
        service_profile: Option<String>,
    }

    #[async_trait]
    impl HssConnection for StubHss {
        async fn multimedia_auth(&self, _request: MultimediaAuthRequest, _trail: Trail) -> anyhow::Result<MultimediaAuthAnswer> {
            unimplemented!()
        }

        async fn user_auth(&self, _request: UserAuthRequest, _trail: Trail) -> anyhow::Result<UserAuthAnswer> {
            Ok(UserAuthAnswer {
                code: HssAnswerCode::Success,
                server_name: Some("hss-assigned".to_string()),
            })
        }

        async fn location_info(&self, _request: LocationInfoRequest, _trail: Trail) -> anyhow::Result<LocationInfoAnswer> {
            Ok(LocationInfoAnswer {
                code: HssAnswerCode::Success,
                server_name: Some("scscf-1".to_string()),
            })
        }

        async fn server_assignment(&self, _request: ServerAssignmentRequest, _trail: Trail) -> anyhow::Result<ServerAssignmentAnswer> {
            Ok(ServerAssignmentAnswer {
                code: self.assignment_code,
                service_profile: self.service_profile.clone(),
                charging_addresses: ChargingAddresses::default(),
            })
        }
    }

    fn make_orchestrator(assignment_code: HssAnswerCode, service_profile: Option<String>) -> Orchestrator<StubHss> {
        let local = Arc::new(ImpuStore::new(Arc::new(LocalBlobStore::new(
            "local",
            Box::new(HashMapStorage::new()),
            Box::new(HashMapStorage::new()),
            StorageConfig::default(),
        ))));
        let reconciler = Arc::new(Reconciler::new(local, vec![], 3, 7200));
        let hss = Arc::new(StubHss {
            assignment_code,
            service_profile,
        });
        Orchestrator::new(reconciler, hss, "default-server".to_string(), 5000)
    }

    #[tokio::test]
    async fn registration_assigns_and_caches_profile() {
        let orchestrator = make_orchestrator(HssAnswerCode::Success, Some("<IMSSubscription/>".to_string()));
        let (status, irs) = orchestrator
            .handle(RequestType::Registration, "sip:a@x", "scscf-1", Trail::NONE)
            .await
            .unwrap();
        assert_eq!(status, OrchestratorStatus::Success);
        let irs = irs.unwrap();
        assert_eq!(irs.default.registration_state, RegistrationState::Registered);
        assert_eq!(irs.default.service_profile, "<IMSSubscription/>");
    }

    #[tokio::test]
    async fn registration_forbidden_surfaces_hss_answer_code() {
        let orchestrator = make_orchestrator(HssAnswerCode::Forbidden, None);
        let (status, irs) = orchestrator
            .handle(RequestType::Registration, "sip:a@x", "scscf-1", Trail::NONE)
            .await
            .unwrap();
        assert_eq!(status, OrchestratorStatus::Forbidden);
        assert!(irs.is_none());
    }

    #[tokio::test]
    async fn re_registration_is_a_cache_hit_when_already_registered() {
        let orchestrator = make_orchestrator(HssAnswerCode::Success, Some("profile".to_string()));
        orchestrator
            .handle(RequestType::Registration, "sip:a@x", "scscf-1", Trail::NONE)
            .await
            .unwrap();

        let (status, irs) = orchestrator
            .handle(RequestType::ReRegistration, "sip:a@x", "scscf-1", Trail::NONE)
            .await
            .unwrap();
        assert_eq!(status, OrchestratorStatus::Success);
        assert_eq!(irs.unwrap().default.registration_state, RegistrationState::Registered);
    }

    #[tokio::test]
    async fn deregistration_on_unknown_impu_is_not_found() {
        let orchestrator = make_orchestrator(HssAnswerCode::Success, None);
        let (status, irs) = orchestrator.handle(RequestType::Deregistration, "sip:missing@x", "", Trail::NONE).await.unwrap();
        assert_eq!(status, OrchestratorStatus::NotFound);
        assert!(irs.is_none());
    }

    #[tokio::test]
    async fn deregistration_tells_the_hss_and_always_drops_the_irs_even_when_the_hss_refuses() {
        let reconciler = {
            let local = Arc::new(ImpuStore::new(Arc::new(LocalBlobStore::new(
                "local",
                Box::new(HashMapStorage::new()),
                Box::new(HashMapStorage::new()),
                StorageConfig::default(),
            ))));
            Arc::new(Reconciler::new(local, vec![], 3, 7200))
        };

        let registering = Orchestrator::new(
            Arc::clone(&reconciler),
            Arc::new(StubHss {
                assignment_code: HssAnswerCode::Success,
                service_profile: None,
            }),
            "default-server".to_string(),
            5000,
        );
        registering
            .handle(RequestType::Registration, "sip:a@x", "scscf-1", Trail::NONE)
            .await
            .unwrap();

        // The HSS refuses the deregistration SAR; the IRS must still be
        // dropped unconditionally.
        let deregistering = Orchestrator::new(
            reconciler,
            Arc::new(StubHss {
                assignment_code: HssAnswerCode::Forbidden,
                service_profile: None,
            }),
            "default-server".to_string(),
            5000,
        );
        let (status, irs) = deregistering.handle(RequestType::Deregistration, "sip:a@x", "", Trail::NONE).await.unwrap();
        assert_eq!(status, OrchestratorStatus::Success);
        assert!(irs.is_none());
        assert_eq!(deregistering.reconciler.get_irs("sip:a@x", Trail::NONE).await.unwrap(), GetIrsResult::NotFound);
    }

    #[tokio::test]
    async fn user_auth_always_answers_success_on_a_registered_cache_hit() {
        let orchestrator = make_orchestrator(HssAnswerCode::Success, Some("profile".to_string()));
        orchestrator
            .handle(RequestType::Registration, "sip:a@x", "scscf-1", Trail::NONE)
            .await
            .unwrap();

        let answer = orchestrator
            .user_auth(
                UserAuthRequest {
                    impi: "impi@x".to_string(),
                    impu: "sip:a@x".to_string(),
                    visited_network: "visited.example".to_string(),
                },
                Trail::NONE,
            )
            .await
            .unwrap();
        assert_eq!(answer.code, HssAnswerCode::Success);
        assert_eq!(answer.server_name, Some("default-server".to_string()));
    }

    #[tokio::test]
    async fn user_auth_always_answers_success_on_a_cache_miss() {
        let orchestrator = make_orchestrator(HssAnswerCode::Success, None);
        let answer = orchestrator
            .user_auth(
                UserAuthRequest {
                    impi: "impi@x".to_string(),
                    impu: "sip:unknown@x".to_string(),
                    visited_network: "visited.example".to_string(),
                },
                Trail::NONE,
            )
            .await
            .unwrap();
        assert_eq!(answer.code, HssAnswerCode::Success);
        assert_eq!(answer.server_name, Some("default-server".to_string()));
    }
}
