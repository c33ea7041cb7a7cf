//! The HSS collaborator contract: the request/answer shapes the Orchestrator
//! exchanges with the provisioned Home Subscriber Server, and the narrow
//! trait a Diameter (Cx interface) client implements to plug in underneath.
//!
//! This crate ships no Diameter stack -- wiring an `HssConnection` onto a
//! real transport is the provisioning front end's job.

use async_trait::async_trait;
use ims_cache_core::{ChargingAddresses, Trail};

/// Coarse outcome of an HSS answer, collapsed from whatever result-code
/// vocabulary the underlying Diameter transport actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HssAnswerCode {
    Success,
    NotFound,
    Forbidden,
    Timeout,
    ServerUnavailable,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct SipAuthItem {
    pub scheme: String,
    pub authenticate: Vec<u8>,
    pub authorize: Vec<u8>,
    pub confidentiality_key: Vec<u8>,
    pub integrity_key: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MultimediaAuthRequest {
    pub impi: String,
    pub impu: String,
    pub auth_scheme: String,
}

#[derive(Debug, Clone)]
pub struct MultimediaAuthAnswer {
    pub code: HssAnswerCode,
    pub sip_auth_items: Vec<SipAuthItem>,
}

#[derive(Debug, Clone)]
pub struct UserAuthRequest {
    pub impi: String,
    pub impu: String,
    pub visited_network: String,
}

#[derive(Debug, Clone)]
pub struct UserAuthAnswer {
    pub code: HssAnswerCode,
    pub server_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LocationInfoRequest {
    pub impu: String,
}

#[derive(Debug, Clone)]
pub struct LocationInfoAnswer {
    pub code: HssAnswerCode,
    pub server_name: Option<String>,
}

/// Mirrors the Cx Server-Assignment-Type values the Orchestrator's dispatch
/// table actually drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentType {
    Registration,
    ReRegistration,
    UnregisteredUser,
    Deregistration,
}

#[derive(Debug, Clone)]
pub struct ServerAssignmentRequest {
    pub impu: String,
    pub server_name: String,
    pub assignment_type: AssignmentType,
}

#[derive(Debug, Clone)]
pub struct ServerAssignmentAnswer {
    pub code: HssAnswerCode,
    pub service_profile: Option<String>,
    pub charging_addresses: ChargingAddresses,
}

/// The narrow async collaborator interface the Orchestrator drives.
/// Implementations own the actual Diameter Cx transaction.
#[async_trait]
pub trait HssConnection: Send + Sync {
    async fn multimedia_auth(
        &self,
        request: MultimediaAuthRequest,
        trail: Trail,
    ) -> anyhow::Result<MultimediaAuthAnswer>;

    async fn user_auth(&self, request: UserAuthRequest, trail: Trail) -> anyhow::Result<UserAuthAnswer>;

    async fn location_info(
        &self,
        request: LocationInfoRequest,
        trail: Trail,
    ) -> anyhow::Result<LocationInfoAnswer>;

    async fn server_assignment(
        &self,
        request: ServerAssignmentRequest,
        trail: Trail,
    ) -> anyhow::Result<ServerAssignmentAnswer>;
}
