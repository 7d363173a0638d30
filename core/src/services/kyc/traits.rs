//! Collaborators consumed by the verification orchestrator

use async_trait::async_trait;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::domain::entities::{Address, ProfileUpdate, UserProfile};
use crate::domain::value_objects::{Consent, KycData, OtpIssued};
use crate::errors::DomainResult;

/// External e-KYC provider.
///
/// Errors are already classified into the domain taxonomy; retries happen
/// inside the implementation and are invisible to callers.
#[async_trait]
pub trait KycProvider: Send + Sync {
    /// Send an OTP to the holder of `subject_number`
    async fn issue_otp(
        &self,
        ctx: &RequestContext,
        subject_number: &str,
        consent: &Consent,
    ) -> DomainResult<OtpIssued>;

    /// Submit the OTP for a previously issued challenge
    async fn verify_otp(
        &self,
        ctx: &RequestContext,
        reference_id: &str,
        otp: &str,
    ) -> DomainResult<KycData>;
}

/// Writes verification results onto the user's profile
#[async_trait]
pub trait ProfileUpdater: Send + Sync {
    /// Apply the `Some` fields of `update`; must be idempotent
    async fn apply_update(&self, user_id: Uuid, update: &ProfileUpdate) -> DomainResult<()>;

    async fn get_profile(&self, user_id: Uuid) -> DomainResult<UserProfile>;
}

/// Address book with dedup on normalized full-address text
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Return `(address_id, was_created)`; an equivalent existing address is reused
    async fn find_or_create(&self, candidate: &Address) -> DomainResult<(Uuid, bool)>;

    async fn get_address(&self, address_id: Uuid) -> DomainResult<Address>;
}

/// Policy hook consulted before every OTP issue
#[async_trait]
pub trait IssueRateLimiter: Send + Sync {
    async fn check_issue(&self, subject_number: &str) -> DomainResult<()>;
}
