//! Verification orchestrator wiring the provider, store and collaborators together

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::config::KycServiceConfig;
use super::rate_limiter::NoopIssueRateLimiter;
use super::traits::{AddressResolver, IssueRateLimiter, KycProvider, ProfileUpdater};
use super::types::KycStatusView;
use crate::domain::entities::audit::{actions, resource_types};
use crate::errors::{DomainError, DomainResult, ErrorKind};
use crate::repositories::VerificationRepository;
use crate::services::audit::AuditSink;

/// Stateful core of the OTP verification flow.
///
/// External calls within one operation run sequentially; the only shared
/// mutable state lives inside the provider's token cache.
pub struct KycService<R, P, U, A>
where
    R: VerificationRepository,
    P: KycProvider,
    U: ProfileUpdater,
    A: AddressResolver,
{
    pub(super) repository: Arc<R>,
    pub(super) provider: Arc<P>,
    pub(super) profiles: Arc<U>,
    pub(super) addresses: Arc<A>,
    pub(super) audit: Arc<dyn AuditSink>,
    pub(super) rate_limiter: Arc<dyn IssueRateLimiter>,
    pub(super) config: KycServiceConfig,
}

impl<R, P, U, A> KycService<R, P, U, A>
where
    R: VerificationRepository,
    P: KycProvider,
    U: ProfileUpdater,
    A: AddressResolver,
{
    /// Create a new orchestrator with no issue rate limiting
    pub fn new(
        repository: Arc<R>,
        provider: Arc<P>,
        profiles: Arc<U>,
        addresses: Arc<A>,
        audit: Arc<dyn AuditSink>,
        config: KycServiceConfig,
    ) -> Self {
        Self {
            repository,
            provider,
            profiles,
            addresses,
            audit,
            rate_limiter: Arc::new(NoopIssueRateLimiter),
            config,
        }
    }

    /// Replace the issue rate limiter
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn IssueRateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn config(&self) -> &KycServiceConfig {
        &self.config
    }

    /// Latest verification state for `user_id`
    pub async fn get_kyc_status(&self, user_id: Uuid) -> DomainResult<KycStatusView> {
        let record = match self.repository.get_latest_by_user(user_id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::info!(user_id = %user_id, error = %e, "No verification record for user");
                self.audit
                    .log_user_action_with_error(
                        user_id,
                        actions::KYC_STATUS_CHECKED,
                        resource_types::KYC_VERIFICATION,
                        "",
                        &e.to_string(),
                        json!({}),
                    )
                    .await;
                return Err(e);
            }
        };

        self.audit
            .log_user_action(
                user_id,
                actions::KYC_STATUS_CHECKED,
                resource_types::KYC_VERIFICATION,
                &record.id.to_string(),
                json!({ "kyc_status": record.kyc_status.as_str() }),
            )
            .await;

        Ok(KycStatusView {
            kyc_status: record.kyc_status,
            verified: record.is_verified(),
            verified_at: record.otp_verified_at,
            attempts: record.attempts,
            last_attempt_at: record.last_attempt_at,
        })
    }
}

/// Collapse a collaborator failure on the success path into `Internal`
pub(super) fn as_internal(error: DomainError, context: &str) -> DomainError {
    match error.kind() {
        ErrorKind::Internal => error.context(context),
        _ => DomainError::internal(format!("{}: {}", context, error)),
    }
}
