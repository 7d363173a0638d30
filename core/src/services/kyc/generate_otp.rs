//! First step of the flow: issue an OTP and record a PENDING verification

use serde_json::json;
use uuid::Uuid;

use ekyc_shared::utils::{is_valid_subject_number, mask_subject_number};

use super::service::{as_internal, KycService};
use super::traits::{AddressResolver, KycProvider, ProfileUpdater};
use super::types::{GenerateOtpRequest, GenerateOtpResult};
use crate::context::RequestContext;
use crate::domain::entities::audit::{actions, resource_types};
use crate::domain::entities::VerificationRecord;
use crate::domain::value_objects::Consent;
use crate::errors::{DomainError, DomainResult, KycError, ValidationError};
use crate::repositories::VerificationRepository;

impl<R, P, U, A> KycService<R, P, U, A>
where
    R: VerificationRepository,
    P: KycProvider,
    U: ProfileUpdater,
    A: AddressResolver,
{
    /// Ask the provider to send an OTP for `request.subject_number`.
    ///
    /// Nothing is persisted unless the provider accepted the request.
    pub async fn generate_otp(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        request: GenerateOtpRequest,
    ) -> DomainResult<GenerateOtpResult> {
        let subject_masked = mask_subject_number(&request.subject_number);
        tracing::info!(user_id = %user_id, subject_masked = %subject_masked, "Generating KYC OTP");

        if !is_valid_subject_number(&request.subject_number) {
            return Err(ValidationError::InvalidFormat {
                field: "aadhaar_number".to_string(),
            }
            .into());
        }
        let consent = Consent::try_from(request.consent)?;

        if let Err(e) = self.rate_limiter.check_issue(&request.subject_number).await {
            let (action, reason) = match &e {
                DomainError::Kyc(KycError::RateLimited { .. }) => {
                    (actions::KYC_OTP_RATE_LIMITED, "rate_limited")
                }
                _ => (actions::KYC_OTP_GENERATION_FAILED, "rate_limit_check_failed"),
            };
            self.audit
                .log_user_action_with_error(
                    user_id,
                    action,
                    resource_types::KYC_VERIFICATION,
                    "",
                    &e.to_string(),
                    json!({ "subject_masked": subject_masked, "reason": reason }),
                )
                .await;
            return Err(e);
        }

        let issued = match self
            .provider
            .issue_otp(ctx, &request.subject_number, &consent)
            .await
        {
            Ok(issued) => issued,
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    subject_masked = %subject_masked,
                    error = %e,
                    "Provider rejected OTP issue"
                );
                self.audit
                    .log_user_action_with_error(
                        user_id,
                        actions::KYC_OTP_GENERATION_FAILED,
                        resource_types::KYC_VERIFICATION,
                        "",
                        &e.to_string(),
                        json!({ "subject_masked": subject_masked }),
                    )
                    .await;
                return Err(e);
            }
        };

        let record = VerificationRecord::new_pending(user_id, request.subject_number, &issued);
        if let Err(e) = self.repository.create(&record).await {
            tracing::error!(
                user_id = %user_id,
                reference_id = %issued.reference_id,
                error = %e,
                "Failed to store verification record"
            );
            self.audit
                .log_user_action_with_error(
                    user_id,
                    actions::KYC_OTP_GENERATION_FAILED,
                    resource_types::KYC_VERIFICATION,
                    "",
                    &e.to_string(),
                    json!({ "reference_id": issued.reference_id }),
                )
                .await;
            return Err(as_internal(e, "failed to store verification record"));
        }

        let mut details = json!({
            "reference_id": issued.reference_id,
            "transaction_id": issued.transaction_id,
            "subject_masked": subject_masked,
        });
        if let Some(meta) = consent.metadata() {
            details["consent_purpose"] = json!(meta.purpose);
            details["consent_version"] = json!(meta.version);
            details["consent_timestamp"] = json!(meta.timestamp);
        }
        self.audit
            .log_user_action(
                user_id,
                actions::KYC_OTP_GENERATED,
                resource_types::KYC_VERIFICATION,
                &record.id.to_string(),
                details,
            )
            .await;

        tracing::info!(
            user_id = %user_id,
            verification_id = %record.id,
            reference_id = %record.reference_id,
            "KYC OTP issued"
        );

        Ok(GenerateOtpResult {
            verification_id: record.id,
            expires_at: record.expires_at(self.config.otp_expiration_seconds),
            reference_id: issued.reference_id,
            transaction_id: issued.transaction_id,
            message: issued.message,
        })
    }
}
