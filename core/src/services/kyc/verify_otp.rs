//! Second step of the flow: verify the OTP and reconcile the provider's data

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use ekyc_shared::utils::is_valid_otp;

use super::service::{as_internal, KycService};
use super::traits::{AddressResolver, KycProvider, ProfileUpdater};
use super::types::{SideEffect, SideEffectOutcome, VerifyOtpRequest, VerifyOtpResult};
use crate::context::RequestContext;
use crate::domain::entities::audit::{actions, resource_types};
use crate::domain::entities::{Address, OtpAttemptLog, ProfileUpdate, VerificationRecord};
use crate::domain::value_objects::KycData;
use crate::errors::{DomainError, DomainResult, KycError, ValidationError};
use crate::repositories::VerificationRepository;

impl<R, P, U, A> KycService<R, P, U, A>
where
    R: VerificationRepository,
    P: KycProvider,
    U: ProfileUpdater,
    A: AddressResolver,
{
    /// Verify `request.otp` for the challenge identified by `request.reference_id`.
    ///
    /// Only the record's owner may complete it. Expiry and attempt limits are
    /// checked before the provider is contacted. Photo upload, address
    /// resolution and re-fetches are best-effort and reported in
    /// `side_effects`; a failed profile update or record write aborts.
    pub async fn verify_otp(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        request: VerifyOtpRequest,
    ) -> DomainResult<VerifyOtpResult> {
        let reference_id = request.reference_id.trim().to_string();
        tracing::info!(user_id = %user_id, reference_id = %reference_id, "Verifying KYC OTP");

        if reference_id.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "reference_id".to_string(),
            }
            .into());
        }
        if !is_valid_otp(&request.otp) {
            return Err(ValidationError::InvalidFormat {
                field: "otp".to_string(),
            }
            .into());
        }

        let mut record = match self.repository.get_by_reference_id(&reference_id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(user_id = %user_id, reference_id = %reference_id, error = %e, "Verification record not found");
                self.audit_failure(
                    user_id,
                    actions::KYC_OTP_VERIFICATION_FAILED,
                    "",
                    &e,
                    json!({ "reference_id": reference_id, "reason": "verification_record_not_found" }),
                )
                .await;
                return Err(e);
            }
        };

        self.check_preconditions(user_id, &record).await?;

        let data = match self.provider.verify_otp(ctx, &reference_id, &request.otp).await {
            Ok(data) => data,
            Err(e) => return Err(self.handle_provider_failure(user_id, &record, e).await),
        };

        let now = Utc::now();
        let mut side_effects = Vec::with_capacity(5);

        let attempt = OtpAttemptLog::succeeded(record.id, record.attempts + 1);
        side_effects.push(match self.repository.append_attempt(&attempt).await {
            Ok(()) => SideEffectOutcome::completed(SideEffect::AttemptLog),
            Err(e) => {
                tracing::warn!(verification_id = %record.id, error = %e, "Failed to append OTP attempt log");
                SideEffectOutcome::failed(SideEffect::AttemptLog, e.to_string())
            }
        });

        let (photo_url, photo_outcome) = self.store_photo(user_id, &data, now.timestamp()).await;
        side_effects.push(photo_outcome);

        let (address_id, address_outcome) = self.resolve_address(user_id, &data).await;
        side_effects.push(address_outcome);

        let update = ProfileUpdate::kyc_verified(&data.name, photo_url.clone(), address_id, now);
        if let Err(e) = self.profiles.apply_update(user_id, &update).await {
            tracing::error!(user_id = %user_id, error = %e, "Failed to update user profile");
            self.audit
                .log_user_action_with_error(
                    user_id,
                    actions::KYC_PROFILE_UPDATE_FAILED,
                    resource_types::USER_PROFILE,
                    &user_id.to_string(),
                    &e.to_string(),
                    json!({ "reference_id": reference_id }),
                )
                .await;
            self.discard_photo(photo_url.as_deref()).await;
            return Err(as_internal(e, "failed to update user profile"));
        }

        record.mark_verified(&data, photo_url.clone(), user_id, now)?;
        if let Err(e) = self.repository.update(&record).await {
            if let DomainError::Kyc(KycError::AlreadyVerified) = e {
                // A concurrent verify won the PENDING -> VERIFIED transition
                tracing::warn!(verification_id = %record.id, "Verification completed concurrently");
                self.audit_failure(
                    user_id,
                    actions::KYC_OTP_ALREADY_VERIFIED,
                    &record.id.to_string(),
                    &e,
                    json!({ "reference_id": reference_id, "reason": "concurrent_verification" }),
                )
                .await;
                return Err(e);
            }
            tracing::error!(verification_id = %record.id, error = %e, "Failed to persist verified record");
            self.audit_failure(
                user_id,
                actions::KYC_RECORD_UPDATE_FAILED,
                &record.id.to_string(),
                &e,
                json!({ "reference_id": reference_id }),
            )
            .await;
            return Err(as_internal(e, "failed to persist verification"));
        }

        self.audit
            .log_user_action(
                user_id,
                actions::KYC_VERIFIED,
                resource_types::KYC_VERIFICATION,
                &record.id.to_string(),
                json!({
                    "reference_id": reference_id,
                    "profile_id": user_id,
                    "address_id": address_id,
                    "photo_url_present": photo_url.is_some(),
                    "name": data.name,
                }),
            )
            .await;

        tracing::info!(
            user_id = %user_id,
            verification_id = %record.id,
            reference_id = %reference_id,
            "KYC OTP verified"
        );

        let profile = match self.profiles.get_profile(user_id).await {
            Ok(profile) => {
                side_effects.push(SideEffectOutcome::completed(SideEffect::ProfileRefetch));
                Some(profile)
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to fetch user profile for response");
                side_effects.push(SideEffectOutcome::failed(SideEffect::ProfileRefetch, e.to_string()));
                None
            }
        };

        let address = match address_id {
            Some(id) => match self.addresses.get_address(id).await {
                Ok(address) => {
                    side_effects.push(SideEffectOutcome::completed(SideEffect::AddressRefetch));
                    Some(address)
                }
                Err(e) => {
                    tracing::warn!(user_id = %user_id, address_id = %id, error = %e, "Failed to fetch address for response");
                    side_effects.push(SideEffectOutcome::failed(SideEffect::AddressRefetch, e.to_string()));
                    None
                }
            },
            None => {
                side_effects.push(SideEffectOutcome::skipped(
                    SideEffect::AddressRefetch,
                    "no address linked",
                ));
                None
            }
        };

        Ok(VerifyOtpResult {
            verification_id: record.id,
            reference_id,
            profile_id: user_id,
            kyc_data: data,
            photo_url,
            address_id,
            profile,
            address,
            contacts: Vec::new(),
            side_effects,
        })
    }

    /// Ownership, terminal state, expiry and attempt checks, in that order
    async fn check_preconditions(&self, user_id: Uuid, record: &VerificationRecord) -> DomainResult<()> {
        let record_id = record.id.to_string();

        if !record.is_owned_by(user_id) {
            tracing::warn!(
                user_id = %user_id,
                owner_id = %record.user_id,
                reference_id = %record.reference_id,
                "Caller does not own verification record"
            );
            let err = DomainError::from(KycError::OwnershipViolation);
            self.audit_failure(
                user_id,
                actions::KYC_OTP_VERIFICATION_UNAUTHORIZED,
                &record_id,
                &err,
                json!({ "reference_id": record.reference_id, "verification_user_id": record.user_id }),
            )
            .await;
            return Err(err);
        }

        if record.is_verified() {
            let err = DomainError::from(KycError::AlreadyVerified);
            self.audit_failure(
                user_id,
                actions::KYC_OTP_ALREADY_VERIFIED,
                &record_id,
                &err,
                json!({ "reference_id": record.reference_id }),
            )
            .await;
            return Err(err);
        }

        let now = Utc::now();
        let validity = self.config.otp_expiration_seconds;
        if record.is_expired(now, validity) {
            let elapsed = record.elapsed_since_issue(now).num_seconds();
            tracing::warn!(
                user_id = %user_id,
                reference_id = %record.reference_id,
                elapsed_seconds = elapsed,
                expiration_seconds = validity,
                "OTP has expired"
            );
            let err = DomainError::from(KycError::OtpExpired {
                elapsed_seconds: elapsed,
                validity_seconds: validity,
            });
            self.audit_failure(
                user_id,
                actions::KYC_OTP_EXPIRED,
                &record_id,
                &err,
                json!({
                    "reference_id": record.reference_id,
                    "elapsed_seconds": elapsed,
                    "expiration_seconds": validity,
                }),
            )
            .await;
            return Err(err);
        }

        let max_attempts = self.config.otp_max_attempts;
        if record.attempts_exhausted(max_attempts) {
            tracing::warn!(
                user_id = %user_id,
                reference_id = %record.reference_id,
                attempts = record.attempts,
                max_attempts,
                "Maximum OTP attempts exceeded"
            );
            let err = DomainError::from(KycError::AttemptsExhausted {
                attempts: record.attempts,
                max_attempts,
            });
            self.audit_failure(
                user_id,
                actions::KYC_OTP_MAX_ATTEMPTS_EXCEEDED,
                &record_id,
                &err,
                json!({
                    "reference_id": record.reference_id,
                    "attempts": record.attempts,
                    "max_attempts": max_attempts,
                }),
            )
            .await;
            return Err(err);
        }

        Ok(())
    }

    /// Count the failed call, record it, and shape the error for the caller
    async fn handle_provider_failure(
        &self,
        user_id: Uuid,
        record: &VerificationRecord,
        error: DomainError,
    ) -> DomainError {
        let record_id = record.id.to_string();

        if error.is_cancelled() {
            tracing::info!(user_id = %user_id, reference_id = %record.reference_id, "OTP verification cancelled by caller");
            self.audit_failure(
                user_id,
                actions::KYC_OTP_VERIFICATION_FAILED,
                &record_id,
                &error,
                json!({ "reference_id": record.reference_id, "reason": "cancelled" }),
            )
            .await;
            return error;
        }

        let attempts = match self.repository.increment_attempts(record.id).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(verification_id = %record.id, error = %e, "Failed to increment attempts counter");
                record.attempts + 1
            }
        };

        let attempt = OtpAttemptLog::failed(record.id, attempts, error.to_string());
        if let Err(e) = self.repository.append_attempt(&attempt).await {
            tracing::warn!(verification_id = %record.id, error = %e, "Failed to append OTP attempt log");
        }

        tracing::error!(
            user_id = %user_id,
            reference_id = %record.reference_id,
            attempts,
            error = %error,
            "Provider rejected OTP verification"
        );
        self.audit_failure(
            user_id,
            actions::KYC_OTP_VERIFICATION_FAILED,
            &record_id,
            &error,
            json!({ "reference_id": record.reference_id, "attempts": attempts }),
        )
        .await;

        match error {
            DomainError::Validation { message } => KycError::OtpRejected {
                message,
                attempts_remaining: self.config.otp_max_attempts.saturating_sub(attempts),
            }
            .into(),
            other => other.context("OTP verification failed"),
        }
    }

    async fn store_photo(
        &self,
        user_id: Uuid,
        data: &KycData,
        stamp: i64,
    ) -> (Option<String>, SideEffectOutcome) {
        let encoded = match data.photo.as_deref() {
            Some(photo) if !photo.is_empty() => photo,
            _ => {
                return (
                    None,
                    SideEffectOutcome::skipped(SideEffect::PhotoUpload, "no photo in provider response"),
                )
            }
        };

        let bytes = match STANDARD.decode(encoded) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to decode photo, continuing without photo");
                return (
                    None,
                    SideEffectOutcome::failed(SideEffect::PhotoUpload, format!("invalid base64 photo: {}", e)),
                );
            }
        };

        if bytes.len() > self.config.photo_max_size_bytes {
            tracing::warn!(
                user_id = %user_id,
                size = bytes.len(),
                max_size = self.config.photo_max_size_bytes,
                "Photo exceeds size limit, continuing without photo"
            );
            return (
                None,
                SideEffectOutcome::failed(
                    SideEffect::PhotoUpload,
                    format!(
                        "photo is {} bytes, limit is {}",
                        bytes.len(),
                        self.config.photo_max_size_bytes
                    ),
                ),
            );
        }

        let file_name = format!("kyc_{}.jpg", stamp);
        match self.repository.upload_photo(user_id, &bytes, &file_name).await {
            Ok(url) => {
                tracing::info!(user_id = %user_id, "Photo uploaded");
                (Some(url), SideEffectOutcome::completed(SideEffect::PhotoUpload))
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to upload photo, continuing without photo");
                (None, SideEffectOutcome::failed(SideEffect::PhotoUpload, e.to_string()))
            }
        }
    }

    async fn resolve_address(&self, user_id: Uuid, data: &KycData) -> (Option<Uuid>, SideEffectOutcome) {
        let candidate = Address::from_kyc(user_id, &data.address);
        if candidate.full_address.is_empty() {
            return (
                None,
                SideEffectOutcome::skipped(SideEffect::AddressResolution, "provider returned no address"),
            );
        }

        match self.addresses.find_or_create(&candidate).await {
            Ok((id, was_created)) => {
                tracing::info!(user_id = %user_id, address_id = %id, was_created, "Address resolved");
                (Some(id), SideEffectOutcome::completed(SideEffect::AddressResolution))
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to resolve address, continuing");
                (None, SideEffectOutcome::failed(SideEffect::AddressResolution, e.to_string()))
            }
        }
    }

    async fn discard_photo(&self, url: Option<&str>) {
        if let Some(url) = url {
            if let Err(e) = self.repository.delete_photo(url).await {
                tracing::warn!(error = %e, "Failed to delete orphaned photo");
            }
        }
    }

    async fn audit_failure(
        &self,
        user_id: Uuid,
        action: &str,
        resource_id: &str,
        error: &DomainError,
        details: JsonValue,
    ) {
        self.audit
            .log_user_action_with_error(
                user_id,
                action,
                resource_types::KYC_VERIFICATION,
                resource_id,
                &error.to_string(),
                details,
            )
            .await;
    }
}
