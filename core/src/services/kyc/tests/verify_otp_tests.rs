//! Unit tests for OTP verification and reconciliation

use chrono::{Duration, Utc};
use std::time::Duration as StdDuration;
use uuid::Uuid;

use super::fixtures::Harness;
use crate::context::RequestContext;
use crate::domain::entities::{actions, AttemptOutcome, VerificationStatus};
use crate::domain::value_objects::KycData;
use crate::errors::{DomainError, ErrorKind, KycError, RetryHint, ValidationError};
use crate::services::kyc::mocks::{sample_kyc_data, MOCK_VALID_OTP};
use crate::services::kyc::{SideEffect, SideEffectStatus, VerifyOtpRequest};
use crate::repositories::VerificationRepository;

fn verify_request(reference_id: &str, otp: &str) -> VerifyOtpRequest {
    VerifyOtpRequest {
        reference_id: reference_id.to_string(),
        otp: otp.to_string(),
    }
}

async fn verify(h: &Harness, user_id: Uuid, reference_id: &str, otp: &str) -> Result<crate::services::kyc::VerifyOtpResult, DomainError> {
    h.service
        .verify_otp(&RequestContext::background(), user_id, verify_request(reference_id, otp))
        .await
}

/// Rewind the stored issue time so the record looks `seconds` old
fn age_record(h: &Harness, reference_id: &str, seconds: i64) {
    let mut record = h.repository.find_by_reference(reference_id).unwrap();
    record.otp_requested_at = Utc::now() - Duration::seconds(seconds);
    h.repository.insert(record);
}

#[tokio::test]
async fn test_verify_otp_success_marks_record_verified() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;

    let result = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap();

    assert_eq!(result.reference_id, reference_id);
    assert_eq!(result.profile_id, user_id);
    assert_eq!(result.kyc_data.name, "Asha Rao");
    assert!(result.contacts.is_empty());

    let record = h.repository.find_by_reference(&reference_id).unwrap();
    assert_eq!(record.verification_status, VerificationStatus::Verified);
    assert_eq!(record.kyc_status, VerificationStatus::Verified);
    assert!(record.otp_verified_at.is_some());
    assert_eq!(record.name.as_deref(), Some("Asha Rao"));
    assert_eq!(
        record.date_of_birth.map(|d| d.to_string()).as_deref(),
        Some("1990-08-15")
    );
    assert_eq!(record.attempts, 0);
    assert_eq!(record.photo_url, result.photo_url);
    assert_eq!(h.audit_logs.actions().last().map(String::as_str), Some(actions::KYC_VERIFIED));
}

#[tokio::test]
async fn test_verify_otp_success_updates_profile_and_links_address() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;

    let result = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap();

    let photo_url = result.photo_url.clone().unwrap();
    assert_eq!(
        h.repository.photo_store().stored(&photo_url),
        Some(b"jpegdata".to_vec())
    );

    let profile = result.profile.clone().unwrap();
    assert!(profile.kyc_verified);
    assert!(profile.is_validated);
    assert_eq!(profile.full_name.as_deref(), Some("Asha Rao"));
    assert_eq!(profile.photo_url.as_deref(), Some(photo_url.as_str()));
    assert_eq!(profile.address_id, result.address_id);

    let address = result.address.clone().unwrap();
    assert_eq!(Some(address.id), result.address_id);
    assert_eq!(address.pincode.as_deref(), Some("560001"));
    assert_eq!(h.addresses.count(), 1);

    for effect in [
        SideEffect::AttemptLog,
        SideEffect::PhotoUpload,
        SideEffect::AddressResolution,
        SideEffect::ProfileRefetch,
        SideEffect::AddressRefetch,
    ] {
        assert_eq!(result.side_effect(effect), Some(&SideEffectStatus::Completed));
    }

    let attempts = h.repository.all_attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].outcome, AttemptOutcome::Success);
    assert_eq!(attempts[0].attempt_number, 1);
}

#[tokio::test]
async fn test_verify_otp_audit_never_contains_photo() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;

    verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap();

    let log = h.audit_logs.find_action(actions::KYC_VERIFIED).unwrap();
    assert_eq!(log.details["photo_url_present"], true);
    assert!(!log.details.to_string().contains("anBlZ2RhdGE="));
}

#[tokio::test]
async fn test_second_verification_uses_existing_address() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();

    let first_ref = h.issue(user_id).await;
    let first = verify(&h, user_id, &first_ref, MOCK_VALID_OTP).await.unwrap();

    let second_ref = h.issue(user_id).await;
    let second = verify(&h, user_id, &second_ref, MOCK_VALID_OTP).await.unwrap();

    assert_eq!(first.address_id, second.address_id);
    assert_eq!(h.addresses.count(), 1);
}

#[tokio::test]
async fn test_invalid_otp_format_is_rejected_before_lookup() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;

    let err = verify(&h, user_id, &reference_id, "12ab").await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::ValidationErr(ValidationError::InvalidFormat { .. })
    ));
    assert_eq!(h.provider.verify_calls(), 0);
}

#[tokio::test]
async fn test_blank_reference_is_required() {
    let h = Harness::new();

    let err = verify(&h, Uuid::new_v4(), "  ", MOCK_VALID_OTP).await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::ValidationErr(ValidationError::RequiredField { .. })
    ));
}

#[tokio::test]
async fn test_unknown_reference_is_not_found() {
    let h = Harness::new();

    let err = verify(&h, Uuid::new_v4(), "000000", MOCK_VALID_OTP).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(h.provider.verify_calls(), 0);
    let log = h.audit_logs.find_action(actions::KYC_OTP_VERIFICATION_FAILED).unwrap();
    assert_eq!(log.details["reason"], "verification_record_not_found");
}

#[tokio::test]
async fn test_other_users_reference_is_unauthorized() {
    let h = Harness::new();
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();
    let reference_id = h.issue(owner).await;

    let err = verify(&h, intruder, &reference_id, MOCK_VALID_OTP).await.unwrap_err();

    assert_eq!(err, DomainError::Kyc(KycError::OwnershipViolation));
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(h.provider.verify_calls(), 0);

    let record = h.repository.find_by_reference(&reference_id).unwrap();
    assert_eq!(record.attempts, 0);
    assert_eq!(record.verification_status, VerificationStatus::Pending);
    assert!(h
        .audit_logs
        .find_action(actions::KYC_OTP_VERIFICATION_UNAUTHORIZED)
        .is_some());
}

#[tokio::test]
async fn test_expired_otp_never_reaches_provider() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;
    age_record(&h, &reference_id, 301);

    let err = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::Kyc(KycError::OtpExpired {
            validity_seconds: 300,
            ..
        })
    ));
    assert_eq!(err.retry_hint(), RetryHint::RetryLater);
    assert_eq!(h.provider.verify_calls(), 0);
    assert_eq!(h.repository.find_by_reference(&reference_id).unwrap().attempts, 0);
}

#[tokio::test]
async fn test_otp_at_window_edge_is_still_accepted() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;
    age_record(&h, &reference_id, 290);

    assert!(verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.is_ok());
}

#[tokio::test]
async fn test_exhausted_attempts_never_reach_provider() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;
    let mut record = h.repository.find_by_reference(&reference_id).unwrap();
    record.attempts = 3;
    h.repository.insert(record);

    let err = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap_err();

    assert_eq!(
        err,
        DomainError::Kyc(KycError::AttemptsExhausted {
            attempts: 3,
            max_attempts: 3,
        })
    );
    assert_eq!(err.retry_hint(), RetryHint::Terminal);
    assert_eq!(h.provider.verify_calls(), 0);
}

#[tokio::test]
async fn test_wrong_otp_counts_attempt_and_allows_retry() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;

    let err = verify(&h, user_id, &reference_id, "654321").await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::Kyc(KycError::OtpRejected {
            attempts_remaining: 2,
            ..
        })
    ));
    assert_eq!(err.retry_hint(), RetryHint::RetryNow);

    let record = h.repository.find_by_reference(&reference_id).unwrap();
    assert_eq!(record.attempts, 1);
    assert!(record.last_attempt_at.is_some());
    assert_eq!(record.verification_status, VerificationStatus::Pending);

    let attempts = h.repository.all_attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].outcome, AttemptOutcome::Failed);
}

#[tokio::test]
async fn test_third_wrong_otp_is_terminal_and_fourth_is_blocked() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;

    verify(&h, user_id, &reference_id, "000001").await.unwrap_err();
    verify(&h, user_id, &reference_id, "000002").await.unwrap_err();
    let third = verify(&h, user_id, &reference_id, "000003").await.unwrap_err();
    assert_eq!(third.retry_hint(), RetryHint::Terminal);

    let fourth = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap_err();
    assert!(matches!(fourth, DomainError::Kyc(KycError::AttemptsExhausted { .. })));
    assert_eq!(h.provider.verify_calls(), 3);
}

#[tokio::test]
async fn test_provider_outage_counts_attempt_and_stays_internal() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;
    h.provider
        .set_verify_error(Some(DomainError::internal("upstream returned 502")));

    let err = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("OTP verification failed"));
    assert_eq!(h.repository.find_by_reference(&reference_id).unwrap().attempts, 1);
}

#[tokio::test]
async fn test_increment_failure_does_not_mask_provider_error() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;
    h.repository.set_fail_increment(true);

    let err = verify(&h, user_id, &reference_id, "654321").await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::Kyc(KycError::OtpRejected {
            attempts_remaining: 2,
            ..
        })
    ));
}

#[tokio::test]
async fn test_already_verified_is_rejected() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;
    verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap();

    let err = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap_err();

    assert_eq!(err, DomainError::Kyc(KycError::AlreadyVerified));
    assert_eq!(h.provider.verify_calls(), 1);
    assert_eq!(h.profiles.updates().len(), 1);
}

#[tokio::test]
async fn test_increment_during_inflight_verify_is_kept() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;
    let record_id = h.repository.find_by_reference(&reference_id).unwrap().id;
    h.provider.set_verify_delay(Some(StdDuration::from_millis(100)));

    let (verified, incremented) = tokio::join!(
        verify(&h, user_id, &reference_id, MOCK_VALID_OTP),
        async {
            tokio::time::sleep(StdDuration::from_millis(20)).await;
            h.repository.increment_attempts(record_id).await
        }
    );

    verified.unwrap();
    assert_eq!(incremented.unwrap(), 1);
    let stored = h.repository.find_by_reference(&reference_id).unwrap();
    assert_eq!(stored.verification_status, VerificationStatus::Verified);
    assert_eq!(stored.attempts, 1);
}

#[tokio::test]
async fn test_concurrent_correct_verifies_transition_once() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;
    h.provider.set_verify_delay(Some(StdDuration::from_millis(50)));

    let (first, second) = tokio::join!(
        verify(&h, user_id, &reference_id, MOCK_VALID_OTP),
        verify(&h, user_id, &reference_id, MOCK_VALID_OTP)
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let err = outcomes.into_iter().find_map(Result::err).unwrap();
    assert_eq!(err, DomainError::Kyc(KycError::AlreadyVerified));
    assert!(h.audit_logs.find_action(actions::KYC_OTP_ALREADY_VERIFIED).is_some());
    assert!(h.audit_logs.find_action(actions::KYC_RECORD_UPDATE_FAILED).is_none());
}

#[tokio::test]
async fn test_missing_photo_is_skipped() {
    let h = Harness::new();
    h.provider.set_kyc_data(KycData {
        photo: None,
        ..sample_kyc_data()
    });
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;

    let result = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap();

    assert!(result.photo_url.is_none());
    assert!(matches!(
        result.side_effect(SideEffect::PhotoUpload),
        Some(SideEffectStatus::Skipped { .. })
    ));
}

#[tokio::test]
async fn test_undecodable_photo_is_non_fatal() {
    let h = Harness::new();
    h.provider.set_kyc_data(KycData {
        photo: Some("not base64!!".to_string()),
        ..sample_kyc_data()
    });
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;

    let result = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap();

    assert!(result.photo_url.is_none());
    assert!(result
        .side_effect(SideEffect::PhotoUpload)
        .map(|s| matches!(s, SideEffectStatus::Failed { .. }))
        .unwrap_or(false));
    assert_eq!(
        h.repository.find_by_reference(&reference_id).unwrap().verification_status,
        VerificationStatus::Verified
    );
}

#[tokio::test]
async fn test_oversized_photo_is_non_fatal() {
    let h = Harness::with_config(crate::services::kyc::KycServiceConfig {
        photo_max_size_bytes: 4,
        ..Default::default()
    });
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;

    let result = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap();

    assert!(result.photo_url.is_none());
    assert_eq!(h.repository.photo_store().count(), 0);
}

#[tokio::test]
async fn test_collaborator_failures_are_reported_not_fatal() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;
    h.repository.set_fail_photo_upload(true);
    h.repository.set_fail_append_attempt(true);
    h.addresses.set_should_fail(true);
    h.profiles.set_fail_get(true);

    let result = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap();

    assert!(result.photo_url.is_none());
    assert!(result.address_id.is_none());
    assert!(result.profile.is_none());
    assert!(result.address.is_none());
    let failed: Vec<SideEffect> = result
        .side_effects
        .iter()
        .filter(|o| o.is_failed())
        .map(|o| o.effect)
        .collect();
    assert_eq!(
        failed,
        vec![
            SideEffect::AttemptLog,
            SideEffect::PhotoUpload,
            SideEffect::AddressResolution,
            SideEffect::ProfileRefetch,
        ]
    );
    assert!(matches!(
        result.side_effect(SideEffect::AddressRefetch),
        Some(SideEffectStatus::Skipped { .. })
    ));
    assert_eq!(
        h.repository.find_by_reference(&reference_id).unwrap().verification_status,
        VerificationStatus::Verified
    );
}

#[tokio::test]
async fn test_profile_update_failure_is_fatal_and_discards_photo() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;
    h.profiles.set_fail_update(true);

    let err = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(err.to_string().contains("failed to update user profile"));
    assert_eq!(h.repository.photo_store().count(), 0);
    assert_eq!(
        h.repository.find_by_reference(&reference_id).unwrap().verification_status,
        VerificationStatus::Pending
    );
    assert!(h.audit_logs.find_action(actions::KYC_PROFILE_UPDATE_FAILED).is_some());
    assert!(h.audit_logs.find_action(actions::KYC_VERIFIED).is_none());
}

#[tokio::test]
async fn test_record_update_failure_is_fatal() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;
    h.repository.set_fail_update(true);

    let err = verify(&h, user_id, &reference_id, MOCK_VALID_OTP).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(h.audit_logs.find_action(actions::KYC_RECORD_UPDATE_FAILED).is_some());
    assert!(h.audit_logs.find_action(actions::KYC_VERIFIED).is_none());
}

#[tokio::test]
async fn test_cancelled_verification_does_not_count_attempt() {
    let h = Harness::new();
    let user_id = Uuid::new_v4();
    let reference_id = h.issue(user_id).await;
    h.provider.set_verify_delay(Some(StdDuration::from_secs(30)));

    let (ctx, handle) = RequestContext::with_cancel();
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        handle.cancel();
    });

    let err = h
        .service
        .verify_otp(&ctx, user_id, verify_request(&reference_id, MOCK_VALID_OTP))
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(err.is_cancelled());
    let record = h.repository.find_by_reference(&reference_id).unwrap();
    assert_eq!(record.attempts, 0);
    assert_eq!(record.verification_status, VerificationStatus::Pending);
    assert!(h.repository.all_attempts().is_empty());
}
