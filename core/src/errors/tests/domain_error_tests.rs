//! Unit tests for domain error types

use crate::errors::{DomainError, ErrorKind, KycError, RetryHint, ValidationError};

#[test]
fn test_kyc_error_categories() {
    let expired: DomainError = KycError::OtpExpired {
        elapsed_seconds: 301,
        validity_seconds: 300,
    }
    .into();
    assert_eq!(expired.kind(), ErrorKind::BadRequest);
    assert_eq!(expired.retry_hint(), RetryHint::RetryLater);

    let exhausted: DomainError = KycError::AttemptsExhausted {
        attempts: 3,
        max_attempts: 3,
    }
    .into();
    assert_eq!(exhausted.kind(), ErrorKind::BadRequest);
    assert_eq!(exhausted.retry_hint(), RetryHint::Terminal);

    let limited: DomainError = KycError::RateLimited {
        message: "slow down".to_string(),
        retry_after_seconds: Some(60),
    }
    .into();
    assert_eq!(limited.kind(), ErrorKind::RateLimited);
    assert_eq!(limited.retry_hint(), RetryHint::RetryLater);

    let ownership: DomainError = KycError::OwnershipViolation.into();
    assert_eq!(ownership.kind(), ErrorKind::Unauthorized);
}

#[test]
fn test_wrong_otp_hint_depends_on_remaining_attempts() {
    let retry = DomainError::from(KycError::OtpRejected {
        message: "Invalid OTP".to_string(),
        attempts_remaining: 2,
    });
    assert_eq!(retry.retry_hint(), RetryHint::RetryNow);

    let last = DomainError::from(KycError::OtpRejected {
        message: "Invalid OTP".to_string(),
        attempts_remaining: 0,
    });
    assert_eq!(last.retry_hint(), RetryHint::Terminal);
}

#[test]
fn test_context_preserves_category() {
    let err = DomainError::internal("upstream 502").context("OTP verification failed");
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(
        err.to_string(),
        "Internal error: OTP verification failed: upstream 502"
    );

    let cancelled = DomainError::Cancelled.context("ignored");
    assert!(cancelled.is_cancelled());
}

#[test]
fn test_validation_bridge() {
    let err: DomainError = ValidationError::InvalidFormat {
        field: "otp".to_string(),
    }
    .into();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.retry_hint(), RetryHint::None);
    assert!(err.to_string().contains("otp"));
}
