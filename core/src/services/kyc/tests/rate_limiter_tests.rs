//! Unit tests for per-subject issue limiting

use std::sync::Arc;
use uuid::Uuid;

use super::fixtures::{generate_request, Harness};
use crate::context::RequestContext;
use crate::domain::entities::actions;
use crate::errors::{DomainError, KycError, RetryHint};
use crate::services::kyc::{IssueRateLimiter, NoopIssueRateLimiter, RepositoryIssueRateLimiter};

#[tokio::test]
async fn test_noop_limiter_allows_everything() {
    let limiter = NoopIssueRateLimiter;
    for _ in 0..10 {
        assert!(limiter.check_issue("123456789012").await.is_ok());
    }
}

#[tokio::test]
async fn test_repository_limiter_blocks_after_max_issues() {
    let Harness {
        service,
        repository,
        provider,
        audit_logs,
        ..
    } = Harness::new();
    let limiter = Arc::new(RepositoryIssueRateLimiter::new(Arc::clone(&repository), 60, 2));
    let service = service.with_rate_limiter(limiter);
    let ctx = RequestContext::background();
    let user_id = Uuid::new_v4();

    service.generate_otp(&ctx, user_id, generate_request()).await.unwrap();
    service.generate_otp(&ctx, user_id, generate_request()).await.unwrap();
    let err = service
        .generate_otp(&ctx, user_id, generate_request())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Kyc(KycError::RateLimited {
            retry_after_seconds: Some(60),
            ..
        })
    ));
    assert_eq!(err.retry_hint(), RetryHint::RetryLater);
    assert_eq!(provider.issue_calls(), 2);
    assert_eq!(repository.all_records().len(), 2);
    assert!(audit_logs.find_action(actions::KYC_OTP_RATE_LIMITED).is_some());
}

#[tokio::test]
async fn test_repository_limiter_counts_per_subject() {
    let h = Harness::new();
    let limiter = RepositoryIssueRateLimiter::new(Arc::clone(&h.repository), 60, 1);
    h.issue(Uuid::new_v4()).await;

    assert!(limiter.check_issue("123456789012").await.is_err());
    assert!(limiter.check_issue("210987654321").await.is_ok());
}

#[tokio::test]
async fn test_limiter_store_failure_is_not_audited_as_rate_limit() {
    let Harness {
        service,
        repository,
        provider,
        audit_logs,
        ..
    } = Harness::new();
    let limiter = Arc::new(RepositoryIssueRateLimiter::new(Arc::clone(&repository), 60, 2));
    let service = service.with_rate_limiter(limiter);
    repository.set_should_fail(true);

    let err = service
        .generate_otp(&RequestContext::background(), Uuid::new_v4(), generate_request())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Internal { .. }));
    assert_eq!(provider.issue_calls(), 0);
    assert!(audit_logs.find_action(actions::KYC_OTP_RATE_LIMITED).is_none());
    let log = audit_logs.find_action(actions::KYC_OTP_GENERATION_FAILED).unwrap();
    assert!(!log.success);
    assert_eq!(log.details["reason"], "rate_limit_check_failed");
}
