//! OTP issue rate limiting per subject number

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

use ekyc_shared::utils::mask_subject_number;

use super::traits::IssueRateLimiter;
use crate::errors::{DomainResult, KycError};
use crate::repositories::VerificationRepository;

/// Allows every request
#[derive(Debug, Default, Clone)]
pub struct NoopIssueRateLimiter;

#[async_trait]
impl IssueRateLimiter for NoopIssueRateLimiter {
    async fn check_issue(&self, _subject_number: &str) -> DomainResult<()> {
        Ok(())
    }
}

/// Counts records created for the same subject inside a sliding window
pub struct RepositoryIssueRateLimiter<R>
where
    R: VerificationRepository,
{
    repository: Arc<R>,
    window_seconds: i64,
    max_issues: usize,
}

impl<R> RepositoryIssueRateLimiter<R>
where
    R: VerificationRepository,
{
    pub fn new(repository: Arc<R>, window_seconds: i64, max_issues: usize) -> Self {
        Self {
            repository,
            window_seconds,
            max_issues,
        }
    }
}

#[async_trait]
impl<R> IssueRateLimiter for RepositoryIssueRateLimiter<R>
where
    R: VerificationRepository,
{
    async fn check_issue(&self, subject_number: &str) -> DomainResult<()> {
        let since = Utc::now() - Duration::seconds(self.window_seconds);
        let recent = self
            .repository
            .count_recent_issues(subject_number, since)
            .await?;

        if recent >= self.max_issues {
            tracing::warn!(
                subject_masked = %mask_subject_number(subject_number),
                recent,
                max_issues = self.max_issues,
                window_seconds = self.window_seconds,
                "OTP issue rate limit reached"
            );
            return Err(KycError::RateLimited {
                message: format!(
                    "at most {} OTP requests per {} seconds",
                    self.max_issues, self.window_seconds
                ),
                retry_after_seconds: Some(self.window_seconds),
            }
            .into());
        }
        Ok(())
    }
}
