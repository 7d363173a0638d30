//! Verification repository trait defining durable storage for verification records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{OtpAttemptLog, VerificationRecord, VerificationStatus};
use crate::errors::DomainError;

/// Persistence contract for verification records and their OTP attempt history.
///
/// Lookups that find nothing return `DomainError::NotFound`.
#[async_trait]
pub trait VerificationRepository: Send + Sync {
    /// Insert a new record; `reference_id` must be unique
    async fn create(&self, record: &VerificationRecord) -> Result<(), DomainError>;

    async fn get_by_id(&self, id: Uuid) -> Result<VerificationRecord, DomainError>;

    /// Most recently created record for the user
    async fn get_latest_by_user(&self, user_id: Uuid) -> Result<VerificationRecord, DomainError>;

    async fn get_by_reference_id(&self, reference_id: &str) -> Result<VerificationRecord, DomainError>;

    /// Write the outcome columns of a PENDING record.
    ///
    /// `attempts` and `last_attempt_at` are left alone; only `increment_attempts` moves them.
    /// Fails with `AlreadyVerified` once the stored record has left PENDING.
    async fn update(&self, record: &VerificationRecord) -> Result<(), DomainError>;

    /// Set both status columns without touching anything else
    async fn update_status(&self, id: Uuid, status: VerificationStatus) -> Result<(), DomainError>;

    /// Atomically add one to `attempts` and stamp `last_attempt_at`; returns the new count
    async fn increment_attempts(&self, id: Uuid) -> Result<u32, DomainError>;

    /// Records created for `subject_number` at or after `since`
    async fn count_recent_issues(
        &self,
        subject_number: &str,
        since: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Append one attempt entry; entries are never updated
    async fn append_attempt(&self, attempt: &OtpAttemptLog) -> Result<(), DomainError>;

    /// Attempt history for a record, oldest first
    async fn list_attempts(&self, verification_id: Uuid) -> Result<Vec<OtpAttemptLog>, DomainError>;

    /// Store a photo and return a time-limited URL
    async fn upload_photo(
        &self,
        user_id: Uuid,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<String, DomainError>;

    async fn delete_photo(&self, url: &str) -> Result<(), DomainError>;
}
