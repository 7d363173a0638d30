//! Mock implementation of VerificationRepository for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::VerificationRepository;
use crate::domain::entities::{OtpAttemptLog, VerificationRecord, VerificationStatus};
use crate::errors::{DomainError, KycError};
use crate::repositories::photo::{MockPhotoStore, PhotoStore};

#[derive(Default)]
struct FailureToggles {
    all: bool,
    increment: bool,
    update: bool,
    append_attempt: bool,
}

/// In-memory verification store with per-operation failure toggles
#[derive(Clone, Default)]
pub struct MockVerificationRepository {
    records: Arc<Mutex<HashMap<Uuid, VerificationRecord>>>,
    attempts: Arc<Mutex<Vec<OtpAttemptLog>>>,
    photos: MockPhotoStore,
    failures: Arc<Mutex<FailureToggles>>,
}

impl MockVerificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every operation
    pub fn set_should_fail(&self, should_fail: bool) {
        self.failures.lock().unwrap().all = should_fail;
    }

    pub fn set_fail_increment(&self, fail: bool) {
        self.failures.lock().unwrap().increment = fail;
    }

    pub fn set_fail_update(&self, fail: bool) {
        self.failures.lock().unwrap().update = fail;
    }

    pub fn set_fail_append_attempt(&self, fail: bool) {
        self.failures.lock().unwrap().append_attempt = fail;
    }

    pub fn set_fail_photo_upload(&self, fail: bool) {
        self.photos.set_should_fail(fail);
    }

    /// Seed a record directly, bypassing `create`
    pub fn insert(&self, record: VerificationRecord) {
        self.records.lock().unwrap().insert(record.id, record);
    }

    pub fn all_records(&self) -> Vec<VerificationRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }

    pub fn find_by_reference(&self, reference_id: &str) -> Option<VerificationRecord> {
        self.records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.reference_id == reference_id)
            .cloned()
    }

    pub fn all_attempts(&self) -> Vec<OtpAttemptLog> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn photo_store(&self) -> &MockPhotoStore {
        &self.photos
    }

    fn check(&self, specific: impl Fn(&FailureToggles) -> bool) -> Result<(), DomainError> {
        let failures = self.failures.lock().unwrap();
        if failures.all || specific(&failures) {
            return Err(DomainError::internal("Mock repository error"));
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationRepository for MockVerificationRepository {
    async fn create(&self, record: &VerificationRecord) -> Result<(), DomainError> {
        self.check(|_| false)?;
        let mut records = self.records.lock().unwrap();
        if records.values().any(|r| r.reference_id == record.reference_id) {
            return Err(DomainError::internal(format!(
                "duplicate reference_id {}",
                record.reference_id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<VerificationRecord, DomainError> {
        self.check(|_| false)?;
        self.records
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("verification {}", id)))
    }

    async fn get_latest_by_user(&self, user_id: Uuid) -> Result<VerificationRecord, DomainError> {
        self.check(|_| false)?;
        self.records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| r.created_at)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("verification for user {}", user_id)))
    }

    async fn get_by_reference_id(&self, reference_id: &str) -> Result<VerificationRecord, DomainError> {
        self.check(|_| false)?;
        self.find_by_reference(reference_id)
            .ok_or_else(|| DomainError::not_found(format!("verification reference {}", reference_id)))
    }

    async fn update(&self, record: &VerificationRecord) -> Result<(), DomainError> {
        self.check(|f| f.update)?;
        let mut records = self.records.lock().unwrap();
        let existing = records
            .get_mut(&record.id)
            .ok_or_else(|| DomainError::not_found(format!("verification {}", record.id)))?;
        if existing.verification_status != VerificationStatus::Pending {
            return Err(KycError::AlreadyVerified.into());
        }

        let (attempts, last_attempt_at) = (existing.attempts, existing.last_attempt_at);
        *existing = record.clone();
        existing.attempts = attempts;
        existing.last_attempt_at = last_attempt_at;
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: VerificationStatus) -> Result<(), DomainError> {
        self.check(|f| f.update)?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("verification {}", id)))?;
        record.verification_status = status;
        record.kyc_status = status;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<u32, DomainError> {
        self.check(|f| f.increment)?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("verification {}", id)))?;
        record.attempts += 1;
        record.last_attempt_at = Some(Utc::now());
        Ok(record.attempts)
    }

    async fn count_recent_issues(
        &self,
        subject_number: &str,
        since: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        self.check(|_| false)?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.subject_number == subject_number && r.created_at >= since)
            .count())
    }

    async fn append_attempt(&self, attempt: &OtpAttemptLog) -> Result<(), DomainError> {
        self.check(|f| f.append_attempt)?;
        self.attempts.lock().unwrap().push(attempt.clone());
        Ok(())
    }

    async fn list_attempts(&self, verification_id: Uuid) -> Result<Vec<OtpAttemptLog>, DomainError> {
        self.check(|_| false)?;
        Ok(self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.verification_id == verification_id)
            .cloned()
            .collect())
    }

    async fn upload_photo(
        &self,
        user_id: Uuid,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<String, DomainError> {
        self.photos.upload(user_id, bytes, file_name).await
    }

    async fn delete_photo(&self, url: &str) -> Result<(), DomainError> {
        self.photos.delete(url).await
    }
}
