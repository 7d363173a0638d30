//! MySQL implementation of the VerificationRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use std::sync::Arc;
use uuid::Uuid;

use ekyc_core::domain::entities::{
    AttemptOutcome, OtpAttemptLog, VerificationRecord, VerificationStatus,
};
use ekyc_core::domain::value_objects::ProviderAddress;
use ekyc_core::errors::{DomainError, KycError};
use ekyc_core::repositories::{PhotoStore, VerificationRepository};

use super::{column, query_error, uuid_column};

const RECORD_COLUMNS: &str = r#"
    id, user_id, subject_number, reference_id, transaction_id,
    verification_status, kyc_status, otp_requested_at, otp_verified_at,
    attempts, last_attempt_at, name, gender, date_of_birth, full_address,
    address_json, photo_url, created_by, updated_by, created_at, updated_at
"#;

/// Verification records and attempt history in MySQL, photos through a [`PhotoStore`]
pub struct MySqlVerificationRepository {
    pool: MySqlPool,
    photos: Arc<dyn PhotoStore>,
}

impl MySqlVerificationRepository {
    pub fn new(pool: MySqlPool, photos: Arc<dyn PhotoStore>) -> Self {
        Self { pool, photos }
    }

    fn row_to_record(row: &MySqlRow) -> Result<VerificationRecord, DomainError> {
        let verification_status: String = column(row, "verification_status")?;
        let kyc_status: String = column(row, "kyc_status")?;
        let address_json: Option<JsonValue> = column(row, "address_json")?;

        Ok(VerificationRecord {
            id: uuid_column(row, "id")?,
            user_id: uuid_column(row, "user_id")?,
            subject_number: column(row, "subject_number")?,
            reference_id: column(row, "reference_id")?,
            transaction_id: column(row, "transaction_id")?,
            verification_status: verification_status.parse()?,
            kyc_status: kyc_status.parse()?,
            otp_requested_at: column(row, "otp_requested_at")?,
            otp_verified_at: column(row, "otp_verified_at")?,
            attempts: column(row, "attempts")?,
            last_attempt_at: column(row, "last_attempt_at")?,
            name: column(row, "name")?,
            gender: column(row, "gender")?,
            date_of_birth: column(row, "date_of_birth")?,
            full_address: column(row, "full_address")?,
            address: decode_address(address_json)?,
            photo_url: column(row, "photo_url")?,
            created_by: uuid_column(row, "created_by")?,
            updated_by: uuid_column(row, "updated_by")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }

    fn row_to_attempt(row: &MySqlRow) -> Result<OtpAttemptLog, DomainError> {
        let outcome: String = column(row, "outcome")?;
        Ok(OtpAttemptLog {
            id: uuid_column(row, "id")?,
            verification_id: uuid_column(row, "verification_id")?,
            attempt_number: column(row, "attempt_number")?,
            outcome: AttemptOutcome::parse(&outcome).ok_or_else(|| {
                DomainError::internal(format!("unknown attempt outcome '{}'", outcome))
            })?,
            error_message: column(row, "error_message")?,
            created_at: column(row, "created_at")?,
        })
    }

    async fn fetch_one_by(
        &self,
        column_name: &str,
        value: String,
        resource: &str,
    ) -> Result<VerificationRecord, DomainError> {
        let query = format!(
            "SELECT {} FROM kyc_verifications WHERE {} = ?",
            RECORD_COLUMNS, column_name
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find verification record"))?;

        match row {
            Some(row) => Self::row_to_record(&row),
            None => Err(DomainError::not_found(resource)),
        }
    }
}

/// Serialize the structured address for the JSON column
pub fn encode_address(address: Option<&ProviderAddress>) -> Result<Option<String>, DomainError> {
    address
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| DomainError::internal(format!("Failed to serialize address: {}", e)))
}

pub fn decode_address(value: Option<JsonValue>) -> Result<Option<ProviderAddress>, DomainError> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| DomainError::internal(format!("Failed to decode address: {}", e))),
    }
}

#[async_trait]
impl VerificationRepository for MySqlVerificationRepository {
    async fn create(&self, record: &VerificationRecord) -> Result<(), DomainError> {
        let query = format!(
            "INSERT INTO kyc_verifications ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            RECORD_COLUMNS
        );

        sqlx::query(&query)
            .bind(record.id.to_string())
            .bind(record.user_id.to_string())
            .bind(&record.subject_number)
            .bind(&record.reference_id)
            .bind(&record.transaction_id)
            .bind(record.verification_status.as_str())
            .bind(record.kyc_status.as_str())
            .bind(record.otp_requested_at)
            .bind(record.otp_verified_at)
            .bind(record.attempts)
            .bind(record.last_attempt_at)
            .bind(&record.name)
            .bind(&record.gender)
            .bind(record.date_of_birth)
            .bind(&record.full_address)
            .bind(encode_address(record.address.as_ref())?)
            .bind(&record.photo_url)
            .bind(record.created_by.to_string())
            .bind(record.updated_by.to_string())
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await
            .map_err(query_error("Failed to create verification record"))?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<VerificationRecord, DomainError> {
        self.fetch_one_by("id", id.to_string(), "verification record").await
    }

    async fn get_latest_by_user(&self, user_id: Uuid) -> Result<VerificationRecord, DomainError> {
        let query = format!(
            "SELECT {} FROM kyc_verifications WHERE user_id = ? ORDER BY created_at DESC LIMIT 1",
            RECORD_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("Failed to find latest verification"))?;

        match row {
            Some(row) => Self::row_to_record(&row),
            None => Err(DomainError::not_found("verification record")),
        }
    }

    async fn get_by_reference_id(&self, reference_id: &str) -> Result<VerificationRecord, DomainError> {
        self.fetch_one_by("reference_id", reference_id.to_string(), "verification record")
            .await
    }

    async fn update(&self, record: &VerificationRecord) -> Result<(), DomainError> {
        // attempts and last_attempt_at belong to increment_attempts
        let query = r#"
            UPDATE kyc_verifications SET
                verification_status = ?, kyc_status = ?, otp_verified_at = ?,
                name = ?, gender = ?, date_of_birth = ?, full_address = ?,
                address_json = ?, photo_url = ?, updated_by = ?, updated_at = ?
            WHERE id = ? AND verification_status = 'PENDING'
        "#;

        let result = sqlx::query(query)
            .bind(record.verification_status.as_str())
            .bind(record.kyc_status.as_str())
            .bind(record.otp_verified_at)
            .bind(&record.name)
            .bind(&record.gender)
            .bind(record.date_of_birth)
            .bind(&record.full_address)
            .bind(encode_address(record.address.as_ref())?)
            .bind(&record.photo_url)
            .bind(record.updated_by.to_string())
            .bind(record.updated_at)
            .bind(record.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_error("Failed to update verification record"))?;

        if result.rows_affected() == 0 {
            // Zero rows means missing, no longer PENDING, or an unchanged PENDING row
            let stored = self.get_by_id(record.id).await?;
            if stored.verification_status != VerificationStatus::Pending {
                tracing::warn!(
                    verification_id = %record.id,
                    status = stored.verification_status.as_str(),
                    "Verification record already left PENDING"
                );
                return Err(KycError::AlreadyVerified.into());
            }
        }
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: VerificationStatus) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE kyc_verifications SET verification_status = ?, kyc_status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(query_error("Failed to update verification status"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("verification record"));
        }
        Ok(())
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<u32, DomainError> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error("Failed to begin transaction"))?;

        let result = sqlx::query(
            "UPDATE kyc_verifications SET attempts = attempts + 1, last_attempt_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(now)
        .bind(now)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(query_error("Failed to increment attempts"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("verification record"));
        }

        let row = sqlx::query("SELECT attempts FROM kyc_verifications WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(query_error("Failed to read attempts"))?;
        let attempts: u32 = column(&row, "attempts")?;

        tx.commit()
            .await
            .map_err(query_error("Failed to commit attempts increment"))?;

        Ok(attempts)
    }

    async fn count_recent_issues(
        &self,
        subject_number: &str,
        since: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS issued FROM kyc_verifications WHERE subject_number = ? AND created_at >= ?",
        )
        .bind(subject_number)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error("Failed to count recent issues"))?;

        let issued: i64 = column(&row, "issued")?;
        Ok(issued.max(0) as usize)
    }

    async fn append_attempt(&self, attempt: &OtpAttemptLog) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO kyc_otp_attempts (
                id, verification_id, attempt_number, outcome, error_message, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(attempt.id.to_string())
            .bind(attempt.verification_id.to_string())
            .bind(attempt.attempt_number)
            .bind(attempt.outcome.as_str())
            .bind(&attempt.error_message)
            .bind(attempt.created_at)
            .execute(&self.pool)
            .await
            .map_err(query_error("Failed to append OTP attempt"))?;

        Ok(())
    }

    async fn list_attempts(&self, verification_id: Uuid) -> Result<Vec<OtpAttemptLog>, DomainError> {
        let query = r#"
            SELECT id, verification_id, attempt_number, outcome, error_message, created_at
            FROM kyc_otp_attempts
            WHERE verification_id = ?
            ORDER BY created_at ASC, attempt_number ASC
        "#;

        let rows = sqlx::query(query)
            .bind(verification_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("Failed to list OTP attempts"))?;

        rows.iter().map(Self::row_to_attempt).collect()
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
