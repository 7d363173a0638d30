//! Verification record tracking one OTP challenge from issue to completion.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::value_objects::{KycData, OtpIssued, ProviderAddress};
use crate::errors::{DomainError, KycError};

/// Lifecycle status of a verification record.
///
/// `Failed` is part of the vocabulary but never written: expiry and attempt
/// exhaustion are evaluated when the next verify call arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Failed,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Verified => "VERIFIED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "VERIFIED" => Ok(Self::Verified),
            "FAILED" => Ok(Self::Failed),
            other => Err(DomainError::internal(format!(
                "unknown verification status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: Uuid,

    /// Owner; only this user may complete or query the record
    pub user_id: Uuid,

    /// Identity number under verification. Log only through `mask_subject_number`.
    #[serde(skip_serializing)]
    pub subject_number: String,

    /// Provider challenge handle, unique across records
    pub reference_id: String,
    pub transaction_id: String,

    pub verification_status: VerificationStatus,
    /// Mirrors `verification_status` for downstream consumers
    pub kyc_status: VerificationStatus,

    pub otp_requested_at: DateTime<Utc>,
    pub otp_verified_at: Option<DateTime<Utc>>,

    /// Failed provider verify calls so far
    pub attempts: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,

    // Populated on success
    pub name: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub full_address: Option<String>,
    pub address: Option<ProviderAddress>,
    pub photo_url: Option<String>,

    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VerificationRecord {
    /// New PENDING record for a freshly issued challenge
    pub fn new_pending(user_id: Uuid, subject_number: impl Into<String>, issued: &OtpIssued) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            subject_number: subject_number.into(),
            reference_id: issued.reference_id.clone(),
            transaction_id: issued.transaction_id.clone(),
            verification_status: VerificationStatus::Pending,
            kyc_status: VerificationStatus::Pending,
            otp_requested_at: now,
            otp_verified_at: None,
            attempts: 0,
            last_attempt_at: None,
            name: None,
            gender: None,
            date_of_birth: None,
            full_address: None,
            address: None,
            photo_url: None,
            created_by: user_id,
            updated_by: user_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }

    pub fn elapsed_since_issue(&self, now: DateTime<Utc>) -> Duration {
        now - self.otp_requested_at
    }

    /// Expired once strictly more than `validity_seconds` have passed since issue
    pub fn is_expired(&self, now: DateTime<Utc>, validity_seconds: i64) -> bool {
        self.elapsed_since_issue(now) > Duration::seconds(validity_seconds)
    }

    pub fn attempts_exhausted(&self, max_attempts: u32) -> bool {
        self.attempts >= max_attempts
    }

    pub fn attempts_remaining(&self, max_attempts: u32) -> u32 {
        max_attempts.saturating_sub(self.attempts)
    }

    /// Instant after which the OTP is no longer accepted
    pub fn expires_at(&self, validity_seconds: i64) -> DateTime<Utc> {
        self.otp_requested_at + Duration::seconds(validity_seconds)
    }

    /// Apply provider data and move PENDING to VERIFIED.
    ///
    /// Fails with `AlreadyVerified` when the record is already terminal.
    pub fn mark_verified(
        &mut self,
        data: &KycData,
        photo_url: Option<String>,
        verified_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), KycError> {
        if self.is_verified() {
            return Err(KycError::AlreadyVerified);
        }

        self.verification_status = VerificationStatus::Verified;
        self.kyc_status = VerificationStatus::Verified;
        self.otp_verified_at = Some(now);
        self.name = non_empty(&data.name);
        self.gender = non_empty(&data.gender);
        self.date_of_birth = parse_date_of_birth(&data.date_of_birth);
        self.full_address = non_empty(&data.full_address);
        self.address = Some(data.address.clone());
        self.photo_url = photo_url;
        self.updated_by = verified_by;
        self.updated_at = now;
        Ok(())
    }
}

/// Parse the provider's DD-MM-YYYY date, accepting ISO dates as a fallback
pub fn parse_date_of_birth(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
