//! User profile fields touched by a successful verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::verification::VerificationStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub is_validated: bool,
    pub kyc_verified: bool,
    pub kyc_verified_at: Option<DateTime<Utc>>,
    pub kyc_status: Option<String>,
    pub photo_url: Option<String>,
    pub address_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            full_name: None,
            is_validated: false,
            kyc_verified: false,
            kyc_verified_at: None,
            kyc_status: None,
            photo_url: None,
            address_id: None,
            updated_at: Utc::now(),
        }
    }

    /// Apply the `Some` fields of `update`
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(v) = update.is_validated {
            self.is_validated = v;
        }
        if let Some(v) = update.kyc_verified {
            self.kyc_verified = v;
        }
        if let Some(v) = update.kyc_verified_at {
            self.kyc_verified_at = Some(v);
        }
        if let Some(status) = update.kyc_status {
            self.kyc_status = Some(status.as_str().to_string());
        }
        if let Some(name) = &update.full_name {
            self.full_name = Some(name.clone());
        }
        if let Some(url) = &update.photo_url {
            self.photo_url = Some(url.clone());
        }
        if let Some(id) = update.address_id {
            self.address_id = Some(id);
        }
        self.updated_at = Utc::now();
    }
}

/// Explicit set of profile fields to change; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub is_validated: Option<bool>,
    pub kyc_verified: Option<bool>,
    pub kyc_verified_at: Option<DateTime<Utc>>,
    pub kyc_status: Option<VerificationStatus>,
    pub full_name: Option<String>,
    pub photo_url: Option<String>,
    pub address_id: Option<Uuid>,
}

impl ProfileUpdate {
    /// Update applied after a successful verification
    pub fn kyc_verified(
        name: &str,
        photo_url: Option<String>,
        address_id: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            is_validated: Some(true),
            kyc_verified: Some(true),
            kyc_verified_at: Some(at),
            kyc_status: Some(VerificationStatus::Verified),
            full_name: (!name.trim().is_empty()).then(|| name.to_string()),
            photo_url,
            address_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Contact entry. Never sourced from the verification provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contact_type: String,
    pub value: String,
    pub is_primary: bool,
    pub is_verified: bool,
}
