//! Data returned by the verification provider.

use serde::{Deserialize, Serialize};

/// Result of a successful issue-OTP call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtpIssued {
    /// Provider handle for the challenge, used by the later verify call
    pub reference_id: String,
    pub transaction_id: String,
    pub message: String,
    /// Provider timestamp, informational
    pub timestamp: i64,
}

/// Structured address as the provider reports it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAddress {
    #[serde(default)]
    pub house: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub landmark: String,
    #[serde(default)]
    pub vtc: String,
    #[serde(default)]
    pub subdistrict: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub state: String,
    /// Zero when the provider sent none
    #[serde(default)]
    pub pincode: u32,
    #[serde(default)]
    pub post_office: String,
    #[serde(default)]
    pub country: String,
}

/// Identity data released by a successful verify-OTP call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KycData {
    pub name: String,
    pub gender: String,
    /// Day-month-year text as sent by the provider
    pub date_of_birth: String,
    pub year_of_birth: Option<String>,
    pub care_of: Option<String>,
    pub full_address: String,
    pub address: ProviderAddress,
    /// Base64 photo; never echoed back to API clients
    #[serde(skip_serializing, default)]
    pub photo: Option<String>,
    pub share_code: Option<String>,
    pub status: String,
    pub message: Option<String>,
}

impl KycData {
    pub fn has_photo(&self) -> bool {
        self.photo.as_deref().is_some_and(|p| !p.is_empty())
    }
}
