//! Provider request and response bodies

use serde::{Deserialize, Serialize};

use ekyc_core::domain::value_objects::{KycData, OtpIssued, ProviderAddress};

pub(crate) const OTP_REQUEST_ENTITY: &str = "in.co.sandbox.kyc.aadhaar.okyc.otp.request";
pub(crate) const VERIFY_REQUEST_ENTITY: &str = "in.co.sandbox.kyc.aadhaar.okyc.request";
pub(crate) const OTP_REASON: &str = "User KYC verification";

pub(crate) const AUTHENTICATE_PATH: &str = "/authenticate";
pub(crate) const OTP_PATH: &str = "/kyc/aadhaar/okyc/otp";
pub(crate) const VERIFY_PATH: &str = "/kyc/aadhaar/okyc/otp/verify";

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OtpRequest<'a> {
    #[serde(rename = "@entity")]
    pub entity: &'a str,
    pub aadhaar_number: &'a str,
    pub consent: &'a str,
    pub reason: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyRequest<'a> {
    #[serde(rename = "@entity")]
    pub entity: &'a str,
    pub reference_id: &'a str,
    pub otp: &'a str,
}

/// Success envelope shared by both KYC endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub transaction_id: String,
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OtpData {
    #[serde(default)]
    pub message: String,
    pub reference_id: i64,
}

impl Envelope<OtpData> {
    pub fn into_issued(self) -> OtpIssued {
        OtpIssued {
            reference_id: self.data.reference_id.to_string(),
            transaction_id: self.transaction_id,
            message: self.data.message,
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct KycDataWire {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub year_of_birth: Option<serde_json::Value>,
    #[serde(default)]
    pub care_of: Option<String>,
    #[serde(default)]
    pub full_address: String,
    #[serde(default)]
    pub address: ProviderAddress,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub share_code: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<KycDataWire> for KycData {
    fn from(wire: KycDataWire) -> Self {
        // Year of birth arrives as a number or a string depending on API version
        let year_of_birth = wire.year_of_birth.and_then(|v| match v {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        });
        KycData {
            name: wire.name,
            gender: wire.gender,
            date_of_birth: wire.date_of_birth,
            year_of_birth,
            care_of: wire.care_of,
            full_address: wire.full_address,
            address: wire.address,
            photo: wire.photo,
            share_code: wire.share_code,
            status: wire.status,
            message: wire.message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: String,
}
