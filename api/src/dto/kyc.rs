//! Request bodies for the KYC endpoints

use serde::{Deserialize, Serialize};
use validator::Validate;

use ekyc_core::domain::value_objects::ConsentInput;
use ekyc_core::services::kyc::{GenerateOtpRequest, VerifyOtpRequest};

/// Body of `POST /api/v1/kyc/aadhaar/otp`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateOtpBody {
    #[validate(length(min = 1, message = "aadhaar_number is required"))]
    pub aadhaar_number: String,

    /// `true`, `"Y"`, `"true"` or `{purpose, timestamp, version}`
    pub consent: ConsentInput,
}

impl From<GenerateOtpBody> for GenerateOtpRequest {
    fn from(body: GenerateOtpBody) -> Self {
        Self {
            subject_number: body.aadhaar_number,
            consent: body.consent,
        }
    }
}

/// Body of `POST /api/v1/kyc/aadhaar/otp/verify`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyOtpBody {
    #[validate(length(min = 1, message = "reference_id is required"))]
    pub reference_id: String,

    #[validate(length(equal = 6, message = "otp must be 6 digits"))]
    pub otp: String,
}

impl From<VerifyOtpBody> for VerifyOtpRequest {
    fn from(body: VerifyOtpBody) -> Self {
        Self {
            reference_id: body.reference_id,
            otp: body.otp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_body_accepts_consent_shapes() {
        for consent in [json!(true), json!("Y"), json!({"purpose": "kyc", "timestamp": "2024-01-01T00:00:00Z", "version": "1"})] {
            let body: GenerateOtpBody =
                serde_json::from_value(json!({"aadhaar_number": "123456789012", "consent": consent}))
                    .unwrap();
            assert!(body.validate().is_ok());
        }
    }

    #[test]
    fn test_verify_body_rejects_short_otp() {
        let body = VerifyOtpBody {
            reference_id: "778899".to_string(),
            otp: "123".to_string(),
        };
        let errors = body.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("otp"));
    }
}
