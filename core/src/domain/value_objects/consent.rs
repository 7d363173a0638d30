//! Consent proving the subject agreed to verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Consent payload exactly as a caller may send it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConsentInput {
    Flag(bool),
    Text(String),
    Detailed(ConsentMetadata),
}

/// Explicit consent record captured by the client application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentMetadata {
    pub purpose: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Validated consent. Always forwarded to the provider as `"Y"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Consent {
    metadata: Option<ConsentMetadata>,
}

impl Consent {
    pub const PROVIDER_VALUE: &'static str = "Y";

    /// Plain affirmative consent with no metadata
    pub fn granted() -> Self {
        Self { metadata: None }
    }

    pub fn provider_value(&self) -> &'static str {
        Self::PROVIDER_VALUE
    }

    pub fn metadata(&self) -> Option<&ConsentMetadata> {
        self.metadata.as_ref()
    }
}

impl TryFrom<ConsentInput> for Consent {
    type Error = ValidationError;

    fn try_from(input: ConsentInput) -> Result<Self, Self::Error> {
        match input {
            ConsentInput::Flag(true) => Ok(Self::granted()),
            ConsentInput::Flag(false) => Err(ValidationError::InvalidConsent {
                reason: "consent must be granted".to_string(),
            }),
            ConsentInput::Text(text) => match text.as_str() {
                "Y" | "true" => Ok(Self::granted()),
                other => Err(ValidationError::InvalidConsent {
                    reason: format!("unsupported consent value '{}'", other),
                }),
            },
            ConsentInput::Detailed(meta) => {
                if meta.purpose.trim().is_empty() {
                    return Err(ValidationError::InvalidConsent {
                        reason: "purpose is required".to_string(),
                    });
                }
                if meta.version.trim().is_empty() {
                    return Err(ValidationError::InvalidConsent {
                        reason: "version is required".to_string(),
                    });
                }
                Ok(Self {
                    metadata: Some(meta),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<Consent, ValidationError> {
        let input: ConsentInput = serde_json::from_value(value).unwrap();
        Consent::try_from(input)
    }

    #[test]
    fn accepts_supported_forms() {
        assert!(parse(json!(true)).is_ok());
        assert!(parse(json!("Y")).is_ok());
        assert!(parse(json!("true")).is_ok());

        let detailed = parse(json!({
            "purpose": "account onboarding",
            "timestamp": "2024-05-01T10:00:00Z",
            "version": "1.0"
        }))
        .unwrap();
        assert_eq!(detailed.provider_value(), "Y");
        assert_eq!(detailed.metadata().unwrap().version, "1.0");
    }

    #[test]
    fn rejects_refusals_and_incomplete_objects() {
        assert!(parse(json!(false)).is_err());
        assert!(parse(json!("N")).is_err());
        assert!(parse(json!({
            "purpose": "",
            "timestamp": "2024-05-01T10:00:00Z",
            "version": "1.0"
        }))
        .is_err());
    }

    #[test]
    fn object_without_timestamp_is_not_consent() {
        let parsed: Result<ConsentInput, _> =
            serde_json::from_value(json!({"purpose": "kyc", "version": "1"}));
        assert!(parsed.is_err());
    }
}
