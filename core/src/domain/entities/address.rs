//! Postal address linked to a verified profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::ProviderAddress;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    /// User whose verification first produced this address
    pub user_id: Uuid,
    pub house: Option<String>,
    pub street: Option<String>,
    pub landmark: Option<String>,
    pub post_office: Option<String>,
    pub subdistrict: Option<String>,
    pub district: Option<String>,
    pub vtc: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
    pub full_address: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Address {
    /// Candidate address built from provider data; `full_address` is rebuilt from the parts
    pub fn from_kyc(user_id: Uuid, source: &ProviderAddress) -> Self {
        let mut address = Self {
            id: Uuid::new_v4(),
            user_id,
            house: opt(&source.house),
            street: opt(&source.street),
            landmark: opt(&source.landmark),
            post_office: opt(&source.post_office),
            subdistrict: opt(&source.subdistrict),
            district: opt(&source.district),
            vtc: opt(&source.vtc),
            state: opt(&source.state),
            country: opt(&source.country),
            pincode: (source.pincode > 0).then(|| source.pincode.to_string()),
            full_address: String::new(),
            created_by: user_id,
            created_at: Utc::now(),
        };
        address.full_address = address.build_full_address();
        address
    }

    /// Comma-joined non-empty parts, most specific first
    pub fn build_full_address(&self) -> String {
        [
            &self.house,
            &self.street,
            &self.landmark,
            &self.post_office,
            &self.subdistrict,
            &self.district,
            &self.vtc,
            &self.state,
            &self.country,
            &self.pincode,
        ]
        .iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.trim().is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(", ")
    }

    /// Dedup key: lower-cased, whitespace collapsed, no spaces around commas
    pub fn normalized_key(&self) -> String {
        normalize_address_text(&self.full_address)
    }
}

pub fn normalize_address_text(text: &str) -> String {
    let collapsed = text
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    collapsed
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

fn opt(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
