//! Unit tests for address construction and dedup keys

use uuid::Uuid;

use crate::domain::entities::{normalize_address_text, Address};
use crate::domain::value_objects::ProviderAddress;

#[test]
fn test_from_kyc_skips_empty_parts() {
    let source = ProviderAddress {
        house: "12".to_string(),
        street: "  MG Road ".to_string(),
        district: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        pincode: 560001,
        country: "India".to_string(),
        ..Default::default()
    };

    let address = Address::from_kyc(Uuid::new_v4(), &source);
    assert_eq!(address.landmark, None);
    assert_eq!(address.pincode.as_deref(), Some("560001"));
    assert_eq!(
        address.full_address,
        "12, MG Road, Bengaluru, Karnataka, India, 560001"
    );
}

#[test]
fn test_zero_pincode_is_absent() {
    let address = Address::from_kyc(Uuid::new_v4(), &ProviderAddress::default());
    assert_eq!(address.pincode, None);
    assert_eq!(address.full_address, "");
}

#[test]
fn test_normalized_key_ignores_case_and_spacing() {
    assert_eq!(
        normalize_address_text("12,  MG Road ,Bengaluru"),
        normalize_address_text("12, mg road, BENGALURU")
    );
    assert_eq!(normalize_address_text("A ,  B"), "a,b");
}
