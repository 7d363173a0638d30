//! Unit tests for the verification record lifecycle

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::entities::{parse_date_of_birth, VerificationRecord, VerificationStatus};
use crate::domain::value_objects::{KycData, OtpIssued, ProviderAddress};
use crate::errors::KycError;

fn issued() -> OtpIssued {
    OtpIssued {
        reference_id: "778899".to_string(),
        transaction_id: "txn-1".to_string(),
        message: "OTP sent successfully".to_string(),
        timestamp: 1_700_000_000,
    }
}

fn kyc_data() -> KycData {
    KycData {
        name: "Asha Rao".to_string(),
        gender: "F".to_string(),
        date_of_birth: "15-08-1990".to_string(),
        full_address: "12 MG Road, Bengaluru".to_string(),
        address: ProviderAddress {
            house: "12".to_string(),
            street: "MG Road".to_string(),
            district: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: 560001,
            country: "India".to_string(),
            ..Default::default()
        },
        status: "VALID".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_new_pending_record() {
    let user_id = Uuid::new_v4();
    let record = VerificationRecord::new_pending(user_id, "123456789012", &issued());

    assert_eq!(record.verification_status, VerificationStatus::Pending);
    assert_eq!(record.kyc_status, VerificationStatus::Pending);
    assert_eq!(record.attempts, 0);
    assert_eq!(record.reference_id, "778899");
    assert!(record.otp_verified_at.is_none());
    assert!(record.is_owned_by(user_id));
    assert!(!record.is_owned_by(Uuid::new_v4()));
}

#[test]
fn test_expiry_is_strictly_after_window() {
    let record = VerificationRecord::new_pending(Uuid::new_v4(), "123456789012", &issued());
    let at_boundary = record.otp_requested_at + Duration::seconds(300);
    let past_boundary = at_boundary + Duration::seconds(1);

    assert!(!record.is_expired(at_boundary, 300));
    assert!(record.is_expired(past_boundary, 300));
    assert_eq!(record.expires_at(300), at_boundary);
}

#[test]
fn test_attempt_limits() {
    let mut record = VerificationRecord::new_pending(Uuid::new_v4(), "123456789012", &issued());
    assert!(!record.attempts_exhausted(3));
    assert_eq!(record.attempts_remaining(3), 3);

    record.attempts = 3;
    assert!(record.attempts_exhausted(3));
    assert_eq!(record.attempts_remaining(3), 0);
}

#[test]
fn test_mark_verified_copies_result_fields() {
    let user_id = Uuid::new_v4();
    let mut record = VerificationRecord::new_pending(user_id, "123456789012", &issued());
    let now = Utc::now();

    record
        .mark_verified(&kyc_data(), Some("https://cdn/photo.jpg".to_string()), user_id, now)
        .unwrap();

    assert!(record.is_verified());
    assert_eq!(record.kyc_status, VerificationStatus::Verified);
    assert_eq!(record.otp_verified_at, Some(now));
    assert_eq!(record.name.as_deref(), Some("Asha Rao"));
    assert_eq!(record.date_of_birth, NaiveDate::from_ymd_opt(1990, 8, 15));
    assert_eq!(record.address.as_ref().unwrap().pincode, 560001);
    assert_eq!(record.photo_url.as_deref(), Some("https://cdn/photo.jpg"));
}

#[test]
fn test_mark_verified_only_once() {
    let user_id = Uuid::new_v4();
    let mut record = VerificationRecord::new_pending(user_id, "123456789012", &issued());
    record.mark_verified(&kyc_data(), None, user_id, Utc::now()).unwrap();

    let again = record.mark_verified(&kyc_data(), None, user_id, Utc::now());
    assert_eq!(again, Err(KycError::AlreadyVerified));
}

#[test]
fn test_parse_date_of_birth_formats() {
    assert_eq!(parse_date_of_birth("01-02-1985"), NaiveDate::from_ymd_opt(1985, 2, 1));
    assert_eq!(parse_date_of_birth("1985-02-01"), NaiveDate::from_ymd_opt(1985, 2, 1));
    assert_eq!(parse_date_of_birth("1985"), None);
    assert_eq!(parse_date_of_birth(""), None);
}

#[test]
fn test_status_round_trip_through_text() {
    for status in [
        VerificationStatus::Pending,
        VerificationStatus::Verified,
        VerificationStatus::Failed,
    ] {
        assert_eq!(status.as_str().parse::<VerificationStatus>().unwrap(), status);
    }
    assert!("DONE".parse::<VerificationStatus>().is_err());
}
