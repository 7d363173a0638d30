//! Format checks for identity verification input

use once_cell::sync::Lazy;
use regex::Regex;

static SUBJECT_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{12}$").unwrap()
});

static OTP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{6}$").unwrap()
});

/// Exactly twelve ASCII digits
pub fn is_valid_subject_number(number: &str) -> bool {
    SUBJECT_NUMBER_REGEX.is_match(number)
}

/// Exactly six ASCII digits
pub fn is_valid_otp(otp: &str) -> bool {
    OTP_REGEX.is_match(otp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_number_format() {
        assert!(is_valid_subject_number("123456789012"));
        assert!(!is_valid_subject_number("12345678901"));
        assert!(!is_valid_subject_number("1234567890123"));
        assert!(!is_valid_subject_number("12345678901a"));
        assert!(!is_valid_subject_number(" 123456789012"));
    }

    #[test]
    fn test_otp_format() {
        assert!(is_valid_otp("123456"));
        assert!(!is_valid_otp("12345"));
        assert!(!is_valid_otp("abcdef"));
    }
}
