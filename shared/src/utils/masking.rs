//! Masking helpers for values that must never reach logs in clear

/// Mask a 12-digit subject number, keeping the last four digits (XXXX-XXXX-1234)
pub fn mask_subject_number(number: &str) -> String {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return "XXXX-XXXX-XXXX".to_string();
    }
    format!("XXXX-XXXX-{}", &digits[digits.len() - 4..])
}

/// Mask a credential, keeping four characters at each end (abcd...wxyz)
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_subject_number() {
        assert_eq!(mask_subject_number("123456789012"), "XXXX-XXXX-9012");
        assert_eq!(mask_subject_number("12"), "XXXX-XXXX-XXXX");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdefghijklwxyz"), "abcd...wxyz");
        assert_eq!(mask_secret("short"), "****");
    }
}
