//! Domain entities representing core business objects.

pub mod address;
pub mod audit;
pub mod otp_attempt;
pub mod profile;
pub mod verification;

pub use address::{normalize_address_text, Address};
pub use audit::{actions, resource_types, AuditLog};
pub use otp_attempt::{AttemptOutcome, OtpAttemptLog};
pub use profile::{Contact, ProfileUpdate, UserProfile};
pub use verification::{parse_date_of_birth, VerificationRecord, VerificationStatus};

#[cfg(test)]
mod tests;
