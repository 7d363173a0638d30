//! Value objects representing immutable domain concepts.

pub mod consent;
pub mod provider;

pub use consent::{Consent, ConsentInput, ConsentMetadata};
pub use provider::{KycData, OtpIssued, ProviderAddress};
