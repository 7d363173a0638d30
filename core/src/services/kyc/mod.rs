//! Identity verification orchestration.
//!
//! Drives the two-step OTP flow against the external provider:
//! - issue an OTP and record a PENDING verification
//! - verify the OTP, enforcing ownership, expiry and attempt limits
//! - reconcile the provider's identity data into the record, profile and address book
//! - report the latest verification status for a user

mod config;
mod generate_otp;
pub mod mocks;
mod rate_limiter;
mod service;
mod traits;
mod types;
mod verify_otp;

#[cfg(test)]
mod tests;

pub use config::KycServiceConfig;
pub use rate_limiter::{NoopIssueRateLimiter, RepositoryIssueRateLimiter};
pub use service::KycService;
pub use traits::{AddressResolver, IssueRateLimiter, KycProvider, ProfileUpdater};
pub use types::{
    GenerateOtpRequest, GenerateOtpResult, KycStatusView, SideEffect, SideEffectOutcome,
    SideEffectStatus, VerifyOtpRequest, VerifyOtpResult,
};
