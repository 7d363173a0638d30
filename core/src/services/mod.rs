//! Business services containing domain logic and use cases.

pub mod audit;
pub mod kyc;

pub use audit::{AuditService, AuditServiceConfig, AuditSink};
pub use kyc::{
    AddressResolver, GenerateOtpRequest, GenerateOtpResult, IssueRateLimiter, KycProvider,
    KycService, KycServiceConfig, KycStatusView, NoopIssueRateLimiter, ProfileUpdater,
    RepositoryIssueRateLimiter, SideEffect, SideEffectOutcome, SideEffectStatus, VerifyOtpRequest,
    VerifyOtpResult,
};
