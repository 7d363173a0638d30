//! KYC route handlers
//!
//! - Issuing an OTP for an identity number
//! - Verifying the OTP and applying the identity data to the caller's profile
//! - Reporting the caller's latest verification state

pub mod generate_otp;
pub mod status;
pub mod verify_otp;

use std::sync::Arc;

use ekyc_core::repositories::VerificationRepository;
use ekyc_core::services::kyc::{AddressResolver, KycProvider, KycService, ProfileUpdater};

pub use generate_otp::generate_otp;
pub use status::kyc_status;
pub use verify_otp::verify_otp;

/// Application state that holds shared services
pub struct AppState<R, P, U, A>
where
    R: VerificationRepository,
    P: KycProvider,
    U: ProfileUpdater,
    A: AddressResolver,
{
    pub kyc_service: Arc<KycService<R, P, U, A>>,
}
