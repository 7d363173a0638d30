pub mod kyc;

pub use kyc::{GenerateOtpBody, VerifyOtpBody};
