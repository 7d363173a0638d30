//! Verification store: records, attempt history and the photo delegate.

mod r#trait;
pub use r#trait::VerificationRepository;

mod mock;
pub use mock::MockVerificationRepository;
