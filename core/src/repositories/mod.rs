pub mod audit;
pub mod photo;
pub mod verification;

pub use audit::{AuditLogRepository, MockAuditLogRepository, NoOpAuditLogRepository};
pub use photo::{MockPhotoStore, PhotoStore};
pub use verification::{MockVerificationRepository, VerificationRepository};
