pub mod cancellation;
pub mod error;

pub use cancellation::run_cancellable;
pub use error::{handle_domain_error, status_for_kind, validation_error_response};
