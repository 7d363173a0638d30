pub mod caller;
pub mod cors;

pub use caller::{CallerIdentity, USER_ID_HEADER};
pub use cors::create_cors;
