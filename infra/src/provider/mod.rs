//! Client for the external e-KYC provider.
//!
//! - `sandbox` - the provider client and its shared access token
//! - `executor` - retrying request execution with exponential backoff
//! - `wire` - request and response bodies exactly as the provider speaks them

mod executor;
mod sandbox;
mod wire;

pub use executor::{ProviderResponse, RequestExecutor};
pub use sandbox::SandboxClient;

#[cfg(test)]
mod tests;
