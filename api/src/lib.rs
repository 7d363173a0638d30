//! HTTP surface for the eKYC verification flow
//!
//! Thin actix-web layer over `ekyc_core::services::kyc::KycService`. Caller identity arrives
//! in the `X-User-Id` header from the upstream authentication layer.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::create_app;
pub use routes::kyc::AppState;
