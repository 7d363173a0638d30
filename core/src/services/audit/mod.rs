//! Audit service module for recording verification events.

mod service;
mod sink;

pub use service::{AuditService, AuditServiceConfig};
pub use sink::AuditSink;
