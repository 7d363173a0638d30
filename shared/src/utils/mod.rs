//! Common utility functions

pub mod masking;
pub mod validation;

pub use masking::*;
pub use validation::*;
