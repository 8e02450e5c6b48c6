//! Typed domain model for the reconciliation service.
//!
//! Everything past the parsing boundary works with the types in this crate;
//! raw payload maps never travel further than the gateway integration.

pub mod errors;
pub mod merchant_config;
pub mod notification;
pub mod order;
pub mod types;
