//! The two callback families the engine is parameterized by.
//!
//! Hosted-page callbacks push an opaque, signed JSON blob through the
//! customer's browser; the generic redirect family signs the query string
//! and uses the transaction id as a back reference instead.

pub mod hpp;
pub mod redirect;
