//! Processor-specific integration code.
//!
//! Everything that knows the gateway's wire formats lives under
//! [`gateways`]; the reconciliation core only ever sees the typed
//! notification and the policy decisions exported from here.

pub mod gateways;

pub use gateways::globalpay;
