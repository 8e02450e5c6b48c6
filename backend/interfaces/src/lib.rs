//! Seams between the reconciliation core and its external collaborators.
//!
//! The order store, the processor's API and the per-family callback
//! conventions all enter the engine through the traits defined here.

pub mod callbacks;
pub mod order_store;
pub mod processor_client;
