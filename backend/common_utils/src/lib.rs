//! Shared utilities for the reconciliation service.

pub mod consts;
pub mod crypto;
pub mod errors;
pub mod ext_traits;

pub use errors::CustomResult;

/// Generate an identifier of the given length over the service alphabet.
/// Used for the one-time nonce embedded in hosted-session requests.
pub fn generate_ref_id(length: usize) -> String {
    nanoid::nanoid!(length, &consts::ALPHABETS)
}
