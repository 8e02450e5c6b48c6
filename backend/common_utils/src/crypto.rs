//! Utilities for cryptographic algorithms

use error_stack::ResultExt;

use crate::errors::{self, CustomResult};

/// Trait for generating a digest over a message
pub trait GenerateDigest {
    /// takes a message and creates a digest for it
    fn generate_digest(&self, message: &[u8]) -> CustomResult<Vec<u8>, errors::CryptoError>;
}

/// Trait for cryptographically verifying a message against a signature
pub trait VerifySignature {
    /// Takes in a secret, the signature and the message and verifies the message
    /// against the signature
    fn verify_signature(
        &self,
        _secret: &[u8],
        _signature: &[u8],
        _msg: &[u8],
    ) -> CustomResult<bool, errors::CryptoError>;
}

/// Secure Hash Algorithm 512
#[derive(Debug)]
pub struct Sha512;

impl GenerateDigest for Sha512 {
    fn generate_digest(&self, message: &[u8]) -> CustomResult<Vec<u8>, errors::CryptoError> {
        let digest = ring::digest::digest(&ring::digest::SHA512, message);
        Ok(digest.as_ref().to_vec())
    }
}

impl VerifySignature for Sha512 {
    /// The gateway's signature scheme is a keyed digest, not an HMAC: the
    /// caller appends the secret to the message before handing it over, and
    /// the signature is the hex-encoded digest. The secret argument is unused
    /// here for that reason.
    fn verify_signature(
        &self,
        _secret: &[u8],
        signature: &[u8],
        msg: &[u8],
    ) -> CustomResult<bool, errors::CryptoError> {
        let hashed_digest = hex::encode(
            Self.generate_digest(msg)
                .change_context(errors::CryptoError::SignatureVerificationFailed)?,
        );
        Ok(
            ring::constant_time::verify_slices_are_equal(hashed_digest.as_bytes(), signature)
                .is_ok(),
        )
    }
}
