//! Shared error types and the result alias used across the workspace.

/// The shorthand result type carried through every fallible pipeline step.
pub type CustomResult<T, E> = Result<T, error_stack::Report<E>>;

#[derive(Debug, thiserror::Error)]
pub enum ParsingError {
    #[error("Failed to parse struct: {0}")]
    StructParseFailure(&'static str),
    #[error("Failed to serialize to {0} format")]
    EncodeError(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Failed to verify signature")]
    SignatureVerificationFailed,
    #[error("Failed to encode the message")]
    EncodingFailed,
}
