//! Consolidated constants for the reconciliation service.

/// Characters to use for generating NanoID
pub const ALPHABETS: [char; 62] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
    'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
    'V', 'W', 'X', 'Y', 'Z',
];

/// Length of the one-time nonce embedded in hosted-session requests
pub const NONCE_LENGTH: usize = 32;

// =============================================================================
// HTTP Headers
// =============================================================================

/// Header (or query parameter) carrying the gateway notification signature
pub const X_GP_SIGNATURE: &str = "x-gp-signature";
/// Header key for request ID
pub const X_REQUEST_ID: &str = "x-request-id";

// =============================================================================
// Callback fields
// =============================================================================

/// Form field carrying the signed gateway payload on the final HPP callback
pub const GATEWAY_RESPONSE_FIELD: &str = "gateway_response";
/// Query parameter fallback for the order id when the reference string is absent
pub const ORDER_ID_PARAM: &str = "order_id";
/// Query parameter flag appended when redirecting an aborted customer to checkout
pub const CANCELLED_MARKER_PARAM: &str = "cancelled";

// =============================================================================
// Error Messages
// =============================================================================

/// No error message string const
pub const NO_ERROR_MESSAGE: &str = "No error message";
