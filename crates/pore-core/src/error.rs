//! Error types for pore-core.

use thiserror::Error;

/// Error when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// The string does not start with `#`.
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),

    /// The hex body has an unsupported length.
    #[error("color must have 3, 6 or 8 hex digits: {0:?}")]
    BadLength(String),

    /// The hex body contains a non-hex character.
    #[error("invalid hex digit in color: {0:?}")]
    BadDigit(String),
}

/// Errors raised at the explanation-generation boundary.
///
/// Every variant means no configuration was produced; callers must not
/// apply partial state.
#[derive(Debug, Error)]
pub enum ExplanationError {
    /// No API credential was available.
    #[error("API key not found in environment")]
    MissingCredential,

    /// The topic was empty after trimming.
    #[error("topic is empty")]
    EmptyTopic,

    /// A request is already in flight.
    #[error("a request is already in progress")]
    Busy,

    /// The transport failed before a response body was read.
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The response carried no generated text.
    #[error("no response from text generation model")]
    EmptyResponse,

    /// The generated text was not a valid explanation payload.
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}
