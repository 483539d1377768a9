//! Error types for the client surface.
//!
//! Errors raised by the framework itself (schema compilation, option
//! decoding) live in `anvil-framework`; this module only covers failures of
//! the external collaborator that delivers interactions and accepts
//! registrations.

use thiserror::Error;

/// Error returned by a [`Client`](crate::client::Client) call.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The client has no live connection to the remote API.
    #[error("client is not connected")]
    NotConnected,

    /// The call did not complete in time.
    #[error("API call timed out")]
    Timeout,

    /// The remote API rejected the request.
    #[error("API rejected request ({status}): {message}")]
    Rejected {
        /// Status code reported by the remote side.
        status: u16,
        /// Message reported by the remote side.
        message: String,
    },

    /// The interaction was already acknowledged or has expired.
    #[error("interaction {0} can no longer be answered")]
    InteractionExpired(String),

    /// A payload could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Creates an [`ApiError::Other`] from any message.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for client calls.
pub type ApiResult<T> = Result<T, ApiError>;
