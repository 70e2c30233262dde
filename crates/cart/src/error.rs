//! Cart error types.

use thiserror::Error;
use transport::TransportError;

/// Errors from cart and catalog operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The runtime could not be reached or answered with an HTTP failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The runtime processed the request but rejected it. Carries the
    /// upstream `message` field, or `"unknown error"` when absent.
    #[error("cart request rejected: {0}")]
    Rejected(String),
}

/// Convenience type alias for cart results.
pub type Result<T> = std::result::Result<T, CartError>;
