//! Payment error types.

use thiserror::Error;
use transport::TransportError;

/// Errors from payment adapter operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The adapter could not be reached or answered with an HTTP failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The adapter answered 2xx but the body omitted a required field.
    /// A contract violation, not a transport problem.
    #[error("payment adapter response missing `{0}`")]
    MissingField(&'static str),
}

/// Convenience type alias for payment results.
pub type Result<T> = std::result::Result<T, PaymentError>;
