//! Transport error types.

use thiserror::Error;

/// Errors produced by remote service calls.
///
/// Every failure mode of a call — refused connection, timeout, non-2xx
/// status, undecodable body — lands in one of these variants with a
/// human-readable cause. Nothing below this layer panics or leaks a raw
/// `reqwest::Error` to callers.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the response never arrived
    /// (connection refused, DNS failure, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-2xx status. Carries the response
    /// body text where it was retrievable.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response claimed success but the body was not valid JSON.
    #[error("invalid JSON response: {0}")]
    Decode(String),

    /// A request URL could not be constructed from the backend base.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// Returns the HTTP status code, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_includes_code_and_body() {
        let err = TransportError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn request_error_has_no_status() {
        let err = TransportError::Request("connection refused".to_string());
        assert_eq!(err.status(), None);
    }
}
