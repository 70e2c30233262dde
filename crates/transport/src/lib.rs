//! Request/response transport against the two backend services.
//!
//! All remote calls in the system go through [`RemoteServiceClient`]: it
//! picks a backend base URL, sends a JSON request, and normalizes every
//! network-level or HTTP-level failure into a [`TransportError`] so callers
//! never handle raw client errors.

pub mod client;
pub mod error;

pub use client::{Backend, RemoteServiceClient, TransportConfig};
pub use error::TransportError;
