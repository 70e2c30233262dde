//! HTTP route handlers.

pub mod health;
pub mod metrics;
pub mod tools;
