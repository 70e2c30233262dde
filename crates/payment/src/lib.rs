//! Payment adapter client.
//!
//! The adapter exposes four operations — create mandate, create intent,
//! authorize, execute — consumed in that order by the checkout saga. The
//! adapter's execute response varies in shape (flat vs. nested under
//! `result`, snake_case vs. camelCase field names); the [`shape`] module
//! normalizes it into one [`ExecutionReceipt`].

pub mod error;
pub mod gateway;
pub mod shape;
pub mod types;

pub use error::PaymentError;
pub use gateway::{HttpPaymentGateway, InMemoryPaymentAdapter, PaymentAdapter};
pub use types::{
    Authorization, ExecutionReceipt, IntentRequest, MandateRequest, ShippingAddress,
};
