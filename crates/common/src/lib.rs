//! Shared types used across the checkout tool server crates.

pub mod types;

pub use types::{CustomerId, MerchantId, ProductId};
