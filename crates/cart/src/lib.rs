//! Cart operations against the workflow runtime.
//!
//! The runtime owns all cart and merchant state; this crate provides the
//! typed surface over it: [`HttpCartGateway`] for the five cart operations,
//! [`HttpCatalogClient`] for merchant item listings, and [`ProductResolver`]
//! for mapping user-supplied product names to catalog IDs.

pub mod catalog;
pub mod error;
pub mod gateway;
pub mod resolver;
pub mod types;

pub use catalog::{Catalog, CatalogItem, HttpCatalogClient, InMemoryCatalog};
pub use error::CartError;
pub use gateway::{CartOperations, HttpCartGateway, InMemoryCartService};
pub use resolver::ProductResolver;
pub use types::{CartItem, CartItemInput, CartSnapshot};
