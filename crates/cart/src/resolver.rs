//! Product reference resolution.

use common::{MerchantId, ProductId};

use crate::catalog::Catalog;

/// Category prefixes that mark a reference as already being a catalog ID.
const ID_PREFIXES: [&str; 3] = ["i_", "f_", "b_"];

/// Resolves a user-supplied product reference (name or ID) to a catalog ID.
///
/// Resolution never fails: when the catalog cannot be fetched or the name
/// is not found, the reference is returned unchanged and the runtime is
/// left to reject it. Deliberately lossy but non-blocking.
#[derive(Debug, Clone)]
pub struct ProductResolver<K: Catalog> {
    catalog: K,
}

impl<K: Catalog> ProductResolver<K> {
    /// Creates a resolver backed by the given catalog.
    pub fn new(catalog: K) -> Self {
        Self { catalog }
    }

    /// Resolves `reference` against the merchant's catalog.
    ///
    /// References carrying a known ID prefix pass through without any
    /// network call. Otherwise the catalog is scanned for a
    /// case-insensitive exact name match; the first matching item wins,
    /// in whatever order the runtime returned the page.
    pub async fn resolve(&self, merchant_id: &MerchantId, reference: &str) -> ProductId {
        if looks_like_id(reference) {
            return ProductId::new(reference);
        }

        let items = match self.catalog.list_items(merchant_id).await {
            Ok(items) => items,
            Err(e) => {
                // Treat-as-id fallback: the runtime will reject a bad ID.
                tracing::debug!(%merchant_id, reference, error = %e, "catalog fetch failed, treating reference as ID");
                return ProductId::new(reference);
            }
        };

        for item in items {
            if item.name.eq_ignore_ascii_case(reference) {
                tracing::debug!(%merchant_id, reference, resolved = %item.item_id, "resolved product by name");
                return item.item_id;
            }
        }

        tracing::debug!(%merchant_id, reference, "no catalog match, treating reference as ID");
        ProductId::new(reference)
    }
}

fn looks_like_id(reference: &str) -> bool {
    ID_PREFIXES.iter().any(|p| reference.starts_with(p))
}
