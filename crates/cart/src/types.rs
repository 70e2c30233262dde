//! Cart wire types.

use common::{CustomerId, MerchantId, ProductId};
use serde::{Deserialize, Serialize};

/// One line of a cart, as stored by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: f64,
}

/// The full cart state for one customer, fetched fresh from the runtime.
///
/// `total_amount` is authoritative: it is never recomputed from `items`
/// on this side, even though it could be.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub customer_id: CustomerId,
    #[serde(default)]
    pub merchant_id: MerchantId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_amount: f64,
}

impl CartSnapshot {
    /// Returns true if the cart holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// An item reference supplied by the caller when adding to a cart.
///
/// `product` may be a catalog ID or a product name; it is resolved through
/// the [`crate::ProductResolver`] before reaching the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemInput {
    #[serde(alias = "product_id")]
    pub product: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_decodes_runtime_shape() {
        let json = r#"{
            "customer_id": "c_001",
            "merchant_id": "m_001",
            "items": [
                {"product_id": "i_001", "name": "Coffee", "quantity": 2, "unit_price": 10.0}
            ],
            "total_amount": 20.0
        }"#;

        let snapshot: CartSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.merchant_id.as_str(), "m_001");
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.total_amount, 20.0);
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn snapshot_tolerates_missing_fields() {
        let snapshot: CartSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total_amount, 0.0);
    }

    #[test]
    fn item_input_accepts_product_id_alias() {
        let input: CartItemInput =
            serde_json::from_str(r#"{"product_id": "Coffee", "quantity": 3}"#).unwrap();
        assert_eq!(input.product, "Coffee");
        assert_eq!(input.quantity, 3);
    }

    #[test]
    fn item_input_quantity_defaults_to_one() {
        let input: CartItemInput = serde_json::from_str(r#"{"product": "i_001"}"#).unwrap();
        assert_eq!(input.quantity, 1);
    }
}
