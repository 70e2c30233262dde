//! Payment adapter wire types.

use common::CustomerId;
use serde::{Deserialize, Serialize};

/// Shipping address attached to a payment intent.
///
/// Shipping preferences are out of scope for the checkout flow; every
/// intent carries this fixed placeholder address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub delivery_method: String,
}

impl Default for ShippingAddress {
    fn default() -> Self {
        Self {
            address_line1: "123 Main St".to_string(),
            city: "Jakarta".to_string(),
            state: "DKI Jakarta".to_string(),
            postal_code: "10110".to_string(),
            country: "Indonesia".to_string(),
            delivery_method: "standard".to_string(),
        }
    }
}

/// Request to create a purchase mandate.
///
/// `amount_limit` is the cart total with a fixed 10% slack applied by the
/// saga; `expires_at` is an RFC 3339-style UTC timestamp a year out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MandateRequest {
    pub customer_id: CustomerId,
    pub scope: String,
    pub amount_limit: f64,
    pub expires_at: String,
}

/// Request to create a payment intent under an existing mandate.
///
/// `cart_id` equals the customer ID: there is one active cart per
/// customer, by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRequest {
    pub mandate_id: String,
    pub customer_id: CustomerId,
    pub cart_id: CustomerId,
    pub shipping_address: ShippingAddress,
}

/// The adapter's decision on an intent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authorization {
    #[serde(default)]
    pub authorized: bool,
    #[serde(default)]
    pub authorization_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Normalized execution payload.
///
/// Produced by the shape adapter from whichever spelling and nesting the
/// adapter used. Every field is optional at this layer; the saga decides
/// which absences are fatal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub execution_id: Option<String>,
    pub invoice_url: Option<String>,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub status: Option<String>,
}
