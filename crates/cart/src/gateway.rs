//! Cart gateway: typed operations over the runtime's CartService.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{CustomerId, MerchantId, ProductId};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use transport::{Backend, RemoteServiceClient, TransportError};

use crate::catalog::Catalog;
use crate::error::CartError;
use crate::resolver::ProductResolver;
use crate::types::{CartItem, CartItemInput, CartSnapshot};

/// Merchant assumed when a cart has no merchant yet (matches the runtime's
/// seed data).
const FALLBACK_MERCHANT: &str = "m_001";

/// The five cart operations, keyed by customer.
///
/// Implemented over HTTP by [`HttpCartGateway`] and in memory by
/// [`InMemoryCartService`] for tests.
#[async_trait]
pub trait CartOperations: Send + Sync {
    /// Fetches the current cart state.
    async fn view(&self, customer_id: &CustomerId) -> Result<CartSnapshot, CartError>;

    /// Adds items to the cart, resolving product references first.
    async fn add(
        &self,
        customer_id: &CustomerId,
        merchant_id: &MerchantId,
        items: &[CartItemInput],
    ) -> Result<CartSnapshot, CartError>;

    /// Updates the quantity of one item; `product` may be a name or an ID.
    async fn update(
        &self,
        customer_id: &CustomerId,
        product: &str,
        quantity: u32,
    ) -> Result<CartSnapshot, CartError>;

    /// Removes items from the cart by ID.
    async fn remove(
        &self,
        customer_id: &CustomerId,
        product_ids: &[ProductId],
    ) -> Result<CartSnapshot, CartError>;

    /// Empties the cart.
    async fn clear(&self, customer_id: &CustomerId) -> Result<(), CartError>;
}

#[derive(Debug, Default, Deserialize)]
struct ViewCartResponse {
    #[serde(default)]
    cart_state: CartSnapshot,
}

#[derive(Debug, Default, Deserialize)]
struct MutationResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    cart_state: Option<CartSnapshot>,
}

/// Cart gateway over the runtime's `cart.sv1.CartService`.
///
/// Mutating operations resolve every product reference through the
/// [`ProductResolver`] before calling upstream; this is the only point in
/// the system where name-to-id resolution happens.
#[derive(Debug, Clone)]
pub struct HttpCartGateway<K: Catalog + Clone> {
    client: Arc<RemoteServiceClient>,
    resolver: ProductResolver<K>,
}

impl<K: Catalog + Clone> HttpCartGateway<K> {
    /// Creates a gateway sharing the given transport and catalog.
    pub fn new(client: Arc<RemoteServiceClient>, catalog: K) -> Self {
        Self {
            client,
            resolver: ProductResolver::new(catalog),
        }
    }

    async fn call_cart(
        &self,
        customer_id: &CustomerId,
        operation: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, CartError> {
        let path = format!("/cart.sv1.CartService/{customer_id}/{operation}");
        Ok(self
            .client
            .call(Backend::Runtime, &path, Method::POST, Some(&body))
            .await?)
    }

    fn into_snapshot(response: MutationResponse) -> Result<CartSnapshot, CartError> {
        if response.success {
            Ok(response.cart_state.unwrap_or_default())
        } else {
            Err(CartError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, CartError> {
    serde_json::from_value(value)
        .map_err(|e| CartError::Transport(TransportError::Decode(e.to_string())))
}

#[async_trait]
impl<K: Catalog + Clone> CartOperations for HttpCartGateway<K> {
    #[tracing::instrument(skip(self))]
    async fn view(&self, customer_id: &CustomerId) -> Result<CartSnapshot, CartError> {
        let value = self
            .call_cart(customer_id, "ViewCart", json!({"customer_id": customer_id}))
            .await?;
        let response: ViewCartResponse = decode(value)?;
        Ok(response.cart_state)
    }

    #[tracing::instrument(skip(self, items), fields(items = items.len()))]
    async fn add(
        &self,
        customer_id: &CustomerId,
        merchant_id: &MerchantId,
        items: &[CartItemInput],
    ) -> Result<CartSnapshot, CartError> {
        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            let product_id = self.resolver.resolve(merchant_id, &item.product).await;
            resolved.push(json!({
                "product_id": product_id,
                "quantity": item.quantity,
            }));
        }

        let value = self
            .call_cart(
                customer_id,
                "AddToCart",
                json!({
                    "customer_id": customer_id,
                    "merchant_id": merchant_id,
                    "items": resolved,
                }),
            )
            .await?;
        Self::into_snapshot(decode(value)?)
    }

    #[tracing::instrument(skip(self))]
    async fn update(
        &self,
        customer_id: &CustomerId,
        product: &str,
        quantity: u32,
    ) -> Result<CartSnapshot, CartError> {
        // The merchant is needed for name resolution; read it from the
        // current cart, falling back to the seed merchant.
        let merchant_id = match self.view(customer_id).await {
            Ok(snapshot) if !snapshot.merchant_id.as_str().is_empty() => snapshot.merchant_id,
            _ => MerchantId::new(FALLBACK_MERCHANT),
        };
        let product_id = self.resolver.resolve(&merchant_id, product).await;

        let value = self
            .call_cart(
                customer_id,
                "UpdateCartItem",
                json!({
                    "customer_id": customer_id,
                    "product_id": product_id,
                    "quantity": quantity,
                }),
            )
            .await?;
        Self::into_snapshot(decode(value)?)
    }

    #[tracing::instrument(skip(self, product_ids), fields(items = product_ids.len()))]
    async fn remove(
        &self,
        customer_id: &CustomerId,
        product_ids: &[ProductId],
    ) -> Result<CartSnapshot, CartError> {
        let value = self
            .call_cart(
                customer_id,
                "RemoveFromCart",
                json!({
                    "customer_id": customer_id,
                    "product_ids": product_ids,
                }),
            )
            .await?;
        Self::into_snapshot(decode(value)?)
    }

    #[tracing::instrument(skip(self))]
    async fn clear(&self, customer_id: &CustomerId) -> Result<(), CartError> {
        let value = self
            .call_cart(customer_id, "ClearCart", json!({"customer_id": customer_id}))
            .await?;
        let response: MutationResponse = decode(value)?;
        if response.success {
            Ok(())
        } else {
            Err(CartError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    carts: HashMap<CustomerId, CartSnapshot>,
    prices: HashMap<ProductId, (String, f64)>,
    fail_on_view: bool,
    fail_on_clear: bool,
    reject_with: Option<String>,
    clear_calls: usize,
}

/// In-memory cart service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartService {
    state: Arc<RwLock<InMemoryCartState>>,
}

impl InMemoryCartService {
    /// Creates an empty in-memory cart service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a cart for a customer.
    pub fn set_cart(&self, snapshot: CartSnapshot) {
        let mut state = self.state.write().unwrap();
        state
            .carts
            .insert(snapshot.customer_id.clone(), snapshot);
    }

    /// Registers a product name and unit price for add/update operations.
    pub fn price(&self, product_id: ProductId, name: &str, unit_price: f64) {
        self.state
            .write()
            .unwrap()
            .prices
            .insert(product_id, (name.to_string(), unit_price));
    }

    /// Configures view calls to fail at the transport level.
    pub fn set_fail_on_view(&self, fail: bool) {
        self.state.write().unwrap().fail_on_view = fail;
    }

    /// Configures clear calls to fail at the transport level.
    pub fn set_fail_on_clear(&self, fail: bool) {
        self.state.write().unwrap().fail_on_clear = fail;
    }

    /// Configures mutating operations to be rejected with the given message.
    pub fn set_reject_with(&self, message: Option<&str>) {
        self.state.write().unwrap().reject_with = message.map(String::from);
    }

    /// Returns how many clear calls have been made (including failed ones).
    pub fn clear_calls(&self) -> usize {
        self.state.read().unwrap().clear_calls
    }

    /// Returns the current cart for a customer, if any.
    pub fn cart(&self, customer_id: &CustomerId) -> Option<CartSnapshot> {
        self.state.read().unwrap().carts.get(customer_id).cloned()
    }

    fn unavailable() -> CartError {
        CartError::Transport(TransportError::Request(
            "cart service unavailable".to_string(),
        ))
    }

    fn recompute_total(snapshot: &mut CartSnapshot) {
        snapshot.total_amount = snapshot
            .items
            .iter()
            .map(|i| f64::from(i.quantity) * i.unit_price)
            .sum();
    }
}

#[async_trait]
impl CartOperations for InMemoryCartService {
    async fn view(&self, customer_id: &CustomerId) -> Result<CartSnapshot, CartError> {
        let state = self.state.read().unwrap();
        if state.fail_on_view {
            return Err(Self::unavailable());
        }
        Ok(state
            .carts
            .get(customer_id)
            .cloned()
            .unwrap_or_else(|| CartSnapshot {
                customer_id: customer_id.clone(),
                ..CartSnapshot::default()
            }))
    }

    async fn add(
        &self,
        customer_id: &CustomerId,
        merchant_id: &MerchantId,
        items: &[CartItemInput],
    ) -> Result<CartSnapshot, CartError> {
        let mut state = self.state.write().unwrap();
        if let Some(message) = &state.reject_with {
            return Err(CartError::Rejected(message.clone()));
        }

        let prices = state.prices.clone();
        let snapshot = state
            .carts
            .entry(customer_id.clone())
            .or_insert_with(|| CartSnapshot {
                customer_id: customer_id.clone(),
                ..CartSnapshot::default()
            });
        snapshot.merchant_id = merchant_id.clone();

        for input in items {
            let product_id = ProductId::new(input.product.clone());
            let (name, unit_price) = prices
                .get(&product_id)
                .cloned()
                .unwrap_or_else(|| (input.product.clone(), 0.0));
            if let Some(existing) = snapshot
                .items
                .iter_mut()
                .find(|i| i.product_id == product_id)
            {
                existing.quantity += input.quantity;
            } else {
                snapshot.items.push(CartItem {
                    product_id,
                    name,
                    quantity: input.quantity,
                    unit_price,
                });
            }
        }
        Self::recompute_total(snapshot);
        Ok(snapshot.clone())
    }

    async fn update(
        &self,
        customer_id: &CustomerId,
        product: &str,
        quantity: u32,
    ) -> Result<CartSnapshot, CartError> {
        let mut state = self.state.write().unwrap();
        if let Some(message) = &state.reject_with {
            return Err(CartError::Rejected(message.clone()));
        }

        let snapshot = state
            .carts
            .get_mut(customer_id)
            .ok_or_else(|| CartError::Rejected("cart not found".to_string()))?;
        let product_id = ProductId::new(product);
        let item = snapshot
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CartError::Rejected(format!("item {product} not in cart")))?;

        if quantity == 0 {
            snapshot.items.retain(|i| i.product_id != product_id);
        } else {
            item.quantity = quantity;
        }
        Self::recompute_total(snapshot);
        Ok(snapshot.clone())
    }

    async fn remove(
        &self,
        customer_id: &CustomerId,
        product_ids: &[ProductId],
    ) -> Result<CartSnapshot, CartError> {
        let mut state = self.state.write().unwrap();
        if let Some(message) = &state.reject_with {
            return Err(CartError::Rejected(message.clone()));
        }

        let snapshot = state
            .carts
            .get_mut(customer_id)
            .ok_or_else(|| CartError::Rejected("cart not found".to_string()))?;
        snapshot
            .items
            .retain(|i| !product_ids.contains(&i.product_id));
        Self::recompute_total(snapshot);
        Ok(snapshot.clone())
    }

    async fn clear(&self, customer_id: &CustomerId) -> Result<(), CartError> {
        let mut state = self.state.write().unwrap();
        state.clear_calls += 1;
        if state.fail_on_clear {
            return Err(Self::unavailable());
        }
        state.carts.remove(customer_id);
        Ok(())
    }
}
