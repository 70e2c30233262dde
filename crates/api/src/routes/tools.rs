//! Tool dispatch endpoint.
//!
//! A single POST route accepts `{ "name": ..., "arguments": {...} }` and
//! routes to the matching cart, catalog, or checkout handler. All failures
//! are reported in-band as `{ "ok": false, "error": ... }` with HTTP 200;
//! transport status codes are reserved for the server itself.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use cart::{CartItemInput, CartOperations, Catalog};
use common::{CustomerId, MerchantId, ProductId};
use metrics::counter;
use payment::PaymentAdapter;
use saga::{CheckoutSaga, SagaOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Merchant assumed when a tool call does not name one (the runtime's seed
/// merchant).
const DEFAULT_MERCHANT: &str = "m_001";

/// Shared application state accessible from all handlers.
pub struct AppState<C: CartOperations + Clone, P: PaymentAdapter, K: Catalog> {
    pub cart: C,
    pub catalog: K,
    pub saga: CheckoutSaga<C, P>,
}

/// One invocable tool, as reported by the listing endpoint.
#[derive(Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
}

/// The fixed tool catalog.
pub const TOOLS: [ToolDescriptor; 7] = [
    ToolDescriptor {
        name: "list_merchant_items",
        description: "List the items a merchant has for sale",
    },
    ToolDescriptor {
        name: "view_cart",
        description: "Show the customer's current cart",
    },
    ToolDescriptor {
        name: "add_to_cart",
        description: "Add items to the customer's cart by product name or ID",
    },
    ToolDescriptor {
        name: "update_cart_item",
        description: "Change the quantity of one cart item",
    },
    ToolDescriptor {
        name: "remove_from_cart",
        description: "Remove items from the cart by product ID",
    },
    ToolDescriptor {
        name: "clear_cart",
        description: "Empty the customer's cart",
    },
    ToolDescriptor {
        name: "checkout",
        description: "Run the full checkout saga for the customer's cart",
    },
];

// -- Request and response types --

#[derive(Deserialize)]
pub struct ToolRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Serialize)]
pub struct ToolResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResponse {
    fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

// -- Per-tool argument shapes --

fn default_merchant() -> MerchantId {
    MerchantId::new(DEFAULT_MERCHANT)
}

#[derive(Deserialize)]
struct MerchantArgs {
    #[serde(default = "default_merchant")]
    merchant_id: MerchantId,
}

#[derive(Deserialize)]
struct CustomerArgs {
    customer_id: CustomerId,
}

#[derive(Deserialize)]
struct AddToCartArgs {
    customer_id: CustomerId,
    #[serde(default = "default_merchant")]
    merchant_id: MerchantId,
    items: Vec<CartItemInput>,
}

#[derive(Deserialize)]
struct UpdateCartItemArgs {
    customer_id: CustomerId,
    #[serde(alias = "product_id")]
    product: String,
    quantity: u32,
}

#[derive(Deserialize)]
struct RemoveFromCartArgs {
    customer_id: CustomerId,
    product_ids: Vec<ProductId>,
}

// -- Handlers --

/// GET /tools — list the available tools.
pub async fn list() -> Json<Value> {
    Json(serde_json::json!({ "tools": TOOLS }))
}

/// POST /tools/call — dispatch one tool invocation.
#[tracing::instrument(skip(state, req), fields(tool = %req.name))]
pub async fn call<C, P, K>(
    State(state): State<Arc<AppState<C, P, K>>>,
    Json(req): Json<ToolRequest>,
) -> Json<ToolResponse>
where
    C: CartOperations + Clone + 'static,
    P: PaymentAdapter + 'static,
    K: Catalog + 'static,
{
    counter!("api_tool_calls_total", "tool" => req.name.clone()).increment(1);

    let response = match req.name.as_str() {
        "list_merchant_items" => list_merchant_items(&state, req.arguments).await,
        "view_cart" => view_cart(&state, req.arguments).await,
        "add_to_cart" => add_to_cart(&state, req.arguments).await,
        "update_cart_item" => update_cart_item(&state, req.arguments).await,
        "remove_from_cart" => remove_from_cart(&state, req.arguments).await,
        "clear_cart" => clear_cart(&state, req.arguments).await,
        "checkout" => checkout(&state, req.arguments).await,
        other => ToolResponse::failure(format!("unknown tool: {other}")),
    };

    if !response.ok {
        counter!("api_tool_errors_total", "tool" => req.name.clone()).increment(1);
        tracing::warn!(tool = %req.name, error = ?response.error, "tool call failed");
    }
    Json(response)
}

/// Parses tool arguments, folding malformed input into a failure response
/// before any component is touched.
fn parse_args<T: serde::de::DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolResponse> {
    serde_json::from_value(arguments)
        .map_err(|e| ToolResponse::failure(format!("invalid arguments for {tool}: {e}")))
}

fn as_result<T: Serialize>(value: &T) -> ToolResponse {
    match serde_json::to_value(value) {
        Ok(json) => ToolResponse::success(json),
        Err(e) => ToolResponse::failure(format!("failed to encode result: {e}")),
    }
}

async fn list_merchant_items<C, P, K>(state: &AppState<C, P, K>, arguments: Value) -> ToolResponse
where
    C: CartOperations + Clone,
    P: PaymentAdapter,
    K: Catalog,
{
    let args: MerchantArgs = match parse_args("list_merchant_items", arguments) {
        Ok(args) => args,
        Err(response) => return response,
    };
    match state.catalog.list_items(&args.merchant_id).await {
        Ok(items) => as_result(&items),
        Err(e) => ToolResponse::failure(e.to_string()),
    }
}

async fn view_cart<C, P, K>(state: &AppState<C, P, K>, arguments: Value) -> ToolResponse
where
    C: CartOperations + Clone,
    P: PaymentAdapter,
    K: Catalog,
{
    let args: CustomerArgs = match parse_args("view_cart", arguments) {
        Ok(args) => args,
        Err(response) => return response,
    };
    match state.cart.view(&args.customer_id).await {
        Ok(snapshot) => as_result(&snapshot),
        Err(e) => ToolResponse::failure(e.to_string()),
    }
}

async fn add_to_cart<C, P, K>(state: &AppState<C, P, K>, arguments: Value) -> ToolResponse
where
    C: CartOperations + Clone,
    P: PaymentAdapter,
    K: Catalog,
{
    let args: AddToCartArgs = match parse_args("add_to_cart", arguments) {
        Ok(args) => args,
        Err(response) => return response,
    };
    match state
        .cart
        .add(&args.customer_id, &args.merchant_id, &args.items)
        .await
    {
        Ok(snapshot) => as_result(&snapshot),
        Err(e) => ToolResponse::failure(e.to_string()),
    }
}

async fn update_cart_item<C, P, K>(state: &AppState<C, P, K>, arguments: Value) -> ToolResponse
where
    C: CartOperations + Clone,
    P: PaymentAdapter,
    K: Catalog,
{
    let args: UpdateCartItemArgs = match parse_args("update_cart_item", arguments) {
        Ok(args) => args,
        Err(response) => return response,
    };
    match state
        .cart
        .update(&args.customer_id, &args.product, args.quantity)
        .await
    {
        Ok(snapshot) => as_result(&snapshot),
        Err(e) => ToolResponse::failure(e.to_string()),
    }
}

async fn remove_from_cart<C, P, K>(state: &AppState<C, P, K>, arguments: Value) -> ToolResponse
where
    C: CartOperations + Clone,
    P: PaymentAdapter,
    K: Catalog,
{
    let args: RemoveFromCartArgs = match parse_args("remove_from_cart", arguments) {
        Ok(args) => args,
        Err(response) => return response,
    };
    match state
        .cart
        .remove(&args.customer_id, &args.product_ids)
        .await
    {
        Ok(snapshot) => as_result(&snapshot),
        Err(e) => ToolResponse::failure(e.to_string()),
    }
}

async fn clear_cart<C, P, K>(state: &AppState<C, P, K>, arguments: Value) -> ToolResponse
where
    C: CartOperations + Clone,
    P: PaymentAdapter,
    K: Catalog,
{
    let args: CustomerArgs = match parse_args("clear_cart", arguments) {
        Ok(args) => args,
        Err(response) => return response,
    };
    match state.cart.clear(&args.customer_id).await {
        Ok(()) => ToolResponse::success(serde_json::json!({ "cleared": true })),
        Err(e) => ToolResponse::failure(e.to_string()),
    }
}

async fn checkout<C, P, K>(state: &AppState<C, P, K>, arguments: Value) -> ToolResponse
where
    C: CartOperations + Clone,
    P: PaymentAdapter,
    K: Catalog,
{
    let args: CustomerArgs = match parse_args("checkout", arguments) {
        Ok(args) => args,
        Err(response) => return response,
    };
    match state.saga.run_checkout(&args.customer_id).await {
        outcome @ SagaOutcome::Success { .. } => as_result(&outcome),
        SagaOutcome::Failure { stage, reason } => {
            ToolResponse::failure(format!("checkout failed at {stage}: {reason}"))
        }
    }
}
