//! Integration tests for the tool server.

use std::sync::{Arc, OnceLock};

use api::routes::tools::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use cart::{CartItem, CartSnapshot, InMemoryCartService, InMemoryCatalog};
use common::{CustomerId, MerchantId, ProductId};
use metrics_exporter_prometheus::PrometheusHandle;
use payment::InMemoryPaymentAdapter;
use saga::CheckoutSaga;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (
    axum::Router,
    InMemoryCartService,
    InMemoryPaymentAdapter,
    InMemoryCatalog,
) {
    let cart = InMemoryCartService::new();
    let payment = InMemoryPaymentAdapter::new();
    let catalog = InMemoryCatalog::new();
    let saga = CheckoutSaga::new(cart.clone(), payment.clone());
    let state = Arc::new(AppState {
        cart: cart.clone(),
        catalog: catalog.clone(),
        saga,
    });
    let app = api::create_app(state, get_metrics_handle());
    (app, cart, payment, catalog)
}

fn seeded_cart(customer: &CustomerId) -> CartSnapshot {
    CartSnapshot {
        customer_id: customer.clone(),
        merchant_id: MerchantId::new("m_001"),
        items: vec![
            CartItem {
                product_id: ProductId::new("i_001"),
                name: "Coffee".to_string(),
                quantity: 2,
                unit_price: 10.0,
            },
            CartItem {
                product_id: ProductId::new("i_002"),
                name: "Tea".to_string(),
                quantity: 1,
                unit_price: 5.0,
            },
        ],
        total_amount: 25.0,
    }
}

async fn call_tool(app: axum::Router, name: &str, arguments: serde_json::Value) -> serde_json::Value {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tools/call")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(&serde_json::json!({
                        "name": name,
                        "arguments": arguments,
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _, _, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let (app, _, _, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_tool_listing() {
    let (app, _, _, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/tools")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let tools = json["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 7);
    assert!(tools.iter().any(|t| t["name"] == "checkout"));
}

#[tokio::test]
async fn test_unknown_tool_is_rejected() {
    let (app, _, _, _) = setup();

    let json = call_tool(app, "frobnicate", serde_json::json!({})).await;
    assert_eq!(json["ok"], false);
    assert!(json["error"].as_str().unwrap().contains("unknown tool"));
}

#[tokio::test]
async fn test_malformed_arguments_are_rejected_before_dispatch() {
    let (app, cart, _, _) = setup();

    // customer_id missing
    let json = call_tool(app, "clear_cart", serde_json::json!({})).await;
    assert_eq!(json["ok"], false);
    assert!(json["error"].as_str().unwrap().contains("invalid arguments"));
    assert_eq!(cart.clear_calls(), 0);
}

#[tokio::test]
async fn test_view_cart() {
    let (app, cart, _, _) = setup();
    let customer = CustomerId::new("c_001");
    cart.set_cart(seeded_cart(&customer));

    let json = call_tool(app, "view_cart", serde_json::json!({"customer_id": "c_001"})).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["result"]["total_amount"], 25.0);
    assert_eq!(json["result"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_add_then_update_cart() {
    let (app, cart, _, _) = setup();
    cart.price(ProductId::new("i_001"), "Coffee", 10.0);

    let json = call_tool(
        app.clone(),
        "add_to_cart",
        serde_json::json!({
            "customer_id": "c_001",
            "items": [{"product": "i_001", "quantity": 2}],
        }),
    )
    .await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["result"]["total_amount"], 20.0);

    let json = call_tool(
        app,
        "update_cart_item",
        serde_json::json!({
            "customer_id": "c_001",
            "product": "i_001",
            "quantity": 1,
        }),
    )
    .await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["result"]["total_amount"], 10.0);
}

#[tokio::test]
async fn test_list_merchant_items() {
    let (app, _, _, catalog) = setup();
    catalog.stock(
        &MerchantId::new("m_001"),
        cart::CatalogItem {
            item_id: ProductId::new("i_001"),
            name: "Coffee".to_string(),
            price: 10.0,
            quantity: 5,
        },
    );

    // merchant_id falls back to the seed merchant when omitted
    let json = call_tool(app, "list_merchant_items", serde_json::json!({})).await;
    assert_eq!(json["ok"], true);
    let items = json["result"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Coffee");
}

#[tokio::test]
async fn test_checkout_happy_path() {
    let (app, cart, payment, _) = setup();
    let customer = CustomerId::new("c_001");
    cart.set_cart(seeded_cart(&customer));

    let json = call_tool(app, "checkout", serde_json::json!({"customer_id": "c_001"})).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["result"]["outcome"], "success");
    assert!(
        json["result"]["invoice_url"]
            .as_str()
            .unwrap()
            .starts_with("https://pay.example/")
    );

    assert_eq!(payment.execute_calls(), 1);
    assert!(cart.cart(&customer).is_none());
}

#[tokio::test]
async fn test_checkout_of_empty_cart_fails_in_band() {
    let (app, _, payment, _) = setup();

    let json = call_tool(app, "checkout", serde_json::json!({"customer_id": "c_404"})).await;
    assert_eq!(json["ok"], false);
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("empty-cart"), "unexpected error: {error}");
    assert_eq!(payment.mandate_count(), 0);
}

#[tokio::test]
async fn test_checkout_denial_reports_stage_and_reason() {
    let (app, cart, payment, _) = setup();
    let customer = CustomerId::new("c_001");
    cart.set_cart(seeded_cart(&customer));
    payment.set_deny_with(Some("insufficient limit"));

    let json = call_tool(app, "checkout", serde_json::json!({"customer_id": "c_001"})).await;
    assert_eq!(json["ok"], false);
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("authorization-denied"), "unexpected error: {error}");
    assert!(error.contains("insufficient limit"), "unexpected error: {error}");
}
