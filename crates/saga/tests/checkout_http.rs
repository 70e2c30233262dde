//! End-to-end saga tests against mocked runtime and payment services.

use std::sync::Arc;

use cart::{HttpCartGateway, InMemoryCatalog};
use common::CustomerId;
use payment::HttpPaymentGateway;
use saga::{CheckoutSaga, FailureStage, SagaOutcome};
use transport::{RemoteServiceClient, TransportConfig};
use url::Url;

fn saga_over(
    runtime: &mockito::Server,
    payment: &mockito::Server,
) -> CheckoutSaga<HttpCartGateway<InMemoryCatalog>, HttpPaymentGateway> {
    let config = TransportConfig {
        runtime_base: Url::parse(&runtime.url()).unwrap(),
        payment_base: Url::parse(&payment.url()).unwrap(),
    };
    let client = Arc::new(RemoteServiceClient::new(config).unwrap());
    CheckoutSaga::new(
        HttpCartGateway::new(client.clone(), InMemoryCatalog::new()),
        HttpPaymentGateway::new(client),
    )
}

const CART_BODY: &str = r#"{"cart_state":{
    "customer_id":"c_001","merchant_id":"m_001",
    "items":[
        {"product_id":"i_001","name":"Coffee","quantity":2,"unit_price":10.0},
        {"product_id":"i_002","name":"Tea","quantity":1,"unit_price":5.0}
    ],
    "total_amount":25.0}}"#;

#[tokio::test]
async fn checkout_succeeds_with_nested_execute_envelope() {
    let mut runtime = mockito::Server::new_async().await;
    let mut payment = mockito::Server::new_async().await;

    let _view = runtime
        .mock("POST", "/cart.sv1.CartService/c_001/ViewCart")
        .with_status(200)
        .with_body(CART_BODY)
        .create_async()
        .await;
    let clear = runtime
        .mock("POST", "/cart.sv1.CartService/c_001/ClearCart")
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .expect(1)
        .create_async()
        .await;

    let mandate = payment
        .mock("POST", "/ap2/mandates")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "customer_id": "c_001",
            "scope": "purchase",
        })))
        .with_status(200)
        .with_body(r#"{"mandate_id":"man_1"}"#)
        .expect(1)
        .create_async()
        .await;
    let _intent = payment
        .mock("POST", "/ap2/intents")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "mandate_id": "man_1",
            "cart_id": "c_001",
        })))
        .with_status(200)
        .with_body(r#"{"intent_id":"int_1"}"#)
        .create_async()
        .await;
    let _auth = payment
        .mock("POST", "/ap2/authorize")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "intent_id": "int_1",
            "mandate_id": "man_1",
        })))
        .with_status(200)
        .with_body(r#"{"authorized":true,"authorization_id":"auth_1"}"#)
        .create_async()
        .await;
    let _execute = payment
        .mock("POST", "/ap2/execute")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "authorization_id": "auth_1",
            "intent_id": "int_1",
        })))
        .with_status(200)
        .with_body(
            r#"{"result":{"invoiceLink":"https://pay.example/abc","paymentId":"pay_1","orderId":"ord_1","status":"PENDING"}}"#,
        )
        .create_async()
        .await;

    let saga = saga_over(&runtime, &payment);
    let outcome = saga.run_checkout(&CustomerId::new("c_001")).await;

    match outcome {
        SagaOutcome::Success {
            order_id,
            payment_id,
            status,
            invoice_url,
            ..
        } => {
            assert_eq!(invoice_url, "https://pay.example/abc");
            assert_eq!(order_id, "ord_1");
            assert_eq!(payment_id.as_deref(), Some("pay_1"));
            assert_eq!(status.as_deref(), Some("PENDING"));
        }
        other => panic!("expected success, got {other:?}"),
    }

    mandate.assert_async().await;
    clear.assert_async().await;
}

#[tokio::test]
async fn denied_authorization_stops_before_execute() {
    let mut runtime = mockito::Server::new_async().await;
    let mut payment = mockito::Server::new_async().await;

    let _view = runtime
        .mock("POST", "/cart.sv1.CartService/c_001/ViewCart")
        .with_status(200)
        .with_body(CART_BODY)
        .create_async()
        .await;
    let _mandate = payment
        .mock("POST", "/ap2/mandates")
        .with_status(200)
        .with_body(r#"{"mandate_id":"man_1"}"#)
        .create_async()
        .await;
    let _intent = payment
        .mock("POST", "/ap2/intents")
        .with_status(200)
        .with_body(r#"{"intent_id":"int_1"}"#)
        .create_async()
        .await;
    let _auth = payment
        .mock("POST", "/ap2/authorize")
        .with_status(200)
        .with_body(r#"{"authorized":false,"message":"insufficient limit"}"#)
        .create_async()
        .await;
    let execute = payment
        .mock("POST", "/ap2/execute")
        .expect(0)
        .create_async()
        .await;

    let saga = saga_over(&runtime, &payment);
    let outcome = saga.run_checkout(&CustomerId::new("c_001")).await;

    match outcome {
        SagaOutcome::Failure { stage, reason } => {
            assert_eq!(stage, FailureStage::AuthorizationDenied);
            assert_eq!(reason, "insufficient limit");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    execute.assert_async().await;
}

#[tokio::test]
async fn adapter_error_body_surfaces_in_failure_reason() {
    let mut runtime = mockito::Server::new_async().await;
    let mut payment = mockito::Server::new_async().await;

    let _view = runtime
        .mock("POST", "/cart.sv1.CartService/c_001/ViewCart")
        .with_status(200)
        .with_body(CART_BODY)
        .create_async()
        .await;
    let _mandate = payment
        .mock("POST", "/ap2/mandates")
        .with_status(503)
        .with_body("mandate store unavailable")
        .create_async()
        .await;

    let saga = saga_over(&runtime, &payment);
    let outcome = saga.run_checkout(&CustomerId::new("c_001")).await;

    match outcome {
        SagaOutcome::Failure { stage, reason } => {
            assert_eq!(stage, FailureStage::Mandate);
            assert!(reason.contains("503"));
            assert!(reason.contains("mandate store unavailable"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}
