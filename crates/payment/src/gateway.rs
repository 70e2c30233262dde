//! Payment adapter trait, HTTP gateway, and in-memory test double.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use transport::{Backend, RemoteServiceClient, TransportError};

use crate::error::PaymentError;
use crate::shape;
use crate::types::{Authorization, ExecutionReceipt, IntentRequest, MandateRequest};

/// The four payment-adapter operations, in the order the saga calls them.
#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Creates a purchase mandate; returns the mandate ID.
    async fn create_mandate(&self, request: &MandateRequest) -> Result<String, PaymentError>;

    /// Creates a payment intent under a mandate; returns the intent ID.
    async fn create_intent(&self, request: &IntentRequest) -> Result<String, PaymentError>;

    /// Asks the adapter to authorize an intent.
    async fn authorize(
        &self,
        intent_id: &str,
        mandate_id: &str,
    ) -> Result<Authorization, PaymentError>;

    /// Executes an authorized intent, triggering settlement.
    async fn execute(
        &self,
        authorization_id: &str,
        intent_id: &str,
    ) -> Result<ExecutionReceipt, PaymentError>;
}

/// Payment gateway over the adapter's `/ap2` endpoints.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    client: Arc<RemoteServiceClient>,
}

impl HttpPaymentGateway {
    /// Creates a gateway sharing the given transport.
    pub fn new(client: Arc<RemoteServiceClient>) -> Self {
        Self { client }
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, PaymentError> {
        Ok(self
            .client
            .call(Backend::Payment, path, Method::POST, Some(&body))
            .await?)
    }
}

fn required_string(
    value: &serde_json::Value,
    field: &'static str,
) -> Result<String, PaymentError> {
    value
        .get(field)
        .and_then(serde_json::Value::as_str)
        .map(String::from)
        .ok_or(PaymentError::MissingField(field))
}

#[async_trait]
impl PaymentAdapter for HttpPaymentGateway {
    #[tracing::instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    async fn create_mandate(&self, request: &MandateRequest) -> Result<String, PaymentError> {
        let body = json!({
            "customer_id": request.customer_id,
            "scope": request.scope,
            "amount_limit": request.amount_limit,
            "expires_at": request.expires_at,
        });
        let value = self.post("/ap2/mandates", body).await?;
        required_string(&value, "mandate_id")
    }

    #[tracing::instrument(skip(self, request), fields(mandate_id = %request.mandate_id))]
    async fn create_intent(&self, request: &IntentRequest) -> Result<String, PaymentError> {
        let body = json!({
            "mandate_id": request.mandate_id,
            "customer_id": request.customer_id,
            "cart_id": request.cart_id,
            "shipping_address": request.shipping_address,
        });
        let value = self.post("/ap2/intents", body).await?;
        required_string(&value, "intent_id")
    }

    #[tracing::instrument(skip(self))]
    async fn authorize(
        &self,
        intent_id: &str,
        mandate_id: &str,
    ) -> Result<Authorization, PaymentError> {
        let value = self
            .post(
                "/ap2/authorize",
                json!({"intent_id": intent_id, "mandate_id": mandate_id}),
            )
            .await?;
        serde_json::from_value(value)
            .map_err(|e| PaymentError::Transport(TransportError::Decode(e.to_string())))
    }

    #[tracing::instrument(skip(self))]
    async fn execute(
        &self,
        authorization_id: &str,
        intent_id: &str,
    ) -> Result<ExecutionReceipt, PaymentError> {
        let value = self
            .post(
                "/ap2/execute",
                json!({"authorization_id": authorization_id, "intent_id": intent_id}),
            )
            .await?;
        Ok(shape::execution_receipt(&value))
    }
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    next_id: u32,
    mandates: Vec<MandateRequest>,
    intents: Vec<IntentRequest>,
    authorize_calls: usize,
    execute_calls: usize,
    fail_on_mandate: bool,
    fail_on_intent: bool,
    fail_on_authorize: bool,
    fail_on_execute: bool,
    omit_intent_id: bool,
    omit_authorization_id: bool,
    omit_invoice_url: bool,
    omit_order_id: bool,
    deny_with: Option<String>,
}

/// In-memory payment adapter for testing.
///
/// Records every request and exposes switches to fail, deny, or omit
/// fields at each step.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentAdapter {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentAdapter {
    /// Creates a new in-memory payment adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures mandate creation to fail at the transport level.
    pub fn set_fail_on_mandate(&self, fail: bool) {
        self.state.write().unwrap().fail_on_mandate = fail;
    }

    /// Configures intent creation to fail at the transport level.
    pub fn set_fail_on_intent(&self, fail: bool) {
        self.state.write().unwrap().fail_on_intent = fail;
    }

    /// Configures authorization to fail at the transport level.
    pub fn set_fail_on_authorize(&self, fail: bool) {
        self.state.write().unwrap().fail_on_authorize = fail;
    }

    /// Configures execution to fail at the transport level.
    pub fn set_fail_on_execute(&self, fail: bool) {
        self.state.write().unwrap().fail_on_execute = fail;
    }

    /// Configures intent creation to answer 2xx without an `intent_id`.
    pub fn set_omit_intent_id(&self, omit: bool) {
        self.state.write().unwrap().omit_intent_id = omit;
    }

    /// Configures authorization to approve without an `authorization_id`.
    pub fn set_omit_authorization_id(&self, omit: bool) {
        self.state.write().unwrap().omit_authorization_id = omit;
    }

    /// Configures execution to answer without any invoice URL.
    pub fn set_omit_invoice_url(&self, omit: bool) {
        self.state.write().unwrap().omit_invoice_url = omit;
    }

    /// Configures execution to answer without an order ID.
    pub fn set_omit_order_id(&self, omit: bool) {
        self.state.write().unwrap().omit_order_id = omit;
    }

    /// Configures authorization to be denied with the given message.
    pub fn set_deny_with(&self, message: Option<&str>) {
        self.state.write().unwrap().deny_with = message.map(String::from);
    }

    /// Returns how many mandates were created.
    pub fn mandate_count(&self) -> usize {
        self.state.read().unwrap().mandates.len()
    }

    /// Returns how many intents were created.
    pub fn intent_count(&self) -> usize {
        self.state.read().unwrap().intents.len()
    }

    /// Returns how many authorize calls were made.
    pub fn authorize_calls(&self) -> usize {
        self.state.read().unwrap().authorize_calls
    }

    /// Returns how many execute calls were made.
    pub fn execute_calls(&self) -> usize {
        self.state.read().unwrap().execute_calls
    }

    /// Returns the most recent mandate request, if any.
    pub fn last_mandate(&self) -> Option<MandateRequest> {
        self.state.read().unwrap().mandates.last().cloned()
    }

    /// Returns the most recent intent request, if any.
    pub fn last_intent(&self) -> Option<IntentRequest> {
        self.state.read().unwrap().intents.last().cloned()
    }

    fn unavailable() -> PaymentError {
        PaymentError::Transport(TransportError::Request(
            "payment adapter unavailable".to_string(),
        ))
    }
}

#[async_trait]
impl PaymentAdapter for InMemoryPaymentAdapter {
    async fn create_mandate(&self, request: &MandateRequest) -> Result<String, PaymentError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_mandate {
            return Err(Self::unavailable());
        }
        state.next_id += 1;
        state.mandates.push(request.clone());
        Ok(format!("man_{:04}", state.next_id))
    }

    async fn create_intent(&self, request: &IntentRequest) -> Result<String, PaymentError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_intent {
            return Err(Self::unavailable());
        }
        if state.omit_intent_id {
            return Err(PaymentError::MissingField("intent_id"));
        }
        state.next_id += 1;
        state.intents.push(request.clone());
        Ok(format!("int_{:04}", state.next_id))
    }

    async fn authorize(
        &self,
        _intent_id: &str,
        _mandate_id: &str,
    ) -> Result<Authorization, PaymentError> {
        let mut state = self.state.write().unwrap();
        state.authorize_calls += 1;
        if state.fail_on_authorize {
            return Err(Self::unavailable());
        }
        if let Some(message) = &state.deny_with {
            return Ok(Authorization {
                authorized: false,
                authorization_id: None,
                message: Some(message.clone()),
            });
        }
        state.next_id += 1;
        Ok(Authorization {
            authorized: true,
            authorization_id: if state.omit_authorization_id {
                None
            } else {
                Some(format!("auth_{:04}", state.next_id))
            },
            message: None,
        })
    }

    async fn execute(
        &self,
        _authorization_id: &str,
        _intent_id: &str,
    ) -> Result<ExecutionReceipt, PaymentError> {
        let mut state = self.state.write().unwrap();
        state.execute_calls += 1;
        if state.fail_on_execute {
            return Err(Self::unavailable());
        }
        state.next_id += 1;
        let n = state.next_id;
        Ok(ExecutionReceipt {
            execution_id: Some(format!("exec_{n:04}")),
            invoice_url: if state.omit_invoice_url {
                None
            } else {
                Some(format!("https://pay.example/inv-{n:04}"))
            },
            order_id: if state.omit_order_id {
                None
            } else {
                Some(format!("ord_{n:04}"))
            },
            payment_id: Some(format!("pay_{n:04}")),
            status: Some("PENDING".to_string()),
        })
    }
}
