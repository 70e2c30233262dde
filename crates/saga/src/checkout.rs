//! Checkout saga coordinator.

use cart::CartOperations;
use common::CustomerId;
use payment::{IntentRequest, MandateRequest, PaymentAdapter, ShippingAddress};

use crate::outcome::{FailureStage, SagaOutcome};

/// Slack applied to the cart total when capping the mandate. A design
/// constant, not configuration.
const AMOUNT_LIMIT_SLACK: f64 = 1.1;

/// Mandate lifetime from creation.
const MANDATE_VALIDITY_DAYS: i64 = 365;

/// The only mandate scope this saga issues.
const MANDATE_SCOPE: &str = "purchase";

/// Orchestrates the checkout saga.
///
/// Drives the ordered sequence cart-verify → mandate → intent →
/// authorize → execute, then a best-effort cart clear. Steps never run
/// concurrently: each depends on the previous step's output. Concurrent
/// runs for different customers share no local state.
pub struct CheckoutSaga<C, P>
where
    C: CartOperations,
    P: PaymentAdapter,
{
    cart: C,
    payment: P,
}

impl<C, P> CheckoutSaga<C, P>
where
    C: CartOperations,
    P: PaymentAdapter,
{
    /// Creates a new checkout saga over the given cart and payment seams.
    pub fn new(cart: C, payment: P) -> Self {
        Self { cart, payment }
    }

    /// Runs the saga for one customer and returns its terminal outcome.
    ///
    /// Total: every failure mode lands in a tagged
    /// [`SagaOutcome::Failure`]; nothing escapes as an error.
    #[tracing::instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn run_checkout(&self, customer_id: &CustomerId) -> SagaOutcome {
        metrics::counter!("checkout_sagas_total").increment(1);
        let start = std::time::Instant::now();

        let outcome = self.drive(customer_id).await;

        metrics::histogram!("checkout_saga_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        match &outcome {
            SagaOutcome::Success { order_id, .. } => {
                metrics::counter!("checkout_sagas_completed").increment(1);
                tracing::info!(%order_id, "checkout saga completed");
            }
            SagaOutcome::Failure { stage, reason } => {
                metrics::counter!("checkout_sagas_failed", "stage" => stage.as_str())
                    .increment(1);
                tracing::warn!(stage = %stage, reason, "checkout saga aborted");
            }
        }
        outcome
    }

    async fn drive(&self, customer_id: &CustomerId) -> SagaOutcome {
        // 1. Verify the cart. The total captured here is frozen for the
        // rest of the run; later steps never re-fetch it.
        let snapshot = match self.cart.view(customer_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => return SagaOutcome::failure(FailureStage::CartFetch, e),
        };
        if snapshot.is_empty() {
            return SagaOutcome::failure(FailureStage::EmptyCart, "cannot checkout an empty cart");
        }
        let total_amount = snapshot.total_amount;
        tracing::info!(total_amount, items = snapshot.items.len(), "cart verified");

        // 2. Create the mandate.
        let mandate_request = MandateRequest {
            customer_id: customer_id.clone(),
            scope: MANDATE_SCOPE.to_string(),
            amount_limit: total_amount * AMOUNT_LIMIT_SLACK,
            expires_at: mandate_expiry(),
        };
        let mandate_id = match self.payment.create_mandate(&mandate_request).await {
            Ok(id) => id,
            Err(e) => return SagaOutcome::failure(FailureStage::Mandate, e),
        };
        tracing::info!(%mandate_id, "mandate created");

        // 3. Create the intent. The cart is addressed by customer ID.
        let intent_request = IntentRequest {
            mandate_id: mandate_id.clone(),
            customer_id: customer_id.clone(),
            cart_id: customer_id.clone(),
            shipping_address: ShippingAddress::default(),
        };
        let intent_id = match self.payment.create_intent(&intent_request).await {
            Ok(id) => id,
            Err(e) => return SagaOutcome::failure(FailureStage::Intent, e),
        };
        tracing::info!(%intent_id, "intent created");

        // 4. Authorize.
        let authorization = match self.payment.authorize(&intent_id, &mandate_id).await {
            Ok(authorization) => authorization,
            Err(e) => return SagaOutcome::failure(FailureStage::Authorize, e),
        };
        if !authorization.authorized {
            let reason = authorization
                .message
                .unwrap_or_else(|| "authorization denied".to_string());
            return SagaOutcome::failure(FailureStage::AuthorizationDenied, reason);
        }
        let authorization_id = match authorization.authorization_id {
            Some(id) => id,
            None => {
                return SagaOutcome::failure(
                    FailureStage::Authorize,
                    "authorization approved without an authorization_id",
                );
            }
        };
        tracing::info!(%authorization_id, "intent authorized");

        // 5. Execute. A 2xx without an invoice URL is not a success.
        let receipt = match self.payment.execute(&authorization_id, &intent_id).await {
            Ok(receipt) => receipt,
            Err(e) => return SagaOutcome::failure(FailureStage::Execute, e),
        };
        let invoice_url = match receipt.invoice_url {
            Some(url) => url,
            None => {
                return SagaOutcome::failure(
                    FailureStage::MissingInvoice,
                    format!(
                        "no invoice URL in execution response (status: {})",
                        receipt.status.as_deref().unwrap_or("unknown")
                    ),
                );
            }
        };

        // 6. Best-effort cart clear. Payment has already succeeded;
        // failing to tidy up must never mask a completed purchase.
        if let Err(e) = self.cart.clear(customer_id).await {
            tracing::warn!(%customer_id, error = %e, "failed to clear cart after checkout");
        }

        SagaOutcome::Success {
            order_id: receipt.order_id.unwrap_or_else(generated_order_id),
            payment_id: receipt.payment_id,
            execution_id: receipt.execution_id,
            status: receipt.status,
            invoice_url,
        }
    }
}

fn mandate_expiry() -> String {
    (chrono::Utc::now() + chrono::Duration::days(MANDATE_VALIDITY_DAYS))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

fn generated_order_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("ORD-{}", &hex[..8])
}
