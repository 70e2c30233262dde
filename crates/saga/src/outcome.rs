//! Terminal saga outcomes.

use serde::{Deserialize, Serialize};

/// The step at which a checkout saga aborted.
///
/// Stages are reported in kebab-case on the wire (`cart-fetch`,
/// `authorization-denied`, ...). `EmptyCart`, `AuthorizationDenied`, and
/// `MissingInvoice` are business rejections and contract violations; the
/// rest mark transport failures at the named step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureStage {
    /// The cart could not be fetched from the runtime.
    CartFetch,
    /// The cart was fetched but holds no items.
    EmptyCart,
    /// Mandate creation failed.
    Mandate,
    /// Intent creation failed or returned no intent ID.
    Intent,
    /// The authorize call failed, or approved without an authorization ID.
    Authorize,
    /// The adapter explicitly declined the intent.
    AuthorizationDenied,
    /// The execute call failed.
    Execute,
    /// Execution answered 2xx but carried no invoice URL in any spelling.
    MissingInvoice,
}

impl FailureStage {
    /// Returns the stage tag as reported to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::CartFetch => "cart-fetch",
            FailureStage::EmptyCart => "empty-cart",
            FailureStage::Mandate => "mandate",
            FailureStage::Intent => "intent",
            FailureStage::Authorize => "authorize",
            FailureStage::AuthorizationDenied => "authorization-denied",
            FailureStage::Execute => "execute",
            FailureStage::MissingInvoice => "missing-invoice",
        }
    }
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single externally visible result of a checkout saga run.
///
/// True success requires an invoice URL; a 2xx execution without one is a
/// `Failure` tagged [`FailureStage::MissingInvoice`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SagaOutcome {
    /// Checkout completed; the customer finishes payment at `invoice_url`.
    Success {
        order_id: String,
        payment_id: Option<String>,
        execution_id: Option<String>,
        status: Option<String>,
        invoice_url: String,
    },
    /// Checkout aborted at `stage` for `reason`.
    Failure {
        stage: FailureStage,
        reason: String,
    },
}

impl SagaOutcome {
    /// Builds a failure outcome from any displayable reason.
    pub fn failure(stage: FailureStage, reason: impl std::fmt::Display) -> Self {
        SagaOutcome::Failure {
            stage,
            reason: reason.to_string(),
        }
    }

    /// Returns true for a success outcome.
    pub fn is_success(&self) -> bool {
        matches!(self, SagaOutcome::Success { .. })
    }

    /// Returns the failure stage, if this is a failure.
    pub fn stage(&self) -> Option<FailureStage> {
        match self {
            SagaOutcome::Failure { stage, .. } => Some(*stage),
            SagaOutcome::Success { .. } => None,
        }
    }
}
