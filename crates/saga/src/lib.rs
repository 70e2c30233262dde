//! Checkout saga orchestration.
//!
//! The saga drives a cart through checkout as an ordered chain of remote
//! calls: verify cart → create mandate → create intent → authorize →
//! execute → best-effort cart clear. Each step depends on the previous
//! step's output, any step can fail independently, and the saga folds
//! every partial-failure point into a single terminal [`SagaOutcome`].
//!
//! There is no compensation for completed prefixes: a mandate created
//! before a later step fails is left standing. Payment success is the
//! source of truth — a failed cart clear after a successful execution
//! never turns the outcome into a failure.

pub mod checkout;
pub mod outcome;

pub use checkout::CheckoutSaga;
pub use outcome::{FailureStage, SagaOutcome};
