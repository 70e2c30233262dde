//! Response shape adapter for the execute endpoint.
//!
//! The adapter sometimes wraps the execution payload in a `result`
//! envelope and spells field names in either snake_case or camelCase.
//! Rather than probing dictionaries ad hoc at the call site, each field
//! has a fixed, ordered candidate list and the first present spelling
//! wins.

use serde_json::Value;

use crate::types::ExecutionReceipt;

const EXECUTION_ID: &[&str] = &["execution_id", "executionId"];
const INVOICE_URL: &[&str] = &["invoice_url", "invoiceLink"];
const ORDER_ID: &[&str] = &["order_id", "orderId"];
const PAYMENT_ID: &[&str] = &["payment_id", "paymentId"];

/// Unwraps the `result` envelope if present, otherwise treats the whole
/// body as the payload.
fn payload(body: &Value) -> &Value {
    match body.get("result") {
        Some(inner) if inner.is_object() => inner,
        _ => body,
    }
}

/// Returns the first candidate field present as a string.
fn first_string(value: &Value, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find_map(|key| value.get(*key))
        .and_then(Value::as_str)
        .map(String::from)
}

/// Normalizes an execute response body into an [`ExecutionReceipt`].
pub fn execution_receipt(body: &Value) -> ExecutionReceipt {
    let payload = payload(body);
    ExecutionReceipt {
        execution_id: first_string(payload, EXECUTION_ID),
        invoice_url: first_string(payload, INVOICE_URL),
        order_id: first_string(payload, ORDER_ID),
        payment_id: first_string(payload, PAYMENT_ID),
        status: first_string(payload, &["status"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_snake_case_body() {
        let body = json!({
            "execution_id": "exec_1",
            "invoice_url": "https://pay.example/abc",
            "order_id": "ord_1",
            "payment_id": "pay_1",
            "status": "PENDING",
        });

        let receipt = execution_receipt(&body);
        assert_eq!(receipt.execution_id.as_deref(), Some("exec_1"));
        assert_eq!(receipt.invoice_url.as_deref(), Some("https://pay.example/abc"));
        assert_eq!(receipt.order_id.as_deref(), Some("ord_1"));
        assert_eq!(receipt.payment_id.as_deref(), Some("pay_1"));
        assert_eq!(receipt.status.as_deref(), Some("PENDING"));
    }

    #[test]
    fn nested_camel_case_body() {
        let body = json!({
            "result": {
                "invoiceLink": "https://pay.example/abc",
                "paymentId": "pay_1",
                "status": "PENDING",
            }
        });

        let receipt = execution_receipt(&body);
        assert_eq!(receipt.invoice_url.as_deref(), Some("https://pay.example/abc"));
        assert_eq!(receipt.payment_id.as_deref(), Some("pay_1"));
        assert_eq!(receipt.status.as_deref(), Some("PENDING"));
        assert!(receipt.execution_id.is_none());
        assert!(receipt.order_id.is_none());
    }

    #[test]
    fn snake_case_spelling_wins_when_both_present() {
        let body = json!({
            "invoice_url": "https://pay.example/snake",
            "invoiceLink": "https://pay.example/camel",
        });

        let receipt = execution_receipt(&body);
        assert_eq!(
            receipt.invoice_url.as_deref(),
            Some("https://pay.example/snake")
        );
    }

    #[test]
    fn non_object_result_falls_back_to_top_level() {
        let body = json!({
            "result": "ok",
            "paymentId": "pay_1",
        });

        let receipt = execution_receipt(&body);
        assert_eq!(receipt.payment_id.as_deref(), Some("pay_1"));
    }

    #[test]
    fn empty_body_yields_empty_receipt() {
        let receipt = execution_receipt(&json!({}));
        assert_eq!(receipt, ExecutionReceipt::default());
    }
}
