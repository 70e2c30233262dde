//! Generic JSON request/response client for the backend services.

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::error::TransportError;

/// Request timeout for payment-adapter calls. The adapter blocks on
/// third-party settlement, so it gets far more slack than the runtime.
const PAYMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// The backend a call is addressed to.
///
/// The two backends differ in base URL and timeout: the workflow runtime
/// answers from local state, while the payment adapter may wait on an
/// external settlement provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Cart and merchant state runtime.
    Runtime,
    /// Payment adapter (mandates, intents, authorizations, executions).
    Payment,
}

impl Backend {
    /// Returns the backend name used in spans and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Runtime => "runtime",
            Backend::Payment => "payment",
        }
    }
}

/// Base addresses for the two backends.
///
/// Constructed once at process start from configuration and passed into
/// each component; no component reads the environment itself.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub runtime_base: Url,
    pub payment_base: Url,
}

/// JSON-over-HTTP caller shared by the cart gateway, catalog client, and
/// payment gateway.
#[derive(Debug, Clone)]
pub struct RemoteServiceClient {
    http: reqwest::Client,
    config: TransportConfig,
}

impl RemoteServiceClient {
    /// Creates a client for the configured backends.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Sends one request and returns the decoded JSON body.
    ///
    /// Non-2xx responses become [`TransportError::Status`] with the body
    /// text attached where retrievable; network failures become
    /// [`TransportError::Request`]. The call is wrapped in a span tagged
    /// with method, URL, and outcome status.
    #[tracing::instrument(
        name = "remote.call",
        skip(self, body),
        fields(backend = backend.as_str(), http.url = tracing::field::Empty, http.status = tracing::field::Empty)
    )]
    pub async fn call(
        &self,
        backend: Backend,
        path: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let base = match backend {
            Backend::Runtime => &self.config.runtime_base,
            Backend::Payment => &self.config.payment_base,
        };
        let url = base
            .join(path)
            .map_err(|e| TransportError::InvalidUrl(format!("{path}: {e}")))?;
        tracing::Span::current().record("http.url", url.as_str());

        let mut request = self.http.request(method, url);
        if backend == Backend::Payment {
            request = request.timeout(PAYMENT_TIMEOUT);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        tracing::Span::current().record("http.status", status.as_u16());
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "remote call failed");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
