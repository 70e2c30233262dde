//! HTTP tool server for the checkout saga.
//!
//! Exposes the cart, catalog, and checkout operations as named tools behind
//! a single dispatch endpoint, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use cart::{CartOperations, Catalog, HttpCartGateway, HttpCatalogClient};
use metrics_exporter_prometheus::PrometheusHandle;
use payment::{HttpPaymentGateway, PaymentAdapter};
use saga::CheckoutSaga;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use transport::{RemoteServiceClient, TransportError};

use config::Config;
use routes::tools::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<C, P, K>(state: Arc<AppState<C, P, K>>, metrics_handle: PrometheusHandle) -> Router
where
    C: CartOperations + Clone + 'static,
    P: PaymentAdapter + 'static,
    K: Catalog + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/tools", get(routes::tools::list))
        .route("/tools/call", post(routes::tools::call::<C, P, K>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// The application state wired to the real HTTP backends.
pub type HttpAppState =
    AppState<HttpCartGateway<HttpCatalogClient>, HttpPaymentGateway, HttpCatalogClient>;

/// Creates application state backed by the configured runtime and payment
/// services.
pub fn create_default_state(config: &Config) -> Result<Arc<HttpAppState>, TransportError> {
    let client = Arc::new(RemoteServiceClient::new(config.transport()?)?);
    let catalog = HttpCatalogClient::new(client.clone());
    let cart = HttpCartGateway::new(client.clone(), catalog.clone());
    let payment = HttpPaymentGateway::new(client);
    let saga = CheckoutSaga::new(cart.clone(), payment);

    Ok(Arc::new(AppState {
        cart,
        catalog,
        saga,
    }))
}
