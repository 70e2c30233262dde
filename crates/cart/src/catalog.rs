//! Merchant catalog client.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{MerchantId, ProductId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use transport::{Backend, RemoteServiceClient, TransportError};

/// The catalog is fetched as a single page; merchants in this system are
/// well under this size.
pub const CATALOG_PAGE_SIZE: u32 = 100;

/// One item in a merchant's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "itemId")]
    pub item_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: u32,
}

/// Read access to a merchant's item catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Lists a merchant's items (single page, capped page size).
    async fn list_items(&self, merchant_id: &MerchantId)
    -> Result<Vec<CatalogItem>, TransportError>;
}

#[derive(Debug, Default, Deserialize)]
struct ListItemsResponse {
    #[serde(default)]
    items: Vec<CatalogItem>,
}

/// Catalog client over the runtime's MerchantService.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Arc<RemoteServiceClient>,
}

impl HttpCatalogClient {
    /// Creates a catalog client sharing the given transport.
    pub fn new(client: Arc<RemoteServiceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Catalog for HttpCatalogClient {
    async fn list_items(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Vec<CatalogItem>, TransportError> {
        let path = format!("/merchant.sv1.MerchantService/{merchant_id}/ListItems");
        let body = json!({
            "merchant_id": merchant_id,
            "page_size": CATALOG_PAGE_SIZE,
            "page_token": "",
        });

        let value = self
            .client
            .call(Backend::Runtime, &path, Method::POST, Some(&body))
            .await?;
        let response: ListItemsResponse =
            serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(response.items)
    }
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    items: HashMap<MerchantId, Vec<CatalogItem>>,
    fail_on_list: bool,
    list_calls: usize,
}

/// In-memory catalog for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalog {
    /// Creates an empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item to a merchant's catalog.
    pub fn stock(&self, merchant_id: &MerchantId, item: CatalogItem) {
        self.state
            .write()
            .unwrap()
            .items
            .entry(merchant_id.clone())
            .or_default()
            .push(item);
    }

    /// Configures the catalog to fail on list calls.
    pub fn set_fail_on_list(&self, fail: bool) {
        self.state.write().unwrap().fail_on_list = fail;
    }

    /// Returns how many list calls have been made.
    pub fn list_calls(&self) -> usize {
        self.state.read().unwrap().list_calls
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn list_items(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Vec<CatalogItem>, TransportError> {
        let mut state = self.state.write().unwrap();
        state.list_calls += 1;

        if state.fail_on_list {
            return Err(TransportError::Request(
                "catalog unavailable".to_string(),
            ));
        }

        Ok(state.items.get(merchant_id).cloned().unwrap_or_default())
    }
}
