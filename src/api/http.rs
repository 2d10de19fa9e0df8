//! HTTP Record Store
//!
//! reqwest client against `<base_url>/<collection>`. Every request carries
//! the `X-Data-Source` tag chosen by the configuration.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::RecordStore;
use crate::config::AppConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::{CreateItemRequest, RemoteItem, UpdateItemRequest};

pub const DATA_SOURCE_HEADER: &str = "X-Data-Source";

pub struct HttpRecordStore {
    client: Client,
    config: AppConfig,
}

impl HttpRecordStore {
    pub fn new(config: AppConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: AppConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn collection_url(&self) -> String {
        self.config.collection_url()
    }

    fn item_url(&self, id: u32) -> String {
        format!("{}/{}", self.config.collection_url(), id)
    }

    fn tagged(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(DATA_SOURCE_HEADER, self.config.data_source.as_str())
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> StoreResult<Response> {
        let response = self
            .tagged(request)
            .send()
            .await
            .map_err(|e| StoreError::new(format!("Failed to {}: {}", action, e)))?;
        check_status(response).await
    }
}

/// Turn a non-2xx response into a `StoreError`, preferring the body over the reason phrase
async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let reason = status.canonical_reason().unwrap_or_default().to_string();
    let details = match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        _ => reason,
    };
    Err(StoreError::with_status(
        status.as_u16(),
        format!("HTTP {}: {}", status.as_u16(), details),
    ))
}

async fn decode<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|_| StoreError::new("Failed to parse response as JSON"))
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list_items(&self) -> StoreResult<Vec<RemoteItem>> {
        let request = self.client.get(self.collection_url());
        let response = self.send(request, "fetch items").await?;
        let items: Vec<RemoteItem> = decode(response).await?;
        log::debug!("Fetched {} items from {}", items.len(), self.collection_url());
        Ok(items)
    }

    async fn get_item(&self, id: u32) -> StoreResult<RemoteItem> {
        let request = self.client.get(self.item_url(id));
        let response = self.send(request, &format!("fetch item {}", id)).await?;
        decode(response).await
    }

    async fn create_item(&self, payload: &CreateItemRequest) -> StoreResult<RemoteItem> {
        let request = self.client.post(self.collection_url()).json(payload);
        let response = self.send(request, "create item").await?;
        decode(response).await
    }

    async fn update_item(&self, id: u32, payload: &UpdateItemRequest) -> StoreResult<RemoteItem> {
        let request = self.client.patch(self.item_url(id)).json(payload);
        let response = self.send(request, &format!("update item {}", id)).await?;
        decode(response).await
    }

    async fn delete_item(&self, id: u32) -> StoreResult<()> {
        let request = self.client.delete(self.item_url(id));
        self.send(request, &format!("delete item {}", id)).await?;
        Ok(())
    }
}
