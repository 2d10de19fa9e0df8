//! Record Store Client
//!
//! Typed access to the remote shopping-item collection.
//! Implementations:
//! - http: the hosted store, over HTTPS
//! - memory: in-process store with the same contract

mod http;
mod memory;

#[cfg(test)]
mod tests;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{CreateItemRequest, RemoteItem, UpdateItemRequest};

pub use http::HttpRecordStore;
pub use memory::{MemoryRecordStore, StoreCalls, StoreOp};

/// CRUD operations on the remote collection
///
/// Every failure is normalised into a `StoreError`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List every record, in store order
    async fn list_items(&self) -> StoreResult<Vec<RemoteItem>>;

    /// Fetch one record by id
    async fn get_item(&self, id: u32) -> StoreResult<RemoteItem>;

    /// Create a record; the store assigns the id
    async fn create_item(&self, payload: &CreateItemRequest) -> StoreResult<RemoteItem>;

    /// Patch a record with any subset of its mutable fields
    async fn update_item(&self, id: u32, payload: &UpdateItemRequest) -> StoreResult<RemoteItem>;

    /// Delete a record
    async fn delete_item(&self, id: u32) -> StoreResult<()>;
}
