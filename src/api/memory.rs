//! In-Memory Record Store
//!
//! Same contract as the hosted store: ids are assigned in increasing order,
//! unknown ids are rejected with status 400. Records every call and supports
//! injected failures and latency so callers can exercise error paths.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::RecordStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{CreateItemRequest, RemoteItem, UpdateItemRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// Calls received so far
#[derive(Debug, Clone, Default)]
pub struct StoreCalls {
    pub lists: usize,
    pub gets: usize,
    pub creates: Vec<CreateItemRequest>,
    pub updates: Vec<(u32, UpdateItemRequest)>,
    pub deletes: Vec<u32>,
}

#[derive(Default)]
struct Inner {
    items: Vec<RemoteItem>,
    next_id: u32,
    calls: StoreCalls,
    failures: HashMap<StoreOp, VecDeque<StoreError>>,
    latency: Duration,
}

#[derive(Default)]
pub struct MemoryRecordStore {
    inner: Mutex<Inner>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing records; new ids continue after the highest one
    pub fn with_items(items: Vec<RemoteItem>) -> Self {
        let next_id = items.iter().map(|i| i.id).max().unwrap_or(0);
        Self {
            inner: Mutex::new(Inner {
                items,
                next_id,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Make the next call of `op` fail with `error`
    pub fn fail_next(&self, op: StoreOp, error: StoreError) {
        self.lock().failures.entry(op).or_default().push_back(error);
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    pub fn calls(&self) -> StoreCalls {
        self.lock().calls.clone()
    }

    pub fn items(&self) -> Vec<RemoteItem> {
        self.lock().items.clone()
    }

    /// Drop a record behind the client's back
    pub fn remove_silently(&self, id: u32) {
        self.lock().items.retain(|item| item.id != id);
    }

    async fn enter(&self, op: StoreOp) -> StoreResult<()> {
        let latency = self.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut inner = self.lock();
        match inner.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn missing(id: u32) -> StoreError {
    StoreError::with_status(400, format!("HTTP 400: record {} not found", id))
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list_items(&self) -> StoreResult<Vec<RemoteItem>> {
        self.lock().calls.lists += 1;
        self.enter(StoreOp::List).await?;
        Ok(self.lock().items.clone())
    }

    async fn get_item(&self, id: u32) -> StoreResult<RemoteItem> {
        self.lock().calls.gets += 1;
        self.enter(StoreOp::Get).await?;
        self.lock()
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| missing(id))
    }

    async fn create_item(&self, payload: &CreateItemRequest) -> StoreResult<RemoteItem> {
        self.lock().calls.creates.push(payload.clone());
        self.enter(StoreOp::Create).await?;
        let mut inner = self.lock();
        inner.next_id += 1;
        let created = RemoteItem {
            id: inner.next_id,
            created_at: Some(chrono::Utc::now()),
            user: Some(payload.user),
            name: payload.name.clone(),
            description: payload.description.clone(),
            priority: payload.priority,
            source_url: payload.source_url.clone(),
            status: payload.status,
            cost: payload.cost,
            notes: payload.notes.clone(),
            category: payload.category.clone(),
        };
        inner.items.push(created.clone());
        Ok(created)
    }

    async fn update_item(&self, id: u32, payload: &UpdateItemRequest) -> StoreResult<RemoteItem> {
        self.lock().calls.updates.push((id, payload.clone()));
        self.enter(StoreOp::Update).await?;
        let mut inner = self.lock();
        let item = inner
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| missing(id))?;

        let patch = payload.clone();
        if let Some(user) = patch.user {
            item.user = Some(user);
        }
        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(priority) = patch.priority {
            item.priority = priority;
        }
        if let Some(source_url) = patch.source_url {
            item.source_url = source_url;
        }
        if let Some(status) = patch.status {
            item.status = status;
        }
        if let Some(cost) = patch.cost {
            item.cost = cost;
        }
        if let Some(notes) = patch.notes {
            item.notes = notes;
        }
        if let Some(category) = patch.category {
            item.category = category;
        }
        Ok(item.clone())
    }

    async fn delete_item(&self, id: u32) -> StoreResult<()> {
        self.lock().calls.deletes.push(id);
        self.enter(StoreOp::Delete).await?;
        let mut inner = self.lock();
        let before = inner.items.len();
        inner.items.retain(|item| item.id != id);
        if inner.items.len() == before {
            return Err(missing(id));
        }
        Ok(())
    }
}
