//! Autosave Controller
//!
//! Owns the checklist rows and decides, on every edit, whether the row stays
//! local, gets a debounced update, or gets a debounced create.
//!
//! Row lifecycle: `Unsaved` (no id) → `Saving` (timer waiting or request in
//! flight, row key in the pending set) → `Saved` (has id). A saved row cycles
//! `Saved → Saving → Saved` on further edits and never loses its id.
//!
//! Debounced work reads the row when the timer fires, not when the edit
//! happens, so a burst of edits sends one request with the latest values.

pub mod debounce;


use std::sync::{Arc, Weak};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::api::RecordStore;
use crate::defaults;
use crate::error::{AutosaveError, AutosaveResult, FormError, StoreError};
use crate::form::{self, NewItemDraft};
use crate::models::{CreateItemRequest, FieldEdit, LocalItem, Row, RowKey};
use crate::reconcile::{reconcile, ReconcileStrategy};
use crate::store::{ChecklistSnapshot, ChecklistState, ConnectionState, StatusKind};
use crate::transform::{self, DEFAULT_USER};

use debounce::Debouncer;

pub const UPDATE_DELAY: Duration = Duration::from_millis(1000);
pub const CREATE_DELAY: Duration = Duration::from_millis(1500);
pub const STATUS_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveSettings {
    /// Quiet period before an edit to a saved row is sent
    pub update_delay: Duration,
    /// Quiet period before a new row is created remotely
    pub create_delay: Duration,
    /// Lifetime of a status message
    pub status_ttl: Duration,
    /// How fetched records are arranged under banners
    pub strategy: ReconcileStrategy,
    /// Store user new records belong to
    pub user: u32,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            update_delay: UPDATE_DELAY,
            create_delay: CREATE_DELAY,
            status_ttl: STATUS_TTL,
            strategy: ReconcileStrategy::default(),
            user: DEFAULT_USER,
        }
    }
}

/// What an edit set in motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAction {
    LocalOnly,
    UpdateScheduled,
    CreateScheduled,
}

struct Inner {
    store: Arc<dyn RecordStore>,
    state: Mutex<ChecklistState>,
    timers: Debouncer<RowKey>,
    settings: AutosaveSettings,
}

/// Handle to the checklist; clones share the same state
#[derive(Clone)]
pub struct AutosaveController {
    inner: Arc<Inner>,
}

impl AutosaveController {
    /// Start with the built-in checklist until `load` replaces it
    pub fn new(store: Arc<dyn RecordStore>, settings: AutosaveSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                state: Mutex::new(ChecklistState::new(defaults::default_items())),
                timers: Debouncer::new(),
                settings,
            }),
        }
    }

    pub fn settings(&self) -> &AutosaveSettings {
        &self.inner.settings
    }

    pub async fn snapshot(&self) -> ChecklistSnapshot {
        self.inner.state.lock().await.snapshot()
    }

    pub async fn connection(&self) -> ConnectionState {
        self.inner.state.lock().await.connection()
    }

    // ========================
    // Loading
    // ========================

    /// Fetch every record and rebuild the list
    ///
    /// An empty store shows the built-in checklist; a failing store shows it
    /// too and degrades the connection, after which edits stay local.
    pub async fn load(&self) -> ConnectionState {
        self.inner.timers.cancel_all();
        let result = self.inner.store.list_items().await;

        let mut state = self.inner.state.lock().await;
        match result {
            Ok(remote) if remote.is_empty() => {
                info!("Store is empty, showing the built-in checklist");
                state.replace_items(defaults::default_items());
                state.set_connection(ConnectionState::Connected);
            }
            Ok(remote) => {
                let locals = remote.iter().map(transform::to_local).collect();
                let display = reconcile(&self.inner.settings.strategy, locals);
                info!("Loaded {} records into {} rows", remote.len(), display.len());
                state.replace_items(display);
                state.set_connection(ConnectionState::Connected);
            }
            Err(e) => {
                warn!("Load failed, working locally: {}", e);
                state.replace_items(defaults::default_items());
                state.set_connection(ConnectionState::Degraded);
            }
        }
        state.connection()
    }

    /// User-triggered reload; the only way out of the degraded state
    pub async fn refresh(&self) -> ConnectionState {
        info!("Refreshing checklist");
        self.load().await
    }

    // ========================
    // Edits
    // ========================

    /// Apply one field edit and schedule whatever persistence it needs
    pub async fn update_field(&self, key: RowKey, edit: FieldEdit) -> AutosaveResult<SaveAction> {
        let mut state = self.inner.state.lock().await;
        let item = state.item_mut(key).ok_or(AutosaveError::RowNotFound(key))?;
        edit.apply(item);
        let (is_header, id, has_name) = (item.is_header(), item.id, item.has_name());

        if is_header || !state.is_connected() {
            return Ok(SaveAction::LocalOnly);
        }
        match id {
            Some(_) => {
                state.mark_pending(key);
                drop(state);
                self.schedule_update(key);
                Ok(SaveAction::UpdateScheduled)
            }
            None if has_name => {
                state.mark_pending(key);
                drop(state);
                self.schedule_create(key);
                Ok(SaveAction::CreateScheduled)
            }
            None => Ok(SaveAction::LocalOnly),
        }
    }

    /// Append a row from the add-item form and create it right away
    pub async fn add_item(&self, draft: NewItemDraft) -> AutosaveResult<RowKey> {
        let local = draft.into_local()?;
        let payload = if local.is_header() {
            None
        } else {
            Some(transform::to_remote_for_user(&local, self.inner.settings.user)?)
        };

        let mut state = self.inner.state.lock().await;
        let key = state.push(local);
        state.set_status("New item added successfully!", StatusKind::Success, self.inner.settings.status_ttl);

        if let (Some(payload), true) = (payload, state.is_connected()) {
            state.mark_pending(key);
            state.begin_create(key);
            drop(state);
            let weak = Arc::downgrade(&self.inner);
            tokio::spawn(async move {
                if let Some(controller) = Self::upgrade(&weak) {
                    controller.send_create(key, None, payload).await;
                }
            });
        }
        Ok(key)
    }

    /// Append a banner row; local only
    pub async fn add_category(&self, name: &str) -> AutosaveResult<RowKey> {
        let banner = form::category_banner(name)
            .ok_or_else(|| FormError(vec!["Category name is required".to_string()]))?;
        let mut state = self.inner.state.lock().await;
        Ok(state.push(LocalItem::header(banner)))
    }

    /// Append an empty template row; it is created once it gets a name
    pub async fn insert_blank_row(&self, category: &str) -> RowKey {
        let mut state = self.inner.state.lock().await;
        state.push(LocalItem::blank(category))
    }

    /// Remove a row; saved rows are deleted remotely first and stay if that fails
    pub async fn delete_item(&self, key: RowKey) -> AutosaveResult<()> {
        self.inner.timers.cancel(&key);
        let id = {
            let mut state = self.inner.state.lock().await;
            let (id, is_header) = {
                let row = state.row(key).ok_or(AutosaveError::RowNotFound(key))?;
                (row.item.id, row.item.is_header())
            };
            match id {
                Some(id) if !is_header && state.is_connected() => {
                    state.mark_pending(key);
                    id
                }
                _ => {
                    state.remove(key);
                    return Ok(());
                }
            }
        };

        let result = self.inner.store.delete_item(id).await;
        let mut state = self.inner.state.lock().await;
        match result {
            Ok(()) => {
                info!("Deleted record {} (row {})", id, key);
                state.remove(key);
                state.set_status("Item deleted", StatusKind::Success, self.inner.settings.status_ttl);
                Ok(())
            }
            Err(e) => {
                warn!("Delete of record {} failed: {}", id, e);
                state.clear_pending(key);
                state.set_status(
                    format!("Delete failed: {}", e),
                    StatusKind::Failure,
                    self.inner.settings.status_ttl,
                );
                Err(e.into())
            }
        }
    }

    /// Send every saved row at once; any failure fails the whole batch
    ///
    /// Returns how many rows were sent. While degraded nothing is sent.
    pub async fn save_all(&self) -> AutosaveResult<usize> {
        let jobs = {
            let mut state = self.inner.state.lock().await;
            if !state.is_connected() {
                info!("Save all skipped: working locally");
                return Ok(0);
            }
            let mut jobs = Vec::new();
            for (key, id, item) in state.saved_rows() {
                let payload = transform::to_remote_for_user(&item, self.inner.settings.user)?;
                jobs.push((key, id, payload));
            }
            for (key, _, _) in &jobs {
                state.mark_pending(*key);
            }
            jobs
        };

        let total = jobs.len();
        let keys: Vec<RowKey> = jobs.iter().map(|(key, _, _)| *key).collect();
        let mut set = JoinSet::new();
        for (key, id, payload) in jobs {
            let store = self.inner.store.clone();
            set.spawn(async move { (key, id, store.update_item(id, &payload.into()).await) });
        }

        let mut failed = 0;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, _, Ok(_))) => {}
                Ok((key, id, Err(e))) => {
                    warn!("Bulk update of record {} (row {}) failed: {}", id, key, e);
                    failed += 1;
                }
                Err(e) => {
                    warn!("Bulk update task failed: {}", e);
                    failed += 1;
                }
            }
        }

        let mut state = self.inner.state.lock().await;
        for key in keys {
            if !self.inner.timers.is_scheduled(&key) {
                state.clear_pending(key);
            }
        }
        let ttl = self.inner.settings.status_ttl;
        if failed > 0 {
            state.set_status(
                format!("Save all failed: {} of {} updates failed", failed, total),
                StatusKind::Failure,
                ttl,
            );
            Err(AutosaveError::BulkSave { failed, total })
        } else {
            info!("Saved all {} rows", total);
            state.set_status("All changes saved!", StatusKind::Success, ttl);
            Ok(total)
        }
    }

    // ========================
    // Debounced work
    // ========================

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn schedule_update(&self, key: RowKey) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.timers.schedule(key, self.inner.settings.update_delay, async move {
            if let Some(controller) = Self::upgrade(&weak) {
                controller.run_update(key).await;
            }
        });
    }

    fn schedule_create(&self, key: RowKey) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.timers.schedule(key, self.inner.settings.create_delay, async move {
            if let Some(controller) = Self::upgrade(&weak) {
                controller.run_create(key).await;
            }
        });
    }

    /// Payload for a persistable row
    fn payload_for(&self, row: &Row) -> Option<CreateItemRequest> {
        transform::to_remote_for_user(&row.item, self.inner.settings.user).ok()
    }

    /// Clear the pending marker unless another timer for the row is waiting
    fn settle(&self, state: &mut ChecklistState, key: RowKey) {
        if !self.inner.timers.is_scheduled(&key) {
            state.clear_pending(key);
        }
    }

    fn report_failure(&self, state: &mut ChecklistState, key: RowKey, error: &StoreError) {
        self.settle(state, key);
        state.set_status(
            format!("Save failed: {}", error),
            StatusKind::Failure,
            self.inner.settings.status_ttl,
        );
    }

    fn report_success(&self, state: &mut ChecklistState, key: RowKey) {
        self.settle(state, key);
        state.set_status("Changes saved", StatusKind::Success, self.inner.settings.status_ttl);
    }

    async fn run_update(&self, key: RowKey) {
        loop {
            let (id, payload) = {
                let mut state = self.inner.state.lock().await;
                let connected = state.is_connected();
                let prepared = state
                    .row(key)
                    .filter(|row| connected && !row.item.is_header())
                    .and_then(|row| Some((row.item.id?, self.payload_for(row)?)));
                match prepared {
                    Some(prepared) => prepared,
                    None => {
                        debug!("Update for row {} dropped", key);
                        self.settle(&mut state, key);
                        return;
                    }
                }
            };

            let result = self.inner.store.update_item(id, &payload.clone().into()).await;
            let mut state = self.inner.state.lock().await;
            match result {
                Ok(_) => {
                    debug!("Updated record {} (row {})", id, key);
                    self.report_success(&mut state, key);
                }
                Err(e) if e.is_missing_record() => {
                    match state.row(key).and_then(|row| row.item.id) {
                        Some(current) if current != id => {
                            debug!("Row {} moved to record {}, resending", key, current);
                            continue;
                        }
                        Some(_) if state.is_creating(key) => {
                            debug!("Row {} is already being recreated, will follow up", key);
                            state.request_resync(key);
                        }
                        Some(_) => {
                            warn!("Record {} is gone remotely, creating it again: {}", id, e);
                            state.begin_create(key);
                            drop(state);
                            self.send_create(key, Some(id), payload).await;
                        }
                        None => self.settle(&mut state, key),
                    }
                }
                Err(e) => {
                    warn!("Update of record {} (row {}) failed: {}", id, key, e);
                    self.report_failure(&mut state, key, &e);
                }
            }
            return;
        }
    }

    async fn run_create(&self, key: RowKey) {
        let payload = {
            let mut state = self.inner.state.lock().await;
            let connected = state.is_connected();
            let created_meanwhile = state
                .row(key)
                .map_or(false, |row| row.item.id.is_some() && !row.item.is_header());
            if connected && created_meanwhile {
                drop(state);
                debug!("Row {} got its id before this create fired, updating instead", key);
                self.run_update(key).await;
                return;
            }
            let prepared = state
                .row(key)
                .filter(|row| {
                    connected && !row.item.is_header() && row.item.id.is_none() && row.item.has_name()
                })
                .and_then(|row| self.payload_for(row));
            let Some(payload) = prepared else {
                debug!("Create for row {} dropped", key);
                self.settle(&mut state, key);
                return;
            };
            if state.is_creating(key) {
                debug!("Row {} edited while being created, will follow up", key);
                state.request_resync(key);
                return;
            }
            state.begin_create(key);
            payload
        };
        self.send_create(key, None, payload).await;
    }

    /// Issue a create for a row already marked as creating
    ///
    /// `replaces` is the id of a record that vanished remotely; the row gives
    /// it up for the new one.
    async fn send_create(&self, key: RowKey, replaces: Option<u32>, payload: CreateItemRequest) {
        let result = self.inner.store.create_item(&payload).await;

        let mut state = self.inner.state.lock().await;
        let resync = state.finish_create(key);
        match result {
            Ok(created) => {
                match state.item_mut(key) {
                    Some(item) if item.id.is_none() || item.id == replaces => {
                        info!("Created record {} for row {}", created.id, key);
                        item.id = Some(created.id);
                    }
                    Some(_) => {}
                    None => {
                        warn!("Row {} removed while record {} was being created", key, created.id);
                        return;
                    }
                }
                if resync {
                    drop(state);
                    self.schedule_update(key);
                } else {
                    self.report_success(&mut state, key);
                }
            }
            Err(e) => {
                warn!("Create for row {} failed: {}", key, e);
                self.report_failure(&mut state, key, &e);
            }
        }
    }
}
