//! Checklist State
//!
//! The row list, the pending set and the connection flag, owned by the
//! autosave controller. Only the controller mutates it; renderers get a
//! `ChecklistSnapshot`.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

use crate::models::{LocalItem, Row, RowKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Initial load not finished yet
    Loading,
    /// Store reachable; edits are persisted
    Connected,
    /// Store unreachable at load time; edits stay local until a refresh
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Failure,
}

/// Transient feedback line shown next to the toolbar
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub expires_at: Instant,
}

impl StatusMessage {
    pub fn is_failure(&self) -> bool {
        self.kind == StatusKind::Failure
    }
}

/// Read-only view for rendering
#[derive(Debug, Clone)]
pub struct ChecklistSnapshot {
    pub rows: Vec<Row>,
    pub pending: HashSet<RowKey>,
    pub connection: ConnectionState,
    pub status: Option<StatusMessage>,
}

impl ChecklistSnapshot {
    pub fn items(&self) -> impl Iterator<Item = &LocalItem> {
        self.rows.iter().map(|row| &row.item)
    }

    pub fn row(&self, key: RowKey) -> Option<&Row> {
        self.rows.iter().find(|row| row.key == key)
    }

    pub fn find_by_id(&self, id: u32) -> Option<&Row> {
        self.rows.iter().find(|row| row.item.id == Some(id))
    }

    pub fn is_pending(&self, key: RowKey) -> bool {
        self.pending.contains(&key)
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }
}

#[derive(Debug)]
pub(crate) struct ChecklistState {
    rows: Vec<Row>,
    pending: HashSet<RowKey>,
    /// Rows with a create request in flight
    creating: HashSet<RowKey>,
    /// Rows edited while their create was in flight
    resync: HashSet<RowKey>,
    connection: ConnectionState,
    status: Option<StatusMessage>,
    next_key: RowKey,
}

impl ChecklistState {
    pub(crate) fn new(items: Vec<LocalItem>) -> Self {
        let mut state = Self {
            rows: Vec::new(),
            pending: HashSet::new(),
            creating: HashSet::new(),
            resync: HashSet::new(),
            connection: ConnectionState::Loading,
            status: None,
            next_key: 1,
        };
        state.replace_items(items);
        state
    }

    /// Rebuild the whole list; every row gets a fresh key
    pub(crate) fn replace_items(&mut self, items: Vec<LocalItem>) {
        self.rows.clear();
        self.pending.clear();
        self.creating.clear();
        self.resync.clear();
        for item in items {
            self.push(item);
        }
    }

    pub(crate) fn push(&mut self, item: LocalItem) -> RowKey {
        let key = self.next_key;
        self.next_key += 1;
        self.rows.push(Row { key, item });
        key
    }

    pub(crate) fn row(&self, key: RowKey) -> Option<&Row> {
        self.rows.iter().find(|row| row.key == key)
    }

    pub(crate) fn item_mut(&mut self, key: RowKey) -> Option<&mut LocalItem> {
        self.rows
            .iter_mut()
            .find(|row| row.key == key)
            .map(|row| &mut row.item)
    }

    pub(crate) fn remove(&mut self, key: RowKey) -> Option<Row> {
        let index = self.rows.iter().position(|row| row.key == key)?;
        self.pending.remove(&key);
        self.creating.remove(&key);
        self.resync.remove(&key);
        Some(self.rows.remove(index))
    }

    /// Saved rows (non-header, with an id)
    pub(crate) fn saved_rows(&self) -> Vec<(RowKey, u32, LocalItem)> {
        self.rows
            .iter()
            .filter(|row| !row.item.is_header())
            .filter_map(|row| row.item.id.map(|id| (row.key, id, row.item.clone())))
            .collect()
    }

    pub(crate) fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub(crate) fn set_connection(&mut self, connection: ConnectionState) {
        self.connection = connection;
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    pub(crate) fn mark_pending(&mut self, key: RowKey) {
        self.pending.insert(key);
    }

    pub(crate) fn clear_pending(&mut self, key: RowKey) {
        self.pending.remove(&key);
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self, key: RowKey) -> bool {
        self.pending.contains(&key)
    }

    pub(crate) fn begin_create(&mut self, key: RowKey) {
        self.creating.insert(key);
    }

    /// Ends the in-flight create; returns whether the row was edited meanwhile
    pub(crate) fn finish_create(&mut self, key: RowKey) -> bool {
        self.creating.remove(&key);
        self.resync.remove(&key)
    }

    pub(crate) fn is_creating(&self, key: RowKey) -> bool {
        self.creating.contains(&key)
    }

    pub(crate) fn request_resync(&mut self, key: RowKey) {
        self.resync.insert(key);
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>, kind: StatusKind, ttl: Duration) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            expires_at: Instant::now() + ttl,
        });
    }

    pub(crate) fn snapshot(&self) -> ChecklistSnapshot {
        let now = Instant::now();
        ChecklistSnapshot {
            rows: self.rows.clone(),
            pending: self.pending.clone(),
            connection: self.connection,
            status: self.status.clone().filter(|s| s.expires_at > now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> LocalItem {
        LocalItem {
            item: name.to_string(),
            category: "Feeding".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_keys_are_unique_across_rebuilds() {
        let mut state = ChecklistState::new(vec![named("a"), named("b")]);
        let first: Vec<RowKey> = state.snapshot().rows.iter().map(|r| r.key).collect();

        state.replace_items(vec![named("c")]);
        let second = state.snapshot().rows[0].key;

        assert_eq!(first, vec![1, 2]);
        assert_eq!(second, 3);
    }

    #[test]
    fn test_remove_clears_bookkeeping() {
        let mut state = ChecklistState::new(vec![named("a")]);
        state.mark_pending(1);
        state.begin_create(1);
        state.request_resync(1);

        assert!(state.remove(1).is_some());
        assert!(!state.is_pending(1));
        assert!(!state.is_creating(1));
        assert!(state.remove(1).is_none());
    }

    #[test]
    fn test_saved_rows_skip_headers_and_unsaved() {
        let mut saved = named("saved");
        saved.id = Some(4);
        let state = ChecklistState::new(vec![LocalItem::header("FEEDING"), saved, named("new")]);

        let rows = state.saved_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_message_expires() {
        let mut state = ChecklistState::new(Vec::new());
        state.set_status("Changes saved", StatusKind::Success, Duration::from_secs(3));
        assert_eq!(state.snapshot().status_text(), Some("Changes saved"));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(state.snapshot().status_text(), None);
    }
}
