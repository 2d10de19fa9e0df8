//! Baby Checklist Core
//!
//! Layered like the app it serves:
//! - models / transform: remote records, local rows and the mapping between them
//! - api: record store client (hosted and in-memory)
//! - reconcile / defaults: building the display list
//! - store / autosave: row state and debounced persistence
//! - form / config / error: input validation, environment selection, failures

pub mod api;
pub mod autosave;
pub mod config;
pub mod defaults;
pub mod error;
pub mod form;
pub mod models;
pub mod reconcile;
pub mod store;
pub mod transform;

pub use api::{HttpRecordStore, MemoryRecordStore, RecordStore};
pub use autosave::{AutosaveController, AutosaveSettings, SaveAction};
pub use config::{AppConfig, DataSource, Environment};
pub use error::{AutosaveError, FormError, StoreError, UnmappableHeaderError};
pub use models::{FieldEdit, LocalItem, RemoteItem, RowKey};
pub use reconcile::ReconcileStrategy;
pub use store::{ChecklistSnapshot, ConnectionState};
