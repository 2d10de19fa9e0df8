//! Error Types
//!
//! `StoreError` is the only failure the record store client produces;
//! everything else is local to the mapper, form and controller.

use thiserror::Error;

use crate::models::RowKey;

/// Normalised record store failure (transport, non-2xx status or bad body)
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct StoreError {
    pub status: Option<u16>,
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { status: None, message: message.into() }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self { status: Some(status), message: message.into() }
    }

    pub fn is_bad_request(&self) -> bool {
        self.status == Some(400)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// The target record is gone on the remote side
    pub fn is_missing_record(&self) -> bool {
        self.is_bad_request() || self.is_not_found()
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Raised when a category banner row is handed to the mapper
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot transform category header {0:?} to a remote record")]
pub struct UnmappableHeaderError(pub String);

/// A rejected add-item form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join("; "))]
pub struct FormError(pub Vec<String>);

/// Controller-level failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutosaveError {
    #[error("Row {0} not found")]
    RowNotFound(RowKey),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{failed} of {total} updates failed")]
    BulkSave { failed: usize, total: usize },
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Unmappable(#[from] UnmappableHeaderError),
}

pub type AutosaveResult<T> = Result<T, AutosaveError>;
