//! Checklist Models
//!
//! Remote record schema (as the hosted store returns it) and the local,
//! editable row schema the controller owns.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Category value that marks a row as a category banner
pub const HEADER_CATEGORY: &str = "CATEGORY";

// ========================
// Remote schema
// ========================

/// Remote priority vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RemotePriority {
    Low,
    #[default]
    Medium,
    High,
}

impl RemotePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemotePriority::Low => "low",
            RemotePriority::Medium => "medium",
            RemotePriority::High => "high",
        }
    }
}

/// Remote status vocabulary (three states)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RemoteStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "purchased")]
    Purchased,
    #[serde(rename = "not needed")]
    NotNeeded,
}

impl RemoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteStatus::Pending => "pending",
            RemoteStatus::Purchased => "purchased",
            RemoteStatus::NotNeeded => "not needed",
        }
    }
}

/// A shopping item record as stored remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: u32,
    #[serde(default, deserialize_with = "deserialize_created_at")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: RemotePriority,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source_url: String,
    #[serde(default)]
    pub status: RemoteStatus,
    #[serde(default)]
    pub cost: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
}

/// Body of a create request (no id, no created_at)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub user: u32,
    pub name: String,
    pub description: String,
    pub priority: RemotePriority,
    pub source_url: String,
    pub status: RemoteStatus,
    pub cost: f64,
    pub notes: String,
    pub category: String,
}

/// Body of an update request; any subset of the mutable fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<RemotePriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RemoteStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl From<CreateItemRequest> for UpdateItemRequest {
    fn from(req: CreateItemRequest) -> Self {
        Self {
            user: Some(req.user),
            name: Some(req.name),
            description: Some(req.description),
            priority: Some(req.priority),
            source_url: Some(req.source_url),
            status: Some(req.status),
            cost: Some(req.cost),
            notes: Some(req.notes),
            category: Some(req.category),
        }
    }
}

/// The store has been seen returning both epoch milliseconds and RFC 3339 strings
fn deserialize_created_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Millis(ms)) => Ok(Utc.timestamp_millis_opt(ms).single()),
        Some(Raw::Text(s)) => Ok(DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ========================
// Local schema
// ========================

/// Local priority vocabulary; `Unset` is the empty selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Priority {
    High,
    Medium,
    Low,
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Unset => "",
        }
    }

    /// Parse a UI label; anything unrecognised is treated as unset
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Unset,
        }
    }
}

/// Local status vocabulary (five states plus unset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ItemStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    Researching,
    #[serde(rename = "Found Option")]
    FoundOption,
    Purchased,
    Received,
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "Not Started",
            ItemStatus::Researching => "Researching",
            ItemStatus::FoundOption => "Found Option",
            ItemStatus::Purchased => "Purchased",
            ItemStatus::Received => "Received",
            ItemStatus::Unset => "",
        }
    }

    /// Parse a UI label; anything unrecognised is treated as unset
    pub fn from_label(s: &str) -> Self {
        match s.trim() {
            "Not Started" => ItemStatus::NotStarted,
            "Researching" => ItemStatus::Researching,
            "Found Option" => ItemStatus::FoundOption,
            "Purchased" => ItemStatus::Purchased,
            "Received" => ItemStatus::Received,
            _ => ItemStatus::Unset,
        }
    }
}

/// An editable checklist row
///
/// A row whose `category` is [`HEADER_CATEGORY`] is a category banner; its
/// `item` holds the banner text and it is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub completed: bool,
    pub item: String,
    pub priority: Priority,
    pub preferred_source: String,
    pub source_url: String,
    pub status: ItemStatus,
    pub estimated_cost: String,
    pub notes: String,
    pub category: String,
}

impl LocalItem {
    /// Create a category banner row
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            item: text.into(),
            category: HEADER_CATEGORY.to_string(),
            ..Default::default()
        }
    }

    /// Create an empty template row under a category
    pub fn blank(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn is_header(&self) -> bool {
        self.category == HEADER_CATEGORY
    }

    pub fn has_name(&self) -> bool {
        !self.item.is_empty()
    }
}

// ========================
// Rows and edits
// ========================

/// Session-local row identity, stable across reorders and id assignment
pub type RowKey = u64;

/// A row of the display list
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: RowKey,
    pub item: LocalItem,
}

/// A single field edit coming from the UI
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Completed(bool),
    Item(String),
    Priority(Priority),
    PreferredSource(String),
    SourceUrl(String),
    Status(ItemStatus),
    EstimatedCost(String),
    Notes(String),
    Category(String),
}

impl FieldEdit {
    pub fn apply(self, item: &mut LocalItem) {
        match self {
            FieldEdit::Completed(v) => item.completed = v,
            FieldEdit::Item(v) => item.item = v,
            FieldEdit::Priority(v) => item.priority = v,
            FieldEdit::PreferredSource(v) => item.preferred_source = v,
            FieldEdit::SourceUrl(v) => item.source_url = v,
            FieldEdit::Status(v) => item.status = v,
            FieldEdit::EstimatedCost(v) => item.estimated_cost = v,
            FieldEdit::Notes(v) => item.notes = v,
            FieldEdit::Category(v) => item.category = v,
        }
    }
}
