//! Field Mapper
//!
//! Pure conversion between remote records and local rows.
//!
//! The status mapping is not invertible: the remote store knows three states,
//! the local list five. `Researching` and `Found Option` both leave as
//! `pending` and come back as `Not Started`. `preferred_source` has no remote
//! counterpart and is always empty on import.

use crate::error::UnmappableHeaderError;
use crate::models::{
    CreateItemRequest, ItemStatus, LocalItem, Priority, RemoteItem, RemotePriority, RemoteStatus,
};

/// Name sent for rows that have none yet
pub const PLACEHOLDER_NAME: &str = "Unnamed Item";
/// Category sent for rows that have none
pub const FALLBACK_CATEGORY: &str = "Other";
/// Store user the checklist belongs to
pub const DEFAULT_USER: u32 = 1;

pub fn to_local(remote: &RemoteItem) -> LocalItem {
    LocalItem {
        id: Some(remote.id),
        completed: remote.status == RemoteStatus::Purchased,
        item: remote.name.clone(),
        priority: priority_to_local(remote.priority),
        preferred_source: String::new(),
        source_url: remote.source_url.clone(),
        status: status_to_local(remote.status),
        estimated_cost: format_cost(remote.cost),
        notes: remote.notes.clone(),
        category: remote.category.clone(),
    }
}

/// Map a row to a create payload for the default user
pub fn to_remote(local: &LocalItem) -> Result<CreateItemRequest, UnmappableHeaderError> {
    to_remote_for_user(local, DEFAULT_USER)
}

pub fn to_remote_for_user(
    local: &LocalItem,
    user: u32,
) -> Result<CreateItemRequest, UnmappableHeaderError> {
    if local.is_header() {
        return Err(UnmappableHeaderError(local.item.clone()));
    }

    let name = if local.item.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        local.item.clone()
    };
    let category = if local.category.is_empty() {
        FALLBACK_CATEGORY.to_string()
    } else {
        local.category.clone()
    };

    Ok(CreateItemRequest {
        user,
        name,
        description: local.notes.clone(),
        priority: priority_to_remote(local.priority),
        source_url: local.source_url.clone(),
        status: status_to_remote(local.status, local.completed),
        cost: parse_cost(&local.estimated_cost),
        notes: local.notes.clone(),
        category,
    })
}

fn priority_to_local(priority: RemotePriority) -> Priority {
    match priority {
        RemotePriority::Low => Priority::Low,
        RemotePriority::Medium => Priority::Medium,
        RemotePriority::High => Priority::High,
    }
}

/// Unset priority defaults to medium
fn priority_to_remote(priority: Priority) -> RemotePriority {
    match priority {
        Priority::High => RemotePriority::High,
        Priority::Low => RemotePriority::Low,
        Priority::Medium | Priority::Unset => RemotePriority::Medium,
    }
}

fn status_to_local(status: RemoteStatus) -> ItemStatus {
    match status {
        RemoteStatus::Pending => ItemStatus::NotStarted,
        RemoteStatus::Purchased => ItemStatus::Purchased,
        RemoteStatus::NotNeeded => ItemStatus::Received,
    }
}

/// A checked row is purchased whatever its status says
fn status_to_remote(status: ItemStatus, completed: bool) -> RemoteStatus {
    if completed || status == ItemStatus::Purchased {
        return RemoteStatus::Purchased;
    }
    match status {
        ItemStatus::Received => RemoteStatus::NotNeeded,
        ItemStatus::NotStarted
        | ItemStatus::Researching
        | ItemStatus::FoundOption
        | ItemStatus::Purchased
        | ItemStatus::Unset => RemoteStatus::Pending,
    }
}

/// Keep digits and dots, parse the rest; anything unparsable is 0
pub fn parse_cost(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    parse_float_prefix(&cleaned).unwrap_or(0.0)
}

/// Longest leading `digits[.digits]` run, so "1.2.3" reads as 1.2
fn parse_float_prefix(s: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        end = i + c.len_utf8();
    }
    let prefix = &s[..end];
    if prefix.chars().any(|c| c.is_ascii_digit()) {
        prefix.parse::<f64>().ok()
    } else {
        None
    }
}

/// "$<cost>" for non-zero costs, empty otherwise
pub fn format_cost(cost: f64) -> String {
    if cost == 0.0 || cost.is_nan() {
        String::new()
    } else {
        format!("${}", cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HEADER_CATEGORY;

    fn remote(status: RemoteStatus, cost: f64) -> RemoteItem {
        RemoteItem {
            id: 12,
            created_at: None,
            user: Some(1),
            name: "Stroller system".to_string(),
            description: String::new(),
            priority: RemotePriority::Low,
            source_url: "https://example.com/stroller".to_string(),
            status,
            cost,
            notes: "travel system".to_string(),
            category: "Transportation".to_string(),
        }
    }

    #[test]
    fn test_to_local_fields() {
        let local = to_local(&remote(RemoteStatus::Purchased, 129.99));
        assert_eq!(local.id, Some(12));
        assert!(local.completed);
        assert_eq!(local.item, "Stroller system");
        assert_eq!(local.priority, Priority::Low);
        assert_eq!(local.status, ItemStatus::Purchased);
        assert_eq!(local.estimated_cost, "$129.99");
        assert_eq!(local.preferred_source, "");
        assert_eq!(local.source_url, "https://example.com/stroller");
    }

    #[test]
    fn test_to_local_status_collapse() {
        assert_eq!(to_local(&remote(RemoteStatus::Pending, 0.0)).status, ItemStatus::NotStarted);
        assert_eq!(to_local(&remote(RemoteStatus::NotNeeded, 0.0)).status, ItemStatus::Received);
        assert_eq!(to_local(&remote(RemoteStatus::Pending, 0.0)).estimated_cost, "");
    }

    #[test]
    fn test_round_trip_keeps_cost_name_priority() {
        for cost in [0.0, 5.0, 25.99, 1234.5] {
            let original = remote(RemoteStatus::Pending, cost);
            let back = to_remote(&to_local(&original)).unwrap();
            assert_eq!(back.cost, original.cost);
            assert_eq!(back.name, original.name);
            assert_eq!(back.priority, original.priority);
        }
    }

    #[test]
    fn test_status_is_not_invertible() {
        for status in [ItemStatus::Researching, ItemStatus::FoundOption] {
            let local = LocalItem {
                item: "Bottles".to_string(),
                status,
                ..Default::default()
            };
            let sent = to_remote(&local).unwrap();
            assert_eq!(sent.status, RemoteStatus::Pending);

            let echoed = remote(sent.status, 0.0);
            assert_eq!(to_local(&echoed).status, ItemStatus::NotStarted);
        }
    }

    #[test]
    fn test_to_remote_status_rules() {
        let mut local = LocalItem {
            item: "Wipes".to_string(),
            status: ItemStatus::Received,
            ..Default::default()
        };
        assert_eq!(to_remote(&local).unwrap().status, RemoteStatus::NotNeeded);

        local.completed = true;
        assert_eq!(to_remote(&local).unwrap().status, RemoteStatus::Purchased);

        local.completed = false;
        local.status = ItemStatus::Unset;
        assert_eq!(to_remote(&local).unwrap().status, RemoteStatus::Pending);

        local.status = ItemStatus::Purchased;
        assert_eq!(to_remote(&local).unwrap().status, RemoteStatus::Purchased);
    }

    #[test]
    fn test_to_remote_defaults() {
        let sent = to_remote(&LocalItem::default()).unwrap();
        assert_eq!(sent.name, PLACEHOLDER_NAME);
        assert_eq!(sent.category, FALLBACK_CATEGORY);
        assert_eq!(sent.priority, RemotePriority::Medium);
        assert_eq!(sent.status, RemoteStatus::Pending);
        assert_eq!(sent.cost, 0.0);
        assert_eq!(sent.user, DEFAULT_USER);
    }

    #[test]
    fn test_notes_double_as_description() {
        let local = LocalItem {
            item: "Pump".to_string(),
            notes: "Check insurance".to_string(),
            ..Default::default()
        };
        let sent = to_remote_for_user(&local, 3).unwrap();
        assert_eq!(sent.description, "Check insurance");
        assert_eq!(sent.notes, "Check insurance");
        assert_eq!(sent.user, 3);
    }

    #[test]
    fn test_header_is_unmappable() {
        let header = LocalItem::header("FEEDING ESSENTIALS");
        assert_eq!(header.category, HEADER_CATEGORY);
        let err = to_remote(&header).unwrap_err();
        assert_eq!(err, UnmappableHeaderError("FEEDING ESSENTIALS".to_string()));
    }

    #[test]
    fn test_parse_cost() {
        assert_eq!(parse_cost("$25.99"), 25.99);
        assert_eq!(parse_cost("abc"), 0.0);
        assert_eq!(parse_cost(""), 0.0);
        assert_eq!(parse_cost("$1,299.50"), 1299.5);
        assert_eq!(parse_cost("about $40"), 40.0);
        assert_eq!(parse_cost("1.2.3"), 1.2);
        assert_eq!(parse_cost("."), 0.0);
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(25.99), "$25.99");
        assert_eq!(format_cost(40.0), "$40");
        assert_eq!(format_cost(0.0), "");
    }
}
