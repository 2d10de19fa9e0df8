//! Add-Item Form
//!
//! Validation and normalisation for the "add new item" form.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::FormError;
use crate::models::{ItemStatus, LocalItem, Priority};

pub const NAME_REQUIRED: &str = "Item name is required";
pub const INVALID_COST: &str = "Estimated cost should be a valid number (e.g., $25.99 or 25.99)";

/// Form fields as typed by the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewItemDraft {
    pub item: String,
    pub category: String,
    pub priority: Priority,
    pub preferred_source: String,
    pub source_url: String,
    pub status: ItemStatus,
    pub estimated_cost: String,
    pub notes: String,
}

fn cost_pattern() -> &'static Regex {
    static COST: OnceLock<Regex> = OnceLock::new();
    COST.get_or_init(|| Regex::new(r"^\$?\d*\.?\d*$").expect("cost pattern is valid"))
}

impl NewItemDraft {
    /// Every problem with the draft, in form order
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.item.trim().is_empty() {
            errors.push(NAME_REQUIRED.to_string());
        }
        if !self.estimated_cost.is_empty() && !cost_pattern().is_match(&self.estimated_cost) {
            errors.push(INVALID_COST.to_string());
        }
        errors
    }

    /// Validate and turn into an unsaved row, prefixing a bare cost with "$"
    pub fn into_local(self) -> Result<LocalItem, FormError> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(FormError(errors));
        }
        let estimated_cost = format_cost_input(&self.estimated_cost);
        Ok(LocalItem {
            id: None,
            completed: false,
            item: self.item,
            priority: self.priority,
            preferred_source: self.preferred_source,
            source_url: self.source_url,
            status: self.status,
            estimated_cost,
            notes: self.notes,
            category: self.category,
        })
    }
}

fn format_cost_input(cost: &str) -> String {
    if !cost.trim().is_empty() && !cost.starts_with('$') {
        format!("${}", cost)
    } else {
        cost.to_string()
    }
}

/// Banner text for a user-created category; `None` for a blank name
pub fn category_banner(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(item: &str, cost: &str) -> NewItemDraft {
        NewItemDraft {
            item: item.to_string(),
            estimated_cost: cost.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_name_required() {
        assert_eq!(draft("   ", "").validate(), vec![NAME_REQUIRED]);
        assert!(draft("Wipes", "").validate().is_empty());
    }

    #[test]
    fn test_cost_format() {
        for ok in ["25.99", "$25.99", "$25", ".5", "$"] {
            assert!(draft("Wipes", ok).validate().is_empty(), "{}", ok);
        }
        for bad in ["abc", "25,99", "$$5", "1.2.3"] {
            assert_eq!(draft("Wipes", bad).validate(), vec![INVALID_COST], "{}", bad);
        }
    }

    #[test]
    fn test_all_errors_reported() {
        let err = draft("", "ten dollars").into_local().unwrap_err();
        assert_eq!(err, FormError(vec![NAME_REQUIRED.to_string(), INVALID_COST.to_string()]));
    }

    #[test]
    fn test_cost_gets_dollar_prefix() {
        let local = draft("Wipes", "12.50").into_local().unwrap();
        assert_eq!(local.estimated_cost, "$12.50");
        assert_eq!(local.id, None);

        let local = draft("Wipes", "$3").into_local().unwrap();
        assert_eq!(local.estimated_cost, "$3");

        let local = draft("Wipes", "").into_local().unwrap();
        assert_eq!(local.estimated_cost, "");
    }

    #[test]
    fn test_category_banner() {
        assert_eq!(category_banner("  nursery decor "), Some("NURSERY DECOR".to_string()));
        assert_eq!(category_banner("   "), None);
    }
}
