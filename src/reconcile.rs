//! Reconciliation Engine
//!
//! Rebuilds the flat display list (banner rows interleaved with item rows)
//! from the records fetched from the store. Two strategies:
//! - `HeaderMatched`: fixed banner order from templates, leftovers under "OTHER ITEMS"
//! - `Grouped`: one banner per distinct category, in first-seen order
//!
//! Banner rows never carry an id.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::defaults;
use crate::models::LocalItem;
use crate::transform::FALLBACK_CATEGORY;

pub const OTHER_ITEMS_HEADER: &str = "OTHER ITEMS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileStrategy {
    /// Banner order fixed by the templates, independent of the data
    HeaderMatched { templates: Vec<String> },
    /// Banners derived from the categories present in the data
    Grouped,
}

impl Default for ReconcileStrategy {
    fn default() -> Self {
        ReconcileStrategy::Grouped
    }
}

impl ReconcileStrategy {
    /// Header matching against the built-in banner templates
    pub fn with_default_headers() -> Self {
        ReconcileStrategy::HeaderMatched {
            templates: defaults::header_templates(),
        }
    }
}

pub fn reconcile(strategy: &ReconcileStrategy, items: Vec<LocalItem>) -> Vec<LocalItem> {
    match strategy {
        ReconcileStrategy::HeaderMatched { templates } => merge_with_headers(templates, items),
        ReconcileStrategy::Grouped => group_by_category(items),
    }
}

fn suffix_pattern() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| {
        Regex::new(r"(?i)\s+(ESSENTIALS|STATION|BASICS|& CARE|AROUND|PARENTS)$")
            .expect("header suffix pattern is valid")
    })
}

/// Category a banner stands for: title-cased text minus a known suffix
///
/// Only the six listed suffixes are stripped, so "DIAPER STATION" yields
/// "Diaper" and "FOR PARENTS" yields "For"; items in "Diapers" or "Parents"
/// therefore end up under "OTHER ITEMS".
pub fn header_category_name(header: &str) -> String {
    let title = header
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ");
    suffix_pattern().replace(&title, "").into_owned()
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Emit every template banner followed by the items whose category equals its
/// derived name, in store order; unmatched items go under one trailing
/// "OTHER ITEMS" banner.
pub fn merge_with_headers(templates: &[String], items: Vec<LocalItem>) -> Vec<LocalItem> {
    let items: Vec<LocalItem> = items.into_iter().filter(|i| !i.is_header()).collect();
    let names: Vec<String> = templates.iter().map(|t| header_category_name(t)).collect();

    let mut display = Vec::with_capacity(items.len() + templates.len() + 1);
    for (template, name) in templates.iter().zip(&names) {
        display.push(LocalItem::header(template.clone()));
        display.extend(items.iter().filter(|i| &i.category == name).cloned());
    }

    let unmatched: Vec<LocalItem> = items
        .into_iter()
        .filter(|i| !names.contains(&i.category))
        .collect();
    if !unmatched.is_empty() {
        display.push(LocalItem::header(OTHER_ITEMS_HEADER));
        display.extend(unmatched);
    }
    display
}

/// One banner per distinct category, in the order categories first appear.
/// Items without a category are grouped under "Other".
pub fn group_by_category(items: Vec<LocalItem>) -> Vec<LocalItem> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<LocalItem>> = HashMap::new();

    for item in items.into_iter().filter(|i| !i.is_header()) {
        let key = if item.category.trim().is_empty() {
            FALLBACK_CATEGORY.to_string()
        } else {
            item.category.clone()
        };
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(item);
    }

    let mut display = Vec::new();
    for category in order {
        display.push(LocalItem::header(category.to_uppercase()));
        if let Some(group) = groups.remove(&category) {
            display.extend(group);
        }
    }
    display
}
