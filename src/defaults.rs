//! Built-in Checklist Data
//!
//! Shown when the store is unreachable or empty, plus the option lists the
//! editing UI offers.

use crate::models::{ItemStatus, LocalItem, Priority};

pub const SOURCE_OPTIONS: &[&str] = &[
    "FB Marketplace",
    "Amazon",
    "Target",
    "Buy Buy Baby",
    "Costco/Sams",
    "CVS/Walgreens",
    "Insurance",
    "Grocery Store",
    "Local Store",
];

pub const STATUS_OPTIONS: &[ItemStatus] = &[
    ItemStatus::NotStarted,
    ItemStatus::Researching,
    ItemStatus::FoundOption,
    ItemStatus::Purchased,
    ItemStatus::Received,
];

pub const PRIORITY_OPTIONS: &[Priority] = &[Priority::High, Priority::Medium, Priority::Low];

pub const CATEGORY_OPTIONS: &[&str] = &[
    "Sleep & Safety",
    "Feeding",
    "Diapers",
    "Clothing",
    "Bath & Care",
    "Transportation",
    "Parents",
    "Other",
];

/// Banner text of the fixed category headers, in display order
pub const HEADER_TEMPLATES: &[&str] = &[
    "SLEEP & SAFETY",
    "FEEDING ESSENTIALS",
    "DIAPER STATION",
    "CLOTHING BASICS",
    "BATH & CARE",
    "GETTING AROUND",
    "FOR PARENTS",
];

pub fn header_templates() -> Vec<String> {
    HEADER_TEMPLATES.iter().map(|h| h.to_string()).collect()
}

fn seed(item: &str, priority: Priority, source: &str, notes: &str, category: &str) -> LocalItem {
    LocalItem {
        id: None,
        completed: false,
        item: item.to_string(),
        priority,
        preferred_source: source.to_string(),
        source_url: String::new(),
        status: ItemStatus::NotStarted,
        estimated_cost: String::new(),
        notes: notes.to_string(),
        category: category.to_string(),
    }
}

/// The starter checklist: headers interleaved with their items, nothing persisted
pub fn default_items() -> Vec<LocalItem> {
    vec![
        LocalItem::header("SLEEP & SAFETY"),
        seed("Crib with firm mattress", Priority::High, "FB Marketplace", "Brand, model, condition...", "Sleep & Safety"),
        seed("Fitted crib sheets (2-3)", Priority::High, "Amazon", "Organic cotton preferred", "Sleep & Safety"),
        seed("Bassinet or bedside sleeper", Priority::Medium, "FB Marketplace", "For first few months", "Sleep & Safety"),
        seed("Sleep sacks/swaddles (NB & 0-3m)", Priority::High, "Amazon", "Halo, Love to Dream, etc.", "Sleep & Safety"),
        seed("Baby monitor", Priority::Medium, "Amazon", "Audio vs video preference", "Sleep & Safety"),
        LocalItem::header("FEEDING ESSENTIALS"),
        seed("Nursing pillow", Priority::High, "Amazon", "Boppy, My Brest Friend", "Feeding"),
        seed("Breast pump", Priority::High, "Insurance", "Check insurance coverage first", "Feeding"),
        seed("Milk storage bags/containers", Priority::Medium, "Amazon", "Can wait until after birth", "Feeding"),
        seed("Nipple cream", Priority::High, "Amazon", "Lanolin or other recommendations", "Feeding"),
        seed("Bottles & nipples", Priority::Medium, "Amazon", "Dr. Browns, Philips Avent, etc.", "Feeding"),
        seed("Formula (if needed)", Priority::Low, "Target", "Have some on hand just in case", "Feeding"),
        seed("Burp cloths (6-8)", Priority::High, "Amazon", "You will use these constantly", "Feeding"),
        LocalItem::header("DIAPER STATION"),
        seed("Newborn diapers", Priority::High, "Costco/Sams", "Dont over-buy - babies grow fast", "Diapers"),
        seed("Size 1 diapers", Priority::High, "Costco/Sams", "Stock up on these", "Diapers"),
        seed("Baby wipes", Priority::High, "Costco/Sams", "Sensitive/fragrance-free preferred", "Diapers"),
        seed("Diaper cream", Priority::High, "Amazon", "Desitin, A&D, or similar", "Diapers"),
        seed("Changing pad", Priority::Medium, "Amazon", "Portable or for nursery", "Diapers"),
        LocalItem::header("CLOTHING BASICS"),
        seed("Onesies NB & 0-3m (6-8 each)", Priority::High, "FB Marketplace", "Mix of snaps and pull-over", "Clothing"),
        seed("Sleepers NB & 0-3m (4-6 each)", Priority::High, "FB Marketplace", "Zippered preferred over snaps", "Clothing"),
        seed("Going-home outfit", Priority::Medium, "Target", "Have NB and 0-3m ready", "Clothing"),
        seed("Socks & mittens (lots!)", Priority::Medium, "Target", "They fall off constantly", "Clothing"),
        LocalItem::header("BATH & CARE"),
        seed("Baby bathtub", Priority::Medium, "FB Marketplace", "Can wait a few weeks", "Bath & Care"),
        seed("Baby soap & shampoo", Priority::Medium, "Target", "Gentle, tear-free formula", "Bath & Care"),
        seed("Baby towels & washcloths", Priority::Medium, "Target", "Soft, hooded towels preferred", "Bath & Care"),
        seed("Baby nail clippers", Priority::Low, "Amazon", "Safety scissors or files", "Bath & Care"),
        LocalItem::header("GETTING AROUND"),
        seed("Car seat (infant)", Priority::High, "FB Marketplace", "MUST HAVE to leave hospital", "Transportation"),
        seed("Stroller system", Priority::Medium, "FB Marketplace", "Travel system with car seat compatibility", "Transportation"),
        seed("Baby carrier/wrap", Priority::Low, "Amazon", "Ergobaby, Baby Björn, wraps", "Transportation"),
        LocalItem::header("FOR PARENTS"),
        seed("Comfortable nursing clothes", Priority::Medium, "Amazon", "For mom - nursing tops, robes", "Parents"),
        seed("Easy snacks & freezer meals", Priority::High, "Grocery Store", "Stock up before due date", "Parents"),
        seed("Basic first aid supplies", Priority::Low, "CVS/Walgreens", "Baby thermometer, infant Tylenol", "Parents"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_templates() {
        let items = default_items();
        let headers: Vec<&str> = items
            .iter()
            .filter(|i| i.is_header())
            .map(|i| i.item.as_str())
            .collect();
        assert_eq!(headers, HEADER_TEMPLATES);
        assert!(items.iter().all(|i| i.id.is_none()));
        assert_eq!(items.iter().filter(|i| !i.is_header()).count(), 31);
    }

    #[test]
    fn test_default_categories_are_offered() {
        for item in default_items().iter().filter(|i| !i.is_header()) {
            assert!(CATEGORY_OPTIONS.contains(&item.category.as_str()), "{}", item.category);
        }
    }
}
