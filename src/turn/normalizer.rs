//! Backend vocabulary -> client vocabulary.
//!
//! Every function here is total: bad input degrades to an opaque, lower-cased
//! and hyphenated string, never to an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use super::types::{SlotSet, Size, Temperature};

/// Slot fields exactly as the backend spells them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendSlots {
    pub menu_id: Option<String>,
    pub menu_name: Option<String>,
    pub temp: Option<String>,
    pub size: Option<String>,
    pub bean: Option<String>,
    pub add_ons: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuIdParts {
    pub category: Option<String>,
    pub item_id: String,
    /// True when the token had no `CATEGORY_` prefix.
    pub bare: bool,
}

pub fn normalize(raw: &BackendSlots) -> SlotSet {
    let mut slots = SlotSet::default();

    if let Some(menu_id) = non_empty(raw.menu_id.as_deref()) {
        let parts = split_menu_id(menu_id);
        slots.item_name = non_empty(raw.menu_name.as_deref()).map(str::to_string);
        if parts.bare && slots.item_name.is_none() {
            slots.item_name = Some(parts.item_id.clone());
        }
        slots.category = parts.category;
        slots.item_id = Some(parts.item_id);
    } else {
        slots.item_name = non_empty(raw.menu_name.as_deref()).map(str::to_string);
    }

    slots.temperature = non_empty(raw.temp.as_deref()).map(normalize_temperature);
    slots.size = non_empty(raw.size.as_deref()).map(normalize_size);
    slots.bean = non_empty(raw.bean.as_deref()).map(slug);
    if let Some(add_ons) = &raw.add_ons {
        slots.add_ons = normalize_add_ons(add_ons);
    }

    slots
}

pub fn normalize_temperature(raw: &str) -> Temperature {
    match slug(raw).as_str() {
        "ice" | "iced" | "cold" => Temperature::Cold,
        "hot" => Temperature::Hot,
        other => Temperature::Other(other.to_string()),
    }
}

pub fn normalize_size(raw: &str) -> Size {
    match slug(raw).as_str() {
        "tall" | "small" => Size::Small,
        "grande" | "medium" => Size::Medium,
        "venti" | "large" => Size::Large,
        other => Size::Other(other.to_string()),
    }
}

/// `COFFEE_CAFE_LATTE` -> category `coffee`, id `cafe-latte`. Splits on the first
/// underscore only; everything after it becomes the hyphenated item id.
pub fn split_menu_id(raw: &str) -> MenuIdParts {
    let trimmed = raw.trim();
    if let Some((head, rest)) = trimmed.split_once('_') {
        let item_id = slug(rest);
        if !item_id.is_empty() {
            let category = slug(head);
            return MenuIdParts {
                category: (!category.is_empty()).then_some(category),
                item_id,
                bare: false,
            };
        }
    }

    MenuIdParts {
        category: None,
        item_id: slug(trimmed),
        bare: true,
    }
}

/// Accepts a JSON array, a JSON-encoded array inside a string, or a single string.
pub fn normalize_add_ons(raw: &Value) -> BTreeSet<String> {
    match raw {
        Value::Array(values) => values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => non_empty(Some(s.as_str())).map(slug),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[') {
                if let Ok(parsed @ Value::Array(_)) = serde_json::from_str::<Value>(trimmed) {
                    return normalize_add_ons(&parsed);
                }
            }
            non_empty(Some(trimmed)).map(slug).into_iter().collect()
        }
        _ => BTreeSet::new(),
    }
}

/// Client vocabulary back to the backend's. `normalize(&denormalize(s))` returns
/// the canonical slots unchanged as long as the item carries a name or a category;
/// a bare id without a name comes back with the id as its name.
pub fn denormalize(slots: &SlotSet) -> BackendSlots {
    BackendSlots {
        menu_id: slots
            .item_id
            .as_deref()
            .map(|id| denormalize_menu_id(id, slots.category.as_deref())),
        menu_name: slots.item_name.clone(),
        temp: slots.temperature.as_ref().map(|t| denormalize_temperature(t).to_string()),
        size: slots.size.as_ref().map(|s| denormalize_size(s).to_string()),
        bean: slots.bean.clone(),
        add_ons: (!slots.add_ons.is_empty()).then(|| {
            Value::Array(slots.add_ons.iter().cloned().map(Value::String).collect())
        }),
    }
}

pub fn denormalize_temperature(temperature: &Temperature) -> &str {
    match temperature {
        Temperature::Hot => "hot",
        Temperature::Cold => "ice",
        Temperature::Other(raw) => raw.as_str(),
    }
}

pub fn denormalize_size(size: &Size) -> &str {
    match size {
        Size::Small => "tall",
        Size::Medium => "grande",
        Size::Large => "venti",
        Size::Other(raw) => raw.as_str(),
    }
}

/// Without a category the hyphens stay, so `split_menu_id` reads the token as
/// bare instead of taking the first word for a category.
pub fn denormalize_menu_id(item_id: &str, category: Option<&str>) -> String {
    match category {
        Some(category) if !category.is_empty() => format!(
            "{}_{}",
            category.to_uppercase(),
            item_id.to_uppercase().replace('-', "_")
        ),
        _ => item_id.to_uppercase(),
    }
}

fn slug(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
