//! Migration of stored records into the current item shape.
//!
//! Records written by older versions differ from the current shape:
//! - v1 stored a single `category` string instead of a `categories` array.
//! - v1 stored effort per category (`estimation*` fields in the data bag)
//!   instead of a shared `effort`.
//! - v1 and v2 kept the data bag under `data` rather than `categoryData`.
//!   When both keys are present they are merged, `categoryData` winning.
//! - Some v1 records carry no `id`. One is derived from the record content
//!   and its position, so repeated reads agree until a write persists it.
//!
//! Normalization is fail-soft and idempotent: a current-shape record comes
//! back unchanged, and nothing here ever returns an error.

use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::model::{dedup_categories, Category, CategoryData, Item};
use crate::numeric::parse_numeric_field;

/// Legacy per-category effort fields, in the order they are consulted.
pub const LEGACY_EFFORT_FIELDS: [&str; 4] = [
    "estimationAvoidValue",
    "estimationValue",
    "estimationProtectValue",
    "estimationIncreaseValue",
];

/// Normalize one stored record.
///
/// Returns `None` only when the record is not a JSON object.
pub fn normalize_record(raw: &Value) -> Option<Item> {
    normalize_at(raw, None)
}

/// Normalize a whole stored collection, skipping entries that are not objects.
pub fn normalize_collection(raw: &[Value]) -> Vec<Item> {
    raw.iter()
        .enumerate()
        .filter_map(|(position, record)| normalize_at(record, Some(position)))
        .collect()
}

fn normalize_at(raw: &Value, position: Option<usize>) -> Option<Item> {
    let Some(record) = raw.as_object() else {
        warn!(record = %raw, "skipping stored record that is not an object");
        return None;
    };

    let data_bag = data_bag(record);

    let id = match record.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            let id = derived_id(raw, position);
            warn!(%id, "stored record had no id, derived one from its content");
            id
        }
    };

    let effort = match record.get("effort") {
        Some(raw) if !raw.is_null() => parse_numeric_field(raw),
        _ => legacy_effort(&data_bag),
    };

    Some(Item {
        id,
        name: text_field(record, "name"),
        description: text_field(record, "description"),
        categories: categories(record),
        effort,
        created_at: record.get("createdAt").map_or(0, |v| parse_numeric_field(v) as i64),
        wsjf_score: record.get("wsjfScore").map_or(0.0, parse_numeric_field),
        category_data: CategoryData::from_fields(&data_bag),
    })
}

fn data_bag(record: &Map<String, Value>) -> Map<String, Value> {
    let mut bag = record
        .get("data")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    if let Some(current) = record.get("categoryData").and_then(Value::as_object) {
        bag.extend(current.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    bag
}

/// Stable id for a record stored without one.
fn derived_id(raw: &Value, position: Option<usize>) -> String {
    let mut seed = raw.to_string();
    if let Some(position) = position {
        seed.push_str(&format!("#{position}"));
    }
    Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()).to_string()
}

fn text_field(record: &Map<String, Value>, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn categories(record: &Map<String, Value>) -> Vec<Category> {
    let tags: Vec<&Value> = match record.get("categories") {
        Some(Value::Array(tags)) => tags.iter().collect(),
        _ => record.get("category").into_iter().collect(),
    };

    dedup_categories(tags.into_iter().filter_map(|tag| {
        let parsed = tag.as_str().and_then(Category::parse);
        if parsed.is_none() && !tag.is_null() {
            warn!(%tag, "ignoring unknown category tag");
        }
        parsed
    }))
}

fn legacy_effort(data: &Map<String, Value>) -> f64 {
    LEGACY_EFFORT_FIELDS
        .iter()
        .filter_map(|key| data.get(*key))
        .map(parse_numeric_field)
        .find(|v| *v != 0.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn singular_category_becomes_list() {
        let item = normalize_record(&json!({
            "id": "1", "name": "Legacy", "category": "Avoid Cost", "effort": 2
        }))
        .unwrap();
        assert_eq!(item.categories, vec![Category::AvoidCost]);
    }

    #[test]
    fn categories_array_wins_over_singular() {
        let item = normalize_record(&json!({
            "id": "1",
            "categories": ["Reduce Cost"],
            "category": "Avoid Cost"
        }))
        .unwrap();
        assert_eq!(item.categories, vec![Category::ReduceCost]);
    }

    #[test]
    fn unknown_and_duplicate_tags_dropped() {
        let item = normalize_record(&json!({
            "id": "1",
            "categories": ["Avoid Cost", "Reduce Risk", 7, "Avoid Cost", "Increase Revenue"]
        }))
        .unwrap();
        assert_eq!(
            item.categories,
            vec![Category::AvoidCost, Category::IncreaseRevenue]
        );
    }

    #[test]
    fn effort_derived_from_first_nonzero_legacy_field() {
        let item = normalize_record(&json!({
            "id": "1",
            "data": {"estimationAvoidValue": 0, "estimationValue": "", "estimationProtectValue": 8}
        }))
        .unwrap();
        assert_eq!(item.effort, 8.0);
    }

    #[test]
    fn effort_defaults_to_zero() {
        let item = normalize_record(&json!({"id": "1"})).unwrap();
        assert_eq!(item.effort, 0.0);
    }

    #[test]
    fn present_effort_is_kept_over_legacy_fields() {
        let item = normalize_record(&json!({
            "id": "1", "effort": "3", "data": {"estimationValue": 9}
        }))
        .unwrap();
        assert_eq!(item.effort, 3.0);
    }

    #[test]
    fn legacy_data_key_is_read() {
        let item = normalize_record(&json!({
            "id": "1", "data": {"costAvoidedTotal": 500}
        }))
        .unwrap();
        assert_eq!(item.category_data.avoid_cost.cost_avoided_total, Some(500.0));
    }

    #[test]
    fn missing_id_is_derived_deterministically() {
        let raw = json!({"name": "no id"});
        let first = normalize_record(&raw).unwrap();
        assert!(!first.id.is_empty());
        assert_eq!(normalize_record(&raw).unwrap().id, first.id);
        assert_ne!(normalize_record(&json!({"name": "other"})).unwrap().id, first.id);
    }

    #[test]
    fn identical_id_less_records_get_distinct_ids() {
        let twin = json!({"name": "twin", "category": "Avoid Cost"});
        let items = normalize_collection(&[twin.clone(), twin.clone()]);
        assert_ne!(items[0].id, items[1].id);
        let again = normalize_collection(&[twin.clone(), twin]);
        assert_eq!(items, again);
    }

    #[test]
    fn legacy_data_merges_under_category_data() {
        let item = normalize_record(&json!({
            "id": "1",
            "effort": 1,
            "data": {"costAvoidedTotal": 500, "risk": 50, "notes": "old"},
            "categoryData": {"costAvoidedTotal": 900}
        }))
        .unwrap();
        let data = &item.category_data;
        assert_eq!(data.avoid_cost.cost_avoided_total, Some(900.0));
        assert!(data.avoid_cost.risk.is_some());
        assert_eq!(data.extra.get("notes"), Some(&json!("old")));
    }

    #[test]
    fn non_objects_are_skipped() {
        assert!(normalize_record(&json!("junk")).is_none());
        let items = normalize_collection(&[json!(1), json!({"id": "a"}), json!(null)]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
    }

    #[test]
    fn normalizing_twice_is_same_as_once() {
        let raw = json!({
            "id": "abc",
            "name": "Legacy",
            "description": "old shape",
            "category": "Protect Revenue",
            "createdAt": 1700000000000_i64,
            "wsjfScore": 12.5,
            "data": {
                "totalRevenueProtected": "1000",
                "marketShare": "",
                "timeToLossOccur": "2026-01-01",
                "estimationProtectValue": 4,
                "notes": "kept"
            }
        });
        let once = normalize_record(&raw).unwrap();
        let reserialized = serde_json::to_value(&once).unwrap();
        let twice = normalize_record(&reserialized).unwrap();
        assert_eq!(once, twice);
        assert_eq!(serde_json::to_value(&twice).unwrap(), reserialized);
        assert_eq!(once.effort, 4.0);
        assert_eq!(once.category_data.extra.get("notes"), Some(&json!("kept")));
    }
}
