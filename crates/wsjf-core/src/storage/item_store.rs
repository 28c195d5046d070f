//! Backlog persistence.
//!
//! The whole collection lives in one JSON array under a namespace key.
//! Every mutation reads the full collection, applies the change and writes
//! the full collection back. Storage order is insertion order; priority
//! order is computed at presentation time by [`crate::priority`].

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::database::Database;
use crate::error::{Result, ValidationError};
use crate::model::{dedup_categories, Item, ItemDraft, ItemPatch};
use crate::normalize::normalize_collection;
use crate::scoring;

/// Namespace key used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "wsjf_items_db";

/// Handle to one backlog collection inside a [`Database`].
pub struct ItemStore<'db> {
    db: &'db Database,
    namespace: String,
}

impl<'db> ItemStore<'db> {
    /// Store using the default namespace.
    pub fn new(db: &'db Database) -> Self {
        Self::with_namespace(db, DEFAULT_NAMESPACE)
    }

    /// Store using an explicit namespace. Stores with different namespaces
    /// in the same database do not see each other's items.
    pub fn with_namespace(db: &'db Database, namespace: impl Into<String>) -> Self {
        Self {
            db,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// All items, normalized, in storage order.
    ///
    /// A stored document that cannot be parsed yields an empty collection.
    ///
    /// # Errors
    /// Returns an error only if the database cannot be read.
    pub fn get_all(&self) -> Result<Vec<Item>> {
        let Some(raw) = self.db.kv_get(&self.namespace)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(records)) => Ok(normalize_collection(&records)),
            Ok(other) => {
                warn!(namespace = %self.namespace, kind = json_kind(&other), "stored collection is not an array, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => {
                warn!(namespace = %self.namespace, error = %e, "failed to parse stored collection, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Look up one item by id.
    ///
    /// # Errors
    /// Returns an error if the database cannot be read.
    pub fn get(&self, id: &str) -> Result<Option<Item>> {
        Ok(self.get_all()?.into_iter().find(|item| item.id == id))
    }

    /// Create an item from a draft: assigns id and creation time and
    /// computes the score.
    ///
    /// # Errors
    /// Returns a validation error if the name is blank, or an error if the
    /// database cannot be read or written.
    pub fn add(&self, draft: ItemDraft) -> Result<Item> {
        if draft.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name".into()).into());
        }

        let mut items = self.get_all()?;
        let latest = items.iter().map(|item| item.created_at).max();
        let now = Utc::now().timestamp_millis();
        let created_at = match latest {
            Some(latest) if latest >= now => latest + 1,
            _ => now,
        };

        let wsjf_score = scoring::compute(&draft);
        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            description: draft.description,
            categories: dedup_categories(draft.categories),
            effort: draft.effort,
            created_at,
            wsjf_score,
            category_data: draft.category_data,
        };

        items.push(item.clone());
        self.write_all(&items)?;
        debug!(id = %item.id, score = item.wsjf_score, "item added");
        Ok(item)
    }

    /// Apply a partial update and recompute the score. Unknown ids are a
    /// no-op.
    ///
    /// # Errors
    /// Returns a validation error if the patch blanks the name, or an error
    /// if the database cannot be read or written.
    pub fn update(&self, id: &str, patch: ItemPatch) -> Result<()> {
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ValidationError::EmptyField("name".into()).into());
        }

        let mut items = self.get_all()?;
        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            debug!(%id, "update of unknown item ignored");
            return Ok(());
        };

        item.apply(patch);
        item.wsjf_score = scoring::compute(&*item);
        debug!(%id, score = item.wsjf_score, "item updated");

        self.write_all(&items)
    }

    /// Remove an item. Unknown ids are a no-op.
    ///
    /// # Errors
    /// Returns an error if the database cannot be read or written.
    pub fn delete(&self, id: &str) -> Result<()> {
        let items = self.get_all()?;
        let before = items.len();
        let remaining: Vec<Item> = items.into_iter().filter(|item| item.id != id).collect();
        if remaining.len() == before {
            debug!(%id, "delete of unknown item ignored");
            return Ok(());
        }
        self.write_all(&remaining)?;
        debug!(%id, "item deleted");
        Ok(())
    }

    fn write_all(&self, items: &[Item]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.db.kv_set(&self.namespace, &raw)?;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::model::Category;

    fn draft(name: &str) -> ItemDraft {
        ItemDraft::new(name)
            .with_category(Category::AvoidCost)
            .with_field("costAvoidedTotal", 1_000)
            .with_effort(4.0)
    }

    #[test]
    fn empty_store_returns_nothing() {
        let db = Database::open_memory().unwrap();
        assert!(ItemStore::new(&db).get_all().unwrap().is_empty());
    }

    #[test]
    fn add_assigns_id_created_at_and_score() {
        let db = Database::open_memory().unwrap();
        let store = ItemStore::new(&db);
        let item = store.add(draft("First")).unwrap();
        assert!(!item.id.is_empty());
        assert!(item.created_at > 0);
        assert_eq!(item.wsjf_score, 250.0);
        assert_eq!(store.get_all().unwrap(), vec![item]);
    }

    #[test]
    fn add_rejects_blank_name() {
        let db = Database::open_memory().unwrap();
        let err = ItemStore::new(&db).add(draft("   ")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::EmptyField(_))));
    }

    #[test]
    fn created_at_strictly_increases() {
        let db = Database::open_memory().unwrap();
        let store = ItemStore::new(&db);
        let a = store.add(draft("a")).unwrap();
        let b = store.add(draft("b")).unwrap();
        let c = store.add(draft("c")).unwrap();
        assert!(a.created_at < b.created_at);
        assert!(b.created_at < c.created_at);
    }

    #[test]
    fn update_recomputes_score_and_keeps_identity() {
        let db = Database::open_memory().unwrap();
        let store = ItemStore::new(&db);
        let item = store.add(draft("a")).unwrap();

        store
            .update(
                &item.id,
                ItemPatch {
                    effort: Some(2.0),
                    ..Default::default()
                },
            )
            .unwrap();

        let updated = store.get(&item.id).unwrap().unwrap();
        assert_eq!(updated.wsjf_score, 500.0);
        assert_eq!(updated.id, item.id);
        assert_eq!(updated.created_at, item.created_at);
    }

    #[test]
    fn update_and_delete_unknown_id_are_noops() {
        let db = Database::open_memory().unwrap();
        let store = ItemStore::new(&db);
        let item = store.add(draft("a")).unwrap();
        store.update("missing", ItemPatch::default()).unwrap();
        store.delete("missing").unwrap();
        assert_eq!(store.get_all().unwrap(), vec![item]);
    }

    #[test]
    fn delete_removes_item() {
        let db = Database::open_memory().unwrap();
        let store = ItemStore::new(&db);
        let a = store.add(draft("a")).unwrap();
        let b = store.add(draft("b")).unwrap();
        store.delete(&a.id).unwrap();
        assert_eq!(store.get_all().unwrap(), vec![b]);
    }

    #[test]
    fn id_less_records_keep_their_id_across_reads() {
        let db = Database::open_memory().unwrap();
        db.kv_set(
            DEFAULT_NAMESPACE,
            r#"[{"name":"legacy","category":"Avoid Cost","effort":1},
                {"name":"kept","category":"Reduce Cost","effort":1}]"#,
        )
        .unwrap();
        let store = ItemStore::new(&db);

        let first = store.get_all().unwrap();
        let second = store.get_all().unwrap();
        assert_eq!(first[0].id, second[0].id);

        store.delete(&first[0].id).unwrap();
        let remaining = store.get_all().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "kept");
        assert_eq!(remaining[0].id, first[1].id);
    }

    #[test]
    fn corrupt_document_reads_as_empty() {
        let db = Database::open_memory().unwrap();
        db.kv_set(DEFAULT_NAMESPACE, "{not json").unwrap();
        assert!(ItemStore::new(&db).get_all().unwrap().is_empty());

        db.kv_set(DEFAULT_NAMESPACE, r#"{"id": "x"}"#).unwrap();
        assert!(ItemStore::new(&db).get_all().unwrap().is_empty());
    }

    #[test]
    fn namespaces_are_isolated() {
        let db = Database::open_memory().unwrap();
        let left = ItemStore::with_namespace(&db, "left");
        let right = ItemStore::with_namespace(&db, "right");
        assert_eq!(left.namespace(), "left");
        assert_eq!(ItemStore::new(&db).namespace(), DEFAULT_NAMESPACE);
        left.add(draft("only left")).unwrap();
        assert_eq!(left.get_all().unwrap().len(), 1);
        assert!(right.get_all().unwrap().is_empty());
    }
}
