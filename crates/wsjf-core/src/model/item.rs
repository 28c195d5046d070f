//! Backlog items, drafts and patches.

use serde::Serialize;
use serde_json::Value;

use super::category::{dedup_categories, Category, CategoryData};

/// Anything the score calculator can read.
pub trait Scorable {
    fn categories(&self) -> &[Category];
    fn effort(&self) -> f64;
    fn category_data(&self) -> &CategoryData;
}

/// A persisted prioritization candidate.
///
/// Serialized in the stored record shape (camelCase keys). Reading goes
/// through [`crate::normalize::normalize_record`] so older shapes load too.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier, immutable after creation
    pub id: String,
    pub name: String,
    pub description: String,
    /// Selected categories, duplicate-free, in selection order
    pub categories: Vec<Category>,
    /// Job size in time units
    pub effort: f64,
    /// Creation time in epoch milliseconds
    pub created_at: i64,
    /// Score cached at last save
    pub wsjf_score: f64,
    pub category_data: CategoryData,
}

impl Item {
    /// Apply a partial update. The caller is responsible for rescoring.
    pub fn apply(&mut self, patch: ItemPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(categories) = patch.categories {
            self.categories = dedup_categories(categories);
        }
        if let Some(effort) = patch.effort {
            self.effort = effort;
        }
        if let Some(data) = patch.category_data {
            self.category_data = data;
        }
    }
}

impl Scorable for Item {
    fn categories(&self) -> &[Category] {
        &self.categories
    }
    fn effort(&self) -> f64 {
        self.effort
    }
    fn category_data(&self) -> &CategoryData {
        &self.category_data
    }
}

/// User input for a new item: everything except id, creation time and score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub description: String,
    pub categories: Vec<Category>,
    pub effort: f64,
    pub category_data: CategoryData,
}

impl ItemDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Select a category. Selecting one twice has no effect.
    pub fn with_category(mut self, category: Category) -> Self {
        if !self.categories.contains(&category) {
            self.categories.push(category);
        }
        self
    }

    pub fn with_effort(mut self, effort: f64) -> Self {
        self.effort = effort;
        self
    }

    /// Set a category field by its stored key, coercing fail-soft.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.category_data.set_field(key, &value.into());
        self
    }
}

impl Scorable for ItemDraft {
    fn categories(&self) -> &[Category] {
        &self.categories
    }
    fn effort(&self) -> f64 {
        self.effort
    }
    fn category_data(&self) -> &CategoryData {
        &self.category_data
    }
}

/// Partial update for an existing item. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<Category>>,
    pub effort: Option<f64>,
    pub category_data: Option<CategoryData>,
}

impl From<ItemDraft> for ItemPatch {
    fn from(draft: ItemDraft) -> Self {
        Self {
            name: Some(draft.name),
            description: Some(draft.description),
            categories: Some(draft.categories),
            effort: Some(draft.effort),
            category_data: Some(draft.category_data),
        }
    }
}
