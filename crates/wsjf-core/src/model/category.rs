//! Value categories and their typed inputs.
//!
//! Each category owns a small struct holding only the fields its value rule
//! reads. [`CategoryData`] keeps all four side by side so that inputs of a
//! category survive being deselected and reselected; only the selected
//! categories ever contribute to an item's value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::numeric::{parse_numeric_field, parse_ratio_field, ratio_factor};

/// Hourly rate used to price people-hours in the Reduce Cost rule.
pub const HOURLY_RATE: f64 = 25.0;

/// Economic-value category an item can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Avoid Cost")]
    AvoidCost,
    #[serde(rename = "Reduce Cost")]
    ReduceCost,
    #[serde(rename = "Protect Revenue")]
    ProtectRevenue,
    #[serde(rename = "Increase Revenue")]
    IncreaseRevenue,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::AvoidCost,
        Category::ReduceCost,
        Category::ProtectRevenue,
        Category::IncreaseRevenue,
    ];

    /// Display name, also the stored tag.
    pub fn label(&self) -> &'static str {
        match self {
            Category::AvoidCost => "Avoid Cost",
            Category::ReduceCost => "Reduce Cost",
            Category::ProtectRevenue => "Protect Revenue",
            Category::IncreaseRevenue => "Increase Revenue",
        }
    }

    /// Parse a tag leniently: `"Avoid Cost"`, `"AvoidCost"`, `"avoid-cost"`
    /// and `"avoid_cost"` all name the same category.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "avoidcost" => Some(Category::AvoidCost),
            "reducecost" => Some(Category::ReduceCost),
            "protectrevenue" => Some(Category::ProtectRevenue),
            "increaserevenue" => Some(Category::IncreaseRevenue),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse(s).ok_or_else(|| {
            format!(
                "unknown category '{s}' (expected one of: {})",
                Category::ALL.map(|c| c.label()).join(", ")
            )
        })
    }
}

/// Collect categories, dropping repeats but keeping first-seen order.
pub fn dedup_categories(categories: impl IntoIterator<Item = Category>) -> Vec<Category> {
    let mut out = Vec::new();
    for category in categories {
        if !out.contains(&category) {
            out.push(category);
        }
    }
    out
}

/// Inputs for the Avoid Cost rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvoidCostInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_avoided_total: Option<f64>,
    /// Probability the cost materializes, in percent. `None` means 100%.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_cost_occur: Option<String>,
}

impl AvoidCostInput {
    pub fn value(&self) -> f64 {
        self.cost_avoided_total.unwrap_or(0.0) * ratio_factor(self.risk)
    }
}

/// Inputs for the Reduce Cost rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReduceCostInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub people_now: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_now: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub people_future: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_future: Option<f64>,
}

impl ReduceCostInput {
    /// Current cost minus future cost. Negative when the change costs more.
    pub fn value(&self) -> f64 {
        let current = self.people_now.unwrap_or(0.0) * HOURLY_RATE * self.hours_now.unwrap_or(0.0);
        let future =
            self.people_future.unwrap_or(0.0) * HOURLY_RATE * self.hours_future.unwrap_or(0.0);
        current - future
    }
}

/// Inputs for the Protect Revenue rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectRevenueInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_revenue_protected: Option<f64>,
    /// Share of the revenue at stake, in percent. `None` means 100%.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_share: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_loss_occur: Option<String>,
}

impl ProtectRevenueInput {
    pub fn value(&self) -> f64 {
        self.total_revenue_protected.unwrap_or(0.0) * ratio_factor(self.market_share)
    }
}

/// Inputs for the Increase Revenue rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncreaseRevenueInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_now: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_now: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_future: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_future: Option<f64>,
}

impl IncreaseRevenueInput {
    /// Future revenue minus current revenue. Negative for a decline.
    pub fn value(&self) -> f64 {
        let current = self.revenue_now.unwrap_or(0.0) * self.sales_now.unwrap_or(0.0);
        let future = self.revenue_future.unwrap_or(0.0) * self.sales_future.unwrap_or(0.0);
        future - current
    }
}

/// Category inputs of one item, stored as a single flat map.
///
/// Keys that no category recognizes are kept in `extra` so a record written
/// by another version round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryData {
    #[serde(flatten)]
    pub avoid_cost: AvoidCostInput,
    #[serde(flatten)]
    pub reduce_cost: ReduceCostInput,
    #[serde(flatten)]
    pub protect_revenue: ProtectRevenueInput,
    #[serde(flatten)]
    pub increase_revenue: IncreaseRevenueInput,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Every key the category inputs understand, in display order.
pub const KNOWN_FIELDS: [&str; 14] = [
    "costAvoidedTotal",
    "risk",
    "timeCostOccur",
    "peopleNow",
    "hoursNow",
    "peopleFuture",
    "hoursFuture",
    "totalRevenueProtected",
    "marketShare",
    "timeToLossOccur",
    "revenueNow",
    "salesNow",
    "revenueFuture",
    "salesFuture",
];

impl CategoryData {
    /// Build from a raw field map, coercing every value fail-soft.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let mut data = Self::default();
        data.apply_fields(fields);
        data
    }

    /// Overwrite the fields present in `fields`. An empty string or null
    /// clears a field.
    pub fn apply_fields(&mut self, fields: &Map<String, Value>) {
        for (key, raw) in fields {
            self.set_field(key, raw);
        }
    }

    /// Set one field by its stored key.
    pub fn set_field(&mut self, key: &str, raw: &Value) {
        match key {
            "costAvoidedTotal" => self.avoid_cost.cost_avoided_total = amount(raw),
            "risk" => self.avoid_cost.risk = parse_ratio_field(Some(raw)),
            "timeCostOccur" => self.avoid_cost.time_cost_occur = text(raw),
            "peopleNow" => self.reduce_cost.people_now = amount(raw),
            "hoursNow" => self.reduce_cost.hours_now = amount(raw),
            "peopleFuture" => self.reduce_cost.people_future = amount(raw),
            "hoursFuture" => self.reduce_cost.hours_future = amount(raw),
            "totalRevenueProtected" => self.protect_revenue.total_revenue_protected = amount(raw),
            "marketShare" => self.protect_revenue.market_share = parse_ratio_field(Some(raw)),
            "timeToLossOccur" => self.protect_revenue.time_to_loss_occur = text(raw),
            "revenueNow" => self.increase_revenue.revenue_now = amount(raw),
            "salesNow" => self.increase_revenue.sales_now = amount(raw),
            "revenueFuture" => self.increase_revenue.revenue_future = amount(raw),
            "salesFuture" => self.increase_revenue.sales_future = amount(raw),
            _ => {
                self.extra.insert(key.to_string(), raw.clone());
            }
        }
    }

    /// Value contributed by `category` under its rule.
    pub fn contribution(&self, category: Category) -> f64 {
        match category {
            Category::AvoidCost => self.avoid_cost.value(),
            Category::ReduceCost => self.reduce_cost.value(),
            Category::ProtectRevenue => self.protect_revenue.value(),
            Category::IncreaseRevenue => self.increase_revenue.value(),
        }
    }

    /// Raw deadline text carried by `category`, if it has one.
    pub fn deadline_text(&self, category: Category) -> Option<&str> {
        match category {
            Category::AvoidCost => self.avoid_cost.time_cost_occur.as_deref(),
            Category::ProtectRevenue => self.protect_revenue.time_to_loss_occur.as_deref(),
            Category::ReduceCost | Category::IncreaseRevenue => None,
        }
    }
}

fn is_blank(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn amount(raw: &Value) -> Option<f64> {
    if is_blank(raw) {
        None
    } else {
        Some(parse_numeric_field(raw))
    }
}

fn text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
