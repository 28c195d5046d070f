//! Backlog item commands for CLI.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use wsjf_core::model::dedup_categories;
use wsjf_core::numeric::parse_numeric_str;
use wsjf_core::priority::{deadline_info, DeadlineStatus};
use wsjf_core::{
    scoring, Category, CategoryData, Config, Item, ItemDraft, ItemPatch, ItemStore,
    PriorityOrderer,
};

use super::fields::{parse_category, CategoryFieldArgs};
use super::open_database;

#[derive(Subcommand)]
pub enum ItemAction {
    /// Create a new item
    Add {
        /// Item name
        name: String,
        /// Item description
        #[arg(long, default_value = "")]
        description: String,
        /// Value category (repeatable): avoid-cost, reduce-cost, protect-revenue, increase-revenue
        #[arg(long = "category", value_parser = parse_category)]
        categories: Vec<Category>,
        /// Effort (job size)
        #[arg(long, default_value = "1")]
        effort: String,
        #[command(flatten)]
        fields: CategoryFieldArgs,
    },
    /// List items in priority order
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show one item with its score breakdown
    Show {
        /// Item ID
        id: String,
    },
    /// Update an item and recompute its score
    Update {
        /// Item ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// Replace categories (repeatable)
        #[arg(long = "category", value_parser = parse_category)]
        categories: Vec<Category>,
        /// Deselect all categories
        #[arg(long, conflicts_with = "categories")]
        clear_categories: bool,
        /// New effort
        #[arg(long)]
        effort: Option<String>,
        #[command(flatten)]
        fields: CategoryFieldArgs,
    },
    /// Delete an item
    Delete {
        /// Item ID
        id: String,
    },
}

pub fn run(action: ItemAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = open_database(&config)?;
    let store = ItemStore::with_namespace(&db, config.storage.namespace.clone());

    match action {
        ItemAction::Add {
            name,
            description,
            categories,
            effort,
            fields,
        } => {
            let draft = ItemDraft {
                name,
                description,
                categories: dedup_categories(categories),
                effort: parse_numeric_str(&effort),
                category_data: CategoryData::from_fields(&fields.to_fields()),
            };
            let item = store.add(draft)?;
            println!("Item created: {}", item.id);
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        ItemAction::List { json } => {
            let orderer = PriorityOrderer::new();
            let items = orderer.order(&store.get_all()?);
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                print!("{}", render_list(&items, &orderer, &config));
            }
        }
        ItemAction::Show { id } => {
            let item = store.get(&id)?.ok_or(format!("Item not found: {id}"))?;
            println!("{}", serde_json::to_string_pretty(&item)?);
            println!("{}", serde_json::to_string_pretty(&scoring::breakdown(&item))?);
        }
        ItemAction::Update {
            id,
            name,
            description,
            categories,
            clear_categories,
            effort,
            fields,
        } => {
            let item = store.get(&id)?.ok_or(format!("Item not found: {id}"))?;

            let raw_fields = fields.to_fields();
            let category_data = if raw_fields.is_empty() {
                None
            } else {
                let mut data = item.category_data.clone();
                data.apply_fields(&raw_fields);
                Some(data)
            };
            let categories = if clear_categories {
                Some(Vec::new())
            } else if categories.is_empty() {
                None
            } else {
                Some(categories)
            };

            store.update(
                &id,
                ItemPatch {
                    name,
                    description,
                    categories,
                    effort: effort.as_deref().map(parse_numeric_str),
                    category_data,
                },
            )?;

            let updated = store.get(&id)?.ok_or(format!("Item not found: {id}"))?;
            println!("Item updated:");
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        ItemAction::Delete { id } => {
            store.delete(&id)?;
            println!("Item deleted: {id}");
        }
    }
    Ok(())
}

/// Render items, already in priority order, as a text list.
fn render_list(items: &[Item], orderer: &PriorityOrderer, config: &Config) -> String {
    if items.is_empty() {
        return "No items yet. Create one with `wsjf item add <name>`.\n".to_string();
    }

    let date_format = config.display.date_format.as_str();
    let mut out = format!(
        "{} {}\n",
        items.len(),
        if items.len() == 1 { "item" } else { "items" }
    );

    for (rank, item) in items.iter().enumerate() {
        let info = deadline_info(item, orderer.now());
        let urgent = info.is_some_and(|i| i.urgent);

        out.push_str(&format!(
            "{:>3}. {}{}  WSJF {:.2}\n",
            rank + 1,
            if urgent { "[URGENT] " } else { "" },
            item.name,
            item.wsjf_score
        ));

        let categories = if item.categories.is_empty() {
            "No categories".to_string()
        } else {
            item.categories
                .iter()
                .map(Category::label)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let created = DateTime::from_timestamp_millis(item.created_at)
            .map(|dt| format_date(dt, date_format))
            .unwrap_or_else(|| "-".to_string());
        let mut meta = format!(
            "     {} | {} | effort {} | created {}",
            item.id, categories, item.effort, created
        );
        if let Some(info) = info {
            let due = match info.status {
                DeadlineStatus::Overdue(days) => format!("Overdue by {days} days"),
                DeadlineStatus::DueToday => "Due Today".to_string(),
                DeadlineStatus::DueIn(days) => format!("Due in {days} days"),
            };
            meta.push_str(&format!(" | {due} ({})", format_date(info.deadline, date_format)));
        }
        out.push_str(&meta);
        out.push('\n');

        if config.display.show_description && !item.description.is_empty() {
            out.push_str(&format!("     {}\n", item.description));
        }
    }
    out
}

/// Format with the configured pattern, falling back to ISO dates if it is unusable.
fn format_date(dt: DateTime<Utc>, date_format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", dt.format(date_format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", dt.format(FALLBACK_DATE_FORMAT));
    }
    out
}

const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn item(name: &str, score: f64) -> Item {
        Item {
            id: format!("id-{name}"),
            name: name.into(),
            description: format!("{name} description"),
            categories: vec![Category::ReduceCost],
            effort: 2.0,
            created_at: 1_767_225_600_000,
            wsjf_score: score,
            category_data: CategoryData::default(),
        }
    }

    #[test]
    fn empty_list_message() {
        let out = render_list(&[], &PriorityOrderer::new(), &Config::default());
        assert!(out.contains("No items yet"));
    }

    #[test]
    fn renders_rank_score_and_deadline() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut urgent = item("Urgent", 5.0);
        urgent.categories.push(Category::AvoidCost);
        urgent.category_data.avoid_cost.time_cost_occur =
            Some((now + Duration::days(3)).to_rfc3339());

        let out = render_list(
            &[urgent, item("Plain", 1234.5)],
            &PriorityOrderer::at(now),
            &Config::default(),
        );
        assert!(out.starts_with("2 items\n"));
        assert!(out.contains("  1. [URGENT] Urgent  WSJF 5.00"));
        assert!(out.contains("Due in 3 days (2026-01-04)"));
        assert!(out.contains("  2. Plain  WSJF 1234.50"));
        assert!(out.contains("Reduce Cost, Avoid Cost"));
        assert!(out.contains("created 2026-01-01"));
        assert!(out.contains("Plain description"));
    }

    #[test]
    fn unusable_date_format_falls_back_to_iso() {
        let mut config = Config::default();
        config.display.date_format = "%Q".into();
        let out = render_list(&[item("Legacy", 1.0)], &PriorityOrderer::new(), &config);
        assert!(out.contains("created 2026-01-01"));
    }

    #[test]
    fn hides_descriptions_when_configured() {
        let mut config = Config::default();
        config.display.show_description = false;
        let out = render_list(&[item("Quiet", 1.0)], &PriorityOrderer::new(), &config);
        assert!(!out.contains("Quiet description"));
    }
}
