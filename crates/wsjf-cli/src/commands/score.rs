//! Score preview without saving anything.

use clap::Args;
use wsjf_core::model::dedup_categories;
use wsjf_core::numeric::parse_numeric_str;
use wsjf_core::{scoring, Category, CategoryData, ItemDraft, ScoreBreakdown};

use super::fields::{parse_category, CategoryFieldArgs};

#[derive(Args)]
pub struct ScoreArgs {
    /// Value category (repeatable)
    #[arg(long = "category", value_parser = parse_category)]
    categories: Vec<Category>,
    /// Effort (job size)
    #[arg(long, default_value = "1")]
    effort: String,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    fields: CategoryFieldArgs,
}

pub fn run(args: ScoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let draft = ItemDraft {
        categories: dedup_categories(args.categories),
        effort: parse_numeric_str(&args.effort),
        category_data: CategoryData::from_fields(&args.fields.to_fields()),
        ..Default::default()
    };
    let breakdown = scoring::breakdown(&draft);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    } else {
        print!("{}", render(&breakdown));
    }
    Ok(())
}

fn render(breakdown: &ScoreBreakdown) -> String {
    let mut out = String::new();
    for c in &breakdown.contributions {
        out.push_str(&format!("{:<17} {:>14.2}\n", c.category.label(), c.value));
    }
    out.push_str(&format!("{:<17} {:>14.2}\n", "Total value", breakdown.total_value));
    out.push_str(&format!("{:<17} {:>14}\n", "Effort", breakdown.effort));
    out.push_str(&format!("{:<17} {:>14.2}\n", "WSJF score", breakdown.score));
    out
}
