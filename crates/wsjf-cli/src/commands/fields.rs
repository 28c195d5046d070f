//! Category field flags shared by `item add`, `item update` and `score`.
//!
//! Values are taken as raw text and handed to the core, which coerces them
//! fail-soft. An empty string clears a field.

use clap::Args;
use serde_json::{Map, Value};
use wsjf_core::Category;

#[derive(Args, Debug, Default, Clone)]
pub struct CategoryFieldArgs {
    /// Avoid Cost: total cost avoided
    #[arg(long)]
    pub cost_avoided_total: Option<String>,
    /// Avoid Cost: probability in percent (omit for 100%)
    #[arg(long)]
    pub risk: Option<String>,
    /// Avoid Cost: date the cost occurs (YYYY-MM-DD)
    #[arg(long)]
    pub time_cost_occur: Option<String>,

    /// Reduce Cost: people involved today
    #[arg(long)]
    pub people_now: Option<String>,
    /// Reduce Cost: hours spent today
    #[arg(long)]
    pub hours_now: Option<String>,
    /// Reduce Cost: people involved afterwards
    #[arg(long)]
    pub people_future: Option<String>,
    /// Reduce Cost: hours spent afterwards
    #[arg(long)]
    pub hours_future: Option<String>,

    /// Protect Revenue: total revenue protected
    #[arg(long)]
    pub total_revenue_protected: Option<String>,
    /// Protect Revenue: market share in percent (omit for 100%)
    #[arg(long)]
    pub market_share: Option<String>,
    /// Protect Revenue: date the loss occurs (YYYY-MM-DD)
    #[arg(long)]
    pub time_to_loss_occur: Option<String>,

    /// Increase Revenue: revenue per sale today
    #[arg(long)]
    pub revenue_now: Option<String>,
    /// Increase Revenue: sales today
    #[arg(long)]
    pub sales_now: Option<String>,
    /// Increase Revenue: revenue per sale afterwards
    #[arg(long)]
    pub revenue_future: Option<String>,
    /// Increase Revenue: sales afterwards
    #[arg(long)]
    pub sales_future: Option<String>,
}

impl CategoryFieldArgs {
    /// Raw field map keyed by stored field name, holding only given flags.
    pub fn to_fields(&self) -> Map<String, Value> {
        let pairs = [
            ("costAvoidedTotal", &self.cost_avoided_total),
            ("risk", &self.risk),
            ("timeCostOccur", &self.time_cost_occur),
            ("peopleNow", &self.people_now),
            ("hoursNow", &self.hours_now),
            ("peopleFuture", &self.people_future),
            ("hoursFuture", &self.hours_future),
            ("totalRevenueProtected", &self.total_revenue_protected),
            ("marketShare", &self.market_share),
            ("timeToLossOccur", &self.time_to_loss_occur),
            ("revenueNow", &self.revenue_now),
            ("salesNow", &self.sales_now),
            ("revenueFuture", &self.revenue_future),
            ("salesFuture", &self.sales_future),
        ];
        pairs
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_ref()
                    .map(|v| (key.to_string(), Value::String(v.clone())))
            })
            .collect()
    }
}

/// Parse `--category` values for clap.
pub fn parse_category(raw: &str) -> Result<Category, String> {
    raw.parse()
}
