//! WSJF score calculation.
//!
//! ```text
//! WSJF = Cost of Delay (total value) / Job Size (effort)
//! ```
//!
//! Total value is the sum of the contributions of each selected category:
//!
//! | Category | Contribution |
//! |----------|--------------|
//! | Avoid Cost | `costAvoidedTotal * risk%` |
//! | Reduce Cost | `(peopleNow * 25 * hoursNow) - (peopleFuture * 25 * hoursFuture)` |
//! | Protect Revenue | `totalRevenueProtected * marketShare%` |
//! | Increase Revenue | `(revenueFuture * salesFuture) - (revenueNow * salesNow)` |
//!
//! An absent percentage counts as 100%. Negative contributions are kept.
//! The final score is floored, not rounded, to two decimals so it never
//! overstates the value of an item.

use serde::{Deserialize, Serialize};

use crate::model::{Category, Scorable};

/// Value contributed by one selected category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryContribution {
    pub category: Category,
    pub value: f64,
}

/// Complete scoring breakdown for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// One entry per selected category, in selection order
    pub contributions: Vec<CategoryContribution>,
    /// Sum of all contributions (Cost of Delay)
    pub total_value: f64,
    /// Effort the value was divided by
    pub effort: f64,
    /// Final WSJF score, floored to two decimals
    pub score: f64,
}

impl ScoreBreakdown {
    /// Category with the largest contribution.
    pub fn top_contribution(&self) -> Option<&CategoryContribution> {
        self.contributions
            .iter()
            .max_by(|a, b| a.value.total_cmp(&b.value))
    }
}

/// Floor to two decimal places: `12.399 -> 12.39`, `-1.001 -> -1.01`.
pub fn round_down_two_decimals(num: f64) -> f64 {
    (num * 100.0).floor() / 100.0
}

/// Compute the WSJF score of an item or draft.
///
/// Returns `0.0` when effort is zero, negative or not finite, and whenever
/// the result would not be a finite number.
pub fn compute<T: Scorable + ?Sized>(item: &T) -> f64 {
    breakdown(item).score
}

/// Compute the score together with each category's contribution.
pub fn breakdown<T: Scorable + ?Sized>(item: &T) -> ScoreBreakdown {
    let data = item.category_data();
    let contributions: Vec<CategoryContribution> = item
        .categories()
        .iter()
        .map(|&category| CategoryContribution {
            category,
            value: data.contribution(category),
        })
        .collect();
    let total_value: f64 = contributions.iter().map(|c| c.value).sum();
    let effort = item.effort();

    let score = if effort.is_finite() && effort > 0.0 {
        let score = round_down_two_decimals(total_value / effort);
        if score.is_finite() {
            score
        } else {
            0.0
        }
    } else {
        0.0
    };

    ScoreBreakdown {
        contributions,
        total_value,
        effort,
        score,
    }
}
