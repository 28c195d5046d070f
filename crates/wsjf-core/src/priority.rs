//! Priority ordering of backlog items.
//!
//! Ordering combines deadline urgency with the WSJF score:
//! - Urgent items (deadline between 7 days overdue and 30 days out) come first,
//!   soonest deadline first.
//! - Everything else follows by descending WSJF score.
//! - Ties go to the newer item.
//!
//! Ordering is a projection over a snapshot and the current time. Stored
//! order is never touched, and a later `now` may reorder the same items.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use crate::model::Item;
use crate::numeric::parse_deadline;

/// Items overdue by at most this many days are still urgent.
pub const URGENT_OVERDUE_DAYS: i64 = -7;
/// Items due this many days out or later are not urgent.
pub const URGENT_HORIZON_DAYS: i64 = 30;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// How a deadline reads relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "days", rename_all = "snake_case")]
pub enum DeadlineStatus {
    /// Deadline passed this many whole days ago
    Overdue(i64),
    DueToday,
    /// Deadline is this many days away
    DueIn(i64),
}

/// Deadline details of one item, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeadlineInfo {
    pub deadline: DateTime<Utc>,
    pub days_left: i64,
    pub urgent: bool,
    pub status: DeadlineStatus,
}

/// Earliest parseable deadline among the item's selected categories.
pub fn deadline(item: &Item) -> Option<DateTime<Utc>> {
    item.categories
        .iter()
        .filter_map(|&category| item.category_data.deadline_text(category))
        .filter_map(parse_deadline)
        .min()
}

/// Whole days until `deadline`, rounded up. Negative when overdue.
pub fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = deadline.signed_duration_since(now).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).ceil() as i64
}

/// Whether a deadline falls inside the urgency window.
pub fn is_urgent(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    deadline.is_some_and(|d| {
        let days = days_until(d, now);
        (URGENT_OVERDUE_DAYS..URGENT_HORIZON_DAYS).contains(&days)
    })
}

/// Deadline details for display, or `None` if the item has no deadline.
pub fn deadline_info(item: &Item, now: DateTime<Utc>) -> Option<DeadlineInfo> {
    let deadline = deadline(item)?;
    let days_left = days_until(deadline, now);
    let status = match days_left {
        d if d < 0 => DeadlineStatus::Overdue(-d),
        0 => DeadlineStatus::DueToday,
        d => DeadlineStatus::DueIn(d),
    };
    Some(DeadlineInfo {
        deadline,
        days_left,
        urgent: is_urgent(Some(deadline), now),
        status,
    })
}

/// Sort key computed once per item.
#[derive(Debug, Clone, Copy)]
struct PriorityKey {
    urgent: bool,
    deadline: Option<DateTime<Utc>>,
    score: f64,
    created_at: i64,
}

impl PriorityKey {
    fn new(item: &Item, now: DateTime<Utc>) -> Self {
        let deadline = deadline(item);
        Self {
            urgent: is_urgent(deadline, now),
            deadline,
            score: item.wsjf_score,
            created_at: item.created_at,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        // Urgent first.
        other
            .urgent
            .cmp(&self.urgent)
            .then_with(|| {
                if self.urgent && other.urgent {
                    self.deadline.cmp(&other.deadline)
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| other.score.total_cmp(&self.score))
            .then_with(|| other.created_at.cmp(&self.created_at))
    }
}

/// Orders items by urgency, then score, then recency.
#[derive(Debug, Clone, Copy)]
pub struct PriorityOrderer {
    now: DateTime<Utc>,
}

impl PriorityOrderer {
    /// Orderer evaluating urgency against the current wall-clock time.
    pub fn new() -> Self {
        Self { now: Utc::now() }
    }

    /// Orderer evaluating urgency against a fixed instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Compare two items. Consistent with a total order.
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        PriorityKey::new(a, self.now).compare(&PriorityKey::new(b, self.now))
    }

    /// Return the items in priority order. Equal keys keep their input order.
    pub fn order(&self, items: &[Item]) -> Vec<Item> {
        let mut keyed: Vec<(PriorityKey, &Item)> = items
            .iter()
            .map(|item| (PriorityKey::new(item, self.now), item))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| a.compare(b));
        keyed.into_iter().map(|(_, item)| item.clone()).collect()
    }
}

impl Default for PriorityOrderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function: order `items` as of `now`.
pub fn order(items: &[Item], now: DateTime<Utc>) -> Vec<Item> {
    PriorityOrderer::at(now).order(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, CategoryData};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn item(id: &str, score: f64, created_at: i64) -> Item {
        Item {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            categories: Vec::new(),
            effort: 1.0,
            created_at,
            wsjf_score: score,
            category_data: CategoryData::default(),
        }
    }

    fn due(mut item: Item, at: DateTime<Utc>) -> Item {
        item.categories.push(Category::AvoidCost);
        item.category_data.avoid_cost.time_cost_occur = Some(at.to_rfc3339());
        item
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn urgent_item_outranks_higher_score() {
        let urgent = due(item("urgent", 5.0, 1), now() + Duration::days(10));
        let rich = item("rich", 1000.0, 2);
        let ordered = order(&[rich, urgent], now());
        assert_eq!(ids(&ordered), vec!["urgent", "rich"]);
    }

    #[test]
    fn urgent_items_sort_by_deadline_regardless_of_score() {
        let later = due(item("later", 900.0, 1), now() + Duration::days(20));
        let sooner = due(item("sooner", 1.0, 2), now() + Duration::days(3));
        let ordered = order(&[later, sooner], now());
        assert_eq!(ids(&ordered), vec!["sooner", "later"]);
    }

    #[test]
    fn equal_deadlines_fall_through_to_score() {
        let at = now() + Duration::days(5);
        let low = due(item("low", 1.0, 1), at);
        let high = due(item("high", 2.0, 2), at);
        let ordered = order(&[low, high], now());
        assert_eq!(ids(&ordered), vec!["high", "low"]);
    }

    #[test]
    fn equal_scores_prefer_newer() {
        let old = item("old", 10.0, 100);
        let new = item("new", 10.0, 200);
        let ordered = order(&[old, new], now());
        assert_eq!(ids(&ordered), vec!["new", "old"]);
    }

    #[test]
    fn week_overdue_still_outranks_higher_score() {
        let overdue = due(item("overdue", 1.0, 1), now() - Duration::days(7));
        let stale = due(item("stale", 1.0, 2), now() - Duration::days(8));
        let rich = item("rich", 1000.0, 3);
        let ordered = order(&[rich, stale, overdue], now());
        assert_eq!(ids(&ordered), vec!["overdue", "rich", "stale"]);
    }

    #[test]
    fn far_deadline_is_not_urgent() {
        let far = due(item("far", 1.0, 1), now() + Duration::days(45));
        let rich = item("rich", 50.0, 2);
        let ordered = order(&[far, rich], now());
        assert_eq!(ids(&ordered), vec!["rich", "far"]);
    }

    #[test]
    fn urgency_window_bounds() {
        let n = now();
        assert!(is_urgent(Some(n), n));
        assert!(is_urgent(Some(n - Duration::days(7)), n));
        assert!(!is_urgent(Some(n - Duration::days(8)), n));
        assert!(is_urgent(Some(n + Duration::days(29)), n));
        assert!(!is_urgent(Some(n + Duration::days(30)), n));
        // 29 days and an hour rounds up to 30.
        assert!(!is_urgent(Some(n + Duration::days(29) + Duration::hours(1)), n));
        assert!(!is_urgent(None, n));
    }

    #[test]
    fn deadline_only_read_for_selected_category() {
        let mut it = item("x", 1.0, 1);
        it.category_data.protect_revenue.time_to_loss_occur = Some("2026-03-02".into());
        assert_eq!(deadline(&it), None);
        it.categories.push(Category::ProtectRevenue);
        assert!(deadline(&it).is_some());
    }

    #[test]
    fn earliest_deadline_wins_and_garbage_ignored() {
        let mut it = item("x", 1.0, 1);
        it.categories = vec![Category::AvoidCost, Category::ProtectRevenue];
        it.category_data.avoid_cost.time_cost_occur = Some("2026-04-01".into());
        it.category_data.protect_revenue.time_to_loss_occur = Some("2026-03-15".into());
        assert_eq!(
            deadline(&it),
            Some(Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap())
        );

        it.category_data.protect_revenue.time_to_loss_occur = Some("soon".into());
        assert_eq!(
            deadline(&it),
            Some(Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn deadline_info_status() {
        let n = now();
        let overdue = deadline_info(&due(item("a", 0.0, 0), n - Duration::days(3)), n).unwrap();
        assert_eq!(overdue.status, DeadlineStatus::Overdue(3));
        assert!(overdue.urgent);

        let today = deadline_info(&due(item("b", 0.0, 0), n - Duration::hours(2)), n).unwrap();
        assert_eq!(today.status, DeadlineStatus::DueToday);

        let later = deadline_info(&due(item("c", 0.0, 0), n + Duration::days(40)), n).unwrap();
        assert_eq!(later.status, DeadlineStatus::DueIn(40));
        assert!(!later.urgent);

        assert!(deadline_info(&item("d", 0.0, 0), n).is_none());
    }

    #[test]
    fn later_now_can_change_order() {
        let at = now() + Duration::days(40);
        let deadline_item = due(item("deadline", 1.0, 1), at);
        let rich = item("rich", 100.0, 2);
        let items = [deadline_item, rich];

        assert_eq!(ids(&order(&items, now())), vec!["rich", "deadline"]);
        assert_eq!(
            ids(&order(&items, now() + Duration::days(20))),
            vec!["deadline", "rich"]
        );
    }

    #[test]
    fn order_is_stable_for_identical_keys() {
        let a = item("a", 1.0, 5);
        let b = item("b", 1.0, 5);
        assert_eq!(ids(&order(&[a.clone(), b.clone()], now())), vec!["a", "b"]);
        assert_eq!(ids(&order(&[b, a], now())), vec!["b", "a"]);
    }
}
