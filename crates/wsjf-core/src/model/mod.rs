//! Item and category types.

pub mod category;
pub mod item;

pub use category::{
    dedup_categories, AvoidCostInput, Category, CategoryData, IncreaseRevenueInput,
    ProtectRevenueInput, ReduceCostInput, HOURLY_RATE, KNOWN_FIELDS,
};
pub use item::{Item, ItemDraft, ItemPatch, Scorable};
