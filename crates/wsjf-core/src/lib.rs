//! # WSJF Core Library
//!
//! Core business logic for a Weighted-Shortest-Job-First backlog. All
//! operations are available through the standalone `wsjf` CLI, which is a
//! thin presentation layer over this crate.
//!
//! ## Architecture
//!
//! - **Scoring**: turns category-specific inputs into one comparable score
//!   (`value / effort`, floored to two decimals)
//! - **Priority**: merges deadline urgency with score into a total order,
//!   computed fresh against the current time on every read
//! - **Normalize**: migrates older stored record shapes on read
//! - **Storage**: SQLite key-value persistence and TOML configuration
//!
//! Scoring, ordering and normalization never fail on malformed data; bad
//! fields are coerced to zero or treated as absent.
//!
//! ## Key Components
//!
//! - [`scoring::compute`]: WSJF score of an item or draft
//! - [`PriorityOrderer`]: urgency-aware ordering
//! - [`ItemStore`]: backlog persistence over a [`Database`]
//! - [`Config`]: application configuration management

pub mod error;
pub mod model;
pub mod normalize;
pub mod numeric;
pub mod priority;
pub mod scoring;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use model::{Category, CategoryData, Item, ItemDraft, ItemPatch, Scorable};
pub use normalize::normalize_record;
pub use numeric::parse_numeric_field;
pub use priority::{DeadlineInfo, DeadlineStatus, PriorityOrderer};
pub use scoring::{CategoryContribution, ScoreBreakdown};
pub use storage::{Config, Database, ItemStore};
