//! Star and pending-fragment records.
//!
//! # Invariants
//! - `StarPoint::color` is a snapshot of the owning category color at spawn
//!   time; renaming a category never rewrites it.
//! - A `StarPoint` is never mutated in place; it is only created or removed.
//! - A `PendingFragment` is consumed exactly once (promoted or discarded).

use crate::model::category::CategoryId;
use crate::model::color::Rgb;
use crate::model::entry::EntryId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type StarId = Uuid;
pub type PendingId = Uuid;

/// Persisted, user-visible point for one tagged fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarPoint {
    pub id: StarId,
    pub entry_id: EntryId,
    pub position: [f32; 3],
    pub color: Rgb,
    /// Excerpted fragment text.
    pub content: String,
    pub category: CategoryId,
    pub size: f32,
}

/// Extracted excerpt waiting to be dropped onto a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFragment {
    pub id: PendingId,
    pub text: String,
    /// Suggested category from classification.
    pub category: CategoryId,
    pub entry_id: EntryId,
}
