//! Diary entry model.
//!
//! Entries are the source text stars are excerpted from. Deleting an entry
//! must also delete every star that references it; that cascade lives in
//! the service layer.

use crate::model::category::CategoryId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type EntryId = Uuid;

/// One written (or transcribed) diary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: EntryId,
    pub text: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Category the classifier resolved for the whole entry.
    pub category: CategoryId,
}

impl DiaryEntry {
    pub fn new(text: impl Into<String>, category: CategoryId, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            created_at,
            category,
        }
    }
}
