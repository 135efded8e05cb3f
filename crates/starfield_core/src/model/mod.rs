//! Domain model for entries, categories and stars.
//!
//! # Responsibility
//! - Define the persisted record shapes (entries, stars, categories).
//! - Define the transient pending-fragment shape.
//!
//! # Invariants
//! - Records are JSON-serializable with camelCase field names.
//! - Star colors are frozen snapshots, not live category links.

pub mod category;
pub mod color;
pub mod entry;
pub mod star;
