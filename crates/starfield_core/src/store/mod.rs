//! In-memory entity stores.
//!
//! # Responsibility
//! - Own star and pending-fragment lifecycles.
//! - Keep persistence out of the store; callers flush through `repo`.

pub mod star_store;
