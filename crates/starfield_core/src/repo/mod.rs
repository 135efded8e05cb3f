//! Persistence collaborator contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Load and rewrite the entries, stars and categories lists.
//! - Isolate SQL/JSON details from the service layer.
//!
//! # Invariants
//! - Writes replace a full list; there is no payload schema versioning.

pub mod record_repo;
