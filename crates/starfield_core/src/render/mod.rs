//! Frame-level render state derivation.
//!
//! # Responsibility
//! - Map scene state to uniforms, per-star transforms and line sets.
//!
//! # Invariants
//! - Reads scene state only; never mutates it.

pub mod bridge;
