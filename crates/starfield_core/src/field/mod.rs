//! Procedural nebula generation.
//!
//! # Responsibility
//! - Draw the orbital trajectories that bias highlight placement.
//! - Synthesize particle and background buffers from category colors.
//!
//! # Invariants
//! - The random source is always injected; tests pass seeded generators.

pub mod generator;
pub mod trajectory;
