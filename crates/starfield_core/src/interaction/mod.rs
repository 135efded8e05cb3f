//! Pointer interaction state machine.
//!
//! # Responsibility
//! - Translate discrete pointer events into hover/focus/drag state.
//! - Decide drop targets for pending fragments.

pub mod state;
