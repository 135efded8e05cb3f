//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate the scene, persistence and external collaborators.
//! - Keep the host UI decoupled from storage details.

pub mod collaborators;
pub mod diary_service;
