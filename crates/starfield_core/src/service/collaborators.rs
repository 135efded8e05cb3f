//! Classification and transcription collaborator contracts.
//!
//! # Responsibility
//! - Define the seams to the external classification and transcription
//!   services.
//! - Validate what they return before it reaches the scene.
//!
//! # Invariants
//! - An unknown or missing category id resolves to the first category.
//! - Only non-empty verbatim substrings of the entry survive as fragments.

use crate::model::category::{CategoryId, CategoryInfo};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    Unavailable(String),
    InvalidResponse(String),
}

impl Display for CollaboratorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "collaborator unavailable: {message}"),
            Self::InvalidResponse(message) => {
                write!(f, "collaborator returned an invalid response: {message}")
            }
        }
    }
}

impl Error for CollaboratorError {}

/// Raw classifier answer before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub category_id: Option<String>,
    /// Verbatim excerpts proposed by the classifier. May be empty.
    pub fragments: Vec<String>,
}

/// External text classifier.
pub trait Classifier {
    fn classify(
        &self,
        text: &str,
        categories: &[CategoryInfo],
    ) -> Result<Classification, CollaboratorError>;
}

/// External speech-to-text service.
pub trait Transcriber {
    fn transcribe(&self, audio: &[u8]) -> Result<String, CollaboratorError>;
}

/// Validates a proposed category id against the known set.
///
/// Returns `None` only when there are no categories at all.
pub fn resolve_category(candidate: Option<&str>, categories: &[CategoryInfo]) -> Option<CategoryId> {
    let candidate = candidate.map(str::trim);
    categories
        .iter()
        .find(|category| Some(category.id.as_str()) == candidate)
        .or_else(|| categories.first())
        .map(|category| category.id.clone())
}

/// Keeps proposed fragments that appear verbatim in `text`.
///
/// Falls back to the whole trimmed text when nothing survives.
pub fn extract_fragments(text: &str, proposed: &[String]) -> Vec<String> {
    let mut fragments: Vec<String> = Vec::new();
    for fragment in proposed {
        let trimmed = fragment.trim();
        if trimmed.is_empty() || !text.contains(trimmed) {
            continue;
        }
        if !fragments.iter().any(|kept| kept == trimmed) {
            fragments.push(trimmed.to_string());
        }
    }

    if fragments.is_empty() {
        let whole = text.trim();
        if !whole.is_empty() {
            fragments.push(whole.to_string());
        }
    }
    fragments
}
