//! Category domain model.
//!
//! # Responsibility
//! - Define the user-facing grouping a star belongs to.
//! - Provide the default category set used when nothing is persisted.
//!
//! # Invariants
//! - `id` is unique within a category list and never changes.
//! - Only `name` is mutable after creation (rename).
//! - List order is display order along the category rail.

use crate::model::color::Rgb;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Category identifier. Kept as a string so default slugs and generated ids
/// share one shape.
pub type CategoryId = String;

/// Validation errors for category mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryError {
    EmptyName,
    NotFound(CategoryId),
    DuplicateId(CategoryId),
}

impl Display for CategoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "category name cannot be empty"),
            Self::NotFound(id) => write!(f, "category not found: {id}"),
            Self::DuplicateId(id) => write!(f, "category id already in use: {id}"),
        }
    }
}

impl Error for CategoryError {}

/// One user-defined category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub id: CategoryId,
    pub name: String,
    pub color: Rgb,
    /// Presentation hint for the category rail glow, derived from `color`.
    pub glow_spec: String,
}

impl CategoryInfo {
    /// Creates a category with a generated id.
    pub fn new(name: &str, color: Rgb) -> Result<Self, CategoryError> {
        Self::with_id(format!("cat-{}", Uuid::new_v4().simple()), name, color)
    }

    /// Creates a category with a caller-provided id.
    pub fn with_id(
        id: impl Into<CategoryId>,
        name: &str,
        color: Rgb,
    ) -> Result<Self, CategoryError> {
        let name = normalize_name(name)?;
        Ok(Self {
            id: id.into(),
            name,
            color,
            glow_spec: glow_spec_for(color),
        })
    }

    /// Renames the category. Color and glow are left untouched.
    pub fn rename(&mut self, name: &str) -> Result<(), CategoryError> {
        self.name = normalize_name(name)?;
        Ok(())
    }
}

/// Builds the rail glow hint for one color.
pub fn glow_spec_for(color: Rgb) -> String {
    let [r, g, b] = color.to_u8();
    format!("0 0 12px rgba({r}, {g}, {b}, 0.8)")
}

/// Categories seeded on first launch.
pub fn default_categories() -> Vec<CategoryInfo> {
    [
        ("gratitude", "Gratitude", Rgb::from_u8(0xff, 0xc8, 0x57)),
        ("growth", "Growth", Rgb::from_u8(0x6e, 0xe7, 0xb7)),
        ("memory", "Memory", Rgb::from_u8(0x93, 0xc5, 0xfd)),
        ("dream", "Dream", Rgb::from_u8(0xd8, 0xb4, 0xfe)),
    ]
    .into_iter()
    .map(|(id, name, color)| CategoryInfo {
        id: id.to_string(),
        name: name.to_string(),
        color,
        glow_spec: glow_spec_for(color),
    })
    .collect()
}

/// Looks up one category by id.
pub fn find_category<'a>(categories: &'a [CategoryInfo], id: &str) -> Option<&'a CategoryInfo> {
    categories.iter().find(|category| category.id == id)
}

/// Rejects a list in which two categories share an id.
pub fn ensure_unique_ids(categories: &[CategoryInfo]) -> Result<(), CategoryError> {
    for (index, category) in categories.iter().enumerate() {
        if categories[..index].iter().any(|earlier| earlier.id == category.id) {
            return Err(CategoryError::DuplicateId(category.id.clone()));
        }
    }
    Ok(())
}

fn normalize_name(name: &str) -> Result<String, CategoryError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CategoryError::EmptyName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        default_categories, ensure_unique_ids, find_category, CategoryError, CategoryInfo,
    };
    use crate::model::color::Rgb;
    use std::collections::HashSet;

    #[test]
    fn default_ids_are_unique() {
        let categories = default_categories();
        let ids: HashSet<_> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), categories.len());
        assert!(find_category(&categories, "growth").is_some());
    }

    #[test]
    fn rename_keeps_color_and_glow() {
        let mut category = CategoryInfo::new("Work", Rgb::from_u8(10, 20, 30)).unwrap();
        let glow = category.glow_spec.clone();
        category.rename("  Career ").unwrap();
        assert_eq!(category.name, "Career");
        assert_eq!(category.color, Rgb::from_u8(10, 20, 30));
        assert_eq!(category.glow_spec, glow);
    }

    #[test]
    fn repeated_id_is_reported() {
        let mut categories = default_categories();
        ensure_unique_ids(&categories).unwrap();
        categories.push(CategoryInfo::with_id("memory", "Again", Rgb::WHITE).unwrap());
        assert_eq!(
            ensure_unique_ids(&categories),
            Err(CategoryError::DuplicateId("memory".to_string()))
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        assert_eq!(
            CategoryInfo::new("   ", Rgb::WHITE).unwrap_err(),
            CategoryError::EmptyName
        );
    }
}
