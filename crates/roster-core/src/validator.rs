//! Project name uniqueness
//!
//! Invoked by the editor right after a rename is applied, and again when a
//! commit is rejected by the store's unique index. It only reads, so running
//! it a second time is always safe.

use crate::errors::{Result, RosterError};
use crate::model::Project;
use crate::ports::ProjectLookup;
use crate::slug;

pub const DEGENERATE_NAME_REASON: &str =
    "Project names must be unique and contain some letters or numbers.";

/// Check `project`'s current name and slug against every other project.
///
/// # Errors
///
/// - `InvalidName` when the slug is the root value, whatever else exists
/// - `NameCollision` when another project shares the name or slug
/// - `Backend` when the lookup itself fails
pub fn validate_name(project: &Project, lookup: &dyn ProjectLookup) -> Result<()> {
    if slug::is_root(&project.slug) {
        return Err(RosterError::InvalidName {
            reason: DEGENERATE_NAME_REASON.to_string(),
        });
    }

    let collision =
        lookup.find_by_name_or_slug(&project.name, &project.slug, project.id.as_deref())?;

    if let Some(other) = collision {
        tracing::debug!(
            name = %project.name,
            other_id = ?other.id,
            "project name collides"
        );
        return Err(RosterError::NameCollision {
            name: project.name.clone(),
            other_id: other.id.unwrap_or_default(),
            other_name: other.name,
        });
    }

    Ok(())
}
