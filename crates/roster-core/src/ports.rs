//! Collaborator traits the editor is written against
//!
//! Infrastructure failures cross these seams as `ExError` and are passed
//! through the editor untouched. `roster_store` provides the SQLite
//! implementations; `crate::memory` provides in-process ones.

use std::collections::BTreeSet;

use crate::commit::{CommitBatch, CommitOutcome};
use crate::errors::ExError;
use crate::model::{Actor, FeedStory, Project};

/// Typed, directed edges between entity identifiers
pub trait RelationshipStore {
    /// Targets of `src`'s edges of `edge_type`, in stable order
    fn list_edges(&self, src: &str, edge_type: &str) -> Result<Vec<String>, ExError>;

    /// Remove then add edges from `src` as one grouped edit
    fn apply_edge_edits(
        &mut self,
        src: &str,
        edge_type: &str,
        adds: &BTreeSet<String>,
        removes: &BTreeSet<String>,
        actor: &Actor,
    ) -> Result<(), ExError>;
}

/// Read access to stored projects
pub trait ProjectLookup {
    /// Any project other than `exclude_id` whose name or slug matches
    fn find_by_name_or_slug(
        &self,
        name: &str,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<Project>, ExError>;

    fn load_project(&self, id: &str) -> Result<Option<Project>, ExError>;
}

/// Backing store able to commit an edit atomically
pub trait ProjectBackend: ProjectLookup + RelationshipStore {
    /// Save the project, apply the edge diff and persist the records inside
    /// one storage transaction. Nothing is visible unless everything succeeds.
    fn commit(&mut self, batch: &CommitBatch<'_>) -> CommitOutcome;
}

/// Durable, time-ordered change events for feed consumers
pub trait EventPublisher {
    /// Publish one story, returning its id
    fn publish(&self, story: &FeedStory) -> Result<String, ExError>;
}
