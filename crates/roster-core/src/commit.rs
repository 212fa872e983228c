//! Commit batches and the duplicate-key race protocol
//!
//! The uniqueness check in the editor is optimistic: a concurrent edit can
//! claim the same name between the check and the commit. The store's unique
//! index then rejects the write, and the backend reports that as
//! `CommitOutcome::DuplicateKey`. [`resolve_commit`] decides what the caller
//! sees: a `NameCollision` if a re-check confirms one, otherwise the
//! original storage error, unchanged.

use chrono::{DateTime, Utc};

use crate::edges::EdgeDiff;
use crate::errors::{ExError, Result, RosterError};
use crate::model::{Actor, ChangeRecord, Project};

/// Everything one atomic commit writes
#[derive(Debug)]
pub struct CommitBatch<'a> {
    pub project: &'a Project,
    /// The project has no id yet; the backend assigns one and records
    /// `actor` as its author
    pub is_new: bool,
    pub actor: &'a Actor,
    pub edge_type: &'a str,
    pub edges: &'a EdgeDiff,
    /// Effective records, in input order
    pub records: &'a [ChangeRecord],
}

/// Ids assigned by a successful commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReceipt {
    pub project_id: String,
    /// One id per batch record, same order
    pub record_ids: Vec<String>,
    pub committed_at: DateTime<Utc>,
}

/// Typed result of [`crate::ports::ProjectBackend::commit`]
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Committed(CommitReceipt),
    /// A unique index rejected the write; nothing was committed
    DuplicateKey(ExError),
    /// Any other failure; nothing was committed
    Failed(ExError),
}

/// Turn a commit outcome into the editor's result.
///
/// `revalidate` is only invoked for `DuplicateKey`. If it reports an error
/// (normally `NameCollision`) that error wins; if it finds nothing the
/// original storage error is returned as-is.
///
/// # Errors
///
/// `Backend` with the original error, or whatever `revalidate` returns.
pub fn resolve_commit<F>(outcome: CommitOutcome, revalidate: F) -> Result<CommitReceipt>
where
    F: FnOnce() -> Result<()>,
{
    match outcome {
        CommitOutcome::Committed(receipt) => Ok(receipt),
        CommitOutcome::Failed(err) => Err(RosterError::Backend(err)),
        CommitOutcome::DuplicateKey(err) => {
            tracing::debug!(code = err.code(), "commit hit a unique index, re-validating");
            revalidate()?;
            Err(RosterError::Backend(err))
        }
    }
}
