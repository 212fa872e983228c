//! Roster Core - transactional project editing
//!
//! This crate applies ordered batches of typed change records to a single
//! project, including:
//! - Old-value population and no-op filtering per transaction kind
//! - Membership changes expressed as relationship-edge diffs
//! - Name/slug uniqueness with re-validation after a storage race
//! - Atomic commit through the `ProjectBackend` port
//! - One feed story per committed transaction
//!
//! Storage lives behind the traits in [`ports`]; `roster-store` provides the
//! SQLite implementation and [`memory`] an in-process one.

pub mod builders;
pub mod commit;
pub mod edges;
pub mod editor;
pub mod errors;
pub mod handlers;
pub mod logging_facility;
pub mod memory;
pub mod model;
pub mod ports;
pub mod slug;
pub mod validator;

// Logging macros resolve schema constants through this path
pub use roster_core_types as types;

// Re-export commonly used types
pub use builders::{apply_join_project, apply_leave_project};
pub use commit::{resolve_commit, CommitBatch, CommitOutcome, CommitReceipt};
pub use editor::ProjectEditor;
pub use errors::{ExError, ExErrorKind, Result, RosterError};
pub use model::{Actor, ChangeRecord, FeedStory, Project, ProjectStatus, TransactionKind, TransactionValue};
pub use ports::{EventPublisher, ProjectBackend, ProjectLookup, RelationshipStore};
