//! Per-kind transaction handlers
//!
//! Each transaction kind knows how to read its old value from a project,
//! whether a record has effect, and how to apply that effect. The editor
//! only talks to a [`HandlerRegistry`]; adding a kind means registering one
//! more handler.

mod members;
mod name;
mod status;

use std::collections::HashMap;

use crate::edges::EdgeDiff;
use crate::errors::{Result, RosterError};
use crate::model::{ChangeRecord, Project, TransactionKind};
use crate::ports::{ProjectLookup, RelationshipStore};

pub use members::MembersHandler;
pub use name::NameHandler;
pub use status::StatusHandler;

/// State an effect may read or accumulate into
pub struct EffectContext<'a> {
    pub lookup: &'a dyn ProjectLookup,
    pub edges: &'a mut EdgeDiff,
}

pub trait TransactionHandler: Send + Sync {
    fn kind(&self) -> TransactionKind;

    /// Fill `record.old_value` from the project's pre-edit state, normalising
    /// `record.new_value` where the kind calls for it. Must not mutate the
    /// project's own fields.
    fn populate_old_value(
        &self,
        project: &mut Project,
        record: &mut ChangeRecord,
        edges: &dyn RelationshipStore,
    ) -> Result<()>;

    fn has_effect(&self, record: &ChangeRecord) -> bool {
        record.has_effect()
    }

    fn apply_effect(
        &self,
        project: &mut Project,
        record: &ChangeRecord,
        ctx: &mut EffectContext<'_>,
    ) -> Result<()>;
}

/// Mapping from kind to handler
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TransactionKind, Box<dyn TransactionHandler>>,
}

impl HandlerRegistry {
    /// A registry with no handlers; every kind is unknown
    pub fn empty() -> Self {
        Self::default()
    }

    /// Handlers for name, status and members
    pub fn standard() -> Self {
        Self::empty()
            .with(NameHandler)
            .with(StatusHandler)
            .with(MembersHandler)
    }

    /// Register `handler`, replacing any previous handler for its kind
    pub fn with(mut self, handler: impl TransactionHandler + 'static) -> Self {
        self.handlers.insert(handler.kind(), Box::new(handler));
        self
    }

    /// # Errors
    ///
    /// `UnknownTransactionKind` when nothing is registered for `kind`.
    pub fn handler_for(&self, kind: TransactionKind) -> Result<&dyn TransactionHandler> {
        self.handlers
            .get(&kind)
            .map(|h| h.as_ref())
            .ok_or_else(|| RosterError::UnknownTransactionKind {
                kind: kind.as_str().to_string(),
            })
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().collect();
        kinds.sort();
        f.debug_struct("HandlerRegistry").field("kinds", &kinds).finish()
    }
}

/// `InvalidValue` for a record whose value does not match its kind
fn value_mismatch(record: &ChangeRecord, expected: &str) -> RosterError {
    RosterError::InvalidValue {
        kind: record.kind.as_str().to_string(),
        reason: format!("expected {}, got {:?}", expected, record.new_value),
    }
}
