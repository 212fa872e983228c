use super::{value_mismatch, EffectContext, TransactionHandler};
use crate::edges::{diff_members, normalize_members, PROJECT_MEMBER};
use crate::errors::Result;
use crate::model::{ChangeRecord, Project, TransactionKind, TransactionValue};
use crate::ports::RelationshipStore;

/// Membership changes, stored as edges rather than on the project row
pub struct MembersHandler;

impl TransactionHandler for MembersHandler {
    fn kind(&self) -> TransactionKind {
        TransactionKind::Members
    }

    /// The old value always comes from the relationship store, never from a
    /// previously attached view, so it reflects what is actually persisted.
    fn populate_old_value(
        &self,
        project: &mut Project,
        record: &mut ChangeRecord,
        edges: &dyn RelationshipStore,
    ) -> Result<()> {
        let TransactionValue::Members(requested) = &record.new_value else {
            return Err(value_mismatch(record, "a member list"));
        };
        let requested = normalize_members(requested);

        let current = match &project.id {
            Some(id) => normalize_members(&edges.list_edges(id, PROJECT_MEMBER)?),
            None => Vec::new(),
        };
        project.attach_members(current.clone());

        record.old_value = Some(TransactionValue::Members(current));
        record.new_value = TransactionValue::Members(requested);
        Ok(())
    }

    fn apply_effect(
        &self,
        _project: &mut Project,
        record: &ChangeRecord,
        ctx: &mut EffectContext<'_>,
    ) -> Result<()> {
        let (Some(TransactionValue::Members(old)), TransactionValue::Members(new)) =
            (&record.old_value, &record.new_value)
        else {
            return Err(value_mismatch(record, "a member list"));
        };

        let (added, removed) = diff_members(old, new);
        tracing::debug!(
            added = added.len(),
            removed = removed.len(),
            "membership diff"
        );
        ctx.edges.merge(added, removed);
        Ok(())
    }
}
