use super::{value_mismatch, EffectContext, TransactionHandler};
use crate::errors::Result;
use crate::model::{ChangeRecord, Project, TransactionKind, TransactionValue};
use crate::ports::RelationshipStore;
use crate::validator;

/// Renames; re-derives the slug and checks uniqueness before any write
pub struct NameHandler;

impl TransactionHandler for NameHandler {
    fn kind(&self) -> TransactionKind {
        TransactionKind::Name
    }

    fn populate_old_value(
        &self,
        project: &mut Project,
        record: &mut ChangeRecord,
        _edges: &dyn RelationshipStore,
    ) -> Result<()> {
        if !matches!(record.new_value, TransactionValue::Text(_)) {
            return Err(value_mismatch(record, "a name"));
        }
        record.old_value = Some(TransactionValue::Text(project.name.clone()));
        Ok(())
    }

    fn apply_effect(
        &self,
        project: &mut Project,
        record: &ChangeRecord,
        ctx: &mut EffectContext<'_>,
    ) -> Result<()> {
        let TransactionValue::Text(name) = &record.new_value else {
            return Err(value_mismatch(record, "a name"));
        };
        project.set_name(name.clone());
        validator::validate_name(project, ctx.lookup)
    }
}
