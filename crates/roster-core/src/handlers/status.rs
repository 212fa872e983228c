use super::{value_mismatch, EffectContext, TransactionHandler};
use crate::errors::Result;
use crate::model::{ChangeRecord, Project, TransactionKind, TransactionValue};
use crate::ports::RelationshipStore;

pub struct StatusHandler;

impl TransactionHandler for StatusHandler {
    fn kind(&self) -> TransactionKind {
        TransactionKind::Status
    }

    fn populate_old_value(
        &self,
        project: &mut Project,
        record: &mut ChangeRecord,
        _edges: &dyn RelationshipStore,
    ) -> Result<()> {
        if !matches!(record.new_value, TransactionValue::Status(_)) {
            return Err(value_mismatch(record, "a status"));
        }
        record.old_value = Some(TransactionValue::Status(project.status));
        Ok(())
    }

    fn apply_effect(
        &self,
        project: &mut Project,
        record: &ChangeRecord,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<()> {
        let TransactionValue::Status(status) = record.new_value else {
            return Err(value_mismatch(record, "a status"));
        };
        project.status = status;
        Ok(())
    }
}
