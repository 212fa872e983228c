//! The project transaction editor
//!
//! One call to [`ProjectEditor::apply_transactions`] runs the whole edit
//! lifecycle for a single project:
//!
//! 1. populate old values for every record
//! 2. drop records without effect
//! 3. apply effects to the in-memory project, collecting edge edits
//! 4. commit project, edges and records atomically
//! 5. publish one feed story per committed record
//!
//! Steps 1-3 never touch storage beyond reads, so any error there leaves
//! persisted state exactly as it was.

use chrono::Utc;

use crate::commit::{resolve_commit, CommitBatch};
use crate::edges::{EdgeDiff, PROJECT_MEMBER};
use crate::errors::{Result, RosterError};
use crate::handlers::{EffectContext, HandlerRegistry};
use crate::model::{Actor, ChangeRecord, FeedStory, Project};
use crate::ports::{EventPublisher, ProjectBackend};
use crate::validator;

/// Applies batches of change records to projects
///
/// The editor borrows its collaborators; it holds no state between calls
/// apart from the acting user.
pub struct ProjectEditor<'a, B, P>
where
    B: ProjectBackend,
    P: EventPublisher,
{
    backend: &'a mut B,
    publisher: &'a P,
    registry: HandlerRegistry,
    actor: Option<Actor>,
}

impl<'a, B, P> ProjectEditor<'a, B, P>
where
    B: ProjectBackend,
    P: EventPublisher,
{
    /// Editor with the standard name/status/members handlers and no actor
    pub fn new(backend: &'a mut B, publisher: &'a P) -> Self {
        Self {
            backend,
            publisher,
            registry: HandlerRegistry::standard(),
            actor: None,
        }
    }

    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    /// Apply `records` to `project` and persist the ones that change something.
    ///
    /// On success `project` reflects the committed state (including a newly
    /// assigned id) and the returned records are the persisted ones, in input
    /// order, with ids and old values filled in. An empty result means every
    /// record was a no-op and nothing was written or published.
    ///
    /// # Errors
    ///
    /// - `ActorNotSet` if [`with_actor`](Self::with_actor) was never called
    /// - `UnknownTransactionKind` if a record has no registered handler
    /// - `InvalidValue` if a record's value does not fit its kind
    /// - `InvalidName` / `NameCollision` from name validation, including after
    ///   a commit rejected by the store's unique index
    /// - `Backend` for storage or publish failures, passed through unchanged
    pub fn apply_transactions(
        &mut self,
        project: &mut Project,
        records: Vec<ChangeRecord>,
    ) -> Result<Vec<ChangeRecord>> {
        let actor = self.actor.clone().ok_or(RosterError::ActorNotSet)?;

        let mut records = records;
        for record in records.iter_mut() {
            let handler = self.registry.handler_for(record.kind)?;
            handler.populate_old_value(project, record, &*self.backend)?;
        }

        let mut effective = Vec::with_capacity(records.len());
        for record in records {
            if self.registry.handler_for(record.kind)?.has_effect(&record) {
                effective.push(record);
            } else {
                tracing::debug!(
                    xaction_kind = record.kind.as_str(),
                    "dropping transaction without effect"
                );
            }
        }

        if effective.is_empty() {
            tracing::debug!("no effective transactions, nothing to commit");
            return Ok(effective);
        }

        let mut edges = EdgeDiff::new();
        {
            let mut ctx = EffectContext {
                lookup: &*self.backend,
                edges: &mut edges,
            };
            for record in &effective {
                let handler = self.registry.handler_for(record.kind)?;
                handler.apply_effect(project, record, &mut ctx)?;
            }
        }

        let is_new = project.is_new();
        for record in effective.iter_mut() {
            record.author_id = Some(actor.id.clone());
            record.project_id = project.id.clone();
        }

        let outcome = self.backend.commit(&CommitBatch {
            project: &*project,
            is_new,
            actor: &actor,
            edge_type: PROJECT_MEMBER,
            edges: &edges,
            records: &effective,
        });
        let backend = &*self.backend;
        let receipt = resolve_commit(outcome, || validator::validate_name(&*project, backend))?;

        project.id = Some(receipt.project_id.clone());
        project.updated_at = receipt.committed_at;
        if is_new {
            project.author_id = Some(actor.id.clone());
        }
        if let Some(current) = project.members() {
            let refreshed = edges.apply_to(current);
            project.attach_members(refreshed);
        }
        for (record, id) in effective.iter_mut().zip(receipt.record_ids) {
            record.id = Some(id);
            record.project_id = Some(receipt.project_id.clone());
        }

        tracing::debug!(
            project_id = %receipt.project_id,
            count = effective.len(),
            "committed transactions"
        );

        self.publish_stories(project, &effective)?;
        Ok(effective)
    }

    fn publish_stories(&self, project: &Project, records: &[ChangeRecord]) -> Result<()> {
        let epoch = Utc::now();
        for record in records {
            let story = FeedStory::for_transaction(project, record, epoch)?;
            let story_id = self.publisher.publish(&story)?;
            tracing::debug!(
                story_id = %story_id,
                xaction_kind = record.kind.as_str(),
                "published story"
            );
        }
        Ok(())
    }
}
