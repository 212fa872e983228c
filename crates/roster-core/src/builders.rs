//! Join / leave convenience builders
//!
//! Each builds a single Members record from the project's current
//! membership plus or minus the actor, then runs it through the editor.

use crate::edges::PROJECT_MEMBER;
use crate::editor::ProjectEditor;
use crate::errors::Result;
use crate::model::{Actor, ChangeRecord, Project};
use crate::ports::{EventPublisher, ProjectBackend, RelationshipStore};

/// Add `actor` to the project's members.
///
/// Joining a project the actor already belongs to is a no-op and returns an
/// empty list.
///
/// # Errors
///
/// Any error of [`ProjectEditor::apply_transactions`], or a backend error
/// while reading the current membership.
pub fn apply_join_project<B, P>(
    backend: &mut B,
    publisher: &P,
    project: &mut Project,
    actor: &Actor,
) -> Result<Vec<ChangeRecord>>
where
    B: ProjectBackend,
    P: EventPublisher,
{
    let mut members = current_members(&*backend, project)?;
    members.push(actor.id.clone());
    apply_members(backend, publisher, project, actor, members)
}

/// Remove `actor` from the project's members.
///
/// # Errors
///
/// As for [`apply_join_project`].
pub fn apply_leave_project<B, P>(
    backend: &mut B,
    publisher: &P,
    project: &mut Project,
    actor: &Actor,
) -> Result<Vec<ChangeRecord>>
where
    B: ProjectBackend,
    P: EventPublisher,
{
    let mut members = current_members(&*backend, project)?;
    members.retain(|id| id != &actor.id);
    apply_members(backend, publisher, project, actor, members)
}

fn current_members(edges: &dyn RelationshipStore, project: &Project) -> Result<Vec<String>> {
    if let Some(attached) = project.members() {
        return Ok(attached.to_vec());
    }
    match &project.id {
        Some(id) => Ok(edges.list_edges(id, PROJECT_MEMBER)?),
        None => Ok(Vec::new()),
    }
}

fn apply_members<B, P>(
    backend: &mut B,
    publisher: &P,
    project: &mut Project,
    actor: &Actor,
    members: Vec<String>,
) -> Result<Vec<ChangeRecord>>
where
    B: ProjectBackend,
    P: EventPublisher,
{
    ProjectEditor::new(backend, publisher)
        .with_actor(actor.clone())
        .apply_transactions(project, vec![ChangeRecord::set_members(members)])
}
