//! Project command handlers with boundary logging.
//!
//! Each command loads what it needs from the connection, runs the project
//! editor with a SQLite backend and feed publisher, and reports failures as
//! `ExError` tagged with the request id.
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for project operations:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

use std::time::Instant;

use roster_core::edges::PROJECT_MEMBER;
use roster_core::errors::{ExError, ExErrorKind};
use roster_core::model::{Actor, ChangeRecord, FeedStory, Project, ProjectStatus};
use roster_core::types::RequestId;
use roster_core::{
    apply_join_project, apply_leave_project, log_op_end, log_op_error, log_op_start, validator,
    ProjectEditor, RelationshipStore,
};
use roster_store::backend::require_project;
use roster_store::errors::Result;
use roster_store::repo::SqliteRepo;
use roster_store::{SqliteBackend, SqliteFeedPublisher};
use rusqlite::Connection;

/// Run `f` between start/end log lines, tagging any error with a fresh
/// request id.
fn with_boundary<T>(
    op: &'static str,
    project_id: Option<&str>,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let request_id = RequestId::new();
    log_op_start!(
        op,
        project_id = project_id.unwrap_or("-"),
        request_id = request_id.as_str()
    );
    let start = Instant::now();

    match f() {
        Ok(value) => {
            log_op_end!(
                op,
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = request_id.as_str()
            );
            Ok(value)
        }
        Err(err) => {
            let err = err.with_request_id(request_id.clone());
            log_op_error!(
                op,
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = request_id.as_str()
            );
            Err(err)
        }
    }
}

/// Create a project named `name`, authored by `actor`
///
/// ## Errors
///
/// - `InvalidName`: name has no letters or numbers (including `""`)
/// - `NameCollision`: another project has the same name or slug
/// - `Persistence`: database error
pub fn project_create(name: &str, actor: &Actor, conn: &Connection) -> Result<Project> {
    with_boundary("project_create", None, || {
        // A blank project already has the empty name, so the editor would
        // drop `rename("")` as a no-op; check the proposed name up front.
        let mut candidate = Project::new();
        candidate.set_name(name);
        validator::validate_name(&candidate, &SqliteBackend::new(conn))?;

        let mut project = Project::new();
        edit(conn, &mut project, actor, vec![ChangeRecord::rename(name)])?;
        if project.id.is_none() {
            return Err(ExError::new(ExErrorKind::Internal)
                .with_op("project_create")
                .with_message("editor returned without saving the project"));
        }
        tracing::debug!(project_id = ?project.id, actor_id = %actor.id, "project created");
        Ok(project)
    })
}

/// Apply a batch of change records to a stored project
///
/// ## Returns
///
/// The persisted records; empty when every record was a no-op.
///
/// ## Errors
///
/// - `NotFound`: no project with this id
/// - `UnknownTransactionKind`, `InvalidInput`, `InvalidName`, `NameCollision`
/// - `DuplicateKey` / `Persistence`: database error
pub fn project_apply_transactions(
    project_id: &str,
    records: Vec<ChangeRecord>,
    actor: &Actor,
    conn: &Connection,
) -> Result<Vec<ChangeRecord>> {
    with_boundary("project_apply_transactions", Some(project_id), || {
        let requested = records.len();
        let mut project = require_project(conn, project_id)?;
        let applied = edit(conn, &mut project, actor, records)?;
        tracing::debug!(
            xaction_count = requested,
            effective_count = applied.len(),
            "batch applied"
        );
        Ok(applied)
    })
}

/// Rename a stored project
///
/// ## Errors
///
/// As for [`project_apply_transactions`].
pub fn project_rename(
    project_id: &str,
    name: &str,
    actor: &Actor,
    conn: &Connection,
) -> Result<Vec<ChangeRecord>> {
    with_boundary("project_rename", Some(project_id), || {
        let mut project = require_project(conn, project_id)?;
        edit(conn, &mut project, actor, vec![ChangeRecord::rename(name)])
    })
}

/// Archive or re-activate a stored project
///
/// ## Errors
///
/// As for [`project_apply_transactions`].
pub fn project_set_status(
    project_id: &str,
    status: ProjectStatus,
    actor: &Actor,
    conn: &Connection,
) -> Result<Vec<ChangeRecord>> {
    with_boundary("project_set_status", Some(project_id), || {
        let mut project = require_project(conn, project_id)?;
        edit(conn, &mut project, actor, vec![ChangeRecord::set_status(status)])
    })
}

/// Add `actor` to the project's members
///
/// ## Errors
///
/// - `NotFound`: no project with this id
/// - `Persistence`: database error
pub fn project_join(
    project_id: &str,
    actor: &Actor,
    conn: &Connection,
) -> Result<Vec<ChangeRecord>> {
    with_boundary("project_join", Some(project_id), || {
        let mut project = require_project(conn, project_id)?;
        let mut backend = SqliteBackend::new(conn);
        let publisher = SqliteFeedPublisher::new(conn);
        Ok(apply_join_project(&mut backend, &publisher, &mut project, actor)?)
    })
}

/// Remove `actor` from the project's members
///
/// ## Errors
///
/// As for [`project_join`].
pub fn project_leave(
    project_id: &str,
    actor: &Actor,
    conn: &Connection,
) -> Result<Vec<ChangeRecord>> {
    with_boundary("project_leave", Some(project_id), || {
        let mut project = require_project(conn, project_id)?;
        let mut backend = SqliteBackend::new(conn);
        let publisher = SqliteFeedPublisher::new(conn);
        Ok(apply_leave_project(&mut backend, &publisher, &mut project, actor)?)
    })
}

/// Load a project with its member view attached
///
/// ## Errors
///
/// - `NotFound`: no project with this id
pub fn project_get(project_id: &str, conn: &Connection) -> Result<Project> {
    with_boundary("project_get", Some(project_id), || {
        let mut project = require_project(conn, project_id)?;
        let members = SqliteBackend::new(conn).list_edges(project_id, PROJECT_MEMBER)?;
        project.attach_members(members);
        Ok(project)
    })
}

/// Every persisted transaction of a project, oldest first
///
/// ## Errors
///
/// - `NotFound`: no project with this id
pub fn project_history(project_id: &str, conn: &Connection) -> Result<Vec<ChangeRecord>> {
    with_boundary("project_history", Some(project_id), || {
        require_project(conn, project_id)?;
        SqliteRepo::list_transactions(conn, project_id)
    })
}

/// Feed stories related to a project or user id, oldest first
///
/// ## Errors
///
/// - `Persistence`: database error
pub fn project_feed(related_id: &str, conn: &Connection) -> Result<Vec<FeedStory>> {
    with_boundary("project_feed", None, || {
        tracing::debug!(related_id, "loading feed");
        SqliteRepo::list_stories_for(conn, related_id)
    })
}

fn edit(
    conn: &Connection,
    project: &mut Project,
    actor: &Actor,
    records: Vec<ChangeRecord>,
) -> Result<Vec<ChangeRecord>> {
    let mut backend = SqliteBackend::new(conn);
    let publisher = SqliteFeedPublisher::new(conn);
    let applied = ProjectEditor::new(&mut backend, &publisher)
        .with_actor(actor.clone())
        .apply_transactions(project, records)?;
    Ok(applied)
}
