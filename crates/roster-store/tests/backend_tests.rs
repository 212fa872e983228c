//! SqliteBackend integration tests
//!
//! ## Scenarios Covered
//!
//! 1. Editor round trip: project, members, history and feed all persisted
//! 2. Atomicity: an edge failure mid-commit rolls back the whole edit
//! 3. Uniqueness enforced by the database's own indexes
//! 4. Duplicate-key race: re-validation decides between conflict and the
//!    original storage error
//! 5. Direct edge edits: removals before additions, all-or-nothing

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::cell::Cell;
use std::collections::BTreeSet;

use roster_core::commit::{CommitBatch, CommitOutcome};
use roster_core::edges::PROJECT_MEMBER;
use roster_core::{
    Actor, ChangeRecord, ExError, ExErrorKind, Project, ProjectBackend, ProjectEditor,
    ProjectLookup, ProjectStatus, RelationshipStore, RosterError,
};
use roster_store::repo::SqliteRepo;
use roster_store::{SqliteBackend, SqliteFeedPublisher};
use rusqlite::Connection;
use tempfile::TempDir;

fn setup_test_db() -> (TempDir, Connection) {
    let dir = TempDir::new().unwrap();
    let mut conn = Connection::open(dir.path().join("roster.db")).unwrap();
    roster_store::migrations::apply_migrations(&mut conn).unwrap();
    (dir, conn)
}

fn apply(
    conn: &Connection,
    project: &mut Project,
    actor: &str,
    records: Vec<ChangeRecord>,
) -> roster_core::Result<Vec<ChangeRecord>> {
    let mut backend = SqliteBackend::new(conn);
    let publisher = SqliteFeedPublisher::new(conn);
    ProjectEditor::new(&mut backend, &publisher)
        .with_actor(Actor::new(actor))
        .apply_transactions(project, records)
}

fn create(conn: &Connection, name: &str) -> Project {
    let mut project = Project::new();
    apply(conn, &mut project, "author", vec![ChangeRecord::rename(name)]).unwrap();
    project
}

#[test]
fn test_editor_round_trip() {
    let (_dir, conn) = setup_test_db();
    let mut project = Project::new();

    let applied = apply(
        &conn,
        &mut project,
        "author",
        vec![
            ChangeRecord::rename("Release Engineering"),
            ChangeRecord::set_members(["u2", "u1", ""]),
        ],
    )
    .unwrap();

    let id = project.id.clone().unwrap();
    let stored = SqliteRepo::get_project(&conn, &id).unwrap().unwrap();
    assert_eq!(stored.name, "Release Engineering");
    assert_eq!(stored.slug, "release_engineering/");
    assert_eq!(stored.author_id.as_deref(), Some("author"));

    assert_eq!(
        SqliteRepo::list_edges(&conn, &id, PROJECT_MEMBER).unwrap(),
        vec!["u1".to_string(), "u2".to_string()]
    );

    let history = SqliteRepo::list_transactions(&conn, &id).unwrap();
    assert_eq!(history.len(), 2);
    for (stored, returned) in history.iter().zip(&applied) {
        assert_eq!(stored.id, returned.id);
        assert_eq!(stored.kind, returned.kind);
        assert_eq!(stored.old_value, returned.old_value);
        assert_eq!(stored.new_value, returned.new_value);
    }

    let feed = SqliteRepo::list_stories_for(&conn, &id).unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].data["type"], "name");
    assert_eq!(feed[1].data["type"], "members");
    assert_eq!(feed[1].related_ids, vec![id.clone(), "author".to_string()]);

    // The author's feed shows the same stories
    assert_eq!(SqliteRepo::list_stories_for(&conn, "author").unwrap().len(), 2);
}

#[test]
fn test_second_edit_updates_in_place() {
    let (_dir, conn) = setup_test_db();
    let mut project = create(&conn, "Ops");
    let id = project.id.clone().unwrap();

    apply(
        &conn,
        &mut project,
        "u1",
        vec![ChangeRecord::set_status(ProjectStatus::Archived)],
    )
    .unwrap();

    let stored = SqliteRepo::get_project(&conn, &id).unwrap().unwrap();
    assert_eq!(stored.status, ProjectStatus::Archived);
    assert_eq!(stored.author_id.as_deref(), Some("author"));
    assert_eq!(SqliteRepo::list_transactions(&conn, &id).unwrap().len(), 2);
}

#[test]
fn test_edge_failure_rolls_back_everything() {
    // GIVEN a stored project and an edge table that rejects inserts
    let (_dir, conn) = setup_test_db();
    let mut project = create(&conn, "Ops");
    let id = project.id.clone().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER fail_edge_insert BEFORE INSERT ON edges
         BEGIN SELECT RAISE(ABORT, 'edge store unavailable'); END;",
    )
    .unwrap();

    // WHEN a batch renames and adds a member
    let err = apply(
        &conn,
        &mut project,
        "u1",
        vec![
            ChangeRecord::rename("Platform"),
            ChangeRecord::set_members(["u1"]),
        ],
    )
    .unwrap_err();

    // THEN the failure is reported as a plain persistence error
    let backend_err = err.backend().expect("storage failure passes through");
    assert_eq!(backend_err.kind(), ExErrorKind::Persistence);
    assert!(backend_err.message().contains("edge store unavailable"));

    // AND a fresh reload shows nothing changed
    let stored = SqliteRepo::get_project(&conn, &id).unwrap().unwrap();
    assert_eq!(stored.name, "Ops");
    assert_eq!(SqliteRepo::list_transactions(&conn, &id).unwrap().len(), 1);
    assert!(SqliteRepo::list_edges(&conn, &id, PROJECT_MEMBER)
        .unwrap()
        .is_empty());
    assert_eq!(SqliteRepo::list_stories_for(&conn, &id).unwrap().len(), 1);
}

#[test]
fn test_direct_edge_edit_removes_then_adds() {
    let (_dir, conn) = setup_test_db();
    let mut project = create(&conn, "Ops");
    apply(&conn, &mut project, "u1", vec![ChangeRecord::set_members(["A", "B"])]).unwrap();
    let id = project.id.clone().unwrap();

    let mut backend = SqliteBackend::new(&conn);
    let adds: BTreeSet<String> = ["B".to_string(), "C".to_string()].into();
    let removes: BTreeSet<String> = ["A".to_string(), "B".to_string()].into();
    backend
        .apply_edge_edits(&id, PROJECT_MEMBER, &adds, &removes, &Actor::new("u1"))
        .unwrap();

    // B is removed and re-added, so it survives
    assert_eq!(
        backend.list_edges(&id, PROJECT_MEMBER).unwrap(),
        vec!["B".to_string(), "C".to_string()]
    );
}

#[test]
fn test_direct_edge_edit_is_atomic() {
    // GIVEN a stored member and an edge table that rejects one target
    let (_dir, conn) = setup_test_db();
    let mut project = create(&conn, "Ops");
    apply(&conn, &mut project, "u1", vec![ChangeRecord::set_members(["A"])]).unwrap();
    let id = project.id.clone().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER fail_bad_edge BEFORE INSERT ON edges WHEN NEW.dst = 'bad'
         BEGIN SELECT RAISE(ABORT, 'rejected target'); END;",
    )
    .unwrap();

    // WHEN one edit removes A and adds a rejected target
    let mut backend = SqliteBackend::new(&conn);
    let adds: BTreeSet<String> = ["bad".to_string()].into();
    let removes: BTreeSet<String> = ["A".to_string()].into();
    let err = backend
        .apply_edge_edits(&id, PROJECT_MEMBER, &adds, &removes, &Actor::new("u1"))
        .unwrap_err();

    // THEN the removal was rolled back with the failed insert
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(
        SqliteRepo::list_edges(&conn, &id, PROJECT_MEMBER).unwrap(),
        vec!["A".to_string()]
    );
}

#[test]
fn test_rename_collision_against_stored_project() {
    let (_dir, conn) = setup_test_db();
    let first = create(&conn, "Ops");
    let mut second = create(&conn, "Platform");

    let err = apply(&conn, &mut second, "u1", vec![ChangeRecord::rename("OPS")]).unwrap_err();

    assert_eq!(
        err,
        RosterError::NameCollision {
            name: "OPS".to_string(),
            other_id: first.id.clone().unwrap(),
            other_name: "Ops".to_string(),
        }
    );
}

#[test]
fn test_unique_index_rejects_direct_commit() {
    let (_dir, conn) = setup_test_db();
    create(&conn, "Ops");

    let mut duplicate = Project::new();
    duplicate.set_name("ops");
    let actor = Actor::new("u1");
    let edges = Default::default();
    let outcome = SqliteBackend::new(&conn).commit(&CommitBatch {
        project: &duplicate,
        is_new: true,
        actor: &actor,
        edge_type: PROJECT_MEMBER,
        edges: &edges,
        records: &[],
    });

    match outcome {
        CommitOutcome::DuplicateKey(err) => {
            assert_eq!(err.code(), "ERR_DUPLICATE_KEY");
            assert!(err.message().contains("projects.slug"));
        }
        other => panic!("expected duplicate key, got {:?}", other),
    }
}

/// Backend whose first `blind` name lookups miss, as if another writer
/// committed between our check and our commit.
struct RacingBackend<'c> {
    inner: SqliteBackend<'c>,
    blind: Cell<usize>,
}

impl ProjectLookup for RacingBackend<'_> {
    fn find_by_name_or_slug(
        &self,
        name: &str,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<Project>, ExError> {
        if self.blind.get() > 0 {
            self.blind.set(self.blind.get() - 1);
            return Ok(None);
        }
        self.inner.find_by_name_or_slug(name, slug, exclude_id)
    }

    fn load_project(&self, id: &str) -> Result<Option<Project>, ExError> {
        self.inner.load_project(id)
    }
}

impl RelationshipStore for RacingBackend<'_> {
    fn list_edges(&self, src: &str, edge_type: &str) -> Result<Vec<String>, ExError> {
        self.inner.list_edges(src, edge_type)
    }

    fn apply_edge_edits(
        &mut self,
        src: &str,
        edge_type: &str,
        adds: &BTreeSet<String>,
        removes: &BTreeSet<String>,
        actor: &Actor,
    ) -> Result<(), ExError> {
        self.inner
            .apply_edge_edits(src, edge_type, adds, removes, actor)
    }
}

impl ProjectBackend for RacingBackend<'_> {
    fn commit(&mut self, batch: &CommitBatch<'_>) -> CommitOutcome {
        self.inner.commit(batch)
    }
}

#[test]
fn test_lost_race_is_reported_as_collision() {
    let (_dir, conn) = setup_test_db();
    let first = create(&conn, "Ops");

    let mut backend = RacingBackend {
        inner: SqliteBackend::new(&conn),
        blind: Cell::new(1),
    };
    let publisher = SqliteFeedPublisher::new(&conn);
    let mut project = Project::new();

    let err = ProjectEditor::new(&mut backend, &publisher)
        .with_actor(Actor::new("u1"))
        .apply_transactions(&mut project, vec![ChangeRecord::rename("Ops")])
        .unwrap_err();

    assert!(matches!(
        err,
        RosterError::NameCollision { ref other_id, .. } if Some(other_id) == first.id.as_ref()
    ));
    assert!(project.id.is_none(), "nothing was committed");
}

#[test]
fn test_duplicate_key_without_collision_keeps_original_error() {
    // GIVEN an extra unique index unrelated to names
    let (_dir, conn) = setup_test_db();
    let mut project = create(&conn, "Ops");
    conn.execute_batch(
        "CREATE UNIQUE INDEX one_kind_per_project ON project_transactions(project_id, kind)",
    )
    .unwrap();

    // WHEN a second rename is recorded for the same project
    let err = apply(&conn, &mut project, "u1", vec![ChangeRecord::rename("Platform")])
        .unwrap_err();

    // THEN re-validation finds no name collision and the storage error stands
    let backend_err = err.backend().expect("original error is passed through");
    assert_eq!(backend_err.kind(), ExErrorKind::DuplicateKey);
    assert!(backend_err.message().contains("project_transactions"));

    // AND the rename was rolled back with it
    let id = project.id.clone().unwrap();
    assert_eq!(SqliteRepo::get_project(&conn, &id).unwrap().unwrap().name, "Ops");
}
