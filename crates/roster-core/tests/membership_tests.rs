//! Join / leave builder tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{ids, stored_project};
use roster_core::edges::PROJECT_MEMBER;
use roster_core::memory::{InMemoryBackend, RecordingPublisher};
use roster_core::{
    apply_join_project, apply_leave_project, Actor, RelationshipStore, TransactionValue,
};

#[test]
fn test_join_adds_actor() {
    let mut backend = InMemoryBackend::new();
    let mut project = stored_project(&mut backend, "Ops");
    let id = project.id.clone().unwrap();
    backend.seed_members(&id, ["u1"]);
    let publisher = RecordingPublisher::new();

    let applied =
        apply_join_project(&mut backend, &publisher, &mut project, &Actor::new("u2")).unwrap();

    assert_eq!(applied.len(), 1);
    assert_eq!(
        applied[0].new_value,
        TransactionValue::Members(ids(&["u1", "u2"]))
    );
    assert_eq!(
        backend.list_edges(&id, PROJECT_MEMBER).unwrap(),
        ids(&["u1", "u2"])
    );
    assert_eq!(project.members(), Some(&ids(&["u1", "u2"])[..]));
}

#[test]
fn test_join_twice_is_noop() {
    let mut backend = InMemoryBackend::new();
    let mut project = stored_project(&mut backend, "Ops");
    let publisher = RecordingPublisher::new();
    let actor = Actor::new("u1");

    apply_join_project(&mut backend, &publisher, &mut project, &actor).unwrap();
    let second = apply_join_project(&mut backend, &publisher, &mut project, &actor).unwrap();

    assert!(second.is_empty());
    assert_eq!(backend.commit_calls(), 1);
    assert_eq!(publisher.stories().len(), 1);
}

#[test]
fn test_leave_removes_only_actor() {
    let mut backend = InMemoryBackend::new();
    let mut project = stored_project(&mut backend, "Ops");
    let id = project.id.clone().unwrap();
    backend.seed_members(&id, ["u1", "u2", "u3"]);
    let publisher = RecordingPublisher::new();

    apply_leave_project(&mut backend, &publisher, &mut project, &Actor::new("u2")).unwrap();

    assert_eq!(
        backend.list_edges(&id, PROJECT_MEMBER).unwrap(),
        ids(&["u1", "u3"])
    );
    let stories = publisher.stories();
    assert_eq!(stories[0].data["old"], serde_json::json!(["u1", "u2", "u3"]));
    assert_eq!(stories[0].data["new"], serde_json::json!(["u1", "u3"]));
}

#[test]
fn test_leave_when_not_member_is_noop() {
    let mut backend = InMemoryBackend::new();
    let mut project = stored_project(&mut backend, "Ops");
    let publisher = RecordingPublisher::new();

    let applied =
        apply_leave_project(&mut backend, &publisher, &mut project, &Actor::new("u9")).unwrap();

    assert!(applied.is_empty());
    assert_eq!(backend.commit_calls(), 0);
}
