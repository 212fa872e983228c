//! In-process backend and publisher
//!
//! `InMemoryBackend` implements the full `ProjectBackend` contract against
//! plain collections: commits are staged on a copy and swapped in only when
//! every step succeeds, and both unique indexes (name, slug) are enforced at
//! commit time. It also carries fault injection hooks so tests can exercise
//! mid-commit failures and the duplicate-key race without a database.

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::commit::{CommitBatch, CommitOutcome, CommitReceipt};
use crate::edges::PROJECT_MEMBER;
use crate::errors::{ExError, ExErrorKind};
use crate::model::{Actor, ChangeRecord, FeedStory, Project};
use crate::ports::{EventPublisher, ProjectBackend, ProjectLookup, RelationshipStore};

type EdgeKey = (String, String);

#[derive(Debug, Clone, Default)]
struct State {
    projects: BTreeMap<String, Project>,
    edges: BTreeMap<EdgeKey, BTreeSet<String>>,
    transactions: Vec<ChangeRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: State,
    edge_failure: Option<ExError>,
    injected_outcome: Option<CommitOutcome>,
    blind_lookups: Cell<usize>,
    commit_calls: usize,
    edge_writes: usize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a project directly, bypassing the editor. Assigns an id if the
    /// project has none.
    pub fn insert_project(&mut self, mut project: Project) -> Project {
        let id = project
            .id
            .get_or_insert_with(|| Uuid::now_v7().to_string())
            .clone();
        self.state.projects.insert(id, project.clone());
        project
    }

    /// Replace a project's members directly
    pub fn seed_members<I, S>(&mut self, project_id: &str, member_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.edges.insert(
            (project_id.to_string(), PROJECT_MEMBER.to_string()),
            member_ids.into_iter().map(Into::into).collect(),
        );
    }

    /// Persisted records for one project, in commit order
    pub fn transactions(&self, project_id: &str) -> Vec<ChangeRecord> {
        self.state
            .transactions
            .iter()
            .filter(|r| r.project_id.as_deref() == Some(project_id))
            .cloned()
            .collect()
    }

    pub fn project_count(&self) -> usize {
        self.state.projects.len()
    }

    /// Number of `commit` calls, including failed ones
    pub fn commit_calls(&self) -> usize {
        self.commit_calls
    }

    /// Number of grouped edge edits attempted
    pub fn edge_writes(&self) -> usize {
        self.edge_writes
    }

    /// Make every following edge edit fail with `err`
    pub fn fail_edge_edits(&mut self, err: ExError) {
        self.edge_failure = Some(err);
    }

    /// Make the next `commit` return `outcome` without writing anything
    pub fn inject_commit_outcome(&mut self, outcome: CommitOutcome) {
        self.injected_outcome = Some(outcome);
    }

    /// Make the next `count` name lookups miss.
    ///
    /// Simulates another writer claiming a name between the editor's check
    /// and its commit.
    pub fn blind_lookups(&self, count: usize) {
        self.blind_lookups.set(count);
    }

    fn stage_edges(
        &mut self,
        state: &mut State,
        src: &str,
        edge_type: &str,
        adds: &BTreeSet<String>,
        removes: &BTreeSet<String>,
    ) -> Result<(), ExError> {
        self.edge_writes += 1;
        if let Some(err) = &self.edge_failure {
            return Err(err.clone());
        }
        let targets = state
            .edges
            .entry((src.to_string(), edge_type.to_string()))
            .or_default();
        for id in removes {
            targets.remove(id);
        }
        targets.extend(adds.iter().cloned());
        Ok(())
    }

    fn stage_commit(&mut self, batch: &CommitBatch<'_>) -> Result<CommitReceipt, CommitOutcome> {
        let mut staged = self.state.clone();
        let committed_at = Utc::now();

        let project_id = match &batch.project.id {
            Some(id) => id.clone(),
            None => Uuid::now_v7().to_string(),
        };

        let clash = staged.projects.values().find(|other| {
            other.id.as_deref() != Some(project_id.as_str())
                && (other.name == batch.project.name || other.slug == batch.project.slug)
        });
        if let Some(other) = clash {
            let column = if other.name == batch.project.name {
                "name"
            } else {
                "slug"
            };
            return Err(CommitOutcome::DuplicateKey(
                ExError::new(ExErrorKind::DuplicateKey)
                    .with_op("memory_commit")
                    .with_message(format!("UNIQUE constraint failed: projects.{}", column)),
            ));
        }

        let mut saved = batch.project.clone();
        saved.id = Some(project_id.clone());
        saved.updated_at = committed_at;
        if batch.is_new {
            saved.author_id = Some(batch.actor.id.clone());
        }
        staged.projects.insert(project_id.clone(), saved);

        if !batch.edges.is_empty() {
            self.stage_edges(
                &mut staged,
                &project_id,
                batch.edge_type,
                batch.edges.to_add(),
                batch.edges.to_remove(),
            )
            .map_err(CommitOutcome::Failed)?;
        }

        let mut record_ids = Vec::with_capacity(batch.records.len());
        for record in batch.records {
            let id = Uuid::now_v7().to_string();
            let mut stored = record.clone();
            stored.id = Some(id.clone());
            stored.project_id = Some(project_id.clone());
            stored.author_id = Some(batch.actor.id.clone());
            staged.transactions.push(stored);
            record_ids.push(id);
        }

        self.state = staged;
        Ok(CommitReceipt {
            project_id,
            record_ids,
            committed_at,
        })
    }
}

impl ProjectLookup for InMemoryBackend {
    fn find_by_name_or_slug(
        &self,
        name: &str,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<Project>, ExError> {
        let blind = self.blind_lookups.get();
        if blind > 0 {
            self.blind_lookups.set(blind - 1);
            return Ok(None);
        }
        Ok(self
            .state
            .projects
            .values()
            .find(|p| p.id.as_deref() != exclude_id && (p.name == name || p.slug == slug))
            .cloned())
    }

    fn load_project(&self, id: &str) -> Result<Option<Project>, ExError> {
        Ok(self.state.projects.get(id).cloned())
    }
}

impl RelationshipStore for InMemoryBackend {
    fn list_edges(&self, src: &str, edge_type: &str) -> Result<Vec<String>, ExError> {
        Ok(self
            .state
            .edges
            .get(&(src.to_string(), edge_type.to_string()))
            .map(|targets| targets.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn apply_edge_edits(
        &mut self,
        src: &str,
        edge_type: &str,
        adds: &BTreeSet<String>,
        removes: &BTreeSet<String>,
        _actor: &Actor,
    ) -> Result<(), ExError> {
        let mut staged = self.state.clone();
        self.stage_edges(&mut staged, src, edge_type, adds, removes)?;
        self.state = staged;
        Ok(())
    }
}

impl ProjectBackend for InMemoryBackend {
    fn commit(&mut self, batch: &CommitBatch<'_>) -> CommitOutcome {
        self.commit_calls += 1;
        if let Some(outcome) = self.injected_outcome.take() {
            return outcome;
        }
        match self.stage_commit(batch) {
            Ok(receipt) => CommitOutcome::Committed(receipt),
            Err(outcome) => outcome,
        }
    }
}

/// Publisher that keeps every story in memory
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    stories: Mutex<Vec<FeedStory>>,
    failure: Option<ExError>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose every `publish` call fails with `err`
    pub fn failing(err: ExError) -> Self {
        Self {
            stories: Mutex::default(),
            failure: Some(err),
        }
    }

    pub fn stories(&self) -> Vec<FeedStory> {
        self.stories.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, story: &FeedStory) -> Result<String, ExError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let mut stories = self.stories.lock().map_err(|_| {
            ExError::new(ExErrorKind::Publish)
                .with_op("memory_publish")
                .with_message("story log lock poisoned")
        })?;
        stories.push(story.clone());
        Ok(Uuid::now_v7().to_string())
    }
}
