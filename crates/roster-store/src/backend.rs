//! `ProjectBackend` over a SQLite connection
//!
//! A commit runs inside one SQLite transaction: project row, edge edits,
//! then one row per effective record. Any error drops the transaction,
//! which rolls everything back.

use std::collections::BTreeSet;

use chrono::Utc;
use roster_core::commit::{CommitBatch, CommitOutcome, CommitReceipt};
use roster_core::errors::{ExError, ExErrorKind};
use roster_core::model::{Actor, Project};
use roster_core::ports::{ProjectBackend, ProjectLookup, RelationshipStore};
use rusqlite::Connection;
use uuid::Uuid;

use crate::errors::{from_rusqlite, Result};
use crate::repo::SqliteRepo;

/// Borrowing backend; the caller owns the connection and its lifetime
pub struct SqliteBackend<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteBackend<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }

    fn commit_tx(&self, batch: &CommitBatch<'_>) -> Result<CommitReceipt> {
        let tx = self.conn.unchecked_transaction().map_err(from_rusqlite)?;
        let committed_at = Utc::now();

        let project_id = match &batch.project.id {
            Some(id) => id.clone(),
            None => Uuid::now_v7().to_string(),
        };

        let mut saved = batch.project.clone();
        saved.updated_at = committed_at;
        if batch.is_new {
            saved.author_id = Some(batch.actor.id.clone());
        }
        SqliteRepo::persist_project_tx(&tx, &project_id, &saved)?;

        if !batch.edges.is_empty() {
            SqliteRepo::apply_edge_edits_tx(
                &tx,
                &project_id,
                batch.edge_type,
                batch.edges.to_add(),
                batch.edges.to_remove(),
                &batch.actor.id,
                committed_at,
            )?;
        }

        let mut record_ids = Vec::with_capacity(batch.records.len());
        for record in batch.records {
            let record_id = Uuid::now_v7().to_string();
            SqliteRepo::persist_transaction_tx(
                &tx,
                &record_id,
                &project_id,
                &batch.actor.id,
                record,
            )?;
            record_ids.push(record_id);
        }

        tx.commit().map_err(from_rusqlite)?;
        tracing::debug!(
            project_id = %project_id,
            is_new = batch.is_new,
            records = record_ids.len(),
            "sqlite commit"
        );

        Ok(CommitReceipt {
            project_id,
            record_ids,
            committed_at,
        })
    }
}

impl ProjectLookup for SqliteBackend<'_> {
    fn find_by_name_or_slug(
        &self,
        name: &str,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<Project>> {
        SqliteRepo::find_by_name_or_slug(self.conn, name, slug, exclude_id)
    }

    fn load_project(&self, id: &str) -> Result<Option<Project>> {
        SqliteRepo::get_project(self.conn, id)
    }
}

impl RelationshipStore for SqliteBackend<'_> {
    fn list_edges(&self, src: &str, edge_type: &str) -> Result<Vec<String>> {
        SqliteRepo::list_edges(self.conn, src, edge_type)
    }

    fn apply_edge_edits(
        &mut self,
        src: &str,
        edge_type: &str,
        adds: &BTreeSet<String>,
        removes: &BTreeSet<String>,
        actor: &Actor,
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction().map_err(from_rusqlite)?;
        SqliteRepo::apply_edge_edits_tx(&tx, src, edge_type, adds, removes, &actor.id, Utc::now())?;
        tx.commit().map_err(from_rusqlite)
    }
}

impl ProjectBackend for SqliteBackend<'_> {
    fn commit(&mut self, batch: &CommitBatch<'_>) -> CommitOutcome {
        match self.commit_tx(batch) {
            Ok(receipt) => CommitOutcome::Committed(receipt),
            Err(err) if err.kind() == ExErrorKind::DuplicateKey => {
                tracing::debug!(message = err.message(), "commit rejected by unique index");
                CommitOutcome::DuplicateKey(err)
            }
            Err(err) => CommitOutcome::Failed(err),
        }
    }
}

/// Surface a missing project as `NotFound`
pub fn require_project(conn: &Connection, project_id: &str) -> Result<Project> {
    SqliteRepo::get_project(conn, project_id)?.ok_or_else(|| {
        ExError::new(ExErrorKind::NotFound)
            .with_op("load_project")
            .with_entity_id(project_id)
            .with_message("Project not found")
    })
}
