//! SQLite repository implementation
//!
//! Plain functions over a `Connection` (reads) or a `Transaction` (writes
//! that must land together). Timestamps are stored as unix milliseconds and
//! transaction values as JSON text.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use roster_core::errors::RosterError;
use roster_core::model::{
    ChangeRecord, FeedStory, Project, ProjectStatus, TransactionKind, TransactionValue,
};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};

use crate::errors::{corrupt_row, from_rusqlite, Result};

const PROJECT_COLUMNS: &str = "id, name, slug, status, author_id, created_at, updated_at";

/// SQLite repository for projects, transactions, edges and feed stories
pub struct SqliteRepo;

/// Raw `projects` row, decoded outside the rusqlite row callback
struct ProjectRow {
    id: String,
    name: String,
    slug: String,
    status: String,
    author_id: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl ProjectRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            status: row.get(3)?,
            author_id: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_project(self) -> Result<Project> {
        let status: ProjectStatus = self
            .status
            .parse()
            .map_err(|e| corrupt_row("projects", &self.id, e))?;
        let created_at = from_millis("projects", &self.id, self.created_at)?;
        let updated_at = from_millis("projects", &self.id, self.updated_at)?;

        let mut project = Project::new();
        project.id = Some(self.id);
        project.name = self.name;
        project.slug = self.slug;
        project.status = status;
        project.author_id = self.author_id;
        project.created_at = created_at;
        project.updated_at = updated_at;
        Ok(project)
    }
}

struct TransactionRow {
    id: String,
    project_id: String,
    kind: String,
    old_value: Option<String>,
    new_value: String,
    author_id: String,
    created_at: i64,
}

impl TransactionRow {
    fn into_record(self) -> Result<ChangeRecord> {
        let corrupt = |reason: String| corrupt_row("project_transactions", &self.id, reason);

        let kind: TransactionKind = self
            .kind
            .parse()
            .map_err(|e: RosterError| corrupt(e.to_string()))?;
        let decode = |raw: &str| -> Result<TransactionValue> {
            let json: serde_json::Value =
                serde_json::from_str(raw).map_err(|e| corrupt(e.to_string()))?;
            TransactionValue::from_json(kind, &json).map_err(|e| corrupt(e.to_string()))
        };

        let old_value = self.old_value.as_deref().map(&decode).transpose()?;
        let new_value = decode(&self.new_value)?;

        let mut record = ChangeRecord::new(kind, new_value);
        record.old_value = old_value;
        record.author_id = Some(self.author_id);
        record.project_id = Some(self.project_id);
        record.created_at = from_millis("project_transactions", &self.id, self.created_at)?;
        record.id = Some(self.id);
        Ok(record)
    }
}

fn from_millis(table: &str, id: &str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| corrupt_row(table, id, format!("timestamp {} out of range", millis)))
}

impl SqliteRepo {
    /// Insert or update a project within a transaction
    pub fn persist_project_tx(tx: &Transaction, project_id: &str, project: &Project) -> Result<()> {
        tx.execute(
            "INSERT INTO projects (id, name, slug, status, author_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                slug = excluded.slug,
                status = excluded.status,
                updated_at = excluded.updated_at",
            rusqlite::params![
                project_id,
                project.name,
                project.slug,
                project.status.as_str(),
                project.author_id,
                project.created_at.timestamp_millis(),
                project.updated_at.timestamp_millis(),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// Get a project by id
    pub fn get_project(conn: &Connection, project_id: &str) -> Result<Option<Project>> {
        let sql = format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS);
        conn.query_row(&sql, [project_id], ProjectRow::read)
            .optional()
            .map_err(from_rusqlite)?
            .map(ProjectRow::into_project)
            .transpose()
    }

    /// Any project other than `exclude_id` with this name or slug
    pub fn find_by_name_or_slug(
        conn: &Connection,
        name: &str,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<Project>> {
        let sql = format!(
            "SELECT {} FROM projects
             WHERE (name = ?1 OR slug = ?2) AND (?3 IS NULL OR id <> ?3)
             ORDER BY id LIMIT 1",
            PROJECT_COLUMNS
        );
        conn.query_row(&sql, rusqlite::params![name, slug, exclude_id], ProjectRow::read)
            .optional()
            .map_err(from_rusqlite)?
            .map(ProjectRow::into_project)
            .transpose()
    }

    /// Persist one effective transaction within a transaction
    pub fn persist_transaction_tx(
        tx: &Transaction,
        record_id: &str,
        project_id: &str,
        author_id: &str,
        record: &ChangeRecord,
    ) -> Result<()> {
        let old_value = record
            .old_value
            .as_ref()
            .map(|v| v.to_json().to_string());

        tx.execute(
            "INSERT INTO project_transactions
                (id, project_id, kind, old_value, new_value, author_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                record_id,
                project_id,
                record.kind.as_str(),
                old_value,
                record.new_value.to_json().to_string(),
                author_id,
                record.created_at.timestamp_millis(),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(())
    }

    /// All transactions of a project, in commit order
    pub fn list_transactions(conn: &Connection, project_id: &str) -> Result<Vec<ChangeRecord>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, project_id, kind, old_value, new_value, author_id, created_at
                 FROM project_transactions WHERE project_id = ?1 ORDER BY seq",
            )
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([project_id], |row| {
                Ok(TransactionRow {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    kind: row.get(2)?,
                    old_value: row.get(3)?,
                    new_value: row.get(4)?,
                    author_id: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        rows.into_iter().map(TransactionRow::into_record).collect()
    }

    /// Edge targets from `src`, sorted
    pub fn list_edges(conn: &Connection, src: &str, edge_type: &str) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT dst FROM edges WHERE src = ?1 AND edge_type = ?2 ORDER BY dst")
            .map_err(from_rusqlite)?;

        let targets = stmt
            .query_map([src, edge_type], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(from_rusqlite)?;

        Ok(targets)
    }

    /// Remove then add edges from `src` within a transaction
    pub fn apply_edge_edits_tx(
        tx: &Transaction,
        src: &str,
        edge_type: &str,
        adds: &BTreeSet<String>,
        removes: &BTreeSet<String>,
        author_id: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        for dst in removes {
            tx.execute(
                "DELETE FROM edges WHERE src = ?1 AND edge_type = ?2 AND dst = ?3",
                [src, edge_type, dst.as_str()],
            )
            .map_err(from_rusqlite)?;
        }

        for dst in adds {
            tx.execute(
                "INSERT INTO edges (src, edge_type, dst, author_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(src, edge_type, dst) DO NOTHING",
                rusqlite::params![src, edge_type, dst, author_id, at.timestamp_millis()],
            )
            .map_err(from_rusqlite)?;
        }

        Ok(())
    }

    /// Persist a story and its related ids within a transaction
    pub fn persist_story_tx(tx: &Transaction, story_id: &str, story: &FeedStory) -> Result<()> {
        tx.execute(
            "INSERT INTO feed_stories (id, story_type, data, author_id, epoch)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                story_id,
                story.story_type,
                story.data.to_string(),
                story.author_id,
                story.epoch.timestamp_millis(),
            ],
        )
        .map_err(from_rusqlite)?;

        for related_id in &story.related_ids {
            tx.execute(
                "INSERT INTO feed_story_refs (story_id, related_id) VALUES (?1, ?2)
                 ON CONFLICT(story_id, related_id) DO NOTHING",
                [story_id, related_id.as_str()],
            )
            .map_err(from_rusqlite)?;
        }

        Ok(())
    }

    /// Stories whose related ids include `related_id`, oldest first
    pub fn list_stories_for(conn: &Connection, related_id: &str) -> Result<Vec<FeedStory>> {
        let mut stmt = conn
            .prepare(
                "SELECT s.id, s.story_type, s.data, s.author_id, s.epoch
                 FROM feed_stories s
                 JOIN feed_story_refs r ON r.story_id = s.id
                 WHERE r.related_id = ?1
                 ORDER BY s.seq",
            )
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([related_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        let mut stories = Vec::with_capacity(rows.len());
        for (id, story_type, data, author_id, epoch) in rows {
            let data: serde_json::Value =
                serde_json::from_str(&data).map_err(|e| corrupt_row("feed_stories", &id, e))?;
            let related_ids = Self::list_story_refs(conn, &id)?;
            stories.push(FeedStory {
                story_type,
                data,
                related_ids,
                author_id,
                epoch: from_millis("feed_stories", &id, epoch)?,
            });
        }

        Ok(stories)
    }

    /// Related ids of one story, in insertion order
    fn list_story_refs(conn: &Connection, story_id: &str) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT related_id FROM feed_story_refs WHERE story_id = ?1 ORDER BY rowid")
            .map_err(from_rusqlite)?;

        let ids = stmt
            .query_map([story_id], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(from_rusqlite)?;

        Ok(ids)
    }
}
