//! Feed story persistence

use roster_core::errors::ExError;
use roster_core::model::FeedStory;
use roster_core::ports::EventPublisher;
use rusqlite::Connection;
use uuid::Uuid;

use crate::errors::from_rusqlite;
use crate::repo::SqliteRepo;

/// Publishes stories into the `feed_stories` table
pub struct SqliteFeedPublisher<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteFeedPublisher<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl EventPublisher for SqliteFeedPublisher<'_> {
    fn publish(&self, story: &FeedStory) -> Result<String, ExError> {
        let story_id = Uuid::now_v7().to_string();
        let tx = self.conn.unchecked_transaction().map_err(from_rusqlite)?;
        SqliteRepo::persist_story_tx(&tx, &story_id, story)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(story_id)
    }
}
