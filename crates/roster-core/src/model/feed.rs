use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::project::Project;
use super::transaction::{ChangeRecord, TransactionValue};
use crate::errors::{ExError, ExErrorKind, Result};

/// Story type for project transactions
pub const STORY_PROJECT: &str = "project";

/// A change event published to feed consumers after a successful commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedStory {
    pub story_type: String,

    /// `project_id`, `transaction_id`, `type`, `old`, `new`
    pub data: serde_json::Value,

    /// Ids whose feeds show this story: the project, then the author
    pub related_ids: Vec<String>,

    pub author_id: String,

    pub epoch: DateTime<Utc>,
}

impl FeedStory {
    /// Build the story for one committed transaction.
    ///
    /// # Errors
    ///
    /// `Internal` if the project or record has not been persisted yet.
    pub fn for_transaction(
        project: &Project,
        record: &ChangeRecord,
        epoch: DateTime<Utc>,
    ) -> Result<Self> {
        let (Some(project_id), Some(author_id)) = (&project.id, &record.author_id) else {
            return Err(ExError::new(ExErrorKind::Internal)
                .with_op("publish_story")
                .with_message("story requested for an uncommitted transaction")
                .into());
        };

        let data = serde_json::json!({
            "project_id": project_id,
            "transaction_id": record.id,
            "type": record.kind.as_str(),
            "old": record.old_value.as_ref().map(TransactionValue::to_json),
            "new": record.new_value.to_json(),
        });

        let mut related_ids = vec![project_id.clone()];
        if author_id != project_id {
            related_ids.push(author_id.clone());
        }

        Ok(Self {
            story_type: STORY_PROJECT.to_string(),
            data,
            related_ids,
            author_id: author_id.clone(),
            epoch,
        })
    }
}
