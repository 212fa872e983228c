use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::project::ProjectStatus;
use crate::errors::{Result, RosterError};

/// Which project field a transaction targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Name,
    Status,
    Members,
}

impl TransactionKind {
    /// Stable wire/storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Name => "name",
            TransactionKind::Status => "status",
            TransactionKind::Members => "members",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = RosterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "name" => Ok(TransactionKind::Name),
            "status" => Ok(TransactionKind::Status),
            "members" => Ok(TransactionKind::Members),
            other => Err(RosterError::UnknownTransactionKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// Old or new value carried by a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TransactionValue {
    Text(String),
    Status(ProjectStatus),
    /// Member ids; normalised (non-empty, unique, sorted) once the editor has seen it
    Members(Vec<String>),
}

impl TransactionValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            TransactionValue::Text(text) => serde_json::Value::String(text.clone()),
            TransactionValue::Status(status) => serde_json::Value::String(status.as_str().into()),
            TransactionValue::Members(ids) => serde_json::Value::from(ids.clone()),
        }
    }

    /// Decode a stored value; the untagged JSON form is ambiguous without the kind.
    ///
    /// # Errors
    ///
    /// `InvalidValue` when the JSON shape does not match `kind`.
    pub fn from_json(kind: TransactionKind, value: &serde_json::Value) -> Result<Self> {
        let mismatch = || RosterError::InvalidValue {
            kind: kind.as_str().to_string(),
            reason: format!("unexpected stored value {}", value),
        };
        match kind {
            TransactionKind::Name => value
                .as_str()
                .map(|s| TransactionValue::Text(s.to_string()))
                .ok_or_else(mismatch),
            TransactionKind::Status => {
                let raw = value.as_str().ok_or_else(mismatch)?;
                Ok(TransactionValue::Status(raw.parse()?))
            }
            TransactionKind::Members => {
                let ids: Vec<String> =
                    serde_json::from_value(value.clone()).map_err(|_| mismatch())?;
                Ok(TransactionValue::Members(ids))
            }
        }
    }
}

/// One requested change to a project
///
/// Callers supply `kind` and `new_value`. The editor fills in `old_value`
/// (and may normalise `new_value`) before deciding whether the record has any
/// effect; the store fills in `id`, `author_id` and `project_id` when the
/// record is persisted as an audit row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    pub id: Option<String>,
    pub kind: TransactionKind,
    pub old_value: Option<TransactionValue>,
    pub new_value: TransactionValue,
    pub author_id: Option<String>,
    pub project_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChangeRecord {
    pub fn new(kind: TransactionKind, new_value: TransactionValue) -> Self {
        Self {
            id: None,
            kind,
            old_value: None,
            new_value,
            author_id: None,
            project_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self::new(TransactionKind::Name, TransactionValue::Text(name.into()))
    }

    pub fn set_status(status: ProjectStatus) -> Self {
        Self::new(TransactionKind::Status, TransactionValue::Status(status))
    }

    pub fn set_members<I, S>(member_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            TransactionKind::Members,
            TransactionValue::Members(member_ids.into_iter().map(Into::into).collect()),
        )
    }

    /// True when the populated old value differs from the new one.
    ///
    /// A record whose old value has not been populated yet always has effect.
    pub fn has_effect(&self) -> bool {
        self.old_value.as_ref() != Some(&self.new_value)
    }
}
