use serde::{Deserialize, Serialize};

/// The user on whose behalf an edit runs
///
/// Stamped as author on new projects and on every persisted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
}

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
