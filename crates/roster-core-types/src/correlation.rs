//! Request correlation
//!
//! A `RequestId` is minted once per engine command and attached to both the
//! boundary log lines and any error the command returns, so a failed edit can
//! be matched with its log trail.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a single engine command invocation (UUIDv7, time-ordered)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique_and_time_ordered() {
        let first = RequestId::new();
        let second = RequestId::new();

        assert_ne!(first, second);
        assert!(first < second, "UUIDv7 ids should sort by creation time");
    }

    #[test]
    fn test_display_matches_inner_string() {
        let id = RequestId::from("req-1".to_string());
        assert_eq!(id.to_string(), "req-1");
        assert_eq!(id.as_str(), "req-1");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = RequestId::from("req-42".to_string());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"req-42\"");

        let back: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
