use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::RosterError;
use crate::slug;

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Archived => "archived",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProjectStatus::Active),
            "archived" => Ok(ProjectStatus::Archived),
            other => Err(RosterError::InvalidValue {
                kind: "status".to_string(),
                reason: format!("unknown project status '{}'", other),
            }),
        }
    }
}

/// Project - the aggregate a single editor invocation mutates
///
/// `id` stays `None` until the store saves the project for the first time.
/// Membership is not stored inline: it lives in the relationship store as
/// `project-member` edges, and `members` is only a cached view attached
/// while an edit loads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Option<String>,

    pub name: String,

    /// Normalised form of `name`; unique among all projects
    pub slug: String,

    pub status: ProjectStatus,

    /// Set once, to the acting user of the edit that first saves the project
    pub author_id: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(skip)]
    members: Option<Vec<String>>,
}

impl Project {
    /// A transient, unsaved project with an empty name
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name: String::new(),
            slug: slug::normalize(""),
            status: ProjectStatus::Active,
            author_id: None,
            created_at: now,
            updated_at: now,
            members: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Set the name and re-derive the slug from it
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.slug = slug::normalize(&self.name);
    }

    /// Attach a membership view loaded from the relationship store
    pub fn attach_members(&mut self, member_ids: Vec<String>) {
        self.members = Some(member_ids);
    }

    /// The attached membership view, if one was loaded
    pub fn members(&self) -> Option<&[String]> {
        self.members.as_deref()
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_is_unsaved_with_root_slug() {
        let project = Project::new();

        assert!(project.is_new());
        assert_eq!(project.slug, slug::ROOT_SLUG);
        assert_eq!(project.status, ProjectStatus::Active);
        assert!(project.members().is_none());
    }

    #[test]
    fn test_set_name_rederives_slug() {
        let mut project = Project::new();
        project.set_name("Release Engineering");

        assert_eq!(project.name, "Release Engineering");
        assert_eq!(project.slug, "release_engineering/");
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [ProjectStatus::Active, ProjectStatus::Archived] {
            assert_eq!(status.as_str().parse::<ProjectStatus>().unwrap(), status);
        }
        assert!("closed".parse::<ProjectStatus>().is_err());
    }
}
