//! Membership edge diffing
//!
//! Membership is stored as directed `project --project-member--> user` edges
//! in the relationship store. An edit never rewrites the whole member list;
//! it computes which edges to add and which to remove.

use std::collections::BTreeSet;

/// Edge type linking a project to each of its members
pub const PROJECT_MEMBER: &str = "project-member";

/// Edge edits accumulated over one editor invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeDiff {
    to_add: BTreeSet<String>,
    to_remove: BTreeSet<String>,
}

impl EdgeDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record's additions and removals into the diff.
    ///
    /// A later decision about a target overrides an earlier one, so a target
    /// never ends up in both sets.
    pub fn merge(&mut self, added: BTreeSet<String>, removed: BTreeSet<String>) {
        for id in added {
            self.to_remove.remove(&id);
            self.to_add.insert(id);
        }
        for id in removed {
            self.to_add.remove(&id);
            self.to_remove.insert(id);
        }
    }

    pub fn to_add(&self) -> &BTreeSet<String> {
        &self.to_add
    }

    pub fn to_remove(&self) -> &BTreeSet<String> {
        &self.to_remove
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Apply the diff to a member list, returning the sorted result
    pub fn apply_to(&self, members: &[String]) -> Vec<String> {
        let mut set: BTreeSet<String> = members.iter().cloned().collect();
        for id in &self.to_remove {
            set.remove(id);
        }
        set.extend(self.to_add.iter().cloned());
        set.into_iter().collect()
    }
}

/// Split a membership change into `(added, removed)` by identifier
pub fn diff_members(old: &[String], new: &[String]) -> (BTreeSet<String>, BTreeSet<String>) {
    let old: BTreeSet<&String> = old.iter().collect();
    let new: BTreeSet<&String> = new.iter().collect();

    let added = new.difference(&old).map(|s| (*s).clone()).collect();
    let removed = old.difference(&new).map(|s| (*s).clone()).collect();
    (added, removed)
}

/// Normalise a requested member list: drop empty ids, deduplicate, sort.
///
/// Sorting makes the comparison against the stored membership independent of
/// the order the caller listed members in.
pub fn normalize_members(member_ids: &[String]) -> Vec<String> {
    member_ids
        .iter()
        .filter(|id| !id.is_empty())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
