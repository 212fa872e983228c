pub mod actor;
pub mod feed;
pub mod project;
pub mod transaction;

pub use actor::Actor;
pub use feed::{FeedStory, STORY_PROJECT};
pub use project::{Project, ProjectStatus};
pub use transaction::{ChangeRecord, TransactionKind, TransactionValue};
