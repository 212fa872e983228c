//! Canonical schema constants for structured logging
//!
//! Every lifecycle line carries `component`, `op` and `event`; the remaining
//! keys are attached where the operation knows them.

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Domain identifiers
pub const FIELD_PROJECT_ID: &str = "project_id";
pub const FIELD_ACTOR_ID: &str = "actor_id";
pub const FIELD_XACTION_KIND: &str = "xaction_kind";

// Batch sizes
pub const FIELD_XACTION_COUNT: &str = "xaction_count";
pub const FIELD_EFFECTIVE_COUNT: &str = "effective_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Lifecycle event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
