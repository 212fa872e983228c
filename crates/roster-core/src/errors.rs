use roster_core_types::RequestId;
use thiserror::Error;

/// Result type alias using RosterError
pub type Result<T> = std::result::Result<T, RosterError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (and tests) match on
/// instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Caller bugs
    Usage,
    UnknownTransactionKind,

    // Validation
    InvalidInput,
    InvalidName,
    NotFound,

    // Uniqueness
    NameCollision,
    /// The storage layer rejected a write on a unique index
    DuplicateKey,

    // Infrastructure
    Persistence,
    Publish,
    Serialization,
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Usage => "ERR_USAGE",
            ExErrorKind::UnknownTransactionKind => "ERR_UNKNOWN_TRANSACTION_KIND",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidName => "ERR_INVALID_NAME",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::NameCollision => "ERR_NAME_COLLISION",
            ExErrorKind::DuplicateKey => "ERR_DUPLICATE_KEY",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Publish => "ERR_PUBLISH",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Infrastructure collaborators (store, feed publisher) report failures with
/// this type. The editor never rewrites one; it either passes it through or
/// replaces it with a domain error after investigation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context (set by the engine boundary)
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for project edits
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RosterError {
    // ===== Usage Errors =====
    /// `apply_transactions` was called before an acting user was set
    #[error("Call with_actor() before applying transactions")]
    ActorNotSet,

    /// A record reached dispatch with a kind no handler is registered for
    #[error("Unknown transaction type '{kind}'")]
    UnknownTransactionKind { kind: String },

    // ===== Validation Errors =====
    /// A record's value does not fit its kind (e.g. a member list on a rename)
    #[error("Invalid {kind} value: {reason}")]
    InvalidValue { kind: String, reason: String },

    /// The name derives a degenerate slug
    #[error("{reason}")]
    InvalidName { reason: String },

    /// Genuine uniqueness collision with another project
    #[error(
        "Project names must be unique. The name '{name}' is too similar to the name of \
         another project, '{other_name}' (Project ID: {other_id}). Choose a unique name."
    )]
    NameCollision {
        name: String,
        other_id: String,
        other_name: String,
    },

    /// Project id does not resolve to a stored project
    #[error("Project not found: {project_id}")]
    ProjectNotFound { project_id: String },

    // ===== Generic Errors =====
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Opaque failure from the store or the feed publisher, passed through unchanged
    #[error(transparent)]
    Backend(#[from] ExError),
}

impl RosterError {
    /// The wrapped infrastructure error, if this is a pass-through failure
    pub fn backend(&self) -> Option<&ExError> {
        match self {
            RosterError::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RosterError> for ExError {
    fn from(err: RosterError) -> Self {
        let message = err.to_string();
        match err {
            RosterError::ActorNotSet => ExError::new(ExErrorKind::Usage)
                .with_op("apply_transactions")
                .with_message(message),

            RosterError::UnknownTransactionKind { .. } => {
                ExError::new(ExErrorKind::UnknownTransactionKind).with_message(message)
            }

            RosterError::InvalidValue { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            RosterError::InvalidName { .. } => {
                ExError::new(ExErrorKind::InvalidName).with_message(message)
            }

            RosterError::NameCollision { other_id, .. } => {
                ExError::new(ExErrorKind::NameCollision)
                    .with_entity_id(other_id)
                    .with_message(message)
            }

            RosterError::ProjectNotFound { project_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(project_id)
                .with_message("Project not found"),

            RosterError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            RosterError::Backend(inner) => inner,
        }
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(err: serde_json::Error) -> Self {
        RosterError::Serialization {
            message: err.to_string(),
        }
    }
}
