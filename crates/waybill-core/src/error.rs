//! Error types for the workflow library.

use thiserror::Error;

use crate::models::{EffectiveStatus, UserRole};
use crate::transport::TransportError;

/// Comprehensive error type for all workflow operations.
///
/// Validation errors (`IllegalTransition`, `Unauthorized`,
/// `PreconditionFailed`, `NotFound`) are raised before any store mutation;
/// `RemoteFailure` is raised after an optimistic write and always follows a
/// rollback. Nothing here is fatal to the process.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Requested status change is not reachable from the current state
    #[error("cannot {action} a package in status '{from}'")]
    IllegalTransition {
        from: EffectiveStatus,
        action: &'static str,
    },

    /// Actor role may not perform the requested edge
    #[error("role '{role}' is not allowed to {action}")]
    Unauthorized {
        action: &'static str,
        role: UserRole,
    },

    /// A required field is missing or empty
    #[error("precondition failed for '{field}': {reason}")]
    PreconditionFailed { field: String, reason: String },

    /// The substrate rejected the authoritative call; the optimistic write
    /// has already been rolled back by the time this surfaces
    #[error("remote call failed: {message}")]
    RemoteFailure {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<TransportError>,
    },

    /// Mutating operation referenced an id absent from the store
    #[error("package '{id}' is not present in the store")]
    NotFound { id: String },

    /// Wire payload could not be decoded at all
    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

/// Builder for precondition errors with a field and reason.
pub struct PreconditionBuilder {
    field: String,
}

impl PreconditionBuilder {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> WorkflowError {
        WorkflowError::PreconditionFailed {
            field: self.field,
            reason: reason.into(),
        }
    }
}

/// Builder for remote failures with optional HTTP status context.
pub struct RemoteFailureBuilder {
    message: String,
}

impl RemoteFailureBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error from the underlying transport error.
    pub fn with_source(self, source: TransportError) -> WorkflowError {
        WorkflowError::RemoteFailure {
            message: self.message,
            status: source.status,
            source: Some(source),
        }
    }
}

impl WorkflowError {
    /// Creates a builder for precondition errors.
    pub fn precondition(field: impl Into<String>) -> PreconditionBuilder {
        PreconditionBuilder::new(field)
    }

    /// Creates a builder for remote failures.
    pub fn remote(message: impl Into<String>) -> RemoteFailureBuilder {
        RemoteFailureBuilder::new(message)
    }

    /// Creates a not-found error for the given package id.
    pub fn not_found(id: impl Into<String>) -> Self {
        WorkflowError::NotFound { id: id.into() }
    }

    /// Whether this error was raised before any store mutation.
    ///
    /// Local validation failures leave the store untouched; a remote
    /// failure means an optimistic write happened and was rolled back.
    pub fn is_local(&self) -> bool {
        !matches!(self, WorkflowError::RemoteFailure { .. })
    }
}

/// Extension trait for mapping transport results into workflow errors with
/// a message for context.
pub trait TransportResultExt<T> {
    /// Map transport errors with a message.
    fn remote_context(self, message: &str) -> Result<T>;
}

impl<T> TransportResultExt<T> for std::result::Result<T, TransportError> {
    fn remote_context(self, message: &str) -> Result<T> {
        self.map_err(|e| WorkflowError::remote(message).with_source(e))
    }
}

/// Result type alias for workflow operations
pub type Result<T> = std::result::Result<T, WorkflowError>;
