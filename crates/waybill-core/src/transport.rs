//! The request/response seam to the substrate.
//!
//! The core never talks HTTP directly; it issues verbs against this trait
//! and lets the embedding application supply the concrete client. The
//! bearer credential, retries, and timeouts all live behind the trait.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod memory;

/// Error returned by a transport implementation.
///
/// Carries the HTTP status when one was observed so callers can classify
/// failures; a missing status means the request never completed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    /// A failure with no observed HTTP status.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// A failure carrying the HTTP status the substrate answered with.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// A 404 for the given path.
    pub fn not_found(path: &str) -> Self {
        Self::with_status(404, format!("not found: {path}"))
    }

    /// Whether the substrate blamed the request rather than itself.
    pub fn is_client_error(&self) -> bool {
        self.status.is_some_and(|s| (400..500).contains(&s))
    }
}

/// Request/response primitive against the substrate.
///
/// Paths are substrate-relative (`/packages`, `/packages/{id}/status`);
/// bodies and responses are raw JSON. Implementations must surface non-2xx
/// answers as [`TransportError`] with the status filled in.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, TransportError>;

    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError>;

    async fn patch(&self, path: &str, body: Value) -> Result<Value, TransportError>;

    async fn put(&self, path: &str, body: Value) -> Result<Value, TransportError>;
}
