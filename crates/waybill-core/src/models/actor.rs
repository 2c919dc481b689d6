//! The authenticated actor on whose behalf commands run.

use serde::{Deserialize, Serialize};

use super::UserRole;

/// Identity of the currently authenticated user, as supplied by the
/// authentication collaborator. The core never inspects credentials; it only
/// needs the id for stamping and scoping, and the role for authorization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
    /// Opaque user id, used for `*_by` stamps and manager scoping
    pub id: String,

    /// Display name, used when a human-readable stamp is preferred
    pub name: Option<String>,

    /// Role that gates workflow transitions
    pub role: UserRole,
}

impl Actor {
    /// Creates an actor with no display name.
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            name: None,
            role,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether this actor sees a manager-scoped view of the store.
    pub fn is_manager(&self) -> bool {
        self.role == UserRole::Manager
    }
}
