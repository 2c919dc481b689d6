//! Push-event reconciliation.
//!
//! The push channel delivers externally-originated changes with no ordering
//! guarantee relative to in-flight optimistic commands. Reconciliation
//! always treats freshly normalized server data as higher-priority than any
//! optimistic guess held for the same id: a new-package event upserts
//! directly, while update and assignment events trigger a full refresh:
//! an update event does not carry a complete delta vocabulary, and a
//! targeted merge could miss interdependent fields (a status change that
//! also clears a rejection reason, for instance).
//!
//! A channel that never delivers anything is valid; it costs responsiveness,
//! not correctness.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::client::WorkflowClient;
use crate::command::lock;
use crate::error::Result;
use crate::wire::{self, WireRecord};

/// An asynchronous event from the push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// A package was created elsewhere
    New { record: WireRecord },

    /// A package changed elsewhere
    Updated { record: WireRecord },

    /// A package was assigned to a manager
    Assigned {
        record: WireRecord,
        manager_id: String,
    },
}

/// Folds push events into the client's store.
pub struct SyncReconciler {
    client: Arc<WorkflowClient>,
}

impl SyncReconciler {
    pub fn new(client: Arc<WorkflowClient>) -> Self {
        Self { client }
    }

    /// Applies one event.
    ///
    /// `New` normalizes and upserts the carried record; the store's manager
    /// scoping makes the assigned-collection insert idempotent by id.
    /// `Updated` and `Assigned` refresh wholesale.
    pub async fn on_event(&self, event: PushEvent) -> Result<()> {
        match event {
            PushEvent::New { record } => {
                let normalized = wire::normalize(&record);
                debug!("push: new package {}", normalized.package.id);
                lock(self.client.store()).upsert(normalized.package);
                Ok(())
            }
            PushEvent::Updated { record } => {
                let id = record.id.as_ref().map(wire::WireScalar::to_text);
                debug!("push: package {id:?} updated, refreshing");
                self.client.refresh().await
            }
            PushEvent::Assigned { manager_id, .. } => {
                debug!("push: assignment to manager {manager_id}, refreshing");
                self.client.refresh().await
            }
        }
    }

    /// Drains the push channel until the sender side closes.
    ///
    /// A failed reconciliation is logged and skipped; the next event (or
    /// the next explicit refresh) supersedes whatever was missed.
    pub async fn run(self, mut receiver: mpsc::Receiver<PushEvent>) {
        while let Some(event) = receiver.recv().await {
            if let Err(error) = self.on_event(event).await {
                warn!("push reconciliation failed: {error}");
            }
        }
        debug!("push channel closed");
    }
}
