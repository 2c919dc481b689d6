//! High-level workflow API.
//!
//! [`WorkflowClient`] is the facade the embedding application talks to: it
//! owns the [`PackageStore`], authorizes transitions as the configured
//! actor, and drives every mutation through the optimistic command
//! protocol. Reads are served synchronously from the store; mutations
//! suspend only on the remote call.

use std::sync::{Arc, Mutex};

use log::{debug, info};
use serde_json::json;

use crate::command::{self, lock};
use crate::error::{Result, TransportResultExt, WorkflowError};
use crate::models::{
    Actor, EffectiveStatus, ManagerSummary, Package, PackageDelta, PackageFilter, ReturnStatus,
    SubmitPackage,
};
use crate::store::PackageStore;
use crate::transition::Action;
use crate::transport::Transport;
use crate::wire;

/// Builder for creating and configuring [`WorkflowClient`] instances.
pub struct WorkflowClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    actor: Option<Actor>,
}

impl WorkflowClientBuilder {
    /// Creates a new builder with nothing configured.
    pub fn new() -> Self {
        Self {
            transport: None,
            actor: None,
        }
    }

    /// Sets the transport the client will issue remote calls through.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the authenticated actor commands run as.
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Builds the configured client. A manager actor gets a store scoped to
    /// their own assignments.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::PreconditionFailed` if the transport or
    /// actor is missing.
    pub fn build(self) -> Result<WorkflowClient> {
        let transport = self.transport.ok_or_else(|| {
            WorkflowError::precondition("transport").with_reason("a transport must be configured")
        })?;
        let actor = self.actor.ok_or_else(|| {
            WorkflowError::precondition("actor").with_reason("an actor must be configured")
        })?;

        let store = if actor.is_manager() {
            PackageStore::for_manager(actor.id.clone())
        } else {
            PackageStore::new()
        };

        Ok(WorkflowClient {
            transport,
            actor,
            store: Mutex::new(store),
        })
    }
}

impl Default for WorkflowClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The client-resident projection of server state and the operations that
/// keep it correct.
pub struct WorkflowClient {
    transport: Arc<dyn Transport>,
    actor: Actor,
    store: Mutex<PackageStore>,
}

impl WorkflowClient {
    /// The actor this client runs as.
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub(crate) fn store(&self) -> &Mutex<PackageStore> {
        &self.store
    }

    /// Full refresh: replaces the store wholesale with the substrate's
    /// current listing.
    pub async fn refresh(&self) -> Result<()> {
        let listing = self
            .transport
            .get("/packages")
            .await
            .remote_context("refreshing packages")?;
        let records = wire::records_from_array(listing)?;

        let mut conflicts = 0;
        let packages: Vec<Package> = records
            .iter()
            .map(|record| {
                let normalized = wire::normalize(record);
                conflicts += normalized.conflicts.len();
                normalized.package
            })
            .collect();
        if conflicts > 0 {
            info!("refresh normalized {} packages with {conflicts} field conflicts", packages.len());
        } else {
            debug!("refresh normalized {} packages", packages.len());
        }

        lock(&self.store).load(packages);
        Ok(())
    }

    /// Submits a new package.
    ///
    /// There is no optimistic phase here: the record has no identity until
    /// the substrate assigns one. The authoritative response is normalized
    /// and prepended to the store.
    pub async fn submit_package(&self, request: &SubmitPackage) -> Result<Package> {
        request.validate()?;

        let response = self
            .transport
            .post("/packages", request.to_body(&self.actor))
            .await
            .remote_context("submitting package")?;
        let record = wire::record_from_response(response)?;
        let normalized = wire::normalize(&record);

        let package = normalized.package.clone();
        lock(&self.store).upsert(normalized.package);
        info!("submitted package {}", package.id);
        Ok(package)
    }

    /// Requests a status transition as an optimistic command.
    ///
    /// The target status picks the workflow action: `approved` and
    /// `rejected` are manager edges (for a rejection, `notes` carries the
    /// mandatory reason), `submitted` resubmits a rejected package, and
    /// `dispatched` is the security edge. A `returned` target must go
    /// through [`WorkflowClient::update_return_status`] instead, because a
    /// return needs to name who brought the package back.
    pub async fn update_status(
        &self,
        id: &str,
        target: EffectiveStatus,
        notes: Option<String>,
    ) -> Result<Package> {
        let action = match target {
            EffectiveStatus::Approved => Action::Approve {
                notes: notes.clone(),
            },
            EffectiveStatus::Rejected => Action::Reject {
                reason: notes.clone().unwrap_or_default(),
            },
            EffectiveStatus::Submitted => Action::Resubmit,
            EffectiveStatus::Dispatched => Action::Dispatch {
                notes: notes.clone(),
            },
            EffectiveStatus::Returned => {
                return Err(WorkflowError::precondition("returned_by")
                    .with_reason("a return is recorded with update_return_status"));
            }
        };

        let mut body = json!({ "status": target.as_str() });
        if let Some(notes) = &notes {
            body["notes"] = json!(notes);
        }

        command::execute(
            &self.store,
            id,
            &action,
            &self.actor,
            self.transport.patch(&format!("/packages/{id}/status"), body),
        )
        .await
    }

    /// Updates the return sub-state of a returnable package.
    ///
    /// A `returned` target runs the record-return transition; `pending` and
    /// `overdue` are bookkeeping patches on the sub-state, still gated on
    /// the package being returnable. The core never *infers* `overdue` from
    /// a past-due date; it only stores what is explicitly recorded.
    pub async fn update_return_status(
        &self,
        id: &str,
        status: ReturnStatus,
        returned_by: Option<String>,
        notes: Option<String>,
        when: Option<jiff::Timestamp>,
    ) -> Result<Package> {
        let mut body = json!({ "returnStatus": status.as_str() });
        if let Some(returned_by) = &returned_by {
            body["returnedBy"] = json!(returned_by);
        }
        if let Some(notes) = &notes {
            body["returnNotes"] = json!(notes);
        }
        if let Some(when) = when {
            body["returnedAt"] = json!(when.to_string());
        }
        let path = format!("/packages/{id}/return");
        let remote = self.transport.put(&path, body);

        if status == ReturnStatus::Returned {
            let action = Action::RecordReturn {
                returned_by: returned_by.unwrap_or_default(),
                notes,
                returned_at: when,
            };
            return command::execute(&self.store, id, &action, &self.actor, remote).await;
        }

        {
            let guard = lock(&self.store);
            let package = guard
                .get(id)
                .ok_or_else(|| WorkflowError::not_found(id))?;
            if !package.is_returnable {
                return Err(WorkflowError::precondition("is_returnable")
                    .with_reason("only a returnable package carries a return status"));
            }
        }
        let delta = PackageDelta {
            return_status: Some(status),
            ..Default::default()
        };
        command::execute_with_delta(&self.store, id, delta, "update return status", remote).await
    }

    /// Explicitly reassigns a package to another manager.
    ///
    /// This is the one path that may change `assigned_to_manager` after
    /// submission; status transitions never touch it.
    pub async fn assign_to_manager(&self, id: &str, manager_id: &str) -> Result<Package> {
        if manager_id.trim().is_empty() {
            return Err(WorkflowError::precondition("manager_id")
                .with_reason("reassignment needs a manager id"));
        }

        let delta = PackageDelta {
            assigned_to_manager: Some(manager_id.to_string()),
            ..Default::default()
        };
        command::execute_with_delta(
            &self.store,
            id,
            delta,
            "assign to manager",
            self.transport.put(
                &format!("/packages/{id}/assign"),
                json!({ "manager_id": manager_id }),
            ),
        )
        .await
    }

    /// Fetches the manager directory for assignment surfaces.
    pub async fn fetch_managers(&self) -> Result<Vec<ManagerSummary>> {
        let listing = self
            .transport
            .get("/users/managers")
            .await
            .remote_context("fetching managers")?;
        let managers: Vec<wire::WireManager> = serde_json::from_value(listing)?;

        Ok(managers
            .into_iter()
            .filter_map(|m| {
                Some(ManagerSummary {
                    id: m.id.as_ref()?.to_text(),
                    full_name: m.full_name.unwrap_or_else(|| "Unknown".to_string()),
                    email: m.email,
                })
            })
            .collect())
    }

    /// Looks up a package by id; absent ids are an empty result, never an
    /// error.
    pub fn get_by_id(&self, id: &str) -> Option<Package> {
        lock(&self.store).get_cloned(id)
    }

    /// Packages whose logical status matches.
    pub fn list_by_status(&self, status: EffectiveStatus) -> Vec<Package> {
        lock(&self.store).list_by_status(status)
    }

    /// Packages assigned to the given manager.
    pub fn list_by_manager(&self, manager_id: &str) -> Vec<Package> {
        lock(&self.store).list_by_manager(manager_id)
    }

    /// Packages passing a filter, sorted by its sort key.
    pub fn find(&self, filter: &PackageFilter) -> Vec<Package> {
        lock(&self.store).filtered(filter)
    }

    /// Everything currently held, newest first.
    pub fn packages(&self) -> Vec<Package> {
        lock(&self.store).packages().to_vec()
    }

    /// The manager-scoped subset (empty unless the actor is a manager).
    pub fn assigned_packages(&self) -> Vec<Package> {
        lock(&self.store).assigned_packages().to_vec()
    }
}
