//! The optimistic request/rollback protocol.
//!
//! Every mutating operation follows the same shape: snapshot the store,
//! validate locally, apply the projected change so observers see it with
//! zero latency, then let the substrate confirm or refute it. Confirmation
//! replaces the guess with the authoritative record; refusal restores the
//! snapshot exactly. Validation failures never touch the store at all.
//!
//! The store lock is only ever held synchronously; it is released across
//! the remote await, which is the single suspension point. Overlapping
//! commands each carry their own snapshot, so the later-resolving one's
//! outcome is authoritative at the store level.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use jiff::Timestamp;
use log::{debug, warn};
use serde_json::Value;

use crate::error::{Result, WorkflowError};
use crate::models::{Actor, Package, PackageDelta};
use crate::store::PackageStore;
use crate::transition::{self, Action};
use crate::transport::TransportError;
use crate::wire;

/// Locks the store, recovering from a poisoned lock (mutations are
/// synchronous, so a panic cannot leave a half-applied delta behind).
pub(crate) fn lock(store: &Mutex<PackageStore>) -> MutexGuard<'_, PackageStore> {
    match store.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Runs a workflow transition as an optimistic command.
///
/// The transition engine validates the action and computes the delta; the
/// remote call is the authoritative half. See the module docs for the
/// protocol.
///
/// # Errors
///
/// * validation errors from [`transition::next_state`], with the store
///   untouched
/// * `WorkflowError::NotFound` - the id is not in the store, so there is no
///   current state to validate against
/// * `WorkflowError::RemoteFailure` - the substrate refused; the optimistic
///   write has been rolled back
pub async fn execute<F>(
    store: &Mutex<PackageStore>,
    id: &str,
    action: &Action,
    actor: &Actor,
    remote: F,
) -> Result<Package>
where
    F: Future<Output = std::result::Result<Value, TransportError>>,
{
    let delta = {
        let guard = lock(store);
        let current = guard
            .get_cloned(id)
            .ok_or_else(|| WorkflowError::not_found(id))?;
        transition::next_state(&current, action, actor, Timestamp::now())?
    };

    apply_and_confirm(store, id, delta, action.name(), remote).await
}

/// Runs a caller-supplied delta as an optimistic command.
///
/// Used by mutations that are not workflow transitions (manager
/// reassignment, return bookkeeping); the caller has already validated the
/// delta against the current record.
pub async fn execute_with_delta<F>(
    store: &Mutex<PackageStore>,
    id: &str,
    delta: PackageDelta,
    description: &'static str,
    remote: F,
) -> Result<Package>
where
    F: Future<Output = std::result::Result<Value, TransportError>>,
{
    if lock(store).get(id).is_none() {
        return Err(WorkflowError::not_found(id));
    }
    apply_and_confirm(store, id, delta, description, remote).await
}

async fn apply_and_confirm<F>(
    store: &Mutex<PackageStore>,
    id: &str,
    delta: PackageDelta,
    description: &'static str,
    remote: F,
) -> Result<Package>
where
    F: Future<Output = std::result::Result<Value, TransportError>>,
{
    let snapshot = {
        let mut guard = lock(store);
        let snapshot = guard.snapshot();
        guard.apply_delta(id, &delta);
        snapshot
    };
    debug!("optimistically applied '{description}' to package {id}");

    match remote.await {
        Ok(response) => {
            let record = match wire::record_from_response(response) {
                Ok(record) => record,
                Err(error) => {
                    // Unreadable answer: the store must not keep an
                    // unconfirmed guess, so fall back to the snapshot.
                    lock(store).restore(snapshot);
                    return Err(error.into());
                }
            };
            let normalized = wire::normalize(&record);
            let package = normalized.package.clone();
            lock(store).upsert(normalized.package);
            debug!("confirmed '{description}' for package {id}");
            Ok(package)
        }
        Err(error) => {
            lock(store).restore(snapshot);
            warn!("'{description}' for package {id} failed remotely, rolled back: {error}");
            Err(WorkflowError::remote(format!("{description} failed")).with_source(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PackageStatus, UserRole};
    use serde_json::json;

    fn seeded_store() -> Mutex<PackageStore> {
        let mut store = PackageStore::new();
        store.load(vec![Package {
            id: "1".to_string(),
            status: PackageStatus::Submitted,
            recipient: "Acme Labs".to_string(),
            assigned_to_manager: Some("M1".to_string()),
            ..Default::default()
        }]);
        Mutex::new(store)
    }

    #[tokio::test]
    async fn test_success_upserts_authoritative_record() {
        let store = seeded_store();
        let manager = Actor::new("M1", UserRole::Manager);

        let authoritative = json!({
            "id": 1,
            "status": "approved",
            "recipient": "Acme Labs",
            "assigned_to_manager": "M1",
            "approved_by": "M1",
            "approved_at": "2025-01-10T10:00:00Z",
            "notes": "server-side note",
        });
        let package = execute(
            &store,
            "1",
            &Action::Approve { notes: None },
            &manager,
            std::future::ready(Ok(authoritative)),
        )
        .await
        .unwrap();

        assert_eq!(package.status, PackageStatus::Approved);
        // The authoritative response wins over the optimistic guess.
        assert_eq!(package.notes, Some("server-side note".to_string()));
        let stored = lock(&store).get_cloned("1").unwrap();
        assert_eq!(stored, package);
    }

    #[tokio::test]
    async fn test_failure_restores_exact_snapshot() {
        let store = seeded_store();
        let before = lock(&store).snapshot();
        let manager = Actor::new("M1", UserRole::Manager);

        let error = execute(
            &store,
            "1",
            &Action::Approve { notes: None },
            &manager,
            std::future::ready(Err(TransportError::with_status(500, "backend down"))),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, WorkflowError::RemoteFailure { .. }));
        assert_eq!(lock(&store).snapshot(), before);
    }

    #[tokio::test]
    async fn test_validation_failure_never_touches_store() {
        let store = seeded_store();
        let before = lock(&store).snapshot();
        let security = Actor::new("S1", UserRole::Security);

        let error = execute(
            &store,
            "1",
            &Action::Dispatch { notes: None },
            &security,
            std::future::ready(Ok(json!({}))),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, WorkflowError::IllegalTransition { .. }));
        assert!(error.is_local());
        assert_eq!(lock(&store).snapshot(), before);
    }

    #[tokio::test]
    async fn test_unknown_id_fails_fast() {
        let store = seeded_store();
        let manager = Actor::new("M1", UserRole::Manager);

        let error = execute(
            &store,
            "404",
            &Action::Approve { notes: None },
            &manager,
            std::future::ready(Ok(json!({}))),
        )
        .await
        .unwrap_err();
        assert!(matches!(error, WorkflowError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_undecodable_response_rolls_back() {
        let store = seeded_store();
        let before = lock(&store).snapshot();
        let manager = Actor::new("M1", UserRole::Manager);

        let error = execute(
            &store,
            "1",
            &Action::Approve { notes: None },
            &manager,
            std::future::ready(Ok(json!("not a record"))),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, WorkflowError::Serialization { .. }));
        assert_eq!(lock(&store).snapshot(), before);
    }

    #[tokio::test]
    async fn test_delta_command_validates_presence() {
        let store = seeded_store();
        let delta = PackageDelta {
            assigned_to_manager: Some("M2".to_string()),
            ..Default::default()
        };

        let error = execute_with_delta(
            &store,
            "404",
            delta,
            "reassign",
            std::future::ready(Ok(json!({}))),
        )
        .await
        .unwrap_err();
        assert!(matches!(error, WorkflowError::NotFound { .. }));
    }
}
