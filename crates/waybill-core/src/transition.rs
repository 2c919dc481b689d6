//! The package lifecycle state machine.
//!
//! Every legal status change is an edge in one explicit graph, gated by the
//! actor role that may trigger it:
//!
//! ```text
//! submitted  --approve(manager)-->    approved
//! submitted  --reject(manager)-->     rejected
//! rejected   --resubmit(employee)-->  submitted
//! approved   --dispatch(security)-->  dispatched
//! dispatched --record return(security), iff returnable--> returned
//! ```
//!
//! [`next_state`] validates an edge and computes the changed-fields delta it
//! implies. It never mutates its input; applying the delta is the caller's
//! job. The `returned` state is logical: recording a return keeps the wire
//! status at `dispatched` and sets the return sub-state instead.

use jiff::Timestamp;

use crate::error::{Result, WorkflowError};
use crate::models::{
    Actor, EffectiveStatus, Package, PackageDelta, PackageStatus, ReturnStatus, UserRole,
};

/// A requested workflow transition with its edge-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Manager approval; optional note appended to the package notes
    Approve { notes: Option<String> },

    /// Manager rejection; the reason is mandatory
    Reject { reason: String },

    /// Employee resubmission of a rejected package
    Resubmit,

    /// Security dispatch; optional note appended to the package notes
    Dispatch { notes: Option<String> },

    /// Security recording a returnable package coming back through the gate
    RecordReturn {
        returned_by: String,
        notes: Option<String>,
        returned_at: Option<Timestamp>,
    },
}

impl Action {
    /// Human-readable verb used in error messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Approve { .. } => "approve",
            Action::Reject { .. } => "reject",
            Action::Resubmit => "resubmit",
            Action::Dispatch { .. } => "dispatch",
            Action::RecordReturn { .. } => "record a return for",
        }
    }

    /// The one role allowed to trigger this edge.
    pub fn required_role(&self) -> UserRole {
        match self {
            Action::Approve { .. } | Action::Reject { .. } => UserRole::Manager,
            Action::Resubmit => UserRole::Employee,
            Action::Dispatch { .. } | Action::RecordReturn { .. } => UserRole::Security,
        }
    }

    /// The status this edge leaves from.
    fn source_status(&self) -> EffectiveStatus {
        match self {
            Action::Approve { .. } | Action::Reject { .. } => EffectiveStatus::Submitted,
            Action::Resubmit => EffectiveStatus::Rejected,
            Action::Dispatch { .. } => EffectiveStatus::Approved,
            Action::RecordReturn { .. } => EffectiveStatus::Dispatched,
        }
    }
}

/// Validates an action against the current package and actor, returning the
/// delta the transition stamps.
///
/// Checks run in a fixed order: edge presence first, then the actor role,
/// then edge-specific preconditions. `now` is the instant stamped into the
/// derived timestamp fields; passing it in keeps the function deterministic.
///
/// # Errors
///
/// * `WorkflowError::IllegalTransition` - the edge is absent from the graph
///   for the package's current (logical) status
/// * `WorkflowError::Unauthorized` - the actor's role may not trigger it
/// * `WorkflowError::PreconditionFailed` - a required field is missing
pub fn next_state(
    current: &Package,
    action: &Action,
    actor: &Actor,
    now: Timestamp,
) -> Result<PackageDelta> {
    let status = current.effective_status();

    let edge_present = status == action.source_status()
        && match action {
            Action::RecordReturn { .. } => current.is_returnable,
            _ => true,
        };
    if !edge_present {
        return Err(WorkflowError::IllegalTransition {
            from: status,
            action: action.name(),
        });
    }

    if actor.role != action.required_role() {
        return Err(WorkflowError::Unauthorized {
            action: action.name(),
            role: actor.role,
        });
    }

    match action {
        Action::Approve { notes } => {
            if !current
                .assigned_to_manager
                .as_deref()
                .is_some_and(|m| !m.is_empty())
            {
                return Err(WorkflowError::precondition("assigned_to_manager")
                    .with_reason("a package must be assigned to a manager before approval"));
            }
            Ok(PackageDelta {
                status: Some(PackageStatus::Approved),
                approved_by: Some(actor.id.clone()),
                approved_at: Some(now),
                notes: append_notes(current, notes.as_deref()),
                ..Default::default()
            })
        }
        Action::Reject { reason } => {
            if reason.trim().is_empty() {
                return Err(WorkflowError::precondition("reason")
                    .with_reason("a rejection must state its reason"));
            }
            Ok(PackageDelta {
                status: Some(PackageStatus::Rejected),
                rejected_by: Some(actor.id.clone()),
                rejected_at: Some(now),
                rejection_reason: Some(reason.clone()),
                ..Default::default()
            })
        }
        Action::Resubmit => Ok(PackageDelta {
            status: Some(PackageStatus::Submitted),
            resubmitted: Some(true),
            clear_rejection: true,
            ..Default::default()
        }),
        Action::Dispatch { notes } => Ok(PackageDelta {
            status: Some(PackageStatus::Dispatched),
            dispatched_at: Some(now),
            notes: append_notes(current, notes.as_deref()),
            ..Default::default()
        }),
        Action::RecordReturn {
            returned_by,
            notes,
            returned_at,
        } => {
            if returned_by.trim().is_empty() {
                return Err(WorkflowError::precondition("returned_by")
                    .with_reason("recording a return requires who brought the package back"));
            }
            // Wire status stays `dispatched`; the return sub-state carries
            // the logical `returned`.
            Ok(PackageDelta {
                return_status: Some(ReturnStatus::Returned),
                returned_by: Some(returned_by.clone()),
                return_notes: notes.clone(),
                returned_at: Some(returned_at.unwrap_or(now)),
                ..Default::default()
            })
        }
    }
}

/// Names of the actions available from a package's current state, for UI
/// affordances. Role gating still applies when one is attempted.
pub fn allowed_actions(package: &Package) -> Vec<&'static str> {
    match package.effective_status() {
        EffectiveStatus::Submitted => vec!["approve", "reject"],
        EffectiveStatus::Rejected => vec!["resubmit"],
        EffectiveStatus::Approved => vec!["dispatch"],
        EffectiveStatus::Dispatched if package.is_returnable => vec!["return"],
        EffectiveStatus::Dispatched | EffectiveStatus::Returned => vec![],
    }
}

/// Appends a note below the existing package notes.
fn append_notes(current: &Package, notes: Option<&str>) -> Option<String> {
    let notes = notes?;
    if notes.trim().is_empty() {
        return None;
    }
    Some(match current.notes.as_deref() {
        Some(existing) => format!("{existing}\n{notes}"),
        None => notes.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(status: PackageStatus) -> Package {
        Package {
            id: "P1".to_string(),
            status,
            assigned_to_manager: Some("M1".to_string()),
            recipient: "Acme Labs".to_string(),
            ..Default::default()
        }
    }

    fn manager() -> Actor {
        Actor::new("M1", UserRole::Manager)
    }

    fn employee() -> Actor {
        Actor::new("E1", UserRole::Employee)
    }

    fn security() -> Actor {
        Actor::new("S1", UserRole::Security)
    }

    fn now() -> Timestamp {
        "2025-01-10T10:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_approve_stamps_manager_and_time() {
        let delta = next_state(
            &package(PackageStatus::Submitted),
            &Action::Approve { notes: None },
            &manager(),
            now(),
        )
        .unwrap();

        assert_eq!(delta.status, Some(PackageStatus::Approved));
        assert_eq!(delta.approved_by, Some("M1".to_string()));
        assert_eq!(delta.approved_at, Some(now()));
    }

    #[test]
    fn test_approve_requires_assignment() {
        let mut unassigned = package(PackageStatus::Submitted);
        unassigned.assigned_to_manager = None;

        let error = next_state(
            &unassigned,
            &Action::Approve { notes: None },
            &manager(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(
            error,
            WorkflowError::PreconditionFailed { ref field, .. } if field == "assigned_to_manager"
        ));
    }

    #[test]
    fn test_reject_requires_reason() {
        let error = next_state(
            &package(PackageStatus::Submitted),
            &Action::Reject {
                reason: "  ".to_string(),
            },
            &manager(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(
            error,
            WorkflowError::PreconditionFailed { ref field, .. } if field == "reason"
        ));
    }

    #[test]
    fn test_reject_stamps_reason() {
        let delta = next_state(
            &package(PackageStatus::Submitted),
            &Action::Reject {
                reason: "missing PO".to_string(),
            },
            &manager(),
            now(),
        )
        .unwrap();

        assert_eq!(delta.status, Some(PackageStatus::Rejected));
        assert_eq!(delta.rejection_reason, Some("missing PO".to_string()));
        assert_eq!(delta.rejected_by, Some("M1".to_string()));
        assert_eq!(delta.rejected_at, Some(now()));
    }

    #[test]
    fn test_resubmit_clears_rejection() {
        let delta = next_state(
            &package(PackageStatus::Rejected),
            &Action::Resubmit,
            &employee(),
            now(),
        )
        .unwrap();

        assert_eq!(delta.status, Some(PackageStatus::Submitted));
        assert_eq!(delta.resubmitted, Some(true));
        assert!(delta.clear_rejection);
    }

    #[test]
    fn test_dispatch_requires_approved() {
        let error = next_state(
            &package(PackageStatus::Submitted),
            &Action::Dispatch { notes: None },
            &security(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(
            error,
            WorkflowError::IllegalTransition {
                from: EffectiveStatus::Submitted,
                ..
            }
        ));
    }

    #[test]
    fn test_dispatch_stamps_time() {
        let delta = next_state(
            &package(PackageStatus::Approved),
            &Action::Dispatch { notes: None },
            &security(),
            now(),
        )
        .unwrap();
        assert_eq!(delta.status, Some(PackageStatus::Dispatched));
        assert_eq!(delta.dispatched_at, Some(now()));
    }

    #[test]
    fn test_record_return_needs_returnable() {
        let error = next_state(
            &package(PackageStatus::Dispatched),
            &Action::RecordReturn {
                returned_by: "Jane Doe".to_string(),
                notes: None,
                returned_at: None,
            },
            &security(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(error, WorkflowError::IllegalTransition { .. }));
    }

    #[test]
    fn test_record_return_sets_substate_not_status() {
        let mut returnable = package(PackageStatus::Dispatched);
        returnable.is_returnable = true;

        let delta = next_state(
            &returnable,
            &Action::RecordReturn {
                returned_by: "Jane Doe".to_string(),
                notes: Some("fine".to_string()),
                returned_at: Some(now()),
            },
            &security(),
            now(),
        )
        .unwrap();

        assert_eq!(delta.status, None);
        assert_eq!(delta.return_status, Some(ReturnStatus::Returned));
        assert_eq!(delta.returned_by, Some("Jane Doe".to_string()));
        assert_eq!(delta.returned_at, Some(now()));

        let mut applied = returnable.clone();
        delta.apply_to(&mut applied);
        assert_eq!(applied.status, PackageStatus::Dispatched);
        assert_eq!(applied.effective_status(), EffectiveStatus::Returned);
    }

    #[test]
    fn test_record_return_requires_returned_by() {
        let mut returnable = package(PackageStatus::Dispatched);
        returnable.is_returnable = true;

        let error = next_state(
            &returnable,
            &Action::RecordReturn {
                returned_by: String::new(),
                notes: None,
                returned_at: None,
            },
            &security(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(
            error,
            WorkflowError::PreconditionFailed { ref field, .. } if field == "returned_by"
        ));
    }

    #[test]
    fn test_returned_package_is_terminal() {
        let mut returned = package(PackageStatus::Dispatched);
        returned.is_returnable = true;
        returned.return_status = Some(ReturnStatus::Returned);

        let error = next_state(
            &returned,
            &Action::RecordReturn {
                returned_by: "Jane Doe".to_string(),
                notes: None,
                returned_at: None,
            },
            &security(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(
            error,
            WorkflowError::IllegalTransition {
                from: EffectiveStatus::Returned,
                ..
            }
        ));
    }

    #[test]
    fn test_role_gating_per_edge() {
        // Every edge rejected for a wrong-role actor whose edge exists.
        let cases: Vec<(Package, Action, Actor)> = vec![
            (
                package(PackageStatus::Submitted),
                Action::Approve { notes: None },
                security(),
            ),
            (
                package(PackageStatus::Submitted),
                Action::Reject {
                    reason: "r".to_string(),
                },
                employee(),
            ),
            (package(PackageStatus::Rejected), Action::Resubmit, manager()),
            (
                package(PackageStatus::Approved),
                Action::Dispatch { notes: None },
                manager(),
            ),
        ];
        for (pkg, action, actor) in cases {
            let error = next_state(&pkg, &action, &actor, now()).unwrap_err();
            assert!(
                matches!(error, WorkflowError::Unauthorized { .. }),
                "expected Unauthorized for {} by {}",
                action.name(),
                actor.role
            );
        }
    }

    #[test]
    fn test_edge_absence_beats_role_check() {
        // Dispatching a submitted package fails on the edge even for the
        // right role, and also for a wrong one.
        for actor in [security(), manager()] {
            let error = next_state(
                &package(PackageStatus::Submitted),
                &Action::Dispatch { notes: None },
                &actor,
                now(),
            )
            .unwrap_err();
            assert!(matches!(error, WorkflowError::IllegalTransition { .. }));
        }
    }

    #[test]
    fn test_exhaustive_edge_table() {
        let actions = [
            Action::Approve { notes: None },
            Action::Reject {
                reason: "r".to_string(),
            },
            Action::Resubmit,
            Action::Dispatch { notes: None },
            Action::RecordReturn {
                returned_by: "Jane".to_string(),
                notes: None,
                returned_at: None,
            },
        ];
        let statuses = [
            PackageStatus::Submitted,
            PackageStatus::Approved,
            PackageStatus::Rejected,
            PackageStatus::Dispatched,
        ];

        for status in statuses {
            for action in &actions {
                let mut pkg = package(status);
                pkg.is_returnable = true;
                let actor = Actor::new("X", action.required_role());
                let result = next_state(&pkg, action, &actor, now());

                let legal = matches!(
                    (status, action),
                    (PackageStatus::Submitted, Action::Approve { .. })
                        | (PackageStatus::Submitted, Action::Reject { .. })
                        | (PackageStatus::Rejected, Action::Resubmit)
                        | (PackageStatus::Approved, Action::Dispatch { .. })
                        | (PackageStatus::Dispatched, Action::RecordReturn { .. })
                );
                assert_eq!(
                    result.is_ok(),
                    legal,
                    "unexpected validity for {} from {status:?}",
                    action.name()
                );
            }
        }
    }

    #[test]
    fn test_notes_append_below_existing() {
        let mut pkg = package(PackageStatus::Submitted);
        pkg.notes = Some("first".to_string());

        let delta = next_state(
            &pkg,
            &Action::Approve {
                notes: Some("second".to_string()),
            },
            &manager(),
            now(),
        )
        .unwrap();
        assert_eq!(delta.notes, Some("first\nsecond".to_string()));
    }

    #[test]
    fn test_allowed_actions_follow_graph() {
        assert_eq!(
            allowed_actions(&package(PackageStatus::Submitted)),
            vec!["approve", "reject"]
        );
        assert_eq!(
            allowed_actions(&package(PackageStatus::Rejected)),
            vec!["resubmit"]
        );
        assert_eq!(
            allowed_actions(&package(PackageStatus::Approved)),
            vec!["dispatch"]
        );
        assert!(allowed_actions(&package(PackageStatus::Dispatched)).is_empty());

        let mut returnable = package(PackageStatus::Dispatched);
        returnable.is_returnable = true;
        assert_eq!(allowed_actions(&returnable), vec!["return"]);
    }

    #[test]
    fn test_input_never_mutated() {
        let pkg = package(PackageStatus::Submitted);
        let before = pkg.clone();
        let _ = next_state(&pkg, &Action::Approve { notes: None }, &manager(), now());
        assert_eq!(pkg, before);
    }
}
