//! Changed-fields-only package patches.

use jiff::Timestamp;

use super::{Package, PackageStatus, ReturnStatus};

/// A patch carrying only the fields a transition (or reassignment) changes.
///
/// Produced by the transition engine and applied by the store; the engine
/// never mutates its input package. `clear_rejection` exists because
/// resubmission must set the rejection stamps back to absent, which a plain
/// `Option` field cannot express.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageDelta {
    pub status: Option<PackageStatus>,
    pub resubmitted: Option<bool>,
    pub notes: Option<String>,

    pub approved_by: Option<String>,
    pub approved_at: Option<Timestamp>,

    pub rejected_by: Option<String>,
    pub rejected_at: Option<Timestamp>,
    pub rejection_reason: Option<String>,

    pub dispatched_at: Option<Timestamp>,

    pub return_status: Option<ReturnStatus>,
    pub returned_by: Option<String>,
    pub return_notes: Option<String>,
    pub returned_at: Option<Timestamp>,

    pub assigned_to_manager: Option<String>,

    /// Erase all rejection stamps before applying the rest of the patch
    pub clear_rejection: bool,
}

impl PackageDelta {
    /// Applies this patch to a package in place.
    ///
    /// Clearing happens first so a patch can both erase old rejection stamps
    /// and set new fields in one application.
    pub fn apply_to(&self, package: &mut Package) {
        if self.clear_rejection {
            package.rejected_by = None;
            package.rejected_by_name = None;
            package.rejected_at = None;
            package.rejection_reason = None;
        }

        if let Some(status) = self.status {
            package.status = status;
        }
        if let Some(resubmitted) = self.resubmitted {
            package.resubmitted = resubmitted;
        }
        if let Some(notes) = &self.notes {
            package.notes = Some(notes.clone());
        }
        if let Some(approved_by) = &self.approved_by {
            package.approved_by = Some(approved_by.clone());
        }
        if let Some(approved_at) = self.approved_at {
            package.approved_at = Some(approved_at);
        }
        if let Some(rejected_by) = &self.rejected_by {
            package.rejected_by = Some(rejected_by.clone());
        }
        if let Some(rejected_at) = self.rejected_at {
            package.rejected_at = Some(rejected_at);
        }
        if let Some(reason) = &self.rejection_reason {
            package.rejection_reason = Some(reason.clone());
        }
        if let Some(dispatched_at) = self.dispatched_at {
            package.dispatched_at = Some(dispatched_at);
        }
        if let Some(return_status) = self.return_status {
            package.return_status = Some(return_status);
        }
        if let Some(returned_by) = &self.returned_by {
            package.returned_by = Some(returned_by.clone());
        }
        if let Some(return_notes) = &self.return_notes {
            package.return_notes = Some(return_notes.clone());
        }
        if let Some(returned_at) = self.returned_at {
            package.returned_at = Some(returned_at);
        }
        if let Some(manager) = &self.assigned_to_manager {
            package.assigned_to_manager = Some(manager.clone());
        }
    }

    /// Whether applying this delta would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == PackageDelta::default()
    }
}
