//! The canonical package record.

use jiff::civil::Date;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{
    EffectiveStatus, ManagerSummary, PackageDimension, PackageItem, PackageStatus, Priority,
    ReturnStatus,
};

/// A tracked physical package: the unit of workflow.
///
/// This is the single in-memory shape every component works with, produced
/// exclusively by wire normalization. The store owns the canonical copy;
/// everything else receives clones. Descriptive payload fields are inert with
/// respect to the state machine but round-trip losslessly through the wire
/// layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Package {
    /// Opaque stable identifier, immutable once created
    pub id: String,

    /// Current wire-level workflow status
    pub status: PackageStatus,

    /// Handling priority
    pub priority: Priority,

    /// Whether this package is a resubmission of a rejected one
    pub resubmitted: bool,

    /// Id of the original rejected package, when resubmitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_rejection: Option<String>,

    /// Tracking number; the substrate may issue one after submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,

    /// Description, derived from the first line item when present
    pub description: String,

    pub recipient: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_date: Option<Date>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate_pass_serial_number: Option<String>,

    /// Submission stamp pair
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_by_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<Timestamp>,

    /// Manager assignment; set at submission, changed only by the explicit
    /// reassignment command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_manager: Option<String>,

    /// Derived summary of the assigned manager, when the substrate sent one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_manager: Option<ManagerSummary>,

    /// Approval stamp pair
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<Timestamp>,

    /// Rejection stamps, cleared on resubmission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    /// Dispatch stamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatched_at: Option<Timestamp>,

    /// Whether the package must come back through the gate
    pub is_returnable: bool,

    /// Expected-by date for a returnable package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<Date>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_reason: Option<String>,

    /// Return sub-state; only meaningful while `is_returnable` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_status: Option<ReturnStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<Timestamp>,

    /// Flattened copy of the first dimension entry; always derived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,

    /// Nested line items, preserved from the wire
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<PackageItem>,

    /// Nested dimension entries, preserved from the wire
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<PackageDimension>,

    /// Substrate bookkeeping timestamps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Package {
    /// The logical status exposed to callers.
    ///
    /// A dispatched package whose return has been recorded reads as
    /// `Returned`; every other status maps through unchanged. The wire
    /// `status` field itself never holds `returned`.
    pub fn effective_status(&self) -> EffectiveStatus {
        if self.status == PackageStatus::Dispatched
            && self.is_returnable
            && self.return_status == Some(ReturnStatus::Returned)
        {
            EffectiveStatus::Returned
        } else {
            self.status.into()
        }
    }

    /// Whether the workflow can still move forward.
    pub fn is_terminal(&self) -> bool {
        self.effective_status().is_terminal()
    }
}
