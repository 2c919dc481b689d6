//! Status, priority, and role enumerations for the package workflow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Wire-level package status.
///
/// `Returned` is deliberately absent from this enum: the substrate keeps a
/// returned package at `dispatched` and records the return in
/// [`ReturnStatus`]. Callers that want the logical view should use
/// [`EffectiveStatus`] via `Package::effective_status`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    /// Submitted by an employee, awaiting manager review
    #[default]
    Submitted,

    /// Approved by the assigned manager, awaiting dispatch
    Approved,

    /// Rejected by the assigned manager (terminal until resubmission)
    Rejected,

    /// Dispatched by security; a returnable package may still come back
    Dispatched,
}

impl FromStr for PackageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "submitted" => Ok(PackageStatus::Submitted),
            "approved" => Ok(PackageStatus::Approved),
            "rejected" => Ok(PackageStatus::Rejected),
            "dispatched" => Ok(PackageStatus::Dispatched),
            _ => Err(format!("Invalid package status: {s}")),
        }
    }
}

impl PackageStatus {
    /// Convert to the wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageStatus::Submitted => "submitted",
            PackageStatus::Approved => "approved",
            PackageStatus::Rejected => "rejected",
            PackageStatus::Dispatched => "dispatched",
        }
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical package status as exposed to callers.
///
/// Identical to [`PackageStatus`] except that a dispatched package whose
/// return has been recorded reads as `Returned`. This is the status used by
/// filtering and display; it never appears on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    Submitted,
    Approved,
    Rejected,
    Dispatched,
    Returned,
}

impl From<PackageStatus> for EffectiveStatus {
    fn from(status: PackageStatus) -> Self {
        match status {
            PackageStatus::Submitted => EffectiveStatus::Submitted,
            PackageStatus::Approved => EffectiveStatus::Approved,
            PackageStatus::Rejected => EffectiveStatus::Rejected,
            PackageStatus::Dispatched => EffectiveStatus::Dispatched,
        }
    }
}

impl FromStr for EffectiveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "submitted" => Ok(EffectiveStatus::Submitted),
            "approved" => Ok(EffectiveStatus::Approved),
            "rejected" => Ok(EffectiveStatus::Rejected),
            "dispatched" => Ok(EffectiveStatus::Dispatched),
            "returned" => Ok(EffectiveStatus::Returned),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}

impl EffectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveStatus::Submitted => "submitted",
            EffectiveStatus::Approved => "approved",
            EffectiveStatus::Rejected => "rejected",
            EffectiveStatus::Dispatched => "dispatched",
            EffectiveStatus::Returned => "returned",
        }
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// Returns a formatted string that includes both an icon and the status
    /// name, matching the visual language used across all display contexts.
    pub fn with_icon(&self) -> &'static str {
        match self {
            EffectiveStatus::Submitted => "○ Submitted",
            EffectiveStatus::Approved => "✓ Approved",
            EffectiveStatus::Rejected => "✗ Rejected",
            EffectiveStatus::Dispatched => "➤ Dispatched",
            EffectiveStatus::Returned => "↩ Returned",
        }
    }

    /// Whether the workflow can still move forward from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EffectiveStatus::Rejected | EffectiveStatus::Returned)
    }
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return sub-state of a returnable, dispatched package.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReturnStatus {
    /// Return expected but not yet recorded
    Pending,

    /// Return recorded at the gate
    Returned,

    /// Return explicitly marked late (never inferred from dates by the core)
    Overdue,
}

impl FromStr for ReturnStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReturnStatus::Pending),
            "returned" => Ok(ReturnStatus::Returned),
            "overdue" => Ok(ReturnStatus::Overdue),
            _ => Err(format!("Invalid return status: {s}")),
        }
    }
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Pending => "pending",
            ReturnStatus::Returned => "returned",
            ReturnStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handling priority of a package.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,

    #[default]
    Medium,

    High,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!("Invalid priority: {s}")),
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Numeric rank used for priority sorting, highest first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of an authenticated actor.
///
/// Only `Employee`, `Manager`, and `Security` gate workflow transitions;
/// `Admin` and `Logistics` exist in the actor model for scoping and display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Employee,
    Manager,
    Security,
    Admin,
    Logistics,
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "employee" => Ok(UserRole::Employee),
            "manager" => Ok(UserRole::Manager),
            "security" => Ok(UserRole::Security),
            "admin" => Ok(UserRole::Admin),
            "logistics" => Ok(UserRole::Logistics),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Employee => "employee",
            UserRole::Manager => "manager",
            UserRole::Security => "security",
            UserRole::Admin => "admin",
            UserRole::Logistics => "logistics",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
