//! Request types for mutating operations.

use jiff::civil::Date;

use super::{Actor, PackageDimension, PackageItem, Priority};
use crate::error::{Result, WorkflowError};

/// Parameters for submitting a new package.
///
/// Identity, tracking number fallback, gate pass serial, and the submission
/// stamp are assigned by the substrate; everything here is what the
/// submitting employee provides.
#[derive(Debug, Clone, Default)]
pub struct SubmitPackage {
    pub recipient: String,
    pub description: Option<String>,
    pub to_address: Option<String>,
    pub notes: Option<String>,
    pub remarks: Option<String>,
    pub purpose: Option<String>,
    pub priority: Priority,
    pub project_code: Option<String>,
    pub po_number: Option<String>,
    pub po_date: Option<Date>,
    pub tracking_number: Option<String>,
    pub assigned_to_manager: Option<String>,
    pub is_returnable: bool,
    pub return_date: Option<Date>,
    pub return_reason: Option<String>,
    pub items: Vec<PackageItem>,
    pub dimensions: Vec<PackageDimension>,
}

impl SubmitPackage {
    /// Validates the request before any remote call is made.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::PreconditionFailed` - recipient missing, no
    ///   description anywhere, or a returnable package without an expected
    ///   return date
    pub fn validate(&self) -> Result<()> {
        if self.recipient.trim().is_empty() {
            return Err(WorkflowError::precondition("recipient")
                .with_reason("a package must name its recipient"));
        }

        let has_description = self
            .description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
            || self.items.iter().any(|i| !i.description.trim().is_empty());
        if !has_description {
            return Err(WorkflowError::precondition("description")
                .with_reason("provide a description or at least one described line item"));
        }

        if self.is_returnable && self.return_date.is_none() {
            return Err(WorkflowError::precondition("return_date")
                .with_reason("a returnable package needs an expected return date"));
        }

        Ok(())
    }

    /// Builds the outgoing creation body in the substrate's snake_case
    /// convention, stamping the submitting actor.
    pub fn to_body(&self, actor: &Actor) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert("recipient".to_string(), serde_json::json!(self.recipient));
        object.insert(
            "priority".to_string(),
            serde_json::json!(self.priority.as_str()),
        );
        object.insert(
            "is_returnable".to_string(),
            serde_json::json!(self.is_returnable),
        );
        object.insert("submitted_by".to_string(), serde_json::json!(actor.id));
        object.insert("items".to_string(), serde_json::json!(self.items));
        object.insert("dimensions".to_string(), serde_json::json!(self.dimensions));

        let optional = [
            ("description", self.description.clone()),
            ("to_address", self.to_address.clone()),
            ("notes", self.notes.clone()),
            ("remarks", self.remarks.clone()),
            ("purpose", self.purpose.clone()),
            ("project_code", self.project_code.clone()),
            ("po_number", self.po_number.clone()),
            ("tracking_number", self.tracking_number.clone()),
            ("assigned_to_manager", self.assigned_to_manager.clone()),
            ("return_reason", self.return_reason.clone()),
            ("po_date", self.po_date.map(|d| d.to_string())),
            ("return_date", self.return_date.map(|d| d.to_string())),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                object.insert(key.to_string(), serde_json::Value::String(value));
            }
        }

        serde_json::Value::Object(object)
    }
}
