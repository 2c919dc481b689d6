//! Wire-record normalization.
//!
//! The substrate speaks two parallel naming conventions: every logical field
//! may arrive in snake_case, camelCase, or both. Rather than scattering
//! fallbacks across every consumer, all resolution happens here, once:
//! [`normalize`] folds a raw [`WireRecord`] into the canonical
//! [`Package`] shape and [`denormalize`] produces an outgoing record that
//! carries both variants.
//!
//! When both variants of one field are present and disagree, the snake_case
//! value wins (it is the convention the substrate natively emits, so it is
//! the variant most recently known to be authoritative) and a
//! [`FieldConflict`] is surfaced so callers can warn instead of silently
//! trusting the value. A conflict is a data-integrity smell, never an error:
//! the record is always produced.

use std::fmt;

use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use jiff::Timestamp;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    ManagerSummary, Package, PackageDimension, PackageItem, PackageStatus, Priority, ReturnStatus,
};

/// A scalar that reaches us as a JSON string or number; the substrate is
/// inconsistent about id types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireScalar {
    Text(String),
    Number(serde_json::Number),
}

impl WireScalar {
    /// Stable text form; numbers and strings of the same id compare equal.
    pub fn to_text(&self) -> String {
        match self {
            WireScalar::Text(s) => s.clone(),
            WireScalar::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for WireScalar {
    fn from(value: &str) -> Self {
        WireScalar::Text(value.to_string())
    }
}

/// Nested manager object as the substrate sends it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WireManager {
    pub id: Option<WireScalar>,

    #[serde(alias = "fullName", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// One record of the `return_records` sub-resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WireReturnRecord {
    #[serde(alias = "returnedBy", skip_serializing_if = "Option::is_none")]
    pub returned_by: Option<String>,

    #[serde(alias = "returnedAt", skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<String>,

    #[serde(alias = "returnNotes", skip_serializing_if = "Option::is_none")]
    pub return_notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Raw package record in the substrate's shape.
///
/// Dual-convention fields appear twice: the plain name is the snake_case
/// variant, the `_camel` twin maps to the camelCase spelling. Fields the
/// substrate only ever spells one way (id, status, recipient, the nested
/// arrays) appear once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WireRecord {
    pub id: Option<WireScalar>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub recipient: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub remarks: Option<String>,
    pub purpose: Option<String>,
    pub resubmitted: Option<bool>,
    pub dimension: Option<String>,
    pub weight: Option<WireScalar>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(rename = "trackingNumber", skip_serializing_if = "Option::is_none")]
    pub tracking_number_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<WireScalar>,
    #[serde(rename = "submittedBy", skip_serializing_if = "Option::is_none")]
    pub submitted_by_camel: Option<WireScalar>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_by_name: Option<String>,
    #[serde(rename = "submittedByName", skip_serializing_if = "Option::is_none")]
    pub submitted_by_name_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(rename = "submittedAt", skip_serializing_if = "Option::is_none")]
    pub submitted_at_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_manager: Option<WireScalar>,
    #[serde(rename = "assignedToManager", skip_serializing_if = "Option::is_none")]
    pub assigned_to_manager_camel: Option<WireScalar>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<WireScalar>,
    #[serde(rename = "approvedBy", skip_serializing_if = "Option::is_none")]
    pub approved_by_camel: Option<WireScalar>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    #[serde(rename = "approvedAt", skip_serializing_if = "Option::is_none")]
    pub approved_at_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<WireScalar>,
    #[serde(rename = "rejectedBy", skip_serializing_if = "Option::is_none")]
    pub rejected_by_camel: Option<WireScalar>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_by_name: Option<String>,
    #[serde(rename = "rejectedByName", skip_serializing_if = "Option::is_none")]
    pub rejected_by_name_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<String>,
    #[serde(rename = "rejectedAt", skip_serializing_if = "Option::is_none")]
    pub rejected_at_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(rename = "rejectionReason", skip_serializing_if = "Option::is_none")]
    pub rejection_reason_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatched_at: Option<String>,
    #[serde(rename = "dispatchedAt", skip_serializing_if = "Option::is_none")]
    pub dispatched_at_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_returnable: Option<bool>,
    #[serde(rename = "isReturnable", skip_serializing_if = "Option::is_none")]
    pub is_returnable_camel: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(rename = "returnDate", skip_serializing_if = "Option::is_none")]
    pub return_date_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_reason: Option<String>,
    #[serde(rename = "returnReason", skip_serializing_if = "Option::is_none")]
    pub return_reason_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_status: Option<String>,
    #[serde(rename = "returnStatus", skip_serializing_if = "Option::is_none")]
    pub return_status_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_by: Option<String>,
    #[serde(rename = "returnedBy", skip_serializing_if = "Option::is_none")]
    pub returned_by_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_notes: Option<String>,
    #[serde(rename = "returnNotes", skip_serializing_if = "Option::is_none")]
    pub return_notes_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<String>,
    #[serde(rename = "returnedAt", skip_serializing_if = "Option::is_none")]
    pub returned_at_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate_pass_serial_number: Option<String>,
    #[serde(
        rename = "gatePassSerialNumber",
        skip_serializing_if = "Option::is_none"
    )]
    pub gate_pass_serial_number_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(rename = "toAddress", skip_serializing_if = "Option::is_none")]
    pub to_address_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_code: Option<String>,
    #[serde(rename = "projectCode", skip_serializing_if = "Option::is_none")]
    pub project_code_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    #[serde(rename = "poNumber", skip_serializing_if = "Option::is_none")]
    pub po_number_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_date: Option<String>,
    #[serde(rename = "poDate", skip_serializing_if = "Option::is_none")]
    pub po_date_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<String>,
    #[serde(rename = "weightUnit", skip_serializing_if = "Option::is_none")]
    pub weight_unit_camel: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_rejection: Option<WireScalar>,
    #[serde(rename = "previousRejection", skip_serializing_if = "Option::is_none")]
    pub previous_rejection_camel: Option<WireScalar>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<PackageItem>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<PackageDimension>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_manager: Option<WireManager>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub return_records: Vec<WireReturnRecord>,
}

/// The two naming variants of one field disagreed; the snake_case value was
/// kept and the other discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConflict {
    pub field: &'static str,
    pub kept: String,
    pub discarded: String,
}

/// Result of normalizing one wire record.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub package: Package,
    pub conflicts: Vec<FieldConflict>,
}

/// Collects field resolutions and the conflicts they surface.
#[derive(Default)]
struct FieldPicker {
    conflicts: Vec<FieldConflict>,
}

impl FieldPicker {
    /// Prefers the snake_case variant; records a conflict when both are
    /// present and disagree.
    fn pick<T>(&mut self, field: &'static str, snake: &Option<T>, camel: &Option<T>) -> Option<T>
    where
        T: PartialEq + Clone + fmt::Debug,
    {
        match (snake, camel) {
            (Some(s), Some(c)) if s != c => {
                self.conflict(field, format!("{s:?}"), format!("{c:?}"));
                Some(s.clone())
            }
            (Some(s), _) => Some(s.clone()),
            (None, Some(c)) => Some(c.clone()),
            (None, None) => None,
        }
    }

    /// Like [`FieldPicker::pick`] but compares scalars by their text form so
    /// `7` and `"7"` do not conflict.
    fn pick_scalar(
        &mut self,
        field: &'static str,
        snake: &Option<WireScalar>,
        camel: &Option<WireScalar>,
    ) -> Option<String> {
        match (snake, camel) {
            (Some(s), Some(c)) => {
                let (s, c) = (s.to_text(), c.to_text());
                if s != c {
                    self.conflict(field, s.clone(), c);
                }
                Some(s)
            }
            (Some(s), None) => Some(s.to_text()),
            (None, Some(c)) => Some(c.to_text()),
            (None, None) => None,
        }
    }

    fn conflict(&mut self, field: &'static str, kept: String, discarded: String) {
        warn!("wire record field '{field}' disagrees across naming conventions: keeping {kept}, discarding {discarded}");
        self.conflicts.push(FieldConflict {
            field,
            kept,
            discarded,
        });
    }
}

/// Converts a raw wire record into the canonical package shape.
///
/// Pure and idempotent: feeding the output of [`denormalize`] back in
/// reproduces the same package. Unparsable dates and unknown enum values
/// degrade to absent/default with a warning rather than failing the record.
pub fn normalize(raw: &WireRecord) -> Normalized {
    let mut picker = FieldPicker::default();

    let id = match &raw.id {
        Some(scalar) => scalar.to_text(),
        None => {
            warn!("wire record is missing an id");
            String::new()
        }
    };

    let status = parse_status(raw.status.as_deref());
    let priority = parse_enum_or(raw.priority.as_deref(), Priority::default(), "priority");

    // Flattened description: the first line item wins over the package-level
    // field, matching how the substrate assembles listings.
    let item_description = raw
        .items
        .first()
        .map(|i| i.description.trim())
        .filter(|d| !d.is_empty());
    let description = item_description
        .map(ToString::to_string)
        .or_else(|| raw.description.clone())
        .unwrap_or_default();

    let assigned_to_manager = picker
        .pick_scalar(
            "assigned_to_manager",
            &raw.assigned_to_manager,
            &raw.assigned_to_manager_camel,
        )
        .or_else(|| {
            raw.assigned_manager
                .as_ref()
                .and_then(|m| m.id.as_ref())
                .map(WireScalar::to_text)
        });

    let assigned_manager = raw.assigned_manager.as_ref().and_then(|m| {
        Some(ManagerSummary {
            id: m.id.as_ref()?.to_text(),
            full_name: m.full_name.clone().unwrap_or_else(|| "Unknown".to_string()),
            email: m.email.clone(),
        })
    });

    let is_returnable = picker
        .pick("is_returnable", &raw.is_returnable, &raw.is_returnable_camel)
        .unwrap_or(false);

    // Return sub-state: the first return record is the authoritative
    // sub-resource when present; package-level fields fill the gaps.
    let return_record = raw.return_records.first();
    let returned_by = return_record
        .and_then(|r| r.returned_by.clone())
        .or_else(|| picker.pick("returned_by", &raw.returned_by, &raw.returned_by_camel));
    let return_notes = return_record
        .and_then(|r| r.return_notes.clone())
        .or_else(|| picker.pick("return_notes", &raw.return_notes, &raw.return_notes_camel));
    let returned_at_raw = return_record
        .and_then(|r| r.returned_at.clone())
        .or_else(|| picker.pick("returned_at", &raw.returned_at, &raw.returned_at_camel));
    let return_status_raw = return_record
        .and_then(|r| r.status.clone())
        .or_else(|| picker.pick("return_status", &raw.return_status, &raw.return_status_camel));

    let mut return_status =
        return_status_raw.and_then(|s| parse_enum_opt::<ReturnStatus>(&s, "return_status"));
    if return_status.is_some() && !is_returnable {
        warn!("package {id} carries a return status but is not returnable; dropping it");
        return_status = None;
    }

    // Flattened dimension convenience fields, derived from the first entry
    // when one exists.
    let first_dimension = raw.dimensions.first();
    let weight = first_dimension
        .and_then(|d| d.weight.clone())
        .or_else(|| raw.weight.as_ref().map(WireScalar::to_text));
    let weight_unit = first_dimension
        .and_then(|d| d.weight_unit.clone())
        .or_else(|| picker.pick("weight_unit", &raw.weight_unit, &raw.weight_unit_camel));
    let dimension = first_dimension
        .and_then(|d| d.dimension.clone())
        .or_else(|| raw.dimension.clone());

    let package = Package {
        id,
        status,
        priority,
        resubmitted: raw.resubmitted.unwrap_or(false),
        previous_rejection: picker.pick_scalar(
            "previous_rejection",
            &raw.previous_rejection,
            &raw.previous_rejection_camel,
        ),
        tracking_number: picker.pick(
            "tracking_number",
            &raw.tracking_number,
            &raw.tracking_number_camel,
        ),
        description,
        recipient: raw.recipient.clone().unwrap_or_default(),
        to_address: picker.pick("to_address", &raw.to_address, &raw.to_address_camel),
        notes: raw.notes.clone(),
        remarks: raw.remarks.clone(),
        purpose: raw.purpose.clone(),
        project_code: picker.pick("project_code", &raw.project_code, &raw.project_code_camel),
        po_number: picker.pick("po_number", &raw.po_number, &raw.po_number_camel),
        po_date: parse_date(
            "po_date",
            picker.pick("po_date", &raw.po_date, &raw.po_date_camel),
        ),
        gate_pass_serial_number: picker.pick(
            "gate_pass_serial_number",
            &raw.gate_pass_serial_number,
            &raw.gate_pass_serial_number_camel,
        ),
        submitted_by: picker.pick_scalar("submitted_by", &raw.submitted_by, &raw.submitted_by_camel),
        submitted_by_name: picker.pick(
            "submitted_by_name",
            &raw.submitted_by_name,
            &raw.submitted_by_name_camel,
        ),
        submitted_at: parse_timestamp(
            "submitted_at",
            picker.pick("submitted_at", &raw.submitted_at, &raw.submitted_at_camel),
        ),
        assigned_to_manager,
        assigned_manager,
        approved_by: picker.pick_scalar("approved_by", &raw.approved_by, &raw.approved_by_camel),
        approved_at: parse_timestamp(
            "approved_at",
            picker.pick("approved_at", &raw.approved_at, &raw.approved_at_camel),
        ),
        rejected_by: picker.pick_scalar("rejected_by", &raw.rejected_by, &raw.rejected_by_camel),
        rejected_by_name: picker.pick(
            "rejected_by_name",
            &raw.rejected_by_name,
            &raw.rejected_by_name_camel,
        ),
        rejected_at: parse_timestamp(
            "rejected_at",
            picker.pick("rejected_at", &raw.rejected_at, &raw.rejected_at_camel),
        ),
        rejection_reason: picker.pick(
            "rejection_reason",
            &raw.rejection_reason,
            &raw.rejection_reason_camel,
        ),
        dispatched_at: parse_timestamp(
            "dispatched_at",
            picker.pick("dispatched_at", &raw.dispatched_at, &raw.dispatched_at_camel),
        ),
        is_returnable,
        return_date: parse_date(
            "return_date",
            picker.pick("return_date", &raw.return_date, &raw.return_date_camel),
        ),
        return_reason: picker.pick("return_reason", &raw.return_reason, &raw.return_reason_camel),
        return_status,
        returned_by,
        return_notes,
        returned_at: parse_timestamp("returned_at", returned_at_raw),
        weight,
        weight_unit,
        dimension,
        items: raw.items.clone(),
        dimensions: raw.dimensions.clone(),
        created_at: parse_timestamp("created_at", raw.created_at.clone()),
        updated_at: parse_timestamp("updated_at", raw.updated_at.clone()),
    };

    Normalized {
        package,
        conflicts: picker.conflicts,
    }
}

/// Produces an outgoing wire record carrying both naming variants, so any
/// substrate path can read it.
pub fn denormalize(package: &Package) -> WireRecord {
    let timestamp = |t: &Option<Timestamp>| t.map(|t| t.to_string());
    let date = |d: &Option<Date>| d.map(|d| d.to_string());

    let return_records = if package.returned_by.is_some() || package.returned_at.is_some() {
        vec![WireReturnRecord {
            returned_by: package.returned_by.clone(),
            returned_at: timestamp(&package.returned_at),
            return_notes: package.return_notes.clone(),
            status: package.return_status.map(|s| s.as_str().to_string()),
        }]
    } else {
        Vec::new()
    };

    WireRecord {
        id: Some(WireScalar::Text(package.id.clone())),
        status: Some(package.status.as_str().to_string()),
        priority: Some(package.priority.as_str().to_string()),
        recipient: Some(package.recipient.clone()),
        description: Some(package.description.clone()),
        notes: package.notes.clone(),
        remarks: package.remarks.clone(),
        purpose: package.purpose.clone(),
        resubmitted: Some(package.resubmitted),
        dimension: package.dimension.clone(),
        weight: package.weight.clone().map(WireScalar::Text),

        tracking_number: package.tracking_number.clone(),
        tracking_number_camel: package.tracking_number.clone(),
        submitted_by: package.submitted_by.clone().map(WireScalar::Text),
        submitted_by_camel: package.submitted_by.clone().map(WireScalar::Text),
        submitted_by_name: package.submitted_by_name.clone(),
        submitted_by_name_camel: package.submitted_by_name.clone(),
        submitted_at: timestamp(&package.submitted_at),
        submitted_at_camel: timestamp(&package.submitted_at),
        assigned_to_manager: package.assigned_to_manager.clone().map(WireScalar::Text),
        assigned_to_manager_camel: package.assigned_to_manager.clone().map(WireScalar::Text),
        approved_by: package.approved_by.clone().map(WireScalar::Text),
        approved_by_camel: package.approved_by.clone().map(WireScalar::Text),
        approved_at: timestamp(&package.approved_at),
        approved_at_camel: timestamp(&package.approved_at),
        rejected_by: package.rejected_by.clone().map(WireScalar::Text),
        rejected_by_camel: package.rejected_by.clone().map(WireScalar::Text),
        rejected_by_name: package.rejected_by_name.clone(),
        rejected_by_name_camel: package.rejected_by_name.clone(),
        rejected_at: timestamp(&package.rejected_at),
        rejected_at_camel: timestamp(&package.rejected_at),
        rejection_reason: package.rejection_reason.clone(),
        rejection_reason_camel: package.rejection_reason.clone(),
        dispatched_at: timestamp(&package.dispatched_at),
        dispatched_at_camel: timestamp(&package.dispatched_at),
        is_returnable: Some(package.is_returnable),
        is_returnable_camel: Some(package.is_returnable),
        return_date: date(&package.return_date),
        return_date_camel: date(&package.return_date),
        return_reason: package.return_reason.clone(),
        return_reason_camel: package.return_reason.clone(),
        return_status: package.return_status.map(|s| s.as_str().to_string()),
        return_status_camel: package.return_status.map(|s| s.as_str().to_string()),
        returned_by: package.returned_by.clone(),
        returned_by_camel: package.returned_by.clone(),
        return_notes: package.return_notes.clone(),
        return_notes_camel: package.return_notes.clone(),
        returned_at: timestamp(&package.returned_at),
        returned_at_camel: timestamp(&package.returned_at),
        gate_pass_serial_number: package.gate_pass_serial_number.clone(),
        gate_pass_serial_number_camel: package.gate_pass_serial_number.clone(),
        to_address: package.to_address.clone(),
        to_address_camel: package.to_address.clone(),
        project_code: package.project_code.clone(),
        project_code_camel: package.project_code.clone(),
        po_number: package.po_number.clone(),
        po_number_camel: package.po_number.clone(),
        po_date: date(&package.po_date),
        po_date_camel: date(&package.po_date),
        weight_unit: package.weight_unit.clone(),
        weight_unit_camel: package.weight_unit.clone(),
        previous_rejection: package.previous_rejection.clone().map(WireScalar::Text),
        previous_rejection_camel: package.previous_rejection.clone().map(WireScalar::Text),
        created_at: timestamp(&package.created_at),
        updated_at: timestamp(&package.updated_at),

        items: package.items.clone(),
        dimensions: package.dimensions.clone(),
        assigned_manager: package.assigned_manager.as_ref().map(|m| WireManager {
            id: Some(WireScalar::Text(m.id.clone())),
            full_name: Some(m.full_name.clone()),
            email: m.email.clone(),
        }),
        return_records,
    }
}

/// Decodes a wire record from a response body, unwrapping the
/// `{"message": ..., "package": {...}}` envelope some endpoints use.
pub fn record_from_response(value: Value) -> serde_json::Result<WireRecord> {
    let inner = match value {
        Value::Object(mut map) if map.contains_key("package") => {
            map.remove("package").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(inner)
}

/// Decodes a listing response into wire records.
pub fn records_from_array(value: Value) -> serde_json::Result<Vec<WireRecord>> {
    serde_json::from_value(value)
}

fn parse_status(raw: Option<&str>) -> PackageStatus {
    match raw {
        None => PackageStatus::default(),
        Some(s) => s.parse().unwrap_or_else(|_| {
            warn!("unknown package status '{s}', treating as submitted");
            PackageStatus::default()
        }),
    }
}

fn parse_enum_or<T>(raw: Option<&str>, default: T, field: &str) -> T
where
    T: std::str::FromStr,
{
    match raw {
        None => default,
        Some(s) => s.parse().unwrap_or_else(|_| {
            warn!("unknown {field} '{s}', using default");
            default
        }),
    }
}

fn parse_enum_opt<T>(raw: &str, field: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("unknown {field} '{raw}', treating as absent");
            None
        }
    }
}

/// Parses an ISO-8601 instant, tolerating a missing offset by assuming UTC.
/// Unparsable input is absent, not fatal.
fn parse_timestamp(field: &str, raw: Option<String>) -> Option<Timestamp> {
    let raw = raw?;
    if let Ok(ts) = raw.parse::<Timestamp>() {
        return Some(ts);
    }
    if let Ok(dt) = raw.parse::<DateTime>() {
        if let Ok(zoned) = dt.to_zoned(TimeZone::UTC) {
            return Some(zoned.timestamp());
        }
    }
    warn!("unparsable {field} value '{raw}', treating as absent");
    None
}

/// Parses a civil date, tolerating a full timestamp by truncating it.
fn parse_date(field: &str, raw: Option<String>) -> Option<Date> {
    let raw = raw?;
    if let Ok(date) = raw.parse::<Date>() {
        return Some(date);
    }
    if let Ok(dt) = raw.parse::<DateTime>() {
        return Some(dt.date());
    }
    if let Ok(ts) = raw.parse::<Timestamp>() {
        return Some(ts.to_zoned(TimeZone::UTC).date());
    }
    warn!("unparsable {field} value '{raw}', treating as absent");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> WireRecord {
        serde_json::from_value(value).expect("test record must deserialize")
    }

    #[test]
    fn test_prefers_present_variant() {
        let camel_only = raw(json!({"id": 1, "trackingNumber": "A1"}));
        assert_eq!(
            normalize(&camel_only).package.tracking_number,
            Some("A1".to_string())
        );

        let snake_only = raw(json!({"id": 1, "tracking_number": "A1"}));
        assert_eq!(
            normalize(&snake_only).package.tracking_number,
            Some("A1".to_string())
        );
    }

    #[test]
    fn test_conflicting_variants_surface_and_resolve() {
        let record = raw(json!({
            "id": 1,
            "tracking_number": "A2",
            "trackingNumber": "A1",
        }));
        let normalized = normalize(&record);

        // Snake_case wins; a single determinate value is stored.
        assert_eq!(normalized.package.tracking_number, Some("A2".to_string()));
        assert_eq!(normalized.conflicts.len(), 1);
        let conflict = &normalized.conflicts[0];
        assert_eq!(conflict.field, "tracking_number");
        assert!(conflict.kept.contains("A2"));
        assert!(conflict.discarded.contains("A1"));
    }

    #[test]
    fn test_agreeing_variants_do_not_conflict() {
        let record = raw(json!({
            "id": 1,
            "tracking_number": "A1",
            "trackingNumber": "A1",
            "submitted_by": 7,
            "submittedBy": "7",
        }));
        let normalized = normalize(&record);
        assert!(normalized.conflicts.is_empty());
        assert_eq!(normalized.package.submitted_by, Some("7".to_string()));
    }

    #[test]
    fn test_numeric_ids_become_text() {
        let record = raw(json!({"id": 42, "assigned_to_manager": 7}));
        let package = normalize(&record).package;
        assert_eq!(package.id, "42");
        assert_eq!(package.assigned_to_manager, Some("7".to_string()));
    }

    #[test]
    fn test_dates_parse_once_with_fallbacks() {
        let record = raw(json!({
            "id": 1,
            "submitted_at": "2025-01-10T10:00:00Z",
            "approved_at": "2025-01-11T09:30:00",
            "dispatched_at": "not a date",
            "return_date": "2025-02-01",
            "is_returnable": true,
        }));
        let package = normalize(&record).package;

        assert_eq!(
            package.submitted_at,
            Some("2025-01-10T10:00:00Z".parse().unwrap())
        );
        // Offset-less timestamps are read as UTC.
        assert_eq!(
            package.approved_at,
            Some("2025-01-11T09:30:00Z".parse().unwrap())
        );
        assert_eq!(package.dispatched_at, None);
        assert_eq!(package.return_date, Some("2025-02-01".parse().unwrap()));
    }

    #[test]
    fn test_first_item_description_wins() {
        let record = raw(json!({
            "id": 1,
            "description": "package-level",
            "items": [
                {"description": "Oscilloscope"},
                {"description": "Probe kit"},
            ],
        }));
        let package = normalize(&record).package;
        assert_eq!(package.description, "Oscilloscope");
        assert_eq!(package.items.len(), 2);
    }

    #[test]
    fn test_dimension_flattening_preserves_array() {
        let record = raw(json!({
            "id": 1,
            "dimensions": [
                {"weight": 2.5, "weight_unit": "kg", "dimension": "10x10x5 cm"},
                {"weight": "1", "weight_unit": "kg"},
            ],
        }));
        let package = normalize(&record).package;
        assert_eq!(package.weight, Some("2.5".to_string()));
        assert_eq!(package.weight_unit, Some("kg".to_string()));
        assert_eq!(package.dimension, Some("10x10x5 cm".to_string()));
        assert_eq!(package.dimensions.len(), 2);
    }

    #[test]
    fn test_manager_summary_flattening() {
        let record = raw(json!({
            "id": 1,
            "assigned_manager": {"id": 7, "full_name": "Priya Sharma", "email": "priya@example.com"},
        }));
        let package = normalize(&record).package;
        assert_eq!(package.assigned_to_manager, Some("7".to_string()));
        let manager = package.assigned_manager.unwrap();
        assert_eq!(manager.full_name, "Priya Sharma");
    }

    #[test]
    fn test_return_record_extraction() {
        let record = raw(json!({
            "id": 1,
            "status": "dispatched",
            "is_returnable": true,
            "return_records": [{
                "returned_by": "Jane Doe",
                "returned_at": "2025-01-10T10:00:00Z",
                "return_notes": "fine",
                "status": "returned",
            }],
        }));
        let package = normalize(&record).package;
        assert_eq!(package.returned_by, Some("Jane Doe".to_string()));
        assert_eq!(package.return_status, Some(ReturnStatus::Returned));
        assert_eq!(package.return_notes, Some("fine".to_string()));
        assert!(package.returned_at.is_some());
    }

    #[test]
    fn test_return_status_dropped_when_not_returnable() {
        let record = raw(json!({
            "id": 1,
            "status": "dispatched",
            "return_status": "returned",
        }));
        let package = normalize(&record).package;
        assert_eq!(package.return_status, None);
    }

    #[test]
    fn test_unknown_status_degrades_to_submitted() {
        let record = raw(json!({"id": 1, "status": "logistics_pending"}));
        assert_eq!(normalize(&record).package.status, PackageStatus::Submitted);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let record = raw(json!({
            "id": 9,
            "status": "approved",
            "priority": "high",
            "tracking_number": "TRK00000009",
            "recipient": "Acme Labs",
            "submitted_by": 3,
            "submitted_at": "2025-01-10T10:00:00Z",
            "assigned_to_manager": 7,
            "approved_by": "7",
            "approved_at": "2025-01-11T09:30:00Z",
            "is_returnable": true,
            "return_date": "2025-02-01",
            "items": [{"description": "Oscilloscope", "quantity": 1}],
            "dimensions": [{"weight": "2.5", "weight_unit": "kg"}],
        }));
        let once = normalize(&record);
        let again = normalize(&denormalize(&once.package));

        assert_eq!(once.package, again.package);
        // A canonical record carries equal variants, so no conflicts.
        assert!(again.conflicts.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let record = raw(json!({
            "id": 9,
            "status": "dispatched",
            "tracking_number": "TRK1",
            "recipient": "Acme Labs",
            "notes": "leave at dock 3",
            "rejection_reason": "was rejected once",
            "gate_pass_serial_number": "RAPL-RGP-2526/001",
            "dispatched_at": "2025-01-12T08:00:00Z",
            "is_returnable": true,
        }));
        let wire = denormalize(&normalize(&record).package);

        assert_eq!(wire.tracking_number, Some("TRK1".to_string()));
        assert_eq!(wire.notes, Some("leave at dock 3".to_string()));
        assert_eq!(wire.rejection_reason, Some("was rejected once".to_string()));
        assert_eq!(
            wire.gate_pass_serial_number,
            Some("RAPL-RGP-2526/001".to_string())
        );
        assert_eq!(wire.dispatched_at, Some("2025-01-12T08:00:00Z".to_string()));
        // Both variants emitted for outgoing writes.
        assert_eq!(wire.tracking_number_camel, wire.tracking_number);
        assert_eq!(wire.dispatched_at_camel, wire.dispatched_at);
    }

    #[test]
    fn test_response_envelope_unwrapping() {
        let enveloped = json!({
            "message": "Package status updated to approved",
            "package": {"id": 1, "status": "approved"},
        });
        let record = record_from_response(enveloped).unwrap();
        assert_eq!(record.status, Some("approved".to_string()));

        let bare = json!({"id": 1, "status": "approved"});
        let record = record_from_response(bare).unwrap();
        assert_eq!(record.status, Some("approved".to_string()));
    }

    #[test]
    fn test_missing_id_degrades_to_empty() {
        let record = raw(json!({"status": "submitted"}));
        assert_eq!(normalize(&record).package.id, "");
    }
}
