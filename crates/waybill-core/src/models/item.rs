//! Nested package substructures: line items, dimension entries, and the
//! assigned-manager summary.
//!
//! These arrive inside the package record's nested arrays. The substrate
//! emits them in snake_case; camelCase aliases are accepted on input for
//! records that passed through the older naming convention.

use serde::{Deserialize, Deserializer, Serialize};

/// A single line item inside a package.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PackageItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub description: String,

    #[serde(alias = "serialNumber", skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    #[serde(alias = "hsnCode", skip_serializing_if = "Option::is_none")]
    pub hsn_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    #[serde(
        alias = "unitPrice",
        deserialize_with = "flexible_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit_price: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// A weight/dimension entry for a package.
///
/// Weights reach us as JSON strings or numbers depending on which substrate
/// path produced the record; both normalize to a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PackageDimension {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(deserialize_with = "flexible_string", skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,

    #[serde(alias = "weightUnit", skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,

    #[serde(alias = "isCommon")]
    pub is_common: bool,
}

/// Summary of the manager a package is assigned to, derived from the nested
/// `assigned_manager` object on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManagerSummary {
    pub id: String,

    #[serde(alias = "fullName")]
    pub full_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Accepts a JSON string, number, or null and yields an optional string.
fn flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    let value: Option<StringOrNumber> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringOrNumber::Text(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_weight_accepts_number() {
        let dim: PackageDimension =
            serde_json::from_str(r#"{"weight": 2.5, "weight_unit": "kg"}"#).unwrap();
        assert_eq!(dim.weight, Some("2.5".to_string()));
        assert_eq!(dim.weight_unit, Some("kg".to_string()));
    }

    #[test]
    fn test_dimension_weight_accepts_string() {
        let dim: PackageDimension =
            serde_json::from_str(r#"{"weight": "2.5", "weightUnit": "kg"}"#).unwrap();
        assert_eq!(dim.weight, Some("2.5".to_string()));
        assert_eq!(dim.weight_unit, Some("kg".to_string()));
    }

    #[test]
    fn test_item_camel_case_aliases() {
        let item: PackageItem = serde_json::from_str(
            r#"{"description": "Oscilloscope", "serialNumber": "SN-1", "hsnCode": "9030"}"#,
        )
        .unwrap();
        assert_eq!(item.serial_number, Some("SN-1".to_string()));
        assert_eq!(item.hsn_code, Some("9030".to_string()));
    }

    #[test]
    fn test_manager_summary_full_name_alias() {
        let manager: ManagerSummary =
            serde_json::from_str(r#"{"id": "7", "fullName": "Priya Sharma"}"#).unwrap();
        assert_eq!(manager.full_name, "Priya Sharma");
        assert_eq!(manager.email, None);
    }
}
