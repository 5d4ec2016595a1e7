use serde::{Deserialize, Serialize};

/// One row of cell data inside a [`crate::GridData`] block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<CellData>>,
}

/// A single cell as it appears on the wire.
///
/// `user_entered_value` is what the author typed (possibly a formula);
/// `effective_value` is what the service computed from it. Both can be
/// present simultaneously.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_entered_value: Option<ExtendedValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_value: Option<ExtendedValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_entered_format: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_format: Option<CellFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The one-of value union the service uses for cell contents. Exactly one
/// field is set on a well-formed wire record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool_value: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_value: Option<ErrorValue>,
}

impl ExtendedValue {
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self {
            number_value: Some(value),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            string_value: Some(value.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self {
            bool_value: Some(value),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn formula(expression: impl Into<String>) -> Self {
        Self {
            formula_value: Some(expression.into()),
            ..Default::default()
        }
    }
}

/// A formula evaluation error reported by the service for one cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorValue {
    /// Error class, e.g. "DIVIDE_BY_ZERO" or "REF".
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Effective cell format. Only the number format is typed; the rest of the
/// format tree stays loose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<NumberFormat>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Number format of a cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberFormat {
    /// Format class, e.g. "NUMBER", "DATE", "CURRENCY".
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub format_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}
