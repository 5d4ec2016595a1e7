use serde::{Deserialize, Serialize};

/// A rectangular block of raw cell values, as used by the values endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    /// "ROWS" or "COLUMNS".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Vec<serde_json::Value>>,
}

/// Response of a values update (PUT).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    #[serde(default)]
    pub updated_range: Option<String>,

    #[serde(default)]
    pub updated_rows: Option<u32>,

    #[serde(default)]
    pub updated_columns: Option<u32>,

    #[serde(default)]
    pub updated_cells: Option<u32>,

    /// Echoed values, present when the request asked for them.
    #[serde(default)]
    pub updated_data: Option<ValueRange>,
}

/// Response of a values append (POST `:append`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    #[serde(default)]
    pub table_range: Option<String>,

    #[serde(default)]
    pub updates: Option<UpdateValuesResponse>,
}

/// Response of a values clear (POST `:clear`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    #[serde(default)]
    pub cleared_range: Option<String>,
}
