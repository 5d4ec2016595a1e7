use serde::{Deserialize, Serialize};

use crate::cell::RowData;
use crate::sheet::{GridRange, SheetProperties};
use crate::spreadsheet::{Spreadsheet, SpreadsheetProperties};

/// Envelope for the `:batchUpdate` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateRequest {
    pub requests: Vec<Request>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub include_spreadsheet_in_response: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_ranges: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub response_include_grid_data: bool,
}

/// Reply envelope for `:batchUpdate`. `replies` is positional: one entry per
/// submitted request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    #[serde(default)]
    pub replies: Vec<Reply>,

    #[serde(default)]
    pub updated_spreadsheet: Option<Spreadsheet>,
}

/// One mutation inside a batch envelope. Serializes externally tagged, which
/// is exactly the service's one-of shape: `{"addSheet": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    AddSheet(AddSheetRequest),
    DeleteSheet(DeleteSheetRequest),
    UpdateSheetProperties(UpdateSheetPropertiesRequest),
    UpdateSpreadsheetProperties(UpdateSpreadsheetPropertiesRequest),
    AddNamedRange(AddNamedRangeRequest),
    DeleteNamedRange(DeleteNamedRangeRequest),
    DeleteRange(DeleteRangeRequest),
    InsertDimension(InsertDimensionRequest),
    DeleteDimension(DeleteDimensionRequest),
    UpdateCells(UpdateCellsRequest),
}

/// The per-operation payload slot of one reply. The service returns an object
/// with at most one operation key set; operations without a payload come back
/// as an empty object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default)]
    pub add_sheet: Option<AddSheetReply>,

    #[serde(default)]
    pub add_named_range: Option<AddNamedRangeReply>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSheetRequest {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSheetReply {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSheetRequest {
    pub sheet_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSheetPropertiesRequest {
    pub properties: SheetProperties,
    pub fields: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpreadsheetPropertiesRequest {
    pub properties: SpreadsheetProperties,
    pub fields: String,
}

/// A named range definition; `named_range_id` is assigned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_range_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<GridRange>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNamedRangeRequest {
    pub named_range: NamedRange,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNamedRangeReply {
    pub named_range: NamedRange,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNamedRangeRequest {
    pub named_range_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRangeRequest {
    pub range: GridRange,
    pub shift_dimension: Dimension,
}

/// Row or column axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    #[default]
    Rows,
    Columns,
}

/// A contiguous span of rows or columns within one sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: i64,
    pub dimension: Dimension,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertDimensionRequest {
    pub range: DimensionRange,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inherit_from_before: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDimensionRequest {
    pub range: DimensionRange,
}

/// Anchor coordinate for an `updateCells` write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCoordinate {
    pub sheet_id: i64,
    pub row_index: u32,
    pub column_index: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCellsRequest {
    pub rows: Vec<RowData>,
    pub fields: String,
    pub start: GridCoordinate,
}

/// One filter for a `:getByDataFilter` cell fetch: either an A1 range string
/// or a structural grid range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataFilter {
    A1Range(String),
    GridRange(GridRange),
}

/// Body of the `:getByDataFilter` endpoint.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetByDataFilterRequest {
    pub data_filters: Vec<DataFilter>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub include_grid_data: bool,
}
