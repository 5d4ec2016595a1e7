use serde::{Deserialize, Serialize};

use crate::cell::RowData;

/// One sheet within a spreadsheet, with optional cell grid data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub properties: SheetProperties,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<GridData>>,
}

/// Sheet-level property bag. Doubles as an update patch, like
/// [`crate::SpreadsheetProperties`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,

    /// Wire string such as "GRID" or "OBJECT"; kept untyped so unknown
    /// values round-trip through the cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_properties: Option<GridProperties>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_color: Option<Color>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_to_left: Option<bool>,
}

impl SheetProperties {
    /// Wire field paths set in this patch (grid properties excluded; grid
    /// resizes and freezes build their own masks).
    #[must_use]
    pub fn field_mask(&self) -> String {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.index.is_some() {
            fields.push("index");
        }
        if self.hidden.is_some() {
            fields.push("hidden");
        }
        if self.tab_color.is_some() {
            fields.push("tabColor");
        }
        if self.right_to_left.is_some() {
            fields.push("rightToLeft");
        }
        fields.join(",")
    }
}

/// Grid dimensions and frozen pane counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen_row_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen_column_count: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_gridlines: Option<bool>,
}

/// RGBA color; channels are 0.0..=1.0 and omitted when unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f32>,
}

/// A half-open rectangle of grid coordinates. Absent bounds mean "unbounded
/// on that side", per the service's range semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<u32>,
}

/// One contiguous block of cell data within a sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_row: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_data: Option<Vec<RowData>>,
}
