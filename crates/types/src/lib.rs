//! # sheetlink-types
//!
//! Wire-schema records for the remote spreadsheet service.
//!
//! These structs mirror the service's documented JSON schemas field for
//! field; every name crosses a real wire boundary, so renames here are
//! breaking changes. Loosely structured blobs (cell formats, themes) are
//! carried as `serde_json::Value` rather than being typed speculatively.

mod batch;
mod cell;
mod permission;
mod sheet;
mod spreadsheet;
mod values;

pub use batch::{
    AddNamedRangeReply, AddNamedRangeRequest, AddSheetReply, AddSheetRequest, BatchUpdateRequest,
    BatchUpdateResponse, DataFilter, DeleteDimensionRequest, DeleteNamedRangeRequest,
    DeleteRangeRequest, DeleteSheetRequest, Dimension, DimensionRange, GetByDataFilterRequest,
    GridCoordinate, InsertDimensionRequest, NamedRange, Reply, Request, UpdateCellsRequest,
    UpdateSheetPropertiesRequest, UpdateSpreadsheetPropertiesRequest,
};
pub use cell::{CellData, CellFormat, ErrorValue, ExtendedValue, NumberFormat, RowData};
pub use permission::{Permission, PermissionList};
pub use sheet::{Color, GridData, GridProperties, GridRange, Sheet, SheetProperties};
pub use spreadsheet::{Spreadsheet, SpreadsheetProperties};
pub use values::{AppendValuesResponse, ClearValuesResponse, UpdateValuesResponse, ValueRange};
