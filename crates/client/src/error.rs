use sheetlink_auth::AuthError;
use sheetlink_http::HttpError;
use sheetlink_primitives::A1Error;
use thiserror::Error;

/// Errors that can occur while working with a cached document.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Document info not loaded. Call load_info() first")]
    NotLoaded,

    #[error("Header row not loaded. Call load_header_row() or set_header_row() first")]
    HeadersNotLoaded,

    #[error("This row has been deleted. Fetch fresh rows before mutating")]
    RowDeleted,

    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("Cells not loaded for this worksheet. Call load_cells() first")]
    CellsNotLoaded,

    #[error("Cell out of bounds: row {row}, column {column} (grid is {row_count}x{column_count})")]
    CellOutOfBounds {
        row: u32,
        column: u32,
        row_count: u32,
        column_count: u32,
    },

    #[error("Structural grid-range filters require a bearer-capable credential")]
    UnsupportedFilterForCredential,

    #[error("Unsupported export target: {0}")]
    UnsupportedExportTarget(String),

    #[error("Duplicate header name: {0}")]
    DuplicateHeader(String),

    #[error("Blank header value at column index {0}")]
    BlankHeader(usize),

    #[error("Header row is empty")]
    EmptyHeaderRow,

    #[error("Not enough columns for {headers} headers (sheet has {columns})")]
    HeaderOverflow { headers: usize, columns: u32 },

    #[error("Record key does not match any header: {0}")]
    UnknownRecordKey(String),

    #[error("Formula must begin with '=': {0}")]
    InvalidFormula(String),

    #[error("Unexpected response from the service: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    A1(#[from] A1Error),
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, Error>;
