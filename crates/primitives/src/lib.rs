//! A1 notation and grid coordinate helpers for sheetlink.
//!
//! All row/column indices in this crate are 0-based; the 1-based row numbers
//! that appear inside A1 strings are converted at the parse/format boundary.

mod a1;

pub use a1::{
    column_to_letters, format_a1, format_range, letters_to_column, parse_a1, parse_a1_range,
    qualified_range, split_range,
};

use thiserror::Error;

/// Errors raised while parsing A1-style notation.
#[derive(Debug, Error)]
pub enum A1Error {
    #[error("Invalid cell notation: {0}")]
    InvalidCellNotation(String),

    #[error("Invalid range notation: {0}")]
    InvalidRangeNotation(String),
}

/// Result type for A1 parsing operations.
pub type Result<T> = std::result::Result<T, A1Error>;
