//! Cached client model for a remote spreadsheet document.
//!
//! A [`Document`] mirrors one remote spreadsheet: its property bag, its
//! worksheets, and (on demand) their cell grids. Callers mutate
//! [`Worksheet`]/[`Row`]/[`Cell`] state locally, then explicitly flush;
//! every mutation travels as a batched update request, and the authoritative
//! state echoed in the response is merged back into the cache by a keyed
//! upsert.
//!
//! # Examples
//!
//! ## Loading a document and reading rows
//!
//! ```no_run
//! use sheetlink_client::{Credential, Document};
//!
//! # async fn run() -> sheetlink_client::Result<()> {
//! let mut doc = Document::new("document-id", Credential::access_token("token"))?;
//! doc.load_info(false).await?;
//! println!("{}", doc.title()?);
//!
//! let sheet_id = doc.worksheets()?[0].sheet_id();
//! let mut ops = doc.worksheet_ops(sheet_id)?;
//! ops.load_header_row(None).await?;
//! for row in ops.get_rows(0, Some(10)).await? {
//!     println!("{:?}", row.get("name"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Appending a record
//!
//! ```no_run
//! use sheetlink_client::Document;
//!
//! # async fn run(doc: &mut Document, sheet_id: i64) -> sheetlink_client::Result<()> {
//! let mut ops = doc.worksheet_ops(sheet_id)?;
//! let row = ops.add_row([("name", "Al"), ("age", "30")]).await?;
//! assert_eq!(row.get("name").unwrap().as_str(), "Al");
//! # Ok(())
//! # }
//! ```
//!
//! # Consistency model
//!
//! Single-threaded cooperative: every remote operation borrows the document
//! mutably, so no two mutations overlap and no locking exists. There is no
//! optimistic concurrency — concurrent sessions against the same remote
//! document race, and the last echo applied wins. [`Row`] views are
//! snapshots; re-fetch rows after any structural change.

mod cell;
mod document;
mod error;
mod row;
mod value;
mod worksheet;

pub use cell::Cell;
pub use document::{AddWorksheetOptions, CellFilter, Document, ExportFormat};
pub use error::{Error, Result};
pub use row::Row;
pub use value::CellValue;
pub use worksheet::{Worksheet, WorksheetOps};

/// Re-export of the credential shapes consumed by [`Document`].
pub use sheetlink_auth::{AuthDirective, AuthError, Authorize, Credential, ProvideToken};
/// Re-export of the transport configuration consumed by [`Document`].
pub use sheetlink_http::{ClientOptions, HttpError};
/// Wire-schema records, for callers building raw batch requests.
pub use sheetlink_types as types;
