//! Minimal end-to-end walkthrough: load a document, read its worksheets,
//! append a row, and flush a cell edit.
//!
//! ```sh
//! SHEETLINK_DOC_ID=... SHEETLINK_TOKEN=... cargo run --example quickstart
//! ```

use sheetlink_client::{CellFilter, Credential, Document};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetlink=debug".into()),
        )
        .init();

    let doc_id = std::env::var("SHEETLINK_DOC_ID")
        .map_err(|_| "set SHEETLINK_DOC_ID to a document id")?;
    let token =
        std::env::var("SHEETLINK_TOKEN").map_err(|_| "set SHEETLINK_TOKEN to a bearer token")?;

    let mut doc = Document::new(doc_id, Credential::access_token(token))?;
    doc.load_info(false).await?;
    println!("document: {}", doc.title()?);

    for ws in doc.worksheets()? {
        println!(
            "  sheet {} ({}): {} x {}",
            ws.title(),
            ws.sheet_id(),
            ws.row_count(),
            ws.column_count()
        );
    }

    let sheet_id = doc.worksheets()?[0].sheet_id();
    let mut ops = doc.worksheet_ops(sheet_id)?;
    ops.load_header_row(None).await?;

    let row = ops.add_row([("name", "Al"), ("age", "30")]).await?;
    println!("appended row {} at {}", row.row_number(), row.a1_range());

    // Cell-level edit: load the grid, mutate locally, flush one batch.
    doc.worksheet_ops(sheet_id)?
        .load_cells_filtered(vec![CellFilter::A1("A1:C10".into())])
        .await?;
    doc.worksheet_mut(sheet_id)?
        .cell_mut(0, 2)?
        .set_value("updated");
    doc.worksheet_ops(sheet_id)?.save_updated_cells().await?;

    Ok(())
}
