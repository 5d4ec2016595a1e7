use std::collections::HashSet;

use sheetlink_primitives::{parse_a1, qualified_range};
use sheetlink_types::{
    Color, DeleteDimensionRequest, Dimension, DimensionRange, GridCoordinate, GridData,
    GridProperties, InsertDimensionRequest, Request, SheetProperties, UpdateSheetPropertiesRequest,
    ValueRange,
};

use crate::cell::Cell;
use crate::document::{CellFilter, Document};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::CellValue;

/// Cached state of one worksheet: properties, an optional cell grid, and an
/// optional header list.
///
/// A `Worksheet` never talks to the remote itself; remote-touching operations
/// go through [`WorksheetOps`], obtained from
/// [`Document::worksheet_ops`](crate::Document::worksheet_ops). The
/// back-reference to the owning document is the stable sheet id, looked up on
/// each use.
#[derive(Debug, Clone)]
pub struct Worksheet {
    sheet_id: i64,
    properties: SheetProperties,
    cells: Vec<Vec<Cell>>,
    cells_loaded: bool,
    headers: Option<Vec<String>>,
    header_row: u32,
}

impl Worksheet {
    pub(crate) fn from_properties(sheet_id: i64, properties: SheetProperties) -> Self {
        Self {
            sheet_id,
            properties,
            cells: Vec::new(),
            cells_loaded: false,
            headers: None,
            header_row: 1,
        }
    }

    #[must_use]
    pub fn sheet_id(&self) -> i64 {
        self.sheet_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.properties.title.as_deref().unwrap_or("")
    }

    /// Ordering key among sibling worksheets.
    #[must_use]
    pub fn index(&self) -> i64 {
        self.properties.index.unwrap_or(0)
    }

    #[must_use]
    pub fn sheet_type(&self) -> Option<&str> {
        self.properties.sheet_type.as_deref()
    }

    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.properties
            .grid_properties
            .as_ref()
            .and_then(|g| g.row_count)
            .unwrap_or(0)
    }

    #[must_use]
    pub fn column_count(&self) -> u32 {
        self.properties
            .grid_properties
            .as_ref()
            .and_then(|g| g.column_count)
            .unwrap_or(0)
    }

    #[must_use]
    pub fn frozen_row_count(&self) -> u32 {
        self.properties
            .grid_properties
            .as_ref()
            .and_then(|g| g.frozen_row_count)
            .unwrap_or(0)
    }

    #[must_use]
    pub fn frozen_column_count(&self) -> u32 {
        self.properties
            .grid_properties
            .as_ref()
            .and_then(|g| g.frozen_column_count)
            .unwrap_or(0)
    }

    #[must_use]
    pub fn tab_color(&self) -> Option<&Color> {
        self.properties.tab_color.as_ref()
    }

    #[must_use]
    pub fn hidden(&self) -> bool {
        self.properties.hidden.unwrap_or(false)
    }

    #[must_use]
    pub fn properties(&self) -> &SheetProperties {
        &self.properties
    }

    /// The cached header list. Requires a prior
    /// [`WorksheetOps::load_header_row`] or [`WorksheetOps::set_header_row`].
    pub fn headers(&self) -> Result<&[String]> {
        self.headers.as_deref().ok_or(Error::HeadersNotLoaded)
    }

    /// 1-based row the headers were read from or written to.
    #[must_use]
    pub fn header_row(&self) -> u32 {
        self.header_row
    }

    #[must_use]
    pub fn cells_loaded(&self) -> bool {
        self.cells_loaded
    }

    /// Cached cell at a 0-based coordinate.
    pub fn cell(&self, row: u32, column: u32) -> Result<&Cell> {
        self.check_cell_access(row, column)?;
        Ok(&self.cells[row as usize][column as usize])
    }

    /// Cached cell addressed in A1 notation, e.g. "B3".
    pub fn cell_by_a1(&self, a1: &str) -> Result<&Cell> {
        let (row, column) = parse_a1(a1)?;
        self.cell(row, column)
    }

    /// Mutable cached cell; setters on it mark it dirty for the next
    /// [`WorksheetOps::save_updated_cells`].
    pub fn cell_mut(&mut self, row: u32, column: u32) -> Result<&mut Cell> {
        self.check_cell_access(row, column)?;
        Ok(&mut self.cells[row as usize][column as usize])
    }

    /// Mutable cached cell addressed in A1 notation.
    pub fn cell_by_a1_mut(&mut self, a1: &str) -> Result<&mut Cell> {
        let (row, column) = parse_a1(a1)?;
        self.cell_mut(row, column)
    }

    fn check_cell_access(&self, row: u32, column: u32) -> Result<()> {
        if !self.cells_loaded {
            return Err(Error::CellsNotLoaded);
        }
        if row >= self.row_count() || column >= self.column_count() {
            return Err(Error::CellOutOfBounds {
                row,
                column,
                row_count: self.row_count(),
                column_count: self.column_count(),
            });
        }
        Ok(())
    }

    /// Coordinates of every cell with unsaved local changes.
    #[must_use]
    pub fn dirty_cell_coords(&self) -> Vec<(u32, u32)> {
        let mut coords = Vec::new();
        for row in &self.cells {
            for cell in row {
                if cell.is_dirty() {
                    coords.push((cell.row_index(), cell.column_index()));
                }
            }
        }
        coords
    }

    /// Merge an echoed property snapshot into this entry. Fields absent from
    /// the snapshot keep their cached values; the merge is idempotent under
    /// re-application.
    pub(crate) fn merge_properties(&mut self, incoming: SheetProperties) {
        if incoming.title.is_some() {
            self.properties.title = incoming.title;
        }
        if incoming.index.is_some() {
            self.properties.index = incoming.index;
        }
        if incoming.sheet_type.is_some() {
            self.properties.sheet_type = incoming.sheet_type;
        }
        if incoming.hidden.is_some() {
            self.properties.hidden = incoming.hidden;
        }
        if incoming.tab_color.is_some() {
            self.properties.tab_color = incoming.tab_color;
        }
        if incoming.right_to_left.is_some() {
            self.properties.right_to_left = incoming.right_to_left;
        }
        if let Some(grid) = incoming.grid_properties {
            let cached = self
                .properties
                .grid_properties
                .get_or_insert_with(GridProperties::default);
            if grid.row_count.is_some() {
                cached.row_count = grid.row_count;
            }
            if grid.column_count.is_some() {
                cached.column_count = grid.column_count;
            }
            if grid.frozen_row_count.is_some() {
                cached.frozen_row_count = grid.frozen_row_count;
            }
            if grid.frozen_column_count.is_some() {
                cached.frozen_column_count = grid.frozen_column_count;
            }
            if grid.hide_gridlines.is_some() {
                cached.hide_gridlines = grid.hide_gridlines;
            }
        }
        self.sync_cell_cache();
    }

    /// Write echoed grid blocks into the cell cache, growing it to the
    /// current grid dimensions first.
    pub(crate) fn apply_grid_data(&mut self, blocks: &[GridData]) {
        self.cells_loaded = true;
        self.sync_cell_cache();

        for block in blocks {
            let start_row = block.start_row.unwrap_or(0) as usize;
            let start_column = block.start_column.unwrap_or(0) as usize;
            let Some(rows) = &block.row_data else { continue };
            for (dr, row) in rows.iter().enumerate() {
                let Some(values) = &row.values else { continue };
                for (dc, data) in values.iter().enumerate() {
                    let (r, c) = (start_row + dr, start_column + dc);
                    if let Some(cell) = self.cells.get_mut(r).and_then(|line| line.get_mut(c)) {
                        cell.apply_cell_data(data);
                    }
                }
            }
        }
    }

    /// Keep the cell cache congruent with the grid dimensions: in-bounds
    /// cells are preserved, out-of-bounds cells discarded, new positions
    /// default-populated.
    fn sync_cell_cache(&mut self) {
        if !self.cells_loaded {
            return;
        }
        let rows = self.row_count() as usize;
        let columns = self.column_count() as usize;

        self.cells.truncate(rows);
        for (r, line) in self.cells.iter_mut().enumerate() {
            line.truncate(columns);
            while line.len() < columns {
                line.push(Cell::new(r as u32, line.len() as u32));
            }
        }
        while self.cells.len() < rows {
            let r = self.cells.len() as u32;
            let line = (0..columns).map(|c| Cell::new(r, c as u32)).collect();
            self.cells.push(line);
        }
    }

    pub(crate) fn set_header_cache(&mut self, headers: Vec<String>, row: u32) {
        self.headers = Some(headers);
        self.header_row = row;
    }
}

/// Sheet-scoped remote operations, borrowing the owning document so every
/// echoed snapshot lands in the shared cache.
pub struct WorksheetOps<'a> {
    doc: &'a mut Document,
    sheet_id: i64,
}

impl<'a> WorksheetOps<'a> {
    pub(crate) fn new(doc: &'a mut Document, sheet_id: i64) -> Self {
        Self { doc, sheet_id }
    }

    #[must_use]
    pub fn sheet_id(&self) -> i64 {
        self.sheet_id
    }

    /// The cached worksheet behind this handle.
    pub fn cache(&self) -> Result<&Worksheet> {
        self.doc.worksheet(self.sheet_id)
    }

    fn ws(&self) -> Result<&Worksheet> {
        self.doc.worksheet(self.sheet_id)
    }

    fn ws_mut(&mut self) -> Result<&mut Worksheet> {
        self.doc.worksheet_mut_internal(self.sheet_id)
    }

    // ===== Header Row Management =====

    /// Fetch the header row (default: the recorded header row, initially
    /// row 1) and cache its trimmed values.
    pub async fn load_header_row(&mut self, row: Option<u32>) -> Result<()> {
        let (title, last_column, target_row) = {
            let ws = self.ws()?;
            let target_row = row.unwrap_or_else(|| ws.header_row()).max(1);
            let last_column = ws.column_count().saturating_sub(1);
            (ws.title().to_string(), last_column, target_row)
        };

        let range = qualified_range(&title, target_row - 1, 0, target_row - 1, last_column);
        let value_range = self.doc.get_value_range(&range).await?;
        let line = value_range.values.into_iter().next().unwrap_or_default();
        let headers: Vec<String> = line
            .iter()
            .map(|v| CellValue::from_json(v).as_str().trim().to_string())
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(Error::EmptyHeaderRow);
        }
        check_duplicate_headers(&headers)?;

        self.ws_mut()?.set_header_cache(headers, target_row);
        Ok(())
    }

    /// Write an ordered list of non-empty, unique header strings into the
    /// given row (default row 1) and cache them.
    pub async fn set_header_row(&mut self, headers: Vec<String>, row: Option<u32>) -> Result<()> {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.is_empty() {
            return Err(Error::EmptyHeaderRow);
        }
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                return Err(Error::BlankHeader(i));
            }
        }
        check_duplicate_headers(&headers)?;

        let (title, column_count, target_row) = {
            let ws = self.ws()?;
            let target_row = row.unwrap_or(1).max(1);
            (ws.title().to_string(), ws.column_count(), target_row)
        };
        if headers.len() as u32 > column_count {
            return Err(Error::HeaderOverflow {
                headers: headers.len(),
                columns: column_count,
            });
        }

        let range = qualified_range(
            &title,
            target_row - 1,
            0,
            target_row - 1,
            (headers.len() - 1) as u32,
        );
        let body = ValueRange {
            range: Some(range.clone()),
            major_dimension: Some("ROWS".into()),
            values: vec![headers
                .iter()
                .map(|h| serde_json::Value::String(h.clone()))
                .collect()],
        };
        let response = self.doc.put_value_range(&range, &body).await?;

        let cached = response
            .updated_data
            .and_then(|data| data.values.into_iter().next())
            .map(|line| {
                line.iter()
                    .map(|v| CellValue::from_json(v).as_str().trim().to_string())
                    .collect()
            })
            .unwrap_or(headers);
        self.ws_mut()?.set_header_cache(cached, target_row);
        Ok(())
    }

    // ===== Row Access =====

    /// Fetch the data rows below the header row, optionally bounded by
    /// `offset`/`limit`, as [`Row`] views in ascending row order.
    ///
    /// Returned rows are snapshots: re-fetch after any structural change.
    pub async fn get_rows(&mut self, offset: usize, limit: Option<usize>) -> Result<Vec<Row>> {
        let (sheet_id, title, headers, header_row, row_count) = {
            let ws = self.ws()?;
            (
                ws.sheet_id(),
                ws.title().to_string(),
                ws.headers()?.to_vec(),
                ws.header_row(),
                ws.row_count(),
            )
        };

        let first = header_row as usize + 1 + offset;
        let mut last = row_count as usize;
        if let Some(limit) = limit {
            if limit == 0 {
                return Ok(Vec::new());
            }
            last = last.min(first + limit - 1);
        }
        if first > last {
            return Ok(Vec::new());
        }

        let last_column = (headers.len() - 1) as u32;
        let range = qualified_range(&title, (first - 1) as u32, 0, (last - 1) as u32, last_column);
        let value_range = self.doc.get_value_range(&range).await?;

        Ok(value_range
            .values
            .iter()
            .enumerate()
            .map(|(i, line)| {
                Row::new(
                    sheet_id,
                    title.clone(),
                    headers.clone(),
                    (first + i) as u32,
                    line.iter().map(CellValue::from_json).collect(),
                )
            })
            .collect())
    }

    /// Append one record keyed by header names.
    pub async fn add_row<K, V, I>(&mut self, record: I) -> Result<Row>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<CellValue>,
    {
        let values = self.record_to_values(record)?;
        let mut rows = self.add_rows_values(vec![values]).await?;
        rows.pop()
            .ok_or_else(|| Error::UnexpectedResponse("append echoed no inserted rows".into()))
    }

    /// Append several records keyed by header names.
    pub async fn add_rows<K, V, I>(&mut self, records: Vec<I>) -> Result<Vec<Row>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<CellValue>,
    {
        let mut lines = Vec::with_capacity(records.len());
        for record in records {
            lines.push(self.record_to_values(record)?);
        }
        self.add_rows_values(lines).await
    }

    /// Append positional value lines below the current data region and
    /// return [`Row`] views built from the echoed inserted data.
    pub async fn add_rows_values(&mut self, lines: Vec<Vec<CellValue>>) -> Result<Vec<Row>> {
        let (sheet_id, title, headers, header_row) = {
            let ws = self.ws()?;
            (
                ws.sheet_id(),
                ws.title().to_string(),
                ws.headers()?.to_vec(),
                ws.header_row(),
            )
        };

        let anchor = qualified_range(
            &title,
            header_row - 1,
            0,
            header_row - 1,
            (headers.len() - 1) as u32,
        );
        let body = ValueRange {
            range: None,
            major_dimension: Some("ROWS".into()),
            values: lines
                .iter()
                .map(|line| line.iter().map(CellValue::to_json).collect())
                .collect(),
        };

        let response = self.doc.append_values(&anchor, &body).await?;
        let updated = response
            .updates
            .and_then(|u| u.updated_data)
            .ok_or_else(|| Error::UnexpectedResponse("append response missing updatedData".into()))?;
        let echoed_range = updated
            .range
            .ok_or_else(|| Error::UnexpectedResponse("append echo missing range".into()))?;
        let (_, ((start_row, _), _)) = sheetlink_primitives::split_range(&echoed_range)?;

        Ok(updated
            .values
            .iter()
            .enumerate()
            .map(|(i, line)| {
                Row::new(
                    sheet_id,
                    title.clone(),
                    headers.clone(),
                    start_row + 1 + i as u32,
                    line.iter().map(CellValue::from_json).collect(),
                )
            })
            .collect())
    }

    /// Remove every data row below the header row without deleting the
    /// worksheet. Previously issued [`Row`] views become stale.
    pub async fn clear_rows(&mut self) -> Result<()> {
        let (title, header_row, row_count, column_count) = {
            let ws = self.ws()?;
            (
                ws.title().to_string(),
                ws.header_row(),
                ws.row_count(),
                ws.column_count(),
            )
        };

        let first = header_row + 1;
        if row_count < first || column_count == 0 {
            return Ok(());
        }
        let range = qualified_range(&title, first - 1, 0, row_count - 1, column_count - 1);
        self.doc.clear_values(&range).await?;
        Ok(())
    }

    // ===== Grid Structural Ops =====

    /// Resize the grid. The cell cache follows: in-bounds cells survive,
    /// the rest are discarded or default-populated.
    pub async fn resize(&mut self, row_count: u32, column_count: u32) -> Result<()> {
        self.ws()?;
        let properties = SheetProperties {
            sheet_id: Some(self.sheet_id),
            grid_properties: Some(GridProperties {
                row_count: Some(row_count),
                column_count: Some(column_count),
                ..Default::default()
            }),
            ..Default::default()
        };
        self.doc
            .send_single_request(Request::UpdateSheetProperties(
                UpdateSheetPropertiesRequest {
                    properties,
                    fields: "gridProperties(rowCount,columnCount)".into(),
                },
            ))
            .await?;
        Ok(())
    }

    pub async fn set_frozen_rows(&mut self, count: u32) -> Result<()> {
        self.update_frozen("gridProperties.frozenRowCount", |grid| {
            grid.frozen_row_count = Some(count);
        })
        .await
    }

    pub async fn set_frozen_columns(&mut self, count: u32) -> Result<()> {
        self.update_frozen("gridProperties.frozenColumnCount", |grid| {
            grid.frozen_column_count = Some(count);
        })
        .await
    }

    async fn update_frozen(
        &mut self,
        fields: &str,
        set: impl FnOnce(&mut GridProperties),
    ) -> Result<()> {
        self.ws()?;
        let mut grid = GridProperties::default();
        set(&mut grid);
        let properties = SheetProperties {
            sheet_id: Some(self.sheet_id),
            grid_properties: Some(grid),
            ..Default::default()
        };
        self.doc
            .send_single_request(Request::UpdateSheetProperties(
                UpdateSheetPropertiesRequest {
                    properties,
                    fields: fields.into(),
                },
            ))
            .await?;
        Ok(())
    }

    /// Patch title/index/visual properties. Grid dimensions go through
    /// [`WorksheetOps::resize`] instead.
    pub async fn update_properties(&mut self, mut patch: SheetProperties) -> Result<()> {
        self.ws()?;
        let fields = patch.field_mask();
        if fields.is_empty() {
            return Ok(());
        }
        patch.sheet_id = Some(self.sheet_id);
        patch.grid_properties = None;
        self.doc
            .send_single_request(Request::UpdateSheetProperties(
                UpdateSheetPropertiesRequest {
                    properties: patch,
                    fields,
                },
            ))
            .await?;
        Ok(())
    }

    /// Insert a run of rows or columns at `start_index` (0-based).
    pub async fn insert_dimension(
        &mut self,
        dimension: Dimension,
        start_index: u32,
        end_index: u32,
        inherit_from_before: bool,
    ) -> Result<()> {
        self.ws()?;
        self.doc
            .send_single_request(Request::InsertDimension(InsertDimensionRequest {
                range: DimensionRange {
                    sheet_id: self.sheet_id,
                    dimension,
                    start_index: Some(start_index),
                    end_index: Some(end_index),
                },
                inherit_from_before,
            }))
            .await?;
        Ok(())
    }

    /// Delete a run of rows or columns.
    pub async fn delete_dimension(
        &mut self,
        dimension: Dimension,
        start_index: u32,
        end_index: u32,
    ) -> Result<()> {
        self.ws()?;
        self.doc
            .send_single_request(Request::DeleteDimension(DeleteDimensionRequest {
                range: DimensionRange {
                    sheet_id: self.sheet_id,
                    dimension,
                    start_index: Some(start_index),
                    end_index: Some(end_index),
                },
            }))
            .await?;
        Ok(())
    }

    // ===== Cell Access =====

    /// Load this sheet's full cell grid into the cache.
    pub async fn load_cells(&mut self) -> Result<()> {
        let title = self.ws()?.title().to_string();
        self.doc.load_cells(vec![CellFilter::A1(title)]).await
    }

    /// Load a filtered subset of this sheet's cells. Bare A1 strings are
    /// qualified with the sheet title; grid ranges get this sheet's id.
    pub async fn load_cells_filtered(&mut self, filters: Vec<CellFilter>) -> Result<()> {
        let title = self.ws()?.title().to_string();
        let filters = filters
            .into_iter()
            .map(|filter| match filter {
                CellFilter::A1(a1) if !a1.contains('!') => {
                    CellFilter::A1(format!("{title}!{a1}"))
                }
                CellFilter::GridRange(mut range) => {
                    range.sheet_id.get_or_insert(self.sheet_id);
                    CellFilter::GridRange(range)
                }
                other => other,
            })
            .collect();
        self.doc.load_cells(filters).await
    }

    /// Save every cell with unsaved local changes in one batched request.
    pub async fn save_updated_cells(&mut self) -> Result<()> {
        let coords = self.ws()?.dirty_cell_coords();
        if coords.is_empty() {
            return Ok(());
        }
        self.save_cells(&coords).await
    }

    /// Save a specific subset of cells. Cells without local changes are
    /// skipped.
    pub async fn save_cells(&mut self, coords: &[(u32, u32)]) -> Result<()> {
        let (title, requests, bounds) = {
            let ws = self.ws()?;
            let mut requests = Vec::new();
            let mut bounds: Option<(u32, u32, u32, u32)> = None;
            for &(row, column) in coords {
                let cell = ws.cell(row, column)?;
                if !cell.is_dirty() {
                    continue;
                }
                requests.push(Request::UpdateCells(sheetlink_types::UpdateCellsRequest {
                    rows: vec![cell.to_update_row()],
                    fields: cell.update_fields(),
                    start: GridCoordinate {
                        sheet_id: self.sheet_id,
                        row_index: row,
                        column_index: column,
                    },
                }));
                bounds = Some(match bounds {
                    None => (row, column, row, column),
                    Some((min_r, min_c, max_r, max_c)) => (
                        min_r.min(row),
                        min_c.min(column),
                        max_r.max(row),
                        max_c.max(column),
                    ),
                });
            }
            (ws.title().to_string(), requests, bounds)
        };

        let Some((min_r, min_c, max_r, max_c)) = bounds else {
            return Ok(());
        };
        let response_range = qualified_range(&title, min_r, min_c, max_r, max_c);
        self.doc
            .send_batch_requests(requests, vec![response_range])
            .await?;
        Ok(())
    }

    fn record_to_values<K, V, I>(&self, record: I) -> Result<Vec<CellValue>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<CellValue>,
    {
        let headers = self.ws()?.headers()?;
        let mut values = vec![CellValue::Empty; headers.len()];
        for (key, value) in record {
            let index = headers
                .iter()
                .position(|h| h == key.as_ref())
                .ok_or_else(|| Error::UnknownRecordKey(key.as_ref().to_string()))?;
            values[index] = value.into();
        }
        Ok(values)
    }
}

fn check_duplicate_headers(headers: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for header in headers {
        if header.is_empty() {
            continue;
        }
        if !seen.insert(header.as_str()) {
            return Err(Error::DuplicateHeader(header.clone()));
        }
    }
    Ok(())
}
