use indexmap::IndexMap;
use sheetlink_auth::{AuthError, Credential};
use sheetlink_http::{ApiClient, ClientOptions};
use sheetlink_types::{
    AddNamedRangeRequest, AddSheetRequest, AppendValuesResponse, BatchUpdateRequest,
    BatchUpdateResponse, ClearValuesResponse, DataFilter, DeleteDimensionRequest,
    DeleteNamedRangeRequest, DeleteSheetRequest, Dimension, DimensionRange,
    GetByDataFilterRequest, GridRange, NamedRange, Permission, PermissionList, Reply, Request,
    SheetProperties, Spreadsheet, SpreadsheetProperties, UpdateSpreadsheetPropertiesRequest,
    UpdateValuesResponse, ValueRange,
};

use crate::error::{Error, Result};
use crate::worksheet::{Worksheet, WorksheetOps};

/// How much of the document an echoed snapshot describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EchoScope {
    /// The snapshot lists every worksheet; cached entries absent from it are
    /// evicted.
    Full,
    /// The snapshot covers a filtered subset; nothing is evicted.
    Partial,
}

/// One filter for a cell fetch: an A1 range string or a structural grid
/// range. Structural ranges require a bearer-capable credential.
#[derive(Debug, Clone)]
pub enum CellFilter {
    A1(String),
    GridRange(GridRange),
}

impl From<&str> for CellFilter {
    fn from(a1: &str) -> Self {
        CellFilter::A1(a1.to_string())
    }
}

impl From<GridRange> for CellFilter {
    fn from(range: GridRange) -> Self {
        CellFilter::GridRange(range)
    }
}

/// Export payload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Whole-document spreadsheet file.
    Xlsx,
    /// Whole-document OpenDocument spreadsheet.
    Ods,
    /// Whole document as zipped HTML.
    Zip,
    /// One worksheet as legacy HTML.
    Html,
    /// One worksheet as CSV.
    Csv,
    /// One worksheet as TSV.
    Tsv,
    /// One worksheet as PDF.
    Pdf,
}

impl ExportFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Ods => "ods",
            ExportFormat::Zip => "zip",
            ExportFormat::Html => "html",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Whether this format exports a single worksheet rather than the whole
    /// document.
    #[must_use]
    pub fn requires_worksheet(self) -> bool {
        matches!(
            self,
            ExportFormat::Csv | ExportFormat::Tsv | ExportFormat::Pdf | ExportFormat::Html
        )
    }
}

/// Inputs for [`Document::add_worksheet`]. Header fields are client-side
/// conveniences and are not part of the sheet-creation wire request.
#[derive(Debug, Clone, Default)]
pub struct AddWorksheetOptions {
    pub properties: SheetProperties,
    pub header_values: Option<Vec<String>>,
    pub header_row: Option<u32>,
}

/// Local cache of one remote spreadsheet document.
///
/// Starts unloaded: every property and worksheet accessor fails with
/// [`Error::NotLoaded`] until [`Document::load_info`] (or the echo of a first
/// mutation) establishes the cache. All mutations flow through batched update
/// requests whose echoed snapshots are merged back by a keyed upsert, so an
/// externally held [`Worksheet`] reference observes updates rather than being
/// replaced.
#[derive(Debug)]
pub struct Document {
    spreadsheet_id: String,
    credential: Credential,
    sheets_api: ApiClient,
    files_api: ApiClient,
    properties: Option<SpreadsheetProperties>,
    spreadsheet_url: Option<String>,
    worksheets: IndexMap<i64, Worksheet>,
}

impl Document {
    /// Bind a cache to an existing remote document. No remote call is made.
    pub fn new(spreadsheet_id: impl Into<String>, credential: Credential) -> Result<Self> {
        Self::with_options(spreadsheet_id, credential, &ClientOptions::default())
    }

    /// Like [`Document::new`] with explicit endpoint configuration.
    pub fn with_options(
        spreadsheet_id: impl Into<String>,
        credential: Credential,
        options: &ClientOptions,
    ) -> Result<Self> {
        let spreadsheet_id = spreadsheet_id.into();
        let sheets_api = ApiClient::new(
            format!("{}/{}", options.sheets_base_url, spreadsheet_id),
            credential.clone(),
            options.timeout,
        )?;
        let files_api = ApiClient::new(
            format!("{}/{}", options.files_base_url, spreadsheet_id),
            credential.clone(),
            options.timeout,
        )?;

        Ok(Self {
            spreadsheet_id,
            credential,
            sheets_api,
            files_api,
            properties: None,
            spreadsheet_url: None,
            worksheets: IndexMap::new(),
        })
    }

    /// Create a brand-new remote document and return its pre-seeded cache.
    /// Requires a write-capable credential.
    pub async fn create(
        credential: Credential,
        properties: SpreadsheetProperties,
        options: &ClientOptions,
    ) -> Result<Self> {
        if credential.is_read_only() {
            return Err(Error::Auth(AuthError::InvalidCredential(
                "API-key credentials cannot create documents".into(),
            )));
        }

        let bare = ApiClient::new(
            options.sheets_base_url.clone(),
            credential.clone(),
            options.timeout,
        )?;
        let body = Spreadsheet {
            properties: Some(properties),
            ..Default::default()
        };
        let created: Spreadsheet = bare.post_json("", &[], &body).await?;

        let spreadsheet_id = created
            .spreadsheet_id
            .clone()
            .ok_or_else(|| Error::UnexpectedResponse("created document has no id".into()))?;
        let mut doc = Self::with_options(spreadsheet_id, credential, options)?;
        doc.apply_spreadsheet(created, EchoScope::Full);
        Ok(doc)
    }

    // ===== Cached State Access =====

    #[must_use]
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.properties.is_some()
    }

    /// Document property bag; fails until loaded.
    pub fn properties(&self) -> Result<&SpreadsheetProperties> {
        self.properties.as_ref().ok_or(Error::NotLoaded)
    }

    pub fn title(&self) -> Result<&str> {
        Ok(self.properties()?.title.as_deref().unwrap_or(""))
    }

    pub fn locale(&self) -> Result<Option<&str>> {
        Ok(self.properties()?.locale.as_deref())
    }

    pub fn time_zone(&self) -> Result<Option<&str>> {
        Ok(self.properties()?.time_zone.as_deref())
    }

    pub fn auto_recalc(&self) -> Result<Option<&str>> {
        Ok(self.properties()?.auto_recalc.as_deref())
    }

    /// The document's web URL, recorded by the first load.
    pub fn spreadsheet_url(&self) -> Result<&str> {
        self.spreadsheet_url.as_deref().ok_or(Error::NotLoaded)
    }

    pub fn worksheet_count(&self) -> Result<usize> {
        self.require_loaded()?;
        Ok(self.worksheets.len())
    }

    /// Cached worksheet by stable sheet id.
    pub fn worksheet(&self, sheet_id: i64) -> Result<&Worksheet> {
        self.require_loaded()?;
        self.worksheets
            .get(&sheet_id)
            .ok_or_else(|| Error::WorksheetNotFound(sheet_id.to_string()))
    }

    /// Cached worksheet by position (ordering key, not insertion order).
    pub fn worksheet_by_index(&self, index: i64) -> Result<&Worksheet> {
        self.require_loaded()?;
        self.worksheets
            .values()
            .find(|ws| ws.index() == index)
            .ok_or_else(|| Error::WorksheetNotFound(format!("index {index}")))
    }

    pub fn worksheet_by_title(&self, title: &str) -> Result<&Worksheet> {
        self.require_loaded()?;
        self.worksheets
            .values()
            .find(|ws| ws.title() == title)
            .ok_or_else(|| Error::WorksheetNotFound(title.to_string()))
    }

    /// All cached worksheets in index order.
    pub fn worksheets(&self) -> Result<Vec<&Worksheet>> {
        self.require_loaded()?;
        let mut sheets: Vec<&Worksheet> = self.worksheets.values().collect();
        sheets.sort_by_key(|ws| ws.index());
        Ok(sheets)
    }

    /// Handle for sheet-scoped remote operations.
    pub fn worksheet_ops(&mut self, sheet_id: i64) -> Result<WorksheetOps<'_>> {
        self.worksheet(sheet_id)?;
        Ok(WorksheetOps::new(self, sheet_id))
    }

    pub(crate) fn worksheet_mut_internal(&mut self, sheet_id: i64) -> Result<&mut Worksheet> {
        self.worksheets
            .get_mut(&sheet_id)
            .ok_or_else(|| Error::WorksheetNotFound(sheet_id.to_string()))
    }

    /// Mutable cached worksheet, for local cell edits ahead of a batched
    /// save.
    pub fn worksheet_mut(&mut self, sheet_id: i64) -> Result<&mut Worksheet> {
        self.require_loaded()?;
        self.worksheet_mut_internal(sheet_id)
    }

    fn require_loaded(&self) -> Result<()> {
        if self.properties.is_none() {
            return Err(Error::NotLoaded);
        }
        Ok(())
    }

    // ===== Loading & Cache Lifecycle =====

    /// Fetch document properties and every worksheet summary; with
    /// `include_cells`, also fetch all cell grids.
    pub async fn load_info(&mut self, include_cells: bool) -> Result<()> {
        let mut query = Vec::new();
        if include_cells {
            query.push(("includeGridData", "true".to_string()));
        }
        let snapshot: Spreadsheet = self.sheets_api.get_json("", &query).await?;
        self.apply_spreadsheet(snapshot, EchoScope::Full);
        tracing::debug!(
            "loaded document {} with {} worksheets",
            self.spreadsheet_id,
            self.worksheets.len()
        );
        Ok(())
    }

    /// Drop all cached state back to unloaded. No remote call; the next
    /// [`Document::load_info`] refetches everything.
    pub fn reset_local_cache(&mut self) {
        self.properties = None;
        self.spreadsheet_url = None;
        self.worksheets.clear();
    }

    /// Merge an echoed document snapshot into the cache.
    ///
    /// Properties are replaced wholesale; worksheets are upserted by sheet
    /// id — existing entries are merged in place so externally held
    /// references stay valid. Idempotent under re-application of the same
    /// snapshot.
    fn apply_spreadsheet(&mut self, snapshot: Spreadsheet, scope: EchoScope) {
        if snapshot.properties.is_some() {
            self.properties = snapshot.properties;
        }
        if snapshot.spreadsheet_url.is_some() {
            self.spreadsheet_url = snapshot.spreadsheet_url;
        }

        let Some(sheets) = snapshot.sheets else {
            return;
        };

        let mut seen = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            let Some(sheet_id) = sheet.properties.sheet_id else {
                tracing::warn!("ignoring echoed sheet without a sheetId");
                continue;
            };
            seen.push(sheet_id);
            let entry = self
                .worksheets
                .entry(sheet_id)
                .or_insert_with(|| Worksheet::from_properties(sheet_id, SheetProperties::default()));
            entry.merge_properties(sheet.properties);
            if let Some(data) = sheet.data {
                entry.apply_grid_data(&data);
            }
        }

        if scope == EchoScope::Full {
            self.worksheets.retain(|id, _| seen.contains(id));
        }
    }

    // ===== Batched Mutations =====

    /// Wrap one operation in a batch envelope of size one and return its
    /// reply. The echoed document state refreshes the cache first.
    pub async fn send_single_request(&mut self, request: Request) -> Result<Reply> {
        let mut replies = self.send_batch_requests(vec![request], Vec::new()).await?;
        let reply = replies.drain(..).next().unwrap_or_default();
        Ok(reply)
    }

    /// Submit a heterogeneous list of operations in one atomic envelope,
    /// optionally requesting echoed grid data for specific ranges.
    pub async fn send_batch_requests(
        &mut self,
        requests: Vec<Request>,
        response_ranges: Vec<String>,
    ) -> Result<Vec<Reply>> {
        let body = BatchUpdateRequest {
            requests,
            include_spreadsheet_in_response: true,
            response_include_grid_data: !response_ranges.is_empty(),
            response_ranges,
        };
        let response: BatchUpdateResponse =
            self.sheets_api.post_json(":batchUpdate", &[], &body).await?;
        if let Some(snapshot) = response.updated_spreadsheet {
            self.apply_spreadsheet(snapshot, EchoScope::Full);
        }
        Ok(response.replies)
    }

    /// Create a worksheet; if header values were supplied, write them as a
    /// follow-up before returning the new sheet id.
    pub async fn add_worksheet(&mut self, options: AddWorksheetOptions) -> Result<i64> {
        let reply = self
            .send_single_request(Request::AddSheet(AddSheetRequest {
                properties: options.properties,
            }))
            .await?;
        let sheet_id = reply
            .add_sheet
            .and_then(|r| r.properties.sheet_id)
            .ok_or_else(|| Error::UnexpectedResponse("addSheet reply has no sheetId".into()))?;

        if let Some(headers) = options.header_values {
            self.worksheet_ops(sheet_id)?
                .set_header_row(headers, options.header_row)
                .await?;
        }
        Ok(sheet_id)
    }

    /// Delete a worksheet remotely and evict it from the cache.
    pub async fn delete_worksheet(&mut self, sheet_id: i64) -> Result<()> {
        self.send_single_request(Request::DeleteSheet(DeleteSheetRequest { sheet_id }))
            .await?;
        self.worksheets.shift_remove(&sheet_id);
        Ok(())
    }

    pub async fn add_named_range(
        &mut self,
        name: impl Into<String>,
        range: GridRange,
    ) -> Result<NamedRange> {
        let reply = self
            .send_single_request(Request::AddNamedRange(AddNamedRangeRequest {
                named_range: NamedRange {
                    named_range_id: None,
                    name: Some(name.into()),
                    range: Some(range),
                },
            }))
            .await?;
        reply
            .add_named_range
            .map(|r| r.named_range)
            .ok_or_else(|| Error::UnexpectedResponse("addNamedRange reply missing payload".into()))
    }

    pub async fn delete_named_range(&mut self, named_range_id: impl Into<String>) -> Result<()> {
        self.send_single_request(Request::DeleteNamedRange(DeleteNamedRangeRequest {
            named_range_id: named_range_id.into(),
        }))
        .await?;
        Ok(())
    }

    /// Patch document-level properties with a field mask derived from the
    /// set fields. An empty patch is a no-op.
    pub async fn update_properties(&mut self, patch: SpreadsheetProperties) -> Result<()> {
        let fields = patch.field_mask();
        if fields.is_empty() {
            return Ok(());
        }
        self.send_single_request(Request::UpdateSpreadsheetProperties(
            UpdateSpreadsheetPropertiesRequest {
                properties: patch,
                fields,
            },
        ))
        .await?;
        Ok(())
    }

    /// Delete a run of rows or columns from a worksheet.
    pub async fn delete_dimension_range(
        &mut self,
        sheet_id: i64,
        dimension: Dimension,
        start_index: u32,
        end_index: u32,
    ) -> Result<()> {
        self.send_single_request(Request::DeleteDimension(DeleteDimensionRequest {
            range: DimensionRange {
                sheet_id,
                dimension,
                start_index: Some(start_index),
                end_index: Some(end_index),
            },
        }))
        .await?;
        Ok(())
    }

    // ===== Cell Loading =====

    /// Fetch cell grids for the given filters and upsert them into the
    /// worksheet caches.
    ///
    /// Under an API-key credential only A1 string filters are allowed and a
    /// parameterized GET is used; bearer-capable credentials go through the
    /// filter-capable POST endpoint.
    pub async fn load_cells(&mut self, filters: Vec<CellFilter>) -> Result<()> {
        let snapshot: Spreadsheet = if self.credential.is_read_only() {
            let mut query = vec![("includeGridData", "true".to_string())];
            for filter in &filters {
                match filter {
                    CellFilter::A1(a1) => query.push(("ranges", a1.clone())),
                    CellFilter::GridRange(_) => {
                        return Err(Error::UnsupportedFilterForCredential)
                    }
                }
            }
            self.sheets_api.get_json("", &query).await?
        } else {
            let body = GetByDataFilterRequest {
                data_filters: filters
                    .into_iter()
                    .map(|filter| match filter {
                        CellFilter::A1(a1) => DataFilter::A1Range(a1),
                        CellFilter::GridRange(range) => DataFilter::GridRange(range),
                    })
                    .collect(),
                include_grid_data: true,
            };
            self.sheets_api.post_json(":getByDataFilter", &[], &body).await?
        };

        self.apply_spreadsheet(snapshot, EchoScope::Partial);
        Ok(())
    }

    // ===== Export =====

    /// Download the document (or one worksheet) in the given format.
    ///
    /// Worksheet-scoped formats (csv, tsv, pdf, html) require `worksheet_id`;
    /// document-scoped formats (xlsx, ods, zip) reject one.
    pub async fn export(
        &self,
        format: ExportFormat,
        worksheet_id: Option<i64>,
    ) -> Result<Vec<u8>> {
        match (format.requires_worksheet(), worksheet_id) {
            (true, None) => {
                return Err(Error::UnsupportedExportTarget(format!(
                    "format '{}' exports a single worksheet; pass a worksheet id",
                    format.as_str()
                )));
            }
            (false, Some(_)) => {
                return Err(Error::UnsupportedExportTarget(format!(
                    "format '{}' exports the whole document; do not pass a worksheet id",
                    format.as_str()
                )));
            }
            _ => {}
        }

        let url = self.spreadsheet_url.as_deref().ok_or(Error::NotLoaded)?;
        let export_url = match url.rsplit_once("/edit") {
            Some((prefix, _)) => format!("{prefix}/export"),
            None => {
                return Err(Error::UnexpectedResponse(format!(
                    "document URL has no /edit segment: {url}"
                )))
            }
        };

        let mut query = vec![("format", format.as_str().to_string())];
        if let Some(gid) = worksheet_id {
            query.push(("gid", gid.to_string()));
        }
        Ok(self.sheets_api.get_bytes(&export_url, &query).await?)
    }

    // ===== File Management =====

    /// Delete the remote document.
    pub async fn delete(&mut self) -> Result<()> {
        self.files_api.delete("").await?;
        Ok(())
    }

    /// Fetch the document's access-control list.
    pub async fn list_permissions(&self) -> Result<Vec<Permission>> {
        let list: PermissionList = self
            .files_api
            .get_json("/permissions", &[("fields", "*".to_string())])
            .await?;
        Ok(list.permissions)
    }

    /// Grant or revoke public ("anyone") access.
    ///
    /// `Some(role)` creates or updates the public permission; `None` deletes
    /// it if present — already-absent public access is a successful no-op.
    pub async fn set_public_access_level(&mut self, role: Option<&str>) -> Result<()> {
        let permissions = self.list_permissions().await?;
        let anyone = permissions
            .iter()
            .find(|p| p.principal_type.as_deref() == Some("anyone"));

        match role {
            Some(role) => {
                let body = Permission {
                    principal_type: Some("anyone".into()),
                    role: Some(role.into()),
                    ..Default::default()
                };
                let _: serde_json::Value =
                    self.files_api.post_json("/permissions", &[], &body).await?;
                Ok(())
            }
            None => match anyone.and_then(|p| p.id.as_deref()) {
                Some(id) => {
                    self.files_api
                        .delete(&format!("/permissions/{id}"))
                        .await?;
                    Ok(())
                }
                None => Ok(()),
            },
        }
    }

    /// Share with an email principal (user or group) or, when the string has
    /// no `@`, a whole domain.
    pub async fn share(
        &mut self,
        principal: &str,
        role: &str,
        is_group: bool,
        notify: bool,
    ) -> Result<()> {
        let body = if principal.contains('@') {
            Permission {
                principal_type: Some(if is_group { "group" } else { "user" }.into()),
                role: Some(role.into()),
                email_address: Some(principal.into()),
                ..Default::default()
            }
        } else {
            Permission {
                principal_type: Some("domain".into()),
                role: Some(role.into()),
                domain: Some(principal.into()),
                ..Default::default()
            }
        };

        let query = [("sendNotificationEmail", notify.to_string())];
        let _: serde_json::Value = self.files_api.post_json("/permissions", &query, &body).await?;
        Ok(())
    }

    // ===== Values Endpoints (crate-internal plumbing) =====

    pub(crate) async fn get_value_range(&self, range: &str) -> Result<ValueRange> {
        let path = format!("/values/{}", urlencoding::encode(range));
        let query = [("majorDimension", "ROWS".to_string())];
        Ok(self.sheets_api.get_json(&path, &query).await?)
    }

    pub(crate) async fn put_value_range(
        &self,
        range: &str,
        body: &ValueRange,
    ) -> Result<UpdateValuesResponse> {
        let path = format!("/values/{}", urlencoding::encode(range));
        let query = [
            ("valueInputOption", "RAW".to_string()),
            ("includeValuesInResponse", "true".to_string()),
        ];
        Ok(self.sheets_api.put_json(&path, &query, body).await?)
    }

    pub(crate) async fn append_values(
        &self,
        range: &str,
        body: &ValueRange,
    ) -> Result<AppendValuesResponse> {
        let path = format!("/values/{}:append", urlencoding::encode(range));
        let query = [
            ("valueInputOption", "RAW".to_string()),
            ("insertDataOption", "OVERWRITE".to_string()),
            ("includeValuesInResponse", "true".to_string()),
        ];
        Ok(self.sheets_api.post_json(&path, &query, body).await?)
    }

    pub(crate) async fn clear_values(&self, range: &str) -> Result<ClearValuesResponse> {
        let path = format!("/values/{}:clear", urlencoding::encode(range));
        Ok(self
            .sheets_api
            .post_json(&path, &[], &serde_json::json!({}))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetlink_types::{GridProperties, Sheet};

    fn unloaded_doc() -> Document {
        Document::new("doc1", Credential::access_token("t")).unwrap()
    }

    fn snapshot(titles: &[(i64, &str)]) -> Spreadsheet {
        Spreadsheet {
            spreadsheet_id: Some("doc1".into()),
            properties: Some(SpreadsheetProperties {
                title: Some("Budget".into()),
                ..Default::default()
            }),
            spreadsheet_url: Some("https://sheets.example.com/d/doc1/edit".into()),
            sheets: Some(
                titles
                    .iter()
                    .enumerate()
                    .map(|(i, (id, title))| Sheet {
                        properties: SheetProperties {
                            sheet_id: Some(*id),
                            title: Some((*title).into()),
                            index: Some(i as i64),
                            grid_properties: Some(GridProperties {
                                row_count: Some(100),
                                column_count: Some(26),
                                ..Default::default()
                            }),
                            ..Default::default()
                        },
                        data: None,
                    })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_accessors_fail_before_load() {
        let doc = unloaded_doc();
        assert!(matches!(doc.title(), Err(Error::NotLoaded)));
        assert!(matches!(doc.properties(), Err(Error::NotLoaded)));
        assert!(matches!(doc.worksheet(0), Err(Error::NotLoaded)));
        assert!(matches!(doc.worksheet_count(), Err(Error::NotLoaded)));
        assert!(matches!(doc.spreadsheet_url(), Err(Error::NotLoaded)));
    }

    #[test]
    fn test_apply_snapshot_is_idempotent() {
        let mut doc = unloaded_doc();
        let snap = snapshot(&[(0, "Sheet1"), (7, "Data")]);

        doc.apply_spreadsheet(snap.clone(), EchoScope::Full);
        let titles_once: Vec<String> = doc
            .worksheets
            .values()
            .map(|ws| ws.title().to_string())
            .collect();

        doc.apply_spreadsheet(snap, EchoScope::Full);
        let titles_twice: Vec<String> = doc
            .worksheets
            .values()
            .map(|ws| ws.title().to_string())
            .collect();

        assert_eq!(titles_once, titles_twice);
        assert_eq!(doc.worksheet_count().unwrap(), 2);
        assert_eq!(doc.title().unwrap(), "Budget");
    }

    #[test]
    fn test_upsert_merges_into_existing_entries() {
        let mut doc = unloaded_doc();
        doc.apply_spreadsheet(snapshot(&[(0, "Sheet1")]), EchoScope::Full);

        // A later echo renames the sheet; the map entry is updated in place
        doc.apply_spreadsheet(snapshot(&[(0, "Renamed")]), EchoScope::Full);
        assert_eq!(doc.worksheet_count().unwrap(), 1);
        assert_eq!(doc.worksheet(0).unwrap().title(), "Renamed");
        // Dimensions from the earlier snapshot survive the merge
        assert_eq!(doc.worksheet(0).unwrap().row_count(), 100);
    }

    #[test]
    fn test_full_echo_evicts_missing_sheets_partial_does_not() {
        let mut doc = unloaded_doc();
        doc.apply_spreadsheet(snapshot(&[(0, "Sheet1"), (7, "Data")]), EchoScope::Full);

        doc.apply_spreadsheet(snapshot(&[(0, "Sheet1")]), EchoScope::Partial);
        assert_eq!(doc.worksheet_count().unwrap(), 2);

        doc.apply_spreadsheet(snapshot(&[(0, "Sheet1")]), EchoScope::Full);
        assert_eq!(doc.worksheet_count().unwrap(), 1);
        assert!(matches!(doc.worksheet(7), Err(Error::WorksheetNotFound(_))));
    }

    #[test]
    fn test_reset_local_cache_returns_to_unloaded() {
        let mut doc = unloaded_doc();
        doc.apply_spreadsheet(snapshot(&[(0, "Sheet1")]), EchoScope::Full);
        assert!(doc.is_loaded());

        doc.reset_local_cache();
        assert!(!doc.is_loaded());
        assert!(matches!(doc.title(), Err(Error::NotLoaded)));
    }

    #[test]
    fn test_worksheet_lookup_by_title_and_index() {
        let mut doc = unloaded_doc();
        doc.apply_spreadsheet(snapshot(&[(5, "Sheet1"), (9, "Data")]), EchoScope::Full);

        assert_eq!(doc.worksheet_by_title("Data").unwrap().sheet_id(), 9);
        assert_eq!(doc.worksheet_by_index(0).unwrap().sheet_id(), 5);
        assert!(matches!(
            doc.worksheet_by_title("Nope"),
            Err(Error::WorksheetNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_export_validates_target_before_any_request() {
        let mut doc = unloaded_doc();
        doc.apply_spreadsheet(snapshot(&[(0, "Sheet1")]), EchoScope::Full);

        let err = doc.export(ExportFormat::Csv, None).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedExportTarget(_)));

        let err = doc.export(ExportFormat::Xlsx, Some(0)).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedExportTarget(_)));
    }

    #[tokio::test]
    async fn test_export_requires_loaded_url() {
        let doc = unloaded_doc();
        let err = doc.export(ExportFormat::Csv, Some(0)).await.unwrap_err();
        assert!(matches!(err, Error::NotLoaded));
    }

    #[tokio::test]
    async fn test_create_rejects_api_key() {
        let err = Document::create(
            Credential::api_key("k"),
            SpreadsheetProperties::default(),
            &ClientOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Auth(AuthError::InvalidCredential(_))
        ));
    }

    #[tokio::test]
    async fn test_structural_filter_rejected_under_api_key() {
        let mut doc = Document::new("doc1", Credential::api_key("k")).unwrap();
        let err = doc
            .load_cells(vec![
                CellFilter::A1("Sheet1!A1:B2".into()),
                CellFilter::GridRange(GridRange {
                    sheet_id: Some(0),
                    ..Default::default()
                }),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFilterForCredential));
    }
}
