use indexmap::IndexMap;
use sheetlink_primitives::qualified_range;
use sheetlink_types::{
    DeleteRangeRequest, Dimension, GridRange, Request, ValueRange,
};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::value::CellValue;

/// An ephemeral, header-indexed projection over one backing line of a
/// worksheet.
///
/// A `Row` is bound to a snapshot taken at fetch time. Structural changes to
/// the sheet (inserting or deleting rows elsewhere, clearing rows) shift the
/// physical position this view points at without invalidating it — re-fetch
/// rows after any structural change.
#[derive(Debug, Clone)]
pub struct Row {
    sheet_id: i64,
    sheet_title: String,
    headers: Vec<String>,
    row_number: u32,
    values: Vec<CellValue>,
    deleted: bool,
}

impl Row {
    pub(crate) fn new(
        sheet_id: i64,
        sheet_title: String,
        headers: Vec<String>,
        row_number: u32,
        mut values: Vec<CellValue>,
    ) -> Self {
        values.resize(headers.len(), CellValue::Empty);
        Self {
            sheet_id,
            sheet_title,
            headers,
            row_number,
            values,
            deleted: false,
        }
    }

    /// 1-based row number within the sheet at fetch time.
    #[must_use]
    pub fn row_number(&self) -> u32 {
        self.row_number
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// The backing values in header order.
    #[must_use]
    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    /// Sheet-qualified A1 range spanning the full header width, e.g.
    /// "Sheet1!A2:B2".
    #[must_use]
    pub fn a1_range(&self) -> String {
        let row = self.row_number - 1;
        let last_col = self.headers.len().saturating_sub(1) as u32;
        qualified_range(&self.sheet_title, row, 0, row, last_col)
    }

    /// Value under a header key. Unknown keys read as absent, matching
    /// sparse-record access.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        let index = self.headers.iter().position(|h| h == key)?;
        self.values.get(index)
    }

    /// Set the value under a header key locally. Unknown keys are ignored;
    /// returns whether the key matched a header.
    pub fn set(&mut self, key: &str, value: impl Into<CellValue>) -> bool {
        let Some(index) = self.headers.iter().position(|h| h == key) else {
            return false;
        };
        self.values[index] = value.into();
        true
    }

    /// Apply several key/value pairs locally. Nothing reaches the remote
    /// until [`Row::save`].
    pub fn assign<K, V, I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<CellValue>,
    {
        for (key, value) in pairs {
            self.set(key.as_ref(), value);
        }
    }

    /// The row as a header-keyed record, in header order.
    #[must_use]
    pub fn to_record(&self) -> IndexMap<String, CellValue> {
        self.headers
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }

    /// Push the backing values to the remote as a single-range update and
    /// replace them with the echoed authoritative values.
    pub async fn save(&mut self, doc: &mut Document) -> Result<()> {
        if self.deleted {
            return Err(Error::RowDeleted);
        }

        let range = self.a1_range();
        let body = ValueRange {
            range: Some(range.clone()),
            major_dimension: Some("ROWS".into()),
            values: vec![self.values.iter().map(CellValue::to_json).collect()],
        };

        let response = doc.put_value_range(&range, &body).await?;
        if let Some(echoed) = response
            .updated_data
            .and_then(|data| data.values.into_iter().next())
        {
            let mut values: Vec<CellValue> =
                echoed.iter().map(CellValue::from_json).collect();
            values.resize(self.headers.len(), CellValue::Empty);
            self.values = values;
        }
        Ok(())
    }

    /// Delete this physical row, shifting subsequent rows up. The view is
    /// dead afterwards: any further `save` or `delete` fails with
    /// [`Error::RowDeleted`].
    pub async fn delete(&mut self, doc: &mut Document) -> Result<()> {
        if self.deleted {
            return Err(Error::RowDeleted);
        }

        doc.send_single_request(Request::DeleteRange(DeleteRangeRequest {
            range: GridRange {
                sheet_id: Some(self.sheet_id),
                start_row_index: Some(self.row_number - 1),
                end_row_index: Some(self.row_number),
                ..Default::default()
            },
            shift_dimension: Dimension::Rows,
        }))
        .await?;

        self.deleted = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Row {
        Row::new(
            0,
            "Sheet1".into(),
            vec!["name".into(), "age".into()],
            2,
            vec![CellValue::Text("Al".into()), CellValue::Text("30".into())],
        )
    }

    #[test]
    fn test_get_resolves_through_headers() {
        let row = sample_row();
        assert_eq!(row.get("name"), Some(&CellValue::Text("Al".into())));
        assert_eq!(row.get("age"), Some(&CellValue::Text("30".into())));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_set_unknown_key_is_silent() {
        let mut row = sample_row();
        assert!(!row.set("missing", "x"));
        assert!(row.set("name", "Bo"));
        assert_eq!(row.get("name"), Some(&CellValue::Text("Bo".into())));
    }

    #[test]
    fn test_assign_applies_all_pairs() {
        let mut row = sample_row();
        row.assign([("name", "Cy"), ("age", "41")]);
        assert_eq!(row.get("name"), Some(&CellValue::Text("Cy".into())));
        assert_eq!(row.get("age"), Some(&CellValue::Text("41".into())));
    }

    #[test]
    fn test_a1_range_spans_header_width() {
        assert_eq!(sample_row().a1_range(), "Sheet1!A2:B2");
    }

    #[test]
    fn test_short_backing_line_pads_to_header_width() {
        let row = Row::new(
            0,
            "Sheet1".into(),
            vec!["a".into(), "b".into(), "c".into()],
            5,
            vec![CellValue::Text("x".into())],
        );
        assert_eq!(row.values().len(), 3);
        assert_eq!(row.get("c"), Some(&CellValue::Empty));
        assert_eq!(row.a1_range(), "Sheet1!A5:C5");
    }

    #[test]
    fn test_to_record_preserves_header_order() {
        let record = sample_row().to_record();
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "age"]);
    }
}
