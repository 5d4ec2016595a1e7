use sheetlink_primitives::format_a1;
use sheetlink_types::{CellData, ErrorValue, ExtendedValue, NumberFormat, RowData};

use crate::error::{Error, Result};
use crate::value::CellValue;

/// Which wire fields a cell has locally modified since the last save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DirtyFields {
    value: bool,
    note: bool,
    format: bool,
}

impl DirtyFields {
    fn any(self) -> bool {
        self.value || self.note || self.format
    }
}

/// One addressable grid position.
///
/// Distinguishes the *effective value* (what the service computed) from the
/// *formula* (what the author wrote); both can be present at once. Local
/// setters mark fields dirty for the next batched save; an authoritative
/// overwrite from an echoed snapshot clears the dirty state.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    row_index: u32,
    column_index: u32,
    value: CellValue,
    formula: Option<String>,
    formatted_value: Option<String>,
    note: Option<String>,
    number_format: Option<NumberFormat>,
    user_entered_format: Option<serde_json::Value>,
    dirty: DirtyFields,
}

impl Cell {
    /// A default-empty cell at a fixed 0-based coordinate.
    pub(crate) fn new(row_index: u32, column_index: u32) -> Self {
        Self {
            row_index,
            column_index,
            value: CellValue::Empty,
            formula: None,
            formatted_value: None,
            note: None,
            number_format: None,
            user_entered_format: None,
            dirty: DirtyFields::default(),
        }
    }

    #[must_use]
    pub fn row_index(&self) -> u32 {
        self.row_index
    }

    #[must_use]
    pub fn column_index(&self) -> u32 {
        self.column_index
    }

    /// A1 address of this cell, e.g. "B3".
    #[must_use]
    pub fn a1(&self) -> String {
        format_a1(self.row_index, self.column_index)
    }

    /// Last-known effective value.
    #[must_use]
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// The authored formula, when the value is formula-derived.
    #[must_use]
    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }

    /// The service-rendered display string.
    #[must_use]
    pub fn formatted_value(&self) -> Option<&str> {
        self.formatted_value.as_deref()
    }

    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    #[must_use]
    pub fn number_format(&self) -> Option<&NumberFormat> {
        self.number_format.as_ref()
    }

    /// The formula evaluation error reported for this cell, if any. This is
    /// a value to inspect, not a raised error.
    #[must_use]
    pub fn error(&self) -> Option<&ErrorValue> {
        self.value.error()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.any()
    }

    /// Assign a literal or, when the text starts with `=`, a formula.
    ///
    /// Writing a literal clears any stale formula; the rendered display
    /// string is dropped either way until the next save echo refreshes it.
    pub fn set_value(&mut self, value: impl Into<CellValue>) {
        let value = value.into();
        if let CellValue::Text(text) = &value {
            if text.starts_with('=') {
                self.formula = Some(text.clone());
                self.formatted_value = None;
                self.dirty.value = true;
                return;
            }
        }
        self.value = value;
        self.formula = None;
        self.formatted_value = None;
        self.dirty.value = true;
    }

    /// Assign a formula expression. The last-known effective value is kept
    /// until a save echo replaces it.
    pub fn set_formula(&mut self, expression: impl Into<String>) -> Result<()> {
        let expression = expression.into();
        if !expression.starts_with('=') {
            return Err(Error::InvalidFormula(expression));
        }
        self.formula = Some(expression);
        self.formatted_value = None;
        self.dirty.value = true;
        Ok(())
    }

    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = Some(note.into());
        self.dirty.note = true;
    }

    pub fn clear_note(&mut self) {
        self.note = None;
        self.dirty.note = true;
    }

    /// Replace the cell-level format blob written on the next save.
    pub fn set_user_entered_format(&mut self, format: serde_json::Value) {
        self.user_entered_format = Some(format);
        self.dirty.format = true;
    }

    /// Overwrite from an authoritative wire snapshot and clear dirty state.
    pub(crate) fn apply_cell_data(&mut self, data: &CellData) {
        self.value = match (&data.effective_value, &data.user_entered_value) {
            (Some(effective), _) => CellValue::from_extended(effective),
            (None, Some(entered)) => CellValue::from_extended(entered),
            (None, None) => CellValue::Empty,
        };
        self.formula = data
            .user_entered_value
            .as_ref()
            .and_then(|v| v.formula_value.clone());
        self.formatted_value = data.formatted_value.clone();
        self.note = data.note.clone();
        self.number_format = data
            .effective_format
            .as_ref()
            .and_then(|f| f.number_format.clone());
        self.dirty = DirtyFields::default();
    }

    /// The wire record for this cell's dirty fields.
    pub(crate) fn to_cell_data(&self) -> CellData {
        let user_entered_value = if self.dirty.value {
            match &self.formula {
                Some(expr) => Some(ExtendedValue::formula(expr.clone())),
                None => self.value.to_extended(),
            }
        } else {
            None
        };

        CellData {
            user_entered_value,
            note: if self.dirty.note {
                self.note.clone()
            } else {
                None
            },
            user_entered_format: if self.dirty.format {
                self.user_entered_format.clone()
            } else {
                None
            },
            ..Default::default()
        }
    }

    /// Field mask matching [`Cell::to_cell_data`].
    pub(crate) fn update_fields(&self) -> String {
        let mut fields = Vec::new();
        if self.dirty.value {
            fields.push("userEnteredValue");
        }
        if self.dirty.note {
            fields.push("note");
        }
        if self.dirty.format {
            fields.push("userEnteredFormat");
        }
        fields.join(",")
    }

    /// An `updateCells` payload row of exactly this cell.
    pub(crate) fn to_update_row(&self) -> RowData {
        RowData {
            values: Some(vec![self.to_cell_data()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_clears_stale_formula() {
        let mut cell = Cell::new(0, 0);
        cell.set_formula("=A1+B1").unwrap();
        assert_eq!(cell.formula(), Some("=A1+B1"));

        cell.set_value(5.0);
        assert!(cell.formula().is_none());
        assert_eq!(cell.value(), &CellValue::Number(5.0));
    }

    #[test]
    fn test_set_value_with_leading_equals_is_a_formula() {
        let mut cell = Cell::new(2, 1);
        cell.set_value("=SUM(A1:A5)");
        assert_eq!(cell.formula(), Some("=SUM(A1:A5)"));
        assert!(cell.is_dirty());
    }

    #[test]
    fn test_set_formula_rejects_plain_text() {
        let mut cell = Cell::new(0, 0);
        assert!(matches!(
            cell.set_formula("SUM(A1:A5)"),
            Err(Error::InvalidFormula(_))
        ));
    }

    #[test]
    fn test_formula_keeps_last_known_value() {
        let mut cell = Cell::new(0, 0);
        cell.apply_cell_data(&CellData {
            user_entered_value: Some(ExtendedValue::formula("=A1")),
            effective_value: Some(ExtendedValue::number(7.0)),
            formatted_value: Some("7".into()),
            ..Default::default()
        });
        assert_eq!(cell.value(), &CellValue::Number(7.0));
        assert_eq!(cell.formula(), Some("=A1"));

        cell.set_formula("=A2").unwrap();
        assert_eq!(cell.value(), &CellValue::Number(7.0));
    }

    #[test]
    fn test_apply_cell_data_clears_dirty() {
        let mut cell = Cell::new(1, 1);
        cell.set_value("draft");
        assert!(cell.is_dirty());

        cell.apply_cell_data(&CellData {
            effective_value: Some(ExtendedValue::string("saved")),
            ..Default::default()
        });
        assert!(!cell.is_dirty());
        assert_eq!(cell.value(), &CellValue::Text("saved".into()));
    }

    #[test]
    fn test_error_value_surfaces_without_panicking() {
        let mut cell = Cell::new(0, 0);
        cell.apply_cell_data(&CellData {
            user_entered_value: Some(ExtendedValue::formula("=1/0")),
            effective_value: Some(ExtendedValue {
                error_value: Some(ErrorValue {
                    error_type: Some("DIVIDE_BY_ZERO".into()),
                    message: Some("Function DIVIDE parameter 2 cannot be zero.".into()),
                }),
                ..Default::default()
            }),
            ..Default::default()
        });

        let err = cell.error().unwrap();
        assert_eq!(err.error_type.as_deref(), Some("DIVIDE_BY_ZERO"));
    }

    #[test]
    fn test_update_payload_tracks_dirty_fields() {
        let mut cell = Cell::new(3, 2);
        cell.set_value(1.5);
        cell.set_note("checked");

        assert_eq!(cell.update_fields(), "userEnteredValue,note");
        let data = cell.to_cell_data();
        assert_eq!(data.user_entered_value.unwrap().number_value, Some(1.5));
        assert_eq!(data.note.as_deref(), Some("checked"));
        assert!(data.user_entered_format.is_none());
    }

    #[test]
    fn test_a1_address() {
        assert_eq!(Cell::new(0, 0).a1(), "A1");
        assert_eq!(Cell::new(2, 27).a1(), "AB3");
    }
}
