use serde::{Deserialize, Serialize};

use crate::batch::NamedRange;
use crate::sheet::Sheet;

/// A whole spreadsheet document as returned by the document-data surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<SpreadsheetProperties>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheets: Option<Vec<Sheet>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_ranges: Option<Vec<NamedRange>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_url: Option<String>,
}

/// Document-level property bag.
///
/// Every field is optional so the same struct serves as a full snapshot and
/// as an update patch (a patch serializes only the fields it sets).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Recalculation cadence, e.g. "ON_CHANGE".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_recalc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_format: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterative_calculation_settings: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_theme: Option<serde_json::Value>,
}

impl SpreadsheetProperties {
    /// Wire field paths set in this patch, in the mask syntax the batch
    /// update endpoint expects.
    #[must_use]
    pub fn field_mask(&self) -> String {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.locale.is_some() {
            fields.push("locale");
        }
        if self.auto_recalc.is_some() {
            fields.push("autoRecalc");
        }
        if self.time_zone.is_some() {
            fields.push("timeZone");
        }
        if self.default_format.is_some() {
            fields.push("defaultFormat");
        }
        if self.iterative_calculation_settings.is_some() {
            fields.push("iterativeCalculationSettings");
        }
        if self.spreadsheet_theme.is_some() {
            fields.push("spreadsheetTheme");
        }
        fields.join(",")
    }
}
