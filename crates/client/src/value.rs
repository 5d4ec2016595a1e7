use std::fmt;

use sheetlink_types::{ErrorValue, ExtendedValue};

/// A cell's effective value as seen by callers.
///
/// `Error` carries a formula evaluation failure reported by the service; it
/// is a value, not a Rust error — readers check for it explicitly.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Error(ErrorValue),
}

impl CellValue {
    /// Check if the value is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The formula-error payload, if this value is one.
    #[must_use]
    pub fn error(&self) -> Option<&ErrorValue> {
        match self {
            CellValue::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Get the value as a string
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Error(err) => err.error_type.clone().unwrap_or_else(|| "#ERROR".into()),
        }
    }

    /// Try to get the value as a float
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.parse().ok(),
            CellValue::Empty | CellValue::Error(_) => None,
        }
    }

    /// Try to get the value as a boolean
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Number(n) => Some(*n != 0.0),
            CellValue::Text(s) => s.parse().ok(),
            CellValue::Empty | CellValue::Error(_) => None,
        }
    }

    /// Build from the wire's one-of value union.
    #[must_use]
    pub fn from_extended(value: &ExtendedValue) -> Self {
        if let Some(err) = &value.error_value {
            return CellValue::Error(err.clone());
        }
        if let Some(n) = value.number_value {
            return CellValue::Number(n);
        }
        if let Some(b) = value.bool_value {
            return CellValue::Bool(b);
        }
        if let Some(s) = &value.string_value {
            return CellValue::Text(s.clone());
        }
        // A bare formulaValue with no computed counterpart reads as empty.
        CellValue::Empty
    }

    /// Convert to the wire union for a literal write. Empty and error values
    /// have no literal representation and yield `None` (the field mask still
    /// clears the remote value).
    #[must_use]
    pub fn to_extended(&self) -> Option<ExtendedValue> {
        match self {
            CellValue::Empty | CellValue::Error(_) => None,
            CellValue::Text(s) => Some(ExtendedValue::string(s.clone())),
            CellValue::Number(n) => Some(ExtendedValue::number(*n)),
            CellValue::Bool(b) => Some(ExtendedValue::boolean(*b)),
        }
    }

    /// Convert to the loose JSON the values endpoints use.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Empty => serde_json::Value::String(String::new()),
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
            CellValue::Number(n) => serde_json::json!(n),
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
            CellValue::Error(err) => {
                serde_json::Value::String(err.error_type.clone().unwrap_or_else(|| "#ERROR".into()))
            }
        }
    }

    /// Build from the loose JSON the values endpoints return.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(CellValue::Empty, CellValue::Number),
            serde_json::Value::String(s) if s.is_empty() => CellValue::Empty,
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extended_prefers_error() {
        let wire = ExtendedValue {
            number_value: Some(1.0),
            error_value: Some(ErrorValue {
                error_type: Some("DIVIDE_BY_ZERO".into()),
                message: None,
            }),
            ..Default::default()
        };
        let value = CellValue::from_extended(&wire);
        assert_eq!(value.error().unwrap().error_type.as_deref(), Some("DIVIDE_BY_ZERO"));
    }

    #[test]
    fn test_from_extended_literals() {
        assert_eq!(
            CellValue::from_extended(&ExtendedValue::number(2.5)),
            CellValue::Number(2.5)
        );
        assert_eq!(
            CellValue::from_extended(&ExtendedValue::string("hi")),
            CellValue::Text("hi".into())
        );
        assert_eq!(
            CellValue::from_extended(&ExtendedValue::boolean(true)),
            CellValue::Bool(true)
        );
        assert_eq!(
            CellValue::from_extended(&ExtendedValue::formula("=A1")),
            CellValue::Empty
        );
    }

    #[test]
    fn test_json_conversions() {
        assert_eq!(CellValue::from_json(&serde_json::json!("Al")), CellValue::Text("Al".into()));
        assert_eq!(CellValue::from_json(&serde_json::json!("")), CellValue::Empty);
        assert_eq!(CellValue::from_json(&serde_json::json!(3.5)), CellValue::Number(3.5));
        assert_eq!(CellValue::from_json(&serde_json::json!(true)), CellValue::Bool(true));
        assert_eq!(CellValue::from_json(&serde_json::Value::Null), CellValue::Empty);

        assert_eq!(CellValue::Text("30".into()).to_json(), serde_json::json!("30"));
        assert_eq!(CellValue::Empty.to_json(), serde_json::json!(""));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(CellValue::Number(42.0).as_f64(), Some(42.0));
        assert_eq!(CellValue::Text("42".into()).as_f64(), Some(42.0));
        assert_eq!(CellValue::Bool(true).as_f64(), Some(1.0));
        assert_eq!(CellValue::Number(0.0).as_bool(), Some(false));
        assert!(CellValue::Empty.as_f64().is_none());
        assert_eq!(CellValue::from(""), CellValue::Empty);
    }
}
