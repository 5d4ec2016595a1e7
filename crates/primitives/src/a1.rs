use crate::{A1Error, Result};

/// Parse A1-style cell notation (e.g., "A1", "Z99", "AA1")
/// Returns (row, column) as 0-based indices
pub fn parse_a1(notation: &str) -> Result<(u32, u32)> {
    if notation.is_empty() {
        return Err(A1Error::InvalidCellNotation(notation.to_string()));
    }

    let notation = notation.to_uppercase();
    let bytes = notation.as_bytes();

    // Find where letters end and numbers begin
    let mut split_pos = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            split_pos = i;
            break;
        }
    }

    if split_pos == 0 {
        return Err(A1Error::InvalidCellNotation(notation));
    }

    let col_part = &notation[..split_pos];
    let row_part = &notation[split_pos..];

    let col = letters_to_column(col_part)?;
    let row = row_part
        .parse::<u32>()
        .map_err(|_| A1Error::InvalidCellNotation(notation.clone()))?;

    // A1 row numbers are 1-based
    if row == 0 {
        return Err(A1Error::InvalidCellNotation(notation));
    }

    Ok((row - 1, col))
}

/// Parse A1-style range notation (e.g., "A1:C3")
/// Returns ((start_row, start_col), (end_row, end_col)) as 0-based indices,
/// normalized so that start <= end. A bare cell reference is a 1x1 range.
pub fn parse_a1_range(notation: &str) -> Result<((u32, u32), (u32, u32))> {
    let parts: Vec<&str> = notation.split(':').collect();

    if parts.len() != 2 {
        let cell = parse_a1(notation)?;
        return Ok((cell, cell));
    }

    let (start_row, start_col) = parse_a1(parts[0])?;
    let (end_row, end_col) = parse_a1(parts[1])?;

    let actual_start = (start_row.min(end_row), start_col.min(end_col));
    let actual_end = (start_row.max(end_row), start_col.max(end_col));

    Ok((actual_start, actual_end))
}

/// Split a sheet-qualified range (e.g., "Sheet1!A2:B4") into its optional
/// sheet title and parsed bounds. An unqualified range yields `None` for the
/// title. Surrounding single quotes on the title are stripped.
pub fn split_range(notation: &str) -> Result<(Option<String>, ((u32, u32), (u32, u32)))> {
    match notation.rsplit_once('!') {
        Some((title, range)) => {
            let title = title.trim_matches('\'');
            if title.is_empty() {
                return Err(A1Error::InvalidRangeNotation(notation.to_string()));
            }
            Ok((Some(title.to_string()), parse_a1_range(range)?))
        }
        None => Ok((None, parse_a1_range(notation)?)),
    }
}

/// Convert column letters to a 0-based column index
/// A=0, B=1, ... Z=25, AA=26, AB=27, ...
pub fn letters_to_column(col_str: &str) -> Result<u32> {
    if col_str.is_empty() {
        return Err(A1Error::InvalidCellNotation(col_str.to_string()));
    }

    let mut col: u32 = 0;
    for &b in col_str.as_bytes() {
        if !b.is_ascii_uppercase() {
            return Err(A1Error::InvalidCellNotation(col_str.to_string()));
        }
        col = col * 26 + u32::from(b - b'A') + 1;
    }

    Ok(col - 1)
}

/// Convert a 0-based column index to column letters
/// 0=A, 1=B, ... 25=Z, 26=AA, 27=AB, ...
#[must_use]
pub fn column_to_letters(mut col: u32) -> String {
    let mut result = String::new();
    col += 1;

    while col > 0 {
        col -= 1;
        result.insert(0, ((col % 26) as u8 + b'A') as char);
        col /= 26;
    }

    result
}

/// Convert 0-based (row, col) to A1 notation
/// (0, 0) = "A1", (0, 1) = "B1", etc.
#[must_use]
pub fn format_a1(row: u32, col: u32) -> String {
    format!("{}{}", column_to_letters(col), row + 1)
}

/// Format a 0-based rectangular range as A1 notation (e.g., "A1:C3").
#[must_use]
pub fn format_range(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> String {
    format!(
        "{}:{}",
        format_a1(start_row, start_col),
        format_a1(end_row, end_col)
    )
}

/// Format a sheet-qualified range (e.g., "Sheet1!A2:B2").
#[must_use]
pub fn qualified_range(
    title: &str,
    start_row: u32,
    start_col: u32,
    end_row: u32,
    end_col: u32,
) -> String {
    format!(
        "{}!{}",
        title,
        format_range(start_row, start_col, end_row, end_col)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_a1() {
        assert_eq!(parse_a1("A1").unwrap(), (0, 0));
        assert_eq!(parse_a1("B1").unwrap(), (0, 1));
        assert_eq!(parse_a1("A2").unwrap(), (1, 0));
        assert_eq!(parse_a1("Z1").unwrap(), (0, 25));
        assert_eq!(parse_a1("AA1").unwrap(), (0, 26));
        assert_eq!(parse_a1("AB1").unwrap(), (0, 27));
        assert_eq!(parse_a1("BA1").unwrap(), (0, 52));
        assert_eq!(parse_a1("ZZ1").unwrap(), (0, 701));

        // Case insensitive
        assert_eq!(parse_a1("a1").unwrap(), (0, 0));
        assert_eq!(parse_a1("aA1").unwrap(), (0, 26));
    }

    #[test]
    fn test_parse_a1_errors() {
        assert!(parse_a1("").is_err());
        assert!(parse_a1("A").is_err());
        assert!(parse_a1("1").is_err());
        assert!(parse_a1("A0").is_err()); // Row must be >= 1
        assert!(parse_a1("123").is_err());
        assert!(parse_a1("ABC").is_err());
    }

    #[test]
    fn test_parse_a1_range() {
        let ((sr, sc), (er, ec)) = parse_a1_range("A1:C3").unwrap();
        assert_eq!((sr, sc), (0, 0));
        assert_eq!((er, ec), (2, 2));

        // Reversed range auto-corrects
        let ((sr, sc), (er, ec)) = parse_a1_range("C3:A1").unwrap();
        assert_eq!((sr, sc), (0, 0));
        assert_eq!((er, ec), (2, 2));

        // Single cell (no colon)
        let ((sr, sc), (er, ec)) = parse_a1_range("B2").unwrap();
        assert_eq!((sr, sc), (1, 1));
        assert_eq!((er, ec), (1, 1));
    }

    #[test]
    fn test_split_range() {
        let (title, ((sr, sc), (er, ec))) = split_range("Sheet1!A2:B2").unwrap();
        assert_eq!(title.as_deref(), Some("Sheet1"));
        assert_eq!((sr, sc), (1, 0));
        assert_eq!((er, ec), (1, 1));

        let (title, bounds) = split_range("'My Sheet'!A1:A1").unwrap();
        assert_eq!(title.as_deref(), Some("My Sheet"));
        assert_eq!(bounds, ((0, 0), (0, 0)));

        let (title, _) = split_range("A1:B2").unwrap();
        assert!(title.is_none());

        assert!(split_range("!A1:B2").is_err());
    }

    #[test]
    fn test_column_to_letters() {
        assert_eq!(column_to_letters(0), "A");
        assert_eq!(column_to_letters(1), "B");
        assert_eq!(column_to_letters(25), "Z");
        assert_eq!(column_to_letters(26), "AA");
        assert_eq!(column_to_letters(27), "AB");
        assert_eq!(column_to_letters(51), "AZ");
        assert_eq!(column_to_letters(701), "ZZ");
        assert_eq!(column_to_letters(702), "AAA");
    }

    #[test]
    fn test_format_a1() {
        assert_eq!(format_a1(0, 0), "A1");
        assert_eq!(format_a1(0, 1), "B1");
        assert_eq!(format_a1(1, 0), "A2");
        assert_eq!(format_a1(99, 25), "Z100");
        assert_eq!(format_a1(0, 26), "AA1");
    }

    #[test]
    fn test_qualified_range() {
        assert_eq!(qualified_range("Sheet1", 1, 0, 1, 1), "Sheet1!A2:B2");
        assert_eq!(qualified_range("Data", 0, 0, 9, 2), "Data!A1:C10");
    }

    #[test]
    fn test_roundtrip() {
        for row in 0..10 {
            for col in 0..100 {
                let notation = format_a1(row, col);
                let (parsed_row, parsed_col) = parse_a1(&notation).unwrap();
                assert_eq!((row, col), (parsed_row, parsed_col));
            }
        }
    }
}
