//! Semicolon-delimited reader for exported ticket logs.
//!
//! The export is split positionally against the header; quoting is not
//! interpreted beyond stripping literal `"` characters, so a `;` inside a
//! quoted cell shifts the remaining cells of that line.

use crate::types::Row;

/// Field delimiter of the export.
pub const DELIMITER: char = ';';

/// Parse raw export text into rows, preserving input order.
///
/// Never fails:
/// - empty (or whitespace-only) input yields no rows
/// - a header-only file yields no rows
/// - short lines yield `""` for the missing trailing cells
/// - cells beyond the header are ignored
pub fn parse(text: &str) -> Vec<Row> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let normalized = text.replace('\r', "");
    let mut lines = normalized.split('\n');

    let header: Vec<String> = match lines.next() {
        Some(line) => line
            .split(DELIMITER)
            .map(|cell| cell.trim().to_string())
            .collect(),
        None => return Vec::new(),
    };

    lines
        .map(|line| {
            let values: Vec<&str> = line.split(DELIMITER).collect();
            header
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let value = values
                        .get(i)
                        .map(|v| v.replace('"', "").trim().to_string())
                        .unwrap_or_default();
                    (key.clone(), value)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell<'a>(row: &'a Row, key: &str) -> &'a str {
        row.get(key).map(String::as_str).unwrap_or("<absent>")
    }

    #[test]
    fn test_single_row() {
        let rows = parse("A;B\n1;2");
        assert_eq!(rows.len(), 1);
        assert_eq!(cell(&rows[0], "A"), "1");
        assert_eq!(cell(&rows[0], "B"), "2");
    }

    #[test]
    fn test_missing_trailing_field_is_blank() {
        let rows = parse("A;B\n1");
        assert_eq!(rows.len(), 1);
        assert_eq!(cell(&rows[0], "A"), "1");
        assert_eq!(cell(&rows[0], "B"), "");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("   \n\r\n  ").is_empty());
    }

    #[test]
    fn test_header_only() {
        assert!(parse("A;B;C").is_empty());
        assert!(parse("A;B;C\r\n").is_empty());
    }

    #[test]
    fn test_crlf_quotes_and_whitespace() {
        let rows = parse(" Created Date ; Cliente \r\n\"2024-01\"; \"Acme Corp\" \r\n2024-02;Beta\r\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(cell(&rows[0], "Created Date"), "2024-01");
        assert_eq!(cell(&rows[0], "Cliente"), "Acme Corp");
        assert_eq!(cell(&rows[1], "Cliente"), "Beta");
    }

    #[test]
    fn test_header_order_preserved() {
        let rows = parse("Z;A;M\n1;2;3");
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_extra_cells_ignored() {
        let rows = parse("A\n1;2;3");
        assert_eq!(rows[0].len(), 1);
        assert_eq!(cell(&rows[0], "A"), "1");
    }

    #[test]
    fn test_quoted_delimiter_is_not_escaped() {
        // known limitation: the quoted ';' splits the cell
        let rows = parse("A;B\n\"x;y\";z");
        assert_eq!(cell(&rows[0], "A"), "x");
        assert_eq!(cell(&rows[0], "B"), "y");
    }

    #[test]
    fn test_wrong_delimiter_degrades() {
        let rows = parse("A,B\n1,2");
        assert_eq!(rows.len(), 1);
        assert_eq!(cell(&rows[0], "A,B"), "1,2");
    }
}
