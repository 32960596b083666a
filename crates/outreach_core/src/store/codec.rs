//! Comma-delimited text codec.
//!
//! Reads quoted fields (including embedded delimiters, doubled quotes and
//! line breaks), tolerates a leading byte-order mark and mixed CRLF/LF line
//! endings, and skips blank lines.

use std::borrow::Cow;

use super::{StoreError, StoreResult};

/// One decoded row with the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Splits delimited text into rows of raw fields.
///
/// # Errors
/// - Returns `StoreError::InvalidData` when a quoted field is never closed.
pub fn parse_rows(text: &str) -> StoreResult<Vec<CsvRow>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut row_has_content = false;
    let mut line = 1;
    let mut row_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push('\n');
                }
                other => field.push(other),
            }
            continue;
        }

        match ch {
            '"' if field.is_empty() && !field_was_quoted => {
                in_quotes = true;
                field_was_quoted = true;
                row_has_content = true;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                field_was_quoted = false;
                row_has_content = true;
            }
            '\r' | '\n' => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if row_has_content {
                    fields.push(std::mem::take(&mut field));
                    rows.push(CsvRow {
                        line: row_line,
                        fields: std::mem::take(&mut fields),
                    });
                }
                field_was_quoted = false;
                row_has_content = false;
                line += 1;
                row_line = line;
            }
            other => {
                field.push(other);
                row_has_content = true;
            }
        }
    }

    if in_quotes {
        return Err(StoreError::InvalidData {
            line: row_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if row_has_content {
        fields.push(field);
        rows.push(CsvRow {
            line: row_line,
            fields,
        });
    }

    Ok(rows)
}

/// Quotes a field when it carries a delimiter, quote or line break.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Appends one `\n`-terminated row to `out`.
pub fn push_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (index, value) in fields.into_iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(value));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::{escape_field, parse_rows, push_row};
    use crate::store::StoreError;

    fn fields(text: &str) -> Vec<Vec<String>> {
        parse_rows(text)
            .unwrap()
            .into_iter()
            .map(|row| row.fields)
            .collect()
    }

    #[test]
    fn parses_plain_and_quoted_fields() {
        let rows = fields("a,b,c\n\"x, y\",\"say \"\"hi\"\"\",\n");
        assert_eq!(rows[0], vec!["a", "b", "c"]);
        assert_eq!(rows[1], vec!["x, y", "say \"hi\"", ""]);
    }

    #[test]
    fn quoted_line_breaks_stay_in_field_and_lines_are_tracked() {
        let rows = parse_rows("h1,h2\r\n\"multi\nline\",v\r\nlast,row").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].fields, vec!["multi\nline", "v"]);
        assert_eq!(rows[1].line, 2);
        assert_eq!(rows[2].line, 4);
    }

    #[test]
    fn skips_bom_and_blank_lines() {
        let rows = fields("\u{feff}h\n\n\nvalue\n");
        assert_eq!(rows, vec![vec!["h"], vec!["value"]]);
    }

    #[test]
    fn unterminated_quote_is_invalid_data() {
        let err = parse_rows("h\n\"open").unwrap_err();
        assert!(matches!(err, StoreError::InvalidData { line: 2, .. }));
    }

    #[test]
    fn escape_and_push_row_quote_only_when_needed() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("q\"q"), "\"q\"\"q\"");

        let mut out = String::new();
        push_row(&mut out, ["a", "b\nc", ""]);
        assert_eq!(out, "a,\"b\nc\",\n");
        assert_eq!(fields(&out), vec![vec!["a", "b\nc", ""]]);
    }
}
