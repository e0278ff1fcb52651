//! Minimal CSV codec for the export/import format.
//!
//! RFC-4180-style quoting: fields containing commas, quotes or newlines are
//! wrapped in double quotes, embedded quotes doubled. Covers exactly what the
//! columnar term format needs.

/// Formats one row, terminated with a newline.
pub fn format_row(fields: &[&str]) -> String {
    let mut row = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            row.push(',');
        }
        if field.contains(['"', ',', '\n', '\r']) {
            row.push('"');
            for c in field.chars() {
                if c == '"' {
                    row.push('"');
                }
                row.push(c);
            }
            row.push('"');
        } else {
            row.push_str(field);
        }
    }
    row.push('\n');
    row
}

/// Parses a whole document into records. Handles quoted fields, doubled
/// quotes, embedded newlines and a missing trailing newline.
pub fn parse_records(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                _ => field.push(c),
            }
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}
