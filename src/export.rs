//! Table import/export at the edges of classification.
//!
//! Reads the `url` column of an uploaded CSV and renders each partition back
//! as a one-column CSV. CSV follows RFC 4180 for quoting.

use chrono::NaiveDateTime;

use crate::error::{Result, ValidatorError};
use crate::types::Partition;

/// Name of the input column holding URLs
pub const URL_COLUMN: &str = "url";

/// Extract the `url` column from CSV text, in row order.
///
/// Rows shorter than the header contribute an empty string.
pub fn read_url_column(text: &str) -> Result<Vec<String>> {
    let mut records = parse_csv(text)?.into_iter();

    let header = records.next().ok_or(ValidatorError::MissingUrlColumn)?;
    let column = header
        .iter()
        .position(|name| name == URL_COLUMN)
        .ok_or(ValidatorError::MissingUrlColumn)?;

    Ok(records
        .map(|mut record| {
            if column < record.len() {
                record.swap_remove(column)
            } else {
                String::new()
            }
        })
        .collect())
}

/// Render one partition as CSV: a header row, then one URL per row.
pub fn render_partition_csv(partition: Partition, urls: &[String]) -> String {
    let mut out = String::new();

    out.push_str(&escape_csv_field(partition.header()));
    out.push('\n');

    for url in urls {
        out.push_str(&escape_csv_field(url));
        out.push('\n');
    }

    out
}

/// File name for an exported partition, e.g. `valid_urls_2024-05-01_13-45-00.csv`.
pub fn export_file_name(partition: Partition, timestamp: NaiveDateTime) -> String {
    format!(
        "{}_{}.csv",
        partition.file_stem(),
        timestamp.format("%Y-%m-%d_%H-%M-%S")
    )
}

/// Escapes a field for CSV output (RFC 4180).
///
/// Fields containing comma, double quote, or newline are quoted with
/// embedded quotes doubled. An empty field is written as `""` so its row is
/// not read back as a blank line.
fn escape_csv_field(s: &str) -> String {
    if s.is_empty() {
        "\"\"".to_string()
    } else if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Parse CSV text into records. Accepts LF and CRLF line endings.
fn parse_csv(text: &str) -> Result<Vec<Vec<String>>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // Whether the current line had a quoted field, so `""` is not a blank line
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quoted = true;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record), quoted);
                quoted = false;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ValidatorError::Csv("unterminated quoted field".to_string()));
    }

    if !field.is_empty() || !record.is_empty() || quoted {
        record.push(field);
        push_record(&mut records, record, quoted);
    }

    Ok(records)
}

// Blank lines carry no record.
fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>, quoted: bool) {
    if quoted || !(record.len() == 1 && record[0].is_empty()) {
        records.push(record);
    }
}
