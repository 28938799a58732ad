//! Plain-text record format: one `id,name,age` record per line.

use strata_common::{DataRecord, RecordId, Result, StrataError};

/// Parses records from text. Blank lines are skipped.
///
/// The name is everything between the first and the last comma, kept
/// verbatim, so names may contain commas and surrounding spaces. Line
/// numbers in `ParseError` are 1-based.
pub fn parse_records(text: &str) -> Result<Vec<DataRecord>> {
    let mut records = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_line(line, idx + 1)?);
    }
    Ok(records)
}

fn parse_line(line: &str, line_no: usize) -> Result<DataRecord> {
    let parse_error = |reason: String| StrataError::ParseError {
        line: line_no,
        reason,
    };

    let (id, rest) = line
        .split_once(',')
        .ok_or_else(|| parse_error("expected 3 fields, found 1".to_string()))?;
    let (name, age) = rest
        .rsplit_once(',')
        .ok_or_else(|| parse_error("expected 3 fields, found 2".to_string()))?;

    let id = id
        .trim()
        .parse::<RecordId>()
        .map_err(|e| parse_error(format!("invalid id {:?}: {}", id.trim(), e)))?;
    let age = age
        .trim()
        .parse::<u32>()
        .map_err(|e| parse_error(format!("invalid age {:?}: {}", age.trim(), e)))?;

    Ok(DataRecord::new(id, name, age))
}

/// Formats records as text, one line per record with a trailing newline.
///
/// Fails with `InvalidParameter` for a name holding a line break, which the
/// line format cannot represent.
pub fn format_records(records: &[DataRecord]) -> Result<String> {
    let mut out = String::with_capacity(records.len() * 16);
    for record in records {
        if record.name.contains(['\n', '\r']) {
            return Err(StrataError::invalid_parameter(
                "name",
                format!("{:?} (record {})", record.name, record.id),
            ));
        }
        out.push_str(&record.to_string());
        out.push('\n');
    }
    Ok(out)
}
