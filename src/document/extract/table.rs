use super::ExtractError;
use crate::text::decode_utf8_ignoring_errors;

/// Rows beyond this are dropped.
pub(super) const MAX_CSV_ROWS: usize = 100;

/// Renders CSV as `a, b, c` lines, first [`MAX_CSV_ROWS`] rows only.
pub(super) fn csv_text(bytes: &[u8]) -> Result<String, ExtractError> {
    if bytes.contains(&0) {
        return Err(ExtractError::Corrupt("csv".to_string()));
    }
    let text = decode_utf8_ignoring_errors(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut lines = Vec::new();
    for record in reader.records().take(MAX_CSV_ROWS) {
        let record = record?;
        lines.push(record.iter().collect::<Vec<_>>().join(", "));
    }
    Ok(lines.join("\n"))
}
