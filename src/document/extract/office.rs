use std::io::{Cursor, Read};

use calamine::{Reader as _, Xlsx, open_workbook_from_rs};
use quick_xml::events::Event;

use super::ExtractError;
use crate::text::truncate_chars;

const DOCUMENT_XML: &str = "word/document.xml";

/// Rendered spreadsheets are cut at this many characters.
pub(super) const MAX_TABLE_CHARS: usize = 20_000;

/// Paragraph text of a `.docx`, one paragraph per line.
pub(super) fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| ExtractError::Docx(e.to_string()))?
        .read_to_string(&mut xml)?;

    paragraphs(&xml)
}

fn paragraphs(xml: &str) -> Result<String, ExtractError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => out.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| ExtractError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractError::Docx(format!(
                    "malformed XML at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
    Ok(out.join("\n"))
}

/// First worksheet of an `.xlsx`, rendered as an aligned text table.
pub(super) fn xlsx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: calamine::XlsxError| ExtractError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExtractError::Spreadsheet("workbook has no sheets".to_string()))?
        .map_err(|e| ExtractError::Spreadsheet(e.to_string()))?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    let table = render_table(&rows);
    Ok(truncate_chars(&table, MAX_TABLE_CHARS).to_string())
}

/// Right-aligns every column to its widest cell, two spaces between columns.
pub(super) fn render_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|row| {
            widths
                .iter()
                .enumerate()
                .map(|(i, &w)| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    format!("{cell:>w$}")
                })
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
