use super::{ExtractError, FileKind, office, pdf};
use crate::text::decode_utf8_ignoring_errors;

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Format-agnostic extractor: trusts the content over the extension.
///
/// PDF and ZIP containers go to their parsers; anything else is read as text
/// unless it looks binary or claims to be a document format it is not.
pub(super) fn extract(bytes: &[u8], kind: FileKind) -> Result<String, ExtractError> {
    if bytes.starts_with(PDF_MAGIC) {
        return pdf::extract(bytes);
    }
    if bytes.starts_with(ZIP_MAGIC) {
        return office::docx_text(bytes).or_else(|_| office::xlsx_text(bytes));
    }
    if kind.is_binary_document() {
        return Err(ExtractError::Corrupt(kind_extension(kind).to_string()));
    }
    if bytes.contains(&0) {
        return Err(ExtractError::Unsupported);
    }
    Ok(decode_utf8_ignoring_errors(bytes))
}

fn kind_extension(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Pdf => "pdf",
        FileKind::Docx => "docx",
        FileKind::Xlsx => "xlsx",
        FileKind::Text => "txt",
        FileKind::Csv => "csv",
        FileKind::Image => "image",
        FileKind::Other => "bin",
    }
}
