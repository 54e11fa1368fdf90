use std::panic::{self, AssertUnwindSafe};

use super::ExtractError;

/// Reads the PDF text layer, pages in document order.
///
/// `pdf-extract` panics on some malformed inputs; those are reported as
/// ordinary extraction failures.
pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::Pdf(e.to_string())),
        Err(_) => Err(ExtractError::Pdf("parser panicked on malformed input".to_string())),
    }
}
