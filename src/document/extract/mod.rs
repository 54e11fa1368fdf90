//! Text extraction from uploaded files.
//!
//! Each file category owns an ordered list of strategies; the first one that
//! succeeds wins. Everything here is blocking and meant to run off the async
//! runtime.

mod generic;
mod image;
mod office;
mod pdf;
mod table;

use std::path::Path;

use tracing::{debug, warn};

use crate::config::env_or;
use crate::text::decode_utf8_ignoring_errors;

/// Returned in place of OCR output when the image cannot be read.
pub const IMAGE_FALLBACK_TEXT: &str = "Unable to extract text from the image.";

const DEFAULT_TESSERACT: &str = "tesseract";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX parsing failed: {0}")]
    Docx(String),

    #[error("spreadsheet parsing failed: {0}")]
    Spreadsheet(String),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("content is not a valid .{0} file")]
    Corrupt(String),

    #[error("unsupported or binary content")]
    Unsupported,
}

/// Knobs for extractors that shell out or need limits.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// OCR executable, invoked as `<cmd> <image> stdout`.
    pub tesseract_cmd: String,
}

impl ExtractOptions {
    pub fn from_env() -> Self {
        Self {
            tesseract_cmd: env_or("TESSERACT_CMD", DEFAULT_TESSERACT),
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            tesseract_cmd: DEFAULT_TESSERACT.to_string(),
        }
    }
}

/// File category, decided by the lowercase extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
    Docx,
    Csv,
    Xlsx,
    Image,
    Other,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        match extension(path).as_str() {
            "txt" => Self::Text,
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "csv" => Self::Csv,
            "xlsx" => Self::Xlsx,
            "png" | "jpg" | "jpeg" => Self::Image,
            _ => Self::Other,
        }
    }

    pub fn strategies(self) -> &'static [Strategy] {
        match self {
            Self::Text => &[Strategy::PlainText, Strategy::Generic],
            Self::Pdf => &[Strategy::PdfText, Strategy::Generic],
            Self::Docx => &[Strategy::DocxParagraphs, Strategy::Generic],
            Self::Csv => &[Strategy::CsvRows, Strategy::Generic],
            Self::Xlsx => &[Strategy::XlsxTable, Strategy::Generic],
            Self::Image => &[Strategy::Ocr, Strategy::ImageFallback],
            Self::Other => &[Strategy::Generic],
        }
    }

    /// Binary container formats whose bytes are never read as plain text.
    fn is_binary_document(self) -> bool {
        matches!(self, Self::Pdf | Self::Docx | Self::Xlsx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    PlainText,
    PdfText,
    DocxParagraphs,
    CsvRows,
    XlsxTable,
    Ocr,
    ImageFallback,
    Generic,
}

impl Strategy {
    fn run(self, path: &Path, kind: FileKind, opts: &ExtractOptions) -> Result<String, ExtractError> {
        match self {
            Self::PlainText => Ok(decode_utf8_ignoring_errors(&std::fs::read(path)?)),
            Self::PdfText => pdf::extract(&std::fs::read(path)?),
            Self::DocxParagraphs => office::docx_text(&std::fs::read(path)?),
            Self::CsvRows => table::csv_text(&std::fs::read(path)?),
            Self::XlsxTable => office::xlsx_text(&std::fs::read(path)?),
            Self::Ocr => image::ocr(path, &opts.tesseract_cmd),
            Self::ImageFallback => Ok(IMAGE_FALLBACK_TEXT.to_string()),
            Self::Generic => generic::extract(&std::fs::read(path)?, kind),
        }
    }
}

/// Raw text pulled out of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,
    pub extension: String,
    pub strategy: Strategy,
}

/// Runs the strategies for `path`'s category in order until one succeeds.
pub fn extract(path: &Path, opts: &ExtractOptions) -> Result<ExtractionResult, ExtractError> {
    let kind = FileKind::from_path(path);
    let mut last_err = None;

    for &strategy in kind.strategies() {
        match strategy.run(path, kind, opts) {
            Ok(text) => {
                debug!(?strategy, chars = text.len(), "text extracted");
                return Ok(ExtractionResult {
                    text,
                    extension: extension(path),
                    strategy,
                });
            }
            Err(e) => {
                warn!(?strategy, error = %e, path = %path.display(), "extraction strategy failed");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or(ExtractError::Unsupported))
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
