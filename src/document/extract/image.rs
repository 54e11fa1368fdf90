use std::path::Path;
use std::process::Command;

use tracing::debug;

use super::ExtractError;

/// Runs `tesseract <image> stdout` and returns the recognized text.
pub(super) fn ocr(path: &Path, tesseract_cmd: &str) -> Result<String, ExtractError> {
    let output = Command::new(tesseract_cmd)
        .arg(path)
        .arg("stdout")
        .output()
        .map_err(|e| ExtractError::Ocr(format!("cannot run {tesseract_cmd}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractError::Ocr(format!(
            "{tesseract_cmd} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    debug!(bytes = output.stdout.len(), "ocr finished");
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
