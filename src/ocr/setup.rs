use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::error::{HuntError, Result};
use crate::paths::get_tesseract_dir;

#[cfg(windows)]
const TESSERACT_EXE: &str = "tesseract.exe";
#[cfg(not(windows))]
const TESSERACT_EXE: &str = "tesseract";

/// Finds the Tesseract executable: configured path first, then our local
/// dir, then the system `PATH`.
pub fn find_tesseract_executable(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        info!(
            "Configured tesseract path {} does not exist, searching elsewhere",
            path.display()
        );
    }

    let local_exe = get_tesseract_dir().join(TESSERACT_EXE);
    if local_exe.exists() {
        return Ok(local_exe);
    }

    // Check PATH
    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    Err(HuntError::OcrEngine(
        "Tesseract not found. Please install Tesseract-OCR or set ocr.tesseract_path.".to_string(),
    ))
}

/// Finds a tessdata directory holding the traineddata for `language`.
///
/// Returns `None` when the executable's built-in default should be used.
pub fn find_tessdata_dir(configured: Option<&Path>, language: &str) -> Option<PathBuf> {
    let traineddata = format!("{}.traineddata", language);

    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(path) = configured {
        candidates.push(path.to_path_buf());
    }
    candidates.push(get_tesseract_dir().join("tessdata"));

    // Check TESSDATA_PREFIX environment variable
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let prefix = PathBuf::from(prefix);
        candidates.push(prefix.join("tessdata"));
        candidates.push(prefix);
    }

    let found = candidates
        .into_iter()
        .find(|dir| dir.join(&traineddata).exists());
    if found.is_none() {
        debug!("No tessdata directory with {} found, using tesseract default", traineddata);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_configured_executable_is_preferred() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("tesseract-custom");
        std::fs::write(&exe, "").unwrap();

        let found = find_tesseract_executable(Some(&exe)).unwrap();
        assert_eq!(found, exe);
    }

    #[test]
    fn test_configured_tessdata_with_language() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("fra.traineddata"), "").unwrap();

        let found = find_tessdata_dir(Some(dir.path()), "fra");
        assert_eq!(found.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_configured_tessdata_without_language_is_skipped() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("eng.traineddata"), "").unwrap();

        let found = find_tessdata_dir(Some(dir.path()), "fra");
        assert_ne!(found.as_deref(), Some(dir.path()));
    }
}
