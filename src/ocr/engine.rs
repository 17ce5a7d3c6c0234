use image::DynamicImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::debug;

use super::setup::{find_tessdata_dir, find_tesseract_executable};
use super::{OcrEngine, OcrLine, OcrWord};
use crate::config::OcrConfig;
use crate::error::{HuntError, Result};

/// OCR backed by the Tesseract command-line executable.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
}

impl TesseractEngine {
    /// Locates Tesseract using the configured paths, then the local install
    /// directory, then `PATH`.
    pub fn from_config(config: &OcrConfig) -> Result<Self> {
        let executable = find_tesseract_executable(config.tesseract_path.as_deref())?;
        let tessdata = find_tessdata_dir(config.tessdata_dir.as_deref(), &config.language);
        debug!(
            "Using tesseract at {} (tessdata: {:?})",
            executable.display(),
            tessdata
        );
        Ok(Self {
            executable,
            tessdata,
        })
    }
}

impl OcrEngine for TesseractEngine {
    /// Runs Tesseract on the image.
    /// Returns structured output with lines and confidence scores.
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<Vec<OcrLine>> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        image.save(temp_input.path())?;

        // Create temporary output file (Tesseract adds .tsv extension)
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let mut command = Command::new(&self.executable);
        command.arg(temp_input.path()).arg(&output_base);
        if let Some(tessdata) = &self.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }

        // Assume a single uniform block of text, TSV output for structured data
        let output = command
            .arg("-l")
            .arg(language)
            .arg("--psm")
            .arg("6")
            .arg("tsv")
            .output()
            .map_err(|e| HuntError::OcrEngine(format!("failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HuntError::OcrEngine(format!("tesseract failed: {}", stderr)));
        }

        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path).map_err(|e| {
            HuntError::OcrEngine(format!("failed to read tesseract output: {}", e))
        })?;
        let _ = std::fs::remove_file(&tsv_path);

        Ok(parse_tsv_output(&tsv_content))
    }
}

/// Parses Tesseract TSV output into structured OcrLine data.
///
/// Words are grouped by (block, paragraph, line) so that lines from
/// different blocks never merge.
pub fn parse_tsv_output(tsv: &str) -> Vec<OcrLine> {
    let mut lines: Vec<OcrLine> = Vec::new();
    let mut current_key: Option<(i32, i32, i32)> = None;
    let mut current_words: Vec<OcrWord> = Vec::new();

    // Skip header
    for line in tsv.lines().skip(1) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        // TSV fields: level, page_num, block_num, par_num, line_num, word_num,
        //             left, top, width, height, conf, text
        let level: i32 = fields[0].parse().unwrap_or(-1);
        let key = (
            fields[2].parse().unwrap_or(-1),
            fields[3].parse().unwrap_or(-1),
            fields[4].parse().unwrap_or(-1),
        );
        let conf: f32 = fields[10].parse().unwrap_or(-1.0);
        let text = fields[11].trim();

        // Level 5 = word
        if level != 5 || text.is_empty() || conf < 0.0 {
            continue;
        }

        if current_key != Some(key) {
            if !current_words.is_empty() {
                lines.push(OcrLine::from_words(std::mem::take(&mut current_words)));
            }
            current_key = Some(key);
        }

        current_words.push(OcrWord {
            text: text.to_string(),
            confidence: conf,
        });
    }

    if !current_words.is_empty() {
        lines.push(OcrLine::from_words(current_words));
    }

    lines
}
