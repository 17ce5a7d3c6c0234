//! End-to-end reading of one screenshot, plus the caller-side retry driver.

use image::RgbaImage;
use tracing::{info, warn};

use crate::arrow::{assign_directions, classify_glyphs};
use crate::config::ReaderConfig;
use crate::error::{HuntError, Result};
use crate::matcher::{best_match, CandidateSource, MatchOutcome};
use crate::model::{HuntRecord, RawLine, Region};
use crate::ocr::{prepare_for_ocr, OcrEngine};
use crate::parse::{correct_lines, parse_lines};
use crate::segment::{segment_screenshot, ScreenshotRegions};

/// Reads a hunt panel screenshot into a [`HuntRecord`].
///
/// Stages run strictly in order: segmentation, OCR of each region, line
/// correction, parsing, arrow classification, and validation of the
/// required fields.
pub fn read_hunt(
    img: &RgbaImage,
    engine: &dyn OcrEngine,
    config: &ReaderConfig,
) -> Result<HuntRecord> {
    let regions = segment_screenshot(img, &config.segmenter)?;
    let raw_lines = recognize_regions(&regions, engine, config)?;

    let corrected = correct_lines(&raw_lines);
    let mut record = parse_lines(&corrected);

    let directions = classify_glyphs(&regions.glyph_column, config.min_glyph_size);
    assign_directions(&mut record.hints, &directions);

    let missing = record.missing_fields();
    if !missing.is_empty() {
        return Err(HuntError::ParseIncomplete {
            record: Box::new(record),
            missing,
        });
    }

    info!(
        "Read hunt: step {:?}/{:?}, start {:?}, {} hint(s)",
        record.step,
        record.total_steps,
        record.start_position(),
        record.hints.len()
    );
    Ok(record)
}

/// Runs [`read_hunt`] up to `attempts` times, capturing a fresh screenshot
/// before each attempt.
///
/// Stops early on errors a new capture cannot fix. Records from failed
/// attempts are discarded, never merged. Returns the last error when every
/// attempt fails.
pub fn read_hunt_with_retry<F>(
    mut capture: F,
    engine: &dyn OcrEngine,
    config: &ReaderConfig,
    attempts: u32,
) -> Result<HuntRecord>
where
    F: FnMut() -> Result<RgbaImage>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        let result = capture().and_then(|img| read_hunt(&img, engine, config));
        match result {
            Ok(record) => return Ok(record),
            Err(e) if e.is_retryable() && attempt < attempts => {
                warn!("Attempt {}/{} failed: {}. Retrying with a new capture.", attempt, attempts, e);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Matches the record's last hint against a fresh candidate list.
pub fn match_last_hint(
    record: &HuntRecord,
    source: &dyn CandidateSource,
    threshold: f64,
) -> Result<MatchOutcome> {
    let Some(hint) = record.last_hint() else {
        return Err(HuntError::ParseIncomplete {
            record: Box::new(record.clone()),
            missing: vec!["hints"],
        });
    };
    let candidates = source.list_candidates()?;
    best_match(&hint.text, &candidates, threshold)
}

/// OCRs every non-empty region in top-to-bottom order.
fn recognize_regions(
    regions: &ScreenshotRegions,
    engine: &dyn OcrEngine,
    config: &ReaderConfig,
) -> Result<Vec<RawLine>> {
    let sections = [
        (Region::Header, &regions.header),
        (Region::Zone, &regions.zone),
        (Region::Hints, &regions.hints),
        (Region::Footer, &regions.footer),
    ];

    let mut raw_lines = Vec::new();
    for (region, image) in sections {
        if image.width() == 0 || image.height() == 0 {
            warn!("Skipping empty {} region", region);
            continue;
        }
        let prepared = prepare_for_ocr(image, &config.ocr);
        let lines = engine.recognize(&prepared, &config.ocr.language)?;
        info!("OCR {}: {} line(s)", region, lines.len());
        raw_lines.extend(
            lines
                .into_iter()
                .map(|line| RawLine::new(line.text, region, line.confidence)),
        );
    }

    if raw_lines.is_empty() {
        return Err(HuntError::OcrEngine(
            "no text recognized in any region".to_string(),
        ));
    }
    Ok(raw_lines)
}
