//! Configuration types for the hunt reader.
//!
//! Loads settings from config.json at startup. Provides segmentation
//! thresholds, OCR preprocessing parameters, and matching tolerances.
//! Pipeline functions take the configuration by reference; the global
//! instance only serves the binary.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<ReaderConfig> = OnceLock::new();

/// A rectangle in relative coordinates (0.0 to 1.0).
/// Used for screen regions that scale with the capture size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelativeRect {
    /// X position of top-left corner (0.0 = left edge, 1.0 = right edge)
    pub x: f32,
    /// Y position of top-left corner (0.0 = top edge, 1.0 = bottom edge)
    pub y: f32,
    /// Width as fraction of image width
    pub width: f32,
    /// Height as fraction of image height
    pub height: f32,
}

/// Parameters of the horizontal-intensity region segmenter.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Moving-average window applied to the row intensity profile
    pub smoothing_window: usize,
    /// Minimum distance between two peaks (rows)
    pub min_peak_distance: usize,
    /// Minimum peak prominence (intensity units)
    pub min_prominence: f32,
    /// Smoothed intensity band of the UI separator lines
    pub separator_band: (f32, f32),
    /// Rows added to every boundary before slicing
    pub padding: u32,
    /// Left margin of the hints area as fraction of width
    pub hints_left_margin: f64,
    /// Width of the arrow column as fraction of width
    pub glyph_column_width: f64,
    /// Right margin of the hints area (status icons) as fraction of width
    pub hints_right_margin: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 3,
            min_peak_distance: 10,
            min_prominence: 5.0,
            separator_band: (40.0, 50.0),
            padding: 10,
            hints_left_margin: 0.025,
            glyph_column_width: 0.10,
            hints_right_margin: 0.38,
        }
    }
}

/// OCR engine and preprocessing settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language code (the game client is in French)
    pub language: String,
    /// Upscale factor applied before OCR
    pub upscale_factor: u32,
    /// Contrast adjustment in percent (100.0 doubles the contrast)
    pub contrast: f32,
    /// Explicit path to the tesseract executable
    pub tesseract_path: Option<PathBuf>,
    /// Explicit tessdata directory
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "fra".to_string(),
            upscale_factor: 3,
            contrast: 100.0,
            tesseract_path: None,
            tessdata_dir: None,
        }
    }
}

/// Complete reader configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default)]
    pub segmenter: SegmenterConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    /// Smallest bounding box (width and height) accepted as an arrow glyph
    #[serde(default = "default_min_glyph_size")]
    pub min_glyph_size: u32,
    /// Minimum per-word similarity (0-100) for accepting a candidate
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    /// Attempts made by the retry driver, each on a fresh capture
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Largest plausible jump (Manhattan distance) from the last hint position
    #[serde(default = "default_max_hint_distance")]
    pub max_hint_distance: u32,
    /// Region of the player position widget; whole image when unset
    #[serde(default)]
    pub player_region: Option<RelativeRect>,
}

fn default_min_glyph_size() -> u32 {
    10
}

fn default_match_threshold() -> f64 {
    95.0
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_max_hint_distance() -> u32 {
    10
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            ocr: OcrConfig::default(),
            min_glyph_size: default_min_glyph_size(),
            match_threshold: default_match_threshold(),
            retry_attempts: default_retry_attempts(),
            max_hint_distance: default_max_hint_distance(),
            player_region: None,
        }
    }
}

/// Reads a configuration file, falling back to defaults when it is missing
/// or malformed.
pub fn load_config_from(config_path: &Path) -> ReaderConfig {
    info!("Looking for config at: {}", config_path.display());

    if !config_path.exists() {
        info!("config.json not found. Using default config.");
        return ReaderConfig::default();
    }

    match fs::read_to_string(config_path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                info!("Config loaded from {}", config_path.display());
                config
            }
            Err(e) => {
                warn!("Failed to parse config.json: {}. Using defaults.", e);
                ReaderConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read config.json: {}. Using defaults.", e);
            ReaderConfig::default()
        }
    }
}

/// Loads configuration from config.json next to the executable.
fn load_config() -> ReaderConfig {
    let config_path = crate::paths::get_exe_dir().join("config.json");
    load_config_from(&config_path)
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config());
}

/// Returns a reference to the global configuration.
/// Falls back to loading it on first use if `init_config()` was not called.
pub fn get_config() -> &'static ReaderConfig {
    CONFIG.get_or_init(load_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json"));
        assert_eq!(config.segmenter.smoothing_window, 3);
        assert_eq!(config.segmenter.padding, 10);
        assert_eq!(config.match_threshold, 95.0);
        assert_eq!(config.ocr.language, "fra");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "match_threshold": 90.0, "segmenter": { "padding": 4 } }"#,
        )
        .unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.match_threshold, 90.0);
        assert_eq!(config.segmenter.padding, 4);
        assert_eq!(config.segmenter.min_peak_distance, 10);
        assert_eq!(config.retry_attempts, 3);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.min_glyph_size, 10);
    }

    #[test]
    fn test_player_region_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "player_region": { "x": 0.0, "y": 0.05, "width": 0.2, "height": 0.05 } }"#,
        )
        .unwrap();

        let config = load_config_from(&path);
        let region = config.player_region.unwrap();
        assert_eq!(region.width, 0.2);
        assert_eq!(config.max_hint_distance, 10);
    }
}
