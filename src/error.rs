//! Error types for the hunt reader pipeline.

use std::io;
use thiserror::Error;

use crate::model::HuntRecord;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, HuntError>;

/// Failure of one pipeline invocation.
///
/// Each variant aborts the current attempt. Retry policy belongs to the
/// caller, which must recapture the screenshot before trying again.
#[derive(Error, Debug)]
pub enum HuntError {
    /// Not enough horizontal separators to split the panel.
    #[error("Segmentation failed: {0}")]
    Segmentation(String),

    /// The OCR collaborator failed or returned nothing.
    #[error("OCR engine error: {0}")]
    OcrEngine(String),

    /// Required fields were never populated. Carries the partial record.
    #[error("Incomplete hunt record, missing: {}", .missing.join(", "))]
    ParseIncomplete {
        record: Box<HuntRecord>,
        missing: Vec<&'static str>,
    },

    /// No candidate reached the similarity threshold.
    #[error("No candidate matches hint '{hint}' (best score {best_score:.1})")]
    NoMatch { hint: String, best_score: f64 },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HuntError {
    /// Short tag used in the JSON error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            HuntError::Segmentation(_) => "SegmentationError",
            HuntError::OcrEngine(_) => "OCREngineError",
            HuntError::ParseIncomplete { .. } => "ParseIncompleteError",
            HuntError::NoMatch { .. } => "NoMatchError",
            HuntError::Image(_) => "ImageError",
            HuntError::Io(_) => "IoError",
            HuntError::Json(_) => "JsonError",
        }
    }

    /// Whether a fresh capture might succeed where this attempt failed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HuntError::Segmentation(_) | HuntError::OcrEngine(_) | HuntError::ParseIncomplete { .. }
        )
    }

    /// Builds the `{"error": ..., "details": ...}` envelope.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.kind(),
            "details": self.to_string(),
        })
    }

    /// The partial record of an incomplete parse, for diagnostics.
    pub fn partial_record(&self) -> Option<&HuntRecord> {
        match self {
            HuntError::ParseIncomplete { record, .. } => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope() {
        let err = HuntError::Segmentation("found 1 separator".to_string());
        let json = err.to_json();
        assert_eq!(json["error"], "SegmentationError");
        assert_eq!(json["details"], "Segmentation failed: found 1 separator");
    }

    #[test]
    fn test_parse_incomplete_keeps_record() {
        let mut record = HuntRecord::default();
        record.step = Some(2);
        let err = HuntError::ParseIncomplete {
            record: Box::new(record),
            missing: vec!["start position", "hints"],
        };

        assert!(err.is_retryable());
        assert_eq!(err.partial_record().and_then(|r| r.step), Some(2));
        assert_eq!(
            err.to_string(),
            "Incomplete hunt record, missing: start position, hints"
        );
    }

    #[test]
    fn test_no_match_is_not_retryable() {
        let err = HuntError::NoMatch {
            hint: "pont".to_string(),
            best_score: 80.0,
        };
        assert!(!err.is_retryable());
        assert_eq!(err.kind(), "NoMatchError");
    }
}
