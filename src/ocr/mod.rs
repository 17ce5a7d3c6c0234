pub mod engine;
pub mod preprocess;
pub mod setup;

pub use engine::TesseractEngine;
pub use preprocess::{binarize, crop_region, prepare_for_ocr};

use image::DynamicImage;

use crate::error::Result;

/// Represents a line of OCR text with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct OcrLine {
    pub text: String,
    pub words: Vec<OcrWord>,
    pub confidence: f32,
}

/// Represents a single word from OCR with confidence score
#[derive(Debug, Clone, PartialEq)]
pub struct OcrWord {
    pub text: String,
    pub confidence: f32,
}

impl OcrLine {
    /// Builds a line from its words, averaging their confidence.
    pub fn from_words(words: Vec<OcrWord>) -> Self {
        let confidence = if words.is_empty() {
            0.0
        } else {
            words.iter().map(|w| w.confidence).sum::<f32>() / words.len() as f32
        };
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            text,
            words,
            confidence,
        }
    }
}

/// Text recognition collaborator.
///
/// Given an image and a language hint, returns the recognized lines in
/// top-to-bottom order. The pipeline depends only on this contract.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<Vec<OcrLine>>;
}

impl<T: OcrEngine + ?Sized> OcrEngine for &T {
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<Vec<OcrLine>> {
        (**self).recognize(image, language)
    }
}
