//! Treasure-hunt clue reader.
//!
//! Turns a screenshot of the in-game hunt panel into a structured
//! [`HuntRecord`]:
//! - region segmentation from the horizontal intensity profile
//! - OCR through a pluggable [`OcrEngine`]
//! - line correction and state-machine parsing
//! - hint segmentation and arrow direction classification
//! - tolerant matching of hint text against a candidate list

pub mod arrow;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod ocr;
pub mod parse;
pub mod paths;
pub mod pipeline;
pub mod segment;
pub mod travel;

pub use config::{get_config, init_config, ReaderConfig, RelativeRect};
pub use error::{HuntError, Result};
pub use matcher::{best_match, Candidate, CandidateSource, JsonCandidateFile, MatchOutcome};
pub use model::{Direction, HintEntry, HuntRecord, RawLine, Region};
pub use ocr::{OcrEngine, OcrLine, OcrWord, TesseractEngine};
pub use pipeline::{match_last_hint, read_hunt, read_hunt_with_retry};
pub use segment::{segment_screenshot, ScreenshotRegions};
pub use travel::{read_player_position, TravelCommand};
