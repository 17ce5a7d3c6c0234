//! Text stage of the pipeline: corrected OCR lines to a [`HuntRecord`].

pub mod correct;
pub mod hints;
pub mod record;

pub use correct::{correct_lines, repair_brackets, split_merged};
pub use hints::{sanitize_hint, HintSegmenter};
pub use record::{ParserState, RecordParser};

use crate::model::HuntRecord;

/// Runs the record parser over already-corrected lines.
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> HuntRecord {
    let mut parser = RecordParser::new();
    for line in lines {
        parser.feed(line.as_ref());
    }
    parser.finish()
}
