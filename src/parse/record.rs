//! Line-driven state machine that assembles a [`HuntRecord`].
//!
//! State transitions:
//! - SeekStep -> SeekStart (step label found)
//! - any -> SeekZoneDescription (start coordinates found)
//! - SeekZoneDescription -> CollectingHints (closing parenthesis found)
//! - any -> Idle (remaining tries found)

use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

use super::hints::HintSegmenter;
use crate::model::HuntRecord;

static STEP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[ÉE]TAPE\s*:\s*(\d+)\s*/\s*(\d+)").expect("step pattern is valid")
});

// Searched anywhere in the line: the map pin icon in front of "Départ"
// often reads as a stray letter.
static START_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)D[ée]part\s*\[\s*(-?\d{1,3})\s*,\s*(-?\d{1,3})\s*\]")
        .expect("start pattern is valid")
});

static TRIES_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s+essais?\s+restants?").expect("tries pattern is valid")
});

/// Parser position within the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    SeekStep,
    SeekStart,
    SeekZoneDescription,
    CollectingHints,
    Idle,
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserState::SeekStep => write!(f, "SeekStep"),
            ParserState::SeekStart => write!(f, "SeekStart"),
            ParserState::SeekZoneDescription => write!(f, "SeekZoneDescription"),
            ParserState::CollectingHints => write!(f, "CollectingHints"),
            ParserState::Idle => write!(f, "Idle"),
        }
    }
}

/// Consumes corrected lines in order and fills a [`HuntRecord`].
#[derive(Debug)]
pub struct RecordParser {
    state: ParserState,
    record: HuntRecord,
    hints: HintSegmenter,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::SeekStep,
            record: HuntRecord::default(),
            hints: HintSegmenter::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Classifies one line. Patterns are tried in priority order: step,
    /// start, zone description, remaining tries, hint.
    pub fn feed(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        if let Some(caps) = STEP_PATTERN.captures(line) {
            self.record.step = capture_number(&caps, 1);
            self.record.total_steps = capture_number(&caps, 2);
            if self.state == ParserState::SeekStep {
                self.transition(ParserState::SeekStart);
            }
            return;
        }

        if let Some(caps) = START_PATTERN.captures(line) {
            self.record.start_x = capture_number(&caps, 1);
            self.record.start_y = capture_number(&caps, 2);
            self.transition(ParserState::SeekZoneDescription);
            return;
        }

        if self.state == ParserState::SeekZoneDescription {
            self.append_zone_description(line);
            return;
        }

        if let Some(caps) = TRIES_PATTERN.captures(line) {
            self.record.remaining_tries = capture_number(&caps, 1);
            self.hints.flush();
            self.transition(ParserState::Idle);
            return;
        }

        if self.state == ParserState::CollectingHints {
            self.hints.push_line(line);
        } else {
            debug!("Ignoring line in state {}: '{}'", self.state, line);
        }
    }

    /// Flushes pending hint text and returns the record.
    pub fn finish(mut self) -> HuntRecord {
        self.record.hints = self.hints.take_entries();
        self.record
    }

    fn append_zone_description(&mut self, line: &str) {
        let (text, closed) = match line.find(')') {
            Some(end) => (&line[..=end], true),
            None => (line, false),
        };

        let zone = self.record.start_zone_description.get_or_insert_with(String::new);
        if !zone.is_empty() {
            zone.push(' ');
        }
        zone.push_str(text.trim());

        if closed {
            self.transition(ParserState::CollectingHints);
        }
    }

    fn transition(&mut self, next: ParserState) {
        if self.state != next {
            debug!("Parser state: {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

fn capture_number<T: std::str::FromStr>(caps: &Captures, group: usize) -> Option<T> {
    caps.get(group)?.as_str().parse().ok()
}
