//! Value types shared by the pipeline stages.
//!
//! Everything here is owned by a single pipeline invocation; nothing is
//! shared across screenshots.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One of the four vertically stacked panel sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Header,
    Zone,
    Hints,
    Footer,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Header => write!(f, "header"),
            Region::Zone => write!(f, "zone"),
            Region::Hints => write!(f, "hints"),
            Region::Footer => write!(f, "footer"),
        }
    }
}

/// A single OCR-recognized line tagged with the region it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLine {
    pub text: String,
    pub region: Region,
    pub confidence: f32,
}

impl RawLine {
    pub fn new(text: impl Into<String>, region: Region, confidence: f32) -> Self {
        Self {
            text: text.into(),
            region,
            confidence,
        }
    }
}

/// Direction of a hint arrow.
///
/// Codes follow the four-direction action encoding used downstream:
/// East=0, South=2, West=4, North=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    East,
    South,
    West,
    North,
}

impl Direction {
    pub fn code(self) -> u8 {
        match self {
            Direction::East => 0,
            Direction::South => 2,
            Direction::West => 4,
            Direction::North => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Direction::East),
            2 => Some(Direction::South),
            4 => Some(Direction::West),
            6 => Some(Direction::North),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::East => write!(f, "East"),
            Direction::South => write!(f, "South"),
            Direction::West => write!(f, "West"),
            Direction::North => write!(f, "North"),
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Direction::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid direction code {}", code)))
    }
}

/// One discrete hint line of the hunt panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintEntry {
    #[serde(rename = "hintText")]
    pub text: String,
    #[serde(rename = "hintDirection")]
    pub direction: Option<Direction>,
    /// Position among the hints, top to bottom (0-based)
    #[serde(skip)]
    pub order: usize,
}

impl HintEntry {
    pub fn new(text: impl Into<String>, order: usize) -> Self {
        Self {
            text: text.into(),
            direction: None,
            order,
        }
    }
}

/// Structured result of parsing one screenshot's clue panel.
///
/// Unset fields stay `None` so callers can tell "not found" apart from
/// "found as zero".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HuntRecord {
    #[serde(rename = "start_pos_zone")]
    pub start_zone_description: Option<String>,
    #[serde(rename = "start_pos_x")]
    pub start_x: Option<i32>,
    #[serde(rename = "start_pos_y")]
    pub start_y: Option<i32>,
    pub step: Option<u32>,
    pub total_steps: Option<u32>,
    pub remaining_tries: Option<u32>,
    pub hints: Vec<HintEntry>,
    #[serde(rename = "last_hint_pos_x")]
    pub last_hint_x: Option<i32>,
    #[serde(rename = "last_hint_pos_y")]
    pub last_hint_y: Option<i32>,
}

impl HuntRecord {
    /// Start coordinates when both axes were read.
    pub fn start_position(&self) -> Option<(i32, i32)> {
        Some((self.start_x?, self.start_y?))
    }

    /// The bottom-most hint, which is the one currently being solved.
    pub fn last_hint(&self) -> Option<&HintEntry> {
        self.hints.last()
    }

    /// Names of the required fields that were never populated.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.start_position().is_none() {
            missing.push("start position");
        }
        if self.step.is_none() || self.total_steps.is_none() {
            missing.push("step");
        }
        if self.hints.is_empty() {
            missing.push("hints");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_codes() {
        for dir in [Direction::East, Direction::South, Direction::West, Direction::North] {
            assert_eq!(Direction::from_code(dir.code()), Some(dir));
        }
        assert_eq!(Direction::from_code(1), None);
    }

    #[test]
    fn test_record_json_shape() {
        let mut record = HuntRecord {
            start_zone_description: Some("(Zone Forestière)".to_string()),
            start_x: Some(3),
            start_y: Some(-5),
            step: Some(2),
            total_steps: Some(6),
            ..Default::default()
        };
        let mut hint = HintEntry::new("Cherche près du pont", 0);
        hint.direction = Some(Direction::West);
        record.hints.push(hint);
        record.hints.push(HintEntry::new("Ancre dorée", 1));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["start_pos_zone"], "(Zone Forestière)");
        assert_eq!(json["start_pos_x"], 3);
        assert_eq!(json["start_pos_y"], -5);
        assert!(json["remaining_tries"].is_null());
        assert!(json["last_hint_pos_x"].is_null());
        assert_eq!(json["hints"][0]["hintText"], "Cherche près du pont");
        assert_eq!(json["hints"][0]["hintDirection"], 4);
        assert!(json["hints"][1]["hintDirection"].is_null());
        assert!(json["hints"][0].get("order").is_none());
    }

    #[test]
    fn test_missing_fields() {
        let record = HuntRecord {
            step: Some(1),
            total_steps: Some(4),
            ..Default::default()
        };
        assert_eq!(record.missing_fields(), vec!["start position", "hints"]);
    }
}
