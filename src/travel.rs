//! Travel commands and position bookkeeping between hints.

use image::RgbaImage;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::config::ReaderConfig;
use crate::error::Result;
use crate::model::HuntRecord;
use crate::ocr::{crop_region, prepare_for_ocr, OcrEngine};

static TRAVEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/travel\s+(-?\d+)\s*(?:,\s*|\s+)(-?\d+)$").expect("travel pattern is valid")
});

static POSITION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d{1,3}),\s*(-?\d{1,3})").expect("position pattern is valid")
});

/// The `/travel x,y` chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelCommand {
    pub x: i32,
    pub y: i32,
}

impl TravelCommand {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Parses `/travel x,y` or `/travel x y`.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = TRAVEL_PATTERN.captures(text.trim())?;
        Some(Self {
            x: caps[1].parse().ok()?,
            y: caps[2].parse().ok()?,
        })
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

impl fmt::Display for TravelCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/travel {},{}", self.x, self.y)
    }
}

impl HuntRecord {
    /// Records where the last solved hint led.
    pub fn set_last_hint_position(&mut self, x: i32, y: i32) {
        self.last_hint_x = Some(x);
        self.last_hint_y = Some(y);
    }

    pub fn last_hint_position(&self) -> Option<(i32, i32)> {
        Some((self.last_hint_x?, self.last_hint_y?))
    }

    /// Travel command to the hunt's start position.
    pub fn start_travel_command(&self) -> Option<TravelCommand> {
        self.start_position().map(|(x, y)| TravelCommand::new(x, y))
    }

    /// Manhattan distance from the last hint position to `target`.
    pub fn distance_from_last_hint(&self, target: (i32, i32)) -> Option<u32> {
        let (x, y) = self.last_hint_position()?;
        Some(x.abs_diff(target.0) + y.abs_diff(target.1))
    }

    /// Whether `target` is within `config.max_hint_distance` of the last
    /// hint position.
    ///
    /// Without a recorded last hint position any target is accepted.
    pub fn is_consistent_with_last_hint(&self, target: (i32, i32), config: &ReaderConfig) -> bool {
        let max_distance = config.max_hint_distance;
        match self.distance_from_last_hint(target) {
            Some(distance) if distance > max_distance => {
                warn!(
                    "Target {:?} is {} maps from the last hint (max {})",
                    target, distance, max_distance
                );
                false
            }
            _ => true,
        }
    }
}

/// Reads the player's map coordinates from the position widget.
///
/// Crops to `config.player_region` when set. Returns `None` when no
/// coordinate pair is recognized.
pub fn read_player_position(
    img: &RgbaImage,
    engine: &dyn OcrEngine,
    config: &ReaderConfig,
) -> Result<Option<(i32, i32)>> {
    let region = match &config.player_region {
        Some(rect) => crop_region(img, rect),
        None => img.clone(),
    };
    let prepared = prepare_for_ocr(&region, &config.ocr);
    let lines = engine.recognize(&prepared, &config.ocr.language)?;

    let position = lines.iter().find_map(|line| {
        let caps = POSITION_PATTERN.captures(&line.text)?;
        Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
    });
    debug!("Player position: {:?}", position);
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelativeRect;
    use crate::ocr::{OcrLine, OcrWord};
    use image::DynamicImage;
    use std::sync::Mutex;

    struct FixedEngine {
        text: &'static str,
        seen: Mutex<Vec<(u32, u32)>>,
    }

    impl FixedEngine {
        fn new(text: &'static str) -> Self {
            Self {
                text,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl OcrEngine for FixedEngine {
        fn recognize(&self, image: &DynamicImage, _language: &str) -> Result<Vec<OcrLine>> {
            self.seen.lock().unwrap().push((image.width(), image.height()));
            Ok(self
                .text
                .lines()
                .map(|l| {
                    OcrLine::from_words(vec![OcrWord {
                        text: l.to_string(),
                        confidence: 90.0,
                    }])
                })
                .collect())
        }
    }

    #[test]
    fn test_parse_travel_command() {
        assert_eq!(TravelCommand::parse("/travel 3,-5"), Some(TravelCommand::new(3, -5)));
        assert_eq!(TravelCommand::parse("/travel -12 7"), Some(TravelCommand::new(-12, 7)));
        assert_eq!(TravelCommand::parse(" /travel 4, 20 "), Some(TravelCommand::new(4, 20)));
        assert_eq!(TravelCommand::parse("/travel 4"), None);
        assert_eq!(TravelCommand::parse("travel 4,2"), None);
    }

    #[test]
    fn test_display_travel_command() {
        assert_eq!(TravelCommand::new(-12, 7).to_string(), "/travel -12,7");
    }

    #[test]
    fn test_start_travel_command() {
        let record = HuntRecord {
            start_x: Some(3),
            start_y: Some(-5),
            ..Default::default()
        };
        assert_eq!(
            record.start_travel_command().map(|c| c.to_string()).as_deref(),
            Some("/travel 3,-5")
        );
        assert!(HuntRecord::default().start_travel_command().is_none());
    }

    #[test]
    fn test_distance_from_last_hint() {
        let config = ReaderConfig::default();
        let mut record = HuntRecord::default();
        assert_eq!(record.distance_from_last_hint((0, 0)), None);
        assert!(record.is_consistent_with_last_hint((50, 50), &config));

        record.set_last_hint_position(3, -5);
        assert_eq!(record.last_hint_position(), Some((3, -5)));
        assert_eq!(record.distance_from_last_hint((6, -1)), Some(7));
        assert!(record.is_consistent_with_last_hint((6, -1), &config));
        assert!(record.is_consistent_with_last_hint((3, 5), &config));
        assert!(!record.is_consistent_with_last_hint((3, 6), &config));
    }

    #[test]
    fn test_max_hint_distance_from_config() {
        let mut record = HuntRecord::default();
        record.set_last_hint_position(0, 0);
        let config = ReaderConfig {
            max_hint_distance: 3,
            ..Default::default()
        };

        assert!(record.is_consistent_with_last_hint((1, 2), &config));
        assert!(!record.is_consistent_with_last_hint((2, 2), &config));
    }

    #[test]
    fn test_last_hint_position_serialized() {
        let mut record = HuntRecord::default();
        record.set_last_hint_position(-1, 8);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["last_hint_pos_x"], -1);
        assert_eq!(json["last_hint_pos_y"], 8);
    }

    #[test]
    fn test_read_player_position() {
        let engine = FixedEngine::new("Amakna\n12, -34 Niveau 200");
        let img = RgbaImage::new(40, 20);

        let position = read_player_position(&img, &engine, &ReaderConfig::default()).unwrap();
        assert_eq!(position, Some((12, -34)));
        assert_eq!(engine.seen.lock().unwrap()[0], (120, 60));
    }

    #[test]
    fn test_read_player_position_crops_region() {
        let engine = FixedEngine::new("-3,7");
        let img = RgbaImage::new(100, 100);
        let config = ReaderConfig {
            player_region: Some(RelativeRect { x: 0.0, y: 0.0, width: 0.5, height: 0.1 }),
            ..Default::default()
        };

        let position = read_player_position(&img, &engine, &config).unwrap();
        assert_eq!(position, Some((-3, 7)));
        assert_eq!(engine.seen.lock().unwrap()[0], (150, 30));
    }

    #[test]
    fn test_read_player_position_none() {
        let engine = FixedEngine::new("Amakna");
        let img = RgbaImage::new(40, 20);
        let position = read_player_position(&img, &engine, &ReaderConfig::default()).unwrap();
        assert_eq!(position, None);
    }
}
