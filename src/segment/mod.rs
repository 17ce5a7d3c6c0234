//! Region segmentation of the hunt panel.
//!
//! Splits a screenshot into four vertically stacked sections without any
//! fixed pixel coordinates:
//! - header (step counter)
//! - zone (start position and zone description)
//! - hints (hint lines, plus the arrow column on their left)
//! - footer (remaining tries)
//!
//! The UI draws thin separator lines between sections whose smoothed row
//! intensity falls in a narrow band; those rows are found as peaks of the
//! row intensity profile.

pub mod profile;

use image::{imageops, RgbaImage};
use tracing::{debug, info, warn};

use crate::config::SegmenterConfig;
use crate::error::{HuntError, Result};
use profile::{find_peaks, gradient, row_intensity_profile, smooth_profile, std_dev};

/// The four panel sections of one screenshot and the rows that split them.
///
/// Boundaries already include the padding and satisfy
/// `header_split < zone_split < footer_split < height`.
#[derive(Debug, Clone)]
pub struct ScreenshotRegions {
    pub header: RgbaImage,
    pub zone: RgbaImage,
    /// Hints band with margins, arrow column and status icons cropped away
    pub hints: RgbaImage,
    /// Narrow strip of the hints band holding the direction arrows
    pub glyph_column: RgbaImage,
    pub footer: RgbaImage,
    pub header_split: u32,
    pub zone_split: u32,
    pub footer_split: u32,
}

/// Splits a screenshot into header, zone, hints and footer sections.
///
/// Fails with `HuntError::Segmentation` when fewer than two separator lines
/// are visible or when no footer boundary below the zone section exists.
pub fn segment_screenshot(img: &RgbaImage, config: &SegmenterConfig) -> Result<ScreenshotRegions> {
    let (width, height) = img.dimensions();
    let gray = imageops::grayscale(img);
    let smoothed = smooth_profile(&row_intensity_profile(&gray), config.smoothing_window);

    let peaks = find_separator_peaks(&smoothed, config);
    debug!("Separator peaks: {:?}", peaks);

    let (header_peak, zone_peak) = match peaks.len() {
        0 | 1 => {
            return Err(HuntError::Segmentation(format!(
                "found {} separator line(s), need at least 2",
                peaks.len()
            )));
        }
        // Only two separators visible: use both
        2 => (peaks[0], peaks[1]),
        _ => (peaks[1], peaks[2]),
    };

    let footer_peak = find_footer_split(&smoothed, zone_peak, peaks.last().copied())
        .ok_or_else(|| {
            HuntError::Segmentation(format!(
                "no footer boundary below row {}",
                zone_peak
            ))
        })?;

    let header_split = header_peak as u32 + config.padding;
    let zone_split = zone_peak as u32 + config.padding;
    let footer_split = footer_peak as u32 + config.padding;

    if footer_split >= height {
        return Err(HuntError::Segmentation(format!(
            "footer boundary {} outside image height {}",
            footer_split, height
        )));
    }

    info!(
        "Segmented {}x{} screenshot at rows {}/{}/{}",
        width, height, header_split, zone_split, footer_split
    );

    let header = crop_rows(img, 0, header_split);
    let zone = crop_rows(img, header_split, zone_split);
    let hints_band = crop_rows(img, zone_split, footer_split);
    let footer = crop_rows(img, footer_split, height);

    let (hints, glyph_column) = split_hints_band(&hints_band, config)?;

    Ok(ScreenshotRegions {
        header,
        zone,
        hints,
        glyph_column,
        footer,
        header_split,
        zone_split,
        footer_split,
    })
}

/// Peaks of the smoothed profile whose intensity lies in the separator band,
/// sorted by row.
pub fn find_separator_peaks(smoothed: &[f32], config: &SegmenterConfig) -> Vec<usize> {
    let (low, high) = config.separator_band;
    let mut peaks: Vec<usize> = find_peaks(smoothed, config.min_peak_distance, config.min_prominence)
        .into_iter()
        .filter(|&p| smoothed[p] >= low && smoothed[p] <= high)
        .collect();
    peaks.sort_unstable();
    peaks
}

/// Locates the boundary above the footer.
///
/// Looks at the lower third of the profile only and returns the first row
/// whose absolute gradient exceeds two standard deviations of the gradients
/// in that slice. Rows at or above `zone_split` are skipped. Without such a
/// row the last separator peak is used, provided it lies below `zone_split`.
pub fn find_footer_split(
    smoothed: &[f32],
    zone_split: usize,
    last_peak: Option<usize>,
) -> Option<usize> {
    let start = smoothed.len() * 2 / 3;
    let slice = &smoothed[start..];
    let grad = gradient(slice);
    let limit = 2.0 * std_dev(&grad);

    let from_gradient = grad
        .iter()
        .enumerate()
        .map(|(i, g)| (start + i, g.abs()))
        .find(|&(row, g)| row > zone_split && g > limit)
        .map(|(row, _)| row);

    if let Some(row) = from_gradient {
        debug!("Footer boundary from gradient at row {} (limit {:.2})", row, limit);
        return Some(row);
    }

    warn!("No significant gradient in lower third, falling back to last separator peak");
    last_peak.filter(|&p| p > zone_split)
}

/// Rows `[top, bottom)` of the image, full width.
fn crop_rows(img: &RgbaImage, top: u32, bottom: u32) -> RgbaImage {
    imageops::crop_imm(img, 0, top, img.width(), bottom.saturating_sub(top)).to_image()
}

/// Splits the hints band into the text area and the arrow column.
///
/// Removes the left margin, then the arrow strip, then the right margin that
/// carries the status icons.
fn split_hints_band(band: &RgbaImage, config: &SegmenterConfig) -> Result<(RgbaImage, RgbaImage)> {
    let (width, height) = band.dimensions();
    let fraction = |f: f64| (width as f64 * f).round() as u32;

    let left = fraction(config.hints_left_margin);
    let strip = fraction(config.glyph_column_width);
    let right = fraction(config.hints_right_margin);

    let text_start = left + strip;
    let text_end = width.saturating_sub(right);
    if text_start >= text_end {
        return Err(HuntError::Segmentation(format!(
            "hint margins leave no text area in a {} px wide band",
            width
        )));
    }

    let glyph_column = imageops::crop_imm(band, left, 0, strip, height).to_image();
    let hints = imageops::crop_imm(band, text_start, 0, text_end - text_start, height).to_image();

    Ok((hints, glyph_column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    /// Builds a panel with 5-row separators at intensity 45 centred on
    /// `separators`, and an optional bright footer block from `footer_from`.
    fn panel(height: u32, separators: &[u32], footer_from: Option<u32>) -> RgbaImage {
        ImageBuffer::from_fn(200, height, |_, y| {
            if separators.iter().any(|&c| y + 2 >= c && y <= c + 2) {
                Rgba([45, 45, 45, 255])
            } else if footer_from.is_some_and(|f| y >= f) {
                Rgba([200, 200, 200, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn test_three_separators() {
        let img = panel(300, &[50, 120, 190], Some(250));
        let regions = segment_screenshot(&img, &SegmenterConfig::default()).unwrap();

        assert_eq!(regions.header_split, 130);
        assert_eq!(regions.zone_split, 200);
        assert_eq!(regions.footer_split, 258);

        assert_eq!(regions.header.dimensions(), (200, 130));
        assert_eq!(regions.zone.dimensions(), (200, 70));
        assert_eq!(regions.footer.dimensions(), (200, 42));
        // 200 - 5 (margin) - 20 (arrows) - 76 (status icons)
        assert_eq!(regions.hints.dimensions(), (99, 58));
        assert_eq!(regions.glyph_column.dimensions(), (20, 58));
    }

    #[test]
    fn test_single_separator_fails() {
        let img = panel(300, &[120], Some(250));
        let result = segment_screenshot(&img, &SegmenterConfig::default());
        assert!(matches!(result, Err(HuntError::Segmentation(_))));
    }

    #[test]
    fn test_two_separators_use_both() {
        let img = panel(300, &[60, 120], Some(250));
        let regions = segment_screenshot(&img, &SegmenterConfig::default()).unwrap();
        assert_eq!(regions.header_split, 70);
        assert_eq!(regions.zone_split, 130);
        assert_eq!(regions.footer_split, 258);
    }

    #[test]
    fn test_separator_outside_band_ignored() {
        // Bright rows (intensity 120) are text, not separators
        let mut img = panel(300, &[50, 120, 190], Some(250));
        for y in 88..93 {
            for x in 0..200 {
                img.put_pixel(x, y, Rgba([120, 120, 120, 255]));
            }
        }
        let regions = segment_screenshot(&img, &SegmenterConfig::default()).unwrap();
        assert_eq!(regions.header_split, 130);
        assert_eq!(regions.zone_split, 200);
    }

    #[test]
    fn test_footer_falls_back_to_last_peak() {
        // Flat lower third: no gradient above 2 sigma
        let img = panel(300, &[50, 100, 150, 185], None);
        let regions = segment_screenshot(&img, &SegmenterConfig::default()).unwrap();
        assert_eq!(regions.header_split, 110);
        assert_eq!(regions.zone_split, 160);
        assert_eq!(regions.footer_split, 195);
    }

    #[test]
    fn test_footer_fallback_on_zone_split_fails() {
        // Last peak is the zone boundary itself: no footer can be placed
        let img = panel(300, &[50, 120, 190], None);
        let result = segment_screenshot(&img, &SegmenterConfig::default());
        assert!(matches!(result, Err(HuntError::Segmentation(_))));
    }

    #[test]
    fn test_find_footer_split_gradient() {
        let mut smoothed = vec![0.0; 90];
        for v in smoothed.iter_mut().skip(75) {
            *v = 100.0;
        }
        assert_eq!(find_footer_split(&smoothed, 40, Some(50)), Some(74));
    }

    #[test]
    fn test_find_footer_split_fallback() {
        let smoothed = vec![0.0; 90];
        assert_eq!(find_footer_split(&smoothed, 40, Some(50)), Some(50));
        assert_eq!(find_footer_split(&smoothed, 40, Some(40)), None);
        assert_eq!(find_footer_split(&smoothed, 40, None), None);
    }
}
