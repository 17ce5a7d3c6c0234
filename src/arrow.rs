//! Arrow direction classification from raw pixels.
//!
//! Each hint line starts with an arrow glyph pointing to where the next
//! clue lies. Glyphs are isolated as connected components of the binarized
//! glyph column and classified by where their pixel mass sits: an arrow's
//! head is heavier than its tail.

use image::{imageops, GrayImage, ImageBuffer, Luma, RgbaImage};
use imageproc::region_labelling::{connected_components, Connectivity};
use tracing::debug;

use crate::model::{Direction, HintEntry};
use crate::ocr::binarize;

/// Smallest intensity range of a glyph column that can hold an arrow.
const MIN_GLYPH_CONTRAST: u8 = 32;

/// Bounding box of a glyph within the glyph column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A connected component large enough to be an arrow.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub bounds: GlyphBounds,
    /// Binary mask cropped to `bounds`, holding only this component's pixels
    pub mask: GrayImage,
    /// Position top to bottom (0-based)
    pub rank: usize,
}

/// Finds arrow glyphs in a binary image (foreground = non-zero).
///
/// Components smaller than `min_size` on either axis are discarded as
/// noise, and so is a component covering the whole image. The rest are
/// ordered by their top edge and ranked.
pub fn extract_glyphs(binary: &GrayImage, min_size: u32) -> Vec<Glyph> {
    let labels = connected_components(binary, Connectivity::Eight, Luma([0u8]));

    // (min_x, min_y, max_x, max_y) per label; label 0 is background
    let mut extents: Vec<Option<(u32, u32, u32, u32)>> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label[0] as usize;
        if label == 0 {
            continue;
        }
        if extents.len() <= label {
            extents.resize(label + 1, None);
        }
        extents[label] = Some(match extents[label] {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    let mut glyphs: Vec<(u32, Glyph)> = Vec::new();
    for (label, extent) in extents.iter().enumerate() {
        let Some((x0, y0, x1, y1)) = *extent else {
            continue;
        };
        let bounds = GlyphBounds {
            x: x0,
            y: y0,
            width: x1 - x0 + 1,
            height: y1 - y0 + 1,
        };
        if bounds.width < min_size || bounds.height < min_size {
            continue;
        }
        if (bounds.width, bounds.height) == binary.dimensions() {
            continue;
        }

        let label = label as u32;
        let mask = ImageBuffer::from_fn(bounds.width, bounds.height, |x, y| {
            if labels.get_pixel(bounds.x + x, bounds.y + y)[0] == label {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        glyphs.push((label, Glyph { bounds, mask, rank: 0 }));
    }

    glyphs.sort_by_key(|(label, glyph)| (glyph.bounds.y, *label));
    glyphs
        .into_iter()
        .enumerate()
        .map(|(rank, (_, mut glyph))| {
            glyph.rank = rank;
            glyph
        })
        .collect()
}

/// Classifies a single glyph mask.
///
/// Wider than tall: horizontal, compare left and right halves (West when
/// the left is heavier, otherwise East). Otherwise vertical, compare top
/// and bottom halves (North when the top is heavier, otherwise South).
/// The middle column or row of an odd dimension belongs to neither half.
pub fn classify_mask(mask: &GrayImage) -> Direction {
    let (width, height) = mask.dimensions();

    if width > height {
        let half = width / 2;
        let (mut left, mut right) = (0u32, 0u32);
        for (x, _, p) in mask.enumerate_pixels() {
            if p[0] == 0 {
                continue;
            }
            if x < half {
                left += 1;
            } else if x >= width - half {
                right += 1;
            }
        }
        if left > right { Direction::West } else { Direction::East }
    } else {
        let half = height / 2;
        let (mut top, mut bottom) = (0u32, 0u32);
        for (_, y, p) in mask.enumerate_pixels() {
            if p[0] == 0 {
                continue;
            }
            if y < half {
                top += 1;
            } else if y >= height - half {
                bottom += 1;
            }
        }
        if top > bottom { Direction::North } else { Direction::South }
    }
}

/// Binarizes the glyph column and classifies every glyph, top to bottom.
///
/// A column without enough contrast to separate glyphs from background
/// yields no directions.
pub fn classify_glyphs(column: &RgbaImage, min_size: u32) -> Vec<Direction> {
    let gray = imageops::grayscale(column);
    let (low, high) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(low, high), p| (low.min(p[0]), high.max(p[0])));
    if high.saturating_sub(low) < MIN_GLYPH_CONTRAST {
        debug!("Glyph column intensity range {}..={} too flat for arrows", low, high);
        return Vec::new();
    }

    let binary = binarize(&gray);
    let directions: Vec<Direction> = extract_glyphs(&binary, min_size)
        .iter()
        .map(|glyph| classify_mask(&glyph.mask))
        .collect();
    debug!("Classified {} arrow glyphs: {:?}", directions.len(), directions);
    directions
}

/// Sets each hint's direction from the glyph of the same rank.
///
/// Hints without a corresponding glyph keep `None`; surplus glyphs are
/// ignored.
pub fn assign_directions(hints: &mut [HintEntry], directions: &[Direction]) {
    if hints.len() != directions.len() {
        debug!(
            "{} hints but {} arrow glyphs; unmatched entries stay unset",
            hints.len(),
            directions.len()
        );
    }
    for hint in hints.iter_mut() {
        hint.direction = directions.get(hint.order).copied();
    }
}
