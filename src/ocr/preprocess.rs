use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, RgbaImage};
use imageproc::contrast::otsu_level;

use crate::config::{OcrConfig, RelativeRect};

/// Crops a sub-region from an image using relative coordinates.
///
/// Converts the relative rect (0.0–1.0) to absolute pixel coordinates,
/// clamps to image bounds, and returns the cropped sub-image.
pub fn crop_region(img: &RgbaImage, region: &RelativeRect) -> RgbaImage {
    let (w, h) = img.dimensions();

    let x0 = ((region.x * w as f32) as u32).min(w);
    let y0 = ((region.y * h as f32) as u32).min(h);
    let rw = ((region.width * w as f32) as u32).min(w - x0);
    let rh = ((region.height * h as f32) as u32).min(h - y0);

    imageops::crop_imm(img, x0, y0, rw, rh).to_image()
}

/// Prepares a panel section for OCR.
///
/// Upscales by the configured factor (Lanczos3), converts to grayscale and
/// boosts contrast. The game font is small; OCR reads it far more reliably
/// at three times its on-screen size.
pub fn prepare_for_ocr(img: &RgbaImage, config: &OcrConfig) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return DynamicImage::ImageLuma8(GrayImage::new(width, height));
    }

    let factor = config.upscale_factor.max(1);
    let upscaled = imageops::resize(img, width * factor, height * factor, FilterType::Lanczos3);
    let gray = imageops::grayscale(&upscaled);
    let contrasted = imageops::contrast(&gray, config.contrast);

    DynamicImage::ImageLuma8(contrasted)
}

/// Converts a grayscale image to binary using Otsu's threshold.
///
/// Pixels brighter than the threshold become foreground (255), all others
/// background (0). The arrow icons are drawn light on a dark panel.
pub fn binarize(gray: &GrayImage) -> GrayImage {
    threshold_at(gray, otsu_level(gray))
}

/// Binary threshold at a fixed level: `> level` is foreground.
pub fn threshold_at(gray: &GrayImage, level: u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    ImageBuffer::from_fn(width, height, |x, y| {
        if gray.get_pixel(x, y)[0] > level {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_prepare_for_ocr_upscales_to_gray() {
        let img: RgbaImage = ImageBuffer::from_fn(40, 10, |x, _| {
            Rgba([(x * 5) as u8, 0, 0, 255])
        });
        let config = OcrConfig::default();

        let prepared = prepare_for_ocr(&img, &config);

        assert_eq!((prepared.width(), prepared.height()), (120, 30));
        assert!(matches!(prepared, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_prepare_for_ocr_empty_image() {
        let img = RgbaImage::new(0, 10);
        let prepared = prepare_for_ocr(&img, &OcrConfig::default());
        assert_eq!(prepared.width(), 0);
    }

    #[test]
    fn test_crop_region() {
        let img: RgbaImage = ImageBuffer::from_fn(100, 200, |x, y| {
            Rgba([x as u8, y as u8, 0, 255])
        });

        let region = RelativeRect { x: 0.1, y: 0.25, width: 0.5, height: 0.1 };
        let cropped = crop_region(&img, &region);

        assert_eq!(cropped.dimensions(), (50, 20));
        assert_eq!(cropped.get_pixel(0, 0)[0], 10);
        assert_eq!(cropped.get_pixel(0, 0)[1], 50);
    }

    #[test]
    fn test_crop_region_clamps() {
        let img = RgbaImage::new(100, 100);
        let region = RelativeRect { x: 0.9, y: 0.9, width: 0.5, height: 0.5 };
        assert_eq!(crop_region(&img, &region).dimensions(), (10, 10));
    }

    #[test]
    fn test_threshold_at() {
        let gray: GrayImage = ImageBuffer::from_fn(3, 1, |x, _| Luma([[10, 128, 250][x as usize]]));
        let binary = threshold_at(&gray, 128);

        assert_eq!(binary.get_pixel(0, 0)[0], 0, "Dark pixel should be background");
        assert_eq!(binary.get_pixel(1, 0)[0], 0, "Pixel at the level should be background");
        assert_eq!(binary.get_pixel(2, 0)[0], 255, "Bright pixel should be foreground");
    }

    #[test]
    fn test_binarize_two_tone() {
        let gray: GrayImage = ImageBuffer::from_fn(10, 10, |x, _| {
            if x < 5 { Luma([20u8]) } else { Luma([220u8]) }
        });
        let binary = binarize(&gray);

        for (x, _, p) in binary.enumerate_pixels() {
            let expected = if x < 5 { 0 } else { 255 };
            assert_eq!(p[0], expected);
        }
    }
}
