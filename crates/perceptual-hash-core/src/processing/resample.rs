use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};

use crate::processing::types::{PixelGrid, GRID_SIZE};

/// Downscale an image to the fixed 32x32 grid and collapse it to luminance.
///
/// Resizing uses the Catmull-Rom cubic kernel; aspect ratio is discarded.
/// Luminance uses the Rec. 601 weights in 16-bit fixed point, and any alpha
/// channel is flattened by compositing over black.
pub fn resample(img: &DynamicImage) -> GrayImage {
    let side = GRID_SIZE as u32;
    let small = img
        .resize_exact(side, side, FilterType::CatmullRom)
        .to_rgba8();

    GrayImage::from_fn(side, side, |x, y| {
        let [r, g, b, a] = small.get_pixel(x, y).0;
        Luma([flatten_alpha(luminance(r, g, b), a)])
    })
}

/// Lift the 8-bit grayscale image into a floating point grid
pub fn to_pixel_grid(gray: &GrayImage) -> PixelGrid {
    let side = gray.width().min(gray.height()) as usize;
    PixelGrid::from_fn(side, |(row, col)| {
        gray.get_pixel(col as u32, row as u32).0[0] as f64
    })
}

/// Grayscale formula: 0.299*R + 0.587*G + 0.114*B
#[inline]
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = 19595 * r as u32 + 38470 * g as u32 + 7471 * b as u32 + (1 << 15);
    (y >> 16) as u8
}

#[inline]
fn flatten_alpha(luma: u8, alpha: u8) -> u8 {
    if alpha == u8::MAX {
        return luma;
    }
    ((luma as u32 * alpha as u32 + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_luminance_extremes() {
        assert_eq!(luminance(0, 0, 0), 0);
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(255, 0, 0), 76);
        assert_eq!(luminance(0, 255, 0), 150);
        assert_eq!(luminance(0, 0, 255), 29);
    }

    #[test]
    fn test_alpha_flattens_over_black() {
        assert_eq!(flatten_alpha(200, 255), 200);
        assert_eq!(flatten_alpha(200, 0), 0);
        assert_eq!(flatten_alpha(255, 128), 128);
    }

    #[test]
    fn test_output_is_always_grid_sized() {
        for (w, h) in [(1, 1), (7, 300), (640, 480), (32, 32)] {
            let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([10, 20, 30])));
            let gray = resample(&img);
            assert_eq!(gray.dimensions(), (GRID_SIZE as u32, GRID_SIZE as u32));
        }
    }

    #[test]
    fn test_uniform_image_stays_uniform() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 60, Rgb([255, 255, 255])));
        let gray = resample(&img);
        assert!(gray.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_grid_sized_input_is_not_resampled() {
        let img = RgbImage::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 0]));
        let gray = resample(&DynamicImage::ImageRgb8(img.clone()));
        for (x, y, pixel) in img.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            assert_eq!(gray.get_pixel(x, y).0[0], luminance(r, g, b));
        }
    }

    #[test]
    fn test_transparent_image_is_black() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 40, Rgba([255, 255, 255, 0])));
        let gray = resample(&img);
        assert!(gray.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_pixel_grid_rows_are_image_rows() {
        let gray = GrayImage::from_fn(32, 32, |x, y| Luma([(y * 2 + x / 16) as u8]));
        let grid = to_pixel_grid(&gray);
        assert_eq!(grid.size(), GRID_SIZE);
        assert_eq!(grid.get(5, 0), 10.0);
        assert_eq!(grid.get(5, 31), 11.0);
    }
}
