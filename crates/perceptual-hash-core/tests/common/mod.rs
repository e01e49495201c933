//! Synthetic fixtures for the integration tests.
//!
//! Every image is generated on the fly and written into a temporary
//! directory, so no binary fixtures live in the repository.
#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageOutputFormat, Luma, Rgb, RgbImage};

/// Smooth gradient pattern, sampled at any resolution
pub fn waves(width: u32, height: u32) -> DynamicImage {
    let sx = 256.0 / width as f64;
    let sy = 256.0 / height as f64;
    let img = image::GrayImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as f64 * sx, y as f64 * sy);
        let v = 128.0 + 60.0 * (x / 40.0).sin() + 60.0 * (y / 25.0).cos();
        Luma([v.round().clamp(0.0, 255.0) as u8])
    });
    DynamicImage::ImageLuma8(img)
}

/// Bright disc in the upper right over a diagonal ramp
pub fn disc() -> DynamicImage {
    let img = RgbImage::from_fn(256, 256, |x, y| {
        let (dx, dy) = (x as f64 - 180.0, y as f64 - 60.0);
        let v = if dx * dx + dy * dy < 50.0 * 50.0 {
            255
        } else {
            ((x + y) / 2) as u8
        };
        Rgb([v, v, v])
    });
    DynamicImage::ImageRgb8(img)
}

/// White and black squares of `cell` pixels, white in the top-left corner
pub fn checkerboard(cell: u32) -> DynamicImage {
    let img = image::GrayImage::from_fn(256, 256, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            Luma([255])
        } else {
            Luma([0])
        }
    });
    DynamicImage::ImageLuma8(img)
}

pub fn uniform(value: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(image::GrayImage::from_pixel(64, 64, Luma([value])))
}

/// The 32x32 color pattern whose hash is pinned in the regression tests
pub fn reference_pattern() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(32, 32, |x, y| {
        Rgb([
            ((x * y) % 256) as u8,
            ((x * x + y) % 256) as u8,
            (255 - x * 8) as u8,
        ])
    }))
}

/// Encode `img` in memory
pub fn encode(img: &DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// Encode `img` and write it to `dir/name`
pub fn write_image(
    dir: &Path,
    name: &str,
    img: &DynamicImage,
    format: ImageOutputFormat,
) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, encode(img, format)).unwrap();
    path
}

pub fn png(img: &DynamicImage) -> Vec<u8> {
    encode(img, ImageOutputFormat::Png)
}

pub fn jpeg(img: &DynamicImage, quality: u8) -> Vec<u8> {
    encode(img, ImageOutputFormat::Jpeg(quality))
}

/// First half of a valid PNG
pub fn truncated_png(img: &DynamicImage) -> Vec<u8> {
    let mut bytes = png(img);
    bytes.truncate(bytes.len() / 2);
    bytes
}
