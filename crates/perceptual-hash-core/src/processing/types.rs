//! Grid, coefficient and format types shared by the pipeline stages

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Side length of the luminance grid the resampler produces
pub const GRID_SIZE: usize = 32;

/// Side length of the low-frequency block the hash bits are drawn from
pub const HASH_BLOCK: usize = 8;

/// Source encodings the pipeline accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    Png,
    Jpeg,
}

impl SourceFormat {
    /// Map a detected `image` format onto the allow-list
    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Determine format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

/// Square grid of luminance samples on the 0-255 scale
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid(Array2<f64>);

impl PixelGrid {
    /// Wrap a square array of samples
    pub fn new(samples: Array2<f64>) -> Result<Self> {
        ensure_square(&samples)?;
        Ok(Self(samples))
    }

    /// Build an `n`×`n` grid from a function of `(row, col)`
    pub fn from_fn(n: usize, f: impl FnMut((usize, usize)) -> f64) -> Self {
        Self(Array2::from_shape_fn((n, n), f))
    }

    pub fn size(&self) -> usize {
        self.0.nrows()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[[row, col]]
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.0.view()
    }
}

/// Square matrix of DCT coefficients; `[0][0]` is the DC term
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientMatrix(Array2<f64>);

impl CoefficientMatrix {
    pub fn new(coefficients: Array2<f64>) -> Result<Self> {
        ensure_square(&coefficients)?;
        Ok(Self(coefficients))
    }

    /// For transforms, whose output has the shape of a `PixelGrid` input
    pub(crate) fn from_square(coefficients: Array2<f64>) -> Self {
        debug_assert_eq!(coefficients.nrows(), coefficients.ncols());
        Self(coefficients)
    }

    pub fn size(&self) -> usize {
        self.0.nrows()
    }

    pub fn get(&self, u: usize, v: usize) -> f64 {
        self.0[[u, v]]
    }

    /// The DC (average-intensity) coefficient
    pub fn dc(&self) -> f64 {
        self.0[[0, 0]]
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.0.view()
    }
}

fn ensure_square(array: &Array2<f64>) -> Result<()> {
    let (rows, cols) = array.dim();
    if rows != cols || rows == 0 {
        return Err(Error::InvalidGrid(format!(
            "expected a non-empty square grid, got {}x{}",
            rows, cols
        )));
    }
    Ok(())
}
