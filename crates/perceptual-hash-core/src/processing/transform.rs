//! # 2-D Discrete Cosine Transform
//!
//! Type-II DCT over an N×N luminance grid:
//!
//! ```text
//! F(u, v) = 0.25 · c(u) · c(v) · Σx Σy f(x, y) · cos((2x+1)uπ / 2N) · cos((2y+1)vπ / 2N)
//! c(0) = 1/√2, c(k) = 1 otherwise
//! ```
//!
//! `x`/`u` run over rows and `y`/`v` over columns. Two implementations are
//! provided behind [`FrequencyTransform`]:
//!
//! - [`DirectDct`]: evaluates the formula as written, O(N⁴). About a million
//!   multiply-adds at N = 32. This is the reference.
//! - [`SeparableDct`]: 1-D DCT-II over every row and then every column using
//!   `rustdct`. Same output within floating point tolerance.

use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::sync::Arc;

use ndarray::Array2;
use rustdct::{Dct2, DctPlanner};
use serde::{Deserialize, Serialize};

use crate::processing::types::{CoefficientMatrix, PixelGrid};

/// Overall scale applied to every coefficient
pub const DCT_SCALE: f64 = 0.25;

/// A 2-D orthogonal transform from a pixel grid to frequency coefficients
pub trait FrequencyTransform: Send + Sync {
    /// Transform an N×N grid into an N×N coefficient matrix
    fn forward(&self, grid: &PixelGrid) -> CoefficientMatrix;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Selects a [`FrequencyTransform`] implementation from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    #[default]
    Direct,
    Separable,
}

impl TransformKind {
    pub fn build(self) -> Arc<dyn FrequencyTransform> {
        match self {
            TransformKind::Direct => Arc::new(DirectDct),
            TransformKind::Separable => Arc::new(SeparableDct),
        }
    }
}

impl std::str::FromStr for TransformKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(TransformKind::Direct),
            "separable" => Ok(TransformKind::Separable),
            other => Err(format!(
                "unknown transform '{}', expected 'direct' or 'separable'",
                other
            )),
        }
    }
}

#[inline]
fn normalization(k: usize) -> f64 {
    if k == 0 {
        FRAC_1_SQRT_2
    } else {
        1.0
    }
}

/// Direct evaluation of the 2-D DCT-II
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectDct;

impl FrequencyTransform for DirectDct {
    fn forward(&self, grid: &PixelGrid) -> CoefficientMatrix {
        let n = grid.size();
        let samples = grid.view();
        let denominator = 2.0 * n as f64;

        let mut out = Array2::<f64>::zeros((n, n));
        for u in 0..n {
            for v in 0..n {
                let mut sum = 0.0;
                for x in 0..n {
                    for y in 0..n {
                        sum += samples[[x, y]]
                            * ((2 * x + 1) as f64 * u as f64 * PI / denominator).cos()
                            * ((2 * y + 1) as f64 * v as f64 * PI / denominator).cos();
                    }
                }
                out[[u, v]] = DCT_SCALE * normalization(u) * normalization(v) * sum;
            }
        }

        CoefficientMatrix::from_square(out)
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

/// Row-column DCT-II built on `rustdct`
#[derive(Debug, Clone, Copy, Default)]
pub struct SeparableDct;

impl FrequencyTransform for SeparableDct {
    fn forward(&self, grid: &PixelGrid) -> CoefficientMatrix {
        let n = grid.size();
        let mut planner = DctPlanner::<f64>::new();
        let dct = planner.plan_dct2(n);

        let mut out = grid.view().to_owned();
        let mut buffer = vec![0.0f64; n];

        // Rows: transform along y, producing frequency v
        for mut row in out.rows_mut() {
            buffer.iter_mut().zip(row.iter()).for_each(|(b, s)| *b = *s);
            dct.process_dct2(&mut buffer);
            row.iter_mut().zip(buffer.iter()).for_each(|(s, b)| *s = *b);
        }

        // Columns: transform along x, producing frequency u
        for mut column in out.columns_mut() {
            buffer.iter_mut().zip(column.iter()).for_each(|(b, s)| *b = *s);
            dct.process_dct2(&mut buffer);
            column.iter_mut().zip(buffer.iter()).for_each(|(s, b)| *s = *b);
        }

        out.indexed_iter_mut()
            .for_each(|((u, v), c)| *c *= DCT_SCALE * normalization(u) * normalization(v));

        CoefficientMatrix::from_square(out)
    }

    fn name(&self) -> &'static str {
        "separable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured_grid(n: usize) -> PixelGrid {
        PixelGrid::from_fn(n, |(row, col)| {
            let r = row as f64;
            let c = col as f64;
            127.5
                + 60.0 * (r / 3.0).sin()
                + 40.0 * (c / 5.0 + r / 7.0).cos()
                + (row * col % 11) as f64
        })
    }

    #[test]
    fn test_constant_grid_has_only_dc() {
        let grid = PixelGrid::from_fn(8, |_| 100.0);
        let coefficients = DirectDct.forward(&grid);

        // 0.25 * 1/2 * sum(100 over 64 samples)
        assert!((coefficients.dc() - 800.0).abs() < 1e-9);
        for u in 0..8 {
            for v in 0..8 {
                if (u, v) != (0, 0) {
                    assert!(coefficients.get(u, v).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_dc_tracks_mean_intensity() {
        let n = 32;
        let grid = textured_grid(n);
        let mean = grid.view().sum() / (n * n) as f64;
        let coefficients = DirectDct.forward(&grid);
        assert!((coefficients.dc() - DCT_SCALE * 0.5 * mean * (n * n) as f64).abs() < 1e-6);
    }

    #[test]
    fn test_single_cosine_lands_in_one_coefficient() {
        let n = 16;
        let grid = PixelGrid::from_fn(n, |(row, _)| {
            ((2 * row + 1) as f64 * 3.0 * PI / (2.0 * n as f64)).cos()
        });
        let coefficients = DirectDct.forward(&grid);
        let (mut best, mut best_value) = ((0, 0), 0.0f64);
        for u in 0..n {
            for v in 0..n {
                if coefficients.get(u, v).abs() > best_value.abs() {
                    best = (u, v);
                    best_value = coefficients.get(u, v);
                }
            }
        }
        assert_eq!(best, (3, 0));
    }

    #[test]
    fn test_separable_matches_direct() {
        for n in [8, 32] {
            let grid = textured_grid(n);
            let direct = DirectDct.forward(&grid);
            let separable = SeparableDct.forward(&grid);
            assert_eq!(separable.size(), n);
            for u in 0..n {
                for v in 0..n {
                    let diff = (direct.get(u, v) - separable.get(u, v)).abs();
                    assert!(diff < 1e-6, "({}, {}) differs by {}", u, v, diff);
                }
            }
        }
    }

    #[test]
    fn test_transform_kind_parsing() {
        assert_eq!("direct".parse::<TransformKind>(), Ok(TransformKind::Direct));
        assert_eq!(
            "Separable".parse::<TransformKind>(),
            Ok(TransformKind::Separable)
        );
        assert!("fft".parse::<TransformKind>().is_err());
        assert_eq!(TransformKind::Separable.build().name(), "separable");
    }
}
