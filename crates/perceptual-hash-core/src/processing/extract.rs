use image::{GrayImage, Luma};

use crate::hash::ImageHash;
use crate::processing::types::{CoefficientMatrix, HASH_BLOCK};

/// Turn the low-frequency corner of a coefficient matrix into a 64-bit hash.
///
/// The top-left 8x8 block is scanned in row-major order. Bit `i` is set when
/// coefficient `i` is strictly greater than the mean of coefficients 1..64;
/// the DC coefficient takes no part in the mean and bit 0 is always clear.
pub fn extract_hash(coefficients: &CoefficientMatrix) -> ImageHash {
    let block = low_frequency_block(coefficients);

    let sum: f64 = block.iter().skip(1).sum();
    let mean = sum / (block.len() - 1) as f64;

    let hash = block
        .iter()
        .enumerate()
        .skip(1)
        .filter(|&(_, &value)| value > mean)
        .fold(0u64, |hash, (bit, _)| hash | 1u64 << bit);

    ImageHash(hash)
}

/// The `HASH_BLOCK`×`HASH_BLOCK` low-frequency coefficients in row-major order
fn low_frequency_block(coefficients: &CoefficientMatrix) -> [f64; HASH_BLOCK * HASH_BLOCK] {
    let side = HASH_BLOCK.min(coefficients.size());
    let mut block = [0.0; HASH_BLOCK * HASH_BLOCK];
    for u in 0..side {
        for v in 0..side {
            block[u * HASH_BLOCK + v] = coefficients.get(u, v);
        }
    }
    block
}

/// Render the hash bits as an 8x8 image: white for 1, black for 0
pub fn render_visualization(hash: &ImageHash) -> GrayImage {
    let side = HASH_BLOCK as u32;
    GrayImage::from_fn(side, side, |x, y| {
        let bit = (y * side + x) as usize;
        if hash.bit(bit) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn matrix(values: impl Fn(usize, usize) -> f64) -> CoefficientMatrix {
        CoefficientMatrix::new(Array2::from_shape_fn((32, 32), |(u, v)| values(u, v))).unwrap()
    }

    #[test]
    fn test_dc_is_ignored() {
        let low_dc = matrix(|u, v| (u * 8 + v) as f64);
        let high_dc = matrix(|u, v| if (u, v) == (0, 0) { 1e9 } else { (u * 8 + v) as f64 });
        assert_eq!(extract_hash(&low_dc), extract_hash(&high_dc));
        assert!(!extract_hash(&high_dc).bit(0));
    }

    #[test]
    fn test_bits_above_mean_are_set() {
        // Coefficients 1..=63 inside the block; mean is 32
        let coefficients = matrix(|u, v| if u < 8 && v < 8 { (u * 8 + v) as f64 } else { -1e6 });
        let hash = extract_hash(&coefficients);
        for bit in 1..64 {
            assert_eq!(hash.bit(bit), bit > 32, "bit {}", bit);
        }
        assert_eq!(hash.0, !0u64 << 33);
    }

    #[test]
    fn test_values_equal_to_mean_are_clear() {
        let flat = matrix(|_, _| 5.0);
        assert_eq!(extract_hash(&flat), ImageHash(0));
    }

    #[test]
    fn test_only_block_coefficients_matter() {
        let a = matrix(|u, v| if u < 8 && v < 8 { ((u * 7 + v * 3) % 5) as f64 } else { 0.0 });
        let b = matrix(|u, v| if u < 8 && v < 8 { ((u * 7 + v * 3) % 5) as f64 } else { 99.0 });
        assert_eq!(extract_hash(&a), extract_hash(&b));
    }

    #[test]
    fn test_visualization_layout() {
        let hash = ImageHash(1 << 1 | 1 << 8 | 1 << 63);
        let img = render_visualization(&hash);
        assert_eq!(img.dimensions(), (8, 8));
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(1, 0).0[0], 255);
        assert_eq!(img.get_pixel(0, 1).0[0], 255);
        assert_eq!(img.get_pixel(7, 7).0[0], 255);
        assert_eq!(img.pixels().filter(|p| p.0[0] == 255).count(), 3);
    }
}
