//! The 64-bit perceptual hash value and the Hamming-distance comparator.
//!
//! A hash is rendered canonically as 16 lowercase, zero-padded hex digits.
//! Distances are always counted at bit level: two hex digits that differ
//! contribute the number of bits by which their nibbles differ, not 1.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Width of every hash produced by the pipeline, in bits
pub const HASH_BITS: u32 = 64;

/// Length of the canonical hex rendering
pub const HASH_HEX_LEN: usize = (HASH_BITS / 4) as usize;

/// A perceptual hash represented as a 64-bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ImageHash(pub u64);

impl ImageHash {
    /// Calculate the Hamming distance between two perceptual hashes
    pub fn distance(&self, other: &ImageHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Check if two images are perceptually similar based on a threshold
    pub fn is_similar(&self, other: &ImageHash, threshold: u32) -> bool {
        self.distance(other) <= threshold
    }

    /// Read bit `index` (0 = least significant)
    pub fn bit(&self, index: usize) -> bool {
        index < HASH_BITS as usize && (self.0 >> index) & 1 == 1
    }

    /// Get the underlying 64-bit value
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Canonical 16-character lowercase hex string
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ImageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Same zero-padded digits as `Display`; `{:#x}` adds the `0x` prefix
impl fmt::LowerHex for ImageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:#018x}", self.0)
        } else {
            write!(f, "{:016x}", self.0)
        }
    }
}

impl FromStr for ImageHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != HASH_HEX_LEN {
            return Err(Error::InvalidHash(format!(
                "expected {} hex characters, got {}",
                HASH_HEX_LEN,
                s.len()
            )));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidHash(format!("not hexadecimal: {:?}", s)));
        }
        u64::from_str_radix(s, 16)
            .map(ImageHash)
            .map_err(|e| Error::InvalidHash(format!("{:?}: {}", s, e)))
    }
}

impl From<u64> for ImageHash {
    fn from(value: u64) -> Self {
        ImageHash(value)
    }
}

/// Compare two hex-encoded hashes and return the number of differing bits.
///
/// Both strings must have the same length; any length is accepted as long as
/// every character is a hex digit.
pub fn compare_hashes(hash_a: &str, hash_b: &str) -> Result<u32> {
    if hash_a.len() != hash_b.len() {
        return Err(Error::LengthMismatch {
            left: hash_a.len(),
            right: hash_b.len(),
        });
    }

    hash_a
        .chars()
        .zip(hash_b.chars())
        .try_fold(0u32, |distance, (a, b)| {
            let a = nibble(a, hash_a)?;
            let b = nibble(b, hash_b)?;
            Ok(distance + (a ^ b).count_ones())
        })
}

fn nibble(c: char, whole: &str) -> Result<u32> {
    c.to_digit(16)
        .ok_or_else(|| Error::InvalidHash(format!("non-hex character {:?} in {:?}", c, whole)))
}
