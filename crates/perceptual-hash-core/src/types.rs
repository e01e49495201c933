use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::hash::ImageHash;
use crate::processing::SourceFormat;

/// Representation of a candidate image file found on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Full path to the image file
    pub path: PathBuf,

    /// File size in bytes
    pub size: u64,

    /// Format implied by the file extension
    pub format: SourceFormat,
}

/// One hashed image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRecord {
    /// Path the image was read from
    pub path: PathBuf,

    /// Perceptual hash of the image
    pub hash: ImageHash,
}

impl HashRecord {
    pub fn new(path: impl Into<PathBuf>, hash: ImageHash) -> Self {
        Self {
            path: path.into(),
            hash,
        }
    }
}

/// Renders the `path,hash` line written to result files and stdout
impl fmt::Display for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.path.display(), self.hash)
    }
}

/// Outcome counts of a directory scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Files handed to the hasher
    pub discovered: usize,

    /// Files hashed successfully
    pub hashed: usize,

    /// Files skipped because hashing failed
    pub failed: usize,

    /// Combined size of the discovered files
    pub total_bytes: u64,
}
