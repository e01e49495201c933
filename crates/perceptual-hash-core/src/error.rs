use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the perceptual-hash library
#[derive(Error, Debug)]
pub enum Error {
    /// The image resource could not be opened or read
    #[error("Unreadable source {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes do not parse as a valid image
    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    /// The image encoding is outside the PNG/JPEG allow-list
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// A debug image could not be written
    #[error("Failed to write debug image {path}: {source}")]
    DebugWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Two hashes of different width were compared
    #[error("Hash length mismatch: {left} vs {right} characters")]
    LengthMismatch { left: usize, right: usize },

    /// A hash string is not valid hexadecimal of the expected width
    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    /// A grid or coefficient matrix with the wrong shape
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// File not found error
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
