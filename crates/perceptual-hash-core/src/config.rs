use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::HASH_BITS;
use crate::processing::transform::TransformKind;

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Map onto the `log` crate's filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Configuration for a hashing run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum Hamming distance at which two images count as similar
    pub similarity_threshold: u32,

    /// Which 2-D DCT implementation to use
    pub transform: TransformKind,

    /// Maximum directory depth for scanning
    pub max_depth: Option<usize>,

    /// Number of threads to use for processing (0 = auto)
    pub threads: usize,

    /// Where the `path,hash` lines are written
    pub output_path: PathBuf,

    /// Whether to export the preprocessed and bit-visualization images
    pub debug: bool,

    /// Root directory for per-image debug output
    pub debug_dir: PathBuf,

    /// Whether to draw a progress bar while hashing
    pub show_progress: bool,

    /// Log level
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            similarity_threshold: 10,
            transform: TransformKind::Direct,
            max_depth: None,
            threads: 0, // Auto
            output_path: PathBuf::from("hashes.txt"),
            debug: false,
            debug_dir: PathBuf::from("debug"),
            show_progress: true,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.similarity_threshold > HASH_BITS {
            return Err(Error::Configuration(format!(
                "Similarity threshold must be between 0 and {}",
                HASH_BITS
            )));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(Error::Configuration(
                "Output path must not be empty".to_string(),
            ));
        }

        if self.debug && self.debug_dir.as_os_str().is_empty() {
            return Err(Error::Configuration(
                "Debug directory must be specified if debug output is enabled".to_string(),
            ));
        }

        Ok(())
    }
}
