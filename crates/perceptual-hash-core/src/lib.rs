//! Perceptual image hashing.
//!
//! This library computes 64-bit DCT fingerprints for PNG and JPEG images such
//! that visually similar images end up a small Hamming distance apart:
//! - Image decoding, normalization and the frequency transform
//! - Hash extraction and the bit-level comparator
//! - Directory discovery and parallel batch hashing
//! - Result files and accuracy reporting
//!
//! ```no_run
//! use perceptual_hash_core::{compare_hashes, compute_hash};
//!
//! let a = compute_hash("images/cat_1.png", None)?;
//! let b = compute_hash("images/cat_2.jpg", None)?;
//! println!("distance: {}", compare_hashes(&a, &b)?);
//! # Ok::<(), perceptual_hash_core::Error>(())
//! ```

// -- External Dependencies --

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;

// -- Standard Library --
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::*;
pub use error::{Error, Result};
pub use hash::{compare_hashes, ImageHash, HASH_BITS, HASH_HEX_LEN};
pub use processing::{
    DebugConfig, DirectDct, FrequencyTransform, PerceptualHasher, SeparableDct, SourceFormat,
    TransformKind,
};
pub use records::{read_records, write_records};
pub use report::{find_similar, ConfusionMatrix, SimilarMatch};
pub use types::*;

// -- Public Modules --
pub mod config;
pub mod discovery;
pub mod hash;
pub mod logging;
pub mod processing;
pub mod records;
pub mod report;
pub mod types;

/// Hash the image at `path` and return its 16-character hex rendering.
///
/// Debug images are written when `debug` is present and enabled.
pub fn compute_hash<P: AsRef<Path>>(path: P, debug: Option<&DebugConfig>) -> Result<String> {
    PerceptualHasher::new()
        .hash_path(path, debug)
        .map(|hash| hash.to_hex())
}

/// Hash an encoded PNG or JPEG held in memory
pub fn compute_hash_from_bytes(bytes: &[u8], debug: Option<&DebugConfig>) -> Result<String> {
    PerceptualHasher::new()
        .hash_bytes(bytes, debug)
        .map(|hash| hash.to_hex())
}

/// Records produced by a scan, in path order, and how the scan went
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub records: Vec<HashRecord>,
    pub summary: ScanSummary,
}

/// Main entry point for hashing whole directories
pub struct Scanner {
    config: Config,
    hasher: PerceptualHasher,
}

impl Scanner {
    /// Create a new Scanner with the provided configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let hasher = PerceptualHasher::new().with_transform_kind(config.transform);
        Ok(Self { config, hasher })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn hasher(&self) -> &PerceptualHasher {
        &self.hasher
    }

    /// Discover all images in the provided directories
    pub fn discover_images(&self, directories: &[impl AsRef<Path>]) -> Result<Vec<ImageFile>> {
        discovery::discover_images(directories, &self.config)
    }

    /// Discover and hash every image below `directories`
    pub fn run(&self, directories: &[impl AsRef<Path>]) -> Result<ScanResult> {
        info!("Discovering images...");
        let images = self.discover_images(directories)?;
        info!("Found {} images", images.len());

        self.hash_images(&images)
    }

    /// Hash `image_files` in parallel.
    ///
    /// Files that fail are logged and left out of the records; only failures
    /// that affect the whole run (thread pool, debug root) are returned.
    pub fn hash_images(&self, image_files: &[ImageFile]) -> Result<ScanResult> {
        let total_images = image_files.len();
        let start_time = Instant::now();

        let debug_configs: Vec<Option<DebugConfig>> = if self.config.debug {
            fs::create_dir_all(&self.config.debug_dir)?;
            DebugConfig::for_images(
                &self.config.debug_dir,
                image_files.iter().map(|f| f.path.as_path()),
            )
            .into_iter()
            .map(Some)
            .collect()
        } else {
            vec![None; total_images]
        };

        let progress_bar = self.progress_bar(total_images);
        let failure_count = AtomicUsize::new(0);

        let num_threads = if self.config.threads == 0 {
            num_cpus::get()
        } else {
            self.config.threads
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build thread pool: {}", e)))?;
        debug!("Hashing on {} threads", num_threads);

        let records: Vec<HashRecord> = pool.install(|| {
            image_files
                .par_iter()
                .zip(debug_configs.par_iter())
                .filter_map(|(image, debug)| {
                    let result = self.hash_one(image, debug.as_ref());
                    progress_bar.inc(1);
                    match result {
                        Ok(record) => Some(record),
                        Err(e) => {
                            logging::log_hash_error(&image.path, &e);
                            failure_count.fetch_add(1, Ordering::Relaxed);
                            None
                        }
                    }
                })
                .collect()
        });

        let elapsed_secs = start_time.elapsed().as_secs_f64();
        let ips = if elapsed_secs > 0.0 {
            total_images as f64 / elapsed_secs
        } else {
            0.0
        };
        progress_bar.finish_with_message(format!("Completed! Processed at {:.1} images/sec", ips));

        let summary = ScanSummary {
            discovered: total_images,
            hashed: records.len(),
            failed: failure_count.load(Ordering::Relaxed),
            total_bytes: image_files.iter().map(|f| f.size).sum(),
        };
        info!(
            "Hashed {} of {} images ({} failed, {} bytes read)",
            summary.hashed, summary.discovered, summary.failed, summary.total_bytes
        );

        Ok(ScanResult { records, summary })
    }

    fn hash_one(&self, image: &ImageFile, debug: Option<&DebugConfig>) -> Result<HashRecord> {
        if let Some(target) = debug.and_then(|d| d.preprocessed_image_path.parent()) {
            if !target.exists() {
                fs::create_dir_all(target).map_err(|e| {
                    logging::log_file_error(target, "create_dir", &e);
                    Error::Io(e)
                })?;
                logging::log_fs_modification("create_dir", target, None);
            }
        }

        let (img, format) = processing::decode_path(&image.path)?;
        if format != image.format {
            debug!(
                "{} is named like {:?} but contains {:?}",
                image.path.display(),
                image.format,
                format
            );
        }

        let hash = self.hasher.hash_image(&img, format, debug)?;
        Ok(HashRecord::new(image.path.clone(), hash))
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{eta}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
        {
            progress_bar.set_style(style.progress_chars("##-"));
        }
        progress_bar.set_message("Computing image hashes...");
        progress_bar
    }
}
