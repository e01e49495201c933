use std::fs;
use std::path::Path;

use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::processing::SourceFormat;
use crate::types::ImageFile;

/// Discover images in the provided directories, sorted by path
pub fn discover_images<P: AsRef<Path>>(
    directories: &[P],
    config: &Config,
) -> Result<Vec<ImageFile>> {
    let mut image_files = Vec::new();
    for dir in directories {
        image_files.extend(discover_images_in_directory(dir.as_ref(), config)?);
    }

    image_files.sort_by(|a, b| a.path.cmp(&b.path));
    image_files.dedup_by(|a, b| a.path == b.path);
    Ok(image_files)
}

/// Discover images in a single directory
fn discover_images_in_directory(directory: &Path, config: &Config) -> Result<Vec<ImageFile>> {
    // Check if directory exists
    if !directory.exists() {
        return Err(Error::FileNotFound(directory.to_path_buf()));
    }

    // Determine max depth for directory traversal
    let max_depth = config.max_depth.unwrap_or(usize::MAX);

    let mut image_files = Vec::new();

    for entry in WalkDir::new(directory)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable directory entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();

        let Some(format) = get_image_format(path) else {
            continue;
        };

        match fs::metadata(path) {
            Ok(metadata) => image_files.push(ImageFile {
                path: path.to_path_buf(),
                size: metadata.len(),
                format,
            }),
            Err(e) => {
                // Log error but continue with other files
                warn!("Error reading metadata for {}: {}", path.display(), e);
            }
        }
    }

    debug!(
        "Found {} candidate images in {}",
        image_files.len(),
        directory.display()
    );
    Ok(image_files)
}

/// Get image format from file extension
fn get_image_format(path: &Path) -> Option<SourceFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(SourceFormat::from_extension)
}

// -- Tests --
