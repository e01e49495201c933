use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, GrayImage, ImageEncoder, ImageError};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::processing::types::SourceFormat;

/// Where to export intermediate images for one hash computation.
///
/// Nothing is written unless `debug` is set; the paths are ignored otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugConfig {
    pub debug: bool,

    /// Destination of the normalized 32x32 grayscale image
    pub preprocessed_image_path: PathBuf,

    /// Destination of the 8x8 bit-visualization image
    pub visualized_image_path: PathBuf,
}

impl DebugConfig {
    /// Enabled debug output with explicit paths
    pub fn new(
        preprocessed_image_path: impl Into<PathBuf>,
        visualized_image_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            debug: true,
            preprocessed_image_path: preprocessed_image_path.into(),
            visualized_image_path: visualized_image_path.into(),
        }
    }

    /// Per-image layout used by directory scans:
    /// `<root>/<name>/preprocessed_<name>` and `<root>/<name>/visualized_<name>`
    pub fn for_image(debug_root: &Path, image_path: &Path) -> Self {
        let name = file_name(image_path);
        Self::for_image_in(debug_root, image_path, &name)
    }

    /// Same layout as [`DebugConfig::for_image`] inside `<root>/<dir_name>/`
    pub fn for_image_in(debug_root: &Path, image_path: &Path, dir_name: &str) -> Self {
        let name = file_name(image_path);
        let dir = debug_root.join(dir_name);

        Self::new(
            dir.join(format!("preprocessed_{}", name)),
            dir.join(format!("visualized_{}", name)),
        )
    }

    /// One config per path with a distinct directory each.
    ///
    /// Repeated file names get `_1`, `_2`, ... appended to the directory in
    /// the order given.
    pub fn for_images<'a>(
        debug_root: &Path,
        image_paths: impl IntoIterator<Item = &'a Path>,
    ) -> Vec<Self> {
        let mut taken = HashSet::new();
        image_paths
            .into_iter()
            .map(|path| {
                let name = file_name(path);
                let mut dir_name = name.clone();
                let mut suffix = 0;
                while !taken.insert(dir_name.clone()) {
                    suffix += 1;
                    dir_name = format!("{}_{}", name, suffix);
                }
                Self::for_image_in(debug_root, path, &dir_name)
            })
            .collect()
    }

    pub fn is_enabled(&self) -> bool {
        self.debug
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// Write a grayscale image in the encoding the source image came in.
///
/// JPEG output uses quality 100.
pub fn save_gray_image(img: &GrayImage, format: SourceFormat, path: &Path) -> Result<()> {
    write_gray_image(img, format, path).map_err(|source| Error::DebugWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn write_gray_image(
    img: &GrayImage,
    format: SourceFormat,
    path: &Path,
) -> std::result::Result<(), ImageError> {
    let file = File::create(path).map_err(ImageError::IoError)?;
    let writer = BufWriter::new(file);
    let (width, height) = img.dimensions();

    match format {
        SourceFormat::Png => {
            PngEncoder::new(writer).write_image(img.as_raw(), width, height, ColorType::L8)
        }
        SourceFormat::Jpeg => JpegEncoder::new_with_quality(writer, 100).write_image(
            img.as_raw(),
            width,
            height,
            ColorType::L8,
        ),
    }
}
