use std::fmt;
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use log::{debug, trace};

use crate::error::Result;
use crate::hash::ImageHash;
use crate::processing::debug_output::{save_gray_image, DebugConfig};
use crate::processing::decode::{decode_bytes, decode_path};
use crate::processing::extract::{extract_hash, render_visualization};
use crate::processing::resample::{resample, to_pixel_grid};
use crate::processing::transform::{DirectDct, FrequencyTransform, TransformKind};
use crate::processing::types::SourceFormat;

/// Runs decode → resample → DCT → bit extraction for one image at a time.
///
/// A hasher carries no per-image state, so one value can be shared across
/// threads and used for any number of images.
#[derive(Clone)]
pub struct PerceptualHasher {
    transform: Arc<dyn FrequencyTransform>,
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PerceptualHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerceptualHasher")
            .field("transform", &self.transform.name())
            .finish()
    }
}

impl PerceptualHasher {
    /// Hasher using the direct DCT
    pub fn new() -> Self {
        Self {
            transform: Arc::new(DirectDct),
        }
    }

    /// Configure the 2-D transform
    pub fn with_transform(mut self, transform: impl FrequencyTransform + 'static) -> Self {
        self.transform = Arc::new(transform);
        self
    }

    /// Configure the 2-D transform from its configuration selector
    pub fn with_transform_kind(mut self, kind: TransformKind) -> Self {
        self.transform = kind.build();
        self
    }

    pub fn transform_name(&self) -> &'static str {
        self.transform.name()
    }

    /// Hash the image file at `path`
    pub fn hash_path<P: AsRef<Path>>(
        &self,
        path: P,
        debug: Option<&DebugConfig>,
    ) -> Result<ImageHash> {
        let path_ref = path.as_ref();
        trace!("Hashing {}", path_ref.display());
        let (img, format) = decode_path(path_ref)?;
        self.hash_image(&img, format, debug)
    }

    /// Hash an encoded image held in memory
    pub fn hash_bytes(&self, bytes: &[u8], debug: Option<&DebugConfig>) -> Result<ImageHash> {
        let (img, format) = decode_bytes(bytes)?;
        self.hash_image(&img, format, debug)
    }

    /// Hash an already decoded image.
    ///
    /// `format` only decides how debug images are encoded.
    pub fn hash_image(
        &self,
        img: &DynamicImage,
        format: SourceFormat,
        debug: Option<&DebugConfig>,
    ) -> Result<ImageHash> {
        let debug = debug.filter(|d| d.is_enabled());

        let gray = resample(img);
        if let Some(config) = debug {
            save_gray_image(&gray, format, &config.preprocessed_image_path)?;
            debug!(
                "Wrote preprocessed image to {}",
                config.preprocessed_image_path.display()
            );
        }

        let coefficients = self.transform.forward(&to_pixel_grid(&gray));
        let hash = extract_hash(&coefficients);

        if let Some(config) = debug {
            save_gray_image(
                &render_visualization(&hash),
                format,
                &config.visualized_image_path,
            )?;
            debug!(
                "Wrote hash visualization to {}",
                config.visualized_image_path.display()
            );
        }

        trace!("{} transform produced {}", self.transform.name(), hash);
        Ok(hash)
    }
}
