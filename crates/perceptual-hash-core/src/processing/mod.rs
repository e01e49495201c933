// Pipeline stages, leaf to root
pub mod decode;
pub mod resample;
pub mod transform;
pub mod extract;

pub mod debug_output;
pub mod pipeline;
pub mod types;

// Expose the stage functions
pub use decode::{decode_bytes, decode_path};
pub use extract::{extract_hash, render_visualization};
pub use resample::{resample, to_pixel_grid};
pub use transform::{DirectDct, FrequencyTransform, SeparableDct, TransformKind};

// Reexport core functionality
pub use debug_output::DebugConfig;
pub use pipeline::PerceptualHasher;
pub use types::{CoefficientMatrix, PixelGrid, SourceFormat, GRID_SIZE, HASH_BLOCK};
