use std::io::Cursor;
use std::path::Path;

use image::io::Reader;
use image::DynamicImage;
use log::debug;

use crate::error::{Error, Result};
use crate::processing::types::SourceFormat;

/// Read an image file and decode it, checking the encoding against the allow-list
pub fn decode_path<P: AsRef<Path>>(path: P) -> Result<(DynamicImage, SourceFormat)> {
    let path_ref = path.as_ref();

    let bytes = std::fs::read(path_ref).map_err(|source| Error::SourceUnreadable {
        path: path_ref.to_path_buf(),
        source,
    })?;

    decode_bytes(&bytes)
}

/// Decode in-memory image bytes.
///
/// The encoding is sniffed from the content, so the file extension plays no
/// part. Recognised encodings outside PNG/JPEG are rejected before any pixel
/// data is decoded.
pub fn decode_bytes(bytes: &[u8]) -> Result<(DynamicImage, SourceFormat)> {
    let reader = Reader::new(Cursor::new(bytes)).with_guessed_format()?;

    let detected = reader.format().ok_or_else(|| {
        Error::Decode(image::ImageError::Unsupported(
            image::error::UnsupportedError::from_format_and_kind(
                image::error::ImageFormatHint::Unknown,
                image::error::UnsupportedErrorKind::Format(image::error::ImageFormatHint::Unknown),
            ),
        ))
    })?;

    let format = SourceFormat::from_image_format(detected)
        .ok_or_else(|| Error::UnsupportedFormat(format!("{:?}", detected).to_lowercase()))?;

    let img = reader.decode()?;
    debug!(
        "Decoded {} image ({}x{})",
        format.name(),
        img.width(),
        img.height()
    );

    Ok((img, format))
}
