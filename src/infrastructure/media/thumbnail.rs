use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::constants::THUMBNAIL_MAX_DIMENSION;
use crate::errors::AppError;

/// Downscales `content` to fit the thumbnail box, keeping the aspect ratio.
///
/// Images already inside the box keep their size. JPEG stays JPEG and
/// everything else is written as PNG.
pub fn render_thumbnail(content: &[u8], extension: &str) -> Result<Vec<u8>, AppError> {
    let source = image::load_from_memory(content)
        .map_err(|e| AppError::BadRequest(format!("Could not decode image: {e}")))?;

    let thumb = if source.width() <= THUMBNAIL_MAX_DIMENSION && source.height() <= THUMBNAIL_MAX_DIMENSION {
        source
    } else {
        source.thumbnail(THUMBNAIL_MAX_DIMENSION, THUMBNAIL_MAX_DIMENSION)
    };

    let (thumb, format) = match extension {
        "jpg" | "jpeg" => (DynamicImage::ImageRgb8(thumb.to_rgb8()), ImageFormat::Jpeg),
        _ => (thumb, ImageFormat::Png),
    };

    let mut buf = Cursor::new(Vec::new());
    thumb
        .write_to(&mut buf, format)
        .map_err(|e| AppError::InternalError(format!("Thumbnail encoding failed: {e}")))?;

    Ok(buf.into_inner())
}
