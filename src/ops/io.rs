//! Reading and writing image files.

use crate::core::error::{OpError, OpResult};
use crate::core::types::Image;
use image::DynamicImage;
use log::debug;
use std::path::Path;

/// Decode an image file.
///
/// 16-bit and float images are converted to RGBA8 so every transform sees
/// one of the 8-bit layouts.
pub fn load(path: &Path) -> OpResult<Image> {
    let decoded = image::open(path).map_err(|source| OpError::Load {
        path: path.display().to_string(),
        source,
    })?;

    let decoded = match decoded {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => decoded,
        other => {
            debug!("converting {:?} image to RGBA8", other.color());
            DynamicImage::ImageRgba8(other.to_rgba8())
        }
    };

    debug!(
        "loaded {} ({}x{}, {:?})",
        path.display(),
        decoded.width(),
        decoded.height(),
        decoded.color()
    );
    Ok(Image::new(decoded))
}

/// Encode an image, picking the format from the file extension.
pub fn save(image: &Image, path: &Path) -> OpResult<()> {
    image
        .as_dynamic()
        .save(path)
        .map_err(|source| OpError::Save {
            path: path.display().to_string(),
            source,
        })?;
    debug!("saved {}", path.display());
    Ok(())
}
