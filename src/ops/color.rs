//! Per-pixel colour adjustments: brightness, contrast, noise.
//!
//! These work directly on the raw byte buffer. Alpha, when present, is
//! always the last channel and is left untouched.

use crate::core::error::{OpError, OpResult};
use crate::core::types::Image;
use image::{DynamicImage, ImageBuffer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Channel layout of an 8-bit image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    /// Bytes per pixel.
    pub channels: usize,
    /// Leading channels that carry colour (everything but alpha).
    pub colour: usize,
}

/// Describe an image's layout, refusing anything that is not 8-bit.
pub(crate) fn layout(image: &DynamicImage) -> OpResult<Layout> {
    let channels = match image {
        DynamicImage::ImageLuma8(_) => 1,
        DynamicImage::ImageLumaA8(_) => 2,
        DynamicImage::ImageRgb8(_) => 3,
        DynamicImage::ImageRgba8(_) => 4,
        other => {
            return Err(OpError::NotApplicable(format!(
                "{:?} images are not supported",
                other.color()
            )))
        }
    };
    let colour = if image.color().has_alpha() {
        channels - 1
    } else {
        channels
    };
    Ok(Layout { channels, colour })
}

/// Build an image with the same size and layout as `template` from `bytes`.
pub(crate) fn rebuild_like(template: &DynamicImage, bytes: Vec<u8>) -> OpResult<Image> {
    let (w, h) = (template.width(), template.height());
    let rebuilt = match template {
        DynamicImage::ImageLuma8(_) => ImageBuffer::from_raw(w, h, bytes).map(DynamicImage::ImageLuma8),
        DynamicImage::ImageLumaA8(_) => {
            ImageBuffer::from_raw(w, h, bytes).map(DynamicImage::ImageLumaA8)
        }
        DynamicImage::ImageRgb8(_) => ImageBuffer::from_raw(w, h, bytes).map(DynamicImage::ImageRgb8),
        DynamicImage::ImageRgba8(_) => {
            ImageBuffer::from_raw(w, h, bytes).map(DynamicImage::ImageRgba8)
        }
        _ => None,
    };
    rebuilt
        .map(Image::new)
        .ok_or_else(|| OpError::NotApplicable("pixel buffer does not match image size".into()))
}

/// Apply `f` to every colour byte, copying alpha through.
fn map_colour(image: &Image, mut f: impl FnMut(u8) -> u8) -> OpResult<Image> {
    let source = image.as_dynamic();
    let layout = layout(source)?;

    let mut bytes = source.as_bytes().to_vec();
    for pixel in bytes.chunks_exact_mut(layout.channels) {
        for value in &mut pixel[..layout.colour] {
            *value = f(*value);
        }
    }
    rebuild_like(source, bytes)
}

fn saturate(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// `clamp(v + offset)` on colour channels.
pub fn brightness(image: &Image, offset: i32) -> OpResult<Image> {
    if offset == 0 {
        return Ok(image.clone());
    }
    map_colour(image, |v| (v as i32 + offset).clamp(0, 255) as u8)
}

/// `clamp(v * factor)` on colour channels.
pub fn contrast(image: &Image, factor: f64) -> OpResult<Image> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(OpError::InvalidParameter(format!(
            "contrast factor {} must be a non-negative number",
            factor
        )));
    }
    map_colour(image, |v| saturate(v as f64 * factor))
}

/// Uniform additive noise in `[-amount * 255, amount * 255]`.
pub fn noise(image: &Image, amount: f64, seed: u64) -> OpResult<Image> {
    if !(0.0..=1.0).contains(&amount) {
        return Err(OpError::InvalidParameter(format!(
            "noise amount {} is outside [0, 1]",
            amount
        )));
    }
    if amount == 0.0 {
        return Ok(image.clone());
    }

    let spread = amount * 255.0;
    let mut rng = StdRng::seed_from_u64(seed);
    map_colour(image, |v| saturate(v as f64 + rng.random_range(-spread..=spread)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{LumaA, Rgb, Rgba};

    fn rgb(w: u32, h: u32, value: u8) -> Image {
        Image::new(DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
            w,
            h,
            Rgb([value; 3]),
        )))
    }

    #[test]
    fn test_brightness_clamps() {
        let brighter = brightness(&rgb(4, 4, 200), 100).unwrap();
        assert!(brighter.as_dynamic().as_bytes().iter().all(|&v| v == 255));

        let darker = brightness(&rgb(4, 4, 30), -100).unwrap();
        assert!(darker.as_dynamic().as_bytes().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_brightness_keeps_alpha() {
        let source = Image::new(DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            2,
            2,
            Rgba([10, 20, 30, 40]),
        )));
        let result = brightness(&source, 50).unwrap();

        assert_eq!(&result.as_dynamic().as_bytes()[..4], &[60, 70, 80, 40]);
        assert_eq!(&source.as_dynamic().as_bytes()[..4], &[10, 20, 30, 40]);
    }

    #[test]
    fn test_contrast_scales() {
        let result = contrast(&rgb(2, 2, 100), 1.5).unwrap();
        assert!(result.as_dynamic().as_bytes().iter().all(|&v| v == 150));

        let result = contrast(&rgb(2, 2, 100), 3.0).unwrap();
        assert!(result.as_dynamic().as_bytes().iter().all(|&v| v == 255));

        let result = contrast(&rgb(2, 2, 100), 0.0).unwrap();
        assert!(result.as_dynamic().as_bytes().iter().all(|&v| v == 0));

        assert!(contrast(&rgb(2, 2, 100), f64::NAN).is_err());
    }

    #[test]
    fn test_noise_is_seeded() {
        let source = rgb(8, 8, 128);
        let a = noise(&source, 0.2, 7).unwrap();
        let b = noise(&source, 0.2, 7).unwrap();
        let c = noise(&source, 0.2, 8).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a
            .as_dynamic()
            .as_bytes()
            .iter()
            .all(|&v| (76..=180).contains(&v)));
    }

    #[test]
    fn test_zero_noise_is_identity() {
        let source = rgb(3, 3, 77);
        let result = noise(&source, 0.0, 1).unwrap();
        assert!(result.shares_buffer(&source));
    }

    #[test]
    fn test_luma_alpha_layout() {
        let source = Image::new(DynamicImage::ImageLumaA8(ImageBuffer::from_pixel(
            1,
            1,
            LumaA([10, 99]),
        )));
        let result = brightness(&source, 5).unwrap();
        assert_eq!(result.as_dynamic().as_bytes(), &[15, 99]);
    }

    #[test]
    fn test_sixteen_bit_not_applicable() {
        let source = Image::new(DynamicImage::new_rgb16(2, 2));
        assert!(matches!(
            brightness(&source, 10),
            Err(OpError::NotApplicable(_))
        ));
    }
}
