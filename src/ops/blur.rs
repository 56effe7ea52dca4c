//! Neighbourhood filters: Gaussian blur, edge detection, convolution.

use crate::core::error::{OpError, OpResult};
use crate::core::params::MAX_KERNEL_SIZE;
use crate::core::types::{Image, Kernel};
use crate::ops::color::{layout, rebuild_like};
use image::DynamicImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;

/// Hysteresis thresholds for edge detection.
pub const CANNY_LOW: f32 = 50.0;
pub const CANNY_HIGH: f32 = 150.0;

/// Standard deviation used for a Gaussian of the given odd size.
pub fn sigma_for_kernel_size(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Gaussian blur. A kernel size of 1 returns the input unchanged.
pub fn gaussian(image: &Image, kernel_size: u32) -> OpResult<Image> {
    if kernel_size % 2 == 0 || kernel_size > MAX_KERNEL_SIZE as u32 {
        return Err(OpError::InvalidParameter(format!(
            "blur kernel size {} must be positive, odd and at most {}",
            kernel_size, MAX_KERNEL_SIZE
        )));
    }
    if kernel_size == 1 {
        return Ok(image.clone());
    }

    let sigma = sigma_for_kernel_size(kernel_size);
    let blurred = match image.as_dynamic() {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(gaussian_blur_f32(buf, sigma)),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(gaussian_blur_f32(buf, sigma)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(gaussian_blur_f32(buf, sigma)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(gaussian_blur_f32(buf, sigma)),
        other => {
            return Err(OpError::NotApplicable(format!(
                "{:?} images are not supported",
                other.color()
            )))
        }
    };
    Ok(Image::new(blurred))
}

/// Canny edge map of the image's luminance.
pub fn edges(image: &Image) -> OpResult<Image> {
    let source = image.as_dynamic();
    layout(source)?;
    let gray = source.to_luma8();
    Ok(Image::new(DynamicImage::ImageLuma8(canny(
        &gray, CANNY_LOW, CANNY_HIGH,
    ))))
}

/// Correlate colour channels with `kernel`.
///
/// The kernel is anchored at its centre (`rows / 2`, `cols / 2`), pixels
/// outside the image repeat the nearest edge pixel and the weights are used
/// as given.
pub fn convolve(image: &Image, kernel: &Kernel) -> OpResult<Image> {
    if kernel.is_empty() {
        return Err(OpError::InvalidParameter("convolution kernel is empty".into()));
    }
    if kernel.weights().len() != kernel.rows() * kernel.cols() {
        return Err(OpError::InvalidParameter(format!(
            "{} has {} weights",
            kernel,
            kernel.weights().len()
        )));
    }

    let source = image.as_dynamic();
    let layout = layout(source)?;
    let (w, h) = (source.width() as i64, source.height() as i64);
    let src = source.as_bytes();
    let mut out = src.to_vec();

    let anchor_row = (kernel.rows() / 2) as i64;
    let anchor_col = (kernel.cols() / 2) as i64;
    let index = |x: i64, y: i64, c: usize| {
        let x = x.clamp(0, w - 1);
        let y = y.clamp(0, h - 1);
        (y * w + x) as usize * layout.channels + c
    };

    for y in 0..h {
        for x in 0..w {
            for c in 0..layout.colour {
                let mut sum = 0.0f32;
                for r in 0..kernel.rows() {
                    for k in 0..kernel.cols() {
                        let sx = x + k as i64 - anchor_col;
                        let sy = y + r as i64 - anchor_row;
                        sum += kernel.weight(r, k) * src[index(sx, sy, c)] as f32;
                    }
                }
                out[index(x, y, c)] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    rebuild_like(source, out)
}
