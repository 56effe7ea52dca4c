//! Image Operations Library.
//!
//! The engine never touches pixels itself. Every transform goes through the
//! [`ImageOps`] trait so a host can swap in its own implementation (a GPU
//! backend, a recording fake in tests). [`StandardOps`] is the default,
//! built on `image` and `imageproc`.
//!
//! All standard transforms work on 8-bit L, LA, RGB and RGBA buffers and
//! never modify their inputs.

pub mod io;
pub mod color;
pub mod blur;
pub mod composite;
pub mod table;

use crate::core::error::OpResult;
use crate::core::types::{Image, Kernel};
use std::path::Path;

pub use table::{pending_coercion, Coercion, OpInput, OperationTable, TransformFn, Transformed};

/// Contract between the evaluation engine and whatever does the pixel work.
pub trait ImageOps: Send + Sync {
    /// Decode an image file.
    fn load(&self, path: &Path) -> OpResult<Image>;

    /// Encode `image` to `path`, format chosen by extension.
    fn save(&self, image: &Image, path: &Path) -> OpResult<()>;

    /// Add `offset` to every colour channel.
    fn brightness(&self, image: &Image, offset: i32) -> OpResult<Image>;

    /// Scale every colour channel by `factor`.
    fn contrast(&self, image: &Image, factor: f64) -> OpResult<Image>;

    /// Gaussian blur with a square kernel of odd size `kernel_size`.
    fn blur(&self, image: &Image, kernel_size: u32) -> OpResult<Image>;

    /// Single-channel edge map.
    fn edge_detection(&self, image: &Image) -> OpResult<Image>;

    /// Add uniform noise of up to `amount * 255` per channel.
    ///
    /// The same `seed` must always give the same result.
    fn noise(&self, image: &Image, amount: f64, seed: u64) -> OpResult<Image>;

    /// Correlate the image with `kernel`.
    fn convolve(&self, image: &Image, kernel: &Kernel) -> OpResult<Image>;

    /// Weighted sum `alpha * base + (1 - alpha) * overlay`.
    fn blend(&self, base: &Image, overlay: &Image, alpha: f64) -> OpResult<Image>;
}

/// The default operations, backed by the `image` and `imageproc` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardOps;

impl ImageOps for StandardOps {
    fn load(&self, path: &Path) -> OpResult<Image> {
        io::load(path)
    }

    fn save(&self, image: &Image, path: &Path) -> OpResult<()> {
        io::save(image, path)
    }

    fn brightness(&self, image: &Image, offset: i32) -> OpResult<Image> {
        color::brightness(image, offset)
    }

    fn contrast(&self, image: &Image, factor: f64) -> OpResult<Image> {
        color::contrast(image, factor)
    }

    fn blur(&self, image: &Image, kernel_size: u32) -> OpResult<Image> {
        blur::gaussian(image, kernel_size)
    }

    fn edge_detection(&self, image: &Image) -> OpResult<Image> {
        blur::edges(image)
    }

    fn noise(&self, image: &Image, amount: f64, seed: u64) -> OpResult<Image> {
        color::noise(image, amount, seed)
    }

    fn convolve(&self, image: &Image, kernel: &Kernel) -> OpResult<Image> {
        blur::convolve(image, kernel)
    }

    fn blend(&self, base: &Image, overlay: &Image, alpha: f64) -> OpResult<Image> {
        composite::blend(base, overlay, alpha)
    }
}
