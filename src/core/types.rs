//! Core value types that flow through the processing graph.
//!
//! - [`Image`]: an immutable, cheaply clonable pixel buffer
//! - [`Kernel`]: a convolution matrix
//! - [`Value`]: a dynamically typed parameter value written by a front end

use crate::core::error::{ParameterError, ParameterResult};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Image wrapper with shared ownership.
///
/// Images are stored behind an `Arc` so a result that fans out to several
/// consumers is shared rather than copied. Operations never mutate an image
/// in place; they always produce a new one.
#[derive(Debug, Clone)]
pub struct Image {
    data: Arc<DynamicImage>,
}

impl Image {
    /// Wrap a decoded image.
    pub fn new(image: DynamicImage) -> Self {
        Self {
            data: Arc::new(image),
        }
    }

    /// Borrow the underlying pixel data.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.data
    }

    /// Take the pixel data, copying only if other handles still share it.
    pub fn into_dynamic(self) -> DynamicImage {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    /// Get (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Number of channels per pixel.
    pub fn channel_count(&self) -> u8 {
        self.data.color().channel_count()
    }

    /// True when the image holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether two handles point at the same buffer.
    pub fn shares_buffer(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.shares_buffer(other)
            || (self.dimensions() == other.dimensions()
                && self.data.color() == other.data.color()
                && self.data.as_bytes() == other.data.as_bytes())
    }
}

impl From<DynamicImage> for Image {
    fn from(image: DynamicImage) -> Self {
        Self::new(image)
    }
}

/// A convolution kernel stored row-major.
///
/// Deserialized kernels go through [`Kernel::new`], so a stored kernel
/// always has exactly `rows * cols` weights.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawKernel")]
pub struct Kernel {
    rows: usize,
    cols: usize,
    weights: Vec<f32>,
}

#[derive(Deserialize)]
struct RawKernel {
    rows: usize,
    cols: usize,
    weights: Vec<f32>,
}

impl TryFrom<RawKernel> for Kernel {
    type Error = ParameterError;

    fn try_from(raw: RawKernel) -> Result<Self, Self::Error> {
        Kernel::new(raw.rows, raw.cols, raw.weights)
    }
}

impl Kernel {
    /// Create a kernel, checking that `weights` fills `rows * cols` finite cells.
    pub fn new(rows: usize, cols: usize, weights: Vec<f32>) -> ParameterResult<Self> {
        if weights.len() != rows * cols {
            return Err(ParameterError::InvalidKernel(format!(
                "{}x{} kernel needs {} weights, got {}",
                rows,
                cols,
                rows * cols,
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(ParameterError::InvalidKernel(
                "weights must be finite".to_string(),
            ));
        }
        Ok(Self {
            rows,
            cols,
            weights,
        })
    }

    /// Build a kernel from rows of equal length.
    pub fn from_rows(rows: &[Vec<f32>]) -> ParameterResult<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|row| row.len() != cols) {
            return Err(ParameterError::InvalidKernel(
                "rows have different lengths".to_string(),
            ));
        }
        Self::new(rows.len(), cols, rows.concat())
    }

    /// The 1x1 kernel that leaves an image unchanged.
    pub fn identity() -> Self {
        Self {
            rows: 1,
            cols: 1,
            weights: vec![1.0],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Weight at (row, col).
    pub fn weight(&self, row: usize, col: usize) -> f32 {
        self.weights[row * self.cols + col]
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} kernel", self.rows, self.cols)
    }
}

/// A parameter value as written by a front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Convolution matrix
    Kernel(Kernel),
}

impl Value {
    /// Try to get this value as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Try to get this value as a float.
    /// Integers are automatically converted to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_string(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Try to get this value as a kernel.
    pub fn as_kernel(&self) -> Option<&Kernel> {
        if let Value::Kernel(k) = self {
            Some(k)
        } else {
            None
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Kernel(k) => write!(f, "{}", k),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Kernel> for Value {
    fn from(v: Kernel) -> Self {
        Value::Kernel(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_image_equality_compares_pixels() {
        let a = Image::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]))));
        let b = Image::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]))));
        let c = Image::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([9, 2, 3]))));

        assert!(!a.shares_buffer(&b));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.channel_count(), 3);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_kernel_shape_checked() {
        assert!(Kernel::new(2, 2, vec![1.0; 4]).is_ok());
        assert!(Kernel::new(2, 2, vec![1.0; 3]).is_err());
        assert!(Kernel::new(1, 1, vec![f32::NAN]).is_err());

        let k = Kernel::from_rows(&[vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
        assert_eq!(k.weight(1, 0), 2.0);
        assert!(Kernel::from_rows(&[vec![0.0, 1.0], vec![2.0]]).is_err());
        assert!(Kernel::default().is_empty());
    }

    #[test]
    fn test_kernel_deserialize_checks_shape() {
        let bad = r#"{"type":"Kernel","data":{"rows":3,"cols":3,"weights":[1.0]}}"#;
        let err = serde_json::from_str::<Value>(bad).unwrap_err();
        assert!(err.to_string().contains("3x3 kernel needs 9 weights"), "{}", err);

        let good = r#"{"type":"Kernel","data":{"rows":1,"cols":2,"weights":[0.5,0.5]}}"#;
        let value: Value = serde_json::from_str(good).unwrap();
        assert_eq!(value.as_kernel().map(Kernel::cols), Some(2));

        let round = serde_json::to_string(&Value::Kernel(Kernel::identity())).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&round).unwrap(), Value::Kernel(Kernel::identity()));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::Integer(3).as_float(), Some(3.0));
        assert_eq!(Value::Float(3.5).as_integer(), None);
        assert_eq!(Value::from("x").as_string(), Some("x"));
    }
}
