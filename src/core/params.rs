//! Per-node parameter store.
//!
//! Each node kind owns one validated setting (Blend and Output included).
//! Ranges are checked when a value is written, never when it is read: a
//! rejected write returns a [`ParameterError`] and leaves the stored value
//! unchanged so the caller can show feedback instead of silently clamping.

use crate::core::error::{ParameterError, ParameterResult};
use crate::core::node::NodeKind;
use crate::core::types::{Kernel, Value};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Accepted brightness offsets.
pub const BRIGHTNESS_RANGE: RangeInclusive<i64> = -100..=100;
/// Accepted contrast factors.
pub const CONTRAST_RANGE: RangeInclusive<f64> = 0.0..=3.0;
/// Accepted noise amounts.
pub const NOISE_RANGE: RangeInclusive<f64> = 0.0..=1.0;
/// Accepted blend weights.
pub const ALPHA_RANGE: RangeInclusive<f64> = 0.0..=1.0;

pub const DEFAULT_BRIGHTNESS: i32 = 0;
pub const DEFAULT_CONTRAST: f64 = 1.0;
pub const DEFAULT_KERNEL_SIZE: i32 = 3;
/// Largest accepted blur kernel size.
pub const MAX_KERNEL_SIZE: i32 = 255;
pub const DEFAULT_NOISE: f64 = 0.05;
pub const DEFAULT_ALPHA: f64 = 0.5;

/// The setting stored on a node, one variant per [`NodeKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Parameters {
    Load { path: String },
    Brightness { offset: i32 },
    Contrast { factor: f64 },
    Blur { kernel_size: i32 },
    EdgeDetection,
    Noise { amount: f64 },
    Convolution { kernel: Kernel },
    Blend { alpha: f64 },
    Output { path: Option<String> },
}

impl Parameters {
    /// Default setting for a freshly added node of `kind`.
    pub fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Load => Parameters::Load {
                path: String::new(),
            },
            NodeKind::Brightness => Parameters::Brightness {
                offset: DEFAULT_BRIGHTNESS,
            },
            NodeKind::Contrast => Parameters::Contrast {
                factor: DEFAULT_CONTRAST,
            },
            NodeKind::Blur => Parameters::Blur {
                kernel_size: DEFAULT_KERNEL_SIZE,
            },
            NodeKind::EdgeDetection => Parameters::EdgeDetection,
            NodeKind::Noise => Parameters::Noise {
                amount: DEFAULT_NOISE,
            },
            NodeKind::Convolution => Parameters::Convolution {
                kernel: Kernel::default(),
            },
            NodeKind::Blend => Parameters::Blend {
                alpha: DEFAULT_ALPHA,
            },
            NodeKind::Output => Parameters::Output { path: None },
        }
    }

    /// The node kind this setting belongs to.
    pub fn kind(&self) -> NodeKind {
        match self {
            Parameters::Load { .. } => NodeKind::Load,
            Parameters::Brightness { .. } => NodeKind::Brightness,
            Parameters::Contrast { .. } => NodeKind::Contrast,
            Parameters::Blur { .. } => NodeKind::Blur,
            Parameters::EdgeDetection => NodeKind::EdgeDetection,
            Parameters::Noise { .. } => NodeKind::Noise,
            Parameters::Convolution { .. } => NodeKind::Convolution,
            Parameters::Blend { .. } => NodeKind::Blend,
            Parameters::Output { .. } => NodeKind::Output,
        }
    }

    /// Read a parameter by name. Unset optional values read as `None`.
    pub fn get(&self, name: &str) -> Option<Value> {
        match (self, name) {
            (Parameters::Load { path }, "path") => Some(Value::String(path.clone())),
            (Parameters::Brightness { offset }, "offset") => Some(Value::Integer(*offset as i64)),
            (Parameters::Contrast { factor }, "factor") => Some(Value::Float(*factor)),
            (Parameters::Blur { kernel_size }, "kernel_size") => {
                Some(Value::Integer(*kernel_size as i64))
            }
            (Parameters::Noise { amount }, "amount") => Some(Value::Float(*amount)),
            (Parameters::Convolution { kernel }, "kernel") => Some(Value::Kernel(kernel.clone())),
            (Parameters::Blend { alpha }, "alpha") => Some(Value::Float(*alpha)),
            (Parameters::Output { path }, "path") => path.clone().map(Value::String),
            _ => None,
        }
    }

    /// Write a parameter by name after checking its type and range.
    pub fn set(&mut self, name: &str, value: Value) -> ParameterResult<()> {
        let kind = self.kind();
        match (self, name) {
            (Parameters::Load { path }, "path") => {
                *path = non_empty_string(name, value)?;
            }
            (Parameters::Output { path }, "path") => {
                *path = Some(non_empty_string(name, value)?);
            }
            (Parameters::Brightness { offset }, "offset") => {
                let v = integer(name, &value)?;
                if !BRIGHTNESS_RANGE.contains(&v) {
                    return Err(out_of_range(name, v, "[-100, 100]"));
                }
                *offset = v as i32;
            }
            (Parameters::Contrast { factor }, "factor") => {
                *factor = float_in(name, &value, CONTRAST_RANGE)?;
            }
            (Parameters::Blur { kernel_size }, "kernel_size") => {
                let v = integer(name, &value)?;
                if !is_valid_kernel_size(v) {
                    return Err(out_of_range(name, v, "positive odd integers up to 255"));
                }
                *kernel_size = v as i32;
            }
            (Parameters::Noise { amount }, "amount") => {
                *amount = float_in(name, &value, NOISE_RANGE)?;
            }
            (Parameters::Convolution { kernel }, "kernel") => {
                let Value::Kernel(k) = value else {
                    return Err(type_mismatch(name, "a kernel matrix"));
                };
                if k.is_empty() {
                    return Err(ParameterError::EmptyValue(name.to_string()));
                }
                *kernel = k;
            }
            (Parameters::Blend { alpha }, "alpha") => {
                *alpha = float_in(name, &value, ALPHA_RANGE)?;
            }
            _ => {
                return Err(ParameterError::UnknownParameter {
                    kind,
                    parameter: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

/// Whether `size` is usable as a blur kernel size: positive, odd and at
/// most [`MAX_KERNEL_SIZE`].
pub fn is_valid_kernel_size(size: i64) -> bool {
    size > 0 && size % 2 == 1 && size <= MAX_KERNEL_SIZE as i64
}

fn integer(name: &str, value: &Value) -> ParameterResult<i64> {
    value
        .as_integer()
        .ok_or_else(|| type_mismatch(name, "an integer"))
}

fn float_in(name: &str, value: &Value, range: RangeInclusive<f64>) -> ParameterResult<f64> {
    let v = value
        .as_float()
        .ok_or_else(|| type_mismatch(name, "a number"))?;
    // NaN fails `contains`, so it is rejected here too.
    if !range.contains(&v) {
        return Err(out_of_range(
            name,
            v,
            &format!("[{:?}, {:?}]", range.start(), range.end()),
        ));
    }
    Ok(v)
}

fn non_empty_string(name: &str, value: Value) -> ParameterResult<String> {
    match value {
        Value::String(s) if s.is_empty() => Err(ParameterError::EmptyValue(name.to_string())),
        Value::String(s) => Ok(s),
        _ => Err(type_mismatch(name, "a string")),
    }
}

fn out_of_range(name: &str, value: impl ToString, expected: &str) -> ParameterError {
    ParameterError::OutOfRange {
        parameter: name.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

fn type_mismatch(name: &str, expected: &str) -> ParameterError {
    ParameterError::TypeMismatch {
        parameter: name.to_string(),
        expected: expected.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_kind() {
        for kind in NodeKind::all() {
            assert_eq!(Parameters::default_for(*kind).kind(), *kind);
        }
        assert_eq!(
            Parameters::default_for(NodeKind::Noise).get("amount"),
            Some(Value::Float(0.05))
        );
        assert_eq!(
            Parameters::default_for(NodeKind::Blur).get("kernel_size"),
            Some(Value::Integer(3))
        );
        assert_eq!(Parameters::default_for(NodeKind::Output).get("path"), None);
    }

    #[test]
    fn test_brightness_range() {
        let mut params = Parameters::default_for(NodeKind::Brightness);
        assert!(params.set("offset", Value::Integer(100)).is_ok());
        assert!(params.set("offset", Value::Integer(-100)).is_ok());

        let err = params.set("offset", Value::Integer(101)).unwrap_err();
        assert!(matches!(err, ParameterError::OutOfRange { .. }));
        assert_eq!(params.get("offset"), Some(Value::Integer(-100)));

        assert!(matches!(
            params.set("offset", Value::Float(10.0)),
            Err(ParameterError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_blur_requires_positive_odd() {
        let mut params = Parameters::default_for(NodeKind::Blur);
        for bad in [0, -3, 4, 257, i32::MAX as i64] {
            assert!(params.set("kernel_size", Value::Integer(bad)).is_err());
        }
        assert!(params.set("kernel_size", Value::Integer(255)).is_ok());
        assert!(params.set("kernel_size", Value::Integer(7)).is_ok());
        assert_eq!(params.get("kernel_size"), Some(Value::Integer(7)));
    }

    #[test]
    fn test_float_ranges_reject_nan_and_accept_integers() {
        let mut params = Parameters::default_for(NodeKind::Contrast);
        assert!(params.set("factor", Value::Float(f64::NAN)).is_err());
        assert!(params.set("factor", Value::Float(3.1)).is_err());
        assert!(params.set("factor", Value::Integer(2)).is_ok());
        assert_eq!(params.get("factor"), Some(Value::Float(2.0)));

        let mut params = Parameters::default_for(NodeKind::Blend);
        assert!(params.set("alpha", Value::Float(-0.1)).is_err());
        assert_eq!(params.get("alpha"), Some(Value::Float(0.5)));
    }

    #[test]
    fn test_paths_must_not_be_empty() {
        let mut params = Parameters::default_for(NodeKind::Load);
        assert_eq!(
            params.set("path", Value::from("")),
            Err(ParameterError::EmptyValue("path".to_string()))
        );
        params.set("path", Value::from("in.png")).unwrap();
        assert_eq!(params.get("path"), Some(Value::from("in.png")));

        let mut params = Parameters::default_for(NodeKind::Output);
        params.set("path", Value::from("out.png")).unwrap();
        assert_eq!(params.get("path"), Some(Value::from("out.png")));
    }

    #[test]
    fn test_convolution_kernel_must_not_be_empty() {
        let mut params = Parameters::default_for(NodeKind::Convolution);
        assert!(params.set("kernel", Value::Kernel(Kernel::default())).is_err());
        params.set("kernel", Value::Kernel(Kernel::identity())).unwrap();
        assert_eq!(params.get("kernel"), Some(Value::Kernel(Kernel::identity())));
    }

    #[test]
    fn test_unknown_parameter() {
        let mut params = Parameters::default_for(NodeKind::EdgeDetection);
        assert!(matches!(
            params.set("threshold", Value::Integer(1)),
            Err(ParameterError::UnknownParameter {
                kind: NodeKind::EdgeDetection,
                ..
            })
        ));
    }
}
