//! Lookup table from node kind to transform.
//!
//! Each entry unpacks a node's [`Parameters`], replaces values that cannot
//! be used with a safe substitute, and calls into [`ImageOps`]. Load and
//! Output are not transforms and have no entry; the engine handles them.

use crate::core::error::{OpError, OpResult};
use crate::core::node::NodeKind;
use crate::core::params::{
    is_valid_kernel_size, Parameters, ALPHA_RANGE, BRIGHTNESS_RANGE, CONTRAST_RANGE,
    DEFAULT_ALPHA, DEFAULT_BRIGHTNESS, DEFAULT_CONTRAST, DEFAULT_KERNEL_SIZE, DEFAULT_NOISE,
    NOISE_RANGE,
};
use crate::core::types::{Image, Kernel};
use crate::ops::ImageOps;
use indexmap::IndexMap;

/// Everything a transform needs besides the ops implementation.
#[derive(Debug, Clone, Copy)]
pub struct OpInput<'a> {
    /// Upstream images in input-port order.
    pub images: &'a [Image],
    /// The node's stored setting.
    pub parameters: &'a Parameters,
    /// Seed for kinds with randomness.
    pub seed: u64,
}

impl<'a> OpInput<'a> {
    fn image(&self, slot: usize) -> OpResult<&'a Image> {
        self.images
            .get(slot)
            .ok_or_else(|| OpError::NotApplicable(format!("missing input image {}", slot)))
    }
}

/// A parameter value that was replaced before the operation ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Coercion {
    pub parameter: &'static str,
    pub requested: String,
    pub used: String,
}

impl Coercion {
    fn new(parameter: &'static str, requested: impl ToString, used: impl ToString) -> Self {
        Self {
            parameter,
            requested: requested.to_string(),
            used: used.to_string(),
        }
    }
}

/// Result of a transform.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub image: Image,
    pub coercion: Option<Coercion>,
}

impl Transformed {
    fn exact(image: Image) -> Self {
        Self {
            image,
            coercion: None,
        }
    }

    fn coerced(image: Image, coercion: Option<Coercion>) -> Self {
        Self { image, coercion }
    }
}

/// Signature every table entry has.
pub type TransformFn = fn(&dyn ImageOps, &OpInput<'_>) -> OpResult<Transformed>;

/// Registry of transforms by node kind.
#[derive(Clone)]
pub struct OperationTable {
    entries: IndexMap<NodeKind, TransformFn>,
}

impl OperationTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Table with every built-in transform.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register(NodeKind::Brightness, brightness);
        table.register(NodeKind::Contrast, contrast);
        table.register(NodeKind::Blur, blur);
        table.register(NodeKind::EdgeDetection, edge_detection);
        table.register(NodeKind::Noise, noise);
        table.register(NodeKind::Convolution, convolution);
        table.register(NodeKind::Blend, blend);
        table
    }

    /// Add or replace the transform for `kind`.
    pub fn register(&mut self, kind: NodeKind, transform: TransformFn) {
        self.entries.insert(kind, transform);
    }

    pub fn get(&self, kind: NodeKind) -> Option<TransformFn> {
        self.entries.get(&kind).copied()
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Kinds with a registered transform, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OperationTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for OperationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

// ============================================================================
// Coercion rules
// ============================================================================

/// Blur kernel size actually used for a stored value.
pub fn usable_kernel_size(requested: i32) -> (u32, Option<Coercion>) {
    if is_valid_kernel_size(requested as i64) {
        (requested as u32, None)
    } else {
        (
            DEFAULT_KERNEL_SIZE as u32,
            Some(Coercion::new("kernel_size", requested, DEFAULT_KERNEL_SIZE)),
        )
    }
}

/// Brightness offset actually used for a stored value.
pub fn usable_offset(requested: i32) -> (i32, Option<Coercion>) {
    if BRIGHTNESS_RANGE.contains(&(requested as i64)) {
        (requested, None)
    } else {
        (
            DEFAULT_BRIGHTNESS,
            Some(Coercion::new("offset", requested, DEFAULT_BRIGHTNESS)),
        )
    }
}

/// Convolution kernel actually used for a stored value.
pub fn usable_kernel(requested: &Kernel) -> (Kernel, Option<Coercion>) {
    if requested.is_empty() {
        let identity = Kernel::identity();
        let coercion = Coercion::new("kernel", "empty kernel", &identity);
        (identity, Some(coercion))
    } else {
        (requested.clone(), None)
    }
}

/// The replacement evaluation would make for `parameters`, if any.
pub fn pending_coercion(parameters: &Parameters) -> Option<Coercion> {
    match parameters {
        Parameters::Brightness { offset } => usable_offset(*offset).1,
        Parameters::Contrast { factor } => {
            in_range_or("factor", *factor, CONTRAST_RANGE, DEFAULT_CONTRAST).1
        }
        Parameters::Blur { kernel_size } => usable_kernel_size(*kernel_size).1,
        Parameters::Noise { amount } => in_range_or("amount", *amount, NOISE_RANGE, DEFAULT_NOISE).1,
        Parameters::Convolution { kernel } => usable_kernel(kernel).1,
        Parameters::Blend { alpha } => in_range_or("alpha", *alpha, ALPHA_RANGE, DEFAULT_ALPHA).1,
        Parameters::Load { .. } | Parameters::EdgeDetection | Parameters::Output { .. } => None,
    }
}

fn in_range_or(
    parameter: &'static str,
    value: f64,
    range: std::ops::RangeInclusive<f64>,
    default: f64,
) -> (f64, Option<Coercion>) {
    if range.contains(&value) {
        (value, None)
    } else {
        (default, Some(Coercion::new(parameter, value, default)))
    }
}

fn wrong_parameters(kind: NodeKind, parameters: &Parameters) -> OpError {
    OpError::InvalidParameter(format!(
        "{} node carries {} parameters",
        kind,
        parameters.kind()
    ))
}

// ============================================================================
// Transforms
// ============================================================================

fn brightness(ops: &dyn ImageOps, input: &OpInput<'_>) -> OpResult<Transformed> {
    let Parameters::Brightness { offset } = *input.parameters else {
        return Err(wrong_parameters(NodeKind::Brightness, input.parameters));
    };
    let (offset, coercion) = usable_offset(offset);
    let image = ops.brightness(input.image(0)?, offset)?;
    Ok(Transformed::coerced(image, coercion))
}

fn contrast(ops: &dyn ImageOps, input: &OpInput<'_>) -> OpResult<Transformed> {
    let Parameters::Contrast { factor } = *input.parameters else {
        return Err(wrong_parameters(NodeKind::Contrast, input.parameters));
    };
    let (factor, coercion) = in_range_or("factor", factor, CONTRAST_RANGE, DEFAULT_CONTRAST);
    let image = ops.contrast(input.image(0)?, factor)?;
    Ok(Transformed::coerced(image, coercion))
}

fn blur(ops: &dyn ImageOps, input: &OpInput<'_>) -> OpResult<Transformed> {
    let Parameters::Blur { kernel_size } = *input.parameters else {
        return Err(wrong_parameters(NodeKind::Blur, input.parameters));
    };
    let (kernel_size, coercion) = usable_kernel_size(kernel_size);
    let image = ops.blur(input.image(0)?, kernel_size)?;
    Ok(Transformed::coerced(image, coercion))
}

fn edge_detection(ops: &dyn ImageOps, input: &OpInput<'_>) -> OpResult<Transformed> {
    ops.edge_detection(input.image(0)?).map(Transformed::exact)
}

fn noise(ops: &dyn ImageOps, input: &OpInput<'_>) -> OpResult<Transformed> {
    let Parameters::Noise { amount } = *input.parameters else {
        return Err(wrong_parameters(NodeKind::Noise, input.parameters));
    };
    let (amount, coercion) = in_range_or("amount", amount, NOISE_RANGE, DEFAULT_NOISE);
    let image = ops.noise(input.image(0)?, amount, input.seed)?;
    Ok(Transformed::coerced(image, coercion))
}

fn convolution(ops: &dyn ImageOps, input: &OpInput<'_>) -> OpResult<Transformed> {
    let Parameters::Convolution { kernel } = input.parameters else {
        return Err(wrong_parameters(NodeKind::Convolution, input.parameters));
    };
    let (kernel, coercion) = usable_kernel(kernel);
    let image = ops.convolve(input.image(0)?, &kernel)?;
    Ok(Transformed::coerced(image, coercion))
}

fn blend(ops: &dyn ImageOps, input: &OpInput<'_>) -> OpResult<Transformed> {
    let Parameters::Blend { alpha } = *input.parameters else {
        return Err(wrong_parameters(NodeKind::Blend, input.parameters));
    };
    let (alpha, coercion) = in_range_or("alpha", alpha, ALPHA_RANGE, DEFAULT_ALPHA);
    let image = ops.blend(input.image(0)?, input.image(1)?, alpha)?;
    Ok(Transformed::coerced(image, coercion))
}
