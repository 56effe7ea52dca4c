//! Node kinds and their capabilities.
//!
//! Every node in a [`ProcessingGraph`](crate::graph::ProcessingGraph) is one
//! of a closed set of kinds. The kind decides which ports the node gets, which
//! parameter it stores and how the engine evaluates it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of work a node performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Reads an image from a file path.
    Load,
    /// Adds a fixed offset to every colour channel.
    Brightness,
    /// Scales every colour channel.
    Contrast,
    /// Gaussian blur with an odd kernel size.
    Blur,
    /// Canny edge map.
    EdgeDetection,
    /// Additive random noise.
    Noise,
    /// User-supplied convolution kernel.
    Convolution,
    /// Weighted mix of two images.
    Blend,
    /// Terminal node: displays and optionally saves its input.
    Output,
}

impl NodeKind {
    /// Get all kinds in display order.
    pub fn all() -> &'static [NodeKind] {
        &[
            NodeKind::Load,
            NodeKind::Brightness,
            NodeKind::Contrast,
            NodeKind::Blur,
            NodeKind::EdgeDetection,
            NodeKind::Noise,
            NodeKind::Convolution,
            NodeKind::Blend,
            NodeKind::Output,
        ]
    }

    /// Stable identifier (e.g. "edge_detection").
    pub fn id(&self) -> &'static str {
        match self {
            NodeKind::Load => "load",
            NodeKind::Brightness => "brightness",
            NodeKind::Contrast => "contrast",
            NodeKind::Blur => "blur",
            NodeKind::EdgeDetection => "edge_detection",
            NodeKind::Noise => "noise",
            NodeKind::Convolution => "convolution",
            NodeKind::Blend => "blend",
            NodeKind::Output => "output",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeKind::Load => "Load Image",
            NodeKind::Brightness => "Brightness",
            NodeKind::Contrast => "Contrast",
            NodeKind::Blur => "Blur",
            NodeKind::EdgeDetection => "Edge Detection",
            NodeKind::Noise => "Noise",
            NodeKind::Convolution => "Convolution",
            NodeKind::Blend => "Blend",
            NodeKind::Output => "Output",
        }
    }

    /// Short description for listings.
    pub fn description(&self) -> &'static str {
        match self {
            NodeKind::Load => "Load an image from a file path",
            NodeKind::Brightness => "Add an offset in [-100, 100] to each colour channel",
            NodeKind::Contrast => "Multiply each colour channel by a factor in [0, 3]",
            NodeKind::Blur => "Gaussian blur with a positive odd kernel size",
            NodeKind::EdgeDetection => "Detect edges (single-channel result)",
            NodeKind::Noise => "Add random noise with an amount in [0, 1]",
            NodeKind::Convolution => "Convolve with a custom kernel matrix",
            NodeKind::Blend => "Mix two images: alpha * base + (1 - alpha) * overlay",
            NodeKind::Output => "Display the result and optionally save it",
        }
    }

    /// Whether nodes of this kind have an output port.
    pub fn produces_output(&self) -> bool {
        !self.is_terminal()
    }

    /// Whether nodes of this kind have at least one input port.
    pub fn consumes_input(&self) -> bool {
        self.input_count() > 0
    }

    /// Whether this kind ends a pipeline.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeKind::Output)
    }

    /// Number of input ports a node of this kind owns.
    pub fn input_count(&self) -> usize {
        match self {
            NodeKind::Load => 0,
            NodeKind::Blend => 2,
            _ => 1,
        }
    }

    /// Names of the parameters this kind accepts.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            NodeKind::Load | NodeKind::Output => &["path"],
            NodeKind::Brightness => &["offset"],
            NodeKind::Contrast => &["factor"],
            NodeKind::Blur => &["kernel_size"],
            NodeKind::EdgeDetection => &[],
            NodeKind::Noise => &["amount"],
            NodeKind::Convolution => &["kernel"],
            NodeKind::Blend => &["alpha"],
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::all()
            .iter()
            .copied()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| format!("unknown node kind '{}'", s))
    }
}
