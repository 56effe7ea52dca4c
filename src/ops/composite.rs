//! Compositing two images.

use crate::core::error::{OpError, OpResult};
use crate::core::types::Image;
use crate::ops::color::{layout, rebuild_like};

/// Weighted sum of two images of identical size and layout.
///
/// Every byte, alpha included, becomes
/// `round(alpha * base + (1 - alpha) * overlay)`.
pub fn blend(base: &Image, overlay: &Image, alpha: f64) -> OpResult<Image> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(OpError::InvalidParameter(format!(
            "blend alpha {} is outside [0, 1]",
            alpha
        )));
    }

    let a = base.as_dynamic();
    let b = overlay.as_dynamic();
    layout(a)?;

    if base.dimensions() != overlay.dimensions() {
        return Err(OpError::NotApplicable(format!(
            "cannot blend {}x{} with {}x{}",
            base.width(),
            base.height(),
            overlay.width(),
            overlay.height()
        )));
    }
    if a.color() != b.color() {
        return Err(OpError::NotApplicable(format!(
            "cannot blend {:?} with {:?}",
            a.color(),
            b.color()
        )));
    }

    let bytes = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .map(|(&x, &y)| {
            (alpha * x as f64 + (1.0 - alpha) * y as f64)
                .round()
                .clamp(0.0, 255.0) as u8
        })
        .collect();

    rebuild_like(a, bytes)
}
