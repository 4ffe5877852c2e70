//! Fast Poisson solve with Dirichlet boundary values.
//!
//! The interior of the destination is replaced by the solution of
//! `laplacian(u) = f`; the outermost ring of pixels is copied unchanged.

use image::{GrayImage, Luma};

use crate::dst::sine_transform;
use crate::eigen::{is_degenerate, EigenvalueTable};
use crate::error::{Error, Result};
use crate::plane::Plane;

/// Solve one channel.
///
/// `divergence` is the boundary-corrected right-hand side on the
/// `(w - 2) x (h - 2)` interior of `destination`. The returned channel keeps
/// the destination's border and holds the clamped, truncated solution inside.
///
/// # Errors
///
/// Returns [`Error::ImageTooSmall`] if `destination` has no interior,
/// [`Error::DimensionMismatch`] if `divergence` or `table` do not fit the
/// destination, and [`Error::DegenerateSystem`] if an eigenvalue is zero.
pub fn solve(
    destination: &GrayImage,
    divergence: &Plane,
    table: &EigenvalueTable,
) -> Result<GrayImage> {
    let (w, h) = destination.dimensions();
    if w <= 2 || h <= 2 {
        return Err(Error::ImageTooSmall {
            width: w,
            height: h,
        });
    }
    check_interior_size("divergence", (w, h), (divergence.width(), divergence.height()))?;
    check_interior_size(
        "eigenvalue table",
        (w, h),
        (table.filter_x().len(), table.filter_y().len()),
    )?;

    let mut coefficients = sine_transform(divergence, false);
    let cols = coefficients.width();
    for (idx, c) in coefficients.as_mut_slice().iter_mut().enumerate() {
        let (i, j) = (idx % cols, idx / cols);
        let eigenvalue = table.eigenvalue(i, j);
        if is_degenerate(eigenvalue) {
            return Err(Error::DegenerateSystem { x: i, y: j });
        }
        *c /= eigenvalue;
    }
    let interior = sine_transform(&coefficients, true);

    Ok(assemble(destination, &interior))
}

/// Convert a solved sample to 8 bits: clamp to `[0, 255]`, then truncate.
#[must_use]
pub fn quantize(value: f32) -> u8 {
    if value < 0.0 {
        0
    } else if value > 255.0 {
        255
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            value as u8
        }
    }
}

/// Destination border plus quantized interior.
pub(crate) fn assemble(destination: &GrayImage, interior: &Plane) -> GrayImage {
    let (w, h) = destination.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
            *destination.get_pixel(x, y)
        } else {
            Luma([quantize(interior.get(x as usize - 1, y as usize - 1))])
        }
    })
}

fn check_interior_size(
    input: &'static str,
    (w, h): (u32, u32),
    (actual_w, actual_h): (usize, usize),
) -> Result<()> {
    let expected = (w as usize - 2, h as usize - 2);
    if expected == (actual_w, actual_h) {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            input,
            expected_width: w - 2,
            expected_height: h - 2,
            actual_width: u32::try_from(actual_w).unwrap_or(u32::MAX),
            actual_height: u32::try_from(actual_h).unwrap_or(u32::MAX),
        })
    }
}
