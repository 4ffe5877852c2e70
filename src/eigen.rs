//! Eigenvalues of the 1D second-difference operator under the sine basis.

use std::f32::consts::PI;

use crate::error::{Error, Result};

/// Per-axis cosine terms for an image of a given size.
///
/// The 5-point Laplacian on the `(w - 2) x (h - 2)` interior has eigenvalue
/// `filter_x[i] + filter_y[j] - 4` for sine mode `(i, j)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenvalueTable {
    width: usize,
    height: usize,
    filter_x: Vec<f32>,
    filter_y: Vec<f32>,
}

impl EigenvalueTable {
    /// Build the table for a `width x height` image.
    ///
    /// Sizes of 2 or less on an axis produce an empty axis; callers reject
    /// those before solving.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            filter_x: axis(width),
            filter_y: axis(height),
        }
    }

    /// Image width this table was built for.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height this table was built for.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `2 cos(pi (i + 1) / (w - 1))` for `i in 0..w - 2`.
    #[must_use]
    pub fn filter_x(&self) -> &[f32] {
        &self.filter_x
    }

    /// `2 cos(pi (j + 1) / (h - 1))` for `j in 0..h - 2`.
    #[must_use]
    pub fn filter_y(&self) -> &[f32] {
        &self.filter_y
    }

    /// Laplacian eigenvalue for mode `(i, j)`.
    #[must_use]
    pub fn eigenvalue(&self, i: usize, j: usize) -> f32 {
        self.filter_x[i] + self.filter_y[j] - 4.0
    }

    /// Check ahead of time that no eigenvalue is zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageTooSmall`] for an empty axis and
    /// [`Error::DegenerateSystem`] for the first zero eigenvalue found.
    pub fn check_well_posed(&self) -> Result<()> {
        if self.filter_x.is_empty() || self.filter_y.is_empty() {
            return Err(Error::ImageTooSmall {
                width: u32::try_from(self.width).unwrap_or(u32::MAX),
                height: u32::try_from(self.height).unwrap_or(u32::MAX),
            });
        }
        for j in 0..self.filter_y.len() {
            for i in 0..self.filter_x.len() {
                if is_degenerate(self.eigenvalue(i, j)) {
                    return Err(Error::DegenerateSystem { x: i, y: j });
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn is_degenerate(eigenvalue: f32) -> bool {
    eigenvalue == 0.0 || !eigenvalue.is_finite()
}

#[allow(clippy::cast_precision_loss)]
fn axis(len: usize) -> Vec<f32> {
    if len <= 2 {
        return Vec::new();
    }
    let denom = (len - 1) as f32;
    (0..len - 2)
        .map(|i| 2.0 * (PI * (i + 1) as f32 / denom).cos())
        .collect()
}
