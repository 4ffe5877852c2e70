//! Finite-difference operators.
//!
//! Gradients use the forward kernel `[-1, 1]`:
//! `gx(x, y) = v(x + 1, y) - v(x, y)`, zero in the last column (and the
//! last row for `gy`). Divergences apply the backward kernel to a gradient:
//! `dx(x, y) = g(x, y) - g(x - 1, y)` with an implicit zero at `x = -1`.
//!
//! Only interior samples of a divergence feed the solver, so the edge
//! conventions above never reach the solution itself.

use crate::plane::Plane;

/// Number of planes in a [`GradientField`]. Gray input is replicated up to it.
pub const FIELD_CHANNELS: usize = 3;

/// Per-channel derivative of an image along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientField {
    planes: Vec<Plane>,
}

impl GradientField {
    /// The per-channel planes, always [`FIELD_CHANNELS`] of them.
    #[must_use]
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Channel `c`.
    #[must_use]
    pub fn plane(&self, c: usize) -> &Plane {
        &self.planes[c]
    }

    /// Weight every channel by the single-channel `weight` plane.
    #[must_use]
    pub fn weighted(&self, weight: &Plane) -> GradientField {
        GradientField {
            planes: self.planes.iter().map(|p| p.scaled_by(weight)).collect(),
        }
    }

    /// Channel-wise sum of two fields.
    #[must_use]
    pub fn sum(&self, other: &GradientField) -> GradientField {
        GradientField {
            planes: self
                .planes
                .iter()
                .zip(&other.planes)
                .map(|(a, b)| a.plus(b))
                .collect(),
        }
    }

    fn from_channels(channels: &[Plane], op: fn(&Plane) -> Plane) -> GradientField {
        let planes = match channels {
            [single] => {
                let g = op(single);
                vec![g; FIELD_CHANNELS]
            }
            _ => channels.iter().map(op).collect(),
        };
        GradientField { planes }
    }
}

/// Horizontal forward difference of every channel.
#[must_use]
pub fn gradient_x(channels: &[Plane]) -> GradientField {
    GradientField::from_channels(channels, forward_x)
}

/// Vertical forward difference of every channel.
#[must_use]
pub fn gradient_y(channels: &[Plane]) -> GradientField {
    GradientField::from_channels(channels, forward_y)
}

/// Horizontal backward difference of one gradient plane.
#[must_use]
pub fn divergence_x(field: &Plane) -> Plane {
    Plane::from_fn(field.width(), field.height(), |x, y| {
        let prev = if x == 0 { 0.0 } else { field.get(x - 1, y) };
        field.get(x, y) - prev
    })
}

/// Vertical backward difference of one gradient plane.
#[must_use]
pub fn divergence_y(field: &Plane) -> Plane {
    Plane::from_fn(field.width(), field.height(), |x, y| {
        let prev = if y == 0 { 0.0 } else { field.get(x, y - 1) };
        field.get(x, y) - prev
    })
}

/// 5-point Laplacian `[0 1 0; 1 -4 1; 0 1 0]` with zero padding.
#[must_use]
pub fn laplacian(plane: &Plane) -> Plane {
    let (w, h) = (plane.width(), plane.height());
    Plane::from_fn(w, h, |x, y| {
        let mut sum = -4.0 * plane.get(x, y);
        if x > 0 {
            sum += plane.get(x - 1, y);
        }
        if x + 1 < w {
            sum += plane.get(x + 1, y);
        }
        if y > 0 {
            sum += plane.get(x, y - 1);
        }
        if y + 1 < h {
            sum += plane.get(x, y + 1);
        }
        sum
    })
}

fn forward_x(plane: &Plane) -> Plane {
    let w = plane.width();
    Plane::from_fn(w, plane.height(), |x, y| {
        if x + 1 < w {
            plane.get(x + 1, y) - plane.get(x, y)
        } else {
            0.0
        }
    })
}

fn forward_y(plane: &Plane) -> Plane {
    let h = plane.height();
    Plane::from_fn(plane.width(), h, |x, y| {
        if y + 1 < h {
            plane.get(x, y + 1) - plane.get(x, y)
        } else {
            0.0
        }
    })
}
