//! Builds the right-hand side of the Poisson equation for a normal clone.
//!
//! Inside the (eroded) mask the composite gradient comes from the patch,
//! outside it from the destination. Its divergence, minus the Laplacian
//! contribution of the fixed border ring, is what the solver inverts.

use image::{GrayImage, Luma};

use crate::derivative::{self, GradientField};
use crate::plane::Plane;

/// Shrink the foreground of `mask` with a 3x3 minimum filter, `iterations` times.
///
/// Samples outside the image are ignored, so the image edge does not erode
/// the mask.
#[must_use]
pub fn erode(mask: &GrayImage, iterations: u32) -> GrayImage {
    let (w, h) = mask.dimensions();
    let mut current = mask.clone();
    for _ in 0..iterations {
        let src = current;
        current = GrayImage::from_fn(w, h, |x, y| {
            let mut min = u8::MAX;
            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    min = min.min(src.get_pixel(nx, ny)[0]);
                }
            }
            Luma([min])
        });
    }
    current
}

/// Foreground and background weights derived from an eroded mask.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskWeights {
    /// `mask / 255`.
    pub foreground: Plane,
    /// `(255 - mask) / 255`.
    pub background: Plane,
}

impl MaskWeights {
    /// Normalize an (already eroded) mask.
    #[must_use]
    pub fn new(mask: &GrayImage) -> Self {
        let (w, h) = (mask.width() as usize, mask.height() as usize);
        let normalized = |f: fn(u8) -> u8| {
            Plane::from_vec(
                w,
                h,
                mask.as_raw().iter().map(|&v| f32::from(f(v)) / 255.0).collect(),
            )
        };
        Self {
            foreground: normalized(|v| v),
            background: normalized(|v| u8::MAX - v),
        }
    }
}

/// Blend destination and patch gradients under the mask weights.
#[must_use]
pub fn composite_gradient(
    destination: &GradientField,
    patch: &GradientField,
    weights: &MaskWeights,
) -> GradientField {
    destination
        .weighted(&weights.background)
        .sum(&patch.weighted(&weights.foreground))
}

/// Per-channel interior right-hand sides for cloning `patch` into `destination`.
///
/// Returns one `(w - 2) x (h - 2)` plane per destination channel. Callers are
/// expected to have validated that all inputs share one size larger than 2x2
/// and that `patch` has as many channels as `destination`.
#[must_use]
pub fn divergence(
    destination: &[Plane],
    patch: &[Plane],
    mask: &GrayImage,
    erosion_iterations: u32,
) -> Vec<Plane> {
    let eroded = erode(mask, erosion_iterations);
    let weights = MaskWeights::new(&eroded);

    let grad_x = composite_gradient(
        &derivative::gradient_x(destination),
        &derivative::gradient_x(patch),
        &weights,
    );
    let grad_y = composite_gradient(
        &derivative::gradient_y(destination),
        &derivative::gradient_y(patch),
        &weights,
    );

    destination
        .iter()
        .enumerate()
        .map(|(c, dest)| {
            let lap = derivative::divergence_x(grad_x.plane(c))
                .plus(&derivative::divergence_y(grad_y.plane(c)));
            boundary_corrected(&lap, dest)
        })
        .collect()
}

/// Subtract the border ring's contribution and keep the interior block.
fn boundary_corrected(lap: &Plane, destination: &Plane) -> Plane {
    let boundary = derivative::laplacian(&destination.with_interior_zeroed());
    Plane::from_fn(
        lap.width().saturating_sub(2),
        lap.height().saturating_sub(2),
        |x, y| lap.get(x + 1, y + 1) - boundary.get(x + 1, y + 1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mask(size: u32, lo: u32, hi: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (lo..hi).contains(&x) && (lo..hi).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    fn foreground_count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p[0] == 255).count()
    }

    #[test]
    fn erosion_shrinks_square_by_one_per_iteration() {
        let mask = square_mask(20, 4, 16); // 12x12
        assert_eq!(foreground_count(&erode(&mask, 1)), 10 * 10);
        assert_eq!(foreground_count(&erode(&mask, 3)), 6 * 6);
    }

    #[test]
    fn erosion_zero_iterations_is_identity() {
        let mask = square_mask(10, 2, 7);
        assert_eq!(erode(&mask, 0), mask);
    }

    #[test]
    fn erosion_ignores_image_edge() {
        let full = GrayImage::from_pixel(8, 8, Luma([255]));
        assert_eq!(erode(&full, 3), full);
    }

    #[test]
    fn erosion_removes_thin_features() {
        let mut mask = GrayImage::new(9, 9);
        for x in 0..9 {
            mask.put_pixel(x, 4, Luma([255]));
        }
        assert_eq!(foreground_count(&erode(&mask, 1)), 0);
    }

    #[test]
    fn mask_weights_are_complementary() {
        let mask = GrayImage::from_fn(4, 1, |x, _| Luma([[0, 51, 255, 128][x as usize]]));
        let w = MaskWeights::new(&mask);
        for x in 0..4 {
            let sum = w.foreground.get(x, 0) + w.background.get(x, 0);
            assert!((sum - 1.0).abs() < 1e-6);
        }
        assert!((w.foreground.get(1, 0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn divergence_has_interior_size_per_channel() {
        let dest: Vec<Plane> = (0..3).map(|_| Plane::new(9, 7)).collect();
        let patch = dest.clone();
        let mask = GrayImage::new(9, 7);
        let div = divergence(&dest, &patch, &mask, 3);
        assert_eq!(div.len(), 3);
        for p in &div {
            assert_eq!((p.width(), p.height()), (7, 5));
        }
    }

    #[test]
    fn empty_mask_gives_destination_laplacian() {
        #[allow(clippy::cast_precision_loss)]
        let dest = Plane::from_fn(8, 8, |x, y| ((x * 7 + y * 13) % 50) as f32);
        let patch = Plane::from_vec(8, 8, vec![200.0; 64]);
        let mask = GrayImage::new(8, 8);
        let div = divergence(std::slice::from_ref(&dest), &[patch], &mask, 3);

        // With the border subtracted, only the interior Laplacian remains.
        let expected = derivative::laplacian(&dest).interior();
        let border = derivative::laplacian(&dest.with_interior_zeroed()).interior();
        for y in 0..6 {
            for x in 0..6 {
                let want = expected.get(x, y) - border.get(x, y);
                assert!((div[0].get(x, y) - want).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn full_mask_ignores_destination_gradient() {
        let dest = Plane::from_fn(6, 6, |x, _| if x < 3 { 0.0 } else { 100.0 });
        let patch = Plane::from_vec(6, 6, vec![50.0; 36]);
        let mask = GrayImage::from_pixel(6, 6, Luma([255]));
        let div = divergence(&[dest.clone()], &[patch], &mask, 3);
        let border = derivative::laplacian(&dest.with_interior_zeroed()).interior();
        for (got, b) in div[0].as_slice().iter().zip(border.as_slice()) {
            assert!((got + b).abs() < 1e-4);
        }
    }
}
