//! Single-channel float grids and the channel split/merge helpers around them.
//!
//! Every stage of the pipeline works on one channel at a time. Multi-channel
//! images are handled as a list of planes, so 1- and 3-channel inputs run
//! through the same code.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// A dense row-major grid of `f32` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Plane {
    /// Create a zero-filled plane.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Wrap existing row-major data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height`.
    #[must_use]
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), width * height, "plane data does not match size");
        Self {
            width,
            height,
            data,
        }
    }

    /// Build a plane by evaluating `f(x, y)` at every position.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in samples.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in samples.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at `(x, y)`.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Overwrite the value at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    /// Row `y` as a slice.
    #[must_use]
    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Raw row-major samples.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw row-major samples.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Element-wise `self * weight`.
    #[must_use]
    pub fn scaled_by(&self, weight: &Plane) -> Plane {
        debug_assert_eq!(self.data.len(), weight.data.len());
        self.zip_with(weight, |a, b| a * b)
    }

    /// Element-wise `self + other`.
    #[must_use]
    pub fn plus(&self, other: &Plane) -> Plane {
        debug_assert_eq!(self.data.len(), other.data.len());
        self.zip_with(other, |a, b| a + b)
    }

    fn zip_with(&self, other: &Plane, f: impl Fn(f32, f32) -> f32) -> Plane {
        Plane {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    /// Copy with every sample off the outermost ring set to zero.
    #[must_use]
    pub fn with_interior_zeroed(&self) -> Plane {
        let mut out = self.clone();
        for y in 1..self.height.saturating_sub(1) {
            for x in 1..self.width.saturating_sub(1) {
                out.set(x, y, 0.0);
            }
        }
        out
    }

    /// The `(width - 2) x (height - 2)` block inside the outermost ring.
    #[must_use]
    pub fn interior(&self) -> Plane {
        let w = self.width.saturating_sub(2);
        let h = self.height.saturating_sub(2);
        Plane::from_fn(w, h, |x, y| self.get(x + 1, y + 1))
    }

    /// Swap rows and columns.
    #[must_use]
    pub fn transpose(&self) -> Plane {
        Plane::from_fn(self.height, self.width, |x, y| self.get(y, x))
    }
}

impl From<&GrayImage> for Plane {
    fn from(img: &GrayImage) -> Self {
        Plane {
            width: img.width() as usize,
            height: img.height() as usize,
            data: img.as_raw().iter().map(|&v| f32::from(v)).collect(),
        }
    }
}

/// Split an RGB image into its three channels.
#[must_use]
pub fn split_rgb(img: &RgbImage) -> Vec<GrayImage> {
    (0..3)
        .map(|c| GrayImage::from_fn(img.width(), img.height(), |x, y| Luma([img.get_pixel(x, y)[c]])))
        .collect()
}

/// Merge three channels back into an RGB image.
///
/// # Panics
///
/// Panics if `channels` does not hold exactly three equally sized planes.
#[must_use]
pub fn merge_rgb(channels: &[GrayImage]) -> RgbImage {
    assert_eq!(channels.len(), 3, "merge_rgb needs three channels");
    let (w, h) = channels[0].dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        Rgb([
            channels[0].get_pixel(x, y)[0],
            channels[1].get_pixel(x, y)[0],
            channels[2].get_pixel(x, y)[0],
        ])
    })
}
