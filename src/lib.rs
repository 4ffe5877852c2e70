//! Gradient-domain seamless cloning.
//!
//! A patch is pasted into a destination image by matching the patch's
//! gradients inside a mask while keeping the destination's outer border
//! fixed. The resulting Poisson equation is solved per channel with a
//! discrete sine transform, so the solve costs `O(wh log(wh))`.
//!
//! # Quick Start
//!
//! ```no_run
//! use seamless_clone::{place_patch, CloneEngine, CloneOptions};
//!
//! let source = image::open("source.jpg").unwrap();
//! let mask = image::open("mask.png").unwrap();
//! let destination = image::open("destination.jpg").unwrap().to_rgb8();
//!
//! let placed = place_patch(&source, &mask, destination.dimensions(), Some((800, 600))).unwrap();
//! let engine = CloneEngine::new(CloneOptions::default());
//! let blended = engine
//!     .normal_clone(
//!         &destination.into(),
//!         &placed.patch.into(),
//!         &placed.mask.into(),
//!     )
//!     .unwrap();
//! blended.save("blend.png").unwrap();
//! ```
//!
//! # Pipeline
//!
//! 1. [`derivative`]: forward-difference gradients of destination and patch.
//! 2. [`compositor`]: erode the mask, blend the gradients, take the divergence
//!    and subtract the fixed border's contribution.
//! 3. [`solver`]: sine-transform ([`dst`]), divide by the Laplacian
//!    eigenvalues ([`eigen`]), transform back, clamp and truncate to 8 bits.

#![deny(missing_docs)]

pub mod compositor;
pub mod derivative;
pub mod dst;
pub mod eigen;
mod engine;
pub mod error;
pub mod placement;
pub mod plane;
pub mod solver;

pub use engine::{
    default_output_path, is_supported_image, normal_clone, save_image, CloneEngine, CloneOptions,
    ProcessOptions, ProcessResult, DEFAULT_EROSION_ITERATIONS,
};
pub use error::{Error, Result};
pub use placement::{place_patch, Placement};
