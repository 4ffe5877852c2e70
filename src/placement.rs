//! Align a freestanding source image and mask onto the destination frame.
//!
//! The foreground of the mask (pixels equal to 255) is boxed, and that box of
//! the source is pasted into a destination-sized canvas centred on an anchor.

use image::{DynamicImage, GrayImage, RgbImage};

use crate::error::{ensure_same_size, Error, Result};

/// Foreground value marking patch pixels in a placement mask.
pub const FOREGROUND: u8 = 255;

/// Patch and mask already aligned with the destination.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Source pixels inside the placed rectangle (where the mask is set), zero elsewhere.
    pub patch: RgbImage,
    /// Source mask inside the placed rectangle, zero elsewhere.
    pub mask: GrayImage,
}

/// Inclusive bounding box of the `FOREGROUND` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Find the bounding box of the mask foreground, if any.
#[must_use]
pub fn foreground_bounds(mask: &GrayImage) -> Option<Bounds> {
    let mut min = (u32::MAX, u32::MAX);
    let mut max = (0u32, 0u32);
    let mut found = false;
    for (x, y, px) in mask.enumerate_pixels() {
        if px[0] == FOREGROUND {
            found = true;
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        }
    }
    found.then(|| Bounds {
        x: min.0,
        y: min.1,
        width: max.0 - min.0 + 1,
        height: max.1 - min.1 + 1,
    })
}

/// Reduce a mask to one 8-bit channel.
///
/// # Errors
///
/// Returns [`Error::MaskChannels`] for layouts other than 8-bit gray or RGB.
pub fn mask_to_gray(mask: &DynamicImage) -> Result<GrayImage> {
    match mask {
        DynamicImage::ImageLuma8(gray) => Ok(gray.clone()),
        DynamicImage::ImageRgb8(_) => Ok(mask.to_luma8()),
        other => Err(Error::MaskChannels(format!("{:?}", other.color()))),
    }
}

/// Place `source` onto a `dest_width x dest_height` canvas centred at `anchor`.
///
/// `anchor` is `(column, row)` in destination coordinates; `None` uses the
/// destination centre.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] if source and mask differ in size,
/// [`Error::MaskChannels`] for an unusable mask, [`Error::EmptyMask`] if the
/// mask has no foreground, and [`Error::PatchOutOfBounds`] if the placed box
/// does not fit inside the destination.
pub fn place_patch(
    source: &DynamicImage,
    mask: &DynamicImage,
    (dest_width, dest_height): (u32, u32),
    anchor: Option<(i64, i64)>,
) -> Result<Placement> {
    ensure_same_size(
        "mask",
        (source.width(), source.height()),
        (mask.width(), mask.height()),
    )?;
    let gray = mask_to_gray(mask)?;
    let bounds = foreground_bounds(&gray).ok_or(Error::EmptyMask)?;

    let (anchor_x, anchor_y) =
        anchor.unwrap_or((i64::from(dest_width / 2), i64::from(dest_height / 2)));
    let left = anchor_x - i64::from(bounds.width / 2);
    let top = anchor_y - i64::from(bounds.height / 2);
    let fits = left >= 0
        && top >= 0
        && left + i64::from(bounds.width) <= i64::from(dest_width)
        && top + i64::from(bounds.height) <= i64::from(dest_height);
    if !fits {
        return Err(Error::PatchOutOfBounds {
            width: bounds.width,
            height: bounds.height,
            anchor_x,
            anchor_y,
            dest_width,
            dest_height,
        });
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (left, top) = (left as u32, top as u32);

    let rgb = source.to_rgb8();
    let mut patch = RgbImage::new(dest_width, dest_height);
    let mut placed_mask = GrayImage::new(dest_width, dest_height);
    for dy in 0..bounds.height {
        for dx in 0..bounds.width {
            let m = *gray.get_pixel(bounds.x + dx, bounds.y + dy);
            placed_mask.put_pixel(left + dx, top + dy, m);
            if m[0] != 0 {
                patch.put_pixel(left + dx, top + dy, *rgb.get_pixel(bounds.x + dx, bounds.y + dy));
            }
        }
    }

    log::debug!(
        "placed {}x{} patch from ({}, {}) at ({left}, {top})",
        bounds.width,
        bounds.height,
        bounds.x,
        bounds.y
    );

    Ok(Placement {
        patch,
        mask: placed_mask,
    })
}
