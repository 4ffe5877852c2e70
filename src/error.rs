//! Error types for the seamless-clone crate.

/// Errors that can occur while placing, cloning, or saving images.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two inputs that must share a size do not.
    #[error("{input} is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        /// Which input was rejected (`"patch"`, `"mask"`, ...).
        input: &'static str,
        /// Width the input should have.
        expected_width: u32,
        /// Height the input should have.
        expected_height: u32,
        /// Width the input actually has.
        actual_width: u32,
        /// Height the input actually has.
        actual_height: u32,
    },

    /// The image has no interior to solve for (an axis of 2 pixels or fewer).
    #[error("image too small ({width}x{height}), both axes must exceed 2 pixels")]
    ImageTooSmall {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// Destination or patch is not an 8-bit image with 1 or 3 channels.
    #[error("unsupported {input} layout: {layout}, expected 8-bit gray or RGB")]
    UnsupportedChannels {
        /// Which input was rejected.
        input: &'static str,
        /// Description of the offending color layout.
        layout: String,
    },

    /// The mask cannot be reduced to a single 8-bit channel.
    #[error("mask cannot be reduced to a single channel: {0}")]
    MaskChannels(String),

    /// The discrete Laplacian has a zero eigenvalue at transform index `(x, y)`.
    #[error("degenerate Poisson system: zero eigenvalue at ({x}, {y})")]
    DegenerateSystem {
        /// Column index in transform space.
        x: usize,
        /// Row index in transform space.
        y: usize,
    },

    /// The placement mask contains no foreground (255) pixel.
    #[error("mask has no foreground pixels")]
    EmptyMask,

    /// The placed patch would extend past the destination.
    #[error(
        "patch {width}x{height} anchored at ({anchor_x}, {anchor_y}) leaves the {dest_width}x{dest_height} destination"
    )]
    PatchOutOfBounds {
        /// Patch width in pixels.
        width: u32,
        /// Patch height in pixels.
        height: u32,
        /// Anchor column in the destination.
        anchor_x: i64,
        /// Anchor row in the destination.
        anchor_y: i64,
        /// Destination width in pixels.
        dest_width: u32,
        /// Destination height in pixels.
        dest_height: u32,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Reject `actual` unless it has the `expected` size.
pub(crate) fn ensure_same_size(
    input: &'static str,
    expected: (u32, u32),
    actual: (u32, u32),
) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::DimensionMismatch {
            input,
            expected_width: expected.0,
            expected_height: expected.1,
            actual_width: actual.0,
            actual_height: actual.1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));

        let too_small = Error::ImageTooSmall {
            width: 2,
            height: 20,
        };
        assert!(too_small.to_string().contains("2x20"));

        let degenerate = Error::DegenerateSystem { x: 3, y: 4 };
        assert!(degenerate.to_string().contains("(3, 4)"));
    }

    #[test]
    fn ensure_same_size_reports_both_sizes() {
        assert!(ensure_same_size("mask", (10, 10), (10, 10)).is_ok());

        let err = ensure_same_size("mask", (10, 12), (8, 9)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("mask"));
        assert!(msg.contains("8x9"));
        assert!(msg.contains("10x12"));
    }
}
