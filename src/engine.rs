//! Cloning engine: validation, per-channel fan-out, and file helpers.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use image::{DynamicImage, GrayImage, ImageFormat};

use crate::compositor;
use crate::eigen::EigenvalueTable;
use crate::error::{ensure_same_size, Error, Result};
use crate::placement;
use crate::plane::{merge_rgb, split_rgb, Plane};
use crate::solver;

/// Default number of 3x3 erosions applied to the mask before blending.
pub const DEFAULT_EROSION_ITERATIONS: u32 = 3;

/// Options controlling a clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneOptions {
    /// How many times the mask is eroded with a 3x3 element. Zero disables erosion.
    pub erosion_iterations: u32,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            erosion_iterations: DEFAULT_EROSION_ITERATIONS,
        }
    }
}

/// Options controlling file processing.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Options forwarded to the engine.
    pub clone_options: CloneOptions,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Result of processing one set of input files.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the written (or attempted) output.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
}

/// The cloning engine.
///
/// Create once and reuse: the eigenvalue table for the most recent image size
/// is cached and shared between channels and calls.
#[derive(Debug, Default)]
pub struct CloneEngine {
    options: CloneOptions,
    eigen_cache: Mutex<Option<Arc<EigenvalueTable>>>,
}

impl CloneEngine {
    /// Create an engine with the given options.
    #[must_use]
    pub fn new(options: CloneOptions) -> Self {
        Self {
            options,
            eigen_cache: Mutex::new(None),
        }
    }

    /// Options this engine was built with.
    #[must_use]
    pub fn options(&self) -> CloneOptions {
        self.options
    }

    /// Eigenvalue table for a `width x height` image, built at most once per size.
    #[must_use]
    pub fn eigenvalues(&self, width: usize, height: usize) -> Arc<EigenvalueTable> {
        let mut cache = self
            .eigen_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = cache.as_ref() {
            if table.width() == width && table.height() == height {
                log::trace!("eigenvalue table cache hit for {width}x{height}");
                return Arc::clone(table);
            }
        }
        log::debug!("building eigenvalue table for {width}x{height}");
        let table = Arc::new(EigenvalueTable::new(width, height));
        *cache = Some(Arc::clone(&table));
        table
    }

    /// Seamlessly clone `patch` into `destination` where `mask` is set.
    ///
    /// `destination` must be 8-bit gray or RGB; the output has the same
    /// layout. `patch` is converted to the destination's layout. `mask` must
    /// be 8-bit gray or RGB (reduced to luma) with values 0 or 255.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedChannels`] or [`Error::MaskChannels`] for
    /// unusable layouts, plus any error of [`CloneEngine::clone_channels`].
    pub fn normal_clone(
        &self,
        destination: &DynamicImage,
        patch: &DynamicImage,
        mask: &DynamicImage,
    ) -> Result<DynamicImage> {
        let mask = placement::mask_to_gray(mask)?;
        match destination {
            DynamicImage::ImageLuma8(dest) => {
                let patch = patch.to_luma8();
                let mut out = self.clone_channels(
                    std::slice::from_ref(dest),
                    std::slice::from_ref(&patch),
                    &mask,
                )?;
                Ok(DynamicImage::ImageLuma8(out.remove(0)))
            }
            DynamicImage::ImageRgb8(dest) => {
                let out = self.clone_channels(
                    &split_rgb(dest),
                    &split_rgb(&patch.to_rgb8()),
                    &mask,
                )?;
                Ok(DynamicImage::ImageRgb8(merge_rgb(&out)))
            }
            other => Err(Error::UnsupportedChannels {
                input: "destination",
                layout: format!("{:?}", other.color()),
            }),
        }
    }

    /// Clone over explicit channel lists.
    ///
    /// `destination` and `patch` hold one gray image per channel (1 or 3 of
    /// them, equal counts). Channels are solved independently and returned in
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedChannels`] for bad channel counts,
    /// [`Error::DimensionMismatch`] if any plane or the mask differs in size,
    /// [`Error::ImageTooSmall`] if an axis is 2 pixels or less, and
    /// [`Error::DegenerateSystem`] if the solve has no unique solution.
    pub fn clone_channels(
        &self,
        destination: &[GrayImage],
        patch: &[GrayImage],
        mask: &GrayImage,
    ) -> Result<Vec<GrayImage>> {
        let size = validate(destination, patch, mask)?;
        let table = self.eigenvalues(size.0 as usize, size.1 as usize);
        table.check_well_posed()?;

        log::debug!(
            "cloning {}x{} image with {} channel(s), erosion {}",
            size.0,
            size.1,
            destination.len(),
            self.options.erosion_iterations
        );

        let dest_planes: Vec<Plane> = destination.iter().map(Plane::from).collect();
        let patch_planes: Vec<Plane> = patch.iter().map(Plane::from).collect();
        let rhs = compositor::divergence(
            &dest_planes,
            &patch_planes,
            mask,
            self.options.erosion_iterations,
        );

        let solve_channel = |(c, (dest, f)): (usize, (&GrayImage, &Plane))| {
            let solved = solver::solve(dest, f, &table);
            log::trace!("channel {c} solved");
            solved
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            destination
                .par_iter()
                .zip(rhs.par_iter())
                .enumerate()
                .map(solve_channel)
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            destination
                .iter()
                .zip(rhs.iter())
                .enumerate()
                .map(solve_channel)
                .collect()
        }
    }

    /// Load source, destination and mask files, place, clone, and save.
    ///
    /// Returns a [`ProcessResult`] describing success or failure; never panics.
    #[must_use]
    pub fn process_files(
        &self,
        source: &Path,
        destination: &Path,
        mask: &Path,
        anchor: Option<(i64, i64)>,
        output: &Path,
    ) -> ProcessResult {
        let mut result = ProcessResult {
            path: output.to_path_buf(),
            success: false,
            message: String::new(),
        };

        match self.run_files(source, destination, mask, anchor, output) {
            Ok(()) => {
                result.success = true;
                result.message = "Cloned".to_string();
            }
            Err(e) => {
                result.message = e.to_string();
            }
        }

        result
    }

    fn run_files(
        &self,
        source: &Path,
        destination: &Path,
        mask: &Path,
        anchor: Option<(i64, i64)>,
        output: &Path,
    ) -> Result<()> {
        let source = image::open(source)?;
        let mask = image::open(mask)?;
        let destination = image::open(destination)?;
        // Files with alpha or 16-bit samples are flattened to the supported layouts.
        let destination = if is_gray_or_rgb8(&destination) {
            destination
        } else {
            DynamicImage::ImageRgb8(destination.to_rgb8())
        };
        let mask = if is_gray_or_rgb8(&mask) {
            mask
        } else {
            DynamicImage::ImageLuma8(mask.to_luma8())
        };

        let placed = placement::place_patch(
            &source,
            &mask,
            (destination.width(), destination.height()),
            anchor,
        )?;
        let blended = self.normal_clone(
            &destination,
            &DynamicImage::ImageRgb8(placed.patch),
            &DynamicImage::ImageLuma8(placed.mask),
        )?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        save_image(&blended, output)
    }
}

/// Clone with a default engine. See [`CloneEngine::normal_clone`].
///
/// # Errors
///
/// Same as [`CloneEngine::normal_clone`].
pub fn normal_clone(
    destination: &DynamicImage,
    patch: &DynamicImage,
    mask: &DynamicImage,
) -> Result<DynamicImage> {
    CloneEngine::default().normal_clone(destination, patch, mask)
}

fn is_gray_or_rgb8(img: &DynamicImage) -> bool {
    matches!(img, DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_))
}

fn validate(destination: &[GrayImage], patch: &[GrayImage], mask: &GrayImage) -> Result<(u32, u32)> {
    if !matches!(destination.len(), 1 | 3) {
        return Err(Error::UnsupportedChannels {
            input: "destination",
            layout: format!("{} channels", destination.len()),
        });
    }
    if patch.len() != destination.len() {
        return Err(Error::UnsupportedChannels {
            input: "patch",
            layout: format!("{} channels for a {}-channel destination", patch.len(), destination.len()),
        });
    }

    let size = destination[0].dimensions();
    for d in &destination[1..] {
        ensure_same_size("destination channel", size, d.dimensions())?;
    }
    for p in patch {
        ensure_same_size("patch", size, p.dimensions())?;
    }
    ensure_same_size("mask", size, mask.dimensions())?;

    if size.0 <= 2 || size.1 <= 2 {
        return Err(Error::ImageTooSmall {
            width: size.0,
            height: size.1,
        });
    }
    Ok(size)
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Save an image with format-specific quality settings.
///
/// # Errors
///
/// Returns an error if the format is unsupported or writing fails.
pub fn save_image(img: &DynamicImage, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, 100);
            encoder.encode_image(img)?;
        }
        ImageFormat::Png | ImageFormat::Bmp => {
            img.save(path)?;
        }
        ImageFormat::WebP => {
            // The WebP encoder only takes 8-bit RGB(A).
            DynamicImage::ImageRgb8(img.to_rgb8()).save(path)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Generate a default output path from the destination path.
///
/// Example: `"beach.jpg"` becomes `"beach_blend.jpg"`.
#[must_use]
pub fn default_output_path(destination: &Path) -> PathBuf {
    let stem = destination.file_stem().unwrap_or_default().to_string_lossy();
    let ext = destination.extension().unwrap_or_default().to_string_lossy();
    let parent = destination.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_blend.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn gradient_rgb(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            Rgb([
                u8::try_from((x * 7 + y * 3) % 200).unwrap(),
                u8::try_from((x * 2 + y * 5) % 180 + 20).unwrap(),
                u8::try_from((x * y) % 150 + 50).unwrap(),
            ])
        })
    }

    fn centre_mask(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            if x > w / 4 && x < 3 * w / 4 && y > h / 4 && y < 3 * h / 4 {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn eigen_table_is_cached_per_size() {
        let engine = CloneEngine::default();
        let a = engine.eigenvalues(16, 9);
        let b = engine.eigenvalues(16, 9);
        assert!(Arc::ptr_eq(&a, &b));
        let c = engine.eigenvalues(9, 16);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!((c.width(), c.height()), (9, 16));
    }

    #[test]
    fn default_options_erode_three_times() {
        assert_eq!(CloneOptions::default().erosion_iterations, 3);
        assert_eq!(CloneEngine::default().options(), CloneOptions::default());
    }

    #[test]
    fn output_keeps_layout_and_size() {
        let dest = DynamicImage::ImageRgb8(gradient_rgb(24, 18));
        let patch = DynamicImage::ImageRgb8(RgbImage::from_pixel(24, 18, Rgb([200, 10, 90])));
        let mask = DynamicImage::ImageLuma8(centre_mask(24, 18));
        let out = normal_clone(&dest, &patch, &mask).unwrap();
        assert!(matches!(out, DynamicImage::ImageRgb8(_)));
        assert_eq!((out.width(), out.height()), (24, 18));

        let gray = DynamicImage::ImageLuma8(dest.to_luma8());
        let out = normal_clone(&gray, &patch, &mask).unwrap();
        assert!(matches!(out, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn rgba_destination_is_rejected() {
        let dest = DynamicImage::ImageRgba8(image::RgbaImage::new(8, 8));
        let mask = DynamicImage::ImageLuma8(GrayImage::new(8, 8));
        let err = normal_clone(&dest, &dest, &mask).unwrap_err();
        assert!(matches!(err, Error::UnsupportedChannels { input: "destination", .. }));
    }

    #[test]
    fn mismatched_sizes_are_rejected_before_solving() {
        let engine = CloneEngine::default();
        let dest = split_rgb(&gradient_rgb(10, 10));
        let patch = split_rgb(&gradient_rgb(10, 11));
        let err = engine
            .clone_channels(&dest, &patch, &GrayImage::new(10, 10))
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { input: "patch", .. }));

        let err = engine
            .clone_channels(&dest, &dest, &GrayImage::new(9, 10))
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { input: "mask", .. }));
    }

    #[test]
    fn channel_counts_are_checked() {
        let engine = CloneEngine::default();
        let planes = split_rgb(&gradient_rgb(6, 6));
        let mask = GrayImage::new(6, 6);
        assert!(matches!(
            engine.clone_channels(&planes[..2], &planes[..2], &mask),
            Err(Error::UnsupportedChannels { .. })
        ));
        assert!(matches!(
            engine.clone_channels(&planes, &planes[..1], &mask),
            Err(Error::UnsupportedChannels { input: "patch", .. })
        ));
    }

    #[test]
    fn tiny_images_are_rejected() {
        let engine = CloneEngine::default();
        let d = GrayImage::new(2, 50);
        let err = engine
            .clone_channels(std::slice::from_ref(&d), std::slice::from_ref(&d), &d)
            .unwrap_err();
        assert!(matches!(err, Error::ImageTooSmall { width: 2, height: 50 }));
    }

    #[test]
    fn default_output_path_appends_blend_suffix() {
        let p = default_output_path(Path::new("/tmp/beach.jpg"));
        assert_eq!(p, PathBuf::from("/tmp/beach_blend.jpg"));

        let p = default_output_path(Path::new("sky.png"));
        assert_eq!(p.file_name().unwrap().to_str().unwrap(), "sky_blend.png");
    }

    #[test]
    fn is_supported_image_accepts_common_formats() {
        assert!(is_supported_image(Path::new("photo.jpg")));
        assert!(is_supported_image(Path::new("photo.JPEG")));
        assert!(is_supported_image(Path::new("photo.png")));
        assert!(is_supported_image(Path::new("photo.webp")));
        assert!(is_supported_image(Path::new("photo.bmp")));
        assert!(!is_supported_image(Path::new("photo.gif")));
        assert!(!is_supported_image(Path::new("photo")));
    }

    #[test]
    fn save_image_rejects_unknown_extension() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        assert!(matches!(
            save_image(&img, Path::new("out.unknownext")),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
