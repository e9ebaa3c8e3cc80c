use std::path::Path;

use image::{DynamicImage, GenericImageView as _, imageops::FilterType};

use crate::{
    encode::ffmpeg::ensure_parent_dir,
    foundation::error::StillreelResult,
    raster::{
        io::{open_image, save_image},
        pixmap::{canvas_size, image_paint, premul_rgba8_to_image},
    },
};

pub const ROTATE_DEGREES: f64 = 45.0;
pub const RESIZE_WIDTH: u32 = 640;
pub const RESIZE_HEIGHT: u32 = 480;

/// The closed set of image transformations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transformation {
    /// Single-channel 8-bit luminance.
    Grayscale,
    /// Counter-clockwise rotation about the center; canvas size is kept and
    /// uncovered corners are filled with zero (black, or transparent with alpha).
    /// Resampled bilinearly.
    Rotate { degrees: f64 },
    /// Exact resize, aspect ratio ignored.
    Resize { width: u32, height: u32 },
}

impl Transformation {
    /// Map a configuration name to a transformation. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "grayscale" => Some(Self::Grayscale),
            "rotate" => Some(Self::Rotate {
                degrees: ROTATE_DEGREES,
            }),
            "resize" => Some(Self::Resize {
                width: RESIZE_WIDTH,
                height: RESIZE_HEIGHT,
            }),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Rotate { .. } => "rotate",
            Self::Resize { .. } => "resize",
        }
    }

    pub fn apply_to(&self, img: &DynamicImage) -> StillreelResult<DynamicImage> {
        Ok(match *self {
            Self::Grayscale => DynamicImage::ImageLuma8(img.to_luma8()),
            Self::Rotate { degrees } => rotate_about_center(img, degrees)?,
            Self::Resize { width, height } => {
                img.resize_exact(width, height, FilterType::CatmullRom)
            }
        })
    }
}

/// Result of [`apply_transformation`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformOutcome {
    Applied(Transformation),
    /// No transformation was requested; the output is the input file unchanged.
    PassedThrough,
}

/// Apply `transformation` to the image at `input` and write it to `out`.
///
/// `input` and `out` may be the same path. With `None` the file is passed through
/// byte for byte (copied, or left alone when the paths name the same file).
#[tracing::instrument]
pub fn apply_transformation(
    input: &Path,
    transformation: Option<Transformation>,
    out: &Path,
) -> StillreelResult<TransformOutcome> {
    let Some(t) = transformation else {
        if !same_file(input, out) {
            use anyhow::Context as _;
            ensure_parent_dir(out)?;
            std::fs::copy(input, out).with_context(|| {
                format!("copy '{}' to '{}'", input.display(), out.display())
            })?;
        }
        return Ok(TransformOutcome::PassedThrough);
    };

    let img = open_image(input)?;
    let transformed = t.apply_to(&img)?;
    save_image(&transformed, out)?;
    tracing::info!(
        transformation = t.name(),
        width = transformed.width(),
        height = transformed.height(),
        "transformation applied"
    );
    Ok(TransformOutcome::Applied(t))
}

/// Like [`apply_transformation`], selecting the transformation by name.
///
/// Unrecognized names are not an error: the image passes through unchanged.
pub fn apply_named_transformation(
    input: &Path,
    name: &str,
    out: &Path,
) -> StillreelResult<TransformOutcome> {
    let transformation = Transformation::from_name(name);
    if transformation.is_none() {
        tracing::warn!(
            name,
            "unrecognized transformation, passing image through unchanged"
        );
    }
    apply_transformation(input, transformation, out)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Paint `img` onto a same-size transparent canvas rotated `degrees`
/// counter-clockwise about its center, then map back to the source color type.
fn rotate_about_center(img: &DynamicImage, degrees: f64) -> StillreelResult<DynamicImage> {
    let (width, height) = img.dimensions();
    let (w, h) = canvas_size(width, height)?;
    let paint = image_paint(img)?;

    // y points down, so a negative angle turns counter-clockwise on screen.
    let center = vello_cpu::kurbo::Point::new(f64::from(width) / 2.0, f64::from(height) / 2.0);
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(vello_cpu::kurbo::Affine::rotate_about(
        -degrees.to_radians(),
        center,
    ));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(width),
        f64::from(height),
    ));
    ctx.flush();

    let mut target = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut target);

    premul_rgba8_to_image(
        target.data_as_u8_slice().to_vec(),
        width,
        height,
        img.color(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/raster/transform.rs"]
mod tests;
