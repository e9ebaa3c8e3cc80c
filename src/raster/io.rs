use std::{borrow::Cow, path::Path};

use image::{ColorType, DynamicImage, ImageFormat};

use crate::{
    encode::ffmpeg::ensure_parent_dir,
    foundation::error::{StillreelError, StillreelResult},
};

pub fn open_image(path: &Path) -> StillreelResult<DynamicImage> {
    image::open(path).map_err(|e| {
        StillreelError::image(format!("failed to decode '{}': {e}", path.display()))
    })
}

/// Save `img` to `path`, format chosen from the extension.
///
/// JPEG has no alpha channel and no 16-bit mode, so such images are narrowed to
/// 8-bit luma or RGB first.
pub fn save_image(img: &DynamicImage, path: &Path) -> StillreelResult<()> {
    let format = ImageFormat::from_path(path).map_err(|e| {
        StillreelError::image(format!(
            "cannot pick an image format for '{}': {e}",
            path.display()
        ))
    })?;

    let encodable: Cow<'_, DynamicImage> = match (format, img.color()) {
        (ImageFormat::Jpeg, ColorType::L8 | ColorType::Rgb8) => Cow::Borrowed(img),
        (ImageFormat::Jpeg, ColorType::La8 | ColorType::L16 | ColorType::La16) => {
            Cow::Owned(DynamicImage::ImageLuma8(img.to_luma8()))
        }
        (ImageFormat::Jpeg, _) => Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8())),
        _ => Cow::Borrowed(img),
    };

    ensure_parent_dir(path)?;
    encodable.save_with_format(path, format).map_err(|e| {
        StillreelError::image(format!("failed to write '{}': {e}", path.display()))
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/io.rs"]
mod tests;
