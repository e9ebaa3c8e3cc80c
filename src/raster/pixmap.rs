//! Conversions between `image` buffers and `vello_cpu` pixmaps.

use image::{ColorType, DynamicImage, GenericImageView as _};

use crate::{
    foundation::error::{StillreelError, StillreelResult},
    raster::io::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place},
};

/// Render target size; `vello_cpu` addresses pixmaps with `u16` dimensions.
pub(crate) fn canvas_size(width: u32, height: u32) -> StillreelResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StillreelError::image("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StillreelError::image("image height exceeds u16"))?;
    Ok((w, h))
}

/// RGBA8 premultiplied copy of `img`.
pub(crate) fn image_to_premul_rgba8(img: &DynamicImage) -> Vec<u8> {
    let mut rgba = img.to_rgba8().into_raw();
    premultiply_rgba8_in_place(&mut rgba);
    rgba
}

pub(crate) fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StillreelResult<vello_cpu::Pixmap> {
    let (w, h) = canvas_size(width, height)?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StillreelError::image("premultiplied byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

/// Paint that draws `img` with its top-left corner at the origin.
pub(crate) fn image_paint(img: &DynamicImage) -> StillreelResult<vello_cpu::Image> {
    let (width, height) = img.dimensions();
    let pixmap = image_premul_bytes_to_pixmap(&image_to_premul_rgba8(img), width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

/// Turn a premultiplied RGBA8 buffer back into an image of `color`.
///
/// Without an alpha channel in `color`, partially covered pixels keep their
/// premultiplied value, which is the same as compositing over black.
pub(crate) fn premul_rgba8_to_image(
    mut rgba8_premul: Vec<u8>,
    width: u32,
    height: u32,
    color: ColorType,
) -> StillreelResult<DynamicImage> {
    if color.has_alpha() {
        unpremultiply_rgba8_in_place(&mut rgba8_premul);
    } else {
        for px in rgba8_premul.chunks_exact_mut(4) {
            px[3] = 255;
        }
    }
    let rgba = image::RgbaImage::from_raw(width, height, rgba8_premul)
        .ok_or_else(|| StillreelError::image("rendered buffer size mismatch"))?;
    Ok(convert_to_color_type(DynamicImage::ImageRgba8(rgba), color))
}

/// Convert `img` to `color`, leaving it alone for color types `image` has no
/// buffer variant for.
pub(crate) fn convert_to_color_type(img: DynamicImage, color: ColorType) -> DynamicImage {
    if img.color() == color {
        return img;
    }
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(img.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(img.to_rgb8()),
        ColorType::Rgba8 => DynamicImage::ImageRgba8(img.to_rgba8()),
        ColorType::L16 => DynamicImage::ImageLuma16(img.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(img.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(img.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(img.to_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(img.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(img.to_rgba32f()),
        _ => img,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/pixmap.rs"]
mod tests;
