//! Caption drawing: one line of black text, horizontally centered, near the top edge.

use std::path::Path;

use image::{DynamicImage, GenericImageView as _};

use crate::{
    foundation::error::StillreelResult,
    raster::{
        composite::over_in_place,
        font::{FontOrigin, FontRequest, TextBrushRgba8, TextLayoutEngine, resolve_font},
        io::{open_image, save_image},
        pixmap::{canvas_size, image_to_premul_rgba8, premul_rgba8_to_image},
    },
};

/// Distance between the top edge of the image and the top of the caption line.
pub const CAPTION_TOP_MARGIN_PX: f64 = 10.0;

/// Caption fill color.
pub const CAPTION_COLOR: TextBrushRgba8 = TextBrushRgba8::BLACK;

/// What [`overlay_caption`] drew.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayReport {
    pub width: u32,
    pub height: u32,
    /// Measured caption advance width in pixels.
    pub text_width: f32,
    /// Left edge of the caption; negative when the caption is wider than the image.
    pub origin_x: f64,
    /// `None` when the caption was empty and nothing was drawn.
    pub font: Option<FontOrigin>,
}

/// Left edge that centers a caption of `text_width` on an image of `image_width`.
pub fn caption_origin_x(image_width: u32, text_width: f32) -> f64 {
    (f64::from(image_width) / 2.0 - f64::from(text_width) / 2.0).floor()
}

/// Draw `caption` onto the image at `source` and write the result to `out`.
///
/// The output keeps the source dimensions and color type. `out` is overwritten
/// unconditionally.
#[tracing::instrument(skip(caption, font), fields(font_path = %font.path.display()))]
pub fn overlay_caption(
    source: &Path,
    caption: &str,
    out: &Path,
    font: &FontRequest,
) -> StillreelResult<OverlayReport> {
    let img = open_image(source)?;
    let (width, height) = img.dimensions();

    if caption.is_empty() {
        save_image(&img, out)?;
        return Ok(OverlayReport {
            width,
            height,
            text_width: 0.0,
            origin_x: caption_origin_x(width, 0.0),
            font: None,
        });
    }

    let resolved = resolve_font(font)?;
    let mut engine = TextLayoutEngine::new();
    let layout = engine.layout_line(caption, &resolved, CAPTION_COLOR)?;
    let text_width = layout.width();
    let origin_x = caption_origin_x(width, text_width);

    let annotated = draw_layout(&img, &layout, origin_x, CAPTION_TOP_MARGIN_PX)?;
    save_image(&annotated, out)?;

    tracing::info!(
        width,
        height,
        text_width,
        origin_x,
        family = engine.last_family_name().as_deref().unwrap_or("unknown"),
        "caption drawn"
    );

    Ok(OverlayReport {
        width,
        height,
        text_width,
        origin_x,
        font: Some(resolved.origin),
    })
}

fn draw_layout(
    img: &DynamicImage,
    layout: &parley::Layout<TextBrushRgba8>,
    x: f64,
    y: f64,
) -> StillreelResult<DynamicImage> {
    let (width, height) = img.dimensions();
    let (w, h) = canvas_size(width, height)?;

    // Glyphs go onto a transparent layer which is then composited over the source,
    // so pixels outside the caption keep their exact values.
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };

            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));

            // Glyph ids are only meaningful for the face that shaped the run.
            let shaped = run.run().font();
            let font_data = vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(shaped.data.data().to_vec()),
                shaped.index,
            );
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&font_data)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    ctx.flush();

    let mut text_layer = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut text_layer);

    let mut rgba = image_to_premul_rgba8(img);
    over_in_place(&mut rgba, text_layer.data_as_u8_slice())?;
    premul_rgba8_to_image(rgba, width, height, img.color())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/overlay.rs"]
mod tests;
