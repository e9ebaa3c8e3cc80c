use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::foundation::error::{StillreelError, StillreelResult};

/// Size used when the requested font cannot be loaded.
pub const FALLBACK_FONT_SIZE_PX: f32 = 10.0;

/// Family name of the face compiled into the crate.
pub const BUILTIN_FONT_FAMILY: &str = "DejaVu Sans";

/// DejaVu Sans (license in `assets/fonts/LICENSE-DejaVu.txt`).
pub const BUILTIN_FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Font file and size the caption should be drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct FontRequest {
    pub path: PathBuf,
    pub size_px: f32,
}

/// Where the face actually used for drawing came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontOrigin {
    /// The requested font file.
    Requested(PathBuf),
    /// A system sans-serif face used because the requested file was unusable.
    SystemFallback { family: String },
    /// The face compiled into the crate, used when no system face is installed.
    Builtin { family: String },
}

/// Font bytes ready for shaping and rasterizing.
#[derive(Clone)]
pub struct ResolvedFont {
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside `bytes` (non-zero for collections).
    pub index: u32,
    pub size_px: f32,
    pub origin: FontOrigin,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .field("size_px", &self.size_px)
            .field("origin", &self.origin)
            .finish()
    }
}

impl ResolvedFont {
    pub fn is_fallback(&self) -> bool {
        !matches!(self.origin, FontOrigin::Requested(_))
    }

    /// Preferred family name to select after registering the bytes with a shaper.
    pub fn preferred_family(&self) -> Option<&str> {
        match &self.origin {
            FontOrigin::Requested(_) => None,
            FontOrigin::SystemFallback { family } | FontOrigin::Builtin { family } => Some(family),
        }
    }
}

/// Load the requested font, degrading to [`fallback_font`] when it is missing or
/// unparsable.
///
/// Only fails on an invalid size.
pub fn resolve_font(request: &FontRequest) -> StillreelResult<ResolvedFont> {
    if !request.size_px.is_finite() || request.size_px <= 0.0 {
        return Err(StillreelError::validation(
            "font size_px must be finite and > 0",
        ));
    }

    match load_font_file(&request.path) {
        Ok(bytes) => Ok(ResolvedFont {
            bytes: Arc::new(bytes),
            index: 0,
            size_px: request.size_px,
            origin: FontOrigin::Requested(request.path.clone()),
        }),
        Err(reason) => {
            let font = fallback_font();
            tracing::warn!(
                font = %request.path.display(),
                %reason,
                fallback = ?font.origin,
                "requested font unavailable, using the default face"
            );
            Ok(font)
        }
    }
}

fn load_font_file(path: &Path) -> Result<Vec<u8>, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    if count_faces(&bytes) == 0 {
        return Err("file contains no usable font faces".to_string());
    }
    Ok(bytes)
}

fn count_faces(bytes: &[u8]) -> usize {
    let mut db = usvg::fontdb::Database::new();
    db.load_font_data(bytes.to_vec());
    db.len()
}

/// Default face at [`FALLBACK_FONT_SIZE_PX`]: a system sans-serif face when one is
/// installed, otherwise the built-in face.
pub fn fallback_font() -> ResolvedFont {
    system_fallback_font().unwrap_or_else(builtin_font)
}

/// The face compiled into the crate at [`FALLBACK_FONT_SIZE_PX`].
pub fn builtin_font() -> ResolvedFont {
    ResolvedFont {
        bytes: Arc::new(BUILTIN_FONT_BYTES.to_vec()),
        index: 0,
        size_px: FALLBACK_FONT_SIZE_PX,
        origin: FontOrigin::Builtin {
            family: BUILTIN_FONT_FAMILY.to_string(),
        },
    }
}

/// First system sans-serif face (or any face, if no sans-serif is installed).
pub fn system_fallback_font() -> Option<ResolvedFont> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    let id = db
        .query(&usvg::fontdb::Query {
            families: &[usvg::fontdb::Family::SansSerif],
            ..Default::default()
        })
        .or_else(|| db.faces().next().map(|face| face.id))?;

    let family = db
        .face(id)
        .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_else(|| "unknown".to_string());
    let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;

    Some(ResolvedFont {
        bytes: Arc::new(bytes),
        index,
        size_px: FALLBACK_FONT_SIZE_PX,
        origin: FontOrigin::SystemFallback { family },
    })
}

/// Whether any system font is installed.
pub fn system_fonts_available() -> bool {
    system_fallback_font().is_some()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl TextBrushRgba8 {
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    last_family_name: Option<String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            last_family_name: None,
        }
    }

    /// Family name used by the most recent layout.
    pub fn last_family_name(&self) -> Option<String> {
        self.last_family_name.clone()
    }

    /// Shape `text` as a single unwrapped line.
    pub fn layout_line(
        &mut self,
        text: &str,
        font: &ResolvedFont,
        brush: TextBrushRgba8,
    ) -> StillreelResult<parley::Layout<TextBrushRgba8>> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.as_ref().clone()), None);
        if families.is_empty() {
            return Err(StillreelError::font(
                "no font families registered from font bytes",
            ));
        }

        let names: Vec<String> = families
            .iter()
            .filter_map(|(id, _)| {
                self.font_ctx
                    .collection
                    .family_name(*id)
                    .map(str::to_string)
            })
            .collect();
        let family_name = font
            .preferred_family()
            .and_then(|want| names.iter().find(|n| n.eq_ignore_ascii_case(want)))
            .or_else(|| names.first())
            .cloned()
            .ok_or_else(|| StillreelError::font("registered font family has no name"))?;
        self.last_family_name = Some(family_name.clone());

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/font.rs"]
mod tests;
