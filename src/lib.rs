//! stillreel turns one still image into a short captioned video with background audio.
//!
//! # Pipeline overview
//!
//! 1. **Overlay**: draw a caption, centered near the top edge (`overlay_caption`)
//! 2. **Transform**: grayscale, rotate or resize the annotated image in place (`apply_transformation`)
//! 3. **Encode**: loop the image into a 1280x720 @ 30fps H.264 silent video (system `ffmpeg`)
//! 4. **Mux**: copy the video stream, add the audio track as AAC, stop at the shorter stream
//!
//! Each stage writes its artifact to disk and the next stage reads it back. The
//! first failing stage ends the run.
//!
//! The external tool sits behind the [`Transcoder`] trait so the stage chain can
//! be exercised without spawning processes.
#![forbid(unsafe_code)]

mod encode;
mod foundation;
mod pipeline;
mod raster;
mod video;

pub use encode::ffmpeg::{
    FfmpegTranscoder, ProcessOutput, StillVideoSpec, TranscodeJob, TranscodeStage, Transcoder,
    ensure_parent_dir, locate_ffmpeg, locate_ffprobe, program_dir,
};
pub use encode::probe::{MediaInfo, probe_media};
pub use foundation::error::{StillreelError, StillreelResult};
pub use pipeline::config::PipelineConfig;
pub use pipeline::run::{PipelineReport, run_pipeline};
pub use raster::composite::{over, over_in_place};
pub use raster::font::{
    BUILTIN_FONT_BYTES, BUILTIN_FONT_FAMILY, FALLBACK_FONT_SIZE_PX, FontOrigin, FontRequest,
    ResolvedFont, TextBrushRgba8, TextLayoutEngine, builtin_font, fallback_font, resolve_font,
    system_fallback_font, system_fonts_available,
};
pub use raster::io::{open_image, save_image};
pub use raster::overlay::{
    CAPTION_COLOR, CAPTION_TOP_MARGIN_PX, OverlayReport, caption_origin_x, overlay_caption,
};
pub use raster::transform::{
    RESIZE_HEIGHT, RESIZE_WIDTH, ROTATE_DEGREES, TransformOutcome, Transformation,
    apply_named_transformation, apply_transformation,
};
pub use video::synth::{
    StageReport, SynthesisReport, SynthesisRequest, synthesize, synthesize_paths,
};
