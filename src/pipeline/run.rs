use crate::{
    encode::ffmpeg::Transcoder,
    foundation::error::StillreelResult,
    pipeline::config::PipelineConfig,
    raster::{
        overlay::{OverlayReport, overlay_caption},
        transform::{TransformOutcome, apply_named_transformation},
    },
    video::synth::{SynthesisReport, SynthesisRequest, synthesize},
};

/// What each stage of one run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineReport {
    pub overlay: OverlayReport,
    pub transform: TransformOutcome,
    pub synthesis: SynthesisReport,
}

/// Run caption overlay, transformation and video synthesis once, in that order.
///
/// The transformation rewrites `transformed_image` in place. The first failing
/// stage stops the run.
#[tracing::instrument(skip_all, fields(input = %cfg.input_image.display()))]
pub fn run_pipeline(
    cfg: &PipelineConfig,
    transcoder: &mut dyn Transcoder,
) -> StillreelResult<PipelineReport> {
    cfg.validate()?;

    tracing::info!("overlaying caption");
    let overlay = overlay_caption(
        &cfg.input_image,
        &cfg.caption,
        &cfg.transformed_image,
        &cfg.font_request(),
    )?;

    tracing::info!(transformation = %cfg.transformation, "transforming image");
    let transform = apply_named_transformation(
        &cfg.transformed_image,
        &cfg.transformation,
        &cfg.transformed_image,
    )?;

    tracing::info!("synthesizing video");
    let synthesis = synthesize(
        transcoder,
        &SynthesisRequest {
            image: cfg.transformed_image.clone(),
            audio: cfg.audio.clone(),
            silent_video: cfg.output_video.clone(),
            final_video: cfg.final_video.clone(),
            spec: cfg.video_spec(),
        },
    )?;

    Ok(PipelineReport {
        overlay,
        transform,
        synthesis,
    })
}
