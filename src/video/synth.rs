use std::path::{Path, PathBuf};

use crate::{
    encode::ffmpeg::{
        ProcessOutput, StillVideoSpec, TranscodeJob, TranscodeStage, Transcoder, ensure_parent_dir,
    },
    foundation::error::{StillreelError, StillreelResult},
};

/// Inputs and outputs of one synthesis.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisRequest {
    /// Still image to loop.
    pub image: PathBuf,
    /// Background audio track.
    pub audio: PathBuf,
    /// Silent video written by the encode stage.
    pub silent_video: PathBuf,
    /// Video with audio written by the mux stage.
    pub final_video: PathBuf,
    pub spec: StillVideoSpec,
}

/// A stage that ran to a successful exit.
#[derive(Clone, Debug, PartialEq)]
pub struct StageReport {
    pub stage: TranscodeStage,
    pub output: PathBuf,
    /// Everything the tool printed.
    pub diagnostics: ProcessOutput,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisReport {
    pub encode: StageReport,
    pub mux: StageReport,
}

/// Encode the still image into a silent video, then mux the audio track onto it.
///
/// Stages run in order and the first failing stage ends the synthesis: a failed
/// encode never leads to muxing a stale or missing silent video.
#[tracing::instrument(skip(transcoder))]
pub fn synthesize(
    transcoder: &mut dyn Transcoder,
    req: &SynthesisRequest,
) -> StillreelResult<SynthesisReport> {
    req.spec.validate()?;
    if req.silent_video == req.final_video {
        return Err(StillreelError::validation(
            "silent and final video paths must differ",
        ));
    }

    let encode = run_stage(
        transcoder,
        TranscodeJob::EncodeStill {
            image: req.image.clone(),
            out: req.silent_video.clone(),
            spec: req.spec,
        },
    )?;

    let mux = run_stage(
        transcoder,
        TranscodeJob::MuxAudio {
            video: encode.output.clone(),
            audio: req.audio.clone(),
            out: req.final_video.clone(),
        },
    )?;

    Ok(SynthesisReport { encode, mux })
}

fn run_stage(transcoder: &mut dyn Transcoder, job: TranscodeJob) -> StillreelResult<StageReport> {
    let stage = job.stage();
    ensure_parent_dir(job.output_path())?;

    tracing::info!(%stage, out = %job.output_path().display(), "transcode stage started");
    let output = transcoder.run(&job)?;
    log_diagnostics(stage, &output);

    if !output.success() {
        tracing::error!(%stage, status = %output.status_label(), "transcode stage failed");
        return Err(StillreelError::Transcode {
            stage,
            status: output.status_label(),
            diagnostics: diagnostics_text(&output),
        });
    }

    tracing::info!(%stage, "transcode stage finished");
    Ok(StageReport {
        stage,
        output: job.output_path().to_path_buf(),
        diagnostics: output,
    })
}

fn log_diagnostics(stage: TranscodeStage, output: &ProcessOutput) {
    if !output.stdout.trim().is_empty() {
        tracing::debug!(%stage, stdout = %output.stdout.trim(), "ffmpeg stdout");
    }
    if !output.stderr.trim().is_empty() {
        tracing::info!(%stage, stderr = %output.stderr.trim(), "ffmpeg stderr");
    }
}

fn diagnostics_text(output: &ProcessOutput) -> String {
    let stderr = output.stderr.trim();
    if stderr.is_empty() {
        let stdout = output.stdout.trim();
        if stdout.is_empty() {
            return "no diagnostic output".to_string();
        }
        return stdout.to_string();
    }
    stderr.to_string()
}

/// Convenience for callers holding paths rather than a request value.
pub fn synthesize_paths(
    transcoder: &mut dyn Transcoder,
    image: &Path,
    audio: &Path,
    silent_video: &Path,
    final_video: &Path,
    duration_secs: f64,
) -> StillreelResult<SynthesisReport> {
    synthesize(
        transcoder,
        &SynthesisRequest {
            image: image.to_path_buf(),
            audio: audio.to_path_buf(),
            silent_video: silent_video.to_path_buf(),
            final_video: final_video.to_path_buf(),
            spec: StillVideoSpec::with_duration(duration_secs),
        },
    )
}

#[cfg(test)]
#[path = "../../tests/unit/video/synth.rs"]
mod tests;
