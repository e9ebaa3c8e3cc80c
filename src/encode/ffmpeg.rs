use std::{
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::foundation::error::{StillreelError, StillreelResult};

/// Which of the two transcode invocations a job belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscodeStage {
    /// Still image looped into a silent H.264 video.
    Encode,
    /// Silent video combined with an audio track.
    Mux,
}

impl fmt::Display for TranscodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => f.write_str("encode"),
            Self::Mux => f.write_str("mux"),
        }
    }
}

/// Output parameters for the silent video.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StillVideoSpec {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: u32,
    /// Length of the video in seconds.
    pub duration_secs: f64,
}

impl Default for StillVideoSpec {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
            duration_secs: 5.0,
        }
    }
}

impl StillVideoSpec {
    /// Default 1280x720 @ 30fps spec with the given duration.
    pub fn with_duration(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            ..Self::default()
        }
    }

    /// Check the spec can be handed to the encoder.
    pub fn validate(&self) -> StillreelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StillreelError::validation(
                "video width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(StillreelError::validation("video fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // yuv420p subsamples chroma 2x2.
            return Err(StillreelError::validation(
                "video width/height must be even (required for yuv420p output)",
            ));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(StillreelError::validation(
                "video duration must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// One invocation of the transcoding tool.
#[derive(Clone, Debug, PartialEq)]
pub enum TranscodeJob {
    /// Loop `image` for `spec.duration_secs` into an H.264 video at `out`.
    EncodeStill {
        /// Source still image.
        image: PathBuf,
        /// Silent video to write.
        out: PathBuf,
        /// Resolution, frame rate and duration.
        spec: StillVideoSpec,
    },
    /// Copy the video stream of `video`, encode `audio` as AAC, stop at the shorter stream.
    MuxAudio {
        /// Silent video produced by the encode stage.
        video: PathBuf,
        /// Background audio track.
        audio: PathBuf,
        /// Final video to write.
        out: PathBuf,
    },
}

impl TranscodeJob {
    /// Stage this job runs in.
    pub fn stage(&self) -> TranscodeStage {
        match self {
            Self::EncodeStill { .. } => TranscodeStage::Encode,
            Self::MuxAudio { .. } => TranscodeStage::Mux,
        }
    }

    /// File the job writes.
    pub fn output_path(&self) -> &Path {
        match self {
            Self::EncodeStill { out, .. } | Self::MuxAudio { out, .. } => out,
        }
    }

    /// Full argument list passed to the tool (program name excluded).
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        match self {
            Self::EncodeStill { image, out, spec } => {
                push_all(&mut args, ["-loop", "1", "-i"]);
                args.push(image.as_os_str().to_owned());
                args.push("-t".into());
                args.push(format_secs(spec.duration_secs).into());
                push_all(&mut args, ["-c:v", "libx264", "-r"]);
                args.push(spec.fps.to_string().into());
                push_all(&mut args, ["-pix_fmt", "yuv420p", "-vf"]);
                args.push(format!("scale={}:{}", spec.width, spec.height).into());
                args.push("-y".into());
                args.push(out.as_os_str().to_owned());
            }
            Self::MuxAudio { video, audio, out } => {
                args.push("-i".into());
                args.push(video.as_os_str().to_owned());
                args.push("-i".into());
                args.push(audio.as_os_str().to_owned());
                push_all(
                    &mut args,
                    [
                        "-c:v",
                        "copy",
                        "-c:a",
                        "aac",
                        "-strict",
                        "experimental",
                        "-shortest",
                        "-y",
                    ],
                );
                args.push(out.as_os_str().to_owned());
            }
        }
        args
    }
}

fn push_all<const N: usize>(args: &mut Vec<OsString>, items: [&str; N]) {
    args.extend(items.into_iter().map(OsString::from));
}

fn format_secs(secs: f64) -> String {
    // f64 Display prints `5` for 5.0, which is what ffmpeg expects for whole seconds.
    format!("{secs}")
}

/// Exit status and captured streams of one tool invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    /// Captured stdout, lossily decoded.
    pub stdout: String,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Human readable exit status.
    pub fn status_label(&self) -> String {
        match self.status {
            Some(code) => format!("exit status: {code}"),
            None => "termination by signal".to_string(),
        }
    }
}

/// Narrow interface over the external transcoding tool.
///
/// Implementations run the job to completion and report its output; a non-zero
/// exit is *not* an `Err` here, the caller decides what a failed stage means.
/// `Err` is reserved for failing to run the tool at all.
pub trait Transcoder {
    /// Run `job` and block until it exits.
    fn run(&mut self, job: &TranscodeJob) -> StillreelResult<ProcessOutput>;
}

/// [`Transcoder`] backed by an `ffmpeg` executable.
#[derive(Clone, Debug)]
pub struct FfmpegTranscoder {
    exe: PathBuf,
}

impl FfmpegTranscoder {
    /// Use the given executable. A bare name (`"ffmpeg"`) is looked up on PATH.
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    /// Executable this transcoder invokes.
    pub fn exe(&self) -> &Path {
        &self.exe
    }
}

impl Transcoder for FfmpegTranscoder {
    fn run(&mut self, job: &TranscodeJob) -> StillreelResult<ProcessOutput> {
        // Arguments go straight to the process, never through a shell.
        let out = Command::new(&self.exe)
            .args(job.args())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                StillreelError::Other(anyhow::anyhow!(
                    "failed to run '{}' for {} stage: {e}",
                    self.exe.display(),
                    job.stage()
                ))
            })?;

        Ok(ProcessOutput {
            status: out.status.code(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}

fn sibling_tool(program_dir: &Path, name: &str) -> PathBuf {
    program_dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX))
}

/// Find the `ffmpeg` executable shipped next to the program.
pub fn locate_ffmpeg(program_dir: &Path) -> StillreelResult<PathBuf> {
    let path = sibling_tool(program_dir, "ffmpeg");
    if path.is_file() {
        return Ok(path);
    }
    Err(StillreelError::tool_missing(format!(
        "ffmpeg executable not found at '{}'; place it in the same folder as this program",
        path.display()
    )))
}

/// Find the optional `ffprobe` executable shipped next to the program.
pub fn locate_ffprobe(program_dir: &Path) -> Option<PathBuf> {
    let path = sibling_tool(program_dir, "ffprobe");
    path.is_file().then_some(path)
}

/// Directory containing the running executable.
pub fn program_dir() -> StillreelResult<PathBuf> {
    use anyhow::Context as _;
    let exe = std::env::current_exe().context("resolve current executable path")?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| StillreelError::validation("current executable has no parent directory"))
}

/// Create the directory `path` will be written into, if it has one.
pub fn ensure_parent_dir(path: &Path) -> StillreelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
