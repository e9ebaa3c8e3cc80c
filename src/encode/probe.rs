use std::path::Path;

use crate::foundation::error::{StillreelError, StillreelResult};

/// Stream facts read back from a produced video.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    /// Frame size of the first video stream.
    pub width: u32,
    pub height: u32,
    /// Stream frame rate (`r_frame_rate`) as a ratio, e.g. `30/1`.
    pub fps_num: u32,
    pub fps_den: u32,
    /// Codec short name of the first video stream, e.g. `h264`.
    pub video_codec: Option<String>,
    /// Container duration.
    pub duration_sec: f64,
    /// Per-stream durations, when the container records them.
    pub video_duration_sec: Option<f64>,
    pub audio_duration_sec: Option<f64>,
    /// Whether any audio stream is present.
    pub has_audio: bool,
}

impl MediaInfo {
    pub fn fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }
}

/// Inspect `source_path` with `ffprobe`.
pub fn probe_media(ffprobe: &Path, source_path: &Path) -> StillreelResult<MediaInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        codec_name: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| StillreelError::Other(anyhow::anyhow!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(StillreelError::Other(anyhow::anyhow!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| StillreelError::serde(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| StillreelError::validation("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| StillreelError::validation("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| StillreelError::validation("missing video height from ffprobe"))?;

    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| StillreelError::validation("invalid video r_frame_rate"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let audio_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(MediaInfo {
        width,
        height,
        fps_num,
        fps_den,
        video_codec: video_stream.codec_name.clone(),
        duration_sec,
        video_duration_sec: video_stream
            .duration
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok()),
        audio_duration_sec: audio_stream
            .and_then(|s| s.duration.as_deref())
            .and_then(|s| s.parse::<f64>().ok()),
        has_audio: audio_stream.is_some(),
    })
}

pub(crate) fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let (num, den) = s.split_once('/')?;
    let num = num.trim().parse::<u32>().ok()?;
    let den = den.trim().parse::<u32>().ok()?;
    if den == 0 {
        return None;
    }
    Some((num, den))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/probe.rs"]
mod tests;
