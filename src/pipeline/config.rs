use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    encode::ffmpeg::StillVideoSpec,
    foundation::error::{StillreelError, StillreelResult},
    raster::font::FontRequest,
};

/// Everything one pipeline run needs. Relative paths are resolved with [`PipelineConfig::resolve`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub input_image: PathBuf,
    pub caption: String,
    pub audio: PathBuf,
    /// Silent video written by the encode stage.
    pub output_video: PathBuf,
    /// Video with audio written by the mux stage.
    pub final_video: PathBuf,
    pub font: PathBuf,
    pub font_size_px: f32,
    /// `grayscale`, `rotate` or `resize`; anything else passes the image through.
    pub transformation: String,
    pub duration_secs: f64,
    /// Scratch image shared by the overlay and transform stages.
    pub transformed_image: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_image: PathBuf::from("input_image.jpg"),
            caption: "Beautiful Scenery".to_string(),
            audio: PathBuf::from("background_music.mp3"),
            output_video: PathBuf::from("output_video.mp4"),
            final_video: PathBuf::from("output_with_audio.mp4"),
            font: PathBuf::from("ARIAL.ttf"),
            font_size_px: 400.0,
            transformation: "grayscale".to_string(),
            duration_secs: 5.0,
            transformed_image: PathBuf::from("transformed_image.jpg"),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file. Missing fields take their defaults and relative
    /// paths resolve against the file's directory.
    pub fn load(path: &Path) -> StillreelResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            StillreelError::serde(format!("parse config '{}': {e}", path.display()))
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(cfg.resolve(base))
    }

    /// Join every relative path onto `base`.
    pub fn resolve(mut self, base: &Path) -> Self {
        for p in [
            &mut self.input_image,
            &mut self.audio,
            &mut self.output_video,
            &mut self.final_video,
            &mut self.font,
            &mut self.transformed_image,
        ] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
        self
    }

    pub fn validate(&self) -> StillreelResult<()> {
        for (name, p) in [
            ("input_image", &self.input_image),
            ("audio", &self.audio),
            ("output_video", &self.output_video),
            ("final_video", &self.final_video),
            ("font", &self.font),
            ("transformed_image", &self.transformed_image),
        ] {
            if p.as_os_str().is_empty() {
                return Err(StillreelError::validation(format!(
                    "config path '{name}' must be non-empty"
                )));
            }
        }
        if self.output_video == self.final_video {
            return Err(StillreelError::validation(
                "output_video and final_video must differ",
            ));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(StillreelError::validation(
                "font_size_px must be finite and > 0",
            ));
        }
        self.video_spec().validate()
    }

    pub fn font_request(&self) -> FontRequest {
        FontRequest {
            path: self.font.clone(),
            size_px: self.font_size_px,
        }
    }

    pub fn video_spec(&self) -> StillVideoSpec {
        StillVideoSpec::with_duration(self.duration_secs)
    }

    pub fn to_json_pretty(&self) -> StillreelResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StillreelError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
