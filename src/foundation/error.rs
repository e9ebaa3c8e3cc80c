use crate::encode::ffmpeg::TranscodeStage;

/// Convenience result type used across stillreel.
pub type StillreelResult<T> = Result<T, StillreelError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum StillreelError {
    /// Invalid configuration or stage parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while decoding, drawing on, or encoding a raster image.
    #[error("image error: {0}")]
    Image(String),

    /// No usable font face, not even the fallback.
    #[error("font error: {0}")]
    Font(String),

    /// A required external executable is absent.
    #[error("missing external tool: {0}")]
    ToolMissing(String),

    /// The transcoding tool ran and exited unsuccessfully.
    #[error("transcode error during {stage}: ffmpeg exited with {status}: {diagnostics}")]
    Transcode {
        /// Stage that failed.
        stage: TranscodeStage,
        /// Exit status as reported by the OS.
        status: String,
        /// Captured diagnostic output (stderr).
        diagnostics: String,
    },

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StillreelError {
    /// Build a [`StillreelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StillreelError::Image`] value.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Build a [`StillreelError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`StillreelError::ToolMissing`] value.
    pub fn tool_missing(msg: impl Into<String>) -> Self {
        Self::ToolMissing(msg.into())
    }

    /// Build a [`StillreelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Stage of a failed transcode, if this is one.
    pub fn transcode_stage(&self) -> Option<TranscodeStage> {
        match self {
            Self::Transcode { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
