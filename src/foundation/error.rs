/// Convenience result type used across the renderer.
pub type ElephantResult<T> = Result<T, ElephantError>;

/// Top-level error taxonomy. Every variant is fatal for a render run.
#[derive(thiserror::Error, Debug)]
pub enum ElephantError {
    /// Invalid scene configuration or CLI-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A named layer of the vector image failed to draw.
    #[error("render error: layer '{layer}': {reason}")]
    Render {
        /// Layer id as it appears in the SVG document.
        layer: String,
        /// Renderer-reported failure.
        reason: String,
    },

    /// An external encoding/decoding process failed.
    #[error("encode error: {stage}: {reason}")]
    Encode {
        /// Pipeline stage that failed (`ffmpeg encode`, `ffplay preview`, `audio decode`, ...).
        stage: String,
        /// Failure description, including process stderr where available.
        reason: String,
    },

    /// Errors while driving frames through the pipeline.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ElephantError {
    /// Build an [`ElephantError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`ElephantError::Render`] value naming `layer`.
    pub fn render(layer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Render {
            layer: layer.into(),
            reason: reason.into(),
        }
    }

    /// Build an [`ElephantError::Encode`] value naming the failing `stage`.
    pub fn encode(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encode {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Build an [`ElephantError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build an [`ElephantError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
