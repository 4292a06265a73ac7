use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ElephantError, ElephantResult};
use crate::render::backend::FrameRgb;

/// Declared once, before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Pre-mixed raw audio track, if the scene has one.
    pub audio: Option<AudioInputConfig>,
    /// WebVTT subtitle file, if the scene has captions.
    pub subtitles: Option<PathBuf>,
}

impl SinkConfig {
    pub fn frame_bytes(&self) -> usize {
        FrameRgb::byte_len(self.width, self.height)
    }
}

/// Raw PCM audio input for sinks that mux audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInputConfig {
    /// Interleaved `f32le` samples.
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Consumer of composed frames.
///
/// Ordering contract: `push_frame` is called with strictly increasing indices between one `begin`
/// and one `end`.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> ElephantResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> ElephantResult<()>;
    fn end(&mut self) -> ElephantResult<()>;

    /// Tear down after a failed run that got past `begin`, leaving no partial output behind.
    fn abort(&mut self) {}
}

/// Checks shared by every sink: a started sink, in-order indices, and frames of the declared size.
#[derive(Debug, Default)]
pub(crate) struct FrameGate {
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FrameGate {
    pub(crate) fn start(&mut self, cfg: SinkConfig) -> ElephantResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ElephantError::validation(
                "sink width/height must be non-zero",
            ));
        }
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    pub(crate) fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub(crate) fn admit(&mut self, idx: FrameIndex, frame: &FrameRgb) -> ElephantResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ElephantError::evaluation("sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ElephantError::evaluation(format!(
                "sink received out-of-order frame {} after {}",
                idx.0, last.0
            )));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ElephantError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != cfg.frame_bytes() {
            return Err(ElephantError::validation(
                "frame data size does not match width*height*3",
            ));
        }
        self.last_idx = Some(idx);
        Ok(())
    }

    pub(crate) fn finish(&mut self) -> Option<SinkConfig> {
        self.last_idx = None;
        self.cfg.take()
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    gate: FrameGate,
    last_cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRgb)>,
    ended: bool,
    aborted: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.gate.config().or(self.last_cfg.as_ref())
    }

    /// Captured frames in delivery order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRgb)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ElephantResult<()> {
        self.gate.start(cfg)?;
        self.frames.clear();
        self.ended = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> ElephantResult<()> {
        self.gate.admit(idx, frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ElephantResult<()> {
        self.last_cfg = self.gate.finish();
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.last_cfg = self.gate.finish();
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
