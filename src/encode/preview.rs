use std::ffi::OsString;
use std::process::Command;

use crate::encode::ffmpeg::{PipedProcess, fps_arg, is_tool_on_path};
use crate::encode::sink::{FrameGate, FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ElephantError, ElephantResult};
use crate::render::backend::FrameRgb;

const STAGE: &str = "ffplay preview";

/// Plays frames live through the system `ffplay`. Audio and subtitles are not previewed.
#[derive(Default)]
pub struct FfplaySink {
    gate: FrameGate,
    process: Option<PipedProcess>,
}

impl FfplaySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for FfplaySink {
    fn begin(&mut self, cfg: SinkConfig) -> ElephantResult<()> {
        if !is_tool_on_path("ffplay") {
            return Err(ElephantError::encode(
                STAGE,
                "ffplay is required for preview, but was not found on PATH",
            ));
        }
        if cfg.audio.is_some() {
            tracing::debug!("preview plays video only; audio track ignored");
        }
        let mut cmd = Command::new("ffplay");
        cmd.args(ffplay_args(&cfg));
        self.process = Some(PipedProcess::spawn(STAGE, cmd)?);
        self.gate.start(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> ElephantResult<()> {
        self.gate.admit(idx, frame)?;
        let Some(process) = self.process.as_mut() else {
            return Err(ElephantError::evaluation("preview sink is already finalized"));
        };
        process.write(&frame.data)
    }

    fn end(&mut self) -> ElephantResult<()> {
        let mut process = self
            .process
            .take()
            .ok_or_else(|| ElephantError::evaluation("preview sink not started"))?;
        self.gate.finish();
        process.finish()
    }

    fn abort(&mut self) {
        if let Some(mut process) = self.process.take() {
            process.kill();
        }
        self.gate.finish();
    }
}

pub fn ffplay_args(cfg: &SinkConfig) -> Vec<OsString> {
    [
        "-loglevel".to_string(),
        "error".to_string(),
        "-autoexit".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pixel_format".to_string(),
        "rgb24".to_string(),
        "-video_size".to_string(),
        format!("{}x{}", cfg.width, cfg.height),
        "-framerate".to_string(),
        fps_arg(cfg.fps),
        "-i".to_string(),
        "-".to_string(),
    ]
    .into_iter()
    .map(OsString::from)
    .collect()
}
