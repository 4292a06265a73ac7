use std::ffi::OsString;
use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{FrameGate, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ElephantError, ElephantResult};
use crate::render::backend::FrameRgb;
use crate::scene::config::SceneConfig;

const STAGE: &str = "ffmpeg encode";

/// Options for [`FfmpegSink`] file output.
#[derive(Clone, Debug, PartialEq)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    /// Overwrite `out_path` if it already exists.
    pub overwrite: bool,
    pub video_codec: String,
    pub video_bitrate: String,
    /// Used only when the sink is given an audio track.
    pub audio_codec: String,
}

impl FfmpegSinkOpts {
    /// WebM output with the scene's built-in codec settings.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self::from_scene(&SceneConfig::default()).with_out_path(out_path)
    }

    pub fn from_scene(cfg: &SceneConfig) -> Self {
        Self {
            out_path: cfg.assets.output.clone(),
            overwrite: true,
            video_codec: cfg.encode.video_codec.clone(),
            video_bitrate: cfg.encode.video_bitrate.clone(),
            audio_codec: cfg.encode.audio_codec.clone(),
        }
    }

    pub fn with_out_path(mut self, out_path: impl Into<PathBuf>) -> Self {
        self.out_path = out_path.into();
        self
    }
}

/// Spawns the system `ffmpeg` and streams raw RGB24 frames into its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    gate: FrameGate,
    process: Option<PipedProcess>,
    /// Set once ffmpeg has been spawned on `out_path`.
    output_started: bool,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            gate: FrameGate::default(),
            process: None,
            output_started: false,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ElephantResult<()> {
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ElephantError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if let Some(audio) = cfg.audio.as_ref()
            && (audio.sample_rate == 0 || audio.channels == 0)
        {
            return Err(ElephantError::validation(
                "audio sample rate and channel count must be non-zero",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ElephantError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(ElephantError::encode(
                STAGE,
                "ffmpeg is required for encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(ffmpeg_args(&self.opts, &cfg));
        tracing::info!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            audio = cfg.audio.is_some(),
            subtitles = cfg.subtitles.is_some(),
            "starting ffmpeg"
        );
        self.process = Some(PipedProcess::spawn(STAGE, cmd)?);
        self.output_started = true;
        self.gate.start(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> ElephantResult<()> {
        self.gate.admit(idx, frame)?;
        let Some(process) = self.process.as_mut() else {
            return Err(ElephantError::evaluation("ffmpeg sink is already finalized"));
        };
        process.write(&frame.data)
    }

    fn end(&mut self) -> ElephantResult<()> {
        let mut process = self
            .process
            .take()
            .ok_or_else(|| ElephantError::evaluation("ffmpeg sink not started"))?;
        self.gate.finish();
        process.finish()?;
        self.output_started = false;
        tracing::info!(out = %self.opts.out_path.display(), "ffmpeg finished");
        Ok(())
    }

    fn abort(&mut self) {
        if let Some(mut process) = self.process.take() {
            process.kill();
        }
        self.gate.finish();
        if std::mem::take(&mut self.output_started) {
            match std::fs::remove_file(&self.opts.out_path) {
                Ok(()) => tracing::warn!(
                    out = %self.opts.out_path.display(),
                    "render failed; removed partial output"
                ),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    out = %self.opts.out_path.display(),
                    error = %e,
                    "render failed; could not remove partial output"
                ),
            }
        }
    }
}

/// Full `ffmpeg` argument list for one encode.
///
/// Input 0 is the raw frame stream on stdin; audio and subtitles follow as inputs 1 and 2 (or 1
/// when there is no audio).
pub fn ffmpeg_args(opts: &FfmpegSinkOpts, cfg: &SinkConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |items: &[&str]| args.extend(items.iter().map(OsString::from));

    push(&[if opts.overwrite { "-y" } else { "-n" }, "-loglevel", "error"]);
    push(&[
        "-f",
        "rawvideo",
        "-pixel_format",
        "rgb24",
        "-video_size",
        &format!("{}x{}", cfg.width, cfg.height),
        "-framerate",
        &fps_arg(cfg.fps),
        "-i",
        "pipe:0",
    ]);

    let mut next_input = 1;
    let mut maps = vec!["-map".to_string(), "0:v".to_string()];
    if let Some(audio) = cfg.audio.as_ref() {
        push(&[
            "-f",
            "f32le",
            "-ar",
            &audio.sample_rate.to_string(),
            "-ac",
            &audio.channels.to_string(),
            "-i",
        ]);
        args.push(audio.path.clone().into_os_string());
        maps.extend(["-map".to_string(), format!("{next_input}:a")]);
        next_input += 1;
    }
    if let Some(subs) = cfg.subtitles.as_ref() {
        args.push("-i".into());
        args.push(subs.clone().into_os_string());
        maps.extend(["-map".to_string(), format!("{next_input}:s")]);
    }
    args.extend(maps.into_iter().map(OsString::from));

    args.extend(
        [
            "-c:v",
            opts.video_codec.as_str(),
            "-b:v",
            opts.video_bitrate.as_str(),
            "-pix_fmt",
            "yuv420p",
        ]
        .map(OsString::from),
    );
    if cfg.audio.is_some() {
        args.extend(["-c:a", opts.audio_codec.as_str()].map(OsString::from));
    } else {
        args.push("-an".into());
    }
    if cfg.subtitles.is_some() {
        args.extend(["-c:s", "webvtt"].map(OsString::from));
    }
    args.push(opts.out_path.clone().into_os_string());
    args
}

pub(crate) fn fps_arg(fps: Fps) -> String {
    format!("{}/{}", fps.num, fps.den)
}

/// A child process fed through its stdin, with stderr collected for error reports.
pub(crate) struct PipedProcess {
    stage: &'static str,
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl PipedProcess {
    pub(crate) fn spawn(stage: &'static str, mut cmd: Command) -> ElephantResult<Self> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| {
            ElephantError::encode(stage, format!("failed to spawn (is it installed and on PATH?): {e}"))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ElephantError::encode(stage, "failed to open stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ElephantError::encode(stage, "failed to open stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            stage,
            child,
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
        })
    }

    /// Blocks while the process applies backpressure.
    pub(crate) fn write(&mut self, bytes: &[u8]) -> ElephantResult<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ElephantError::encode(self.stage, "input is already closed"));
        };
        stdin
            .write_all(bytes)
            .map_err(|e| ElephantError::encode(self.stage, format!("failed to write frame: {e}")))
    }

    /// Stop the process without letting it finalize its output.
    pub(crate) fn kill(&mut self) {
        let _ = self.child.kill();
        drop(self.stdin.take());
        let _ = self.child.wait();
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }

    /// Close stdin, wait for exit, and turn a non-zero status into an error carrying stderr.
    pub(crate) fn finish(&mut self) -> ElephantResult<()> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| ElephantError::encode(self.stage, format!("failed to wait: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ElephantError::encode(self.stage, "stderr drain thread panicked"))?
                .map_err(|e| ElephantError::encode(self.stage, format!("stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ElephantError::encode(
                self.stage,
                format!("exited with status {status}: {}", stderr.trim()),
            ));
        }
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ElephantResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// `true` when `program -version` runs successfully from `PATH`.
pub fn is_tool_on_path(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn is_ffmpeg_on_path() -> bool {
    is_tool_on_path("ffmpeg")
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
