use std::path::PathBuf;

use rayon::prelude::*;

use crate::audio::mix::{build_audio_manifest, mix_manifest, write_mix_to_f32le_file};
use crate::audio::subtitles::write_webvtt_file;
use crate::compose::plan::compose_frame;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::preview::FfplaySink;
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{ElephantError, ElephantResult};
use crate::render::backend::{FrameRgb, LayerRenderer};
use crate::render::svg::{SvgRenderer, SvgScene};
use crate::scene::config::SceneConfig;
use crate::timeline::state::Timeline;

#[derive(Clone, Debug)]
/// Threading and chunking controls for multi-frame rendering.
pub struct RenderThreading {
    /// Rasterize each chunk on a rayon pool when `true`.
    pub parallel: bool,
    /// Frames per scheduling chunk.
    pub chunk_size: usize,
    /// Worker thread count; rayon's default when `None`.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Counters reported at the end of a run.
pub struct RenderStats {
    /// Frames delivered to the sink.
    pub frames_total: u64,
    /// Frames composed and rasterized.
    pub frames_rendered: u64,
    /// Trailing copies of the last frame added to cover the audio track.
    pub frames_padded: u64,
}

/// A mixed audio track ready for the encoder.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedAudio {
    pub input: AudioInputConfig,
    pub duration_secs: f64,
}

#[derive(Clone, Debug, Default)]
pub struct RenderOpts {
    pub threading: RenderThreading,
    pub audio: Option<PreparedAudio>,
    pub subtitles: Option<PathBuf>,
}

/// Output length in frames: the scene, extended so the video is at least as long as the audio.
pub fn total_frames(cfg: &SceneConfig, audio_secs: Option<f64>) -> u64 {
    let scene = cfg.fps.secs_to_frames_ceil(cfg.duration_secs);
    let audio = audio_secs.map_or(0, |secs| cfg.fps.secs_to_frames_ceil(secs));
    scene.max(audio)
}

/// Compose and rasterize a single frame.
pub fn render_frame(
    timeline: &Timeline<'_>,
    renderer: &mut dyn LayerRenderer,
    frame: FrameIndex,
) -> ElephantResult<FrameRgb> {
    let cfg = timeline.config();
    let state = timeline.state(cfg.fps.frames_to_secs(frame.0));
    renderer.render_plan(&compose_frame(&state, cfg))
}

/// Drive every frame of the scene through `renderer` into `sink`, in order.
///
/// Fails fast: the first renderer or sink error aborts the run, and a sink that was already
/// started is told to [`FrameSink::abort`].
#[tracing::instrument(level = "info", skip_all, fields(parallel = opts.threading.parallel))]
pub fn render_scene(
    cfg: &SceneConfig,
    renderer: &mut dyn LayerRenderer,
    sink: &mut dyn FrameSink,
    opts: &RenderOpts,
) -> ElephantResult<RenderStats> {
    let timeline = Timeline::new(cfg)?;
    let (width, height) = renderer.output_size();
    if (width, height) != (cfg.canvas.output_width(), cfg.canvas.output_height()) {
        return Err(ElephantError::validation(format!(
            "renderer surface {width}x{height} does not match the scene output size"
        )));
    }

    let scene_frames = cfg.fps.secs_to_frames_ceil(cfg.duration_secs);
    let total = total_frames(cfg, opts.audio.as_ref().map(|a| a.duration_secs));
    tracing::info!(scene_frames, total, "rendering scene");

    sink.begin(SinkConfig {
        width,
        height,
        fps: cfg.fps,
        audio: opts.audio.as_ref().map(|a| a.input.clone()),
        subtitles: opts.subtitles.clone(),
    })?;

    let stats = match deliver_frames(&timeline, renderer, sink, opts, scene_frames, total)
        .and_then(|stats| sink.end().map(|()| stats))
    {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(error = %e, "render aborted");
            sink.abort();
            return Err(e);
        }
    };
    tracing::info!(
        frames = stats.frames_total,
        rendered = stats.frames_rendered,
        padded = stats.frames_padded,
        "render finished"
    );
    Ok(stats)
}

/// Render the scene frames into a started sink, then pad to `total`.
fn deliver_frames(
    timeline: &Timeline<'_>,
    renderer: &mut dyn LayerRenderer,
    sink: &mut dyn FrameSink,
    opts: &RenderOpts,
    scene_frames: u64,
    total: u64,
) -> ElephantResult<RenderStats> {
    let mut stats = RenderStats::default();
    let chunk_size = normalized_chunk_size(opts.threading.chunk_size);
    let pool = if opts.threading.parallel {
        Some(build_thread_pool(opts.threading.threads)?)
    } else {
        None
    };
    let worker_scene = match pool {
        Some(_) => Some(renderer.worker_scene().ok_or_else(|| {
            ElephantError::evaluation("parallel rendering requires a renderer with worker support")
        })?),
        None => None,
    };

    let mut last: Option<FrameRgb> = None;
    let mut chunk_start = 0;
    while chunk_start < scene_frames {
        let chunk_end = (chunk_start + chunk_size).min(scene_frames);
        let chunk = FrameRange::new(FrameIndex(chunk_start), FrameIndex(chunk_end))?;
        let frames = match (pool.as_ref(), worker_scene.as_ref()) {
            (Some(pool), Some(scene)) => render_chunk_parallel(timeline, scene, pool, chunk)?,
            _ => render_chunk_sequential(timeline, renderer, chunk)?,
        };

        for (f, frame) in (chunk.start.0..chunk.end.0).zip(frames) {
            sink.push_frame(FrameIndex(f), &frame)?;
            stats.frames_rendered += 1;
            last = Some(frame);
        }
        tracing::debug!(chunk_start, chunk_end, "chunk delivered");
        chunk_start = chunk_end;
    }

    let last = last.ok_or_else(|| ElephantError::evaluation("scene produced no frames"))?;
    for f in scene_frames..total {
        sink.push_frame(FrameIndex(f), &last)?;
        stats.frames_padded += 1;
    }
    stats.frames_total = stats.frames_rendered + stats.frames_padded;
    Ok(stats)
}

fn render_chunk_sequential(
    timeline: &Timeline<'_>,
    renderer: &mut dyn LayerRenderer,
    range: FrameRange,
) -> ElephantResult<Vec<FrameRgb>> {
    let mut out = Vec::with_capacity(range.len_frames() as usize);
    for f in range.start.0..range.end.0 {
        out.push(render_frame(timeline, renderer, FrameIndex(f))?);
    }
    Ok(out)
}

fn render_chunk_parallel(
    timeline: &Timeline<'_>,
    scene: &SvgScene,
    pool: &rayon::ThreadPool,
    range: FrameRange,
) -> ElephantResult<Vec<FrameRgb>> {
    let indices: Vec<u64> = (range.start.0..range.end.0).collect();
    let rendered = pool.install(|| {
        indices
            .par_iter()
            .map_init(
                || SvgRenderer::new(scene.clone()),
                |worker, &f| -> ElephantResult<FrameRgb> {
                    let worker = worker.as_mut().map_err(|e| {
                        ElephantError::evaluation(format!("failed to start render worker: {e}"))
                    })?;
                    render_frame(timeline, worker, FrameIndex(f))
                },
            )
            .collect::<Vec<_>>()
    });
    rendered.into_iter().collect()
}

fn build_thread_pool(threads: Option<usize>) -> ElephantResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ElephantError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ElephantError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    chunk_size.max(1) as u64
}

/// Mix the scene's audio cues into a temporary raw track, if there are any.
pub fn prepare_audio(
    cfg: &SceneConfig,
    guard: &mut TempFileGuard,
) -> ElephantResult<Option<PreparedAudio>> {
    if cfg.assets.audio.is_empty() {
        return Ok(None);
    }
    let manifest = build_audio_manifest(&cfg.assets.audio)?;
    if manifest.is_empty() {
        tracing::warn!("audio cues decoded to no samples; encoding without audio");
        return Ok(None);
    }
    let path = temp_path("audio_mix", "f32le");
    write_mix_to_f32le_file(&mix_manifest(&manifest), &path)?;
    guard.track(path.clone());
    Ok(Some(PreparedAudio {
        input: AudioInputConfig {
            path,
            sample_rate: manifest.sample_rate,
            channels: manifest.channels,
        },
        duration_secs: manifest.duration_secs(),
    }))
}

/// Write the scene's captions to a temporary WebVTT file, if there are any.
pub fn prepare_subtitles(
    cfg: &SceneConfig,
    guard: &mut TempFileGuard,
) -> ElephantResult<Option<PathBuf>> {
    if cfg.assets.subtitles.is_empty() {
        return Ok(None);
    }
    let path = temp_path("captions", "vtt");
    write_webvtt_file(&cfg.assets.subtitles, &path)?;
    guard.track(path.clone());
    Ok(Some(path))
}

/// Render the scene to `cfg.assets.output` with audio and captions muxed in.
pub fn render_to_file(
    cfg: &SceneConfig,
    renderer: &mut dyn LayerRenderer,
    threading: RenderThreading,
) -> ElephantResult<RenderStats> {
    cfg.validate()?;
    let mut temps = TempFileGuard::default();
    let opts = RenderOpts {
        threading,
        audio: prepare_audio(cfg, &mut temps)?,
        subtitles: prepare_subtitles(cfg, &mut temps)?,
    };
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::from_scene(cfg));
    render_scene(cfg, renderer, &mut sink, &opts)
}

/// Play the scene through `ffplay` instead of writing a file.
pub fn preview(
    cfg: &SceneConfig,
    renderer: &mut dyn LayerRenderer,
    threading: RenderThreading,
) -> ElephantResult<RenderStats> {
    let opts = RenderOpts {
        threading,
        ..RenderOpts::default()
    };
    render_scene(cfg, renderer, &mut FfplaySink::new(), &opts)
}

fn temp_path(stem: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "elephant_{stem}_{}_{}.{ext}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ))
}

/// Removes the tracked files when dropped.
#[derive(Debug, Default)]
pub struct TempFileGuard(Vec<PathBuf>);

impl TempFileGuard {
    pub fn track(&mut self, path: PathBuf) {
        self.0.push(path);
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        for path in self.0.drain(..) {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
