#![forbid(unsafe_code)]
//! Frame-by-frame renderer for the elephant parade short.
//!
//! A [`Timeline`] turns elapsed time into a [`SceneState`], [`compose_frame`] turns that state into
//! an ordered list of layer draws, and a [`LayerRenderer`] rasterizes the list from the scene's SVG
//! drawing. [`render_scene`] drives every frame into a [`FrameSink`].

pub mod animation;
pub mod audio;
pub mod compose;
pub mod encode;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod timeline;
pub mod transform;

pub use animation::ease::{Ease, oscillate, progress};
pub use audio::mix::{AudioCue, AudioManifest, build_audio_manifest, mix_manifest};
pub use audio::subtitles::{SubtitleCue, to_webvtt};
pub use compose::plan::{DrawCommand, FramePlan, compose_frame};
pub use encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use encode::preview::FfplaySink;
pub use encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{Affine, Canvas, Fps, FrameIndex, FrameRange, Point, Vec2};
pub use foundation::error::{ElephantError, ElephantResult};
pub use render::backend::{FrameRgb, LayerRenderer};
pub use render::pipeline::{
    PreparedAudio, RenderOpts, RenderStats, RenderThreading, preview, render_frame, render_scene,
    render_to_file, total_frames,
};
pub use render::svg::{SvgRenderer, SvgScene};
pub use scene::config::SceneConfig;
pub use scene::layers::{Layer, LayerTable};
pub use timeline::balloon::{BalloonPhase, BalloonState};
pub use timeline::state::{SceneState, Timeline};
pub use transform::{flip_y, rotate_about, rotate_point, translate};
