use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::audio::mix::AudioCue;
use crate::audio::subtitles::SubtitleCue;
use crate::foundation::core::{Canvas, Fps, Point, Vec2};
use crate::foundation::error::{ElephantError, ElephantResult};
use crate::scene::layers::LayerTable;

/// A `[start, start + duration]` window on the scene clock, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Interval {
    pub start: f64,
    pub duration: f64,
}

impl Interval {
    pub const fn new(start: f64, duration: f64) -> Self {
        Self { start, duration }
    }

    pub fn end(self) -> f64 {
        self.start + self.duration
    }

    /// Half-open membership: `start <= t < end`.
    pub fn contains(self, t: f64) -> bool {
        self.start <= t && t < self.end()
    }

    fn validate(self, what: &str) -> ElephantResult<()> {
        if !self.start.is_finite() || !self.duration.is_finite() {
            return Err(ElephantError::validation(format!(
                "{what} interval must be finite"
            )));
        }
        if self.start < 0.0 || self.duration < 0.0 {
            return Err(ElephantError::validation(format!(
                "{what} interval must have non-negative start and duration"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// World scroll speed in authoring pixels per second of camera time.
    pub scroll_speed: f64,
    /// Camera holds, disjoint and in increasing start order.
    pub pauses: Vec<Interval>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            scroll_speed: 300.0,
            pauses: vec![Interval::new(14.0, 3.0), Interval::new(38.0, 2.5)],
        }
    }
}

/// One repeating parallax band.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TileConfig {
    pub speed_factor: f64,
    pub tile_size: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    pub midground: TileConfig,
    pub foreground: TileConfig,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            midground: TileConfig {
                speed_factor: 0.5,
                tile_size: 1920.0,
            },
            foreground: TileConfig {
                speed_factor: 1.5,
                tile_size: 1920.0,
            },
        }
    }
}

/// Shared oscillator driving head bob, tail wiggle, arm sway and the walk cycle.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    pub period: f64,
    pub head_amplitude_deg: f64,
    pub tail_amplitude_deg: f64,
    pub arm_amplitude_deg: f64,
    pub foot_poses: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            period: 1.0,
            head_amplitude_deg: 10.0,
            tail_amplitude_deg: 20.0,
            arm_amplitude_deg: 15.0,
            foot_poses: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ElephantConfig {
    pub head_pivot: Point,
}

impl Default for ElephantConfig {
    fn default() -> Self {
        Self {
            head_pivot: Point::new(1008.0, 437.0),
        }
    }
}

/// Slide of a character from an off-screen offset to its resting offset.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EntryConfig {
    pub interval: Interval,
    /// Screen offset at the start of the slide.
    pub from: Vec2,
    /// Screen offset once the slide is over.
    pub rest: Vec2,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MonkeyConfig {
    pub entry: EntryConfig,
    pub shoulder_pivot: Point,
    /// Hand position relative to the shoulder at rest.
    pub hand_offset: Vec2,
}

impl Default for MonkeyConfig {
    fn default() -> Self {
        Self {
            entry: EntryConfig {
                interval: Interval::new(20.0, 4.0),
                from: Vec2::new(1400.0, 0.0),
                rest: Vec2::ZERO,
            },
            shoulder_pivot: Point::new(1560.0, 520.0),
            hand_offset: Vec2::new(-90.0, 110.0),
        }
    }
}

/// Half-sine rotation pulse confined to `window`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GateConfig {
    pub window: Interval,
    pub amplitude_deg: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GiraffeConfig {
    pub entry: EntryConfig,
    pub tail_pivot: Point,
    pub neck_pivot: Point,
    pub nod: GateConfig,
}

impl Default for GiraffeConfig {
    fn default() -> Self {
        Self {
            entry: EntryConfig {
                interval: Interval::new(8.0, 5.0),
                from: Vec2::new(1600.0, 0.0),
                rest: Vec2::new(-200.0, 0.0),
            },
            tail_pivot: Point::new(1700.0, 480.0),
            neck_pivot: Point::new(1620.0, 640.0),
            nod: GateConfig {
                window: Interval::new(30.0, 2.0),
                amplitude_deg: 25.0,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BalloonConfig {
    /// Attach point relative to the head pivot with the head at rest.
    pub head_offset: Vec2,
    /// Attach point relative to the monkey's hand with the arm at rest.
    pub hand_offset: Vec2,
    pub detach_at: f64,
    /// Camera position at which the monkey catches the balloon.
    pub catch_camera_pos: f64,
    /// Downward acceleration while airborne, authoring px/s².
    pub gravity: f64,
    pub passover: Interval,
    /// Final screen position once the passover is over.
    pub target: Point,
}

impl Default for BalloonConfig {
    fn default() -> Self {
        Self {
            head_offset: Vec2::new(-60.0, 420.0),
            hand_offset: Vec2::new(0.0, 260.0),
            detach_at: 24.0,
            catch_camera_pos: 7800.0,
            gravity: 40.0,
            passover: Interval::new(34.0, 3.0),
            target: Point::new(960.0, 800.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    pub enabled: bool,
    /// Opaque before, linear fade inside, absent after.
    pub fade: Interval,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fade: Interval::new(2.0, 1.5),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CreditsConfig {
    pub start: f64,
    pub slide: Interval,
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            start: 52.0,
            slide: Interval::new(56.0, 1.5),
        }
    }
}

/// Settings forwarded to the `ffmpeg` file sink.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    pub video_codec: String,
    pub video_bitrate: String,
    pub audio_codec: String,
    /// Surface clear color, also used to flatten any residual alpha.
    pub background_rgb: [u8; 3],
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            video_codec: "libvpx".to_string(),
            video_bitrate: "3M".to_string(),
            audio_codec: "libvorbis".to_string(),
            background_rgb: [255, 255, 255],
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub svg: PathBuf,
    pub output: PathBuf,
    pub audio: Vec<AudioCue>,
    pub subtitles: Vec<SubtitleCue>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            svg: PathBuf::from("elephant.svg"),
            output: PathBuf::from("elephant.webm"),
            audio: Vec::new(),
            subtitles: Vec::new(),
        }
    }
}

/// Every constant of the scene, passed by reference into the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub canvas: Canvas,
    pub fps: Fps,
    pub duration_secs: f64,
    pub camera: CameraConfig,
    pub parallax: ParallaxConfig,
    pub cycle: CycleConfig,
    pub elephant: ElephantConfig,
    pub monkey: MonkeyConfig,
    pub giraffe: GiraffeConfig,
    pub balloon: BalloonConfig,
    pub title: TitleConfig,
    pub credits: CreditsConfig,
    pub layers: LayerTable,
    pub encode: EncodeConfig,
    pub assets: AssetsConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            duration_secs: 60.0,
            camera: CameraConfig::default(),
            parallax: ParallaxConfig::default(),
            cycle: CycleConfig::default(),
            elephant: ElephantConfig::default(),
            monkey: MonkeyConfig::default(),
            giraffe: GiraffeConfig::default(),
            balloon: BalloonConfig::default(),
            title: TitleConfig::default(),
            credits: CreditsConfig::default(),
            layers: LayerTable::default(),
            encode: EncodeConfig::default(),
            assets: AssetsConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse a config from a JSON reader. Missing fields keep their built-in values.
    pub fn from_reader<R: std::io::Read>(r: R) -> ElephantResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ElephantError::serde(format!("parse scene JSON: {e}")))
    }

    /// Load a config from disk; relative asset paths resolve against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> ElephantResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ElephantError::validation(format!("open scene config '{}': {e}", path.display()))
        })?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        if let Some(root) = path.parent() {
            cfg.assets.resolve_relative_to(root);
        }
        Ok(cfg)
    }

    pub fn validate(&self) -> ElephantResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if self.canvas.scale == 0 {
            return Err(ElephantError::validation("canvas scale must be >= 1"));
        }
        let (w, h) = (self.canvas.output_width(), self.canvas.output_height());
        if w == 0 || h == 0 {
            return Err(ElephantError::validation("output size must be non-zero"));
        }
        if !w.is_multiple_of(2) || !h.is_multiple_of(2) {
            return Err(ElephantError::validation(format!(
                "output size {w}x{h} must be even (required for yuv420p output)"
            )));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(ElephantError::validation("scene duration must be positive"));
        }

        if !(self.camera.scroll_speed.is_finite() && self.camera.scroll_speed >= 0.0) {
            return Err(ElephantError::validation(
                "camera scroll speed must be finite and non-negative",
            ));
        }
        let mut prev_end = f64::NEG_INFINITY;
        for pause in &self.camera.pauses {
            pause.validate("pause")?;
            if pause.start < prev_end {
                return Err(ElephantError::validation(
                    "pause intervals must be disjoint and in increasing start order",
                ));
            }
            prev_end = pause.end();
        }

        for (name, tile) in [
            ("midground", self.parallax.midground),
            ("foreground", self.parallax.foreground),
        ] {
            if !(tile.tile_size.is_finite() && tile.tile_size > 0.0) {
                return Err(ElephantError::validation(format!(
                    "{name} tile size must be positive"
                )));
            }
            if !tile.speed_factor.is_finite() {
                return Err(ElephantError::validation(format!(
                    "{name} speed factor must be finite"
                )));
            }
        }

        if !(self.cycle.period.is_finite() && self.cycle.period > 0.0) {
            return Err(ElephantError::validation("cycle period must be positive"));
        }
        if self.cycle.foot_poses == 0 {
            return Err(ElephantError::validation("foot pose count must be >= 1"));
        }
        self.layers.validate()?;
        if self.layers.feet.len() != self.cycle.foot_poses {
            return Err(ElephantError::validation(format!(
                "foot pose count {} does not match {} foot layers",
                self.cycle.foot_poses,
                self.layers.feet.len()
            )));
        }

        self.monkey.entry.interval.validate("monkey entry")?;
        self.giraffe.entry.interval.validate("giraffe entry")?;
        self.giraffe.nod.window.validate("giraffe nod")?;

        let b = &self.balloon;
        b.passover.validate("balloon passover")?;
        if !(b.detach_at.is_finite() && b.detach_at >= 0.0) {
            return Err(ElephantError::validation(
                "balloon detach time must be non-negative",
            ));
        }
        if b.detach_at >= b.passover.start {
            return Err(ElephantError::validation(
                "balloon must detach before the passover starts",
            ));
        }
        if !b.gravity.is_finite() || !b.catch_camera_pos.is_finite() {
            return Err(ElephantError::validation(
                "balloon gravity and catch position must be finite",
            ));
        }

        self.title.fade.validate("title fade")?;
        self.credits.slide.validate("credits slide")?;
        if self.credits.slide.start < self.credits.start {
            return Err(ElephantError::validation(
                "credits slide must not start before the credits",
            ));
        }

        crate::audio::mix::validate_cues(&self.assets.audio)?;
        for cue in &self.assets.subtitles {
            cue.validate()?;
        }
        Ok(())
    }
}

impl AssetsConfig {
    fn resolve_relative_to(&mut self, root: &Path) {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        fix(&mut self.svg);
        fix(&mut self.output);
        for cue in &mut self.audio {
            fix(&mut cue.clip);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
