use crate::animation::ease::{Ease, oscillate, progress};
use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::ElephantResult;
use crate::scene::config::SceneConfig;
use crate::timeline::balloon::{BalloonState, BalloonTrack};
use crate::timeline::camera::{PauseSchedule, camera_pos, tile_offsets};
use crate::timeline::motion::{
    cyclic_angle, entry_offset, foot_pose_index, gated_pulse,
};
use crate::transform::rotate_point;

/// Everything the compositor needs for one frame. Derived from elapsed time, never stored.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SceneState {
    pub elapsed: f64,
    pub camera_pos: f64,
    pub paused: bool,
    pub midground_offsets: [f64; 2],
    pub foreground_offsets: [f64; 2],
    /// Radians, counter-clockwise positive.
    pub head_angle: f64,
    pub tail_angle: f64,
    pub arm_angle: f64,
    pub nod_angle: f64,
    pub foot_pose: usize,
    pub monkey_offset: Vec2,
    pub giraffe_offset: Vec2,
    pub balloon: BalloonState,
    /// Title card opacity; `None` once the fade is over.
    pub title_alpha: Option<f64>,
    /// Eased credit slide progress; `None` before the credits.
    pub credits_progress: Option<f64>,
}

/// Pure `elapsed -> SceneState` evaluator over an immutable scene config.
#[derive(Clone, Debug)]
pub struct Timeline<'a> {
    cfg: &'a SceneConfig,
    balloon: BalloonTrack,
}

impl<'a> Timeline<'a> {
    pub fn new(cfg: &'a SceneConfig) -> ElephantResult<Self> {
        cfg.validate()?;
        Ok(Self::new_unchecked(cfg))
    }

    pub(crate) fn new_unchecked(cfg: &'a SceneConfig) -> Self {
        let mut timeline = Self {
            cfg,
            balloon: BalloonTrack::default(),
        };
        timeline.balloon = BalloonTrack::new(&timeline);
        timeline
    }

    pub fn config(&self) -> &'a SceneConfig {
        self.cfg
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub fn state(&self, elapsed: f64) -> SceneState {
        let cfg = self.cfg;
        let camera = self.camera_pos(elapsed);
        let paused = self.pauses().active(elapsed).is_some();
        let head_signal = self.head_signal(elapsed);

        SceneState {
            elapsed,
            camera_pos: camera,
            paused,
            midground_offsets: tile_offsets(
                camera * cfg.parallax.midground.speed_factor,
                cfg.parallax.midground.tile_size,
            ),
            foreground_offsets: tile_offsets(
                camera * cfg.parallax.foreground.speed_factor,
                cfg.parallax.foreground.tile_size,
            ),
            head_angle: self.head_angle(elapsed),
            tail_angle: self.tail_angle(elapsed),
            arm_angle: self.arm_angle(elapsed),
            nod_angle: gated_pulse(&cfg.giraffe.nod, elapsed),
            foot_pose: foot_pose_index(head_signal, cfg.cycle.foot_poses),
            monkey_offset: self.monkey_offset(elapsed),
            giraffe_offset: self.giraffe_offset(elapsed),
            balloon: self.balloon.state(self, elapsed),
            title_alpha: self.title_alpha(elapsed),
            credits_progress: self.credits_progress(elapsed),
        }
    }

    pub(crate) fn pauses(&self) -> PauseSchedule<'a> {
        PauseSchedule::new(&self.cfg.camera.pauses)
    }

    pub fn camera_pos(&self, t: f64) -> f64 {
        camera_pos(self.pauses(), self.cfg.camera.scroll_speed, t)
    }

    fn cycle_signal(&self, t: f64) -> f64 {
        oscillate(t, self.cfg.cycle.period)
    }

    /// Shared oscillator with the head's pause freeze applied.
    fn head_signal(&self, t: f64) -> f64 {
        if self.pauses().active(t).is_some() {
            0.0
        } else {
            self.cycle_signal(t)
        }
    }

    pub fn head_angle(&self, t: f64) -> f64 {
        cyclic_angle(self.cfg.cycle.head_amplitude_deg, self.head_signal(t))
    }

    pub fn tail_angle(&self, t: f64) -> f64 {
        cyclic_angle(self.cfg.cycle.tail_amplitude_deg, self.cycle_signal(t))
    }

    pub fn arm_angle(&self, t: f64) -> f64 {
        cyclic_angle(self.cfg.cycle.arm_amplitude_deg, self.cycle_signal(t))
    }

    pub fn monkey_offset(&self, t: f64) -> Vec2 {
        let entry = &self.cfg.monkey.entry;
        entry_offset(
            entry,
            t,
            self.camera_pos(t),
            self.camera_pos(entry.interval.start),
        )
    }

    pub fn giraffe_offset(&self, t: f64) -> Vec2 {
        let entry = &self.cfg.giraffe.entry;
        entry_offset(
            entry,
            t,
            self.camera_pos(t),
            self.camera_pos(entry.interval.start),
        )
    }

    /// Screen position of the balloon string on the elephant's head.
    ///
    /// Counter-rotated by the head angle so the string stays on the drawn head.
    pub fn head_attach_point(&self, t: f64) -> Point {
        let e = &self.cfg.elephant;
        e.head_pivot + rotate_point(-self.head_angle(t), self.cfg.balloon.head_offset)
    }

    /// Screen position of the balloon string in the monkey's hand.
    pub fn hand_attach_point(&self, t: f64) -> Point {
        let m = &self.cfg.monkey;
        let arm = self.arm_angle(t);
        let shoulder = m.shoulder_pivot + self.monkey_offset(t);
        shoulder + rotate_point(-arm, m.hand_offset + self.cfg.balloon.hand_offset)
    }

    fn title_alpha(&self, t: f64) -> Option<f64> {
        let title = &self.cfg.title;
        if !title.enabled {
            return None;
        }
        let fade = title.fade;
        if t < fade.start {
            return Some(1.0);
        }
        if t >= fade.end() {
            return None;
        }
        Some(1.0 - progress(t, fade.start, fade.duration))
    }

    fn credits_progress(&self, t: f64) -> Option<f64> {
        let credits = &self.cfg.credits;
        if t < credits.start {
            return None;
        }
        let slide = credits.slide;
        Some(Ease::HalfCosine.apply(progress(t, slide.start, slide.duration)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/state.rs"]
mod tests;
