//! Carried-object state machine.
//!
//! The balloon starts tied to the elephant's head, drifts down after it is let go, is caught by
//! the monkey once the camera reaches it, and finally glides to a fixed spot on screen. Every
//! phase is a closed-form function of elapsed time; the only values that depend on an earlier
//! phase (the release point and the start of the glide) are evaluated analytically at their
//! transition timestamps when the track is built.

use crate::animation::ease::{Ease, progress, quadratic_drop};
use crate::foundation::core::{Point, Vec2};
use crate::timeline::state::Timeline;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum BalloonPhase {
    Attached,
    Falling,
    Held,
    Passover,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BalloonState {
    pub phase: BalloonPhase,
    /// Screen position of the attach point, authoring space.
    pub position: Point,
}

/// Phase boundaries on the scene clock.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhaseThresholds {
    pub detach: f64,
    /// First time the camera reaches the catch position; `None` if it never does.
    pub hold_start: Option<f64>,
    pub passover_start: f64,
    pub passover_end: f64,
}

/// Selects the active phase. Checked in the order Attached, Passover, Held, Falling.
pub fn select_phase(t: f64, th: &PhaseThresholds) -> BalloonPhase {
    if t < th.detach {
        BalloonPhase::Attached
    } else if t >= th.passover_start {
        BalloonPhase::Passover
    } else if th.hold_start.is_some_and(|h| t >= h) {
        BalloonPhase::Held
    } else {
        BalloonPhase::Falling
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BalloonTrack {
    thresholds: PhaseThresholds,
    /// World position (screen + camera) of the attach point at the moment of release.
    release_world: Point,
    /// Position the passover glide starts from.
    passover_base: Point,
}

impl BalloonTrack {
    pub(crate) fn new(tl: &Timeline<'_>) -> Self {
        let cfg = &tl.config().balloon;
        let speed = tl.config().camera.scroll_speed;

        let hold_start = if cfg.catch_camera_pos <= 0.0 {
            Some(0.0)
        } else if speed > 0.0 {
            Some(
                tl.pauses()
                    .first_time_at_virtual(cfg.catch_camera_pos / speed),
            )
        } else {
            None
        };
        let thresholds = PhaseThresholds {
            detach: cfg.detach_at,
            hold_start,
            passover_start: cfg.passover.start,
            passover_end: cfg.passover.end(),
        };

        let release_world =
            tl.head_attach_point(cfg.detach_at) + Vec2::new(tl.camera_pos(cfg.detach_at), 0.0);

        let mut track = Self {
            thresholds,
            release_world,
            passover_base: Point::ZERO,
        };
        let ps = cfg.passover.start;
        track.passover_base = match hold_start {
            Some(h) if h < ps => tl.hand_attach_point(ps),
            _ => track.falling(tl, ps),
        };
        track
    }

    #[cfg(test)]
    pub(crate) fn thresholds(&self) -> PhaseThresholds {
        self.thresholds
    }

    pub(crate) fn state(&self, tl: &Timeline<'_>, t: f64) -> BalloonState {
        let phase = select_phase(t, &self.thresholds);
        let position = match phase {
            BalloonPhase::Attached => tl.head_attach_point(t),
            BalloonPhase::Falling => self.falling(tl, t),
            BalloonPhase::Held => tl.hand_attach_point(t),
            BalloonPhase::Passover => self.passover(tl, t),
        };
        BalloonState { phase, position }
    }

    fn falling(&self, tl: &Timeline<'_>, t: f64) -> Point {
        let cfg = &tl.config().balloon;
        let drop = quadratic_drop(cfg.gravity, t - cfg.detach_at);
        self.release_world - Vec2::new(tl.camera_pos(t), drop)
    }

    fn passover(&self, tl: &Timeline<'_>, t: f64) -> Point {
        let cfg = &tl.config().balloon;
        if t >= self.thresholds.passover_end {
            return cfg.target;
        }
        let k = Ease::HalfSine.apply(progress(t, cfg.passover.start, cfg.passover.duration));
        self.passover_base.lerp(cfg.target, k)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/balloon.rs"]
mod tests;
