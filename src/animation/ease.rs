use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// One-shot easing shapes over a normalized progress in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// `t`; constant-velocity scroll and straight-line entrances.
    Linear,
    /// `sin(t·π/2)`; fast start, settles on arrival.
    HalfSine,
    /// `(1 − cos(t·π)) / 2`; smooth start and stop.
    HalfCosine,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::HalfSine => (t * FRAC_PI_2).sin(),
            Self::HalfCosine => (1.0 - (t * PI).cos()) / 2.0,
        }
    }
}

/// Fraction of `[start, start + duration]` covered at `elapsed`, clamped to `[0, 1]`.
///
/// A zero-length window jumps from 0 to 1 at `start`.
pub fn progress(elapsed: f64, start: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return if elapsed >= start { 1.0 } else { 0.0 };
    }
    ((elapsed - start) / duration).clamp(0.0, 1.0)
}

/// Unnormalized cyclic signal `sin(elapsed · 2π / period)`.
pub fn oscillate(elapsed: f64, period: f64) -> f64 {
    (elapsed * TAU / period).sin()
}

/// Free-fall distance `g·dt²/2` after `dt` seconds; zero for negative `dt`.
pub fn quadratic_drop(gravity: f64, dt: f64) -> f64 {
    let dt = dt.max(0.0);
    0.5 * gravity * dt * dt
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
