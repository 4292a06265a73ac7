use std::f64::consts::PI;

use crate::animation::ease::{Ease, progress};
use crate::foundation::core::Vec2;
use crate::scene::config::{EntryConfig, GateConfig};

/// Rotation (radians) of a cyclic body part for a shared oscillator value in `[-1, 1]`.
pub fn cyclic_angle(amplitude_deg: f64, signal: f64) -> f64 {
    amplitude_deg.to_radians() * signal
}

/// Walk-cycle pose for an oscillator value: `-1 → 0`, `+1 → poses - 1`, nearest in between.
pub fn foot_pose_index(signal: f64, poses: usize) -> usize {
    if poses <= 1 {
        return 0;
    }
    let max = (poses - 1) as f64;
    let idx = ((signal.clamp(-1.0, 1.0) + 1.0) / 2.0 * max).round();
    idx.clamp(0.0, max) as usize
}

/// Screen offset of an entering character.
///
/// Before the slide the character is parked in the world, so it drifts with the camera and
/// reaches `from` exactly when the slide starts. During the slide it moves linearly to `rest`,
/// after which it stays pinned to the screen.
pub fn entry_offset(entry: &EntryConfig, t: f64, camera_now: f64, camera_at_start: f64) -> Vec2 {
    let iv = entry.interval;
    if t < iv.start {
        return entry.from + Vec2::new(camera_at_start - camera_now, 0.0);
    }
    if t > iv.end() {
        return entry.rest;
    }
    let k = Ease::Linear.apply(progress(t, iv.start, iv.duration));
    entry.from.lerp(entry.rest, k)
}

/// Half-sine rotation pulse (radians) inside the gate window, zero everywhere else.
pub fn gated_pulse(gate: &GateConfig, t: f64) -> f64 {
    let w = gate.window;
    if w.duration <= 0.0 || t < w.start || t > w.end() {
        return 0.0;
    }
    let p = progress(t, w.start, w.duration);
    gate.amplitude_deg.to_radians() * (p * PI).sin()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/motion.rs"]
mod tests;
