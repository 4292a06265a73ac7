use crate::scene::config::Interval;

/// Camera hold schedule. Time inside a pause does not advance the camera.
///
/// Intervals must be disjoint and sorted by start (enforced by `SceneConfig::validate`).
#[derive(Clone, Copy, Debug)]
pub struct PauseSchedule<'a> {
    pauses: &'a [Interval],
}

impl<'a> PauseSchedule<'a> {
    pub fn new(pauses: &'a [Interval]) -> Self {
        Self { pauses }
    }

    /// The pause in progress at `t`, if any.
    pub fn active(&self, t: f64) -> Option<Interval> {
        for pause in self.pauses {
            if t < pause.start {
                return None;
            }
            if pause.contains(t) {
                return Some(*pause);
            }
        }
        None
    }

    /// Total paused time accumulated up to `t`.
    pub fn paused_before(&self, t: f64) -> f64 {
        let mut acc = 0.0;
        for pause in self.pauses {
            if t < pause.start {
                break;
            }
            if t < pause.end() {
                acc += t - pause.start;
                break;
            }
            acc += pause.duration;
        }
        acc
    }

    /// Elapsed time with paused spans removed.
    pub fn virtual_time(&self, t: f64) -> f64 {
        t - self.paused_before(t)
    }

    /// Earliest real time at which the camera clock reads `v`.
    pub fn first_time_at_virtual(&self, v: f64) -> f64 {
        let mut t = v;
        for pause in self.pauses {
            if pause.start < t {
                t += pause.duration;
            } else {
                break;
            }
        }
        t
    }
}

/// World scroll distance at `t`.
pub fn camera_pos(pauses: PauseSchedule<'_>, scroll_speed: f64, t: f64) -> f64 {
    pauses.virtual_time(t) * scroll_speed
}

/// Horizontal offsets of the two copies of a repeating band scrolled to `p`.
///
/// The first copy sits in `(-tile, 0]` and the second exactly one tile to its right, so together
/// they cover any span of width `tile` starting at 0.
pub fn tile_offsets(p: f64, tile: f64) -> [f64; 2] {
    let m = p.rem_euclid(tile);
    [-m, tile - m]
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/camera.rs"]
mod tests;
