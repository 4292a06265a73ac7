//! 2D helpers bridging the Y-up authoring space and the Y-down raster space.
//!
//! Scene geometry (pivots, offsets, balloon positions) is authored with the origin at the
//! bottom-left of the frame. The renderer draws with the origin at the top-left, so every pivot is
//! flipped (`y' = frame_height - 1 - y`) before it reaches a raster transform.

use crate::foundation::core::{Affine, Point, Vec2};

/// Rotate `v` by `angle` radians, counter-clockwise positive in the Y-up authoring frame.
pub fn rotate_point(angle: f64, v: Vec2) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Flip an authoring-space point into raster space.
pub fn flip_y(p: Point, frame_height: u32) -> Point {
    Point::new(p.x, f64::from(frame_height) - 1.0 - p.y)
}

/// Raster transform that rigidly rotates a layer by `angle` about the authoring-space `pivot`.
///
/// Equivalent to translate(-pivot) → rotate(angle) → translate(pivot) with the pivot flipped into
/// raster space. The rotation is applied in the Y-down raster frame, so a positive angle turns the
/// layer clockwise on screen and a point on the layer follows `rotate_point(-angle, ..)`.
pub fn rotate_about(pivot: Point, angle: f64, frame_height: u32) -> Affine {
    let p = flip_y(pivot, frame_height).to_vec2();
    Affine::translate(p) * Affine::rotate(angle) * Affine::translate(-p)
}

/// Raster translation for an authoring-space offset.
pub fn translate(offset: Vec2) -> Affine {
    Affine::translate(Vec2::new(offset.x, -offset.y))
}

#[cfg(test)]
#[path = "../tests/unit/transform/transform.rs"]
mod tests;
