use std::f64::consts::{FRAC_PI_2, PI};

use super::*;

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn rotate_point_quarter_turn_is_counter_clockwise() {
    let v = rotate_point(FRAC_PI_2, Vec2::new(1.0, 0.0));
    assert!((v.x - 0.0).abs() < 1e-12);
    assert!((v.y - 1.0).abs() < 1e-12);

    let v = rotate_point(PI, Vec2::new(2.0, 3.0));
    assert!((v.x + 2.0).abs() < 1e-12);
    assert!((v.y + 3.0).abs() < 1e-12);
}

#[test]
fn flip_y_uses_last_row_as_origin() {
    assert_eq!(flip_y(Point::new(5.0, 0.0), 1080), Point::new(5.0, 1079.0));
    assert_eq!(flip_y(Point::new(5.0, 1079.0), 1080), Point::new(5.0, 0.0));
}

#[test]
fn rotate_about_keeps_pivot_fixed() {
    let pivot = Point::new(1008.0, 437.0);
    let xf = rotate_about(pivot, 0.7, 1080);
    let raster_pivot = flip_y(pivot, 1080);
    assert!(close(xf * raster_pivot, raster_pivot));
}

#[test]
fn rotate_about_counter_rotates_against_rotate_point() {
    let pivot = Point::new(1008.0, 437.0);
    let offset = Vec2::new(-120.0, 240.0);
    for angle in [-1.2, -0.3, 0.0, 0.4, 2.5] {
        let xf = rotate_about(pivot, angle, 1080);
        let drawn = xf * flip_y(pivot + offset, 1080);
        let expected = flip_y(pivot + rotate_point(-angle, offset), 1080);
        assert!(close(drawn, expected), "angle {angle}");
    }
}

#[test]
fn positive_angle_turns_clockwise_on_the_raster() {
    // Raster pivot is (1008, 642); a point 100px to its right swings down.
    let xf = rotate_about(Point::new(1008.0, 437.0), 0.5, 1080);
    let expected = Affine::translate((1008.0, 642.0))
        * Affine::rotate(0.5)
        * Affine::translate((-1008.0, -642.0));
    let drawn = xf * Point::new(1108.0, 642.0);
    assert!(close(drawn, expected * Point::new(1108.0, 642.0)));
    assert!((drawn.x - (1008.0 + 100.0 * 0.5f64.cos())).abs() < 1e-9);
    assert!((drawn.y - (642.0 + 100.0 * 0.5f64.sin())).abs() < 1e-9);
}

#[test]
fn translate_flips_vertical_component() {
    assert_eq!(
        translate(Vec2::new(3.0, 4.0)),
        Affine::translate(Vec2::new(3.0, -4.0))
    );
}
