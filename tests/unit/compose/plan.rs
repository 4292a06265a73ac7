use super::*;
use crate::timeline::balloon::BalloonPhase;
use crate::timeline::state::Timeline;
use crate::transform::flip_y;

fn plan_at(cfg: &SceneConfig, t: f64) -> FramePlan {
    let tl = Timeline::new(cfg).unwrap();
    compose_frame(&tl.state(t), cfg)
}

fn find(plan: &FramePlan, layer: Layer) -> Vec<DrawCommand> {
    plan.commands
        .iter()
        .copied()
        .filter(|c| c.layer == layer)
        .collect()
}

fn approx(a: Point, b: Point) -> bool {
    (a - b).hypot() < 1e-6
}

#[test]
fn opening_frame_draws_back_to_front_with_title() {
    let cfg = SceneConfig::default();
    let plan = plan_at(&cfg, 0.0);
    let layers: Vec<Layer> = plan.layers().collect();
    assert_eq!(
        layers,
        vec![
            Layer::Sky,
            Layer::Midground,
            Layer::Midground,
            Layer::GiraffeBody,
            Layer::GiraffeTail,
            Layer::GiraffeHead,
            Layer::MonkeyBody,
            Layer::MonkeyArm,
            Layer::Feet(1),
            Layer::Head,
            Layer::Balloon,
            Layer::Foreground,
            Layer::Foreground,
            Layer::Title,
        ]
    );
    assert_eq!(plan.canvas, cfg.canvas);
}

#[test]
fn title_goes_away_and_credits_come_last() {
    let cfg = SceneConfig::default();
    let plan = plan_at(&cfg, 57.0);
    assert!(find(&plan, Layer::Title).is_empty());
    let tail: Vec<Layer> = plan.layers().rev().take(2).collect();
    assert_eq!(tail, vec![Layer::Credits(1), Layer::Credits(0)]);
}

#[test]
fn title_opacity_follows_the_fade() {
    let cfg = SceneConfig::default();
    let title = find(&plan_at(&cfg, 2.75), Layer::Title);
    assert_eq!(title.len(), 1);
    assert!((title[0].opacity - 0.5).abs() < 1e-6);
}

#[test]
fn credit_panels_swap_over_the_slide() {
    let cfg = SceneConfig::default();
    let w = f64::from(cfg.canvas.width);

    let start = plan_at(&cfg, cfg.credits.slide.start);
    assert_eq!(find(&start, Layer::Credits(0))[0].transform, Affine::IDENTITY);
    let b = find(&start, Layer::Credits(1))[0].transform;
    assert!((b.translation().x - w).abs() < 1e-9);

    let done = plan_at(&cfg, cfg.credits.slide.end() + 0.5);
    let a = find(&done, Layer::Credits(0))[0].transform;
    assert!((a.translation().x + w).abs() < 1e-9);
    assert!(find(&done, Layer::Credits(1))[0].transform.translation().hypot() < 1e-9);
}

#[test]
fn head_rotation_keeps_its_pivot_fixed() {
    let cfg = SceneConfig::default();
    let plan = plan_at(&cfg, 0.25);
    let head = find(&plan, Layer::Head)[0];
    let pivot = flip_y(cfg.elephant.head_pivot, cfg.canvas.height);
    assert!(approx(head.transform * pivot, pivot));
    assert_ne!(head.transform, Affine::IDENTITY);
}

#[test]
fn balloon_rides_the_rotated_head_and_hand() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    let h = cfg.canvas.height;

    let state = tl.state(0.25);
    assert_eq!(state.balloon.phase, BalloonPhase::Attached);
    let head = find(&compose_frame(&state, &cfg), Layer::Head)[0].transform;
    let string_on_head = flip_y(cfg.elephant.head_pivot + cfg.balloon.head_offset, h);
    assert!(approx(head * string_on_head, flip_y(state.balloon.position, h)));

    let state = tl.state(30.25);
    assert_eq!(state.balloon.phase, BalloonPhase::Held);
    let arm = find(&compose_frame(&state, &cfg), Layer::MonkeyArm)[0].transform;
    let m = &cfg.monkey;
    let hand_on_arm = flip_y(m.shoulder_pivot + m.hand_offset + cfg.balloon.hand_offset, h);
    assert!(approx(arm * hand_on_arm, flip_y(state.balloon.position, h)));
}

#[test]
fn sibling_transforms_do_not_leak() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    let state = tl.state(30.25);
    let plan = compose_frame(&state, &cfg);

    let body = find(&plan, Layer::MonkeyBody)[0].transform;
    assert_eq!(body, translate(state.monkey_offset));
    assert_eq!(find(&plan, Layer::GiraffeBody)[0].transform, translate(state.giraffe_offset));
    assert_eq!(find(&plan, Layer::Feet(state.foot_pose))[0].transform, Affine::IDENTITY);

    let fg = find(&plan, Layer::Foreground);
    assert_eq!(fg[0].transform, translate(Vec2::new(state.foreground_offsets[0], 0.0)));
    assert_eq!(fg[1].transform, translate(Vec2::new(state.foreground_offsets[1], 0.0)));
}

#[test]
fn arm_rotates_about_the_moved_shoulder() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    let state = tl.state(30.25);
    let plan = compose_frame(&state, &cfg);

    let arm = find(&plan, Layer::MonkeyArm)[0].transform;
    let shoulder = flip_y(cfg.monkey.shoulder_pivot, cfg.canvas.height);
    let moved = flip_y(cfg.monkey.shoulder_pivot + state.monkey_offset, cfg.canvas.height);
    assert!(approx(arm * shoulder, moved));
}

#[test]
fn balloon_layer_lands_on_its_computed_position() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    let h = cfg.canvas.height;
    for t in [1.0, 26.0, 31.0, 35.0, 45.0] {
        let state = tl.state(t);
        let plan = compose_frame(&state, &cfg);
        let balloon = find(&plan, Layer::Balloon)[0].transform;
        let anchor = flip_y(cfg.elephant.head_pivot + cfg.balloon.head_offset, h);
        assert!(
            approx(balloon * anchor, flip_y(state.balloon.position, h)),
            "t={t} phase={:?}",
            state.balloon.phase
        );
    }
    assert_eq!(tl.state(45.0).balloon.phase, BalloonPhase::Passover);
}

#[test]
fn foot_layer_follows_the_pose_index() {
    let cfg = SceneConfig::default();
    assert_eq!(find(&plan_at(&cfg, 0.25), Layer::Feet(2)).len(), 1);
    assert_eq!(find(&plan_at(&cfg, 0.75), Layer::Feet(0)).len(), 1);
}

#[test]
fn stack_composes_and_restores() {
    let mut s = TransformStack::new();
    s.push(Affine::translate((10.0, 0.0)));
    s.push(Affine::scale(2.0));
    assert_eq!(s.depth(), 2);
    assert!(approx(s.current() * Point::new(1.0, 1.0), Point::new(12.0, 2.0)));
    s.pop();
    s.pop();
    assert_eq!(s.current(), Affine::IDENTITY);
    assert_eq!(s.depth(), 0);
}
