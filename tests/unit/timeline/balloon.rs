use super::*;
use crate::scene::config::SceneConfig;

fn dist(a: Point, b: Point) -> f64 {
    (a - b).hypot()
}

fn thresholds() -> PhaseThresholds {
    PhaseThresholds {
        detach: 10.0,
        hold_start: Some(15.0),
        passover_start: 20.0,
        passover_end: 23.0,
    }
}

#[test]
fn exactly_one_phase_for_every_time() {
    let th = thresholds();
    let mut seen = Vec::new();
    for i in 0..=3000 {
        let t = f64::from(i) * 0.01;
        let phase = select_phase(t, &th);
        if seen.last() != Some(&phase) {
            seen.push(phase);
        }
    }
    assert_eq!(
        seen,
        vec![
            BalloonPhase::Attached,
            BalloonPhase::Falling,
            BalloonPhase::Held,
            BalloonPhase::Passover
        ]
    );
}

#[test]
fn passover_is_checked_before_held() {
    let th = PhaseThresholds {
        hold_start: Some(21.0),
        ..thresholds()
    };
    assert_eq!(select_phase(19.0, &th), BalloonPhase::Falling);
    assert_eq!(select_phase(22.0, &th), BalloonPhase::Passover);
}

#[test]
fn never_caught_skips_held() {
    let th = PhaseThresholds {
        hold_start: None,
        ..thresholds()
    };
    assert_eq!(select_phase(18.0, &th), BalloonPhase::Falling);
    assert_eq!(select_phase(20.0, &th), BalloonPhase::Passover);
}

#[test]
fn builtin_catch_happens_when_camera_reaches_monkey() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    let th = BalloonTrack::new(&tl).thresholds();
    let hold = th.hold_start.unwrap();
    assert!((tl.camera_pos(hold) - cfg.balloon.catch_camera_pos).abs() < 1e-6);
    assert!(th.detach < hold && hold < th.passover_start);
}

#[test]
fn position_is_continuous_at_release() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    let t = cfg.balloon.detach_at;
    for eps in [1e-2, 1e-4, 1e-6] {
        let before = tl.state(t - eps).balloon;
        let after = tl.state(t + eps).balloon;
        assert_eq!(before.phase, BalloonPhase::Attached);
        assert_eq!(after.phase, BalloonPhase::Falling);
        assert!(dist(before.position, after.position) < 1e5 * eps);
    }
}

#[test]
fn position_is_continuous_across_the_passover() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    for t in [cfg.balloon.passover.start, cfg.balloon.passover.end()] {
        let mut prev_gap = f64::INFINITY;
        for eps in [1e-2, 1e-4, 1e-6] {
            let gap = dist(
                tl.state(t - eps).balloon.position,
                tl.state(t + eps).balloon.position,
            );
            assert!(gap <= prev_gap + 1e-9);
            prev_gap = gap;
        }
        assert!(prev_gap < 1e-2, "jump at t={t}: {prev_gap}");
    }
}

#[test]
fn held_balloon_follows_the_hand() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    let s = tl.state(31.3);
    assert_eq!(s.balloon.phase, BalloonPhase::Held);
    assert_eq!(s.balloon.position, tl.hand_attach_point(31.3));
}

#[test]
fn falling_balloon_recedes_with_the_camera() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    let a = tl.state(25.0).balloon;
    let b = tl.state(26.0).balloon;
    assert_eq!(a.phase, BalloonPhase::Falling);
    assert!((a.position.x - b.position.x - cfg.camera.scroll_speed).abs() < 1e-6);
    assert!(b.position.y < a.position.y);
}

#[test]
fn balloon_is_pinned_after_the_passover() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    let end = cfg.balloon.passover.end();
    assert_eq!(tl.state(end).balloon.position, cfg.balloon.target);
    assert_eq!(tl.state(end + 10.0).balloon.position, cfg.balloon.target);
}
