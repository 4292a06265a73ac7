use super::*;
use crate::scene::config::Interval;
use crate::timeline::balloon::BalloonPhase;

fn single_pause() -> SceneConfig {
    let mut cfg = SceneConfig::default();
    cfg.camera.pauses = vec![Interval::new(14.0, 3.0)];
    cfg
}

#[test]
fn camera_scenario_matches_hand_computed_values() {
    let cfg = single_pause();
    let tl = Timeline::new(&cfg).unwrap();
    assert_eq!(tl.state(15.0).camera_pos, 4200.0);
    assert!(tl.state(15.0).paused);
    assert_eq!(tl.state(20.0).camera_pos, 5100.0);
    assert!(!tl.state(20.0).paused);
}

#[test]
fn head_peaks_a_quarter_period_in() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    let s = tl.state(0.25);
    assert!((s.head_angle - 10f64.to_radians()).abs() < 1e-12);
    assert!((s.tail_angle - 20f64.to_radians()).abs() < 1e-12);
    assert_eq!(s.foot_pose, cfg.cycle.foot_poses - 1);
}

#[test]
fn head_freezes_during_a_pause_but_tail_keeps_going() {
    let cfg = single_pause();
    let tl = Timeline::new(&cfg).unwrap();
    let s = tl.state(15.25);
    assert_eq!(s.head_angle, 0.0);
    assert_eq!(s.foot_pose, 1);
    assert!((s.tail_angle - 20f64.to_radians()).abs() < 1e-9);
    assert!(s.arm_angle.abs() > 0.0);
}

#[test]
fn parallax_offsets_follow_the_camera() {
    let cfg = single_pause();
    let tl = Timeline::new(&cfg).unwrap();
    let s = tl.state(15.0);
    // 4200 * 0.5 = 2100 -> 180 into the second midground tile.
    assert!((s.midground_offsets[0] + 180.0).abs() < 1e-9);
    assert!((s.midground_offsets[1] - 1740.0).abs() < 1e-9);
    // 4200 * 1.5 = 6300 -> 540 into the fourth foreground tile.
    assert!((s.foreground_offsets[0] + 540.0).abs() < 1e-9);
}

#[test]
fn title_fades_out_then_disappears() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    assert_eq!(tl.state(0.0).title_alpha, Some(1.0));
    assert_eq!(tl.state(1.99).title_alpha, Some(1.0));
    let mid = tl.state(2.75).title_alpha.unwrap();
    assert!((mid - 0.5).abs() < 1e-9);
    assert_eq!(tl.state(3.5).title_alpha, None);

    let mut off = SceneConfig::default();
    off.title.enabled = false;
    let tl = Timeline::new(&off).unwrap();
    assert_eq!(tl.state(0.0).title_alpha, None);
}

#[test]
fn credits_show_up_late_and_slide_to_completion() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    assert_eq!(tl.state(51.9).credits_progress, None);
    assert_eq!(tl.state(53.0).credits_progress, Some(0.0));
    let mid = tl.state(56.75).credits_progress.unwrap();
    assert!((mid - 0.5).abs() < 1e-9);
    assert_eq!(tl.state(58.0).credits_progress, Some(1.0));
}

#[test]
fn giraffe_nods_only_inside_its_window() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    assert_eq!(tl.state(29.5).nod_angle, 0.0);
    assert!((tl.state(31.0).nod_angle - 25f64.to_radians()).abs() < 1e-9);
    assert_eq!(tl.state(32.5).nod_angle, 0.0);
}

#[test]
fn characters_come_in_with_the_world_then_settle() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    let entry = &cfg.monkey.entry;
    let before = tl.state(entry.interval.start - 1.0).monkey_offset;
    assert!((before.x - (entry.from.x + cfg.camera.scroll_speed)).abs() < 1e-9);
    assert_eq!(tl.state(entry.interval.end() + 1.0).monkey_offset, entry.rest);
}

#[test]
fn state_is_a_pure_function_of_time() {
    let cfg = SceneConfig::default();
    let tl = Timeline::new(&cfg).unwrap();
    for t in [0.0, 12.3, 24.0, 29.0, 35.2, 59.9] {
        assert_eq!(tl.state(t), tl.state(t));
    }
    assert_eq!(tl.state(1.0).balloon.phase, BalloonPhase::Attached);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut cfg = SceneConfig::default();
    cfg.cycle.period = 0.0;
    assert!(Timeline::new(&cfg).is_err());
}
