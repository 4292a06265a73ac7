use super::*;
use crate::compose::plan::FramePlan;
use crate::foundation::core::Vec2;
use crate::transform::translate;

const FIXTURE: &[u8] = include_bytes!("../../fixtures/scene.svg");

const BLUE: [u8; 3] = [0, 0, 255];
const RED: [u8; 3] = [255, 0, 0];

fn test_cfg() -> SceneConfig {
    let mut cfg = SceneConfig::default();
    cfg.canvas = Canvas {
        width: 40,
        height: 20,
        scale: 2,
    };
    cfg
}

fn renderer_for(cfg: &SceneConfig) -> SvgRenderer {
    SvgRenderer::new(SvgScene::from_data(FIXTURE, None, cfg).unwrap()).unwrap()
}

fn cmd(layer: Layer) -> DrawCommand {
    DrawCommand {
        layer,
        transform: Affine::IDENTITY,
        opacity: 1.0,
    }
}

fn render(r: &mut SvgRenderer, commands: Vec<DrawCommand>) -> FrameRgb {
    let plan = FramePlan {
        canvas: test_cfg().canvas,
        commands,
    };
    r.render_plan(&plan).unwrap()
}

#[test]
fn fixture_defines_every_default_layer() {
    let r = renderer_for(&test_cfg());
    assert!(r.scene().missing_layers().is_empty());
    assert_eq!(r.output_size(), (20, 10));
}

#[test]
fn empty_plan_is_the_background() {
    let mut r = renderer_for(&test_cfg());
    let frame = render(&mut r, vec![]);
    assert_eq!(frame.data.len(), FrameRgb::byte_len(20, 10));
    assert!(frame.data.chunks_exact(3).all(|px| px == [255, 255, 255]));
}

#[test]
fn later_layers_cover_earlier_ones() {
    let mut r = renderer_for(&test_cfg());
    let frame = render(&mut r, vec![cmd(Layer::Sky), cmd(Layer::Head)]);
    assert_eq!(frame.pixel(2, 2), Some(RED));
    assert_eq!(frame.pixel(8, 2), Some(BLUE));

    let frame = render(&mut r, vec![cmd(Layer::Head), cmd(Layer::Sky)]);
    assert_eq!(frame.pixel(2, 2), Some(BLUE));
}

#[test]
fn transforms_move_layers_in_authoring_space() {
    let mut r = renderer_for(&test_cfg());
    let right = DrawCommand {
        transform: translate(Vec2::new(20.0, 0.0)),
        ..cmd(Layer::Head)
    };
    let frame = render(&mut r, vec![cmd(Layer::Sky), right]);
    assert_eq!(frame.pixel(12, 2), Some(RED));
    assert_eq!(frame.pixel(2, 2), Some(BLUE));

    // Positive y is up, so a negative offset moves the layer down the raster.
    let down = DrawCommand {
        transform: translate(Vec2::new(0.0, -10.0)),
        ..cmd(Layer::Head)
    };
    let frame = render(&mut r, vec![cmd(Layer::Sky), down]);
    assert_eq!(frame.pixel(2, 7), Some(RED));
    assert_eq!(frame.pixel(2, 2), Some(BLUE));
}

#[test]
fn document_transforms_are_kept() {
    let mut r = renderer_for(&test_cfg());
    let frame = render(
        &mut r,
        vec![cmd(Layer::Sky), cmd(Layer::MonkeyBody), cmd(Layer::GiraffeBody)],
    );
    assert_eq!(frame.pixel(11, 1), Some([255, 0, 255]));
    assert_eq!(frame.pixel(13, 6), Some([0, 255, 255]));
    assert_eq!(frame.pixel(1, 1), Some(BLUE));
}

#[test]
fn missing_layer_fails_naming_the_id() {
    let mut cfg = test_cfg();
    cfg.layers.balloon = "nope".to_string();
    let mut r = renderer_for(&cfg);
    assert_eq!(r.scene().missing_layers(), vec!["nope".to_string()]);

    r.begin_frame().unwrap();
    let err = r.draw_layer(&cmd(Layer::Balloon)).unwrap_err();
    match err {
        ElephantError::Render { layer, .. } => assert_eq!(layer, "nope"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn translucent_title_blends_over_the_frame() {
    let mut r = renderer_for(&test_cfg());
    let title = DrawCommand {
        opacity: 0.5,
        ..cmd(Layer::Title)
    };
    let frame = render(&mut r, vec![cmd(Layer::Sky), title]);
    let [red, green, blue] = frame.pixel(10, 5).unwrap();
    assert!((126..=129).contains(&red), "{red}");
    assert!((126..=129).contains(&green), "{green}");
    assert_eq!(blue, 255);
    assert!(r.title.is_some());

    let gone = DrawCommand {
        opacity: 0.0,
        ..cmd(Layer::Title)
    };
    let frame = render(&mut r, vec![cmd(Layer::Sky), gone]);
    assert_eq!(frame.pixel(10, 5), Some(BLUE));
}

#[test]
fn translucent_layers_honor_their_transform() {
    let mut r = renderer_for(&test_cfg());
    let head = DrawCommand {
        transform: translate(Vec2::new(20.0, 0.0)),
        opacity: 0.5,
        ..cmd(Layer::Head)
    };
    let frame = render(&mut r, vec![cmd(Layer::Sky), head]);
    let [red, _, blue] = frame.pixel(12, 2).unwrap();
    assert!(red > 100 && blue > 100, "{red} {blue}");
    assert_eq!(frame.pixel(2, 2), Some(BLUE));
}

#[test]
fn workers_share_the_parsed_drawing() {
    let r = renderer_for(&test_cfg());
    let scene = r.worker_scene().unwrap();
    assert!(Arc::ptr_eq(&scene.tree, &r.scene().tree));
}
