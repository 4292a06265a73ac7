use crate::foundation::core::{Affine, Canvas, Point, Vec2};
use crate::scene::config::SceneConfig;
use crate::scene::layers::Layer;
use crate::timeline::state::SceneState;
use crate::transform::{rotate_about, translate};

/// One layer draw: which layer, under which raster transform, at which opacity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub layer: Layer,
    /// Authoring-space raster transform (Y-down); the renderer prepends the output scale.
    pub transform: Affine,
    pub opacity: f32,
}

/// Ordered draw list for one frame, back to front.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub canvas: Canvas,
    pub commands: Vec<DrawCommand>,
}

impl FramePlan {
    pub fn layers(&self) -> impl DoubleEndedIterator<Item = Layer> + '_ {
        self.commands.iter().map(|c| c.layer)
    }
}

/// Save/restore stack of local coordinate changes.
///
/// Every `push` must be matched by a `pop`; the bottom entry is the identity and is never popped.
#[derive(Debug)]
struct TransformStack {
    stack: Vec<Affine>,
}

impl TransformStack {
    fn new() -> Self {
        Self {
            stack: vec![Affine::IDENTITY],
        }
    }

    fn current(&self) -> Affine {
        self.stack.last().copied().unwrap_or(Affine::IDENTITY)
    }

    fn push(&mut self, local: Affine) {
        let next = self.current() * local;
        self.stack.push(next);
    }

    fn pop(&mut self) {
        debug_assert!(self.stack.len() > 1, "unbalanced transform pop");
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn depth(&self) -> usize {
        self.stack.len() - 1
    }
}

struct PlanBuilder {
    stack: TransformStack,
    commands: Vec<DrawCommand>,
}

impl PlanBuilder {
    fn new() -> Self {
        Self {
            stack: TransformStack::new(),
            commands: Vec::with_capacity(24),
        }
    }

    fn draw(&mut self, layer: Layer) {
        self.draw_with_opacity(layer, 1.0);
    }

    fn draw_with_opacity(&mut self, layer: Layer, opacity: f32) {
        self.commands.push(DrawCommand {
            layer,
            transform: self.stack.current(),
            opacity,
        });
    }

    /// Draws `layer` under a local transform without disturbing later siblings.
    fn draw_local(&mut self, local: Affine, layer: Layer) {
        self.stack.push(local);
        self.draw(layer);
        self.stack.pop();
    }

    fn tiled(&mut self, layer: Layer, offsets: [f64; 2]) {
        for x in offsets {
            self.draw_local(translate(Vec2::new(x, 0.0)), layer);
        }
    }
}

/// Turns a scene state into the frame's draw list.
///
/// Depth order: sky, midground tiles, giraffe, monkey, elephant feet, elephant head, balloon,
/// foreground tiles, title card, credits.
pub fn compose_frame(state: &SceneState, cfg: &SceneConfig) -> FramePlan {
    let h = cfg.canvas.height;
    let mut b = PlanBuilder::new();

    b.draw(Layer::Sky);
    b.tiled(Layer::Midground, state.midground_offsets);

    let giraffe = &cfg.giraffe;
    b.stack.push(translate(state.giraffe_offset));
    b.draw(Layer::GiraffeBody);
    b.draw_local(
        rotate_about(giraffe.tail_pivot, state.tail_angle, h),
        Layer::GiraffeTail,
    );
    b.draw_local(
        rotate_about(giraffe.neck_pivot, state.nod_angle, h),
        Layer::GiraffeHead,
    );
    b.stack.pop();

    let monkey = &cfg.monkey;
    b.stack.push(translate(state.monkey_offset));
    b.draw(Layer::MonkeyBody);
    b.draw_local(
        rotate_about(monkey.shoulder_pivot, state.arm_angle, h),
        Layer::MonkeyArm,
    );
    b.stack.pop();

    b.draw(Layer::Feet(state.foot_pose));
    b.draw_local(
        rotate_about(cfg.elephant.head_pivot, state.head_angle, h),
        Layer::Head,
    );
    b.draw_local(
        translate(state.balloon.position - balloon_anchor(cfg)),
        Layer::Balloon,
    );

    b.tiled(Layer::Foreground, state.foreground_offsets);

    if let Some(alpha) = state.title_alpha {
        b.draw_with_opacity(Layer::Title, alpha.clamp(0.0, 1.0) as f32);
    }
    if let Some(p) = state.credits_progress {
        let w = f64::from(cfg.canvas.width);
        b.draw_local(translate(Vec2::new(-w * p, 0.0)), Layer::Credits(0));
        b.draw_local(translate(Vec2::new(w * (1.0 - p), 0.0)), Layer::Credits(1));
    }

    debug_assert_eq!(b.stack.depth(), 0);
    FramePlan {
        canvas: cfg.canvas,
        commands: b.commands,
    }
}

/// Where the balloon's string end sits in the unmodified drawing.
fn balloon_anchor(cfg: &SceneConfig) -> Point {
    cfg.elephant.head_pivot + cfg.balloon.head_offset
}

#[cfg(test)]
#[path = "../../tests/unit/compose/plan.rs"]
mod tests;
