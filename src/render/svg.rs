use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use resvg::tiny_skia::{Color, Pixmap, PixmapMut, PixmapPaint, Transform};

use crate::compose::plan::DrawCommand;
use crate::foundation::core::{Affine, Canvas};
use crate::foundation::error::{ElephantError, ElephantResult};
use crate::foundation::math::flatten_premul_rgba8_to_rgb24;
use crate::render::backend::{FrameRgb, LayerRenderer};
use crate::scene::config::SceneConfig;
use crate::scene::layers::{Layer, LayerTable};

/// Parsed scene drawing plus the lookup data needed to draw its layers.
///
/// Cloning shares the parsed tree, so one load can feed any number of renderers.
#[derive(Clone)]
pub struct SvgScene {
    tree: Arc<usvg::Tree>,
    layers: LayerTable,
    canvas: Canvas,
    background: [u8; 3],
}

impl std::fmt::Debug for SvgScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgScene")
            .field("size", &self.tree.size())
            .field("canvas", &self.canvas)
            .finish_non_exhaustive()
    }
}

impl SvgScene {
    /// Read and parse the scene drawing named by `cfg.assets.svg`.
    #[tracing::instrument(level = "debug", skip(cfg), fields(path = %cfg.assets.svg.display()))]
    pub fn load(cfg: &SceneConfig) -> ElephantResult<Self> {
        let path = &cfg.assets.svg;
        let bytes = std::fs::read(path)
            .with_context(|| format!("read scene drawing '{}'", path.display()))?;
        Self::from_data(&bytes, path.parent(), cfg)
    }

    pub fn from_data(
        bytes: &[u8],
        resources_dir: Option<&Path>,
        cfg: &SceneConfig,
    ) -> ElephantResult<Self> {
        let opts = usvg::Options {
            resources_dir: resources_dir.map(Path::to_path_buf),
            fontdb: build_fontdb(resources_dir),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(bytes, &opts).context("parse scene drawing")?;
        tracing::debug!(
            width = tree.size().width(),
            height = tree.size().height(),
            "parsed scene drawing"
        );
        Ok(Self {
            tree: Arc::new(tree),
            layers: cfg.layers.clone(),
            canvas: cfg.canvas,
            background: cfg.encode.background_rgb,
        })
    }

    /// Ids from the layer table with no element in the drawing.
    pub fn missing_layers(&self) -> Vec<String> {
        self.layers
            .layers()
            .into_iter()
            .filter_map(|layer| self.layers.id(layer).ok())
            .filter(|id| self.tree.node_by_id(id).is_none())
            .map(str::to_owned)
            .collect()
    }

    fn lookup(&self, layer: Layer) -> ElephantResult<(&str, &usvg::Node)> {
        let id = self
            .layers
            .id(layer)
            .map_err(|e| ElephantError::render(format!("{layer:?}"), e.to_string()))?;
        let node = self
            .tree
            .node_by_id(id)
            .ok_or_else(|| ElephantError::render(id, "no element with this id in the drawing"))?;
        Ok((id, node))
    }
}

fn build_fontdb(resources_dir: Option<&Path>) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    if let Some(dir) = resources_dir {
        db.load_fonts_dir(dir.join("fonts"));
    }
    Arc::new(db)
}

/// CPU layer renderer backed by `resvg`.
///
/// Owns the output surface, so each worker thread needs its own instance.
pub struct SvgRenderer {
    scene: SvgScene,
    surface: Pixmap,
    /// Offscreen target for layers drawn with partial opacity.
    scratch: Pixmap,
    /// Title card rasterized on first use.
    title: Option<Pixmap>,
    rgb: Vec<u8>,
}

impl SvgRenderer {
    pub fn new(scene: SvgScene) -> ElephantResult<Self> {
        let (w, h) = (scene.canvas.output_width(), scene.canvas.output_height());
        Ok(Self {
            surface: alloc_pixmap(w, h)?,
            scratch: alloc_pixmap(w, h)?,
            title: None,
            rgb: Vec::with_capacity(FrameRgb::byte_len(w, h)),
            scene,
        })
    }

    pub fn scene(&self) -> &SvgScene {
        &self.scene
    }

    fn draw_translucent(&mut self, cmd: &DrawCommand) -> ElephantResult<()> {
        let base = self.scene.canvas.output_affine();
        let (id, node) = self.scene.lookup(cmd.layer)?;

        if cmd.layer == Layer::Title && self.title.is_none() {
            let mut pm = alloc_pixmap(self.surface.width(), self.surface.height())?;
            draw_node(node, id, base, &mut pm.as_mut())?;
            self.title = Some(pm);
        }
        let src = match (cmd.layer, &self.title) {
            (Layer::Title, Some(title)) => title,
            _ => {
                self.scratch.fill(Color::TRANSPARENT);
                draw_node(node, id, base, &mut self.scratch.as_mut())?;
                &self.scratch
            }
        };

        let paint = PixmapPaint {
            opacity: cmd.opacity,
            ..Default::default()
        };
        let xf = base * cmd.transform * base.inverse();
        self.surface
            .draw_pixmap(0, 0, src.as_ref(), &paint, to_skia(xf), None);
        Ok(())
    }
}

impl LayerRenderer for SvgRenderer {
    fn output_size(&self) -> (u32, u32) {
        (self.surface.width(), self.surface.height())
    }

    fn begin_frame(&mut self) -> ElephantResult<()> {
        let [r, g, b] = self.scene.background;
        self.surface.fill(Color::from_rgba8(r, g, b, 255));
        Ok(())
    }

    fn draw_layer(&mut self, cmd: &DrawCommand) -> ElephantResult<()> {
        if cmd.opacity <= 0.0 {
            return Ok(());
        }
        if cmd.opacity < 1.0 {
            return self.draw_translucent(cmd);
        }
        let (id, node) = self.scene.lookup(cmd.layer)?;
        let xf = self.scene.canvas.output_affine() * cmd.transform;
        draw_node(node, id, xf, &mut self.surface.as_mut())
    }

    fn finish_frame(&mut self) -> ElephantResult<FrameRgb> {
        flatten_premul_rgba8_to_rgb24(&mut self.rgb, self.surface.data(), self.scene.background);
        Ok(FrameRgb {
            width: self.surface.width(),
            height: self.surface.height(),
            data: self.rgb.clone(),
        })
    }

    fn worker_scene(&self) -> Option<SvgScene> {
        Some(self.scene.clone())
    }
}

fn alloc_pixmap(width: u32, height: u32) -> ElephantResult<Pixmap> {
    Pixmap::new(width, height).ok_or_else(|| {
        ElephantError::validation(format!("cannot allocate a {width}x{height} render surface"))
    })
}

/// Draw one element of the document at its own place under `xf`.
fn draw_node(
    node: &usvg::Node,
    id: &str,
    xf: Affine,
    target: &mut PixmapMut<'_>,
) -> ElephantResult<()> {
    let placement =
        node_placement(node).ok_or_else(|| ElephantError::render(id, "layer has no drawable bounds"))?;
    resvg::render_node(node, to_skia(xf).pre_concat(placement), target)
        .ok_or_else(|| ElephantError::render(id, "renderer produced no output"))
}

/// `render_node` draws a node relative to its layer bounding box and without its ancestors'
/// transforms; this maps it back to where it sits in the full document.
fn node_placement(node: &usvg::Node) -> Option<Transform> {
    let bbox = node.abs_layer_bounding_box()?;
    let own = match node {
        usvg::Node::Group(g) => g.transform(),
        _ => Transform::identity(),
    };
    let parent = node.abs_transform().pre_concat(own.invert()?);
    Some(parent.pre_translate(bbox.x(), bbox.y()))
}

fn to_skia(a: Affine) -> Transform {
    let [a, b, c, d, e, f] = a.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
