use crate::compose::plan::{DrawCommand, FramePlan};
use crate::foundation::error::ElephantResult;

/// A composed frame as tightly packed, row-major RGB24 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRgb {
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }

    /// RGB triple at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }
}

/// Draws named layers of the scene onto one reused output surface.
///
/// A frame is `begin_frame`, then one `draw_layer` per command in order, then `finish_frame`.
/// Any layer failure aborts the frame.
pub trait LayerRenderer {
    /// Output surface size in pixels.
    fn output_size(&self) -> (u32, u32);

    /// Reset the surface to the background.
    fn begin_frame(&mut self) -> ElephantResult<()>;

    fn draw_layer(&mut self, cmd: &DrawCommand) -> ElephantResult<()>;

    /// Flatten the surface into an RGB24 frame.
    fn finish_frame(&mut self) -> ElephantResult<FrameRgb>;

    fn render_plan(&mut self, plan: &FramePlan) -> ElephantResult<FrameRgb> {
        self.begin_frame()?;
        for cmd in &plan.commands {
            self.draw_layer(cmd)?;
        }
        self.finish_frame()
    }

    /// Shared immutable scene data for building equivalent renderers on worker threads.
    ///
    /// Renderers that cannot be replicated return `None` and are only driven sequentially.
    fn worker_scene(&self) -> Option<crate::render::svg::SvgScene> {
        None
    }
}
