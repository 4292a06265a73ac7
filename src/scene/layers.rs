use crate::foundation::error::{ElephantError, ElephantResult};

/// Semantic layer names of the scene's vector image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Sky,
    Midground,
    Foreground,
    /// Elephant body with one walk-cycle leg pose.
    Feet(usize),
    Head,
    Balloon,
    MonkeyBody,
    MonkeyArm,
    GiraffeBody,
    GiraffeTail,
    GiraffeHead,
    Title,
    /// Credit panel, `0` slides out and `1` slides in.
    Credits(usize),
}

/// Lookup table from [`Layer`] to element id in the SVG document.
///
/// Ids are stored without the leading `#`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayerTable {
    pub sky: String,
    pub midground: String,
    pub foreground: String,
    pub feet: Vec<String>,
    pub head: String,
    pub balloon: String,
    pub monkey_body: String,
    pub monkey_arm: String,
    pub giraffe_body: String,
    pub giraffe_tail: String,
    pub giraffe_head: String,
    pub title: String,
    pub credits: [String; 2],
}

impl Default for LayerTable {
    fn default() -> Self {
        Self {
            sky: "layer1".to_string(),
            midground: "layer2".to_string(),
            foreground: "layer3".to_string(),
            feet: vec!["feet0".into(), "feet1".into(), "feet2".into()],
            head: "layer4".to_string(),
            balloon: "balloon".to_string(),
            monkey_body: "monkey".to_string(),
            monkey_arm: "monkey-arm".to_string(),
            giraffe_body: "giraffe".to_string(),
            giraffe_tail: "giraffe-tail".to_string(),
            giraffe_head: "giraffe-head".to_string(),
            title: "title".to_string(),
            credits: ["credits1".to_string(), "credits2".to_string()],
        }
    }
}

impl LayerTable {
    /// Every layer the table names, in drawing order.
    pub fn layers(&self) -> Vec<Layer> {
        let mut out = vec![
            Layer::Sky,
            Layer::Midground,
            Layer::GiraffeBody,
            Layer::GiraffeTail,
            Layer::GiraffeHead,
            Layer::MonkeyBody,
            Layer::MonkeyArm,
        ];
        out.extend((0..self.feet.len()).map(Layer::Feet));
        out.extend([Layer::Head, Layer::Balloon, Layer::Foreground, Layer::Title]);
        out.extend((0..self.credits.len()).map(Layer::Credits));
        out
    }

    pub fn id(&self, layer: Layer) -> ElephantResult<&str> {
        let id = match layer {
            Layer::Sky => &self.sky,
            Layer::Midground => &self.midground,
            Layer::Foreground => &self.foreground,
            Layer::Feet(i) => self.feet.get(i).ok_or_else(|| {
                ElephantError::validation(format!(
                    "foot pose {i} has no layer (only {} configured)",
                    self.feet.len()
                ))
            })?,
            Layer::Head => &self.head,
            Layer::Balloon => &self.balloon,
            Layer::MonkeyBody => &self.monkey_body,
            Layer::MonkeyArm => &self.monkey_arm,
            Layer::GiraffeBody => &self.giraffe_body,
            Layer::GiraffeTail => &self.giraffe_tail,
            Layer::GiraffeHead => &self.giraffe_head,
            Layer::Title => &self.title,
            Layer::Credits(i) => self.credits.get(i).ok_or_else(|| {
                ElephantError::validation(format!("credit panel {i} does not exist"))
            })?,
        };
        Ok(id.trim_start_matches('#'))
    }

    pub fn validate(&self) -> ElephantResult<()> {
        let singles = [
            &self.sky,
            &self.midground,
            &self.foreground,
            &self.head,
            &self.balloon,
            &self.monkey_body,
            &self.monkey_arm,
            &self.giraffe_body,
            &self.giraffe_tail,
            &self.giraffe_head,
            &self.title,
        ];
        let all = singles
            .into_iter()
            .chain(self.feet.iter())
            .chain(self.credits.iter());
        for id in all {
            if id.trim_start_matches('#').is_empty() {
                return Err(ElephantError::validation("layer ids must be non-empty"));
            }
        }
        if self.feet.is_empty() {
            return Err(ElephantError::validation(
                "at least one foot pose layer is required",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layers.rs"]
mod tests;
