use crate::layer::{ImageLayer, Layer, LayerId};
use serde::{Deserialize, Serialize};

/// Direction for [`Document::reorder`]. `Up` moves toward the top of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

/// The ordered layer stack plus the active-layer pointer.
///
/// Index 0 is composited first (bottom), the last layer is topmost. The
/// active id always names a layer in the stack or is `None`; every mutator
/// here keeps it that way except [`Document::set_active`], which trusts its
/// caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    layers: Vec<Layer>,
    active_layer: Option<LayerId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted parts, dropping a dangling active id.
    pub fn from_parts(layers: Vec<Layer>, active_layer: Option<LayerId>) -> Self {
        let active_layer = active_layer.filter(|id| layers.iter().any(|l| l.id == *id));
        Self {
            layers,
            active_layer,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.active_layer
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.active_layer.and_then(|id| self.get_layer(id))
    }

    pub fn get_layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    /// The first image layer in the stack; it fixes the surface dimensions.
    pub fn background(&self) -> Option<&ImageLayer> {
        self.layers.iter().find_map(|layer| layer.kind.as_image())
    }

    /// Appends a layer on top. Does not touch the active pointer.
    pub fn add_layer(&mut self, layer: Layer) {
        log::debug!("Adding {} layer '{}' ({})", layer.kind.kind_name(), layer.name, layer.id);
        self.layers.push(layer);
    }

    /// Removes a layer. If it was active, the layer now at the same index
    /// becomes active, else the new last layer, else nothing.
    pub fn delete_layer(&mut self, id: LayerId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        self.layers.remove(index);
        log::debug!("Deleted layer {} at index {}", id, index);

        if self.active_layer == Some(id) {
            self.active_layer = self
                .layers
                .get(index)
                .or_else(|| self.layers.last())
                .map(|layer| layer.id);
        }
    }

    /// Clones a layer right above the original and makes the copy active.
    /// Returns the new id.
    pub fn duplicate_layer(&mut self, id: LayerId) -> Option<LayerId> {
        let index = self.index_of(id)?;
        let copy = self.layers[index].duplicate();
        let copy_id = copy.id;
        self.layers.insert(index + 1, copy);
        self.active_layer = Some(copy_id);
        Some(copy_id)
    }

    /// Swaps a layer with its neighbour. No-op at the boundary.
    pub fn reorder(&mut self, id: LayerId, direction: Direction) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let target = match direction {
            Direction::Up if index + 1 < self.layers.len() => index + 1,
            Direction::Down if index > 0 => index - 1,
            _ => return,
        };
        self.layers.swap(index, target);
    }

    pub fn toggle_visibility(&mut self, id: LayerId) {
        if let Some(layer) = self.layers.iter_mut().find(|layer| layer.id == id) {
            layer.visible = !layer.visible;
        }
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> bool {
        match self.layers.iter_mut().find(|layer| layer.id == id) {
            Some(layer) => {
                layer.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn set_active(&mut self, id: Option<LayerId>) {
        self.active_layer = id;
    }

    /// Replaces the entire stack with `layer` and makes it active.
    pub fn replace_with(&mut self, layer: Layer) {
        self.active_layer = Some(layer.id);
        self.layers = vec![layer];
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.active_layer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, Pos2};

    fn drawing(name: &str) -> Layer {
        let mut layer = Layer::new_drawing(
            vec![Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)],
            Color32::WHITE,
            2.0,
        );
        layer.name = name.to_owned();
        layer
    }

    fn names(doc: &Document) -> Vec<&str> {
        doc.layers().iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn add_does_not_change_active() {
        let mut doc = Document::new();
        doc.add_layer(drawing("a"));
        assert_eq!(doc.active_layer_id(), None);
    }

    #[test]
    fn deleting_active_middle_layer_selects_same_index() {
        let mut doc = Document::new();
        let (a, b, c) = (drawing("a"), drawing("b"), drawing("c"));
        let (b_id, c_id) = (b.id, c.id);
        doc.add_layer(a);
        doc.add_layer(b);
        doc.add_layer(c);
        doc.set_active(Some(b_id));

        doc.delete_layer(b_id);
        assert_eq!(names(&doc), ["a", "c"]);
        assert_eq!(doc.active_layer_id(), Some(c_id));
    }

    #[test]
    fn deleting_active_top_layer_selects_new_last() {
        let mut doc = Document::new();
        let (a, b) = (drawing("a"), drawing("b"));
        let (a_id, b_id) = (a.id, b.id);
        doc.add_layer(a);
        doc.add_layer(b);
        doc.set_active(Some(b_id));

        doc.delete_layer(b_id);
        assert_eq!(doc.active_layer_id(), Some(a_id));
    }

    #[test]
    fn deleting_inactive_layer_keeps_active() {
        let mut doc = Document::new();
        let (a, b) = (drawing("a"), drawing("b"));
        let (a_id, b_id) = (a.id, b.id);
        doc.add_layer(a);
        doc.add_layer(b);
        doc.set_active(Some(b_id));

        doc.delete_layer(a_id);
        assert_eq!(doc.active_layer_id(), Some(b_id));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut doc = Document::new();
        doc.add_layer(drawing("a"));
        let before = doc.clone();
        let ghost = LayerId::new();

        doc.delete_layer(ghost);
        doc.reorder(ghost, Direction::Up);
        doc.toggle_visibility(ghost);
        assert!(doc.duplicate_layer(ghost).is_none());
        assert_eq!(doc, before);
    }

    #[test]
    fn reorder_stops_at_boundaries() {
        let mut doc = Document::new();
        let (a, b) = (drawing("a"), drawing("b"));
        let (a_id, b_id) = (a.id, b.id);
        doc.add_layer(a);
        doc.add_layer(b);

        doc.reorder(b_id, Direction::Up);
        doc.reorder(a_id, Direction::Down);
        assert_eq!(names(&doc), ["a", "b"]);

        doc.reorder(a_id, Direction::Up);
        assert_eq!(names(&doc), ["b", "a"]);
    }

    #[test]
    fn from_parts_drops_dangling_active() {
        let doc = Document::from_parts(vec![drawing("a")], Some(LayerId::new()));
        assert_eq!(doc.active_layer_id(), None);
    }
}
