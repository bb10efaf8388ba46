//! # Layers
//!
//! An ordered stack of items. Order is z-order, the last item draws on top.

use crate::{
    item::{Item, ItemID},
    renderer::{Renderer, VisualID, VisualTarget},
};

pub type LayerID = crate::InkID<Layer>;

pub struct Layer {
    id: LayerID,
    items: Vec<Item>,
    pub(crate) visual: Option<VisualID>,
}
impl Layer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: LayerID::default(),
            items: Vec::new(),
            visual: None,
        }
    }
    /// A layer holding `items`, bottom to top.
    #[must_use]
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            id: LayerID::default(),
            items,
            visual: None,
        }
    }
    #[must_use]
    pub fn id(&self) -> LayerID {
        self.id
    }
    #[must_use]
    pub fn visual(&self) -> Option<VisualID> {
        self.visual
    }
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
    #[must_use]
    pub fn position(&self, item: ItemID) -> Option<usize> {
        self.items.iter().position(|candidate| candidate.id() == item)
    }
    #[must_use]
    pub fn item(&self, item: ItemID) -> Option<&Item> {
        self.items.iter().find(|candidate| candidate.id() == item)
    }
    pub(crate) fn item_at_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.items.get_mut(index)
    }
    /// Insert at `index` (clamped to the end). If this layer is materialized, so is the item, stacked directly
    /// above its new predecessor.
    pub(crate) fn insert(&mut self, index: usize, item: Item, renderer: &mut dyn Renderer) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        self.materialize_item(index, renderer);
    }
    pub(crate) fn push(&mut self, item: Item, renderer: &mut dyn Renderer) {
        self.insert(self.items.len(), item, renderer);
    }
    /// Remove the item at `index`, releasing its visual.
    pub(crate) fn take(&mut self, index: usize, renderer: &mut dyn Renderer) -> Option<Item> {
        if index >= self.items.len() {
            return None;
        }
        let mut item = self.items.remove(index);
        if let Some(visual) = item.visual.take() {
            renderer.detach_visual(visual);
        }
        Some(item)
    }
    /// Tear down and recreate the item's visual after its geometry changed.
    pub(crate) fn rebuild_item(&mut self, index: usize, renderer: &mut dyn Renderer) {
        let Some(item) = self.items.get_mut(index) else {
            return;
        };
        if let Some(visual) = item.visual.take() {
            renderer.detach_visual(visual);
            self.materialize_item(index, renderer);
        }
    }
    fn materialize_item(&mut self, index: usize, renderer: &mut dyn Renderer) {
        let Some(group) = self.visual else {
            return;
        };
        let after = index
            .checked_sub(1)
            .and_then(|below| self.items.get(below))
            .and_then(Item::visual);
        let Some(item) = self.items.get_mut(index) else {
            return;
        };
        item.visual = renderer.attach_visual(VisualTarget::Item(item), Some(group));
        if let Some(visual) = item.visual {
            if index + 1 != self.items.len() {
                renderer.restack(visual, after);
            }
        }
    }
    /// Create the layer's visual group under `parent`, then a visual for every item.
    pub(crate) fn materialize(&mut self, parent: Option<VisualID>, renderer: &mut dyn Renderer) {
        if self.visual.is_some() {
            return;
        }
        self.visual = renderer.attach_visual(VisualTarget::Layer(self), parent);
        if let Some(group) = self.visual {
            for item in &mut self.items {
                item.visual = renderer.attach_visual(VisualTarget::Item(item), Some(group));
            }
        }
    }
    /// Release every item visual, then the group.
    pub(crate) fn release_visuals(&mut self, renderer: &mut dyn Renderer) {
        for item in self.items.iter_mut().rev() {
            if let Some(visual) = item.visual.take() {
                renderer.detach_visual(visual);
            }
        }
        if let Some(visual) = self.visual.take() {
            renderer.detach_visual(visual);
        }
    }
}
impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}
impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.items == other.items
    }
}
impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        item::{test::pen, test::points, Stroke},
        renderer::Headless,
    };

    fn dot(x: f64) -> Item {
        Item::stroke(Stroke::new(points(&[[x, 0.0]]), pen(1.0)).unwrap())
    }

    #[test]
    fn insert_restacks_visual() {
        let mut renderer = Headless::new();
        let mut layer = Layer::with_items(vec![dot(0.0), dot(1.0)]);
        layer.materialize(None, &mut renderer);
        let group = layer.visual().unwrap();
        let middle = dot(2.0);
        let id = middle.id();
        layer.insert(1, middle, &mut renderer);
        assert_eq!(layer.position(id), Some(1));
        let order: Vec<_> = layer.items().iter().map(|item| item.visual().unwrap()).collect();
        assert_eq!(renderer.children_of(group), Some(order.as_slice()));

        let taken = layer.take(1, &mut renderer).unwrap();
        assert_eq!(taken.id(), id);
        assert_eq!(taken.visual(), None);
        assert_eq!(renderer.live_count(), 3);
        layer.release_visuals(&mut renderer);
        assert_eq!(renderer.live_count(), 0);
    }
    #[test]
    fn unmaterialized_layer_leaves_renderer_alone() {
        let mut renderer = Headless::new();
        let mut layer = Layer::new();
        layer.push(dot(0.0), &mut renderer);
        assert_eq!(layer.len(), 1);
        assert_eq!(renderer.live_count(), 0);
        assert!(layer.take(5, &mut renderer).is_none());
    }
}
