//! # Pages

use super::{
    background::Background,
    layer::{Layer, LayerID},
};
use crate::{
    renderer::{Renderer, VisualID, VisualTarget},
    util::{self, GeometryError},
};

pub type PageID = crate::InkID<Page>;

/// A sheet of the journal: a background with one or more layers on top.
pub struct Page {
    id: PageID,
    width: f64,
    height: f64,
    /// Position on the canvas, maintained by [`super::layout::layout_pages`].
    pub hoffset: f64,
    pub voffset: f64,
    /// Bottom to top. Never empty.
    layers: Vec<Layer>,
    background: Background,
    pub(crate) visual: Option<VisualID>,
}
impl Page {
    /// A blank page shaped like `template`. The template's background is duplicated, sharing its image and filename.
    #[must_use]
    pub fn from_template(template: &PageTemplate) -> Self {
        Self {
            id: PageID::default(),
            width: template.width,
            height: template.height,
            hoffset: 0.0,
            voffset: 0.0,
            layers: vec![Layer::new()],
            background: template.background.duplicate(),
            visual: None,
        }
    }
    /// A blank page on a caller-built background.
    pub fn from_background(
        background: Background,
        width: f64,
        height: f64,
    ) -> Result<Self, GeometryError> {
        Ok(Self {
            id: PageID::default(),
            width: util::check_positive(width)?,
            height: util::check_positive(height)?,
            hoffset: 0.0,
            voffset: 0.0,
            layers: vec![Layer::new()],
            background,
            visual: None,
        })
    }
    /// Assemble a page from parts, e.g. when loading a document. `None` if `layers` is empty.
    pub fn from_parts(
        background: Background,
        [width, height]: [f64; 2],
        layers: Vec<Layer>,
    ) -> Result<Option<Self>, GeometryError> {
        if layers.is_empty() {
            return Ok(None);
        }
        let mut page = Self::from_background(background, width, height)?;
        page.layers = layers;
        Ok(Some(page))
    }
    #[must_use]
    pub fn id(&self) -> PageID {
        self.id
    }
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }
    #[must_use]
    pub fn size(&self) -> [f64; 2] {
        [self.width, self.height]
    }
    #[must_use]
    pub fn visual(&self) -> Option<VisualID> {
        self.visual
    }
    #[must_use]
    pub fn background(&self) -> &Background {
        &self.background
    }
    /// Bottom to top.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
    #[must_use]
    pub fn layer(&self, layer: LayerID) -> Option<&Layer> {
        self.layers.iter().find(|candidate| candidate.id() == layer)
    }
    pub(crate) fn layer_mut(&mut self, layer: LayerID) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|candidate| candidate.id() == layer)
    }
    pub(crate) fn layer_at_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }
    #[must_use]
    pub fn layer_position(&self, layer: LayerID) -> Option<usize> {
        self.layers.iter().position(|candidate| candidate.id() == layer)
    }
    /// The top layer, where new ink goes by default.
    #[must_use]
    pub fn top_layer(&self) -> &Layer {
        // Never empty: the only removal path, take_layer, refuses the last layer.
        &self.layers[self.layers.len() - 1]
    }
    /// Insert a layer at `index` (clamped), materializing it if the page is.
    pub(crate) fn insert_layer(&mut self, index: usize, mut layer: Layer, renderer: &mut dyn Renderer) {
        let index = index.min(self.layers.len());
        if let Some(group) = self.visual {
            layer.materialize(Some(group), renderer);
            if let Some(visual) = layer.visual {
                // Above the layer below, or directly above the background.
                let after = match index.checked_sub(1) {
                    Some(below) => self.layers.get(below).and_then(Layer::visual),
                    None => self.background.visual,
                };
                renderer.restack(visual, after);
            }
        }
        self.layers.insert(index, layer);
    }
    /// Remove the layer at `index`, releasing its visuals. Refuses to remove the last layer.
    pub(crate) fn take_layer(&mut self, index: usize, renderer: &mut dyn Renderer) -> Option<Layer> {
        if self.layers.len() <= 1 || index >= self.layers.len() {
            return None;
        }
        let mut layer = self.layers.remove(index);
        layer.release_visuals(renderer);
        Some(layer)
    }
    /// Swap the layer at `index` for another, releasing the old one's visuals.
    pub(crate) fn replace_layer(
        &mut self,
        index: usize,
        layer: Layer,
        renderer: &mut dyn Renderer,
    ) -> Option<Layer> {
        if index >= self.layers.len() {
            return None;
        }
        self.insert_layer(index, layer, renderer);
        let mut old = self.layers.remove(index + 1);
        old.release_visuals(renderer);
        Some(old)
    }
    /// Install a new background, returning the old one with its visual released.
    pub(crate) fn replace_background(
        &mut self,
        background: Background,
        renderer: &mut dyn Renderer,
    ) -> Background {
        let mut old = std::mem::replace(&mut self.background, background);
        if let Some(visual) = old.visual.take() {
            renderer.detach_visual(visual);
        }
        self.materialize_background(renderer);
        old
    }
    /// Change the paper size, returning the old one. The background is redrawn to fit.
    pub(crate) fn replace_size(
        &mut self,
        [width, height]: [f64; 2],
        renderer: &mut dyn Renderer,
    ) -> Result<[f64; 2], GeometryError> {
        let size = [util::check_positive(width)?, util::check_positive(height)?];
        let old = self.size();
        [self.width, self.height] = size;
        if let Some(visual) = self.visual {
            renderer.invalidate(visual);
        }
        if let Some(visual) = self.background.visual.take() {
            renderer.detach_visual(visual);
            self.materialize_background(renderer);
        }
        Ok(old)
    }
    pub(crate) fn background_mut(&mut self) -> &mut Background {
        &mut self.background
    }
    fn materialize_background(&mut self, renderer: &mut dyn Renderer) {
        let Some(group) = self.visual else {
            return;
        };
        self.background.visual =
            renderer.attach_visual(VisualTarget::Background(&self.background), Some(group));
        if let Some(visual) = self.background.visual {
            renderer.restack(visual, None);
        }
    }
    /// Create the page group, then the background and each layer in order.
    pub(crate) fn materialize(&mut self, renderer: &mut dyn Renderer) {
        if self.visual.is_some() {
            return;
        }
        self.visual = renderer.attach_visual(VisualTarget::Page(self), None);
        if self.visual.is_none() {
            return;
        }
        self.materialize_background(renderer);
        for layer in &mut self.layers {
            layer.materialize(self.visual, renderer);
        }
    }
    /// Release layers top-down, then the background, then the page group.
    pub(crate) fn release_visuals(&mut self, renderer: &mut dyn Renderer) {
        for layer in self.layers.iter_mut().rev() {
            layer.release_visuals(renderer);
        }
        if let Some(visual) = self.background.visual.take() {
            renderer.detach_visual(visual);
        }
        if let Some(visual) = self.visual.take() {
            renderer.detach_visual(visual);
        }
    }
}
impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.width == other.width
            && self.height == other.height
            && self.layers == other.layers
            && self.background == other.background
    }
}
impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("id", &self.id)
            .field("size", &self.size())
            .field("background", &self.background)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

/// Shape of new pages: size and a background to duplicate.
#[derive(Debug, PartialEq)]
pub struct PageTemplate {
    pub width: f64,
    pub height: f64,
    pub background: Background,
}
impl PageTemplate {
    pub fn new(width: f64, height: f64, background: Background) -> Result<Self, GeometryError> {
        Ok(Self {
            width: util::check_positive(width)?,
            height: util::check_positive(height)?,
            background,
        })
    }
    /// Template matching an existing page's size and background.
    #[must_use]
    pub fn from_page(page: &Page) -> Self {
        Self {
            width: page.width,
            height: page.height,
            background: page.background.duplicate(),
        }
    }
    #[must_use]
    pub fn instantiate(&self) -> Page {
        Page::from_template(self)
    }
}
impl Clone for PageTemplate {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            background: self.background.duplicate(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{renderer::Headless, state::background::test::pixmap_background};

    #[test]
    fn template_shares_background() {
        let template = PageTemplate::new(100.0, 200.0, pixmap_background()).unwrap();
        let page = template.instantiate();
        assert_eq!(page.size(), [100.0, 200.0]);
        assert_eq!(page.layers().len(), 1);
        let filename = &template.background.raster().unwrap().filename;
        assert!(filename.same_payload(&page.background().raster().unwrap().filename));
        assert_eq!(filename.ref_count(), 2);
    }
    #[test]
    fn rejects_degenerate_size() {
        assert!(Page::from_background(Background::default(), 0.0, 10.0).is_err());
        assert!(PageTemplate::new(10.0, f64::INFINITY, Background::default()).is_err());
    }
    #[test]
    fn visuals_follow_structure() {
        let mut renderer = Headless::new();
        let mut page = Page::from_background(Background::default(), 10.0, 10.0).unwrap();
        page.materialize(&mut renderer);
        let group = page.visual().unwrap();
        // Background, one layer.
        assert_eq!(renderer.children_of(group).unwrap().len(), 2);
        page.insert_layer(0, Layer::new(), &mut renderer);
        let children = renderer.children_of(group).unwrap();
        assert_eq!(children[0], page.background().visual().unwrap());
        assert_eq!(children[1], page.layers()[0].visual().unwrap());

        let old = page.replace_background(pixmap_background(), &mut renderer);
        assert_eq!(old.visual(), None);
        assert_eq!(
            renderer.children_of(group).unwrap()[0],
            page.background().visual().unwrap()
        );

        assert!(page.take_layer(0, &mut renderer).is_some());
        assert!(page.take_layer(0, &mut renderer).is_none());
        page.release_visuals(&mut renderer);
        assert_eq!(renderer.live_count(), 0);
    }
}
