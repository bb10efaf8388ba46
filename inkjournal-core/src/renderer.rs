//! # Renderer
//!
//! The document model never draws. It tells a [`Renderer`] when something on a page gains or loses a visual
//! representation, when visuals need re-ordering, and when they are stale. In return, the renderer measures text.
//!
//! Visuals form a tree mirroring the document: page group > (background, layer group > items).

use crate::state::{background::Background, layer::Layer, page::Page};

pub type VisualID = crate::InkID<Visual>;
/// Marker type for visual handles. Handles are minted by renderers and are opaque to the model.
pub struct Visual;

/// What a visual is being created for.
#[derive(Copy, Clone, Debug)]
pub enum VisualTarget<'a> {
    Page(&'a Page),
    Background(&'a Background),
    Layer(&'a Layer),
    Item(&'a crate::item::Item),
}
impl VisualTarget<'_> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Page(_) => "page",
            Self::Background(_) => "background",
            Self::Layer(_) => "layer",
            Self::Item(_) => "item",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TextExtents {
    pub width: f64,
    pub height: f64,
}

pub trait Renderer {
    /// Create a visual for `target` as the topmost child of `parent` (or as a root).
    /// `None` if this renderer does not materialize such visuals.
    fn attach_visual(
        &mut self,
        target: VisualTarget<'_>,
        parent: Option<VisualID>,
    ) -> Option<VisualID>;
    /// Destroy a visual. It must not have live children.
    fn detach_visual(&mut self, visual: VisualID);
    /// Move `visual` among its siblings so that it sits directly above `after`, or at the very bottom if `None`.
    fn restack(&mut self, visual: VisualID, after: Option<VisualID>);
    /// The model behind `visual` changed in place.
    fn invalidate(&mut self, visual: VisualID);
    /// Size of `text` set in `font` at `size`, if this renderer can lay out text.
    fn text_extents(&self, text: &str, font: &str, size: f64) -> Option<TextExtents>;
}

/// Renderer for documents with no view at all. Never materializes anything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullRenderer;
impl Renderer for NullRenderer {
    fn attach_visual(&mut self, _: VisualTarget<'_>, _: Option<VisualID>) -> Option<VisualID> {
        None
    }
    fn detach_visual(&mut self, visual: VisualID) {
        log::error!("NullRenderer asked to detach {visual}, which it never created");
    }
    fn restack(&mut self, _: VisualID, _: Option<VisualID>) {}
    fn invalidate(&mut self, _: VisualID) {}
    fn text_extents(&self, _: &str, _: &str, _: f64) -> Option<TextExtents> {
        None
    }
}

#[derive(Debug)]
struct Node {
    parent: Option<VisualID>,
    kind: &'static str,
    /// Bottom to top.
    children: Vec<VisualID>,
    invalidations: usize,
}

/// Renderer that keeps the visual tree in memory without drawing it, and checks every request against it.
///
/// Misuse (detaching twice, detaching a visual with live children, referencing unknown visuals) panics.
#[derive(Debug, Default)]
pub struct Headless {
    nodes: hashbrown::HashMap<VisualID, Node>,
}
impl Headless {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Number of visuals currently alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }
    #[must_use]
    pub fn is_live(&self, visual: VisualID) -> bool {
        self.nodes.contains_key(&visual)
    }
    /// Children of `visual`, bottom to top.
    #[must_use]
    pub fn children_of(&self, visual: VisualID) -> Option<&[VisualID]> {
        self.nodes.get(&visual).map(|node| node.children.as_slice())
    }
    #[must_use]
    pub fn parent_of(&self, visual: VisualID) -> Option<VisualID> {
        self.nodes.get(&visual).and_then(|node| node.parent)
    }
    #[must_use]
    pub fn kind_of(&self, visual: VisualID) -> Option<&'static str> {
        self.nodes.get(&visual).map(|node| node.kind)
    }
    /// How many times `visual` has been invalidated since it was attached.
    #[must_use]
    pub fn invalidations(&self, visual: VisualID) -> usize {
        self.nodes.get(&visual).map_or(0, |node| node.invalidations)
    }
    fn siblings_mut(&mut self, visual: VisualID) -> Option<&mut Vec<VisualID>> {
        let parent = self.nodes.get(&visual)?.parent?;
        self.nodes.get_mut(&parent).map(|node| &mut node.children)
    }
}
impl Renderer for Headless {
    fn attach_visual(
        &mut self,
        target: VisualTarget<'_>,
        parent: Option<VisualID>,
    ) -> Option<VisualID> {
        let id = VisualID::default();
        if let Some(parent) = parent {
            let Some(parent_node) = self.nodes.get_mut(&parent) else {
                panic!("attaching {} under unknown visual {parent}", target.name());
            };
            parent_node.children.push(id);
        }
        self.nodes.insert(
            id,
            Node {
                parent,
                kind: target.name(),
                children: Vec::new(),
                invalidations: 0,
            },
        );
        Some(id)
    }
    fn detach_visual(&mut self, visual: VisualID) {
        let Some(node) = self.nodes.get(&visual) else {
            panic!("visual {visual} detached twice or never attached");
        };
        assert!(
            node.children.is_empty(),
            "visual {visual} ({}) detached with {} live children",
            node.kind,
            node.children.len()
        );
        if let Some(siblings) = self.siblings_mut(visual) {
            siblings.retain(|&sibling| sibling != visual);
        }
        self.nodes.remove(&visual);
    }
    fn restack(&mut self, visual: VisualID, after: Option<VisualID>) {
        assert!(self.nodes.contains_key(&visual), "restack of unknown visual {visual}");
        let Some(siblings) = self.siblings_mut(visual) else {
            return;
        };
        siblings.retain(|&sibling| sibling != visual);
        let index = match after {
            None => 0,
            Some(after) => siblings
                .iter()
                .position(|&sibling| sibling == after)
                .map_or(siblings.len(), |position| position + 1),
        };
        siblings.insert(index, visual);
    }
    fn invalidate(&mut self, visual: VisualID) {
        let Some(node) = self.nodes.get_mut(&visual) else {
            panic!("invalidate of unknown visual {visual}");
        };
        node.invalidations += 1;
    }
    fn text_extents(&self, text: &str, _font: &str, size: f64) -> Option<TextExtents> {
        // Monospace approximation, half an em per character.
        #[allow(clippy::cast_precision_loss)]
        let chars = text.chars().count() as f64;
        Some(TextExtents {
            width: chars * size * 0.5,
            height: size,
        })
    }
}
