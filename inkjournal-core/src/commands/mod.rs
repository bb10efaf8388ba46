//! # Commands
//!
//! Every change to a document is described by an [`UndoItem`], recorded in the [`crate::history::History`] by a
//! [`crate::history::writer::HistoryWriter`]. An entry holds exactly what it needs to be reverted and re-applied,
//! including ownership of whatever it took out of the document: a deleted page lives in its entry until the
//! deletion is undone, or until the entry is dropped with its stack.

use crate::{
    brush::Brush,
    item::{Geometry, Item, ItemID},
    renderer::Renderer,
    state::{
        background::Background,
        layer::{Layer, LayerID},
        page::{Page, PageID, PageTemplate},
    },
    transform::Placement,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("command constructed for a state that does not match the current state")]
    MismatchedState,
    #[error("resource referenced by the command is not found")]
    UnknownResource,
}
pub trait CommandConsumer<C> {
    /// Apply a single command. If this generates an error,
    /// the state of `self` should *not* be observably changed.
    fn apply(
        &mut self,
        command: DoUndo<'_, C>,
        renderer: &mut dyn Renderer,
    ) -> Result<(), CommandError>;
}

/// Which way to run a command. Commands own document parts between runs, hence the mutable borrow.
#[derive(PartialEq, Debug)]
pub enum DoUndo<'c, T> {
    Do(&'c mut T),
    Undo(&'c mut T),
}

/// Document parts that keep their identity while moving in and out of the document.
pub trait Stable {
    type Id: Copy + Eq + std::fmt::Debug + std::fmt::Display;
    fn stable_id(&self) -> Self::Id;
}
impl Stable for Item {
    type Id = ItemID;
    fn stable_id(&self) -> ItemID {
        self.id()
    }
}
impl Stable for Layer {
    type Id = LayerID;
    fn stable_id(&self) -> LayerID {
        self.id()
    }
}
impl Stable for Page {
    type Id = PageID;
    fn stable_id(&self) -> PageID {
        self.id()
    }
}

/// A document part referenced by an entry: either owned by the entry, or living in the document under its ID.
#[derive(PartialEq, Debug)]
pub enum Slot<T: Stable> {
    Ref(T::Id),
    Owned(Box<T>),
}
impl<T: Stable> Slot<T> {
    #[must_use]
    pub fn owned(value: T) -> Self {
        Self::Owned(Box::new(value))
    }
    #[must_use]
    pub fn id(&self) -> T::Id {
        match self {
            Self::Ref(id) => *id,
            Self::Owned(value) => value.stable_id(),
        }
    }
    #[must_use]
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Ref(_) => None,
            Self::Owned(value) => Some(value),
        }
    }
    /// Hand the value back to the document, leaving a reference behind.
    pub(crate) fn take(&mut self) -> Option<T> {
        let id = self.id();
        match std::mem::replace(self, Self::Ref(id)) {
            Self::Owned(value) => Some(*value),
            Self::Ref(_) => None,
        }
    }
    /// Take ownership of a value leaving the document.
    pub(crate) fn park(&mut self, value: T) {
        *self = Self::Owned(Box::new(value));
    }
}

#[derive(strum::AsRefStr, Copy, Clone, PartialEq, Eq, Debug)]
pub enum ErasureReason {
    /// Eraser tool, whole strokes or portions.
    Eraser,
    /// Strokes replaced by a recognized shape.
    Recognizer,
}

/// One item taken out of a layer, and what took its place.
#[derive(PartialEq, Debug)]
pub struct ErasureRecord {
    /// Where the original was, and where the replacements are.
    pub index: usize,
    /// Owned while the erasure is applied.
    pub original: Slot<Item>,
    /// Stacked bottom to top from `index`. Owned while the erasure is reverted.
    pub replacements: Vec<Slot<Item>>,
}

/// A reversible change to the document.
///
/// Unless noted, the document is in the "done" state when an entry sits on the undo stack, and in the "undone"
/// state when it sits on the redo stack.
#[derive(strum::AsRefStr, PartialEq, Debug)]
pub enum UndoItem {
    /// A stroke, text or image was added at `index`.
    AddItem {
        layer: LayerID,
        index: usize,
        item: Slot<Item>,
    },
    /// Items were removed or replaced. Records apply in order, each relative to the layer as left by the
    /// previous one.
    Erasure {
        layer: LayerID,
        reason: ErasureReason,
        records: Vec<ErasureRecord>,
    },
    /// A page's background (and, with `resize`, its size) was replaced. Holds whichever is not in the document.
    Background {
        page: PageID,
        background: Box<Background>,
        resize: Option<[f64; 2]>,
    },
    /// Holds the paper size not in use.
    PaperResize { page: PageID, size: [f64; 2] },
    /// Holds the new page template not in use.
    DefaultPage { template: Box<PageTemplate> },
    NewLayer {
        page: PageID,
        index: usize,
        layer: Slot<Layer>,
    },
    /// If the deleted layer was the page's only one, `replacement` took its place.
    DeleteLayer {
        page: PageID,
        index: usize,
        layer: Slot<Layer>,
        replacement: Option<Slot<Layer>>,
    },
    NewPage { index: usize, page: Slot<Page> },
    DeletePage { index: usize, page: Slot<Page> },
    /// `items` moved by `delta` from layer `from` to `placement` in layer `to`. `depths` records, per item, the
    /// item directly beneath it in `from` before the move, so undo can put it back. Holds, per item, the geometry
    /// not in use.
    MoveSelection {
        items: Vec<ItemID>,
        delta: [f64; 2],
        from: LayerID,
        to: LayerID,
        placement: Placement,
        depths: Vec<Option<ItemID>>,
        geometry: Vec<Geometry>,
    },
    /// `items` mapped through `p * scale + offset`. Holds, per item, the geometry not in use.
    ResizeSelection {
        items: Vec<ItemID>,
        scale: [f64; 2],
        offset: [f64; 2],
        geometry: Vec<Geometry>,
    },
    /// Items appended to the top of `layer`.
    Paste {
        layer: LayerID,
        items: Vec<Slot<Item>>,
    },
    /// Holds the brushes not in use.
    Repaint { brushes: Vec<(ItemID, Brush)> },
    /// Holds the text not in use.
    TextEdit { item: ItemID, text: String },
    /// Holds the font and ink not in use.
    TextAttributes {
        item: ItemID,
        font_name: String,
        font_size: f64,
        brush: Brush,
    },
}
impl UndoItem {
    /// Name of the kind of entry, for logs. Erasures are named by what erased.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Erasure { reason, .. } => reason.as_ref(),
            _ => self.as_ref(),
        }
    }
}
