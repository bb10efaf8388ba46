//! # State
//!
//! The document tree: a [`journal::Journal`] of [`page::Page`]s, each with a [`background::Background`] and a stack
//! of [`layer::Layer`]s holding [`crate::item::Item`]s. Everything is reachable by stable ID.
//!
//! Outside of this crate the tree is read-only. Changes go through a [`crate::history::writer::HistoryWriter`] so
//! they can be undone.

pub mod apply;
pub mod background;
pub mod document;
pub mod journal;
pub mod layer;
pub mod layout;
pub mod page;

use crate::{item::ItemID, util::GeometryError};

/// An edit was refused. The document is unchanged.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("page {0} is not in the document")]
    UnknownPage(page::PageID),
    #[error("layer {0} is not in the document")]
    UnknownLayer(layer::LayerID),
    #[error("item {0} is not where it was expected")]
    UnknownItem(ItemID),
    #[error("item {item} is {found}, expected {expected}")]
    WrongKind {
        item: ItemID,
        expected: &'static str,
        found: String,
    },
    #[error("can't remove the last page")]
    LastPage,
    #[error("expected {expected} stacking entries, found {found}")]
    DepthCount { expected: usize, found: usize },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
