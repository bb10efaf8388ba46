//! # Journal
//!
//! The ordered pages of a document, plus lookups from stable IDs to wherever the thing currently lives.

use super::{
    layer::{Layer, LayerID},
    page::{Page, PageID},
};
use crate::{
    item::{Item, ItemID},
    renderer::Renderer,
};

/// Where an item lives: page index, layer index within that page, item index within that layer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ItemLocation {
    pub page: usize,
    pub layer: usize,
    pub index: usize,
}

#[derive(Debug, PartialEq)]
pub struct Journal {
    /// Never empty outside of a page swap.
    pages: Vec<Page>,
    materialized: bool,
}
impl Journal {
    #[must_use]
    pub fn new(first: Page) -> Self {
        Self {
            pages: vec![first],
            materialized: false,
        }
    }
    /// `None` if `pages` is empty.
    #[must_use]
    pub fn from_pages(pages: Vec<Page>) -> Option<Self> {
        (!pages.is_empty()).then_some(Self {
            pages,
            materialized: false,
        })
    }
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
    /// Whether pages get visuals as they are added.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.materialized
    }
    #[must_use]
    pub fn page_position(&self, page: PageID) -> Option<usize> {
        self.pages.iter().position(|candidate| candidate.id() == page)
    }
    #[must_use]
    pub fn page(&self, page: PageID) -> Option<&Page> {
        self.pages.iter().find(|candidate| candidate.id() == page)
    }
    pub(crate) fn page_mut(&mut self, page: PageID) -> Option<&mut Page> {
        self.pages.iter_mut().find(|candidate| candidate.id() == page)
    }
    pub(crate) fn page_at_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }
    /// Page index and layer index of `layer`.
    #[must_use]
    pub fn locate_layer(&self, layer: LayerID) -> Option<(usize, usize)> {
        self.pages.iter().enumerate().find_map(|(page_index, page)| {
            page.layer_position(layer)
                .map(|layer_index| (page_index, layer_index))
        })
    }
    #[must_use]
    pub fn layer(&self, layer: LayerID) -> Option<&Layer> {
        self.pages.iter().find_map(|page| page.layer(layer))
    }
    pub(crate) fn layer_mut(&mut self, layer: LayerID) -> Option<&mut Layer> {
        self.pages.iter_mut().find_map(|page| page.layer_mut(layer))
    }
    /// The page holding `layer`.
    #[must_use]
    pub fn page_of_layer(&self, layer: LayerID) -> Option<&Page> {
        self.pages.iter().find(|page| page.layer(layer).is_some())
    }
    #[must_use]
    pub fn locate_item(&self, item: ItemID) -> Option<ItemLocation> {
        self.pages.iter().enumerate().find_map(|(page_index, page)| {
            page.layers()
                .iter()
                .enumerate()
                .find_map(|(layer_index, layer)| {
                    layer.position(item).map(|index| ItemLocation {
                        page: page_index,
                        layer: layer_index,
                        index,
                    })
                })
        })
    }
    #[must_use]
    pub fn item(&self, item: ItemID) -> Option<&Item> {
        self.pages
            .iter()
            .flat_map(Page::layers)
            .find_map(|layer| layer.item(item))
    }
    pub(crate) fn item_mut(&mut self, item: ItemID) -> Option<&mut Item> {
        let location = self.locate_item(item)?;
        self.layer_at_mut(location.page, location.layer)?
            .item_at_mut(location.index)
    }
    /// Give an item a fresh visual after it changed in place.
    pub(crate) fn rebuild_item(&mut self, item: ItemID, renderer: &mut dyn Renderer) {
        let Some(location) = self.locate_item(item) else {
            return;
        };
        if let Some(layer) = self.layer_at_mut(location.page, location.layer) {
            layer.rebuild_item(location.index, renderer);
        }
    }
    pub(crate) fn layer_at_mut(&mut self, page: usize, layer: usize) -> Option<&mut Layer> {
        self.pages.get_mut(page)?.layer_at_mut(layer)
    }
    /// Insert a page at `index` (clamped), materializing it if the journal is.
    pub(crate) fn insert_page(&mut self, index: usize, mut page: Page, renderer: &mut dyn Renderer) {
        let index = index.min(self.pages.len());
        if self.materialized {
            page.materialize(renderer);
        }
        self.pages.insert(index, page);
    }
    /// Remove a page, releasing all of its visuals. Refuses to remove the last page.
    pub(crate) fn take_page(&mut self, index: usize, renderer: &mut dyn Renderer) -> Option<Page> {
        if self.pages.len() <= 1 || index >= self.pages.len() {
            return None;
        }
        let mut page = self.pages.remove(index);
        page.release_visuals(renderer);
        Some(page)
    }
    /// Give every page, layer, background and item a visual.
    pub fn materialize(&mut self, renderer: &mut dyn Renderer) {
        self.materialized = true;
        for page in &mut self.pages {
            page.materialize(renderer);
        }
    }
    /// Drop every visual, e.g. before the view goes away.
    pub fn release_visuals(&mut self, renderer: &mut dyn Renderer) {
        self.materialized = false;
        for page in self.pages.iter_mut().rev() {
            page.release_visuals(renderer);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        item::test::{pen, points},
        item::Stroke,
        renderer::{Headless, NullRenderer},
        state::background::Background,
    };

    fn page() -> Page {
        Page::from_background(Background::default(), 100.0, 100.0).unwrap()
    }

    #[test]
    fn lookups() {
        let mut journal = Journal::new(page());
        journal.insert_page(1, page(), &mut NullRenderer);
        let layer = journal.pages()[1].layers()[0].id();
        assert_eq!(journal.locate_layer(layer), Some((1, 0)));

        let item = Item::stroke(Stroke::new(points(&[[1.0, 1.0]]), pen(1.0)).unwrap());
        let id = item.id();
        journal
            .layer_mut(layer)
            .unwrap()
            .push(item, &mut NullRenderer);
        assert_eq!(
            journal.locate_item(id),
            Some(ItemLocation {
                page: 1,
                layer: 0,
                index: 0
            })
        );
        assert!(journal.item(id).is_some());
        assert_eq!(journal.page_of_layer(layer).map(Page::id), Some(journal.pages()[1].id()));
    }
    #[test]
    fn last_page_stays() {
        let mut journal = Journal::new(page());
        assert!(journal.take_page(0, &mut NullRenderer).is_none());
        assert_eq!(journal.len(), 1);
        assert!(Journal::from_pages(Vec::new()).is_none());
    }
    #[test]
    fn materialize_follows_new_pages() {
        let mut renderer = Headless::new();
        let mut journal = Journal::new(page());
        journal.materialize(&mut renderer);
        journal.insert_page(0, page(), &mut renderer);
        assert!(journal.pages()[0].visual().is_some());
        let removed = journal.take_page(0, &mut renderer).unwrap();
        assert_eq!(removed.visual(), None);
        journal.release_visuals(&mut renderer);
        assert_eq!(renderer.live_count(), 0);
    }
}
