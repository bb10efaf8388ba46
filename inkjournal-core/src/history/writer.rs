//! # History writer
//!
//! The only way to edit a document. Each method changes the document right away and buffers an entry describing
//! the change; when the writer is dropped, everything it buffered is recorded as one undoable group.
//!
//! Methods check their arguments before touching anything: an `Err` means no change and nothing recorded.

use smallvec::SmallVec;

use super::History;
use crate::{
    bbox::BBox,
    brush::{Brush, Tool},
    color::Rgba,
    commands::{ErasureReason, ErasureRecord, Slot, UndoItem},
    erase,
    item::{Item, ItemID, ItemKind, Point, Stroke},
    renderer::Renderer,
    state::{
        background::{Background, BackgroundKind, Ruling},
        document::DocumentState,
        journal::Journal,
        layer::{Layer, LayerID},
        page::{PageID, PageTemplate},
        EditError,
    },
    transform::{self, Placement},
    util,
};

/// Which pages a paper change applies to.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PageSelection {
    One(PageID),
    All,
}

pub struct HistoryWriter<'a> {
    state: &'a mut DocumentState,
    history: &'a mut History,
    saved: &'a mut bool,
    renderer: &'a mut dyn Renderer,
    // Optimize for exactly one entry (the most common case)
    commands: SmallVec<[UndoItem; 1]>,
}
impl Drop for HistoryWriter<'_> {
    fn drop(&mut self) {
        if self.commands.is_empty() {
            return;
        }
        if std::thread::panicking() {
            // The document already holds these changes, so they must be recorded to stay undoable.
            log::error!(
                "Edit interrupted by a panic, recording {} entries as-is",
                self.commands.len()
            );
        }
        self.history.record(self.commands.drain(..));
        *self.saved = false;
    }
}
impl std::ops::Deref for HistoryWriter<'_> {
    type Target = DocumentState;
    fn deref(&self) -> &Self::Target {
        self.state
    }
}
impl<'a> HistoryWriter<'a> {
    pub(crate) fn new(
        state: &'a mut DocumentState,
        history: &'a mut History,
        saved: &'a mut bool,
        renderer: &'a mut dyn Renderer,
    ) -> Self {
        Self {
            state,
            history,
            saved,
            renderer,
            commands: SmallVec::new(),
        }
    }
    /// Whether anything has been changed through this writer so far.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.commands.is_empty()
    }
    fn layer_mut(&mut self, layer: LayerID) -> Result<&mut Layer, EditError> {
        self.state
            .journal
            .layer_mut(layer)
            .ok_or(EditError::UnknownLayer(layer))
    }
    /// Put a finished stroke, text or image on top of `layer`.
    pub fn add_item(&mut self, layer: LayerID, mut item: Item) -> Result<ItemID, EditError> {
        if let ItemKind::TempText(_) = item.kind {
            return Err(EditError::WrongKind {
                item: item.id(),
                expected: "Stroke, Text or Image",
                found: item.kind_name().to_owned(),
            });
        }
        item.update_bbox(&*self.renderer);
        let id = item.id();
        let target = self
            .state
            .journal
            .layer_mut(layer)
            .ok_or(EditError::UnknownLayer(layer))?;
        let index = target.len();
        target.push(item, self.renderer);
        self.commands.push(UndoItem::AddItem {
            layer,
            index,
            item: Slot::Ref(id),
        });
        Ok(id)
    }
    /// Run the eraser along `centers` over the strokes of `layer`.
    ///
    /// With `whole_strokes`, any stroke touched is removed. Otherwise only the touched portions are cut away,
    /// leaving the surviving pieces as new strokes, which later centers may cut again.
    /// Returns how many strokes were erased or cut.
    pub fn erase(
        &mut self,
        layer: LayerID,
        centers: &[Point],
        radius: f64,
        whole_strokes: bool,
    ) -> Result<usize, EditError> {
        util::check_positive(radius)?;
        self.layer_mut(layer)?;
        let mut records = Vec::new();
        for &center in centers {
            let area = BBox::around(center.as_array(), radius);
            let mut index = 0;
            loop {
                let target = self
                    .state
                    .journal
                    .layer_mut(layer)
                    .ok_or(EditError::UnknownLayer(layer))?;
                let Some(item) = target.items().get(index) else {
                    break;
                };
                let Some(stroke) = item.as_stroke().filter(|_| item.bbox.intersects(&area))
                else {
                    index += 1;
                    continue;
                };
                let pieces = if whole_strokes {
                    erase::touches(stroke, center, radius).then(Vec::new)
                } else {
                    erase::split_stroke(stroke, center, radius)
                };
                let Some(pieces) = pieces else {
                    index += 1;
                    continue;
                };
                let Some(original) = target.take(index, self.renderer) else {
                    break;
                };
                let mut replacements = Vec::with_capacity(pieces.len());
                for (offset, piece) in pieces.into_iter().enumerate() {
                    let piece = Item::stroke(piece);
                    replacements.push(Slot::Ref(piece.id()));
                    target.insert(index + offset, piece, self.renderer);
                }
                let count = replacements.len();
                records.push(ErasureRecord {
                    index,
                    original: Slot::owned(original),
                    replacements,
                });
                index += count;
            }
        }
        if records.is_empty() {
            log::debug!("Eraser touched nothing");
            return Ok(0);
        }
        let erased = records.len();
        self.commands.push(UndoItem::Erasure {
            layer,
            reason: ErasureReason::Eraser,
            records,
        });
        Ok(erased)
    }
    /// Replace the strokes `originals` by a recognized shape, placed where the topmost original was.
    pub fn recognize(
        &mut self,
        layer: LayerID,
        originals: &[ItemID],
        shape: Stroke,
    ) -> Result<ItemID, EditError> {
        let target = self.layer_mut(layer)?;
        let mut positions = Vec::with_capacity(originals.len());
        for &id in originals {
            let item = target.item(id).ok_or(EditError::UnknownItem(id))?;
            if item.as_stroke().is_none() {
                return Err(EditError::WrongKind {
                    item: id,
                    expected: "Stroke",
                    found: item.kind_name().to_owned(),
                });
            }
            positions.push((target.position(id).unwrap_or_default(), id));
        }
        positions.sort_unstable();
        positions.dedup();

        let shape = Item::stroke(shape);
        let shape_id = shape.id();
        let mut shape = Some(shape);
        let mut records = Vec::with_capacity(positions.len());
        let last = positions.len().saturating_sub(1);
        for (nth, &(_, id)) in positions.iter().enumerate() {
            let target = self
                .state
                .journal
                .layer_mut(layer)
                .ok_or(EditError::UnknownLayer(layer))?;
            let index = target.position(id).ok_or(EditError::UnknownItem(id))?;
            let Some(original) = target.take(index, self.renderer) else {
                continue;
            };
            let mut replacements = Vec::new();
            if nth == last {
                if let Some(shape) = shape.take() {
                    target.insert(index, shape, self.renderer);
                    replacements.push(Slot::Ref(shape_id));
                }
            }
            records.push(ErasureRecord {
                index,
                original: Slot::owned(original),
                replacements,
            });
        }
        // No originals: the shape is simply added.
        if let Some(shape) = shape {
            return self.add_item(layer, shape);
        }
        self.commands.push(UndoItem::Erasure {
            layer,
            reason: ErasureReason::Recognizer,
            records,
        });
        Ok(shape_id)
    }
    /// Shift `items` by `delta` and move them onto the top of layer `to`, keeping their relative order.
    ///
    /// All items must be on the same layer.
    pub fn move_items(
        &mut self,
        items: &[ItemID],
        delta: [f64; 2],
        to: LayerID,
    ) -> Result<(), EditError> {
        self.move_items_to(items, delta, to, Placement::Top)
    }
    /// Like [`Self::move_items`], landing the items at `placement` in `to`.
    ///
    /// Items staying on their layer keep their stacking, whatever the placement.
    pub fn move_items_to(
        &mut self,
        items: &[ItemID],
        delta: [f64; 2],
        to: LayerID,
        placement: Placement,
    ) -> Result<(), EditError> {
        let Some(&first) = items.first() else {
            return Ok(());
        };
        let location = self
            .state
            .journal
            .locate_item(first)
            .ok_or(EditError::UnknownItem(first))?;
        let source = &self.state.journal.pages()[location.page].layers()[location.layer];
        let from = source.id();
        let mut sorted = Vec::with_capacity(items.len());
        for &id in items {
            sorted.push((source.position(id).ok_or(EditError::UnknownItem(id))?, id));
        }
        sorted.sort_unstable();
        sorted.dedup();
        let depths: Vec<_> = sorted
            .iter()
            .map(|&(position, _)| {
                position
                    .checked_sub(1)
                    .map(|below| source.items()[below].id())
            })
            .collect();
        let sorted: Vec<_> = sorted.into_iter().map(|(_, id)| id).collect();

        if delta == [0.0, 0.0] && from == to {
            log::debug!("Move by nothing");
            return Ok(());
        }
        let placement = if from == to { Placement::Top } else { placement };
        let geometry = transform::translate(
            &mut self.state.journal,
            &sorted,
            delta,
            from,
            to,
            placement.depths(&sorted).as_deref(),
            self.renderer,
        )?;
        self.commands.push(UndoItem::MoveSelection {
            items: sorted,
            delta,
            from,
            to,
            placement,
            depths,
            geometry,
        });
        Ok(())
    }
    /// Map `items` through `p * scale + offset`. Refused as a whole if any coordinate would leave the valid range.
    pub fn resize_items(
        &mut self,
        items: &[ItemID],
        scale: [f64; 2],
        offset: [f64; 2],
    ) -> Result<(), EditError> {
        let mut unique = Vec::with_capacity(items.len());
        for &id in items {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            return Ok(());
        }
        let geometry = transform::rescale(
            &mut self.state.journal,
            &unique,
            scale,
            offset,
            self.renderer,
        )?;
        self.commands.push(UndoItem::ResizeSelection {
            items: unique,
            scale,
            offset,
            geometry,
        });
        Ok(())
    }
    /// Put `items` on top of `layer`, in order.
    pub fn paste(&mut self, layer: LayerID, items: Vec<Item>) -> Result<Vec<ItemID>, EditError> {
        self.layer_mut(layer)?;
        if let Some(temp) = items
            .iter()
            .find(|item| matches!(item.kind, ItemKind::TempText(_)))
        {
            return Err(EditError::WrongKind {
                item: temp.id(),
                expected: "Stroke, Text or Image",
                found: temp.kind_name().to_owned(),
            });
        }
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<_> = items.iter().map(Item::id).collect();
        let target = self
            .state
            .journal
            .layer_mut(layer)
            .ok_or(EditError::UnknownLayer(layer))?;
        for mut item in items {
            item.update_bbox(&*self.renderer);
            target.push(item, self.renderer);
        }
        self.commands.push(UndoItem::Paste {
            layer,
            items: ids.iter().map(|&id| Slot::Ref(id)).collect(),
        });
        Ok(ids)
    }
    /// Change the ink color and/or stroke thickness of `items`. Images and unchanged items are skipped.
    pub fn repaint(
        &mut self,
        items: &[ItemID],
        color: Option<Rgba>,
        thickness: Option<f64>,
    ) -> Result<(), EditError> {
        if let Some(thickness) = thickness {
            util::check_positive(thickness)?;
        }
        if let Some(&missing) = items
            .iter()
            .find(|&&id| self.state.journal.item(id).is_none())
        {
            return Err(EditError::UnknownItem(missing));
        }
        let mut brushes = Vec::new();
        for &id in items {
            let Some(item) = self.state.journal.item_mut(id) else {
                continue;
            };
            let Some(&old) = item.brush() else {
                continue;
            };
            let mut brush = old;
            if let Some(color) = color {
                brush.color = if brush.tool == Tool::Highlighter {
                    color.with_alpha(Rgba::HIGHLIGHTER_ALPHA)
                } else {
                    color
                };
            }
            if let (Some(thickness), ItemKind::Stroke(_)) = (thickness, &item.kind) {
                brush.thickness = thickness;
            }
            if brush == old {
                continue;
            }
            item.replace_brush(brush);
            if let Some(visual) = item.visual() {
                self.renderer.invalidate(visual);
            }
            brushes.push((id, old));
        }
        if brushes.is_empty() {
            log::debug!("Repaint changed nothing");
            return Ok(());
        }
        self.commands.push(UndoItem::Repaint { brushes });
        Ok(())
    }
    /// Replace the contents of a text item.
    pub fn edit_text(&mut self, id: ItemID, text: impl Into<String>) -> Result<(), EditError> {
        let mut text = text.into();
        let item = text_item(&mut self.state.journal, id)?;
        let Some(current) = item.as_text_mut() else {
            return Ok(());
        };
        if current.text == text {
            log::debug!("Text edit changed nothing");
            return Ok(());
        }
        std::mem::swap(&mut current.text, &mut text);
        item.update_bbox(&*self.renderer);
        self.state.journal.rebuild_item(id, self.renderer);
        self.commands.push(UndoItem::TextEdit { item: id, text });
        Ok(())
    }
    /// Change the font and ink of a text item.
    pub fn set_text_attributes(
        &mut self,
        id: ItemID,
        font_name: impl Into<String>,
        font_size: f64,
        brush: Brush,
    ) -> Result<(), EditError> {
        util::check_positive(font_size)?;
        let mut font_name = font_name.into();
        let mut brush = brush;
        let item = text_item(&mut self.state.journal, id)?;
        let Some(current) = item.as_text_mut() else {
            return Ok(());
        };
        #[allow(clippy::float_cmp)]
        let unchanged = current.font_name == font_name
            && current.font_size() == font_size
            && current.brush == brush;
        if unchanged {
            log::debug!("Text attributes unchanged");
            return Ok(());
        }
        let old_size = current.font_size();
        current.set_font_size(font_size)?;
        std::mem::swap(&mut current.font_name, &mut font_name);
        std::mem::swap(&mut current.brush, &mut brush);
        item.update_bbox(&*self.renderer);
        self.state.journal.rebuild_item(id, self.renderer);
        self.commands.push(UndoItem::TextAttributes {
            item: id,
            font_name,
            font_size: old_size,
            brush,
        });
        Ok(())
    }
    /// Add an empty layer at `index` (clamped) on `page`, counting from the bottom.
    pub fn new_layer(&mut self, page: PageID, index: usize) -> Result<LayerID, EditError> {
        let target = self
            .state
            .journal
            .page_mut(page)
            .ok_or(EditError::UnknownPage(page))?;
        let index = index.min(target.layers().len());
        let layer = Layer::new();
        let id = layer.id();
        target.insert_layer(index, layer, self.renderer);
        self.commands.push(UndoItem::NewLayer {
            page,
            index,
            layer: Slot::Ref(id),
        });
        Ok(id)
    }
    /// Remove a layer and everything on it. A page's only layer is replaced by a fresh empty one, whose ID is
    /// returned.
    pub fn delete_layer(&mut self, layer: LayerID) -> Result<Option<LayerID>, EditError> {
        let (page_index, index) = self
            .state
            .journal
            .locate_layer(layer)
            .ok_or(EditError::UnknownLayer(layer))?;
        let target = self
            .state
            .journal
            .page_at_mut(page_index)
            .ok_or(EditError::UnknownLayer(layer))?;
        let page = target.id();
        if target.layers().len() == 1 {
            let fresh = Layer::new();
            let fresh_id = fresh.id();
            let Some(removed) = target.replace_layer(index, fresh, self.renderer) else {
                return Err(EditError::UnknownLayer(layer));
            };
            self.commands.push(UndoItem::DeleteLayer {
                page,
                index,
                layer: Slot::owned(removed),
                replacement: Some(Slot::Ref(fresh_id)),
            });
            Ok(Some(fresh_id))
        } else {
            let Some(removed) = target.take_layer(index, self.renderer) else {
                return Err(EditError::UnknownLayer(layer));
            };
            self.commands.push(UndoItem::DeleteLayer {
                page,
                index,
                layer: Slot::owned(removed),
                replacement: None,
            });
            Ok(None)
        }
    }
    /// Add a blank page at `index` (clamped) made from `template`.
    pub fn insert_page(&mut self, index: usize, template: &PageTemplate) -> PageID {
        let page = template.instantiate();
        let id = page.id();
        let index = index.min(self.state.journal.len());
        self.state.journal.insert_page(index, page, self.renderer);
        self.commands.push(UndoItem::NewPage {
            index,
            page: Slot::Ref(id),
        });
        id
    }
    /// Add a blank page at `index` from the document's default template.
    pub fn insert_default_page(&mut self, index: usize) -> PageID {
        let template = self.state.default_page.clone();
        self.insert_page(index, &template)
    }
    /// Add a blank page at `index` shaped like `like`, sharing its background.
    pub fn insert_page_like(&mut self, index: usize, like: PageID) -> Result<PageID, EditError> {
        let template = PageTemplate::from_page(
            self.state
                .journal
                .page(like)
                .ok_or(EditError::UnknownPage(like))?,
        );
        Ok(self.insert_page(index, &template))
    }
    /// Remove a page. The last page can't be removed.
    pub fn delete_page(&mut self, page: PageID) -> Result<(), EditError> {
        let index = self
            .state
            .journal
            .page_position(page)
            .ok_or(EditError::UnknownPage(page))?;
        let removed = self
            .state
            .journal
            .take_page(index, self.renderer)
            .ok_or(EditError::LastPage)?;
        self.commands.push(UndoItem::DeletePage {
            index,
            page: Slot::owned(removed),
        });
        Ok(())
    }
    /// Replace a page's background, optionally resizing the page with it.
    pub fn set_background(
        &mut self,
        page: PageID,
        background: Background,
        resize: Option<[f64; 2]>,
    ) -> Result<(), EditError> {
        if let Some([width, height]) = resize {
            util::check_positive(width)?;
            util::check_positive(height)?;
        }
        let target = self
            .state
            .journal
            .page_mut(page)
            .ok_or(EditError::UnknownPage(page))?;
        let old_size = match resize {
            Some(size) => Some(target.replace_size(size, self.renderer)?),
            None => None,
        };
        let old = target.replace_background(background, self.renderer);
        self.commands.push(UndoItem::Background {
            page,
            background: Box::new(old),
            resize: old_size,
        });
        Ok(())
    }
    /// Change the paper size of a page.
    pub fn resize_paper(&mut self, page: PageID, size: [f64; 2]) -> Result<(), EditError> {
        let target = self
            .state
            .journal
            .page_mut(page)
            .ok_or(EditError::UnknownPage(page))?;
        if target.size() == size {
            log::debug!("Paper size unchanged");
            return Ok(());
        }
        let old = target.replace_size(size, self.renderer)?;
        self.commands.push(UndoItem::PaperResize { page, size: old });
        Ok(())
    }
    /// Change the template new pages are made from.
    pub fn set_default_page(&mut self, template: PageTemplate) {
        if self.state.default_page == template {
            log::debug!("Default page unchanged");
            return;
        }
        let old = std::mem::replace(&mut self.state.default_page, template);
        self.commands.push(UndoItem::DefaultPage {
            template: Box::new(old),
        });
    }
    fn selected_pages(&self, selection: PageSelection) -> Result<Vec<PageID>, EditError> {
        match selection {
            PageSelection::One(page) => {
                self.state
                    .journal
                    .page(page)
                    .ok_or(EditError::UnknownPage(page))?;
                Ok(vec![page])
            }
            PageSelection::All => Ok(self.state.journal.pages().iter().map(|p| p.id()).collect()),
        }
    }
    /// Swap in a background derived from the current one for each selected page where `derive` gives one.
    fn rebackground(
        &mut self,
        selection: PageSelection,
        derive: impl Fn(&Background) -> Option<Background>,
    ) -> Result<usize, EditError> {
        let mut changed = 0;
        for page in self.selected_pages(selection)? {
            let Some(target) = self.state.journal.page_mut(page) else {
                continue;
            };
            let Some(background) = derive(target.background()) else {
                continue;
            };
            let old = target.replace_background(background, self.renderer);
            self.commands.push(UndoItem::Background {
                page,
                background: Box::new(old),
                resize: None,
            });
            changed += 1;
        }
        Ok(changed)
    }
    /// Recolor the paper of plain pages. Pages with image or PDF backgrounds, or already of that color, are skipped.
    /// Returns how many pages changed.
    pub fn set_paper_color(
        &mut self,
        selection: PageSelection,
        color: Rgba,
    ) -> Result<usize, EditError> {
        let changed = self.rebackground(selection, |current| match current.color() {
            Some(old) if old != color => {
                let mut background = current.duplicate();
                background.kind = BackgroundKind::Solid { color };
                Some(background)
            }
            _ => None,
        })?;
        if changed == 0 {
            log::debug!("Paper color unchanged");
        }
        Ok(changed)
    }
    /// Change the ruling of the selected pages. Pages with image or PDF backgrounds become plain white paper.
    /// Returns how many pages changed.
    pub fn set_paper_style(
        &mut self,
        selection: PageSelection,
        ruling: Ruling,
    ) -> Result<usize, EditError> {
        let changed = self.rebackground(selection, |current| {
            if !current.is_solid() {
                Some(Background::solid(Rgba::WHITE, ruling))
            } else if current.ruling != ruling {
                let mut background = current.duplicate();
                background.ruling = ruling;
                Some(background)
            } else {
                None
            }
        })?;
        if changed == 0 {
            log::debug!("Paper style unchanged");
        }
        Ok(changed)
    }
}

fn text_item(journal: &mut Journal, id: ItemID) -> Result<&mut Item, EditError> {
    let item = journal.item_mut(id).ok_or(EditError::UnknownItem(id))?;
    if let ItemKind::Text(_) = item.kind {
        Ok(item)
    } else {
        Err(EditError::WrongKind {
            item: id,
            expected: "Text",
            found: item.kind_name().to_owned(),
        })
    }
}
