//! Running [`UndoItem`]s against a [`DocumentState`].
//!
//! Every arm checks the whole entry against the document before touching anything, so a refused entry leaves the
//! document as it was.

use super::{document::DocumentState, journal::Journal, layer::LayerID, EditError};
use crate::{
    commands::{CommandConsumer, CommandError, DoUndo, ErasureRecord, Slot, UndoItem},
    item::{Item, ItemID},
    renderer::Renderer,
    transform, util,
};

impl From<EditError> for CommandError {
    fn from(value: EditError) -> Self {
        match value {
            EditError::UnknownPage(_) | EditError::UnknownLayer(_) => Self::UnknownResource,
            _ => Self::MismatchedState,
        }
    }
}

impl CommandConsumer<UndoItem> for DocumentState {
    #[allow(clippy::too_many_lines)]
    fn apply(
        &mut self,
        command: DoUndo<'_, UndoItem>,
        renderer: &mut dyn Renderer,
    ) -> Result<(), CommandError> {
        let journal = &mut self.journal;
        match command {
            DoUndo::Do(UndoItem::AddItem { layer, index, item }) => {
                insert_item(journal, *layer, *index, item, renderer)
            }
            DoUndo::Undo(UndoItem::AddItem { layer, index, item }) => {
                remove_item(journal, *layer, *index, item, renderer)
            }
            DoUndo::Do(UndoItem::Erasure { layer, records, .. }) => {
                redo_erasure(journal, *layer, records, renderer)
            }
            DoUndo::Undo(UndoItem::Erasure { layer, records, .. }) => {
                undo_erasure(journal, *layer, records, renderer)
            }
            DoUndo::Do(UndoItem::Background {
                page,
                background,
                resize,
            })
            | DoUndo::Undo(UndoItem::Background {
                page,
                background,
                resize,
            }) => {
                let page = journal.page_mut(*page).ok_or(CommandError::UnknownResource)?;
                if let Some(size) = resize {
                    if size.iter().any(|&length| util::check_positive(length).is_err()) {
                        return Err(CommandError::MismatchedState);
                    }
                    *size = page.replace_size(*size, renderer).map_err(EditError::from)?;
                }
                let incoming = std::mem::take(&mut **background);
                **background = page.replace_background(incoming, renderer);
                Ok(())
            }
            DoUndo::Do(UndoItem::PaperResize { page, size })
            | DoUndo::Undo(UndoItem::PaperResize { page, size }) => {
                let page = journal.page_mut(*page).ok_or(CommandError::UnknownResource)?;
                *size = page.replace_size(*size, renderer).map_err(EditError::from)?;
                Ok(())
            }
            DoUndo::Do(UndoItem::DefaultPage { template })
            | DoUndo::Undo(UndoItem::DefaultPage { template }) => {
                std::mem::swap(&mut self.default_page, &mut **template);
                Ok(())
            }
            DoUndo::Do(UndoItem::NewLayer { page, index, layer })
            | DoUndo::Undo(UndoItem::DeleteLayer {
                page,
                index,
                layer,
                replacement: None,
            }) => {
                let page = journal.page_mut(*page).ok_or(CommandError::UnknownResource)?;
                if *index > page.layers().len() {
                    return Err(CommandError::MismatchedState);
                }
                let layer = layer.take().ok_or(CommandError::MismatchedState)?;
                page.insert_layer(*index, layer, renderer);
                Ok(())
            }
            DoUndo::Undo(UndoItem::NewLayer { page, index, layer })
            | DoUndo::Do(UndoItem::DeleteLayer {
                page,
                index,
                layer,
                replacement: None,
            }) => {
                let page = journal.page_mut(*page).ok_or(CommandError::UnknownResource)?;
                if layer.is_owned() || page.layers().get(*index).map(|l| l.id()) != Some(layer.id())
                {
                    return Err(CommandError::MismatchedState);
                }
                let removed = page
                    .take_layer(*index, renderer)
                    .ok_or(CommandError::MismatchedState)?;
                layer.park(removed);
                Ok(())
            }
            DoUndo::Do(UndoItem::DeleteLayer {
                page,
                index,
                layer: outgoing,
                replacement: Some(incoming),
            })
            | DoUndo::Undo(UndoItem::DeleteLayer {
                page,
                index,
                layer: incoming,
                replacement: Some(outgoing),
            }) => {
                let page = journal.page_mut(*page).ok_or(CommandError::UnknownResource)?;
                if outgoing.is_owned()
                    || page.layers().get(*index).map(|l| l.id()) != Some(outgoing.id())
                {
                    return Err(CommandError::MismatchedState);
                }
                let layer = incoming.take().ok_or(CommandError::MismatchedState)?;
                let removed = page
                    .replace_layer(*index, layer, renderer)
                    .ok_or(CommandError::MismatchedState)?;
                outgoing.park(removed);
                Ok(())
            }
            DoUndo::Do(UndoItem::NewPage { index, page })
            | DoUndo::Undo(UndoItem::DeletePage { index, page }) => {
                if *index > journal.len() {
                    return Err(CommandError::MismatchedState);
                }
                let page = page.take().ok_or(CommandError::MismatchedState)?;
                journal.insert_page(*index, page, renderer);
                Ok(())
            }
            DoUndo::Undo(UndoItem::NewPage { index, page })
            | DoUndo::Do(UndoItem::DeletePage { index, page }) => {
                if page.is_owned()
                    || journal.pages().get(*index).map(|p| p.id()) != Some(page.id())
                {
                    return Err(CommandError::MismatchedState);
                }
                let removed = journal
                    .take_page(*index, renderer)
                    .ok_or(CommandError::MismatchedState)?;
                page.park(removed);
                Ok(())
            }
            DoUndo::Do(UndoItem::MoveSelection {
                items,
                delta,
                from,
                to,
                placement,
                geometry,
                ..
            }) => {
                log::trace!("Moving {} items by {delta:?} to {placement:?}", items.len());
                let depths = placement.depths(items);
                Ok(transform::relocate(
                    journal,
                    items,
                    geometry,
                    *from,
                    *to,
                    depths.as_deref(),
                    renderer,
                )?)
            }
            DoUndo::Undo(UndoItem::MoveSelection {
                items,
                from,
                to,
                depths,
                geometry,
                ..
            }) => Ok(transform::relocate(
                journal,
                items,
                geometry,
                *to,
                *from,
                Some(depths.as_slice()),
                renderer,
            )?),
            DoUndo::Do(UndoItem::ResizeSelection {
                items,
                scale,
                offset,
                geometry,
            })
            | DoUndo::Undo(UndoItem::ResizeSelection {
                items,
                scale,
                offset,
                geometry,
            }) => {
                log::trace!(
                    "Swapping geometry of {} items resized by {scale:?} + {offset:?}",
                    items.len()
                );
                Ok(transform::restore_geometry(
                    journal, items, geometry, renderer,
                )?)
            }
            DoUndo::Do(UndoItem::Paste { layer, items }) => {
                let target = journal.layer_mut(*layer).ok_or(CommandError::UnknownResource)?;
                if !items.iter().all(Slot::is_owned) {
                    return Err(CommandError::MismatchedState);
                }
                for item in items.iter_mut().filter_map(Slot::take) {
                    target.push(item, renderer);
                }
                Ok(())
            }
            DoUndo::Undo(UndoItem::Paste { layer, items }) => {
                let target = journal.layer_mut(*layer).ok_or(CommandError::UnknownResource)?;
                if items
                    .iter()
                    .any(|item| item.is_owned() || target.position(item.id()).is_none())
                {
                    return Err(CommandError::MismatchedState);
                }
                for slot in items.iter_mut().rev() {
                    let index = target
                        .position(slot.id())
                        .ok_or(CommandError::MismatchedState)?;
                    let item = target
                        .take(index, renderer)
                        .ok_or(CommandError::MismatchedState)?;
                    slot.park(item);
                }
                Ok(())
            }
            DoUndo::Do(UndoItem::Repaint { brushes }) | DoUndo::Undo(UndoItem::Repaint { brushes }) => {
                if brushes
                    .iter()
                    .any(|(id, _)| journal.item(*id).and_then(Item::brush).is_none())
                {
                    return Err(CommandError::MismatchedState);
                }
                for (id, brush) in brushes.iter_mut() {
                    let Some(item) = journal.item_mut(*id) else {
                        continue;
                    };
                    if let Some(old) = item.replace_brush(*brush) {
                        *brush = old;
                    }
                    if let Some(visual) = item.visual() {
                        renderer.invalidate(visual);
                    }
                }
                Ok(())
            }
            DoUndo::Do(UndoItem::TextEdit { item, text })
            | DoUndo::Undo(UndoItem::TextEdit { item, text }) => {
                let target = journal
                    .item_mut(*item)
                    .ok_or(CommandError::MismatchedState)?;
                let current = target.as_text_mut().ok_or(CommandError::MismatchedState)?;
                std::mem::swap(&mut current.text, text);
                target.update_bbox(&*renderer);
                journal.rebuild_item(*item, renderer);
                Ok(())
            }
            DoUndo::Do(UndoItem::TextAttributes {
                item,
                font_name,
                font_size,
                brush,
            })
            | DoUndo::Undo(UndoItem::TextAttributes {
                item,
                font_name,
                font_size,
                brush,
            }) => {
                let target = journal
                    .item_mut(*item)
                    .ok_or(CommandError::MismatchedState)?;
                let current = target.as_text_mut().ok_or(CommandError::MismatchedState)?;
                let old_size = current.font_size();
                current
                    .set_font_size(*font_size)
                    .map_err(|_| CommandError::MismatchedState)?;
                *font_size = old_size;
                std::mem::swap(&mut current.font_name, font_name);
                std::mem::swap(&mut current.brush, brush);
                target.update_bbox(&*renderer);
                journal.rebuild_item(*item, renderer);
                Ok(())
            }
        }
    }
}

fn insert_item(
    journal: &mut Journal,
    layer: LayerID,
    index: usize,
    item: &mut Slot<Item>,
    renderer: &mut dyn Renderer,
) -> Result<(), CommandError> {
    let target = journal.layer_mut(layer).ok_or(CommandError::UnknownResource)?;
    if index > target.len() {
        return Err(CommandError::MismatchedState);
    }
    let item = item.take().ok_or(CommandError::MismatchedState)?;
    target.insert(index, item, renderer);
    Ok(())
}

fn remove_item(
    journal: &mut Journal,
    layer: LayerID,
    index: usize,
    item: &mut Slot<Item>,
    renderer: &mut dyn Renderer,
) -> Result<(), CommandError> {
    let target = journal.layer_mut(layer).ok_or(CommandError::UnknownResource)?;
    if item.is_owned() || target.items().get(index).map(Item::id) != Some(item.id()) {
        return Err(CommandError::MismatchedState);
    }
    let removed = target
        .take(index, renderer)
        .ok_or(CommandError::MismatchedState)?;
    item.park(removed);
    Ok(())
}

/// Dry-run an erasure against the layer's item order.
fn check_erasure(
    mut order: Vec<ItemID>,
    records: &[ErasureRecord],
    forward: bool,
) -> Result<(), CommandError> {
    let step = |order: &mut Vec<ItemID>, record: &ErasureRecord| {
        let count = record.replacements.len();
        if forward {
            if record.original.is_owned()
                || order.get(record.index) != Some(&record.original.id())
                || !record.replacements.iter().all(Slot::is_owned)
            {
                return false;
            }
            order.remove(record.index);
            for (offset, replacement) in record.replacements.iter().enumerate() {
                order.insert(record.index + offset, replacement.id());
            }
        } else {
            let placed = order.get(record.index..record.index + count);
            let expected = record.replacements.iter().map(Slot::id);
            if !record.original.is_owned()
                || record.replacements.iter().any(Slot::is_owned)
                || !placed.is_some_and(|placed| placed.iter().copied().eq(expected))
            {
                return false;
            }
            order.drain(record.index..record.index + count);
            order.insert(record.index, record.original.id());
        }
        true
    };
    let consistent = if forward {
        records.iter().all(|record| step(&mut order, record))
    } else {
        records.iter().rev().all(|record| step(&mut order, record))
    };
    if consistent {
        Ok(())
    } else {
        Err(CommandError::MismatchedState)
    }
}

fn redo_erasure(
    journal: &mut Journal,
    layer: LayerID,
    records: &mut [ErasureRecord],
    renderer: &mut dyn Renderer,
) -> Result<(), CommandError> {
    let target = journal.layer_mut(layer).ok_or(CommandError::UnknownResource)?;
    check_erasure(
        target.items().iter().map(Item::id).collect(),
        records,
        true,
    )?;
    for record in records.iter_mut() {
        let mut index = record.index;
        for item in record.replacements.iter_mut().filter_map(Slot::take) {
            target.insert(index, item, renderer);
            index += 1;
        }
        if let Some(original) = target.take(index, renderer) {
            record.original.park(original);
        }
    }
    Ok(())
}

fn undo_erasure(
    journal: &mut Journal,
    layer: LayerID,
    records: &mut [ErasureRecord],
    renderer: &mut dyn Renderer,
) -> Result<(), CommandError> {
    let target = journal.layer_mut(layer).ok_or(CommandError::UnknownResource)?;
    check_erasure(
        target.items().iter().map(Item::id).collect(),
        records,
        false,
    )?;
    for record in records.iter_mut().rev() {
        for replacement in &mut record.replacements {
            let Some(item) = target.take(record.index, renderer) else {
                continue;
            };
            replacement.park(item);
        }
        if let Some(original) = record.original.take() {
            target.insert(record.index, original, renderer);
        }
    }
    Ok(())
}
