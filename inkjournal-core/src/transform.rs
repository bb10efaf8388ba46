//! # Transforms
//!
//! Moving and resizing sets of items, shared by direct editing and by history replay.

use crate::{
    item::{Geometry, Item, ItemID},
    renderer::Renderer,
    state::{journal::Journal, layer::LayerID, EditError},
    util::{self, GeometryError},
};

/// Shift `items` by `delta`, moving them from layer `from` to layer `to`. See [`relocate`] for `depths`.
///
/// Every shifted coordinate is checked before anything changes. Returns the old geometry of each item, for
/// [`relocate`]-ing them back. `items` must not repeat.
pub fn translate(
    journal: &mut Journal,
    items: &[ItemID],
    [dx, dy]: [f64; 2],
    from: LayerID,
    to: LayerID,
    depths: Option<&[Option<ItemID>]>,
    renderer: &mut dyn Renderer,
) -> Result<Vec<Geometry>, EditError> {
    util::check_coordinate(dx)?;
    util::check_coordinate(dy)?;
    let source = journal.layer(from).ok_or(EditError::UnknownLayer(from))?;
    let mut geometry = Vec::with_capacity(items.len());
    for &id in items {
        let item = source.item(id).ok_or(EditError::UnknownItem(id))?;
        geometry.push(item.translated(dx, dy)?);
    }
    relocate(journal, items, &mut geometry, from, to, depths, renderer)?;
    Ok(geometry)
}

/// Move `items` from layer `from` to layer `to`, swapping `geometry[n]` into `items[n]`.
///
/// `depths` gives, per item, where it goes in `to`: `None` at the very bottom, `Some(id)` directly above that item,
/// or at the top if that item isn't there. Without `depths` moved items are appended in order. When `depths` is
/// given, visuals are restacked to match even if the layer doesn't change.
///
/// All items must currently be in `from` and fit their geometry, otherwise nothing happens.
pub fn relocate(
    journal: &mut Journal,
    items: &[ItemID],
    geometry: &mut [Geometry],
    from: LayerID,
    to: LayerID,
    depths: Option<&[Option<ItemID>]>,
    renderer: &mut dyn Renderer,
) -> Result<(), EditError> {
    let source = journal.layer(from).ok_or(EditError::UnknownLayer(from))?;
    check_fit(items, geometry, |id| source.item(id))?;
    journal.layer(to).ok_or(EditError::UnknownLayer(to))?;
    if let Some(depths) = depths {
        if depths.len() != items.len() {
            return Err(EditError::DepthCount {
                expected: items.len(),
                found: depths.len(),
            });
        }
    }

    for (nth, (&id, geometry)) in items.iter().zip(geometry.iter_mut()).enumerate() {
        let depth = depths.map(|depths| depths[nth]);
        let source = journal
            .layer_mut(from)
            .ok_or(EditError::UnknownLayer(from))?;
        let index = source.position(id).ok_or(EditError::UnknownItem(id))?;
        if from == to {
            let Some(item) = source.item_at_mut(index) else {
                continue;
            };
            item.swap_geometry(geometry);
            let Some(visual) = item.visual else {
                continue;
            };
            renderer.invalidate(visual);
            if let Some(depth) = depth {
                let after = depth
                    .and_then(|below| source.item(below))
                    .and_then(Item::visual);
                renderer.restack(visual, after);
            }
        } else {
            let Some(mut item) = source.take(index, renderer) else {
                continue;
            };
            item.swap_geometry(geometry);
            let target = journal.layer_mut(to).ok_or(EditError::UnknownLayer(to))?;
            let index = match depth {
                None => target.len(),
                Some(None) => 0,
                Some(Some(below)) => target
                    .position(below)
                    .map_or(target.len(), |position| position + 1),
            };
            target.insert(index, item, renderer);
        }
    }
    Ok(())
}

/// Every item exists and can take its geometry.
fn check_fit<'a>(
    items: &[ItemID],
    geometry: &[Geometry],
    lookup: impl Fn(ItemID) -> Option<&'a Item>,
) -> Result<(), EditError> {
    if geometry.len() != items.len() {
        return Err(EditError::DepthCount {
            expected: items.len(),
            found: geometry.len(),
        });
    }
    for (&id, geometry) in items.iter().zip(geometry) {
        let item = lookup(id).ok_or(EditError::UnknownItem(id))?;
        if !item.fits(geometry) {
            return Err(EditError::WrongKind {
                item: id,
                expected: "matching geometry",
                found: item.kind_name().to_owned(),
            });
        }
    }
    Ok(())
}

/// Where moved items land in their new layer.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Placement {
    /// On top, in order.
    #[default]
    Top,
    /// At the very bottom, in order.
    Bottom,
    /// Directly above this item, in order. On top if it isn't in the layer.
    Above(ItemID),
}
impl Placement {
    /// Per-item depths for [`translate`] stacking `items` in order at this placement.
    #[must_use]
    pub fn depths(self, items: &[ItemID]) -> Option<Vec<Option<ItemID>>> {
        let first = match self {
            Self::Top => return None,
            Self::Bottom => None,
            Self::Above(below) => Some(below),
        };
        let rest = items.iter().copied().map(Some);
        Some(std::iter::once(first).chain(rest).take(items.len()).collect())
    }
}

/// Map every coordinate of `items` through `p * scale + offset`. See [`Item::rescale`].
///
/// Every new geometry is checked before anything changes. Returns the old geometry of each item, for
/// [`restore_geometry`]. Every transformed item gets a fresh visual. `items` must not repeat.
pub fn rescale(
    journal: &mut Journal,
    items: &[ItemID],
    scale: [f64; 2],
    offset: [f64; 2],
    renderer: &mut dyn Renderer,
) -> Result<Vec<Geometry>, EditError> {
    if scale
        .iter()
        .any(|&factor| !util::finite_sized(factor) || factor == 0.0)
    {
        return Err(GeometryError::DegenerateScale.into());
    }
    util::check_coordinate(offset[0])?;
    util::check_coordinate(offset[1])?;
    let mut geometry = Vec::with_capacity(items.len());
    for &id in items {
        let item = journal.item(id).ok_or(EditError::UnknownItem(id))?;
        geometry.push(item.rescaled(scale, offset, &*renderer)?);
    }
    restore_geometry(journal, items, &mut geometry, renderer)?;
    Ok(geometry)
}

/// Swap `geometry[n]` into `items[n]`, leaving the replaced geometry in its place.
///
/// Refused without change unless every item exists and its geometry [fits](Item::fits).
pub fn restore_geometry(
    journal: &mut Journal,
    items: &[ItemID],
    geometry: &mut [Geometry],
    renderer: &mut dyn Renderer,
) -> Result<(), EditError> {
    check_fit(items, geometry, |id| journal.item(id))?;
    for (&id, geometry) in items.iter().zip(geometry.iter_mut()) {
        let location = journal.locate_item(id).ok_or(EditError::UnknownItem(id))?;
        let Some(layer) = journal.layer_at_mut(location.page, location.layer) else {
            continue;
        };
        if let Some(item) = layer.item_at_mut(location.index) {
            item.swap_geometry(geometry);
        }
        layer.rebuild_item(location.index, renderer);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        item::{
            test::{pen, points},
            Stroke,
        },
        renderer::{Headless, NullRenderer},
        state::{background::Background, layer::Layer, page::Page},
    };

    fn dot(x: f64) -> Item {
        Item::stroke(Stroke::new(points(&[[x, x]]), pen(1.0)).unwrap())
    }
    /// One page, two layers: three dots on the bottom layer, two on the top.
    fn journal() -> (Journal, LayerID, LayerID) {
        let mut page = Page::from_background(Background::default(), 100.0, 100.0).unwrap();
        page.insert_layer(1, Layer::new(), &mut NullRenderer);
        let mut journal = Journal::new(page);
        let (bottom, top) = {
            let layers = journal.pages()[0].layers();
            (layers[0].id(), layers[1].id())
        };
        for x in [1.0, 2.0, 3.0] {
            journal.layer_mut(bottom).unwrap().push(dot(x), &mut NullRenderer);
        }
        for x in [4.0, 5.0] {
            journal.layer_mut(top).unwrap().push(dot(x), &mut NullRenderer);
        }
        (journal, bottom, top)
    }
    fn ids(journal: &Journal, layer: LayerID) -> Vec<ItemID> {
        journal
            .layer(layer)
            .unwrap()
            .items()
            .iter()
            .map(Item::id)
            .collect()
    }

    #[test]
    fn cross_layer_depths() {
        let (mut journal, bottom, top) = journal();
        let lower = ids(&journal, bottom);
        let upper = ids(&journal, top);
        // Front of the list, then right after upper[0].
        translate(
            &mut journal,
            &[lower[0], lower[2]],
            [1.0, 0.0],
            bottom,
            top,
            Some(&[None, Some(upper[0])]),
            &mut NullRenderer,
        )
        .unwrap();
        assert_eq!(ids(&journal, top), [lower[0], upper[0], lower[2], upper[1]]);
        assert_eq!(ids(&journal, bottom), [lower[1]]);
        assert_eq!(journal.item(lower[0]).unwrap().bbox.left, 2.0);
    }
    #[test]
    fn cross_layer_appends_without_depths() {
        let (mut journal, bottom, top) = journal();
        let lower = ids(&journal, bottom);
        let upper = ids(&journal, top);
        translate(
            &mut journal,
            &[lower[1]],
            [0.0, 0.0],
            bottom,
            top,
            None,
            &mut NullRenderer,
        )
        .unwrap();
        assert_eq!(ids(&journal, top), [upper[0], upper[1], lower[1]]);
    }
    #[test]
    fn missing_reference_appends() {
        let (mut journal, bottom, top) = journal();
        let lower = ids(&journal, bottom);
        translate(
            &mut journal,
            &[lower[0]],
            [0.0, 0.0],
            bottom,
            top,
            Some(&[Some(lower[2])]),
            &mut NullRenderer,
        )
        .unwrap();
        assert_eq!(ids(&journal, top).last(), Some(&lower[0]));
    }
    #[test]
    fn same_layer_keeps_order() {
        let (mut journal, bottom, _) = journal();
        let before = ids(&journal, bottom);
        translate(
            &mut journal,
            &[before[2], before[0]],
            [0.0, 5.0],
            bottom,
            bottom,
            None,
            &mut NullRenderer,
        )
        .unwrap();
        assert_eq!(ids(&journal, bottom), before);
        assert_eq!(journal.item(before[0]).unwrap().bbox.top, 6.0);
    }
    #[test]
    fn refuses_partial_moves() {
        let (mut journal, bottom, top) = journal();
        let upper = ids(&journal, top);
        let lower = ids(&journal, bottom);
        let result = translate(
            &mut journal,
            &[lower[0], upper[0]],
            [1.0, 1.0],
            bottom,
            top,
            None,
            &mut NullRenderer,
        );
        assert_eq!(result, Err(EditError::UnknownItem(upper[0])));
        assert_eq!(journal.item(lower[0]).unwrap().bbox.left, 1.0);
    }
    #[test]
    fn moved_visuals_follow_layers() {
        let (mut journal, bottom, top) = journal();
        let mut renderer = Headless::new();
        journal.materialize(&mut renderer);
        let lower = ids(&journal, bottom);
        translate(
            &mut journal,
            &[lower[0]],
            [0.0, 0.0],
            bottom,
            top,
            Some(&[None]),
            &mut renderer,
        )
        .unwrap();
        let layer = journal.layer(top).unwrap();
        let group = layer.visual().unwrap();
        let order: Vec<_> = layer.items().iter().filter_map(Item::visual).collect();
        assert_eq!(order.len(), 3);
        assert_eq!(renderer.children_of(group), Some(order.as_slice()));
    }
    #[test]
    fn rescale_round_trips() {
        let (mut journal, bottom, _) = journal();
        let before = ids(&journal, bottom);
        let snapshot = format!("{journal:?}");
        let mut old = rescale(&mut journal, &before, [3.0, 3.0], [0.1, -2.7], &mut NullRenderer).unwrap();
        assert_eq!(journal.item(before[1]).unwrap().bbox.left, 6.1);
        restore_geometry(&mut journal, &before, &mut old, &mut NullRenderer).unwrap();
        assert_eq!(format!("{journal:?}"), snapshot);
        // And forward again, exactly.
        restore_geometry(&mut journal, &before, &mut old, &mut NullRenderer).unwrap();
        assert_eq!(journal.item(before[1]).unwrap().bbox.left, 6.1);
        assert!(rescale(&mut journal, &before, [0.0, 1.0], [0.0, 0.0], &mut NullRenderer).is_err());
    }
    #[test]
    fn rescale_checks_every_item_first() {
        let (mut journal, bottom, _) = journal();
        let before = ids(&journal, bottom);
        let snapshot = format!("{journal:?}");
        // The last dot would land out of range.
        let result = rescale(&mut journal, &before, [400_000.0, 1.0], [0.0, 0.0], &mut NullRenderer);
        assert!(matches!(
            result,
            Err(EditError::Geometry(GeometryError::BadCoordinate(_)))
        ));
        assert_eq!(format!("{journal:?}"), snapshot);
    }
    #[test]
    fn translate_checks_range_first() {
        let (mut journal, bottom, top) = journal();
        let lower = ids(&journal, bottom);
        let snapshot = format!("{journal:?}");
        let result = translate(
            &mut journal,
            &lower,
            [999_997.5, 0.0],
            bottom,
            top,
            None,
            &mut NullRenderer,
        );
        assert!(matches!(
            result,
            Err(EditError::Geometry(GeometryError::BadCoordinate(_)))
        ));
        assert_eq!(format!("{journal:?}"), snapshot);
    }
    #[test]
    fn placement_depths() {
        let (journal, bottom, top) = journal();
        let lower = ids(&journal, bottom);
        let upper = ids(&journal, top);
        assert_eq!(Placement::Top.depths(&lower), None);
        assert_eq!(
            Placement::Bottom.depths(&lower[..2]),
            Some(vec![None, Some(lower[0])])
        );
        assert_eq!(
            Placement::Above(upper[0]).depths(&lower[..2]),
            Some(vec![Some(upper[0]), Some(lower[0])])
        );
    }
}
