//! # Items
//!
//! Everything that can sit on a layer: strokes, text boxes, placed images, and the text box currently
//! being typed into. Every item has a bounding box and possibly a visual materialized by the renderer.

use std::rc::Rc;

use crate::{
    bbox::BBox,
    brush::{Brush, BrushFlags},
    renderer::{Renderer, VisualID},
    util::{self, GeometryError},
};

pub type ItemID = crate::InkID<Item>;

#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
impl Point {
    /// A point with validated coordinates.
    pub fn new(x: f64, y: f64) -> Result<Self, GeometryError> {
        Ok(Self {
            x: util::check_coordinate(x)?,
            y: util::check_coordinate(y)?,
        })
    }
    #[must_use]
    pub fn as_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A freehand mark: an ordered run of points drawn with one brush.
///
/// Invariants, upheld by the constructors:
/// * at least one point, all coordinates [`util::finite_sized`]
/// * `widths` is present iff the brush has [`BrushFlags::VARIABLE_WIDTH`], with one entry per segment.
#[derive(Clone, PartialEq, Debug)]
pub struct Stroke {
    points: Vec<Point>,
    brush: Brush,
    widths: Option<Vec<f64>>,
}
impl Stroke {
    /// A constant-width stroke. Clears the brush's variable-width flag.
    pub fn new(points: Vec<Point>, mut brush: Brush) -> Result<Self, GeometryError> {
        Self::validate_points(&points)?;
        brush.flags.remove(BrushFlags::VARIABLE_WIDTH);
        Ok(Self {
            points,
            brush,
            widths: None,
        })
    }
    /// A variable-width stroke, with one width per segment (`points.len() - 1` widths).
    pub fn with_widths(
        points: Vec<Point>,
        mut brush: Brush,
        widths: Vec<f64>,
    ) -> Result<Self, GeometryError> {
        Self::validate_points(&points)?;
        let expected = points.len() - 1;
        if widths.len() != expected {
            return Err(GeometryError::WidthCount {
                expected,
                found: widths.len(),
            });
        }
        for &width in &widths {
            util::check_positive(width)?;
        }
        brush.flags.insert(BrushFlags::VARIABLE_WIDTH);
        Ok(Self {
            points,
            brush,
            widths: Some(widths),
        })
    }
    fn validate_points(points: &[Point]) -> Result<(), GeometryError> {
        if points.is_empty() {
            return Err(GeometryError::EmptyStroke);
        }
        for point in points {
            util::check_coordinate(point.x)?;
            util::check_coordinate(point.y)?;
        }
        Ok(())
    }
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }
    /// Per-segment widths, present iff the brush is variable-width.
    #[must_use]
    pub fn widths(&self) -> Option<&[f64]> {
        self.widths.as_deref()
    }
    #[must_use]
    pub fn brush(&self) -> &Brush {
        &self.brush
    }
    /// Replace the brush. The variable-width flag follows the stroke's geometry, not the argument.
    pub fn set_brush(&mut self, mut brush: Brush) {
        brush
            .flags
            .set(BrushFlags::VARIABLE_WIDTH, self.widths.is_some());
        self.brush = brush;
    }
    /// Width of segment `segment` (between points `segment` and `segment + 1`).
    #[must_use]
    pub fn segment_width(&self, segment: usize) -> f64 {
        self.widths
            .as_ref()
            .and_then(|widths| widths.get(segment).copied())
            .unwrap_or(self.brush.thickness)
    }
    /// Tight box around the points.
    #[must_use]
    pub fn bbox(&self) -> BBox {
        // Never empty by construction.
        BBox::enclosing(self.points.iter().map(|point| point.as_array())).unwrap_or_default()
    }
    /// Copy of the points in `range`, with their segment widths. `None` if fewer than two points remain.
    pub(crate) fn piece(&self, range: std::ops::Range<usize>) -> Option<Self> {
        if range.len() < 2 || range.end > self.points.len() {
            return None;
        }
        let widths = self
            .widths
            .as_ref()
            .map(|widths| widths[range.start..range.end - 1].to_vec());
        Some(Self {
            points: self.points[range].to_vec(),
            brush: self.brush,
            widths,
        })
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Text {
    pub text: String,
    pub font_name: String,
    font_size: f64,
    /// Only the color is meaningful for text.
    pub brush: Brush,
}
impl Text {
    pub fn new(
        text: impl Into<String>,
        font_name: impl Into<String>,
        font_size: f64,
        brush: Brush,
    ) -> Result<Self, GeometryError> {
        Ok(Self {
            text: text.into(),
            font_name: font_name.into(),
            font_size: util::check_positive(font_size)?,
            brush,
        })
    }
    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.font_size
    }
    pub fn set_font_size(&mut self, font_size: f64) -> Result<(), GeometryError> {
        self.font_size = util::check_positive(font_size)?;
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
}

/// A placed raster. The encoded bytes are kept verbatim so saving never re-encodes.
#[derive(Clone)]
pub struct Image {
    raster: Rc<image::RgbaImage>,
    encoded: Rc<[u8]>,
}
impl Image {
    /// Decode PNG or JPEG data.
    pub fn from_encoded(encoded: Vec<u8>) -> Result<Self, ImageError> {
        let raster = image::load_from_memory(&encoded)?.into_rgba8();
        if raster.width() == 0 || raster.height() == 0 {
            return Err(ImageError::Empty);
        }
        Ok(Self {
            raster: Rc::new(raster),
            encoded: encoded.into(),
        })
    }
    /// Assemble from an already decoded raster, e.g. when loading a document.
    #[must_use]
    pub fn from_parts(raster: Rc<image::RgbaImage>, encoded: Vec<u8>) -> Self {
        Self {
            raster,
            encoded: encoded.into(),
        }
    }
    #[must_use]
    pub fn raster(&self) -> &Rc<image::RgbaImage> {
        &self.raster
    }
    #[must_use]
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.raster.dimensions()
    }
}
impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        (Rc::ptr_eq(&self.raster, &other.raster) || self.raster == other.raster)
            && self.encoded == other.encoded
    }
}
impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("dimensions", &self.dimensions())
            .field("encoded_len", &self.encoded.len())
            .finish()
    }
}

#[derive(Clone, PartialEq, Debug, strum::AsRefStr)]
pub enum ItemKind {
    Stroke(Stroke),
    Text(Text),
    Image(Image),
    /// Text still being edited. Never persisted, never recorded in history.
    TempText(Text),
}

pub struct Item {
    id: ItemID,
    pub bbox: BBox,
    pub(crate) visual: Option<VisualID>,
    pub kind: ItemKind,
}
impl Item {
    #[must_use]
    pub fn stroke(stroke: Stroke) -> Self {
        Self {
            id: ItemID::default(),
            bbox: stroke.bbox(),
            visual: None,
            kind: ItemKind::Stroke(stroke),
        }
    }
    /// A text item anchored with its top-left corner at `anchor`.
    ///
    /// The far corner is unknown until the renderer measures it, see [`Self::update_bbox`].
    pub fn text(text: Text, anchor: [f64; 2]) -> Result<Self, GeometryError> {
        Self::text_like(ItemKind::Text(text), anchor)
    }
    /// Like [`Self::text`], for a text box still being typed.
    pub fn temp_text(text: Text, anchor: [f64; 2]) -> Result<Self, GeometryError> {
        Self::text_like(ItemKind::TempText(text), anchor)
    }
    fn text_like(kind: ItemKind, [x, y]: [f64; 2]) -> Result<Self, GeometryError> {
        let (x, y) = (util::check_coordinate(x)?, util::check_coordinate(y)?);
        Ok(Self {
            id: ItemID::default(),
            bbox: BBox::from_corners([x, y], [x, y]),
            visual: None,
            kind,
        })
    }
    /// An image stretched over `bbox`.
    pub fn image(image: Image, mut bbox: BBox) -> Result<Self, GeometryError> {
        for coordinate in [bbox.left, bbox.right, bbox.top, bbox.bottom] {
            util::check_coordinate(coordinate)?;
        }
        bbox.normalize();
        Ok(Self {
            id: ItemID::default(),
            bbox,
            visual: None,
            kind: ItemKind::Image(image),
        })
    }
    #[must_use]
    pub fn id(&self) -> ItemID {
        self.id
    }
    #[must_use]
    pub fn visual(&self) -> Option<VisualID> {
        self.visual
    }
    /// Name of the item's kind, for diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        self.kind.as_ref()
    }
    #[must_use]
    pub fn as_stroke(&self) -> Option<&Stroke> {
        match &self.kind {
            ItemKind::Stroke(stroke) => Some(stroke),
            _ => None,
        }
    }
    /// Text of a text or temp text item.
    #[must_use]
    pub fn as_text(&self) -> Option<&Text> {
        match &self.kind {
            ItemKind::Text(text) | ItemKind::TempText(text) => Some(text),
            _ => None,
        }
    }
    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match &mut self.kind {
            ItemKind::Text(text) | ItemKind::TempText(text) => Some(text),
            _ => None,
        }
    }
    #[must_use]
    pub fn as_image(&self) -> Option<&Image> {
        match &self.kind {
            ItemKind::Image(image) => Some(image),
            _ => None,
        }
    }
    /// The ink of strokes and text. Images have none.
    #[must_use]
    pub fn brush(&self) -> Option<&Brush> {
        match &self.kind {
            ItemKind::Stroke(stroke) => Some(stroke.brush()),
            ItemKind::Text(text) | ItemKind::TempText(text) => Some(&text.brush),
            ItemKind::Image(_) => None,
        }
    }
    /// Replace the ink of strokes and text, returning the old brush. No-op on images.
    pub fn replace_brush(&mut self, brush: Brush) -> Option<Brush> {
        match &mut self.kind {
            ItemKind::Stroke(stroke) => {
                let old = *stroke.brush();
                stroke.set_brush(brush);
                Some(old)
            }
            ItemKind::Text(text) | ItemKind::TempText(text) => {
                Some(std::mem::replace(&mut text.brush, brush))
            }
            ItemKind::Image(_) => None,
        }
    }
    /// Deep copy under a fresh ID, with no visual.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: ItemID::default(),
            bbox: self.bbox,
            visual: None,
            kind: self.kind.clone(),
        }
    }
    /// Recompute the bounding box from the geometry.
    ///
    /// Strokes scan their points. Text keeps its top-left anchor and asks the renderer for the extents,
    /// leaving the box alone if the renderer can't measure. Image boxes are authoritative and untouched.
    pub fn update_bbox(&mut self, renderer: &dyn Renderer) {
        match &self.kind {
            ItemKind::Stroke(stroke) => self.bbox = stroke.bbox(),
            ItemKind::Text(text) | ItemKind::TempText(text) => {
                if let Some(extents) =
                    renderer.text_extents(&text.text, &text.font_name, text.font_size)
                {
                    self.bbox.right = self.bbox.left + extents.width;
                    self.bbox.bottom = self.bbox.top + extents.height;
                }
            }
            ItemKind::Image(_) => (),
        }
    }
    /// The geometry this item would have shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Result<Geometry, GeometryError> {
        let mut geometry = self.geometry();
        geometry.bbox.translate(dx, dy);
        check_bbox(&geometry.bbox)?;
        if let Shape::Stroke { points, .. } = &mut geometry.shape {
            for point in points {
                *point = Point::new(point.x + dx, point.y + dy)?;
            }
        }
        Ok(geometry)
    }
    /// Snapshot of everything a move or resize changes.
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        let shape = match &self.kind {
            ItemKind::Stroke(stroke) => Shape::Stroke {
                points: stroke.points.clone(),
                thickness: stroke.brush.thickness,
                widths: stroke.widths.clone(),
            },
            ItemKind::Text(text) | ItemKind::TempText(text) => Shape::Text {
                font_size: text.font_size,
            },
            ItemKind::Image(_) => Shape::Fixed,
        };
        Geometry {
            bbox: self.bbox,
            shape,
        }
    }
    /// The geometry this item would have after mapping every coordinate `p` to `p * scale + offset`, per axis.
    ///
    /// Line widths and font sizes scale by the geometric mean of the two factors. Text is scaled about its
    /// top-left corner, the far corner coming from the renderer's measurement, or from stretching the old box if
    /// the renderer can't measure. Text being typed keeps its geometry.
    pub fn rescaled(
        &self,
        [sx, sy]: [f64; 2],
        [ox, oy]: [f64; 2],
        renderer: &dyn Renderer,
    ) -> Result<Geometry, GeometryError> {
        let mean = (sx * sy).abs().sqrt();
        let map = |x: f64, y: f64| [x * sx + ox, y * sy + oy];
        let mapped = BBox::from_corners(
            map(self.bbox.left, self.bbox.top),
            map(self.bbox.right, self.bbox.bottom),
        );
        let (bbox, shape) = match &self.kind {
            ItemKind::Stroke(stroke) => {
                let mut points = Vec::with_capacity(stroke.points.len());
                for point in &stroke.points {
                    let [x, y] = map(point.x, point.y);
                    points.push(Point::new(x, y)?);
                }
                let widths = match &stroke.widths {
                    Some(widths) => Some(
                        widths
                            .iter()
                            .map(|&width| util::check_positive(width * mean))
                            .collect::<Result<Vec<_>, _>>()?,
                    ),
                    None => None,
                };
                let shape = Shape::Stroke {
                    points,
                    thickness: util::check_positive(stroke.brush.thickness * mean)?,
                    widths,
                };
                (mapped, shape)
            }
            ItemKind::Text(text) => {
                let font_size = util::check_positive(text.font_size * mean)?;
                let [left, top] = map(self.bbox.left, self.bbox.top);
                let (width, height) = renderer
                    .text_extents(&text.text, &text.font_name, font_size)
                    .map_or((mapped.width(), mapped.height()), |extents| {
                        (extents.width, extents.height)
                    });
                let bbox = BBox {
                    left,
                    top,
                    right: left + width,
                    bottom: top + height,
                };
                (bbox, Shape::Text { font_size })
            }
            ItemKind::Image(_) => (mapped, Shape::Fixed),
            ItemKind::TempText(_) => return Ok(self.geometry()),
        };
        check_bbox(&bbox)?;
        Ok(Geometry { bbox, shape })
    }
    /// Map every coordinate through `p * scale + offset`, see [`Self::rescaled`]. Returns the old geometry.
    ///
    /// Nothing changes on error.
    pub fn rescale(
        &mut self,
        scale: [f64; 2],
        offset: [f64; 2],
        renderer: &dyn Renderer,
    ) -> Result<Geometry, GeometryError> {
        let mut geometry = self.rescaled(scale, offset, renderer)?;
        self.swap_geometry(&mut geometry);
        Ok(geometry)
    }
    /// Whether `geometry` was taken from an item shaped like this one.
    #[must_use]
    pub fn fits(&self, geometry: &Geometry) -> bool {
        match (&self.kind, &geometry.shape) {
            (ItemKind::Stroke(stroke), Shape::Stroke { points, widths, .. }) => {
                points.len() == stroke.points.len() && widths.is_some() == stroke.widths.is_some()
            }
            (ItemKind::Text(_) | ItemKind::TempText(_), Shape::Text { .. })
            | (ItemKind::Image(_), Shape::Fixed) => true,
            _ => false,
        }
    }
    /// Exchange this item's geometry with `geometry`. Does nothing unless it [fits](Self::fits).
    pub fn swap_geometry(&mut self, geometry: &mut Geometry) {
        if !self.fits(geometry) {
            return;
        }
        std::mem::swap(&mut self.bbox, &mut geometry.bbox);
        match (&mut self.kind, &mut geometry.shape) {
            (
                ItemKind::Stroke(stroke),
                Shape::Stroke {
                    points,
                    thickness,
                    widths,
                },
            ) => {
                std::mem::swap(&mut stroke.points, points);
                std::mem::swap(&mut stroke.brush.thickness, thickness);
                std::mem::swap(&mut stroke.widths, widths);
            }
            (ItemKind::Text(text) | ItemKind::TempText(text), Shape::Text { font_size }) => {
                std::mem::swap(&mut text.font_size, font_size);
            }
            _ => (),
        }
    }
}

fn check_bbox(bbox: &BBox) -> Result<(), GeometryError> {
    for coordinate in [bbox.left, bbox.right, bbox.top, bbox.bottom] {
        util::check_coordinate(coordinate)?;
    }
    Ok(())
}

/// The parts of an item a move or resize changes: its box, and the points, line widths or font size behind it.
#[derive(Clone, PartialEq, Debug)]
pub struct Geometry {
    bbox: BBox,
    shape: Shape,
}
impl Geometry {
    #[must_use]
    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }
}

#[derive(Clone, PartialEq, Debug)]
enum Shape {
    Stroke {
        points: Vec<Point>,
        thickness: f64,
        widths: Option<Vec<f64>>,
    },
    Text {
        font_size: f64,
    },
    Fixed,
}
/// Model equality: visuals are the renderer's business and are ignored.
impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.bbox == other.bbox && self.kind == other.kind
    }
}
impl std::fmt::Debug for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.id)
            .field("bbox", &self.bbox)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::{color::Rgba, renderer::NullRenderer};

    pub(crate) fn points(coords: &[[f64; 2]]) -> Vec<Point> {
        coords
            .iter()
            .map(|&[x, y]| Point::new(x, y).unwrap())
            .collect()
    }
    pub(crate) fn pen(thickness: f64) -> Brush {
        Brush::new(crate::brush::Tool::Pen, Rgba::BLACK, thickness)
    }

    #[test]
    fn stroke_bbox() {
        let stroke = Stroke::new(points(&[[1.0, 5.0], [-2.0, 3.0], [4.0, 4.0]]), pen(1.0)).unwrap();
        let item = Item::stroke(stroke);
        assert_eq!(
            item.bbox,
            BBox {
                left: -2.0,
                right: 4.0,
                top: 3.0,
                bottom: 5.0
            }
        );
    }
    #[test]
    fn stroke_validation() {
        assert_eq!(
            Stroke::new(Vec::new(), pen(1.0)),
            Err(GeometryError::EmptyStroke)
        );
        let bad = vec![Point {
            x: f64::NAN,
            y: 0.0,
        }];
        assert!(matches!(
            Stroke::new(bad, pen(1.0)),
            Err(GeometryError::BadCoordinate(_))
        ));
        assert_eq!(
            Stroke::with_widths(points(&[[0.0, 0.0], [1.0, 1.0]]), pen(1.0), vec![1.0, 2.0]),
            Err(GeometryError::WidthCount {
                expected: 1,
                found: 2
            })
        );
    }
    #[test]
    fn variable_width_flag_follows_geometry() {
        let mut brush = pen(1.0);
        brush.flags.insert(BrushFlags::VARIABLE_WIDTH);
        let mut stroke = Stroke::new(points(&[[0.0, 0.0], [1.0, 1.0]]), brush).unwrap();
        assert!(!stroke.brush().variable_width());
        assert_eq!(stroke.widths(), None);

        let mut varying =
            Stroke::with_widths(points(&[[0.0, 0.0], [1.0, 1.0]]), pen(1.0), vec![2.5]).unwrap();
        assert!(varying.brush().variable_width());
        varying.set_brush(pen(3.0));
        assert!(varying.brush().variable_width());
        stroke.set_brush(brush);
        assert!(!stroke.brush().variable_width());
        assert_eq!(varying.segment_width(0), 2.5);
    }
    #[test]
    fn rescale_doubles() {
        let stroke = Stroke::new(points(&[[1.0, 1.0], [2.0, 2.0]]), pen(1.0)).unwrap();
        let mut item = Item::stroke(stroke);
        item.rescale([2.0, 2.0], [0.0, 0.0], &NullRenderer).unwrap();
        let stroke = item.as_stroke().unwrap();
        assert_eq!(stroke.points(), points(&[[2.0, 2.0], [4.0, 4.0]]).as_slice());
        assert_eq!(stroke.brush().thickness, 2.0);
        assert_eq!(
            item.bbox,
            BBox {
                left: 2.0,
                right: 4.0,
                top: 2.0,
                bottom: 4.0
            }
        );
    }
    #[test]
    fn rescale_mirrors_and_resorts() {
        let stroke = Stroke::with_widths(
            points(&[[1.0, 1.0], [3.0, 2.0]]),
            pen(1.0),
            vec![2.0],
        )
        .unwrap();
        let mut item = Item::stroke(stroke);
        // Geometric mean of |-4 * 1| is 2.
        item.rescale([-4.0, 1.0], [10.0, 0.0], &NullRenderer).unwrap();
        let stroke = item.as_stroke().unwrap();
        assert_eq!(stroke.points(), points(&[[6.0, 1.0], [-2.0, 2.0]]).as_slice());
        assert_eq!(stroke.widths(), Some([4.0].as_slice()));
        assert_eq!(stroke.brush().thickness, 2.0);
        assert!(item.bbox.left <= item.bbox.right);
        assert_eq!(item.bbox.left, -2.0);
        assert_eq!(item.bbox.right, 6.0);
    }
    #[test]
    fn text_scales_about_top_left() {
        let text = Text::new("hi", "Sans", 12.0, pen(1.0)).unwrap();
        let mut item = Item::text(text, [10.0, 20.0]).unwrap();
        item.bbox.right = 30.0;
        item.bbox.bottom = 32.0;
        item.rescale([2.0, 2.0], [1.0, 1.0], &NullRenderer).unwrap();
        assert_eq!(item.as_text().unwrap().font_size(), 24.0);
        assert_eq!(item.bbox.left, 21.0);
        assert_eq!(item.bbox.top, 41.0);
        // No measurement available: the old box is stretched.
        assert_eq!(item.bbox.right, 61.0);
        assert_eq!(item.bbox.bottom, 65.0);
    }
    #[test]
    fn translate_moves_geometry_and_box() {
        let stroke = Stroke::new(points(&[[0.0, 0.0], [1.0, 2.0]]), pen(1.0)).unwrap();
        let mut item = Item::stroke(stroke);
        let mut moved = item.translated(5.0, -1.0).unwrap();
        item.swap_geometry(&mut moved);
        assert_eq!(
            item.as_stroke().unwrap().points(),
            points(&[[5.0, -1.0], [6.0, 1.0]]).as_slice()
        );
        assert_eq!(item.bbox.left, 5.0);
        assert_eq!(item.bbox.bottom, 1.0);
    }
    #[test]
    fn duplicate_gets_fresh_id() {
        let item = Item::stroke(Stroke::new(points(&[[0.0, 0.0]]), pen(1.0)).unwrap());
        let copy = item.duplicate();
        assert_ne!(item.id(), copy.id());
        assert_eq!(item.kind, copy.kind);
        assert_eq!(copy.visual(), None);
    }
    #[test]
    fn piece_keeps_widths() {
        let stroke = Stroke::with_widths(
            points(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]]),
            pen(1.0),
            vec![1.0, 2.0, 3.0],
        )
        .unwrap();
        let piece = stroke.piece(1..4).unwrap();
        assert_eq!(piece.points().len(), 3);
        assert_eq!(piece.widths(), Some([2.0, 3.0].as_slice()));
        assert!(stroke.piece(3..4).is_none());
    }
    #[test]
    fn swapping_geometry_back_is_exact() {
        let stroke = Stroke::with_widths(
            points(&[[33.3, 33.1], [99.9, 83.1]]),
            pen(0.7),
            vec![1.1],
        )
        .unwrap();
        let mut item = Item::stroke(stroke);
        let (before, geometry) = (format!("{item:?}"), item.geometry());
        let mut old = item.rescale([3.0, 3.0], [0.1, 0.7], &NullRenderer).unwrap();
        assert_eq!(old, geometry);
        assert_ne!(format!("{item:?}"), before);
        item.swap_geometry(&mut old);
        assert_eq!(format!("{item:?}"), before);
    }
    #[test]
    fn rescale_refuses_out_of_range() {
        let stroke = Stroke::new(points(&[[1.0, 1.0], [5000.0, 2.0]]), pen(1.0)).unwrap();
        let mut item = Item::stroke(stroke);
        let before = format!("{item:?}");
        assert!(matches!(
            item.rescale([1000.0, 1.0], [0.0, 0.0], &NullRenderer),
            Err(GeometryError::BadCoordinate(_))
        ));
        assert_eq!(format!("{item:?}"), before);
        assert!(item.translated(0.0, -999_999.5).is_err());
        assert!(item.translated(10.0, 10.0).is_ok());
    }
    #[test]
    fn foreign_geometry_does_not_fit() {
        let mut stroke = Item::stroke(Stroke::new(points(&[[0.0, 0.0]]), pen(1.0)).unwrap());
        let text = Item::text(Text::new("a", "Sans", 10.0, pen(1.0)).unwrap(), [0.0, 0.0]).unwrap();
        let mut geometry = text.geometry();
        assert!(!stroke.fits(&geometry));
        let before = format!("{stroke:?}");
        stroke.swap_geometry(&mut geometry);
        assert_eq!(format!("{stroke:?}"), before);
    }
}
