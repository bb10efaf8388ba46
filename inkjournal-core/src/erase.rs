//! # Eraser geometry
//!
//! Cutting strokes where a round eraser touches them.

use crate::item::{Point, Stroke};

/// Cut the parts of `stroke` within `radius` of `center`.
///
/// `None` if the eraser misses the stroke entirely. Otherwise, the surviving pieces in drawing order, possibly none.
/// A piece after a cut starts at the last erased point so it still reaches under the eraser. Pieces of fewer than
/// two points are dropped. Per-segment widths follow their points.
#[must_use]
pub fn split_stroke(stroke: &Stroke, center: Point, radius: f64) -> Option<Vec<Stroke>> {
    let points = stroke.points();
    let inside = |index: usize| points[index].distance(center) <= radius;
    let mut pieces = Vec::new();
    let mut hit = false;
    let mut start = 0;
    let mut index = 0;
    while index < points.len() {
        if !inside(index) {
            index += 1;
            continue;
        }
        hit = true;
        pieces.extend(stroke.piece(start..index));
        while index < points.len() && inside(index) {
            index += 1;
        }
        start = index - 1;
    }
    if !hit {
        return None;
    }
    pieces.extend(stroke.piece(start..points.len()));
    Some(pieces)
}

/// Whether any point of `stroke` is within `radius` of `center`.
#[must_use]
pub fn touches(stroke: &Stroke, center: Point, radius: f64) -> bool {
    stroke
        .points()
        .iter()
        .any(|point| point.distance(center) <= radius)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::item::test::{pen, points};

    #[allow(clippy::cast_precision_loss)]
    fn line(n: usize) -> Vec<Point> {
        (0..n).map(|x| Point { x: x as f64, y: 0.0 }).collect()
    }

    #[test]
    fn miss() {
        let stroke = Stroke::new(line(5), pen(1.0)).unwrap();
        assert!(split_stroke(&stroke, Point { x: 2.0, y: 5.0 }, 1.0).is_none());
        assert!(!touches(&stroke, Point { x: 2.0, y: 5.0 }, 1.0));
    }
    #[test]
    fn cut_in_middle() {
        let stroke = Stroke::new(line(10), pen(1.0)).unwrap();
        // Erases x = 4, 5.
        let pieces = split_stroke(&stroke, Point { x: 4.5, y: 0.0 }, 0.6).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].points(), &line(4)[..]);
        assert_eq!(pieces[1].points().first(), Some(&Point { x: 5.0, y: 0.0 }));
        assert_eq!(pieces[1].points().len(), 5);
    }
    #[test]
    fn short_ends_dropped() {
        let stroke = Stroke::new(line(4), pen(1.0)).unwrap();
        // Erases x = 1, only a single point would remain before it.
        let pieces = split_stroke(&stroke, Point { x: 1.0, y: 0.0 }, 0.1).unwrap();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].points(), points(&[[1.0, 0.0], [2.0, 0.0], [3.0, 0.0]]).as_slice());
        // The whole stroke under the eraser.
        let pieces = split_stroke(&stroke, Point { x: 1.5, y: 0.0 }, 5.0).unwrap();
        assert!(pieces.is_empty());
    }
    #[test]
    fn widths_follow_points() {
        let stroke =
            Stroke::with_widths(line(6), pen(1.0), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let pieces = split_stroke(&stroke, Point { x: 2.0, y: 0.0 }, 0.1).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].widths(), Some([1.0].as_slice()));
        assert_eq!(pieces[1].widths(), Some([3.0, 4.0, 5.0].as_slice()));
        assert!(pieces.iter().all(|piece| piece.brush().variable_width()));
    }
}
