//! Axis-aligned bounding boxes in document units. `top` is the smaller y, as y grows downward.

#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct BBox {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}
impl BBox {
    /// Construct from two arbitrary corners, sorting them so that `left <= right` and `top <= bottom`.
    #[must_use]
    pub fn from_corners([x0, y0]: [f64; 2], [x1, y1]: [f64; 2]) -> Self {
        Self {
            left: x0.min(x1),
            right: x0.max(x1),
            top: y0.min(y1),
            bottom: y0.max(y1),
        }
    }
    /// Square box of half-width `radius` centered on `center`.
    #[must_use]
    pub fn around([x, y]: [f64; 2], radius: f64) -> Self {
        Self {
            left: x - radius,
            right: x + radius,
            top: y - radius,
            bottom: y + radius,
        }
    }
    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn enclosing(mut points: impl Iterator<Item = [f64; 2]>) -> Option<Self> {
        let [x, y] = points.next()?;
        let mut bbox = Self {
            left: x,
            right: x,
            top: y,
            bottom: y,
        };
        for [x, y] in points {
            bbox.left = bbox.left.min(x);
            bbox.right = bbox.right.max(x);
            bbox.top = bbox.top.min(y);
            bbox.bottom = bbox.bottom.max(y);
        }
        Some(bbox)
    }
    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
    /// Inclusive overlap test - boxes that merely touch on an edge or corner intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        intersects(self, other)
    }
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.left += dx;
        self.right += dx;
        self.top += dy;
        self.bottom += dy;
    }
    /// Swap corners as needed to restore `left <= right` and `top <= bottom`,
    /// e.g. after a mirroring scale.
    pub fn normalize(&mut self) {
        if self.left > self.right {
            std::mem::swap(&mut self.left, &mut self.right);
        }
        if self.top > self.bottom {
            std::mem::swap(&mut self.top, &mut self.bottom);
        }
    }
}

/// Inclusive axis-aligned overlap test.
#[must_use]
pub fn intersects(a: &BBox, b: &BBox) -> bool {
    a.top.max(b.top) <= a.bottom.min(b.bottom) && a.left.max(b.left) <= a.right.min(b.right)
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    fn boxed(left: f64, top: f64, right: f64, bottom: f64) -> BBox {
        BBox {
            left,
            right,
            top,
            bottom,
        }
    }

    #[test]
    fn touching_edges_intersect() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(10.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        // Corner contact counts too.
        let c = boxed(10.0, 10.0, 11.0, 11.0);
        assert!(a.intersects(&c));
    }
    #[test]
    fn disjoint() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(10.5, 0.0, 20.0, 10.0);
        assert!(!intersects(&a, &b));
        let below = boxed(0.0, 10.01, 10.0, 12.0);
        assert!(!intersects(&a, &below));
    }
    #[test]
    fn enclosing_points() {
        let bbox = BBox::enclosing([[3.0, -1.0], [-2.0, 4.0], [1.0, 1.0]].into_iter()).unwrap();
        assert_eq!(bbox, boxed(-2.0, -1.0, 3.0, 4.0));
        assert!(BBox::enclosing(std::iter::empty()).is_none());
    }
    #[test]
    fn normalize_after_mirror() {
        let mut bbox = boxed(5.0, 6.0, 1.0, 2.0);
        bbox.normalize();
        assert_eq!(bbox, boxed(1.0, 2.0, 5.0, 6.0));
    }

    proptest! {
        #[test]
        fn intersects_symmetric_and_reflexive(
            l0 in -100.0f64..100.0, t0 in -100.0f64..100.0, w0 in 0.0f64..50.0, h0 in 0.0f64..50.0,
            l1 in -100.0f64..100.0, t1 in -100.0f64..100.0, w1 in 0.0f64..50.0, h1 in 0.0f64..50.0,
        ) {
            let a = boxed(l0, t0, l0 + w0, t0 + h0);
            let b = boxed(l1, t1, l1 + w1, t1 + h1);
            prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
            prop_assert!(intersects(&a, &a));
        }
    }
}
