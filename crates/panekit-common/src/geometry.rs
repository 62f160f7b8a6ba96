//! Integer pixel geometry.
//!
//! `Rect` is a plain `x, y, width, height` rectangle. `Region` is a set of
//! non-overlapping rectangles, used by the compositor to track what must be
//! repainted.

use serde::{Deserialize, Serialize};

/// Rectangle in integer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Build from edge coordinates.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// True if `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Intersection, or an empty rectangle.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            Rect::zero()
        } else {
            Rect::from_edges(left, top, right, bottom)
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Bounding union. Empty rectangles do not contribute.
    pub fn united(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// The parts of `self` not covered by `other`, as up to four disjoint bands.
    pub fn subtract(&self, other: &Rect) -> Vec<Rect> {
        let cut = self.intersect(other);
        if cut.is_empty() {
            return if self.is_empty() { Vec::new() } else { vec![*self] };
        }

        let mut out = Vec::with_capacity(4);
        let bands = [
            Rect::from_edges(self.x, self.y, self.right(), cut.y),
            Rect::from_edges(self.x, cut.bottom(), self.right(), self.bottom()),
            Rect::from_edges(self.x, cut.y, cut.x, cut.bottom()),
            Rect::from_edges(cut.right(), cut.y, self.right(), cut.bottom()),
        ];
        out.extend(bands.into_iter().filter(|r| !r.is_empty()));
        out
    }
}

/// A set of non-overlapping rectangles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<Rect>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.union_rect(&rect);
        region
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn area(&self) -> i64 {
        self.rects.iter().map(Rect::area).sum()
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.contains_point(x, y))
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.rects.iter().any(|r| r.intersects(rect))
    }

    pub fn bounding_rect(&self) -> Rect {
        self.rects
            .iter()
            .fold(Rect::zero(), |acc, r| acc.united(r))
    }

    /// Add the parts of `rect` not already covered.
    pub fn union_rect(&mut self, rect: &Rect) {
        if rect.is_empty() {
            return;
        }
        let mut pieces = vec![*rect];
        for existing in &self.rects {
            pieces = pieces.iter().flat_map(|p| p.subtract(existing)).collect();
            if pieces.is_empty() {
                return;
            }
        }
        self.rects.extend(pieces);
    }

    pub fn union_region(&mut self, other: &Region) {
        for rect in &other.rects {
            self.union_rect(rect);
        }
    }

    pub fn subtract_rect(&mut self, rect: &Rect) {
        if rect.is_empty() {
            return;
        }
        self.rects = self.rects.iter().flat_map(|r| r.subtract(rect)).collect();
    }

    pub fn intersect_rect(&mut self, rect: &Rect) {
        self.rects = self
            .rects
            .iter()
            .map(|r| r.intersect(rect))
            .filter(|r| !r.is_empty())
            .collect();
    }

    pub fn intersected_with_rect(&self, rect: &Rect) -> Region {
        let mut out = self.clone();
        out.intersect_rect(rect);
        out
    }

    pub fn intersect_region(&mut self, other: &Region) {
        let mut out = Region::new();
        for a in &self.rects {
            for b in &other.rects {
                let cut = a.intersect(b);
                if !cut.is_empty() {
                    // Both inputs are disjoint, so the pieces are too.
                    out.rects.push(cut);
                }
            }
        }
        *self = out;
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        for rect in &mut self.rects {
            *rect = rect.translated(dx, dy);
        }
    }

    /// Collapse into the bounding box once the rectangle count exceeds `max_rects`.
    pub fn simplify(&mut self, max_rects: usize) {
        if self.rects.len() > max_rects.max(1) {
            let bounds = self.bounding_rect();
            self.rects = vec![bounds];
        }
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Region::from_rect(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersect_and_union() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersect(&b), Rect::new(50, 50, 50, 50));
        assert_eq!(a.united(&b), Rect::new(0, 0, 150, 150));
        assert!(a.intersect(&Rect::new(200, 0, 10, 10)).is_empty());
        assert_eq!(Rect::zero().united(&b), b);
    }

    #[test]
    fn test_rect_subtract_corner() {
        let b = Rect::new(0, 0, 100, 100);
        let a = Rect::new(0, 0, 50, 50);
        let pieces = b.subtract(&a);
        let total: i64 = pieces.iter().map(Rect::area).sum();
        assert_eq!(total, 10_000 - 2_500);
        assert!(pieces.iter().all(|p| !p.intersects(&a)));
    }

    #[test]
    fn test_rect_subtract_covering() {
        let small = Rect::new(10, 10, 5, 5);
        assert!(small.subtract(&Rect::new(0, 0, 100, 100)).is_empty());
    }

    #[test]
    fn test_region_union_has_no_overlap() {
        let mut region = Region::from_rect(Rect::new(0, 0, 100, 100));
        region.union_rect(&Rect::new(50, 50, 100, 100));
        assert_eq!(region.area(), 10_000 + 10_000 - 2_500);
        assert_eq!(region.bounding_rect(), Rect::new(0, 0, 150, 150));
    }

    #[test]
    fn test_region_subtract_and_intersect() {
        let mut region = Region::from_rect(Rect::new(0, 0, 100, 100));
        region.subtract_rect(&Rect::new(25, 25, 50, 50));
        assert_eq!(region.area(), 10_000 - 2_500);
        assert!(!region.contains_point(50, 50));
        assert!(region.contains_point(10, 10));

        region.intersect_rect(&Rect::new(0, 0, 30, 30));
        assert_eq!(region.area(), 900 - 25);
    }

    #[test]
    fn test_region_intersect_region() {
        let mut a = Region::from_rect(Rect::new(0, 0, 10, 10));
        a.union_rect(&Rect::new(20, 0, 10, 10));
        let b = Region::from_rect(Rect::new(5, 0, 20, 10));
        a.intersect_region(&b);
        assert_eq!(a.area(), 50 + 50);
    }

    #[test]
    fn test_region_simplify() {
        let mut region = Region::new();
        for i in 0..5 {
            region.union_rect(&Rect::new(i * 20, 0, 10, 10));
        }
        region.simplify(4);
        assert_eq!(region.rects(), &[Rect::new(0, 0, 90, 10)]);
    }
}
