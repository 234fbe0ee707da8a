//! Integer geometry shared by the dock engine and its host.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Point { x, y } }

    pub fn offset_by(self, dx: i32, dy: i32) -> Self { Point::new(self.x + dx, self.y + dy) }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point { Point::new(self.x - rhs.x, self.y - rhs.y) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self { Size { width, height } }

    pub fn is_empty(&self) -> bool { self.width <= 0 || self.height <= 0 }

    /// Smallest size containing both.
    pub fn union(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { x, y, width, height }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Rect::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(&self) -> Point { Point::new(self.x, self.y) }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    pub fn right(&self) -> i32 { self.x + self.width }

    pub fn bottom(&self) -> i32 { self.y + self.height }

    pub fn center(&self) -> Point { Point::new(self.x + self.width / 2, self.y + self.height / 2) }

    pub fn area(&self) -> i64 { i64::from(self.width.max(0)) * i64::from(self.height.max(0)) }

    pub fn is_empty(&self) -> bool { self.width <= 0 || self.height <= 0 }

    /// Half-open containment: the right and bottom edges belong to the neighbor.
    pub fn contains(&self, point: Point) -> bool {
        (self.x..self.right()).contains(&point.x) && (self.y..self.bottom()).contains(&point.y)
    }

    pub fn contains_rect(&self, other: Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Rect {
        let min_x = self.x.max(other.x);
        let max_x = self.right().min(other.right());
        let min_y = self.y.max(other.y);
        let max_y = self.bottom().min(other.bottom());
        Rect::new(min_x, min_y, (max_x - min_x).max(0), (max_y - min_y).max(0))
    }

    /// The central region left after removing `margin` (a fraction of each
    /// dimension) from every side.
    pub fn central(&self, margin: f64) -> Rect {
        let margin = margin.clamp(0.0, 0.5);
        let dx = (f64::from(self.width) * margin).round() as i32;
        let dy = (f64::from(self.height) * margin).round() as i32;
        Rect::new(self.x + dx, self.y + dy, self.width - 2 * dx, self.height - 2 * dy)
    }

    /// Splits along the x axis at `first` pixels from the left edge.
    pub fn split_horizontally(&self, first: i32) -> (Rect, Rect) {
        let first = first.clamp(0, self.width.max(0));
        (
            Rect::new(self.x, self.y, first, self.height),
            Rect::new(self.x + first, self.y, self.width - first, self.height),
        )
    }

    /// Splits along the y axis at `first` pixels from the top edge.
    pub fn split_vertically(&self, first: i32) -> (Rect, Rect) {
        let first = first.clamp(0, self.height.max(0));
        (
            Rect::new(self.x, self.y, self.width, first),
            Rect::new(self.x, self.y + first, self.width, self.height - first),
        )
    }

    /// Divides the rect into `count` strips along the x axis. The remainder
    /// pixels go to the leading strips so the strips tile the rect exactly.
    pub fn columns(&self, count: usize) -> Vec<Rect> {
        distribute(self.width, count)
            .into_iter()
            .map(|(offset, len)| Rect::new(self.x + offset, self.y, len, self.height))
            .collect()
    }

    pub fn rows(&self, count: usize) -> Vec<Rect> {
        distribute(self.height, count)
            .into_iter()
            .map(|(offset, len)| Rect::new(self.x, self.y + offset, self.width, len))
            .collect()
    }
}

fn distribute(total: i32, count: usize) -> Vec<(i32, i32)> {
    if count == 0 {
        return Vec::new();
    }
    let total = total.max(0);
    let count_i = count as i32;
    let base = total / count_i;
    let extra = total % count_i;
    let mut offset = 0;
    (0..count_i)
        .map(|i| {
            let len = base + i32::from(i < extra);
            let slot = (offset, len);
            offset += len;
            slot
        })
        .collect()
}

pub trait IsWithin {
    fn is_within(&self, how_much: i32, other: Self) -> bool;
}

impl IsWithin for i32 {
    fn is_within(&self, how_much: i32, other: Self) -> bool { (self - other).abs() <= how_much }
}

impl IsWithin for Point {
    fn is_within(&self, how_much: i32, other: Self) -> bool {
        self.x.is_within(how_much, other.x) && self.y.is_within(how_much, other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_is_half_open() {
        let rect = Rect::new(0, 0, 100, 100);
        assert!(rect.contains(Point::new(50, 50)));
        assert!(rect.contains(Point::new(0, 0)));
        assert!(!rect.contains(Point::new(100, 50)));
        assert!(!rect.contains(Point::new(50, 100)));
        assert!(!rect.contains(Point::new(-1, 50)));
    }

    #[test]
    fn test_contains_rect() {
        let rect = Rect::new(0, 0, 100, 100);
        assert!(rect.contains_rect(Rect::new(10, 10, 80, 80)));
        assert!(!rect.contains_rect(Rect::new(-10, -10, 120, 120)));
    }

    #[test]
    fn test_intersection() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersection(&b), Rect::new(50, 50, 50, 50));

        let c = Rect::new(200, 200, 10, 10);
        assert!(a.intersection(&c).is_empty());
    }

    #[test]
    fn test_central_region() {
        let rect = Rect::new(0, 0, 800, 400);
        assert_eq!(rect.central(0.25), Rect::new(200, 100, 400, 200));
        assert_eq!(rect.central(0.0), rect);
    }

    #[test]
    fn test_split_tiles_exactly() {
        let rect = Rect::new(10, 20, 301, 99);
        let (a, b) = rect.split_horizontally(150);
        assert_eq!(a.width + b.width, rect.width);
        assert_eq!(a.right(), b.x);
        let (c, d) = rect.split_vertically(500);
        assert_eq!(c, rect);
        assert_eq!(d.height, 0);
    }

    #[test]
    fn test_columns_distribute_remainder() {
        let cols = Rect::new(0, 0, 10, 5).columns(3);
        assert_eq!(
            cols,
            vec![Rect::new(0, 0, 4, 5), Rect::new(4, 0, 3, 5), Rect::new(7, 0, 3, 5)]
        );
        assert!(Rect::new(0, 0, 10, 5).rows(0).is_empty());
    }

    #[test]
    fn test_is_within_point() {
        assert!(Point::new(10, 10).is_within(2, Point::new(12, 9)));
        assert!(!Point::new(10, 10).is_within(1, Point::new(12, 9)));
    }

    #[test]
    fn test_area() {
        assert_eq!(Rect::new(0, 0, 100, 200).area(), 20000);
        assert_eq!(Rect::new(0, 0, -5, 200).area(), 0);
    }
}
