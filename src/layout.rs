//! Layout primitives - points, vectors, sizes and rectangles in host units
//!
//! Host units are whatever the host measures its viewport in: points on a
//! touch screen, character cells in a terminal.

use std::ops::{Add, Mul, Sub};

/// A position in a 2D coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    /// Vector from `other` to `self`
    pub fn offset_from(&self, other: Point) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }

    /// Linear interpolation towards `to` (t in 0..=1)
    pub fn lerp(&self, to: Point, t: f32) -> Point {
        if t >= 1.0 {
            return to;
        }
        Point::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub<Vector> for Point {
    type Output = Point;

    fn sub(self, rhs: Vector) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A displacement in a 2D coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Vector { x, y }
    }

    /// Length of the vector
    pub fn length(&self) -> f32 {
        self.x.hypot(self.y)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f32) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

/// Width and height
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Size { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Scale both dimensions
    pub fn scaled(&self, factor: f32) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }

    /// Largest size with this aspect ratio that fits inside `bounds`
    pub fn fit_within(&self, bounds: Size) -> Size {
        if self.is_empty() || bounds.is_empty() {
            return Size::default();
        }
        let factor = (bounds.width / self.width).min(bounds.height / self.height);
        self.scaled(factor)
    }
}

/// Rectangle with origin at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole viewport of the given size
    pub fn fullscreen(size: Size) -> Self {
        Rect::new(0.0, 0.0, size.width, size.height)
    }

    /// Rectangle of the given size centered on `center`
    pub fn centered(center: Point, size: Size) -> Self {
        Rect::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if point is inside rectangle
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Same rectangle moved so its center lands on `center`
    pub fn with_center(&self, center: Point) -> Self {
        Rect::centered(center, self.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_creation() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(15.0, 15.0)));
        assert!(r.contains(Point::new(10.0, 10.0))); // edge
        assert!(!r.contains(Point::new(30.0, 30.0))); // outside
        assert!(!r.contains(Point::new(5.0, 15.0)));
    }

    #[test]
    fn test_centered_round_trips_center() {
        let r = Rect::centered(Point::new(50.0, 40.0), Size::new(20.0, 10.0));
        assert_eq!(r.origin(), Point::new(40.0, 35.0));
        assert_eq!(r.center(), Point::new(50.0, 40.0));
    }

    #[test]
    fn test_point_vector_arithmetic() {
        let p = Point::new(1.0, 2.0) + Vector::new(3.0, -4.0);
        assert_eq!(p, Point::new(4.0, -2.0));
        assert_eq!(p.offset_from(Point::new(1.0, 2.0)), Vector::new(3.0, -4.0));
        assert_eq!(Vector::new(3.0, 4.0).length(), 5.0);
    }

    #[test]
    fn test_fit_within_keeps_aspect() {
        let fitted = Size::new(400.0, 200.0).fit_within(Size::new(100.0, 100.0));
        assert_eq!(fitted, Size::new(100.0, 50.0));
        assert_eq!(Size::new(0.0, 10.0).fit_within(Size::new(5.0, 5.0)), Size::default());
    }
}
