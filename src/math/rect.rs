use super::Point2d;
use crate::util::Interval;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in world coordinates.
///
/// The y-axis points down, so `top` is the smaller y value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// The horizontal extents.
    pub x: Interval<f64>,
    /// The vertical extents.
    pub y: Interval<f64>,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            x: Interval::span(left, width),
            y: Interval::span(top, height),
        }
    }

    pub fn left(&self) -> f64 {
        self.x.min
    }

    pub fn right(&self) -> f64 {
        self.x.max
    }

    pub fn top(&self) -> f64 {
        self.y.min
    }

    pub fn bottom(&self) -> f64 {
        self.y.max
    }

    pub fn width(&self) -> f64 {
        self.x.length()
    }

    pub fn height(&self) -> f64 {
        self.y.length()
    }

    /// The centre point of the rectangle.
    pub fn centre(&self) -> Point2d {
        Point2d::new(self.x.midpoint(), self.y.midpoint())
    }

    /// The four corners, clockwise on screen from the top-left.
    pub fn corners(&self) -> [Point2d; 4] {
        [
            Point2d::new(self.left(), self.top()),
            Point2d::new(self.right(), self.top()),
            Point2d::new(self.right(), self.bottom()),
            Point2d::new(self.left(), self.bottom()),
        ]
    }

    /// The four edges as pairs of corners.
    pub fn edges(&self) -> [[Point2d; 2]; 4] {
        let c = self.corners();
        [[c[0], c[1]], [c[1], c[2]], [c[2], c[3]], [c[3], c[0]]]
    }

    /// Checks whether a point lies inside the rectangle or on its boundary.
    pub fn contains(&self, point: Point2d) -> bool {
        self.x.contains(point.x) && self.y.contains(point.y)
    }

    /// Returns a copy of the rectangle moved by the given offset.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}
