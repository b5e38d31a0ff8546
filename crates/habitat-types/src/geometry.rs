//! Planar value types: points, vectors, and axis-aligned rectangles.
//!
//! The world is a continuous 2D plane measured in world units. Obstacles
//! occupy axis-aligned rectangles anchored at their minimum corner; signals
//! and creatures occupy single points.

use core::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A point or displacement in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a vector from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Squared Euclidean distance to `other`.
    pub fn distance_squared(self, other: Self) -> f64 {
        let d = other - self;
        d.x.mul_add(d.x, d.y * d.y)
    }

    /// Unit vector in the same direction, or [`Vec2::ZERO`] for a
    /// zero-length (or non-finite) vector.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > f64::EPSILON && len.is_finite() {
            Self::new(self.x / len, self.y / len)
        } else {
            Self::ZERO
        }
    }

    /// 2D cross product (z component of the 3D cross product).
    pub fn cross(self, other: Self) -> f64 {
        self.x.mul_add(other.y, -(self.y * other.x))
    }

    /// Whether both components are finite.
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// An axis-aligned rectangle given by its minimum corner and its size.
///
/// Negative dimensions are folded into the anchor by [`Rect::new`], so the
/// stored `size` is always non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum (lowest x, lowest y) corner.
    pub position: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Rect {
    /// Create a rectangle from its anchor corner and dimensions.
    pub fn new(position: Vec2, size: Vec2) -> Self {
        let (x, w) = if size.x < 0.0 {
            (position.x + size.x, -size.x)
        } else {
            (position.x, size.x)
        };
        let (y, h) = if size.y < 0.0 {
            (position.y + size.y, -size.y)
        } else {
            (position.y, size.y)
        };
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Create a rectangle of the given size centred on `center`.
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size * 0.5, size)
    }

    /// Minimum corner.
    pub const fn min(&self) -> Vec2 {
        self.position
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    /// Geometric centre.
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Whether `point` lies inside or on the boundary.
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.position.x && point.x <= max.x && point.y >= self.position.y && point.y <= max.y
    }

    /// The point of the rectangle closest to `point`.
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        let max = self.max();
        Vec2::new(
            point.x.clamp(self.position.x, max.x),
            point.y.clamp(self.position.y, max.y),
        )
    }

    /// Distance from `point` to the rectangle (zero when inside).
    pub fn distance_to(&self, point: Vec2) -> f64 {
        self.closest_point(point).distance(point)
    }

    /// The four corners in counter-clockwise order starting at the minimum.
    pub fn corners(&self) -> [Vec2; 4] {
        let max = self.max();
        [
            self.position,
            Vec2::new(max.x, self.position.y),
            max,
            Vec2::new(self.position.x, max.y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn distance_is_euclidean() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < EPS);
        assert!((a.distance_squared(b) - 25.0).abs() < EPS);
    }

    #[test]
    fn normalizing_zero_vector_yields_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        let unit = Vec2::new(0.0, 2.0).normalized();
        assert!((unit.y - 1.0).abs() < EPS);
    }

    #[test]
    fn negative_dimensions_are_folded() {
        let rect = Rect::new(Vec2::new(5.0, 5.0), Vec2::new(-2.0, -4.0));
        assert_eq!(rect.position, Vec2::new(3.0, 1.0));
        assert_eq!(rect.size, Vec2::new(2.0, 4.0));
    }

    #[test]
    fn contains_includes_boundary() {
        let rect = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
        assert!(rect.contains(Vec2::new(0.0, 0.0)));
        assert!(rect.contains(Vec2::new(2.0, 1.0)));
        assert!(!rect.contains(Vec2::new(2.1, 1.0)));
    }

    #[test]
    fn distance_to_rect_is_zero_inside() {
        let rect = Rect::centered(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
        assert!(rect.distance_to(Vec2::new(0.5, 0.5)).abs() < EPS);
        assert!((rect.distance_to(Vec2::new(4.0, 0.0)) - 3.0).abs() < EPS);
    }
}
