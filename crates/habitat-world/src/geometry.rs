//! Intersection tests between segments, points, and rectangles.
//!
//! All tests are inclusive: touching counts as intersecting. Zero-length
//! segments degrade to point-in-rectangle checks instead of dividing by
//! their length.

use habitat_types::{Rect, Vec2};

/// Tolerance for collinearity and degenerate-length checks.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

/// Orientation of `c` relative to the directed line `a -> b`:
/// positive for counter-clockwise, negative for clockwise, zero when
/// collinear (within [`GEOMETRY_EPSILON`]).
fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    let value = (b - a).cross(c - a);
    if value.abs() <= GEOMETRY_EPSILON {
        0.0
    } else {
        value
    }
}

/// Whether collinear point `p` lies within the bounding box of `a`..`b`.
fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x <= a.x.max(b.x) + GEOMETRY_EPSILON
        && p.x >= a.x.min(b.x) - GEOMETRY_EPSILON
        && p.y <= a.y.max(b.y) + GEOMETRY_EPSILON
        && p.y >= a.y.min(b.y) - GEOMETRY_EPSILON
}

/// Whether segments `p1..p2` and `q1..q2` share at least one point.
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    let straddles = |a: f64, b: f64| (a > 0.0 && b < 0.0) || (a < 0.0 && b > 0.0);
    if straddles(o1, o2) && straddles(o3, o4) {
        return true;
    }

    (o1 == 0.0 && on_segment(p1, p2, q1))
        || (o2 == 0.0 && on_segment(p1, p2, q2))
        || (o3 == 0.0 && on_segment(q1, q2, p1))
        || (o4 == 0.0 && on_segment(q1, q2, p2))
}

/// Whether the segment `start..end` touches `rect`.
///
/// A segment with either endpoint inside the rectangle intersects it; this
/// also covers zero-length segments. Otherwise the segment is tested
/// against each of the four edges.
pub fn segment_intersects_rect(start: Vec2, end: Vec2, rect: &Rect) -> bool {
    if rect.contains(start) || rect.contains(end) {
        return true;
    }
    if start.distance_squared(end) <= GEOMETRY_EPSILON * GEOMETRY_EPSILON {
        return false;
    }
    let [a, b, c, d] = rect.corners();
    segments_intersect(start, end, a, b)
        || segments_intersect(start, end, b, c)
        || segments_intersect(start, end, c, d)
        || segments_intersect(start, end, d, a)
}

/// Distance from `point` to the segment `start..end`.
pub fn point_segment_distance(point: Vec2, start: Vec2, end: Vec2) -> f64 {
    let seg = end - start;
    let len_sq = seg.x.mul_add(seg.x, seg.y * seg.y);
    if len_sq <= GEOMETRY_EPSILON * GEOMETRY_EPSILON {
        return point.distance(start);
    }
    let rel = point - start;
    let t = (rel.x.mul_add(seg.x, rel.y * seg.y) / len_sq).clamp(0.0, 1.0);
    point.distance(start + seg * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box_at(x: f64, y: f64) -> Rect {
        Rect::new(Vec2::new(x, y), Vec2::new(1.0, 1.0))
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(2.0, 0.0),
        ));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(2.0, 1.0),
        ));
    }

    #[test]
    fn collinear_overlap_intersects() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(3.0, 0.0),
        ));
    }

    #[test]
    fn segment_through_rect_intersects() {
        let rect = unit_box_at(4.0, -0.5);
        assert!(segment_intersects_rect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            &rect
        ));
    }

    #[test]
    fn segment_beside_rect_misses() {
        let rect = unit_box_at(4.0, 2.0);
        assert!(!segment_intersects_rect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            &rect
        ));
    }

    #[test]
    fn zero_length_segment_inside_rect_intersects() {
        let rect = unit_box_at(0.0, 0.0);
        let p = Vec2::new(0.5, 0.5);
        assert!(segment_intersects_rect(p, p, &rect));
        let q = Vec2::new(5.0, 5.0);
        assert!(!segment_intersects_rect(q, q, &rect));
    }

    #[test]
    fn point_segment_distance_handles_degenerate_segment() {
        let d = point_segment_distance(Vec2::new(3.0, 4.0), Vec2::ZERO, Vec2::ZERO);
        assert!((d - 5.0).abs() < 1e-12);
        let d = point_segment_distance(Vec2::new(1.0, 1.0), Vec2::ZERO, Vec2::new(2.0, 0.0));
        assert!((d - 1.0).abs() < 1e-12);
    }
}
