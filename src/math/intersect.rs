//! Intersection tests between segments, rectangles and polygons.

use super::{Point2d, Rect};
use itertools::iproduct;

/// Whether the points `a`, `b`, `c` are in strictly counter-clockwise order
/// (in a y-up frame).
fn ccw(a: Point2d, b: Point2d, c: Point2d) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Checks whether two line segments cross.
///
/// Collinear overlapping segments are reported as not intersecting.
pub fn segments_intersect(p1: Point2d, p2: Point2d, q1: Point2d, q2: Point2d) -> bool {
    ccw(p1, q1, q2) != ccw(p2, q1, q2) && ccw(p1, p2, q1) != ccw(p1, p2, q2)
}

/// Checks whether a line segment touches a rectangle, either by having an
/// end point inside it or by crossing one of its edges.
pub fn segment_intersects_rect(start: Point2d, end: Point2d, rect: &Rect) -> bool {
    if rect.contains(start) || rect.contains(end) {
        return true;
    }
    rect.edges()
        .iter()
        .any(|[a, b]| segments_intersect(start, end, *a, *b))
}

/// Checks whether a point lies inside a polygon, by casting a ray towards +x
/// and counting edge crossings.
pub fn point_in_polygon(point: Point2d, polygon: &[Point2d]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    for i in 0..n {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % n];
        let (lo, hi) = (f64::min(p1.y, p2.y), f64::max(p1.y, p2.y));
        if point.y > lo && point.y <= hi && point.x <= f64::max(p1.x, p2.x) {
            // A horizontal edge cannot pass the `y` test above, so `p1.y != p2.y` here
            let x_cross = (point.y - p1.y) * (p2.x - p1.x) / (p2.y - p1.y) + p1.x;
            if p1.x == p2.x || point.x <= x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

/// Checks whether two quadrilaterals overlap.
///
/// Any pair of crossing edges is a hit. Full containment, where no edges
/// cross, is caught by testing the first corner of each shape against the other.
pub fn polygons_collide(a: &[Point2d; 4], b: &[Point2d; 4]) -> bool {
    let edges = |p: &[Point2d; 4]| [0, 1, 2, 3].map(|i| (p[i], p[(i + 1) % 4]));
    let crossing = iproduct!(edges(a), edges(b))
        .any(|((a1, a2), (b1, b2))| segments_intersect(a1, a2, b1, b2));
    crossing || point_in_polygon(a[0], b) || point_in_polygon(b[0], a)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::rotate;
    use rand::{Rng, SeedableRng};

    fn p(x: f64, y: f64) -> Point2d {
        Point2d::new(x, y)
    }

    #[test]
    fn crossing_segments() {
        assert!(segments_intersect(p(0., 0.), p(10., 10.), p(0., 10.), p(10., 0.)));
        assert!(!segments_intersect(p(0., 0.), p(10., 0.), p(0., 5.), p(10., 5.)));
        assert!(!segments_intersect(p(0., 0.), p(4., 4.), p(5., 5.), p(10., 0.)));
        // Collinear overlap is deliberately not an intersection
        assert!(!segments_intersect(p(0., 0.), p(10., 0.), p(5., 0.), p(15., 0.)));
    }

    #[test]
    fn segment_against_rect() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(segment_intersects_rect(p(0., 20.), p(40., 20.), &rect));
        assert!(segment_intersects_rect(p(15., 15.), p(100., 100.), &rect));
        assert!(!segment_intersects_rect(p(0., 0.), p(40., 0.), &rect));
    }

    #[test]
    fn ray_casting() {
        let square = Rect::new(0.0, 0.0, 10.0, 10.0).corners();
        assert!(point_in_polygon(p(5., 5.), &square));
        assert!(!point_in_polygon(p(15., 5.), &square));
        assert!(!point_in_polygon(p(5., -1.), &square));

        let diamond = [p(5., 0.), p(10., 5.), p(5., 10.), p(0., 5.)];
        assert!(point_in_polygon(p(5., 5.), &diamond));
        assert!(!point_in_polygon(p(1., 1.), &diamond));
    }

    #[test]
    fn containment_without_crossing() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0).corners();
        let inner = Rect::new(40.0, 40.0, 10.0, 10.0).corners();
        assert!(polygons_collide(&outer, &inner));
        assert!(polygons_collide(&inner, &outer));

        let apart = Rect::new(200.0, 0.0, 10.0, 10.0).corners();
        assert!(!polygons_collide(&outer, &apart));
    }

    #[test]
    fn collision_is_symmetric() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut hits = 0;
        for _ in 0..500 {
            let mut shape = || {
                let centre = p(rng.gen_range(0.0..200.0), rng.gen_range(0.0..200.0));
                let (w, h) = (rng.gen_range(5.0..80.0), rng.gen_range(5.0..80.0));
                let angle = rng.gen_range(0.0..360.0);
                Rect::new(centre.x - 0.5 * w, centre.y - 0.5 * h, w, h)
                    .corners()
                    .map(|c| rotate(c, centre, angle))
            };
            let a = shape();
            let b = shape();
            let ab = polygons_collide(&a, &b);
            assert_eq!(ab, polygons_collide(&b, &a));
            hits += ab as usize;
        }
        // Make sure both outcomes were exercised
        assert!(hits > 0 && hits < 500);
    }
}
