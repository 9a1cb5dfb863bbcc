//! Point containment tests for boundary rings.
//!
//! Ray casting with an inclusive on-segment check: a point on a polygon's
//! outer ring counts as contained, so a vendor sitting exactly on a shared
//! administrative edge still resolves (the index tie-break picks the winner).
//! Interior rings are holes and exclude, their edges included.

use geo::{Coord, LineString, MultiPolygon, Polygon};

const EDGE_EPSILON: f64 = 1e-9;

/// True if `p` lies on the segment `a`-`b` within a small tolerance.
pub fn point_on_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> bool {
    let cross = (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x);
    if cross.abs() > EDGE_EPSILON {
        return false;
    }
    let dot = (p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y);
    if dot < 0.0 {
        return false;
    }
    let squared_len = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    dot <= squared_len
}

/// Ray-cast containment against a single ring. Points on the ring itself
/// count as inside. Works for both closed and unclosed rings.
pub fn ring_contains(ring: &LineString<f64>, p: Coord<f64>) -> bool {
    let points = &ring.0;
    if points.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        if point_on_segment(p, a, b) {
            return true;
        }
        let crosses = (a.y > p.y) != (b.y > p.y);
        if crosses {
            let x_at_y = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_at_y {
                inside = !inside;
            }
        }
    }
    inside
}

/// Containment against one polygon: outer ring inclusive, holes exclusive.
pub fn polygon_contains(polygon: &Polygon<f64>, p: Coord<f64>) -> bool {
    if !ring_contains(polygon.exterior(), p) {
        return false;
    }
    !polygon.interiors().iter().any(|hole| ring_contains(hole, p))
}

/// Containment against any polygon of a multi-polygon geometry.
pub fn multi_polygon_contains(geometry: &MultiPolygon<f64>, p: Coord<f64>) -> bool {
    geometry.0.iter().any(|polygon| polygon_contains(polygon, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        )
    }

    fn square_with_hole() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]),
            vec![LineString::from(vec![
                (1.0, 1.0),
                (3.0, 1.0),
                (3.0, 3.0),
                (1.0, 3.0),
                (1.0, 1.0),
            ])],
        )
    }

    #[test]
    fn test_interior_point_is_contained() {
        assert!(polygon_contains(&unit_square(), Coord { x: 0.5, y: 0.5 }));
    }

    #[test]
    fn test_exterior_point_is_not_contained() {
        assert!(!polygon_contains(&unit_square(), Coord { x: 1.5, y: 0.5 }));
        assert!(!polygon_contains(&unit_square(), Coord { x: -0.1, y: 0.5 }));
    }

    #[test]
    fn test_edge_and_vertex_points_are_contained() {
        assert!(polygon_contains(&unit_square(), Coord { x: 1.0, y: 0.5 }));
        assert!(polygon_contains(&unit_square(), Coord { x: 0.0, y: 0.0 }));
        assert!(polygon_contains(&unit_square(), Coord { x: 0.5, y: 1.0 }));
    }

    #[test]
    fn test_hole_excludes_point() {
        let polygon = square_with_hole();
        assert!(polygon_contains(&polygon, Coord { x: 0.5, y: 0.5 }));
        assert!(!polygon_contains(&polygon, Coord { x: 2.0, y: 2.0 }));
        // The hole's edge is part of the exclusion.
        assert!(!polygon_contains(&polygon, Coord { x: 1.0, y: 2.0 }));
    }

    #[test]
    fn test_degenerate_ring_contains_nothing() {
        let line = LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]);
        assert!(!ring_contains(&line, Coord { x: 0.5, y: 0.5 }));
    }

    #[test]
    fn test_multi_polygon_checks_every_part() {
        let other = Polygon::new(
            LineString::from(vec![(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 6.0), (5.0, 5.0)]),
            vec![],
        );
        let multi = MultiPolygon::new(vec![unit_square(), other]);
        assert!(multi_polygon_contains(&multi, Coord { x: 5.5, y: 5.5 }));
        assert!(multi_polygon_contains(&multi, Coord { x: 0.5, y: 0.5 }));
        assert!(!multi_polygon_contains(&multi, Coord { x: 2.0, y: 2.0 }));
    }
}
