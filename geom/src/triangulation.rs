//! Ear clipping triangulation for simple polygons.
//! Complexity is O(n²) which is plenty for polygons of a few hundred points.

use crate::{signed_area, Vec2};

const EPS: f32 = 1e-7;

/// Triangulates a simple polygon given in any winding order.
/// Returned triangles index into `points` and are always counter-clockwise.
/// Returns None if the polygon is degenerate or self-intersecting enough that no ear can be found.
pub fn triangulate(points: &[Vec2]) -> Option<Vec<[usize; 3]>> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    let mut idx: Vec<usize> = (0..n).collect();
    if signed_area(points) < 0.0 {
        idx.reverse();
    }

    let mut tris = Vec::with_capacity(n - 2);

    while idx.len() > 3 {
        let m = idx.len();

        let ear = (0..m).find(|&i| {
            let a = idx[(i + m - 1) % m];
            let b = idx[i];
            let c = idx[(i + 1) % m];
            is_ear(points, &idx, a, b, c)
        });

        match ear {
            Some(i) => {
                let a = idx[(i + m - 1) % m];
                let c = idx[(i + 1) % m];
                tris.push([a, idx[i], c]);
                idx.remove(i);
            }
            None => {
                // only flat vertices left to remove, they don't contribute any area
                let flat = (0..m).find(|&i| {
                    let a = points[idx[(i + m - 1) % m]];
                    let b = points[idx[i]];
                    let c = points[idx[(i + 1) % m]];
                    (b - a).cross(c - b).abs() <= EPS
                })?;
                idx.remove(flat);
            }
        }
    }

    let [a, b, c] = [points[idx[0]], points[idx[1]], points[idx[2]]];
    if (b - a).cross(c - b) > EPS {
        tris.push([idx[0], idx[1], idx[2]]);
    }

    Some(tris)
}

/// Sum of the triangles' area, mostly useful to check a triangulation
pub fn triangles_area(points: &[Vec2], tris: &[[usize; 3]]) -> f32 {
    tris.iter()
        .map(|&[a, b, c]| (points[b] - points[a]).cross(points[c] - points[a]).abs() * 0.5)
        .sum()
}

fn is_ear(points: &[Vec2], idx: &[usize], a: usize, b: usize, c: usize) -> bool {
    let (pa, pb, pc) = (points[a], points[b], points[c]);
    if (pb - pa).cross(pc - pb) <= EPS {
        return false;
    }

    !idx.iter().any(|&o| {
        if o == a || o == b || o == c {
            return false;
        }
        let p = points[o];
        if p.is_close(pa, 1e-6) || p.is_close(pb, 1e-6) || p.is_close(pc, 1e-6) {
            return false;
        }
        in_triangle(p, pa, pb, pc)
    })
}

fn in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).cross(p - a);
    let d2 = (c - b).cross(p - b);
    let d3 = (a - c).cross(p - c);
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{vec2, Polygon};
    use quickcheck::quickcheck;

    #[test]
    fn convex_quad_gives_two_triangles() {
        let pts = [
            vec2(0.0, 0.0),
            vec2(4.0, 0.0),
            vec2(4.0, 3.0),
            vec2(0.0, 3.0),
        ];
        let tris = triangulate(&pts).unwrap();
        assert_eq!(tris.len(), 2);
        assert!((triangles_area(&pts, &tris) - 12.0).abs() < 1e-4);
    }

    #[test]
    fn clockwise_concave() {
        // an L shape given clockwise
        let mut pts = vec![
            vec2(0.0, 0.0),
            vec2(2.0, 0.0),
            vec2(2.0, 1.0),
            vec2(1.0, 1.0),
            vec2(1.0, 2.0),
            vec2(0.0, 2.0),
        ];
        pts.reverse();
        let tris = triangulate(&pts).unwrap();
        assert_eq!(tris.len(), 4);
        assert!((triangles_area(&pts, &tris) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn collinear_points_are_skipped() {
        let pts = [
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            vec2(2.0, 0.0),
            vec2(2.0, 2.0),
            vec2(0.0, 2.0),
        ];
        let tris = triangulate(&pts).unwrap();
        assert!((triangles_area(&pts, &tris) - 4.0).abs() < 1e-4);
    }

    quickcheck! {
        fn regular_polygon_area_is_kept(n: u8, radius: u8) -> bool {
            let n = 3 + (n % 40) as usize;
            let radius = 1.0 + radius as f32;
            let pts: Vec<Vec2> = (0..n)
                .map(|i| Vec2::from_angle(i as f32 / n as f32 * std::f32::consts::TAU) * radius)
                .collect();
            let tris = triangulate(&pts).unwrap();
            let expected = Polygon::new(pts.clone()).area();
            tris.len() == n - 2 && (triangles_area(&pts, &tris) - expected).abs() < expected * 1e-3
        }
    }
}
