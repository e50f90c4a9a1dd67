use crate::segment::Segment;
use crate::{minmax, Vec2};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A closed polygon, the last point connects back to the first one
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Polygon(pub Vec<Vec2>);

impl Polygon {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let nvert = self.0.len();
        if nvert < 3 {
            return false;
        }

        let mut j = nvert - 1;
        let mut c = false;

        for i in 0..nvert {
            let verti = self.0[i];
            let vertj = self.0[j];
            let off = vertj - verti;

            let vip = p - verti;
            let vjp = p - vertj;

            if ((vip.y < 0.0) != (vjp.y < 0.0))
                && (vip.x * off.y.abs() < off.x * vip.y * off.y.signum())
            {
                c = !c;
            }
            j = i;
        }
        c
    }

    /// Positive when counter-clockwise
    pub fn signed_area(&self) -> f32 {
        signed_area(&self.0)
    }

    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = self.0.len();
        (0..n).map(move |i| Segment::new(self.0[i], self.0[(i + 1) % n]))
    }

    /// A polygon is simple when it has at least 3 distinct points,
    /// a non-zero area and no two non-adjacent edges touch.
    pub fn is_simple(&self) -> bool {
        let n = self.0.len();
        if n < 3 {
            return false;
        }
        if self.area() < 1e-6 {
            return false;
        }
        for i in 0..n {
            if self.0[i].is_close(self.0[(i + 1) % n], 1e-5) {
                return false;
            }
        }

        let segs: Vec<Segment> = self.segments().collect();
        for i in 0..n {
            for j in i + 1..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if adjacent {
                    continue;
                }
                if segs[i].intersection_params(&segs[j]).is_some() {
                    return false;
                }
            }
        }
        true
    }

    pub fn barycenter(&self) -> Vec2 {
        self.0.iter().sum::<Vec2>() / (self.0.len() as f32)
    }

    pub fn project(&self, p: Vec2) -> Option<Vec2> {
        self.segments()
            .map(|s| s.project(p))
            .min_by_key(|&proj| OrderedFloat(proj.distance2(p)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Vec2] {
        self.0.as_slice()
    }
}

pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut s = 0.0;
    for i in 0..n {
        s += points[i].cross(points[(i + 1) % n]);
    }
    s * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec2;

    #[test]
    fn square_area() {
        let p = Polygon::new(vec![
            vec2(0.0, 0.0),
            vec2(2.0, 0.0),
            vec2(2.0, 2.0),
            vec2(0.0, 2.0),
        ]);
        assert!((p.signed_area() - 4.0).abs() < 1e-5);
        assert!(p.is_simple());
        assert!(p.contains(vec2(1.0, 1.0)));
        assert!(!p.contains(vec2(3.0, 1.0)));
    }

    #[test]
    fn bowtie_is_not_simple() {
        let p = Polygon::new(vec![
            vec2(0.0, 0.0),
            vec2(2.0, 2.0),
            vec2(2.0, 0.0),
            vec2(0.0, 2.0),
        ]);
        assert!(!p.is_simple());
    }

    #[test]
    fn two_points_is_not_simple() {
        let p = Polygon::new(vec![vec2(0.0, 0.0), vec2(2.0, 2.0)]);
        assert!(!p.is_simple());
    }
}
