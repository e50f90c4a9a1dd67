use super::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub src: Vec2,
    pub dst: Vec2,
}

impl Segment {
    pub fn new(src: Vec2, dst: Vec2) -> Self {
        Self { src, dst }
    }

    #[inline]
    pub fn vec(&self) -> Vec2 {
        self.dst - self.src
    }

    pub fn length(&self) -> f32 {
        self.vec().mag()
    }

    pub fn project(&self, p: Vec2) -> Vec2 {
        let diff: Vec2 = self.vec();
        let proj1 = (p - self.src).dot(diff);
        let proj2 = -(p - self.dst).dot(diff);

        if proj1 <= 0.0 {
            self.src
        } else if proj2 <= 0.0 {
            self.dst
        } else {
            self.src + diff * (proj1 / diff.mag2())
        }
    }

    /// Returns the parameters (t along self, u along other) of the intersection, both in [0, 1].
    /// Parallel segments never intersect.
    pub fn intersection_params(&self, other: &Segment) -> Option<(f32, f32)> {
        // see https://stackoverflow.com/a/565282
        let r = self.vec();
        let s = other.vec();

        let r_cross_s = r.cross(s);
        if r_cross_s.abs() < 1e-9 {
            return None;
        }
        let q_minus_p = other.src - self.src;

        let t = q_minus_p.cross(s) / r_cross_s;
        let u = q_minus_p.cross(r) / r_cross_s;

        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            return Some((t, u));
        }
        None
    }

    /// Same as intersection_params but touching at an extremity does not count
    pub fn intersects_strictly(&self, other: &Segment, eps: f32) -> bool {
        match self.intersection_params(other) {
            Some((t, u)) => t > eps && t < 1.0 - eps && u > eps && u < 1.0 - eps,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec2;

    #[test]
    fn crossing_segments() {
        let a = Segment::new(vec2(0.0, 0.0), vec2(10.0, 0.0));
        let b = Segment::new(vec2(5.0, -5.0), vec2(5.0, 5.0));
        let (t, u) = a.intersection_params(&b).unwrap();
        assert!((t - 0.5).abs() < 1e-5);
        assert!((u - 0.5).abs() < 1e-5);
        assert!(a.intersects_strictly(&b, 1e-4));
    }

    #[test]
    fn touching_is_not_strict() {
        let a = Segment::new(vec2(0.0, 0.0), vec2(10.0, 0.0));
        let b = Segment::new(vec2(10.0, 0.0), vec2(10.0, 5.0));
        assert!(a.intersection_params(&b).is_some());
        assert!(!a.intersects_strictly(&b, 1e-4));
    }
}
