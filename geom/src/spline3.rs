use super::Vec3;
use crate::PolyLine3;
use serde::{Deserialize, Serialize};

/// A cubic bezier curve described by its extremities and the offsets to its control points.
/// The control points are `from + from_derivative` and `to - to_derivative`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Spline3 {
    pub from: Vec3,
    pub to: Vec3,
    pub from_derivative: Vec3,
    pub to_derivative: Vec3,
}

impl Spline3 {
    pub fn get(&self, t: f32) -> Vec3 {
        let u = 1.0 - t;
        u * u * u * self.from
            + 3.0 * t * u * u * (self.from + self.from_derivative)
            + 3.0 * t * t * u * (self.to - self.to_derivative)
            + t * t * t * self.to
    }

    pub fn derivative(&self, t: f32) -> Vec3 {
        let p0 = self.from;
        let p1 = self.from + self.from_derivative;
        let p2 = self.to - self.to_derivative;
        let p3 = self.to;
        let u = 1.0 - t;
        3.0 * u * u * (p1 - p0) + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (p3 - p2)
    }

    /// Unit tangent at t, falls back to the chord direction on degenerate control points
    pub fn tangent(&self, t: f32) -> Vec3 {
        self.derivative(t)
            .try_normalize()
            .or_else(|| (self.to - self.from).try_normalize())
            .unwrap_or(Vec3::X)
    }

    /// De Casteljau subdivision
    pub fn split_at(&self, t: f32) -> (Spline3, Spline3) {
        let p0 = self.from;
        let p1 = self.from + self.from_derivative;
        let p2 = self.to - self.to_derivative;
        let p3 = self.to;

        let a = p0.lerp(p1, t);
        let b = p1.lerp(p2, t);
        let c = p2.lerp(p3, t);
        let d = a.lerp(b, t);
        let e = b.lerp(c, t);
        let mid = d.lerp(e, t);

        (
            Spline3 {
                from: p0,
                to: mid,
                from_derivative: a - p0,
                to_derivative: mid - d,
            },
            Spline3 {
                from: mid,
                to: p3,
                from_derivative: e - mid,
                to_derivative: p3 - c,
            },
        )
    }

    /// Returns the part of the curve between t0 and t1
    pub fn cut(&self, t0: f32, t1: f32) -> Spline3 {
        if t1 <= t0 {
            let p = self.get(t0);
            return Spline3 {
                from: p,
                to: p,
                ..Default::default()
            };
        }
        let (_, right) = self.split_at(t0);
        if t0 >= 1.0 {
            return right;
        }
        let (mid, _) = right.split_at((t1 - t0) / (1.0 - t0));
        mid
    }

    pub fn points(&self, n: usize) -> impl Iterator<Item = Vec3> + '_ {
        let n = n.max(2);
        (0..n).map(move |i| self.get(i as f32 / (n - 1) as f32))
    }

    pub fn polyline(&self, n: usize) -> PolyLine3 {
        PolyLine3::new(self.points(n).collect())
    }

    pub fn length(&self, n: usize) -> f32 {
        self.polyline(n).length()
    }

    /// Approximates the control polygon's turning to decide how straight the curve is.
    /// Returns the angle in radians between the start and end tangents.
    pub fn turn_angle(&self) -> f32 {
        let a = self.tangent(0.0).xy();
        let b = self.tangent(1.0).xy();
        a.angle(b).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    fn curve() -> Spline3 {
        Spline3 {
            from: vec3(0.0, 0.0, 0.0),
            to: vec3(10.0, 10.0, 0.0),
            from_derivative: vec3(5.0, 0.0, 0.0),
            to_derivative: vec3(0.0, 5.0, 0.0),
        }
    }

    #[test]
    fn split_keeps_points() {
        let s = curve();
        let (a, b) = s.split_at(0.3);
        assert!(a.to.is_close(s.get(0.3), 1e-4));
        assert!(a.get(0.5).is_close(s.get(0.15), 1e-4));
        assert!(b.get(0.5).is_close(s.get(0.65), 1e-4));
    }

    #[test]
    fn cut_middle() {
        let s = curve();
        let c = s.cut(0.25, 0.75);
        assert!(c.from.is_close(s.get(0.25), 1e-4));
        assert!(c.to.is_close(s.get(0.75), 1e-4));
        assert!(c.get(0.5).is_close(s.get(0.5), 1e-4));
    }

    #[test]
    fn quarter_turn() {
        assert!((curve().turn_angle() - std::f32::consts::FRAC_PI_2).abs() < 1e-3);
    }
}
