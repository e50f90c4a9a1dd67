use geom::{Segment, Spline3, Vec2, Vec3};

const LENGTH_SAMPLES: usize = 32;
const INTERSECT_SAMPLES: usize = 48;

/// The path a line or a filler edge follows, parametrized by t in [0, 1].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Trajectory {
    Straight { from: Vec3, to: Vec3 },
    Bezier(Spline3),
}

impl Trajectory {
    pub fn straight(from: Vec3, to: Vec3) -> Self {
        Trajectory::Straight { from, to }
    }

    /// A curve leaving `from` along `from_dir` and arriving at `to` along `to_dir`.
    /// Collapses to a straight trajectory when both directions follow the chord.
    pub fn curve(from: Vec3, from_dir: Vec2, to: Vec3, to_dir: Vec2, smoothness: f32) -> Self {
        let chord = (to - from).xy();
        let Some((chord_dir, chord_len)) = chord.dir_dist() else {
            return Self::straight(from, to);
        };
        if from_dir.dot(chord_dir) > 0.999 && to_dir.dot(chord_dir) > 0.999 {
            return Self::straight(from, to);
        }
        let k = chord_len * smoothness;
        Trajectory::Bezier(Spline3 {
            from,
            to,
            from_derivative: (from_dir * k).z0(),
            to_derivative: (to_dir * k).z0(),
        })
    }

    pub fn start(&self) -> Vec3 {
        self.position(0.0)
    }

    pub fn end(&self) -> Vec3 {
        self.position(1.0)
    }

    pub fn is_straight(&self) -> bool {
        matches!(self, Trajectory::Straight { .. })
    }

    pub fn position(&self, t: f32) -> Vec3 {
        match *self {
            Trajectory::Straight { from, to } => from.lerp(to, t),
            Trajectory::Bezier(ref s) => s.get(t),
        }
    }

    /// Unit tangent, in the plane
    pub fn tangent(&self, t: f32) -> Vec2 {
        let d = match *self {
            Trajectory::Straight { from, to } => to - from,
            Trajectory::Bezier(ref s) => s.tangent(t),
        };
        d.xy().try_normalize().unwrap_or(Vec2::X)
    }

    /// Left hand normal at t
    pub fn normal(&self, t: f32) -> Vec2 {
        self.tangent(t).perpendicular()
    }

    /// Position moved sideways by `shift` along the normal
    pub fn shifted_position(&self, t: f32, shift: f32) -> Vec3 {
        self.position(t) + (self.normal(t) * shift).z0()
    }

    pub fn length(&self) -> f32 {
        match *self {
            Trajectory::Straight { from, to } => from.distance(to),
            Trajectory::Bezier(ref s) => s.length(LENGTH_SAMPLES),
        }
    }

    /// Arc length between t0 and t1
    pub fn length_between(&self, t0: f32, t1: f32) -> f32 {
        self.cut(t0.min(t1), t0.max(t1)).length()
    }

    /// Absolute angle in radians between the tangents at t0 and t1
    pub fn turn_between(&self, t0: f32, t1: f32) -> f32 {
        match self {
            Trajectory::Straight { .. } => 0.0,
            Trajectory::Bezier(_) => self.tangent(t0).angle(self.tangent(t1)).abs(),
        }
    }

    pub fn delta_angle(&self) -> f32 {
        self.turn_between(0.0, 1.0)
    }

    pub fn cut(&self, t0: f32, t1: f32) -> Trajectory {
        match *self {
            Trajectory::Straight { .. } => Trajectory::Straight {
                from: self.position(t0),
                to: self.position(t1),
            },
            Trajectory::Bezier(ref s) => Trajectory::Bezier(s.cut(t0, t1)),
        }
    }

    pub fn reversed(&self) -> Trajectory {
        match *self {
            Trajectory::Straight { from, to } => Trajectory::Straight { from: to, to: from },
            Trajectory::Bezier(s) => Trajectory::Bezier(geom::Spline3 {
                from: s.to,
                to: s.from,
                from_derivative: -s.to_derivative,
                to_derivative: -s.from_derivative,
            }),
        }
    }

    /// The trajectory moved sideways. Exact for straight lines, approximated on curves by
    /// moving the extremities and keeping the control offsets.
    pub fn shifted(&self, shift: f32) -> Trajectory {
        match *self {
            Trajectory::Straight { from, to } => {
                let n = self.normal(0.0) * shift;
                Trajectory::Straight {
                    from: from + n.z0(),
                    to: to + n.z0(),
                }
            }
            Trajectory::Bezier(s) => Trajectory::Bezier(Spline3 {
                from: self.shifted_position(0.0, shift),
                to: self.shifted_position(1.0, shift),
                ..s
            }),
        }
    }

    pub fn elevated(&self, z: f32) -> Trajectory {
        match *self {
            Trajectory::Straight { from, to } => Trajectory::Straight {
                from: from.up(z),
                to: to.up(z),
            },
            Trajectory::Bezier(s) => Trajectory::Bezier(Spline3 {
                from: s.from.up(z),
                to: s.to.up(z),
                ..s
            }),
        }
    }

    /// Points along the trajectory, `n` samples for curves, both ends for straight lines
    pub fn flatten(&self, n: usize) -> Vec<Vec3> {
        match *self {
            Trajectory::Straight { from, to } => vec![from, to],
            Trajectory::Bezier(ref s) => s.points(n.max(2)).collect(),
        }
    }

    /// Flattens with a sample count proportional to the length
    pub fn flatten_detail(&self, samples_per_meter: f32) -> Vec<Vec3> {
        let n = (self.length() * samples_per_meter).ceil() as usize;
        self.flatten(n.clamp(4, 64))
    }

    /// Parameter at arc distance `d` from the start, clamped to [0, 1]
    pub fn t_at_distance(&self, d: f32) -> f32 {
        match self {
            Trajectory::Straight { from, to } => {
                let l = from.distance(*to);
                if l <= 0.0 {
                    return 0.0;
                }
                (d / l).clamp(0.0, 1.0)
            }
            Trajectory::Bezier(s) => s.polyline(LENGTH_SAMPLES).param_at_length(d),
        }
    }

    /// Parameters (self t, other t) of every crossing between the two trajectories
    pub fn intersect(&self, other: &Trajectory) -> Vec<(f32, f32)> {
        let a = sample_segments(self);
        let b = sample_segments(other);
        let mut res: Vec<(f32, f32)> = vec![];
        for (sa, ta0, ta1) in &a {
            for (sb, tb0, tb1) in &b {
                let Some((u, v)) = sa.intersection_params(sb) else {
                    continue;
                };
                if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
                    continue;
                }
                let t = ta0 + (ta1 - ta0) * u;
                let s = tb0 + (tb1 - tb0) * v;
                if res.iter().any(|&(t2, _)| (t2 - t).abs() < 1e-4) {
                    continue;
                }
                res.push((t, s));
            }
        }
        res.sort_by(|x, y| x.0.total_cmp(&y.0));
        res
    }

    /// Closest parameter on the trajectory to p, by sampling
    pub fn project(&self, p: Vec3) -> f32 {
        let mut best = (f32::INFINITY, 0.0);
        for (seg, t0, t1) in sample_segments(self) {
            let q = seg.project(p.xy());
            let d = q.distance2(p.xy());
            if d < best.0 {
                let l = seg.length();
                let local = if l > 0.0 {
                    q.distance(seg.src) / l
                } else {
                    0.0
                };
                best = (d, t0 + (t1 - t0) * local);
            }
        }
        best.1
    }
}

fn sample_segments(t: &Trajectory) -> Vec<(Segment, f32, f32)> {
    let n = match t {
        Trajectory::Straight { .. } => 1,
        Trajectory::Bezier(_) => INTERSECT_SAMPLES,
    };
    (0..n)
        .map(|i| {
            let t0 = i as f32 / n as f32;
            let t1 = (i + 1) as f32 / n as f32;
            (
                Segment::new(t.position(t0).xy(), t.position(t1).xy()),
                t0,
                t1,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::{vec2, vec3};

    #[test]
    fn straight_crossing() {
        let a = Trajectory::straight(vec3(0.0, 0.0, 0.0), vec3(10.0, 0.0, 0.0));
        let b = Trajectory::straight(vec3(4.0, -5.0, 0.0), vec3(4.0, 5.0, 0.0));
        let x = a.intersect(&b);
        assert_eq!(x.len(), 1);
        assert!((x[0].0 - 0.4).abs() < 1e-4);
        assert!((x[0].1 - 0.5).abs() < 1e-4);
    }

    #[test]
    fn curve_collapses_when_aligned() {
        let t = Trajectory::curve(
            Vec3::ZERO,
            vec2(1.0, 0.0),
            vec3(10.0, 0.0, 0.0),
            vec2(1.0, 0.0),
            0.4,
        );
        assert!(t.is_straight());
        let t = Trajectory::curve(
            Vec3::ZERO,
            vec2(1.0, 0.0),
            vec3(10.0, 10.0, 0.0),
            vec2(0.0, 1.0),
            0.4,
        );
        assert!(!t.is_straight());
        assert!(t.delta_angle() > 1.5);
    }

    #[test]
    fn arc_param_is_monotonic() {
        let t = Trajectory::curve(
            Vec3::ZERO,
            vec2(1.0, 0.0),
            vec3(10.0, 10.0, 0.0),
            vec2(0.0, 1.0),
            0.4,
        );
        let l = t.length();
        let mut last = -1.0;
        for i in 0..=10 {
            let p = t.t_at_distance(l * i as f32 / 10.0);
            assert!(p > last);
            last = p;
        }
        assert_eq!(t.t_at_distance(l + 1.0), 1.0);
    }

    #[test]
    fn reversed_keeps_shape() {
        let t = Trajectory::curve(
            Vec3::ZERO,
            vec2(1.0, 0.0),
            vec3(10.0, 10.0, 0.0),
            vec2(0.0, 1.0),
            0.4,
        );
        let r = t.reversed();
        assert!(t.position(0.3).is_close(r.position(0.7), 1e-3));
    }
}
