mod color;
mod polygon;
mod polyline3;
mod segment;
mod spline3;
mod triangulation;
mod v2;
mod v3;

pub use color::*;
pub use polygon::*;
pub use polyline3::*;
pub use segment::*;
pub use spline3::*;
pub use triangulation::*;
pub use v2::*;
pub use v3::*;

pub fn minmax(x: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let mut min: Vec2 = *x.first()?;
    let mut max: Vec2 = min;

    for &v in &x[1..] {
        min = min.min(v);
        max = max.max(v);
    }

    Some((min, max))
}

/// Monotonic in the real angle of `v`, cheaper than atan2.
/// Used to sort directions around a point.
pub fn pseudo_angle(v: Vec2) -> f32 {
    let dx = v.x;
    let dy = v.y;
    let p = dx / (dx.abs() + dy.abs());

    if dy < 0.0 {
        p - 1.0
    } else {
        1.0 - p
    }
}

/// Smallest power of two >= x, clamped to [min, max]
pub fn next_pow2_clamped(x: u32, min: u32, max: u32) -> u32 {
    x.max(1).next_power_of_two().clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pseudo_angle_is_monotonic() {
        let dirs = [
            vec2(1.0, 0.0),
            vec2(0.0, 1.0),
            vec2(-1.0, 0.0),
            vec2(0.0, -1.0),
        ];
        let angles: Vec<f32> = dirs.iter().map(|&d| pseudo_angle(d)).collect();
        assert!(angles[0] < angles[1]);
        assert!(angles[1] < angles[2]);
        assert!(angles[3] < angles[0]);
    }

    #[test]
    fn pow2() {
        assert_eq!(next_pow2_clamped(1, 32, 1024), 32);
        assert_eq!(next_pow2_clamped(33, 32, 1024), 64);
        assert_eq!(next_pow2_clamped(64, 32, 1024), 64);
        assert_eq!(next_pow2_clamped(5000, 32, 1024), 1024);
    }
}
