use crate::render::{DashMaterial, DashPart, LodLevel, LodPrimitive, Primitive};
use crate::{RenderConfig, Trajectory};
use geom::{Color, Vec3};

const MAX_DEPTH: u32 = 10;

/// Subdivision limits of curved parts
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolidParams {
    /// Radians
    pub min_angle: f32,
    pub min_length: f32,
    pub max_length: f32,
}

impl SolidParams {
    pub fn lod0(c: &RenderConfig) -> Self {
        Self {
            min_angle: c.min_angle.to_radians(),
            min_length: c.min_length,
            max_length: c.max_length,
        }
    }

    pub fn lod1(c: &RenderConfig) -> Self {
        Self {
            min_angle: c.lod1_min_angle.to_radians(),
            min_length: c.min_length,
            max_length: c.lod1_max_length,
        }
    }
}

/// How a dash looks, independently of where it is
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DashLook {
    pub width: f32,
    pub color: Color,
    /// Sideways offset from the trajectory, positive to the left
    pub shift: f32,
    pub material: DashMaterial,
}

impl DashLook {
    pub fn new(width: f32, color: Color) -> Self {
        Self {
            width,
            color,
            shift: 0.0,
            material: DashMaterial::Rectangle,
        }
    }

    pub fn shifted(self, shift: f32) -> Self {
        Self { shift, ..self }
    }
}

/// Dash intervals as distances from the start of a range of `length`.
/// There are floor(length / (dash + space)) dashes, the pattern is centered on the range.
/// A range shorter than one period still gets a single dash if it fits.
pub fn dashed_parts(length: f32, dash: f32, space: f32) -> Vec<(f32, f32)> {
    if dash <= 0.0 || length < dash {
        return vec![];
    }
    let period = dash + space.max(0.0);
    let count = ((length / period) as usize).max(1);
    let total = count as f32 * period - space.max(0.0);
    let start = (length - total).max(0.0) * 0.5;
    (0..count)
        .map(|i| {
            let a = start + i as f32 * period;
            (a, a + dash)
        })
        .collect()
}

/// Splits [t0, t1] until every part turns less than `min_angle` and is no longer than
/// `max_length`. Parts are never made shorter than `min_length`.
pub fn calculate_solid(traj: &Trajectory, t0: f32, t1: f32, params: &SolidParams) -> Vec<(f32, f32)> {
    let mut out = vec![];
    if traj.is_straight() {
        out.push((t0, t1));
        return out;
    }
    solid_rec(traj, t0, t1, params, 0, &mut out);
    out
}

fn solid_rec(
    traj: &Trajectory,
    t0: f32,
    t1: f32,
    params: &SolidParams,
    depth: u32,
    out: &mut Vec<(f32, f32)>,
) {
    let len = traj.length_between(t0, t1);
    let turn = traj.turn_between(t0, t1);
    let split = depth < MAX_DEPTH
        && len >= 2.0 * params.min_length
        && (turn > params.min_angle || len > params.max_length);
    if !split {
        out.push((t0, t1));
        return;
    }
    let mid = (t0 + t1) * 0.5;
    solid_rec(traj, t0, mid, params, depth + 1, out);
    solid_rec(traj, mid, t1, params, depth + 1, out);
}

/// A flat dash from `a` to `b`, None if they are the same point
pub fn dash_between(a: Vec3, b: Vec3, look: &DashLook) -> Option<DashPart> {
    let (dir, length) = (b - a).xy().dir_dist()?;
    Some(DashPart {
        pos: (a + b) * 0.5,
        dir,
        length,
        width: look.width,
        color: look.color,
        material: look.material,
    })
}

fn part(traj: &Trajectory, t0: f32, t1: f32, look: &DashLook, lift: f32) -> Option<Primitive> {
    let a = traj.shifted_position(t0, look.shift).up(lift);
    let b = traj.shifted_position(t1, look.shift).up(lift);
    dash_between(a, b, look).map(Primitive::Dash)
}

/// Parts covering [t0, t1]: a single decal when it is straight enough,
/// otherwise a finer set for LOD0 and a coarser one for LOD1.
pub fn solid_between(
    traj: &Trajectory,
    t0: f32,
    t1: f32,
    look: &DashLook,
    config: &RenderConfig,
    out: &mut Vec<LodPrimitive>,
) {
    let lift = config.elevation_offset;
    let p0 = SolidParams::lod0(config);
    if traj.is_straight() || traj.turn_between(t0, t1) <= p0.min_angle {
        if let Some(p) = part(traj, t0, t1, look, lift) {
            out.push(LodPrimitive::no_lod(p));
        }
        return;
    }
    for (level, params) in [
        (LodLevel::Lod0, p0),
        (LodLevel::Lod1, SolidParams::lod1(config)),
    ] {
        for (a, b) in calculate_solid(traj, t0, t1, &params) {
            let p = unwrap_cont!(part(traj, a, b, look, lift));
            out.push(LodPrimitive::new(level, p));
        }
    }
}

pub fn solid(traj: &Trajectory, look: &DashLook, config: &RenderConfig) -> Vec<LodPrimitive> {
    let mut out = vec![];
    solid_between(traj, 0.0, 1.0, look, config, &mut out);
    out
}

pub fn dashed(
    traj: &Trajectory,
    dash: f32,
    space: f32,
    look: &DashLook,
    config: &RenderConfig,
) -> Vec<LodPrimitive> {
    let mut out = vec![];
    for (d0, d1) in dashed_parts(traj.length(), dash, space) {
        let t0 = traj.t_at_distance(d0);
        let t1 = traj.t_at_distance(d1);
        solid_between(traj, t0, t1, look, config, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::{vec2, vec3};

    #[test]
    fn dash_count_and_centering() {
        let parts = dashed_parts(10.0, 1.0, 1.0);
        assert_eq!(parts.len(), 5);
        assert!((parts[0].0 - 0.5).abs() < 1e-5);
        assert!(parts.last().unwrap().1 <= 10.0);

        let parts = dashed_parts(10.5, 1.5, 1.5);
        assert_eq!(parts.len(), 3);

        let short = dashed_parts(1.2, 1.0, 1.0);
        assert_eq!(short.len(), 1);
        assert!((short[0].0 - 0.1).abs() < 1e-5);
        assert!(dashed_parts(0.5, 1.0, 1.0).is_empty());
        assert!(dashed_parts(5.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn straight_dashes_stay_on_the_line() {
        let config = RenderConfig::default();
        let t = Trajectory::straight(Vec3::ZERO, vec3(12.0, 0.0, 0.0));
        let prims = dashed(&t, 1.5, 1.5, &DashLook::new(0.15, Color::WHITE), &config);
        assert_eq!(prims.len(), 4);
        for p in &prims {
            assert_eq!(p.level, LodLevel::NoLod);
            let d = p.primitive.dash().unwrap();
            assert!((d.length - 1.5).abs() < 1e-4);
            assert!(d.start().x >= -1e-4 && d.end().x <= 12.0 + 1e-4);
        }
    }

    #[test]
    fn curves_get_two_lods() {
        let config = RenderConfig::default();
        let t = Trajectory::curve(
            Vec3::ZERO,
            vec2(1.0, 0.0),
            vec3(20.0, 20.0, 0.0),
            vec2(0.0, 1.0),
            0.4,
        );
        let prims = solid(&t, &DashLook::new(0.15, Color::WHITE), &config);
        let lod0 = prims.iter().filter(|p| p.level == LodLevel::Lod0).count();
        let lod1 = prims.iter().filter(|p| p.level == LodLevel::Lod1).count();
        assert!(lod0 > lod1, "{} {}", lod0, lod1);
        assert!(lod1 >= 2);
        assert!(prims.iter().all(|p| p.level != LodLevel::NoLod));

        let p0 = SolidParams::lod0(&config);
        for (a, b) in calculate_solid(&t, 0.0, 1.0, &p0) {
            let len = t.length_between(a, b);
            assert!(t.turn_between(a, b) <= p0.min_angle || len < 2.0 * p0.min_length);
            assert!(len <= p0.max_length + 1e-3);
        }
    }

    #[test]
    fn shifted_dash_moves_left() {
        let config = RenderConfig::default();
        let t = Trajectory::straight(Vec3::ZERO, vec3(10.0, 0.0, 0.0));
        let prims = solid(&t, &DashLook::new(0.15, Color::WHITE).shifted(0.5), &config);
        assert_eq!(prims.len(), 1);
        let d = prims[0].primitive.dash().unwrap();
        assert!((d.pos.y - 0.5).abs() < 1e-5);
        assert!((d.pos.z - config.elevation_offset).abs() < 1e-5);
    }
}
