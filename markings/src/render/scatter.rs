use crate::render::{GenCtx, LodPrimitive, Primitive, PropInstance, TreeInstance};
use crate::style::{ColorOption, Distribution, PropLine, TreeLine};
use crate::Trajectory;
use common::rand::RandStream;
use geom::{Color, Vec2, Vec3};

/// The placement parameters shared by props and trees
#[derive(Copy, Clone, Debug)]
pub struct Scatter {
    pub step: f32,
    pub probability: i32,
    pub angle: Vec2,
    pub tilt: Vec2,
    pub slope: Vec2,
    pub shift: Vec2,
    pub scale: Vec2,
    pub elevation: Vec2,
    pub offset_before: f32,
    pub offset_after: f32,
    pub distribution: Distribution,
}

impl From<&PropLine> for Scatter {
    fn from(s: &PropLine) -> Self {
        Self {
            step: s.step,
            probability: s.probability,
            angle: s.angle,
            tilt: s.tilt,
            slope: s.slope,
            shift: s.shift,
            scale: s.scale,
            elevation: s.elevation,
            offset_before: s.offset_before,
            offset_after: s.offset_after,
            distribution: s.distribution,
        }
    }
}

impl From<&TreeLine> for Scatter {
    fn from(s: &TreeLine) -> Self {
        Self {
            step: s.step,
            probability: s.probability,
            angle: s.angle,
            tilt: s.tilt,
            slope: s.slope,
            shift: s.shift,
            scale: s.scale,
            elevation: s.elevation,
            offset_before: s.offset_before,
            offset_after: s.offset_after,
            distribution: s.distribution,
        }
    }
}

/// One placed instance before it's given a prefab
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScatterPoint {
    pub pos: Vec3,
    /// Radians around the vertical axis
    pub angle: f32,
    pub tilt: f32,
    pub slope: f32,
    pub scale: f32,
}

/// Distances along a range of `length` where instances go
pub fn scatter_distances(length: f32, s: &Scatter) -> Vec<f32> {
    let start = s.offset_before.max(0.0);
    let end = length - s.offset_after.max(0.0);
    if end < start || s.step <= 0.0 {
        return vec![];
    }
    let avail = end - start;
    match s.distribution {
        Distribution::FixedSpaceFreeEnd => {
            let n = (avail / s.step) as usize;
            (0..=n).map(|i| start + i as f32 * s.step).collect()
        }
        Distribution::FixedSpaceFixedEnd => {
            let n = (avail / s.step) as usize;
            let mut v: Vec<f32> = (0..=n).map(|i| start + i as f32 * s.step).collect();
            if v.last().map_or(true, |&l| end - l > s.step * 0.1) {
                v.push(end);
            }
            v
        }
        Distribution::DynamicSpaceFixedEnd => {
            let n = ((avail / s.step).round() as usize).max(1);
            let step = avail / n as f32;
            (0..=n).map(|i| start + i as f32 * step).collect()
        }
    }
}

/// Deterministic placement: every instance draws from its own random stream, so changing the
/// probability doesn't move the others.
pub fn scatter_points(traj: &Trajectory, s: &Scatter, seed: u64) -> Vec<ScatterPoint> {
    let mut out = vec![];
    for (i, d) in scatter_distances(traj.length(), s).into_iter().enumerate() {
        let mut r = RandStream::new(common::hash_u64((seed, i)));
        let roll = r.next_f32() * 100.0;
        if roll >= s.probability as f32 {
            continue;
        }
        let t = traj.t_at_distance(d);
        let shift = r.range(s.shift.x, s.shift.y);
        let up = r.range(s.elevation.x, s.elevation.y);
        out.push(ScatterPoint {
            pos: traj.shifted_position(t, shift).up(up),
            angle: traj.tangent(t).angle_x() + r.range(s.angle.x, s.angle.y).to_radians(),
            tilt: r.range(s.tilt.x, s.tilt.y).to_radians(),
            slope: r.range(s.slope.x, s.slope.y).to_radians(),
            scale: r.range(s.scale.x, s.scale.y),
        });
    }
    out
}

fn random_color(r: &mut RandStream) -> Color {
    Color::new(r.next_f32(), r.next_f32(), r.next_f32(), 1.0)
}

pub fn prop_primitives(
    traj: &Trajectory,
    s: &PropLine,
    seed: u64,
    ctx: &GenCtx,
    out: &mut Vec<LodPrimitive>,
) {
    let name = unwrap_ret!(s.prefab.as_deref());
    let prefab = ctx.assets.prefab_or_fallback(name);
    let mut colors = RandStream::new(seed ^ 0x5eed);
    for p in scatter_points(traj, &Scatter::from(s), seed) {
        let color = match s.color_option {
            ColorOption::Original => None,
            ColorOption::Custom => Some(s.color),
            ColorOption::Random => Some(random_color(&mut colors)),
        };
        out.push(LodPrimitive::no_lod(
            PropInstance {
                prefab: prefab.clone(),
                pos: p.pos,
                angle: p.angle,
                tilt: p.tilt,
                slope: p.slope,
                scale: p.scale,
                color,
            }
            .into(),
        ));
    }
}

pub fn tree_primitives(
    traj: &Trajectory,
    s: &TreeLine,
    seed: u64,
    ctx: &GenCtx,
    out: &mut Vec<LodPrimitive>,
) {
    let name = unwrap_ret!(s.prefab.as_deref());
    let prefab = ctx.assets.prefab_or_fallback(name);
    for p in scatter_points(traj, &Scatter::from(s), seed) {
        out.push(LodPrimitive::no_lod(Primitive::Tree(TreeInstance {
            prefab: prefab.clone(),
            pos: p.pos,
            angle: p.angle,
            tilt: p.tilt,
            slope: p.slope,
            scale: p.scale,
        })));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Assets, PrefabInfo};
    use crate::RenderConfig;
    use geom::vec3;

    fn scatter(step: f32, distribution: Distribution) -> Scatter {
        Scatter::from(&PropLine {
            step,
            distribution,
            ..Default::default()
        })
    }

    #[test]
    fn distributions() {
        let d = scatter_distances(11.0, &scatter(5.0, Distribution::FixedSpaceFreeEnd));
        assert_eq!(d, vec![0.0, 5.0, 10.0]);
        let d = scatter_distances(11.0, &scatter(5.0, Distribution::FixedSpaceFixedEnd));
        assert_eq!(d, vec![0.0, 5.0, 10.0, 11.0]);
        let d = scatter_distances(11.0, &scatter(5.0, Distribution::DynamicSpaceFixedEnd));
        assert_eq!(d, vec![0.0, 5.5, 11.0]);

        let mut s = scatter(5.0, Distribution::FixedSpaceFreeEnd);
        s.offset_before = 6.0;
        s.offset_after = 6.0;
        assert!(scatter_distances(11.0, &s).is_empty());
    }

    #[test]
    fn placement_is_deterministic() {
        let t = Trajectory::straight(Vec3::ZERO, vec3(50.0, 0.0, 0.0));
        let mut s = Scatter::from(&TreeLine::default());
        s.probability = 50;
        let a = scatter_points(&t, &s, 7);
        let b = scatter_points(&t, &s, 7);
        assert_eq!(a, b);
        assert!(a.len() <= 6);
        for p in &a {
            assert!(p.scale >= 0.9 && p.scale <= 1.1);
        }

        // the kept instances stay where they were when everything is placed
        s.probability = 100;
        let all = scatter_points(&t, &s, 7);
        assert_eq!(all.len(), 6);
        for p in &a {
            assert!(all.contains(p));
        }
    }

    #[test]
    fn missing_prefab_falls_back() {
        let config = RenderConfig::default();
        let assets = Assets::new();
        let ctx = GenCtx {
            config: &config,
            assets: &assets,
        };
        let t = Trajectory::straight(Vec3::ZERO, vec3(10.0, 0.0, 0.0));
        let mut out = vec![];
        let style = PropLine {
            prefab: Some("bench".to_string()),
            color_option: ColorOption::Custom,
            color: Color::RED,
            ..Default::default()
        };
        prop_primitives(&t, &style, 1, &ctx, &mut out);
        assert_eq!(out.len(), 3);
        let Primitive::Prop(p) = &out[0].primitive else {
            panic!("expected a prop");
        };
        assert_eq!(p.prefab, PrefabInfo::fallback());
        assert_eq!(p.color, Some(Color::RED));

        out.clear();
        prop_primitives(&t, &PropLine::default(), 1, &ctx, &mut out);
        assert!(out.is_empty());
    }
}
