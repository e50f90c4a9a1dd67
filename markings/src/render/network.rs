use crate::render::{GenCtx, LodPrimitive, NetworkPart};
use crate::style::NetworkLine;
use crate::Trajectory;

/// Ranges of t covered by each repetition of the prefab.
/// The usable length is split into a whole number of repetitions close to `repeat_distance`.
pub fn network_ranges(traj: &Trajectory, s: &NetworkLine) -> Vec<(f32, f32)> {
    let length = traj.length();
    let start = s.offset_before.max(0.0);
    let end = length - s.offset_after.max(0.0);
    let avail = end - start;
    if avail <= 0.0 || s.repeat_distance <= 0.0 {
        return vec![];
    }
    let n = ((avail / s.repeat_distance).round() as usize).max(1);
    let step = avail / n as f32;
    (0..n)
        .map(|i| {
            let d0 = start + i as f32 * step;
            (traj.t_at_distance(d0), traj.t_at_distance(d0 + step))
        })
        .collect()
}

pub fn network_primitives(
    traj: &Trajectory,
    s: &NetworkLine,
    ctx: &GenCtx,
    out: &mut Vec<LodPrimitive>,
) {
    let name = unwrap_ret!(s.prefab.as_deref());
    let prefab = ctx.assets.prefab_or_fallback(name);
    for (t0, t1) in network_ranges(traj, s) {
        let mut part = traj.cut(t0, t1);
        if s.invert {
            part = part.reversed();
        }
        out.push(LodPrimitive::no_lod(
            NetworkPart {
                prefab: prefab.clone(),
                trajectory: part,
                shift: s.shift,
                elevation: s.elevation,
                scale: s.scale,
                invert: s.invert,
            }
            .into(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Assets, PrefabInfo, Primitive};
    use crate::RenderConfig;
    use geom::{vec3, Vec3};

    #[test]
    fn repetitions_cover_the_line() {
        let t = Trajectory::straight(Vec3::ZERO, vec3(100.0, 0.0, 0.0));
        let s = NetworkLine {
            repeat_distance: 30.0,
            offset_before: 5.0,
            offset_after: 5.0,
            ..Default::default()
        };
        let r = network_ranges(&t, &s);
        assert_eq!(r.len(), 3);
        assert!((t.length_between(r[0].0, r[0].1) - 30.0).abs() < 1e-2);
        assert!((t.position(r[0].0).x - 5.0).abs() < 1e-2);
        assert!((t.position(r[2].1).x - 95.0).abs() < 1e-2);

        let s = NetworkLine {
            repeat_distance: 500.0,
            ..Default::default()
        };
        assert_eq!(network_ranges(&t, &s).len(), 1);
    }

    #[test]
    fn inverted_parts_run_backwards() {
        let config = RenderConfig::default();
        let mut assets = Assets::new();
        assets.add_prefab(PrefabInfo::new("rail", 10.0, vec![(100, 50)]));
        let ctx = GenCtx {
            config: &config,
            assets: &assets,
        };
        let t = Trajectory::straight(Vec3::ZERO, vec3(20.0, 0.0, 0.0));
        let s = NetworkLine {
            prefab: Some("rail".to_string()),
            repeat_distance: 10.0,
            invert: true,
            ..Default::default()
        };
        let mut out = vec![];
        network_primitives(&t, &s, &ctx, &mut out);
        assert_eq!(out.len(), 2);
        let Primitive::Network(n) = &out[0].primitive else {
            panic!("expected a network part");
        };
        assert_eq!(n.prefab.name, "rail");
        assert!(n.trajectory.start().x > n.trajectory.end().x);
    }
}
