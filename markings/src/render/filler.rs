use crate::render::{
    AreaDecal, DashMaterial, DashPart, GenCtx, LodPrimitive, MeshBuilder, PAVEMENT_COLOR,
};
use crate::style::{ChevronFiller, GrassFiller, GridFiller, PavementFiller, StripeFiller};
use crate::{Filler, RenderConfig, Style};
use geom::{signed_area, triangulate, Color, Polygon, Vec2, Vec3};
use itertools::Itertools;
use ordered_float::OrderedFloat;

pub const GRASS_COLOR: Color = Color::new(0.32, 0.48, 0.2, 1.0);

/// Hatching stops after this many lines, whatever the step
const MAX_HATCH_LINES: usize = 2048;

/// Primitives of a filler, nothing until its contour is complete
pub fn filler_primitives(filler: &Filler, ctx: &GenCtx) -> Vec<LodPrimitive> {
    if !filler.contour.is_complete() {
        return vec![];
    }
    outline_primitives(filler.contour.processed(), &filler.style, ctx.config)
}

/// Primitives of a style filling a simple polygon
pub fn outline_primitives(outline: &[Vec3], style: &Style, config: &RenderConfig) -> Vec<LodPrimitive> {
    let mut out = vec![];
    let lift = config.elevation_offset;
    match style {
        Style::FillerSolid(s) => {
            let pts = inset(outline, s.offset);
            solid(&pts, s.color, lift, config, &mut out);
        }
        Style::FillerStripe(s) => stripes(outline, s, lift, &mut out),
        Style::FillerGrid(s) => grid(outline, s, lift, &mut out),
        Style::FillerChevron(s) => chevron(outline, s, lift, &mut out),
        Style::FillerPavement(s) => pavement(outline, s, &mut out),
        Style::FillerGrass(s) => grass(outline, s, &mut out),
        _ => log::warn!("style {:?} cannot fill an area", style.style_type()),
    }
    out
}

fn flat(points: &[Vec3]) -> Vec<Vec2> {
    points.iter().map(|p| p.xy()).collect()
}

fn mean_z(points: &[Vec3]) -> f32 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.z).sum::<f32>() / points.len() as f32
}

/// Moves every vertex `offset` meters towards the interior.
/// Gives back the outline unchanged when the inset one wouldn't be simple anymore.
pub fn inset(outline: &[Vec3], offset: f32) -> Vec<Vec3> {
    let n = outline.len();
    if offset <= 0.0 || n < 3 {
        return outline.to_vec();
    }
    let ccw = signed_area(&flat(outline)) > 0.0;
    let mut res = Vec::with_capacity(n);
    for i in 0..n {
        let prev = outline[(i + n - 1) % n];
        let cur = outline[i];
        let next = outline[(i + 1) % n];
        let n1 = unwrap_cont!((cur - prev).xy().try_normalize()).perpendicular();
        let n2 = unwrap_cont!((next - cur).xy().try_normalize()).perpendicular();
        let miter = unwrap_cont!((n1 + n2).try_normalize());
        let len = offset / miter.dot(n1).max(0.25);
        let inward = if ccw { miter } else { -miter };
        res.push(cur + (inward * len).z0());
    }

    let poly = Polygon::new(flat(&res));
    if res.len() != n || !poly.is_simple() || (poly.signed_area() > 0.0) != ccw {
        log::debug!("inset of {} collapses the filler, ignoring it", offset);
        return outline.to_vec();
    }
    res
}

/// Triangles grouped so that no group uses more than `max` distinct vertices
pub fn split_triangles(tris: &[[usize; 3]], max: usize) -> Vec<Vec<[usize; 3]>> {
    let mut groups: Vec<Vec<[usize; 3]>> = vec![];
    let mut cur: Vec<[usize; 3]> = vec![];
    let mut used: Vec<usize> = vec![];
    for &t in tris {
        let new = t.iter().filter(|v| !used.contains(v)).count();
        if !cur.is_empty() && used.len() + new > max.max(3) {
            groups.push(std::mem::take(&mut cur));
            used.clear();
        }
        for v in t {
            if !used.contains(&v) {
                used.push(v);
            }
        }
        cur.push(t);
    }
    if !cur.is_empty() {
        groups.push(cur);
    }
    groups
}

fn decal(outline: &[Vec3], tris: &[[usize; 3]], color: Color, lift: f32) -> Option<LodPrimitive> {
    let mut remap: Vec<usize> = vec![];
    let mut triangles = Vec::with_capacity(tris.len());
    for t in tris {
        let mut local = [0u16; 3];
        for (k, &v) in t.iter().enumerate() {
            let i = match remap.iter().position(|&x| x == v) {
                Some(i) => i,
                None => {
                    remap.push(v);
                    remap.len() - 1
                }
            };
            local[k] = u16::try_from(i).ok()?;
        }
        triangles.push(local);
    }
    Some(LodPrimitive::no_lod(
        AreaDecal {
            points: remap.iter().map(|&i| outline[i].up(lift)).collect(),
            triangles,
            color,
        }
        .into(),
    ))
}

fn solid(outline: &[Vec3], color: Color, lift: f32, config: &RenderConfig, out: &mut Vec<LodPrimitive>) {
    let tris = unwrap_retlog!(
        triangulate(&flat(outline)),
        "could not triangulate a filler of {} vertices",
        outline.len()
    );
    if tris.is_empty() {
        return;
    }
    if outline.len() <= config.filler_decal_max_vertices {
        out.extend(decal(outline, &tris, color, lift));
        return;
    }
    for group in split_triangles(&tris, config.filler_split_max_vertices) {
        out.extend(decal(outline, &group, color, lift));
    }
}

/// Longest edge of the outline, the reference for hatching angles
fn main_axis(poly: &[Vec2]) -> Vec2 {
    poly.iter()
        .circular_tuple_windows()
        .map(|(&a, &b)| b - a)
        .max_by_key(|e| OrderedFloat(e.mag2()))
        .and_then(|e| e.try_normalize())
        .unwrap_or(Vec2::X)
}

/// Intervals, as distances from `origin` along `dir`, where the line is inside the polygon
pub fn clip_line(poly: &[Vec2], origin: Vec2, dir: Vec2) -> Vec<(f32, f32)> {
    let nrm = dir.perpendicular();
    let mut hits: Vec<f32> = poly
        .iter()
        .circular_tuple_windows()
        .filter_map(|(&a, &b)| {
            let da = (a - origin).dot(nrm);
            let db = (b - origin).dot(nrm);
            if (da < 0.0) == (db < 0.0) {
                return None;
            }
            let p = a + (b - a) * (da / (da - db));
            Some((p - origin).dot(dir))
        })
        .collect();
    hits.sort_by_key(|&s| OrderedFloat(s));
    hits.into_iter()
        .tuples()
        .filter(|(a, b)| b - a > 1e-4)
        .collect()
}

fn hatch_dash(origin: Vec2, dir: Vec2, (s0, s1): (f32, f32), width: f32, z: f32, color: Color) -> LodPrimitive {
    let mid = origin + dir * ((s0 + s1) * 0.5);
    LodPrimitive::no_lod(
        DashPart {
            pos: mid.z(z),
            dir,
            length: s1 - s0,
            width,
            color,
            material: DashMaterial::Rectangle,
        }
        .into(),
    )
}

/// Parallel lines `step` apart along `dir`, covering the polygon
fn hatch(poly: &[Vec2], dir: Vec2, step: f32, width: f32, z: f32, color: Color, out: &mut Vec<LodPrimitive>) {
    if step <= 0.0 {
        return;
    }
    let nrm = dir.perpendicular();
    let (lo, hi) = poly
        .iter()
        .map(|p| p.dot(nrm))
        .minmax()
        .into_option()
        .unwrap_or((0.0, 0.0));
    let mut c = lo + step * 0.5;
    let mut lines = 0;
    while c < hi && lines < MAX_HATCH_LINES {
        let origin = nrm * c;
        for range in clip_line(poly, origin, dir) {
            out.push(hatch_dash(origin, dir, range, width, z, color));
        }
        c += step;
        lines += 1;
    }
}

fn stripes(outline: &[Vec3], s: &StripeFiller, lift: f32, out: &mut Vec<LodPrimitive>) {
    let pts = flat(&inset(outline, s.offset));
    let dir = main_axis(&pts).rotated_by_angle(s.angle.to_radians());
    hatch(&pts, dir, s.step, s.width, mean_z(outline) + lift, s.color, out);
}

fn grid(outline: &[Vec3], s: &GridFiller, lift: f32, out: &mut Vec<LodPrimitive>) {
    let pts = flat(&inset(outline, s.offset));
    let dir = main_axis(&pts).rotated_by_angle(s.angle.to_radians());
    let z = mean_z(outline) + lift;
    hatch(&pts, dir, s.step, s.width, z, s.color, out);
    hatch(&pts, dir.perpendicular(), s.step, s.width, z, s.color, out);
}

/// V shapes along the main axis, their tips on the line through the barycenter
fn chevron(outline: &[Vec3], s: &ChevronFiller, lift: f32, out: &mut Vec<LodPrimitive>) {
    if s.step <= 0.0 {
        return;
    }
    let pts = flat(&inset(outline, s.offset));
    let z = mean_z(outline) + lift;
    let center = Polygon::new(pts.clone()).barycenter();
    let axis = if s.invert { -main_axis(&pts) } else { main_axis(&pts) };
    let side = axis.perpendicular();
    let half = (s.angle_between * 0.5).clamp(5.0, 85.0).to_radians();
    let arms = [(-axis).rotated_by_angle(-half), (-axis).rotated_by_angle(half)];

    let along = pts.iter().map(|p| (*p - center).dot(axis)).minmax().into_option();
    let lateral = pts
        .iter()
        .map(|p| (*p - center).dot(side).abs())
        .fold(0.0, f32::max);
    let (lo, hi) = unwrap_ret!(along);
    // tips further than the polygon still have arms reaching back into it
    let hi = hi + lateral / half.tan();

    let first = (lo / s.step).floor() as i64;
    let last = (hi / s.step).ceil() as i64;
    for k in (first..=last).take(MAX_HATCH_LINES) {
        let tip = center + axis * (k as f32 * s.step);
        for dir in arms {
            for (s0, s1) in clip_line(&pts, tip, dir) {
                let (s0, s1) = (s0.max(0.0), s1);
                if s1 - s0 <= 1e-4 {
                    continue;
                }
                out.push(hatch_dash(tip, dir, (s0, s1), s.width, z, s.color));
            }
        }
    }
}

fn pavement(outline: &[Vec3], s: &PavementFiller, out: &mut Vec<LodPrimitive>) {
    let pts = inset(outline, s.offset);
    let tris = unwrap_ret!(triangulate(&flat(&pts)));
    let mut b = MeshBuilder::new(PAVEMENT_COLOR);
    b.prism(&pts, &tris, s.elevation);
    if !b.is_empty() {
        out.push(LodPrimitive::no_lod(b.build().into()));
    }
}

/// A pavement curb around a grass top
fn grass(outline: &[Vec3], s: &GrassFiller, out: &mut Vec<LodPrimitive>) {
    let pts = inset(outline, s.offset);
    let tris = unwrap_ret!(triangulate(&flat(&pts)));
    let mut b = MeshBuilder::new(PAVEMENT_COLOR);
    b.prism(&pts, &tris, s.elevation);

    let inner = inset(&pts, s.curb_size);
    if inner != pts {
        if let Some(inner_tris) = triangulate(&flat(&inner)) {
            b.set_color(GRASS_COLOR);
            b.cap(&inner, &inner_tris, s.elevation + 0.01);
        }
    }
    if !b.is_empty() {
        out.push(LodPrimitive::no_lod(b.build().into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Primitive;
    use crate::style::{SolidFiller, StyleType};
    use geom::{triangles_area, vec2, vec3};

    fn square(side: f32) -> Vec<Vec3> {
        vec![
            vec3(0.0, 0.0, 0.0),
            vec3(side, 0.0, 0.0),
            vec3(side, side, 0.0),
            vec3(0.0, side, 0.0),
        ]
    }

    /// A regular polygon with `n` vertices
    fn disc(n: usize, r: f32) -> Vec<Vec3> {
        (0..n)
            .map(|i| {
                let a = i as f32 / n as f32 * std::f32::consts::TAU;
                vec3(a.cos() * r, a.sin() * r, 0.0)
            })
            .collect()
    }

    fn areas(prims: &[LodPrimitive]) -> Vec<&AreaDecal> {
        prims
            .iter()
            .filter_map(|p| match &p.primitive {
                Primitive::Area(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn convex_quad_is_two_triangles() {
        let config = RenderConfig::default();
        let style = Style::FillerSolid(SolidFiller::default());
        let prims = outline_primitives(&square(4.0), &style, &config);
        let a = areas(&prims);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].triangles.len(), 2);

        let pts: Vec<Vec2> = a[0].points.iter().map(|p| p.xy()).collect();
        let tris: Vec<[usize; 3]> = a[0]
            .triangles
            .iter()
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
            .collect();
        assert!((triangles_area(&pts, &tris) - 16.0).abs() < 1e-3);
    }

    #[test]
    fn big_fillers_are_split() {
        let config = RenderConfig::default();
        let style = Style::FillerSolid(SolidFiller::default());
        let outline = disc(40, 10.0);
        let prims = outline_primitives(&outline, &style, &config);
        let a = areas(&prims);
        assert!(a.len() > 1);
        let mut total = 0;
        for decal in &a {
            assert!(decal.points.len() <= config.filler_split_max_vertices);
            total += decal.triangles.len();
        }
        assert_eq!(total, 38);

        let small = disc(12, 10.0);
        assert_eq!(areas(&outline_primitives(&small, &style, &config)).len(), 1);
    }

    #[test]
    fn split_respects_the_limit() {
        let tris: Vec<[usize; 3]> = (1..10).map(|i| [0, i, i + 1]).collect();
        let groups = split_triangles(&tris, 8);
        assert!(groups.len() >= 2);
        assert_eq!(groups.iter().map(Vec::len).sum::<usize>(), tris.len());
        for g in groups {
            let mut v: Vec<usize> = g.iter().flatten().copied().collect();
            v.sort_unstable();
            v.dedup();
            assert!(v.len() <= 8);
        }
    }

    #[test]
    fn inset_shrinks_both_windings() {
        let sq = square(4.0);
        let i = inset(&sq, 1.0);
        assert!(i[0].is_close(vec3(1.0, 1.0, 0.0), 1e-4), "{:?}", i[0]);
        let mut cw = sq.clone();
        cw.reverse();
        let i = inset(&cw, 1.0);
        assert!(i.iter().all(|p| p.x > 0.5 && p.x < 3.5));

        // too large, gives back the outline
        assert_eq!(inset(&sq, 2.0), sq);
    }

    #[test]
    fn stripes_stay_inside() {
        let config = RenderConfig::default();
        let prims = outline_primitives(&square(10.0), &StyleType::FillerStripe.default_style(), &config);
        assert!(prims.len() > 5);
        let poly = Polygon::new(flat(&square(10.0)));
        for p in &prims {
            let d = p.primitive.dash().unwrap();
            assert!(poly.contains(d.pos.xy()));
            for end in [d.start(), d.end()] {
                assert!(end.x > -1e-3 && end.x < 10.0 + 1e-3, "{:?}", end);
                assert!(end.y > -1e-3 && end.y < 10.0 + 1e-3, "{:?}", end);
            }
        }
    }

    #[test]
    fn clip_concave() {
        // U shape, a horizontal line through both arms gives two intervals
        let u = [
            vec2(0.0, 0.0),
            vec2(6.0, 0.0),
            vec2(6.0, 4.0),
            vec2(4.0, 4.0),
            vec2(4.0, 1.0),
            vec2(2.0, 1.0),
            vec2(2.0, 4.0),
            vec2(0.0, 4.0),
        ];
        let r = clip_line(&u, vec2(0.0, 2.0), Vec2::X);
        assert_eq!(r.len(), 2);
        assert!((r[0].0 - 0.0).abs() < 1e-4 && (r[0].1 - 2.0).abs() < 1e-4);
        assert!((r[1].0 - 4.0).abs() < 1e-4 && (r[1].1 - 6.0).abs() < 1e-4);
    }

    #[test]
    fn chevron_arms_meet_on_the_axis() {
        let config = RenderConfig::default();
        let outline = vec![
            vec3(0.0, -2.0, 0.0),
            vec3(10.0, -2.0, 0.0),
            vec3(10.0, 2.0, 0.0),
            vec3(0.0, 2.0, 0.0),
        ];
        let prims = outline_primitives(&outline, &StyleType::FillerChevron.default_style(), &config);
        assert!(!prims.is_empty());
        for p in &prims {
            let d = p.primitive.dash().unwrap();
            // arms never cross the center line
            assert!(d.start().y * d.end().y >= -1e-3, "{:?}", d);
        }
    }

    #[test]
    fn raised_fillers_are_meshes() {
        let config = RenderConfig::default();
        for t in [StyleType::FillerPavement, StyleType::FillerGrass] {
            let prims = outline_primitives(&square(6.0), &t.default_style(), &config);
            assert_eq!(prims.len(), 1);
            let Primitive::Mesh(m) = &prims[0].primitive else {
                panic!("expected a mesh");
            };
            assert!(m.vertices.iter().any(|v| v.position.z > 0.1));
        }
        let grass = outline_primitives(&square(6.0), &StyleType::FillerGrass.default_style(), &config);
        let Primitive::Mesh(m) = &grass[0].primitive else {
            unreachable!()
        };
        assert!(m.vertices.iter().any(|v| v.color == GRASS_COLOR));
    }
}
