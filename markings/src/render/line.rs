use crate::render::text::{render_text, TextParams};
use crate::render::{
    dash, network_primitives, prop_primitives, tree_primitives, DashLook, DashMaterial,
    DashPart, GenCtx, LodPrimitive, MeshBuilder, Primitive, TextDecal,
};
use crate::style::{
    Alignment, DoubleDashedLine, DoubleSolidLine, PavementLine, SharkTeethLine,
    SolidAndDashedLine, TextDirection, TextLine,
};
use crate::{LineID, Marking, RenderConfig, Style, Trajectory};
use geom::{vec2, Color};

pub const PAVEMENT_COLOR: Color = Color::gray(0.55);

/// Primitives of every rule of the line, in priority order
pub fn line_primitives(marking: &Marking, id: LineID, ctx: &GenCtx) -> Vec<LodPrimitive> {
    let mut out = vec![];
    let line = unwrap_ret!(marking.line(id), out);
    let traj = unwrap_ret!(marking.line_trajectory(id), out);
    for (i, rule) in marking.rules_of(id).enumerate() {
        let (t0, t1) = unwrap_contlog!(
            marking.rule_range(rule.id),
            "rule {:?} of line {:?} has an edge that doesn't cross it",
            rule.id,
            id
        );
        let part = traj.cut(t0, t1);
        let seed = common::hash_u64((line.pair, i));
        style_primitives(&part, &rule.style, seed, ctx, &mut out);
    }
    out
}

/// Lateral shifts of the two lines of a double line
pub fn double_shifts(offset: f32, alignment: Alignment) -> (f32, f32) {
    match alignment {
        Alignment::Centre => (offset * 0.5, -offset * 0.5),
        Alignment::Left => (0.0, -offset),
        Alignment::Right => (offset, 0.0),
    }
}

/// Primitives of one style along a trajectory
pub fn style_primitives(
    traj: &Trajectory,
    style: &Style,
    seed: u64,
    ctx: &GenCtx,
    out: &mut Vec<LodPrimitive>,
) {
    let c = ctx.config;
    match style {
        Style::RegularSolid(s) | Style::StopSolid(s) => {
            out.extend(dash::solid(traj, &DashLook::new(s.width, s.color), c))
        }
        Style::RegularDashed(s) | Style::StopDashed(s) => out.extend(dash::dashed(
            traj,
            s.dash_length,
            s.space_length,
            &DashLook::new(s.width, s.color),
            c,
        )),
        Style::RegularDoubleSolid(s) | Style::StopDoubleSolid(s) => double_solid(traj, s, c, out),
        Style::RegularDoubleDashed(s) => double_dashed(traj, s, c, out),
        Style::RegularSolidAndDashed(s) => solid_and_dashed(traj, s, c, out),
        Style::RegularSharkTeeth(s) | Style::StopSharkTeeth(s) => shark_teeth(traj, s, c, out),
        Style::RegularPavement(s) | Style::StopPavement(s) => pavement(traj, s, c, out),
        Style::RegularProp(s) => prop_primitives(traj, s, seed, ctx, out),
        Style::RegularTree(s) => tree_primitives(traj, s, seed, ctx, out),
        Style::RegularNetwork(s) => network_primitives(traj, s, ctx, out),
        Style::RegularText(s) => text(traj, s, ctx, out),
        _ => log::warn!(
            "style {:?} cannot be drawn along a line",
            style.style_type()
        ),
    }
}

fn second_color(use_second: bool, first: Color, second: Color) -> Color {
    if use_second {
        second
    } else {
        first
    }
}

fn double_solid(traj: &Trajectory, s: &DoubleSolidLine, c: &RenderConfig, out: &mut Vec<LodPrimitive>) {
    let (a, b) = double_shifts(s.offset, s.alignment);
    let look = DashLook::new(s.width, s.color);
    let second = DashLook::new(s.width, second_color(s.use_second_color, s.color, s.second_color));
    out.extend(dash::solid(traj, &look.shifted(a), c));
    out.extend(dash::solid(traj, &second.shifted(b), c));
}

fn double_dashed(traj: &Trajectory, s: &DoubleDashedLine, c: &RenderConfig, out: &mut Vec<LodPrimitive>) {
    let (a, b) = double_shifts(s.offset, s.alignment);
    let look = DashLook::new(s.width, s.color);
    let second = DashLook::new(s.width, second_color(s.use_second_color, s.color, s.second_color));
    out.extend(dash::dashed(traj, s.dash_length, s.space_length, &look.shifted(a), c));
    out.extend(dash::dashed(traj, s.dash_length, s.space_length, &second.shifted(b), c));
}

/// The solid line is on the left unless inverted
fn solid_and_dashed(traj: &Trajectory, s: &SolidAndDashedLine, c: &RenderConfig, out: &mut Vec<LodPrimitive>) {
    let half = s.offset * 0.5;
    let (solid_shift, dashed_shift) = if s.invert { (-half, half) } else { (half, -half) };
    let solid = DashLook::new(s.width, s.color).shifted(solid_shift);
    let dashed = DashLook::new(s.width, second_color(s.use_second_color, s.color, s.second_color))
        .shifted(dashed_shift);
    out.extend(dash::solid(traj, &solid, c));
    out.extend(dash::dashed(traj, s.dash_length, s.space_length, &dashed, c));
}

/// Triangles along the line pointing to its right, rotated by `angle`
fn shark_teeth(traj: &Trajectory, s: &SharkTeethLine, c: &RenderConfig, out: &mut Vec<LodPrimitive>) {
    for (d0, d1) in dash::dashed_parts(traj.length(), s.base, s.space) {
        let t = traj.t_at_distance((d0 + d1) * 0.5);
        let dir = (-traj.normal(t)).rotated_by_angle(s.angle.to_radians());
        let base = traj.position(t).up(c.elevation_offset);
        out.push(LodPrimitive::no_lod(Primitive::Dash(DashPart {
            pos: base + (dir * (s.height * 0.5)).z0(),
            dir,
            length: s.height,
            width: s.base,
            color: s.color,
            material: DashMaterial::Triangle,
        })));
    }
}

fn pavement(traj: &Trajectory, s: &PavementLine, c: &RenderConfig, out: &mut Vec<LodPrimitive>) {
    let points = traj.flatten_detail(c.curve_detail);
    let mut b = MeshBuilder::new(PAVEMENT_COLOR);
    b.ribbon(&points, s.width, s.elevation.max(c.elevation_offset));
    if b.is_empty() {
        return;
    }
    out.push(LodPrimitive::no_lod(Primitive::Mesh(b.build())));
}

fn text(traj: &Trajectory, s: &TextLine, ctx: &GenCtx, out: &mut Vec<LodPrimitive>) {
    let c = ctx.config;
    let name = if s.font.is_empty() {
        c.default_font.as_str()
    } else {
        s.font.as_str()
    };
    let font = ctx.assets.font_or_default(name);
    let ppm = c.text_pixels_per_meter;
    let params = TextParams {
        text: &s.text,
        px: s.scale * ppm,
        spacing: s.spacing,
        alignment: s.alignment,
        max_width: s.max_width * ppm,
        word_wrap: s.word_wrap,
        char_wrap: s.char_wrap,
    };
    let texture = unwrap_ret!(render_text(font, &params));

    let t = traj.t_at_distance(traj.length() * s.offset.clamp(0.0, 1.0));
    let tangent = traj.tangent(t);
    let dir = match s.direction {
        TextDirection::LeftToRight => tangent,
        TextDirection::TopToBottom => -tangent.perpendicular(),
        TextDirection::BottomToTop => tangent.perpendicular(),
    }
    .rotated_by_angle(s.angle.to_radians());

    out.push(LodPrimitive::no_lod(Primitive::Text(TextDecal {
        pos: traj.shifted_position(t, s.shift).up(c.elevation_offset),
        dir,
        size: vec2(texture.width as f32, texture.height as f32) / ppm,
        color: s.color,
        texture,
    })));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Assets, LodLevel};
    use crate::style::{SolidLine, StyleType};
    use geom::{vec3, Vec3};

    fn straight() -> Trajectory {
        Trajectory::straight(Vec3::ZERO, vec3(20.0, 0.0, 0.0))
    }

    fn generate(style: &Style) -> Vec<LodPrimitive> {
        let config = RenderConfig::default();
        let assets = Assets::new();
        let ctx = GenCtx {
            config: &config,
            assets: &assets,
        };
        let mut out = vec![];
        style_primitives(&straight(), style, 1, &ctx, &mut out);
        out
    }

    #[test]
    fn double_line_alignment() {
        assert_eq!(double_shifts(0.4, Alignment::Centre), (0.2, -0.2));
        assert_eq!(double_shifts(0.4, Alignment::Left), (0.0, -0.4));
        assert_eq!(double_shifts(0.4, Alignment::Right), (0.4, 0.0));

        let prims = generate(&StyleType::RegularDoubleSolid.default_style());
        assert_eq!(prims.len(), 2);
        let ys: Vec<f32> = prims.iter().map(|p| p.primitive.dash().unwrap().pos.y).collect();
        assert!((ys[0] - 0.15).abs() < 1e-5 && (ys[1] + 0.15).abs() < 1e-5);
    }

    #[test]
    fn solid_is_one_decal() {
        let prims = generate(&Style::RegularSolid(SolidLine {
            color: Color::WHITE,
            width: 0.2,
        }));
        assert_eq!(prims.len(), 1);
        assert_eq!(prims[0].level, LodLevel::NoLod);
        let d = prims[0].primitive.dash().unwrap();
        assert!((d.length - 20.0).abs() < 1e-4);
        assert_eq!(d.width, 0.2);
    }

    #[test]
    fn shark_teeth_are_triangles() {
        let prims = generate(&StyleType::StopSharkTeeth.default_style());
        assert_eq!(prims.len(), dash::dashed_parts(20.0, 0.5, 0.3).len());
        assert!(prims.len() >= 24);
        for p in &prims {
            let d = p.primitive.dash().unwrap();
            assert_eq!(d.material, DashMaterial::Triangle);
            assert!(d.pos.y < 0.0);
        }
    }

    #[test]
    fn pavement_is_a_mesh() {
        let prims = generate(&StyleType::RegularPavement.default_style());
        assert_eq!(prims.len(), 1);
        assert!(matches!(prims[0].primitive, Primitive::Mesh(_)));
    }

    #[test]
    fn text_falls_back_to_builtin_font() {
        let mut style = StyleType::RegularText.default_style();
        style
            .set("Text", crate::PropValue::Text("BUS".to_string()))
            .unwrap();
        style
            .set("Font", crate::PropValue::Text("Missing Sans".to_string()))
            .unwrap();
        let prims = generate(&style);
        assert_eq!(prims.len(), 1);
        let Primitive::Text(t) = &prims[0].primitive else {
            panic!("expected text");
        };
        assert!(t.texture.coverage() > 0);
        assert!((t.pos.x - 10.0).abs() < 1e-3);

        assert!(generate(&StyleType::RegularText.default_style()).is_empty());
    }

    #[test]
    fn crosswalk_style_is_not_drawn_on_lines() {
        assert!(generate(&StyleType::CrosswalkZebra.default_style()).is_empty());
    }
}
