use crate::render::{dashed_parts, AreaDecal, GenCtx, LodPrimitive};
use crate::style::{
    ChessBoardCrosswalk, DoubleZebraCrosswalk, LadderCrosswalk, ParallelSolidLinesCrosswalk,
    ZebraCrosswalk,
};
use crate::{Crosswalk, LineID, Marking, PointID, PointKind, Style};
use geom::{Color, Vec2, Vec3};

/// Sides closer to parallel with the crosswalk line than this are clamped, so a very skewed
/// border doesn't stretch the crosswalk to infinity.
const MIN_SIDE_COS: f32 = 0.3;

/// Where a crosswalk lies: the line it starts from and the direction of its two sides.
/// Depth is measured into the marking, perpendicular to the road end.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CrosswalkFrame {
    pub a: Vec3,
    pub b: Vec3,
    /// Into the marking, perpendicular to the road end
    pub inward: Vec2,
    pub side_a: Vec2,
    pub side_b: Vec2,
}

impl CrosswalkFrame {
    /// Across length, from `a` to `b`
    pub fn length(&self) -> f32 {
        self.a.distance(self.b)
    }

    fn edge(&self, origin: Vec3, side: Vec2, depth: f32) -> Vec3 {
        let cos = side.dot(self.inward).max(MIN_SIDE_COS);
        origin + (side * (depth / cos)).z0()
    }

    /// Point at `u` (0 at `a`, 1 at `b`) and `depth` meters in, following the sides
    pub fn at(&self, u: f32, depth: f32) -> Vec3 {
        let ea = self.edge(self.a, self.side_a, depth);
        let eb = self.edge(self.b, self.side_b, depth);
        ea + (eb - ea) * u
    }

    /// Point `across` meters from `a` along the crosswalk line, `depth` meters in, ignoring the sides
    pub fn straight_at(&self, across: f32, depth: f32) -> Vec3 {
        let dir = unwrap_ret!((self.b - self.a).xy().try_normalize(), self.a);
        let n = dir.perpendicular();
        let n = if n.dot(self.inward) < 0.0 { -n } else { n };
        self.a + (dir * across + n * depth).z0()
    }
}

/// Direction of a border line leaving `foot`, None if the line doesn't start there
fn border_side(marking: &Marking, border: LineID, foot: PointID) -> Option<Vec2> {
    let line = marking.line(border)?;
    let traj = marking.line_trajectory(border)?;
    let side = if line.pair.first() == foot {
        traj.tangent(0.0)
    } else if line.pair.second() == foot {
        -traj.tangent(1.0)
    } else {
        return None;
    };
    side.try_normalize()
}

pub fn crosswalk_frame(marking: &Marking, cw: &Crosswalk) -> Option<CrosswalkFrame> {
    let line = marking.line(cw.line)?;
    let traj = marking.line_trajectory(cw.line)?;
    let dir = marking.entrance(line.pair.first().entrance)?.dir()?;
    let inward = -dir;

    let foot_a = line.pair.first().with_kind(PointKind::Enter);
    let foot_b = line.pair.second().with_kind(PointKind::Enter);
    let side = |border: Option<LineID>, foot: PointID| {
        border
            .and_then(|b| border_side(marking, b, foot))
            .unwrap_or(inward)
    };

    Some(CrosswalkFrame {
        a: traj.start(),
        b: traj.end(),
        inward,
        side_a: side(cw.left_border, foot_a),
        side_b: side(cw.right_border, foot_b),
    })
}

fn quad(corners: [Vec3; 4], color: Color, lift: f32) -> LodPrimitive {
    LodPrimitive::no_lod(
        AreaDecal {
            points: corners.iter().map(|p| p.up(lift)).collect(),
            triangles: vec![[0, 1, 2], [0, 2, 3]],
            color,
        }
        .into(),
    )
}

/// Area between `u0..u1` across and `d0..d1` in depth, following the sides
fn band(f: &CrosswalkFrame, (u0, u1): (f32, f32), (d0, d1): (f32, f32)) -> [Vec3; 4] {
    [f.at(u0, d0), f.at(u1, d0), f.at(u1, d1), f.at(u0, d1)]
}

/// Stripes across the crosswalk between depths d0 and d1
fn stripes(
    f: &CrosswalkFrame,
    depth: (f32, f32),
    dash: f32,
    space: f32,
    parallel: bool,
    color: Color,
    lift: f32,
    out: &mut Vec<LodPrimitive>,
) {
    let len = f.length();
    if len <= 0.0 {
        return;
    }
    for (a, b) in dashed_parts(len, dash, space) {
        let corners = if parallel {
            band(f, (a / len, b / len), depth)
        } else {
            [
                f.straight_at(a, depth.0),
                f.straight_at(b, depth.0),
                f.straight_at(b, depth.1),
                f.straight_at(a, depth.1),
            ]
        };
        out.push(quad(corners, color, lift));
    }
}

fn zebra(f: &CrosswalkFrame, s: &ZebraCrosswalk, lift: f32, out: &mut Vec<LodPrimitive>) {
    let depth = (s.offset_before, s.offset_before + s.width);
    stripes(f, depth, s.dash_length, s.space_length, s.parallel, s.color, lift, out);
}

fn double_zebra(f: &CrosswalkFrame, s: &DoubleZebraCrosswalk, lift: f32, out: &mut Vec<LodPrimitive>) {
    let row = ((s.width - s.offset) * 0.5).max(0.0);
    if row <= 0.0 {
        return;
    }
    let d0 = s.offset_before;
    let d1 = s.offset_before + s.width;
    for depth in [(d0, d0 + row), (d1 - row, d1)] {
        stripes(f, depth, s.dash_length, s.space_length, s.parallel, s.color, lift, out);
    }
}

fn side_lines(f: &CrosswalkFrame, d0: f32, d1: f32, w: f32, color: Color, lift: f32, out: &mut Vec<LodPrimitive>) {
    out.push(quad(band(f, (0.0, 1.0), (d0, d0 + w)), color, lift));
    out.push(quad(band(f, (0.0, 1.0), (d1 - w, d1)), color, lift));
}

fn parallel_lines(
    f: &CrosswalkFrame,
    s: &ParallelSolidLinesCrosswalk,
    lift: f32,
    out: &mut Vec<LodPrimitive>,
) {
    let (d0, d1) = (s.offset_before, s.offset_before + s.width);
    side_lines(f, d0, d1, s.line_width.min(s.width * 0.5), s.color, lift, out);
}

fn ladder(f: &CrosswalkFrame, s: &LadderCrosswalk, lift: f32, out: &mut Vec<LodPrimitive>) {
    let w = s.line_width.min(s.width * 0.5);
    let (d0, d1) = (s.offset_before, s.offset_before + s.width);
    side_lines(f, d0, d1, w, s.color, lift, out);
    if d1 - w > d0 + w {
        stripes(f, (d0 + w, d1 - w), s.dash_length, s.space_length, true, s.color, lift, out);
    }
}

/// Squares alternate, the first one at `a` is filled unless inverted
fn chess_board(f: &CrosswalkFrame, s: &ChessBoardCrosswalk, lift: f32, out: &mut Vec<LodPrimitive>) {
    let len = f.length();
    let q = s.square_side;
    if q <= 0.0 || len < q {
        return;
    }
    let n = (len / q) as usize;
    let start = (len - n as f32 * q) * 0.5;
    for row in 0..s.line_count.max(0) as usize {
        let d0 = s.offset_before + row as f32 * q;
        for i in 0..n {
            if ((i + row) % 2 == 0) == s.invert {
                continue;
            }
            let u0 = (start + i as f32 * q) / len;
            let u1 = (start + (i + 1) as f32 * q) / len;
            out.push(quad(band(f, (u0, u1), (d0, d0 + q)), s.color, lift));
        }
    }
}

pub fn crosswalk_primitives(marking: &Marking, line: LineID, ctx: &GenCtx) -> Vec<LodPrimitive> {
    let mut out = vec![];
    let cw = unwrap_ret!(marking.crosswalk_of_line(line), out);
    let f = unwrap_ret!(crosswalk_frame(marking, cw), out);
    let lift = ctx.config.elevation_offset;
    match &cw.style {
        Style::CrosswalkExistent(_) => {}
        Style::CrosswalkZebra(s) => zebra(&f, s, lift, &mut out),
        Style::CrosswalkDoubleZebra(s) => double_zebra(&f, s, lift, &mut out),
        Style::CrosswalkParallelSolidLines(s) => parallel_lines(&f, s, lift, &mut out),
        Style::CrosswalkLadder(s) => ladder(&f, s, lift, &mut out),
        Style::CrosswalkSolid(s) => {
            let depth = (s.offset_before, s.offset_before + s.width);
            out.push(quad(band(&f, (0.0, 1.0), depth), s.color, lift));
        }
        Style::CrosswalkChessBoard(s) => chess_board(&f, s, lift, &mut out),
        style => log::warn!(
            "style {:?} cannot be drawn as a crosswalk",
            style.style_type()
        ),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Assets, Primitive};
    use crate::style::StyleType;
    use crate::{EntranceID, MarkingID, PointPair, RenderConfig, RoadGraph, StaticRoadGraph};
    use geom::vec2;

    const E: EntranceID = EntranceID(1);

    /// Two arm node, the crosswalk spans the whole carriageway of the east arm at x = 5.5
    fn marking_with(style: StyleType) -> (Marking, LineID) {
        let mut g = StaticRoadGraph::default();
        g.add_node(
            0,
            Vec3::ZERO,
            &[(E, vec2(1.0, 0.0)), (EntranceID(2), vec2(-1.0, 0.0))],
            1,
        );
        let id = MarkingID::Node(0);
        let mut m = Marking::new(id, g.entrances(id).unwrap());
        let pair = PointPair::new(PointID::crosswalk(E, 1), PointID::crosswalk(E, 3));
        let l = m
            .add_crosswalk(pair, Some(style.default_style()))
            .unwrap();
        (m, l)
    }

    fn generate(style: StyleType) -> Vec<LodPrimitive> {
        let (m, l) = marking_with(style);
        let config = RenderConfig::default();
        let assets = Assets::new();
        let ctx = GenCtx {
            config: &config,
            assets: &assets,
        };
        crosswalk_primitives(&m, l, &ctx)
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
    fn frame_points_into_the_marking() {
        let (m, l) = marking_with(StyleType::CrosswalkZebra);
        let f = crosswalk_frame(&m, m.crosswalk_of_line(l).unwrap()).unwrap();
        assert!((f.length() - 7.0).abs() < 1e-3);
        let p = f.at(0.5, 2.0);
        assert!((p.x - 3.5).abs() < 1e-3, "{:?}", p);
        assert!(p.y.abs() < 1e-3);
        assert!(f.straight_at(0.0, 1.0).is_close(f.at(0.0, 1.0), 1e-3));
    }

    #[test]
    fn zebra_stripes_stay_in_the_band() {
        let prims = generate(StyleType::CrosswalkZebra);
        let a = areas(&prims);
        // 7m across, 0.4m stripes every meter
        assert_eq!(a.len(), 7);
        for decal in a {
            assert_eq!(decal.triangles.len(), 2);
            for p in &decal.points {
                assert!(p.x <= 5.25 + 1e-3 && p.x >= 3.25 - 1e-3, "{:?}", p);
                assert!(p.y.abs() <= 3.5 + 1e-3);
            }
        }
    }

    #[test]
    fn double_zebra_has_two_rows() {
        let single = generate(StyleType::CrosswalkZebra).len();
        assert_eq!(generate(StyleType::CrosswalkDoubleZebra).len(), single * 2);
    }

    #[test]
    fn existent_draws_nothing() {
        assert!(generate(StyleType::CrosswalkExistent).is_empty());
        assert_eq!(generate(StyleType::CrosswalkSolid).len(), 1);
        assert_eq!(generate(StyleType::CrosswalkParallelSolidLines).len(), 2);
        assert_eq!(generate(StyleType::CrosswalkLadder).len(), 2 + 7);
    }

    #[test]
    fn chess_board_alternates() {
        // 14 squares per row, two rows, half of them filled
        assert_eq!(generate(StyleType::CrosswalkChessBoard).len(), 14);
    }
}
