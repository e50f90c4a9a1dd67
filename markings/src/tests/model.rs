use super::*;
use crate::{FillerVertex, LineKind, MarkingError, PointKind, RuleEdge, Style, StyleType};
use quickcheck::quickcheck;

fn sorted_by_angle(m: &Marking, points: &[PointID]) -> Vec<PointID> {
    let mut v: Vec<(f32, PointID)> = points
        .iter()
        .map(|&p| {
            let pos = m.resolve(p).unwrap().pos;
            (pos.y.atan2(pos.x), p)
        })
        .collect();
    v.sort_by(|a, b| a.0.total_cmp(&b.0));
    v.into_iter().map(|x| x.1).collect()
}

#[test]
fn pair_lookup_is_unordered() {
    let mut ctx = TestCtx::new();
    let a = PointID::enter(E1, 1);
    let b = PointID::enter(E2, 3);
    let l = ctx.line(a, b);

    let m = ctx.marking();
    assert_eq!(m.try_get_line(PointPair::new(a, b)).map(|x| x.id), Some(l));
    assert_eq!(m.try_get_line(PointPair::new(b, a)).map(|x| x.id), Some(l));
    assert_eq!(m.line(l).unwrap().kind, LineKind::Regular);
}

#[test]
fn duplicate_line_is_rejected() {
    let mut ctx = TestCtx::new();
    let l = ctx.axis_x();
    let m = ctx.marking();
    let r = m.rules_of(l).next().unwrap().id;
    m.set_rule_style(r, StyleType::RegularDoubleSolid.default_style())
        .unwrap();

    let pair = PointPair::new(PointID::enter(E3, 2), PointID::enter(E1, 2));
    assert_eq!(
        m.add_line(pair, None),
        Err(MarkingError::LineExists(pair))
    );
    let rules: Vec<_> = m.rules_of(l).collect();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id, r);
    assert_eq!(rules[0].style.style_type(), StyleType::RegularDoubleSolid);
}

#[test]
fn pairs_make_kinds() {
    let mut ctx = TestCtx::new();
    let m = ctx.marking();

    let stop = PointPair::new(PointID::enter(E1, 1), PointID::enter(E1, 3));
    let normal = PointPair::new(PointID::enter(E1, 1), PointID::normal(E1, 1));
    let lane = PointPair::new(PointID::lane(E1, 1), PointID::lane(E3, 2));
    let cw = PointPair::new(PointID::crosswalk(E2, 1), PointID::crosswalk(E2, 3));

    let s = m.add_stop_line(stop, None).unwrap();
    let n = m.add_normal_line(normal, None).unwrap();
    let l = m.add_lane_line(lane, None).unwrap();
    let c = m.add_crosswalk(cw, None).unwrap();

    assert_eq!(m.line(s).unwrap().kind, LineKind::Stop);
    assert_eq!(m.line(n).unwrap().kind, LineKind::Normal);
    assert_eq!(m.line(l).unwrap().kind, LineKind::Lane);
    assert!(m.line(c).unwrap().rules().is_empty());
    assert!(m.crosswalk_of_line(c).is_some());

    let same = PointPair::new(PointID::enter(E1, 1), PointID::enter(E1, 1));
    assert!(m.add_line(same, None).is_err());
    assert!(matches!(
        m.add_regular_line(PointPair::new(PointID::enter(E2, 1), PointID::enter(E2, 2)), None),
        Err(MarkingError::WrongLineKind { .. })
    ));
    assert!(matches!(
        m.add_line(
            PointPair::new(PointID::enter(E2, 1), PointID::enter(E3, 1)),
            Some(StyleType::CrosswalkZebra.default_style())
        ),
        Err(MarkingError::StyleMismatch { .. })
    ));
}

#[test]
fn one_rule_edge_per_crossing_line() {
    let mut ctx = TestCtx::new();
    let x = ctx.axis_x();
    let y = ctx.axis_y();
    let c = ctx.line(PointID::enter(E2, 1), PointID::enter(E4, 1));
    let d = ctx.line(PointID::enter(E2, 3), PointID::enter(E4, 3));
    // crosses x on its start point
    ctx.line(PointID::enter(E1, 1), PointID::enter(E1, 3));

    let m = ctx.marking();
    let edges = m.rule_edges(x);
    assert_eq!(edges.len(), 2 + 3);
    assert_eq!(edges[0].0, RuleEdge::Start);
    assert_eq!(edges[4].0, RuleEdge::End);
    for l in [y, c, d] {
        assert!(edges.iter().any(|e| e.0 == RuleEdge::Line(l)));
    }

    let rules: Vec<_> = m.rules_of(x).collect();
    assert_eq!(rules.len(), 1);
    assert_eq!(m.rule_range(rules[0].id), Some((0.0, 1.0)));
}

#[test]
fn split_covers_the_original_range() {
    let mut ctx = TestCtx::new();
    let x = ctx.axis_x();
    let y = ctx.axis_y();
    let m = ctx.marking();

    let r = m.rules_of(x).next().unwrap().id;
    assert_eq!(
        m.split_rule(r, RuleEdge::Start),
        Err(MarkingError::InvalidEdge(RuleEdge::Start))
    );

    let r2 = m.split_rule(r, RuleEdge::Line(y)).unwrap();
    let a = m.rule_range(r).unwrap();
    let b = m.rule_range(r2).unwrap();
    assert_eq!(a.0, 0.0);
    assert_eq!(b.1, 1.0);
    assert_delta!(a.1, 0.5, 1e-2);
    assert_eq!(a.1, b.0);
    assert!(!m.rule(r).unwrap().is_overlapped);
    assert!(!m.rule(r2).unwrap().is_overlapped);
    assert_eq!(m.line(x).unwrap().rules(), &[r, r2]);
}

#[test]
fn overlapping_rules_are_flagged() {
    let mut ctx = TestCtx::new();
    let x = ctx.axis_x();
    let y = ctx.axis_y();
    let m = ctx.marking();

    let r = m.rules_of(x).next().unwrap().id;
    let r2 = m.split_rule(r, RuleEdge::Line(y)).unwrap();
    let top = m
        .add_rule(x, RuleEdge::Line(y), RuleEdge::Start, Style::default_of(crate::MarkingKind::Regular))
        .unwrap();

    assert!(m.rule(r).unwrap().is_overlapped);
    assert!(m.rule(top).unwrap().is_overlapped);
    assert!(!m.rule(r2).unwrap().is_overlapped);
    assert_eq!(m.line(x).unwrap().rules().last(), Some(&top));

    m.move_rule(top, 0).unwrap();
    assert_eq!(m.line(x).unwrap().rules()[0], top);

    m.remove_rule(top).unwrap();
    assert!(!m.rule(r).unwrap().is_overlapped);

    m.remove_rule(r2).unwrap();
    assert_eq!(m.remove_rule(r), Err(MarkingError::LastRule));
}

#[test]
fn removing_an_edge_line_resets_rules() {
    let mut ctx = TestCtx::new();
    let x = ctx.axis_x();
    let y = ctx.axis_y();
    let m = ctx.marking();

    let r = m.rules_of(x).next().unwrap().id;
    m.split_rule(r, RuleEdge::Line(y)).unwrap();
    assert_eq!(m.line_dependences(y).unwrap().rules, 2);

    let deps = m.remove_line(y).unwrap();
    assert_eq!(deps.rules, 2);
    assert!(m.line(y).is_none());

    let rules: Vec<_> = m.rules_of(x).collect();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].from, RuleEdge::Start);
    assert_eq!(rules[0].to, RuleEdge::End);
}

#[test]
fn crosswalk_borders_follow_lines() {
    let mut ctx = TestCtx::new();
    let border = ctx.line(PointID::enter(E1, 1), PointID::enter(E2, 3));
    let cw = ctx.line(PointID::crosswalk(E1, 1), PointID::crosswalk(E1, 3));
    let m = ctx.marking();

    assert_eq!(m.crosswalk_of_line(cw).unwrap().left_border, Some(border));
    assert_eq!(m.crosswalk_of_line(cw).unwrap().right_border, None);

    let other = m
        .add_line(
            PointPair::new(PointID::enter(E1, 3), PointID::enter(E4, 1)),
            None,
        )
        .unwrap();
    assert_eq!(m.crosswalk_of_line(cw).unwrap().right_border, Some(other));

    assert!(matches!(
        m.set_crosswalk_borders(cw, Some(other), None),
        Err(MarkingError::InvalidBorder(_))
    ));

    let deps = m.remove_line(border).unwrap();
    assert_eq!(deps.borders, 1);
    assert_eq!(m.crosswalk_of_line(cw).unwrap().left_border, None);

    let deps = m.remove_line(cw).unwrap();
    assert_eq!(deps.crosswalks, 1);
    assert!(m.crosswalk_of_line(cw).is_none());
    assert_eq!(m.crosswalks().count(), 0);
    assert!(m.line(other).is_some());
}

#[test]
fn incomplete_contours_are_rejected() {
    let mut ctx = TestCtx::new();
    let m = ctx.marking();

    let two = vec![
        FillerVertex::Point(PointID::enter(E1, 1)),
        FillerVertex::Point(PointID::enter(E1, 3)),
    ];
    assert_eq!(m.add_filler(two, None), Err(MarkingError::ContourIncomplete));

    let corners = sorted_by_angle(
        m,
        &[
            PointID::enter(E1, 1),
            PointID::enter(E1, 3),
            PointID::enter(E3, 1),
            PointID::enter(E3, 3),
        ],
    );

    let mut bowtie: Vec<_> = corners.iter().map(|&p| FillerVertex::Point(p)).collect();
    bowtie.swap(1, 2);
    assert_eq!(m.add_filler(bowtie, None), Err(MarkingError::ContourIncomplete));

    let quad = corners.iter().map(|&p| FillerVertex::Point(p)).collect();
    let f = m.add_filler(quad, None).unwrap();
    let filler = m.filler(f).unwrap();
    assert!(filler.contour.is_complete());
    assert_delta!(filler.contour.polygon().area(), 11.0 * 7.0, 1e-2);
    assert_eq!(m.fillers().count(), 1);
}

#[test]
fn split_points_face_their_line() {
    let mut ctx = TestCtx::new();
    let p = PointID::enter(E1, 2);
    let m = ctx.marking();
    let center = m.resolve(p).unwrap().pos;

    m.set_point_split(p, true, 1.0).unwrap();
    let north = m
        .entrance(E1)
        .unwrap()
        .resolve_toward(p, geom::vec3(0.0, 50.0, 0.0))
        .unwrap()
        .pos;
    let south = m
        .entrance(E1)
        .unwrap()
        .resolve_toward(p, geom::vec3(0.0, -50.0, 0.0))
        .unwrap()
        .pos;
    assert!(north.y > center.y);
    assert!(south.y < center.y);
    assert_delta!(north.distance(south), 1.0, 1e-3);
}

#[test]
fn offsets_reset() {
    let mut ctx = TestCtx::new();
    let p = PointID::enter(E2, 1);
    let m = ctx.marking();
    let before = m.resolve(p).unwrap().pos;

    m.set_point_offset(p, 1.5).unwrap();
    assert!(m.resolve(p).unwrap().pos.distance(before) > 1.0);
    assert!(m.set_point_offset(PointID::enter(E2, 9), 1.0).is_err());

    m.reset_offsets();
    assert!(m.resolve(p).unwrap().pos.is_close(before, 1e-4));
}

#[test]
fn style_mutation_marks_dirty() {
    let mut ctx = TestCtx::new();
    let x = ctx.axis_x();
    let m = ctx.marking();
    m.take_dirty();
    m.take_changed();

    let r = m.rules_of(x).next().unwrap().id;
    assert!(m
        .edit_rule_style(r, |s| s.set("Nope", crate::PropValue::Float(1.0)))
        .is_err());
    assert!(!m.is_dirty());

    m.edit_rule_style(r, |s| s.set("Width", crate::PropValue::Float(0.4)))
        .unwrap();
    assert!(m.is_dirty());
    assert!(m.take_changed());
    assert!(m.take_dirty().lines.contains(&x));
}

#[test]
fn clear_keeps_entrances() {
    let mut ctx = TestCtx::new();
    ctx.axis_x();
    ctx.axis_y();
    let m = ctx.marking();
    m.set_point_offset(PointID::enter(E1, 1), 0.5).unwrap();

    assert_eq!(m.dependences_of_entrance(E1).lines, 1);
    m.clear();
    assert_eq!(m.lines().count(), 0);
    assert_eq!(m.entrances().len(), 4);
    assert_eq!(m.point_state(PointID::enter(E1, 1)).unwrap().offset, 0.5);
    assert_eq!(m.entrance(E1).unwrap().count(PointKind::Enter), 3);
}

quickcheck! {
    fn offset_is_reversible(delta: f32, index: u8) -> bool {
        if !delta.is_finite() {
            return true;
        }
        let mut ctx = TestCtx::new();
        let p = PointID::enter(E3, 1 + index % 3);
        let m = ctx.marking();
        m.set_point_offset(p, 0.25).unwrap();
        let before = m.resolve(p).unwrap().pos;

        m.set_point_offset(p, 0.25 + delta).unwrap();
        m.set_point_offset(p, 0.25).unwrap();
        m.resolve(p).unwrap().pos.is_close(before, 1e-4)
    }
}
