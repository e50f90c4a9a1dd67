use super::*;
use crate::{FillerVertex, PropValue, RuleEdge, Style, StyleType};
use common::saveload::{Bincode, CompressedBincode, Encoder, JSON};

/// Two crossing lines with a split rule, a crosswalk with a border, a filler and a moved point
fn populated() -> TestCtx {
    let mut ctx = TestCtx::new();
    let x = ctx.axis_x();
    let y = ctx.axis_y();
    ctx.line(PointID::enter(E1, 1), PointID::enter(E2, 3));
    let cw = ctx.line(PointID::crosswalk(E1, 1), PointID::crosswalk(E1, 3));

    let m = ctx.marking();
    m.set_point_offset(PointID::enter(E1, 1), 0.5).unwrap();
    m.set_point_split(PointID::enter(E3, 3), true, 0.8).unwrap();

    let r = m.rules_of(x).next().unwrap().id;
    let r2 = m.split_rule(r, RuleEdge::Line(y)).unwrap();
    m.edit_rule_style(r2, |s| s.set("Width", PropValue::Float(0.25)))
        .unwrap();
    m.set_crosswalk_style(cw, StyleType::CrosswalkLadder.default_style())
        .unwrap();

    let quad = vec![
        FillerVertex::Point(PointID::enter(E4, 1)),
        FillerVertex::Point(PointID::enter(E4, 3)),
        FillerVertex::Point(PointID::enter(E2, 1)),
        FillerVertex::Point(PointID::enter(E2, 3)),
    ];
    let mut grass = StyleType::FillerGrass.default_style();
    grass.set("Elevation", PropValue::Float(0.3)).unwrap();
    m.add_filler(quad, Some(grass)).unwrap();
    ctx
}

/// Lines by pair with the styles of their rules in drawing order
fn snapshot(m: &Marking) -> Vec<(PointPair, Vec<Style>, Option<Style>)> {
    let mut v: Vec<_> = m
        .lines()
        .map(|l| {
            (
                l.pair,
                m.rules_of(l.id).map(|r| r.style.clone()).collect(),
                m.crosswalk_of_line(l.id).map(|c| c.style.clone()),
            )
        })
        .collect();
    v.sort_by_key(|x| x.0);
    v
}

fn check_roundtrip<E: Encoder>() {
    let mut ctx = populated();
    let before = ctx.marking();
    let expected = snapshot(before);
    let fillers: Vec<Style> = before.fillers().map(|f| f.style.clone()).collect();
    let states: Vec<_> = before
        .entrances()
        .iter()
        .map(|e| e.states().to_vec())
        .collect();

    let data = E::encode(&*before).unwrap();
    let loaded: Marking = E::decode(&data).unwrap();

    let mut manager = MarkingManager::new();
    assert!(manager.insert_loaded(loaded, &ctx.road));
    let after = manager.get(NODE).unwrap();

    assert_eq!(snapshot(after), expected);
    assert_eq!(
        after.fillers().map(|f| f.style.clone()).collect::<Vec<_>>(),
        fillers
    );
    assert!(after.fillers().all(|f| f.contour.is_complete()));
    assert_eq!(
        after
            .entrances()
            .iter()
            .map(|e| e.states().to_vec())
            .collect::<Vec<_>>(),
        states
    );
    assert!(after.is_dirty());

    let cw = after.crosswalks().next().unwrap();
    assert!(cw.left_border.is_some());
    assert!(cw.right_border.is_none());

    // saving again gives the same document
    let again = E::encode(after).unwrap();
    assert_eq!(again, data);
}

#[test]
fn json_roundtrip() {
    check_roundtrip::<JSON>();
}

#[test]
fn bincode_roundtrip() {
    check_roundtrip::<Bincode>();
}

#[test]
fn compressed_roundtrip() {
    check_roundtrip::<CompressedBincode>();
}

#[test]
fn compressed_save_files_reload() {
    let mut ctx = populated();
    let docs = ctx.manager.persisted();
    let data = CompressedBincode::encode(&docs).unwrap();
    assert!(data.len() < Bincode::encode(&docs).unwrap().len());

    let docs = CompressedBincode::decode(&data).unwrap();
    let mut manager = MarkingManager::new();
    assert_eq!(manager.load(docs, &ctx.road), 1);
    assert_eq!(
        snapshot(manager.get(NODE).unwrap()),
        snapshot(ctx.marking())
    );
}

#[test]
fn manager_reload_drops_gone_markings() {
    let mut ctx = populated();
    ctx.road
        .add_segment(7, Vec3::ZERO, geom::vec3(50.0, 0.0, 0.0), (E1, E3), 1);
    ctx.manager
        .get_or_create(MarkingID::Segment(7), &ctx.road)
        .unwrap();
    let docs = ctx.manager.persisted();
    assert_eq!(docs.len(), 2);

    ctx.road.remove(MarkingID::Segment(7));
    let mut sub = ctx.manager.subscribers().subscribe(crate::UpdateType::Marking);
    assert_eq!(ctx.manager.load(docs, &ctx.road), 1);
    assert!(sub.take_cleared());
    assert_eq!(sub.take_updated().collect::<Vec<_>>(), vec![NODE]);
    assert!(!ctx.manager.contains(MarkingID::Segment(7)));
    assert_eq!(ctx.marking().lines().count(), 4);
}

#[test]
fn partial_json_loads() {
    let ctx = TestCtx::new();
    let doc = r#"{
        "id": {"Node": 0},
        "entrances": [{"id": 1, "points": []}],
        "lines": [{"pair": [{"entrance": 1, "kind": "Enter", "index": 2}, {"entrance": 3, "kind": "Enter", "index": 2}]}],
        "fillers": []
    }"#;
    let loaded: Marking = JSON::decode(doc.as_bytes()).unwrap();
    let mut manager = MarkingManager::new();
    assert!(manager.insert_loaded(loaded, &ctx.road));

    let m = manager.get(NODE).unwrap();
    let line = m.lines().next().unwrap();
    let rules: Vec<_> = m.rules_of(line.id).collect();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].style.style_type(), StyleType::RegularDashed);
    assert_eq!(m.entrances().len(), 4);
}
