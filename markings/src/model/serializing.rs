use crate::{
    Crosswalk, Entrance, EntranceID, Filler, FillerContour, FillerVertex, LineID, LineKind, LineRule,
    Marking, MarkingID, MarkingLine, PointID, PointPair, PointState, RuleEdge, Style,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The persisted form of a marking. Entrance geometry comes back from the road graph,
/// lines are referenced by their point pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializedMarking {
    pub id: MarkingID,
    pub entrances: Vec<SerializedEntrance>,
    pub lines: Vec<SerializedLine>,
    pub fillers: Vec<SerializedFiller>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializedEntrance {
    pub id: EntranceID,
    pub points: Vec<PointState>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializedLine {
    pub pair: PointPair,
    #[serde(default)]
    pub rules: Vec<SerializedRule>,
    #[serde(default)]
    pub crosswalk: Option<SerializedCrosswalk>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerializedEdge {
    Start,
    End,
    Line(PointPair),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializedRule {
    pub from: SerializedEdge,
    pub to: SerializedEdge,
    pub style: Style,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializedCrosswalk {
    pub style: Style,
    pub left_border: Option<PointPair>,
    pub right_border: Option<PointPair>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerializedFillerVertex {
    Point(PointID),
    Intersect(PointPair, PointPair),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializedFiller {
    pub vertices: Vec<SerializedFillerVertex>,
    pub style: Style,
}

defer_serialize!(Marking, SerializedMarking);

impl Marking {
    pub fn to_persisted(&self) -> SerializedMarking {
        self.into()
    }

    /// Restores a marking whose entrances wait for the road graph,
    /// see `MarkingManager::insert_loaded`
    pub fn from_persisted(doc: SerializedMarking) -> Self {
        doc.into()
    }
}

impl From<&Marking> for SerializedMarking {
    fn from(m: &Marking) -> Self {
        let pair_of = |l: LineID| m.lines.get(l).map(|l| l.pair);
        let edge = |e: RuleEdge| match e {
            RuleEdge::Start => Some(SerializedEdge::Start),
            RuleEdge::End => Some(SerializedEdge::End),
            RuleEdge::Line(l) => pair_of(l).map(SerializedEdge::Line),
        };

        let lines = m
            .pairs
            .values()
            .filter_map(|&id| m.lines.get(id))
            .map(|l| SerializedLine {
                pair: l.pair,
                rules: m
                    .rules_of(l.id)
                    .filter_map(|r| {
                        Some(SerializedRule {
                            from: edge(r.from)?,
                            to: edge(r.to)?,
                            style: r.style.clone(),
                        })
                    })
                    .collect(),
                crosswalk: m.crosswalk_of_line(l.id).map(|c| SerializedCrosswalk {
                    style: c.style.clone(),
                    left_border: c.left_border.and_then(pair_of),
                    right_border: c.right_border.and_then(pair_of),
                }),
            })
            .collect();

        let fillers = m
            .fillers
            .values()
            .map(|f| SerializedFiller {
                vertices: f
                    .contour
                    .raw_vertices()
                    .iter()
                    .filter_map(|v| match *v {
                        FillerVertex::Point(p) => Some(SerializedFillerVertex::Point(p)),
                        FillerVertex::Intersect(a, b) => {
                            Some(SerializedFillerVertex::Intersect(pair_of(a)?, pair_of(b)?))
                        }
                    })
                    .collect(),
                style: f.style.clone(),
            })
            .collect();

        Self {
            id: m.id,
            entrances: m
                .entrances
                .iter()
                .map(|e| SerializedEntrance {
                    id: e.id,
                    points: e.states().to_vec(),
                })
                .collect(),
            lines,
            fillers,
        }
    }
}

impl From<SerializedMarking> for Marking {
    fn from(doc: SerializedMarking) -> Self {
        let mut m = Marking::empty(doc.id);
        m.entrances = doc
            .entrances
            .into_iter()
            .map(|e| Entrance::unresolved(e.id, e.points))
            .collect();

        for l in &doc.lines {
            let kind = unwrap_contlog!(
                LineKind::of_pair(l.pair),
                "skipping line on {:?}: the points cannot be joined",
                l.pair
            );
            if m.pairs.contains_key(&l.pair) {
                warn!("skipping duplicate line on {:?}", l.pair);
                continue;
            }
            let id = m.lines.insert_with_key(|id| MarkingLine {
                id,
                pair: l.pair,
                kind,
                rules: vec![],
            });
            m.pairs.insert(l.pair, id);
        }

        let line_of = |m: &Marking, pair: PointPair| m.pairs.get(&pair).copied();

        for l in doc.lines {
            let id = unwrap_cont!(line_of(&m, l.pair));
            let kind = m.lines[id].kind;
            if !kind.has_rules() {
                let c = l.crosswalk.unwrap_or_else(|| SerializedCrosswalk {
                    style: Style::default_of(kind.style_kind()),
                    left_border: None,
                    right_border: None,
                });
                let left_border = c.left_border.and_then(|p| line_of(&m, p));
                let right_border = c.right_border.and_then(|p| line_of(&m, p));
                m.crosswalks.insert(
                    id,
                    Crosswalk {
                        line: id,
                        style: checked_style(c.style, kind),
                        left_border,
                        right_border,
                    },
                );
                continue;
            }

            for r in l.rules {
                let edge = |e: SerializedEdge| match e {
                    SerializedEdge::Start => Some(RuleEdge::Start),
                    SerializedEdge::End => Some(RuleEdge::End),
                    SerializedEdge::Line(p) => line_of(&m, p).map(RuleEdge::Line),
                };
                let (Some(from), Some(to)) = (edge(r.from), edge(r.to)) else {
                    warn!("dropping a rule of {:?}: its edge line is gone", l.pair);
                    continue;
                };
                let style = checked_style(r.style, kind);
                let rid = m.rules.insert_with_key(|rid| LineRule {
                    id: rid,
                    line: id,
                    from,
                    to,
                    style,
                    is_overlapped: false,
                });
                m.lines[id].rules.push(rid);
            }
            if m.lines[id].rules.is_empty() {
                let rid = m.rules.insert_with_key(|rid| LineRule {
                    id: rid,
                    line: id,
                    from: RuleEdge::Start,
                    to: RuleEdge::End,
                    style: Style::default_of(kind.style_kind()),
                    is_overlapped: false,
                });
                m.lines[id].rules.push(rid);
            }
        }

        let pairs: BTreeMap<PointPair, _> = m.pairs.clone();
        for f in doc.fillers {
            let vertices: Option<Vec<FillerVertex>> = f
                .vertices
                .iter()
                .map(|v| match *v {
                    SerializedFillerVertex::Point(p) => Some(FillerVertex::Point(p)),
                    SerializedFillerVertex::Intersect(a, b) => Some(FillerVertex::Intersect(
                        *pairs.get(&a)?,
                        *pairs.get(&b)?,
                    )),
                })
                .collect();
            let vertices = unwrap_contlog!(vertices, "dropping a filler: one of its lines is gone");
            let contour = FillerContour::new(&m, vertices);
            let style = if f.style.kind() == crate::MarkingKind::Filler {
                f.style
            } else {
                Style::default_of(crate::MarkingKind::Filler)
            };
            m.fillers
                .insert_with_key(|id| Filler { id, contour, style });
        }

        m.mark_all_dirty();
        m
    }
}

/// A style of the wrong kind is replaced by the default, the rest of the document still loads
fn checked_style(style: Style, kind: LineKind) -> Style {
    if style.kind() == kind.style_kind() {
        return style;
    }
    warn!(
        "{:?} style on a {:?} line, using the default instead",
        style.style_type(),
        kind
    );
    Style::default_of(kind.style_kind())
}
