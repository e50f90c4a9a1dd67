//! Scripting façade over the markings.
//!
//! Scripts never hold on to model references: they get small `Copy` refs made of road ids,
//! entrance ids and point indices, and every call resolves them against the live model again.
//! A ref that went stale (the road was edited, the line removed...) gives
//! [`ApiError::NotFound`] instead of silently doing nothing.

use crate::{
    Dependences, EntranceID, FillerID, FillerVertex, LineID, LineKind, Marking, MarkingError,
    MarkingID, MarkingKind, MarkingManager, NotFound, PointID, PointKind, PointPair, PropValue, RoadGraph,
    RuleEdge, RuleID, Style, StyleError, StyleType, TemplateID, TemplateManager,
};
use geom::Vec3;
use std::fmt::{Display, Formatter};

/// What a script referenced but doesn't exist
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Missing {
    Marking(MarkingID),
    Entrance(MarkingID, EntranceID),
    Point(PointRef),
    Line(LineRef),
    Rule(RuleRef),
    Filler(FillerRef),
    Template(TemplateID),
}

impl Display for Missing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Missing::Marking(m) => write!(f, "marking {:?}", m),
            Missing::Entrance(m, e) => write!(f, "entrance {:?} of {:?}", e, m),
            Missing::Point(p) => write!(f, "point {:?}", p),
            Missing::Line(l) => write!(f, "line {:?}", l),
            Missing::Rule(r) => write!(f, "rule {:?}", r),
            Missing::Filler(x) => write!(f, "filler {:?}", x),
            Missing::Template(t) => write!(f, "template {:?}", t),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(Missing),
    #[error(transparent)]
    Marking(#[from] MarkingError),
    #[error(transparent)]
    Style(#[from] StyleError),
    #[error("template {0:?} doesn't apply to this marking")]
    TemplateMismatch(TemplateID),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// A point, by entrance and 1-based index
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PointRef {
    pub marking: MarkingID,
    pub entrance: EntranceID,
    pub kind: PointKind,
    pub index: u8,
}

impl PointRef {
    pub fn id(&self) -> PointID {
        PointID::new(self.entrance, self.kind, self.index)
    }
}

/// A line, by its two points
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LineRef {
    pub marking: MarkingID,
    pub pair: PointPair,
}

/// A rule, by its position in the line's drawing order
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RuleRef {
    pub line: LineRef,
    pub index: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FillerRef {
    pub marking: MarkingID,
    pub id: FillerID,
}

/// Where a rule starts or ends, in script terms
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdgeRef {
    Start,
    End,
    /// Where the given line crosses the rule's line
    Line(PointPair),
}

pub struct MarkingApi<'a> {
    pub manager: &'a mut MarkingManager,
    pub road: &'a dyn RoadGraph,
    pub templates: &'a TemplateManager,
}

impl<'a> MarkingApi<'a> {
    pub fn new(
        manager: &'a mut MarkingManager,
        road: &'a dyn RoadGraph,
        templates: &'a TemplateManager,
    ) -> Self {
        Self {
            manager,
            road,
            templates,
        }
    }

    fn marking(&self, id: MarkingID) -> ApiResult<&Marking> {
        self.manager
            .get(id)
            .ok_or(ApiError::NotFound(Missing::Marking(id)))
    }

    /// The marking, created on first use like the tools do
    fn marking_mut(&mut self, id: MarkingID) -> ApiResult<&mut Marking> {
        self.manager
            .get_or_create(id, self.road)
            .ok_or(ApiError::NotFound(Missing::Marking(id)))
    }

    fn line_id(&self, l: &LineRef) -> ApiResult<LineID> {
        self.marking(l.marking)?
            .try_get_line(l.pair)
            .map(|x| x.id)
            .ok_or(ApiError::NotFound(Missing::Line(*l)))
    }

    fn rule_id(&self, r: &RuleRef) -> ApiResult<RuleID> {
        let m = self.marking(r.line.marking)?;
        let line = m
            .try_get_line(r.line.pair)
            .ok_or(ApiError::NotFound(Missing::Line(r.line)))?;
        line.rules()
            .get(r.index)
            .copied()
            .ok_or(ApiError::NotFound(Missing::Rule(*r)))
    }

    fn edge(&self, marking: MarkingID, e: EdgeRef) -> ApiResult<RuleEdge> {
        Ok(match e {
            EdgeRef::Start => RuleEdge::Start,
            EdgeRef::End => RuleEdge::End,
            EdgeRef::Line(pair) => RuleEdge::Line(self.line_id(&LineRef { marking, pair })?),
        })
    }

    // Points

    pub fn entrances(&mut self, marking: MarkingID) -> ApiResult<Vec<EntranceID>> {
        let m = self.marking_mut(marking)?;
        Ok(m.entrances().iter().map(|e| e.id).collect())
    }

    pub fn point_count(&mut self, marking: MarkingID, entrance: EntranceID, kind: PointKind) -> ApiResult<u8> {
        let m = self.marking_mut(marking)?;
        let e = m
            .entrance(entrance)
            .ok_or(ApiError::NotFound(Missing::Entrance(marking, entrance)))?;
        Ok(e.count(kind))
    }

    pub fn point(
        &mut self,
        marking: MarkingID,
        entrance: EntranceID,
        kind: PointKind,
        index: u8,
    ) -> ApiResult<PointRef> {
        let p = PointRef {
            marking,
            entrance,
            kind,
            index,
        };
        let m = self.marking_mut(marking)?;
        if !m.contains_point(p.id()) {
            return Err(ApiError::NotFound(Missing::Point(p)));
        }
        Ok(p)
    }

    pub fn point_position(&self, p: &PointRef) -> ApiResult<Vec3> {
        self.marking(p.marking)?
            .resolve(p.id())
            .map(|x| x.pos)
            .ok_or(ApiError::NotFound(Missing::Point(*p)))
    }

    pub fn point_offset(&self, p: &PointRef) -> ApiResult<f32> {
        self.marking(p.marking)?
            .point_state(p.id())
            .map(|s| s.offset)
            .ok_or(ApiError::NotFound(Missing::Point(*p)))
    }

    pub fn set_point_offset(&mut self, p: &PointRef, offset: f32) -> ApiResult<()> {
        Ok(self.marking_mut(p.marking)?.set_point_offset(p.id(), offset)?)
    }

    pub fn set_point_split(&mut self, p: &PointRef, split: bool, split_offset: f32) -> ApiResult<()> {
        Ok(self
            .marking_mut(p.marking)?
            .set_point_split(p.id(), split, split_offset)?)
    }

    // Lines

    /// Adds the line the two points make, with `style` or the default one of its kind
    pub fn add_line(&mut self, a: &PointRef, b: &PointRef, style: Option<Style>) -> ApiResult<LineRef> {
        if a.marking != b.marking {
            return Err(ApiError::NotFound(Missing::Point(*b)));
        }
        let pair = PointPair::new(a.id(), b.id());
        let style = match style {
            Some(s) => s,
            None => {
                let kind = LineKind::of_pair(pair)
                    .ok_or(MarkingError::PairNotAllowed(pair))?
                    .style_kind();
                self.templates.default_style_of(kind)
            }
        };
        self.marking_mut(a.marking)?.add_line(pair, Some(style))?;
        Ok(LineRef {
            marking: a.marking,
            pair,
        })
    }

    /// Adds a line styled with a copy of the template
    pub fn add_line_with_template(&mut self, a: &PointRef, b: &PointRef, t: TemplateID) -> ApiResult<LineRef> {
        let pair = PointPair::new(a.id(), b.id());
        let kind = LineKind::of_pair(pair)
            .ok_or(MarkingError::PairNotAllowed(pair))?
            .style_kind();
        if self.templates.get(t).is_none() {
            return Err(ApiError::NotFound(Missing::Template(t)));
        }
        let style = self
            .templates
            .style_for(t, kind)
            .ok_or(ApiError::TemplateMismatch(t))?;
        self.add_line(a, b, Some(style))
    }

    pub fn line(&self, a: &PointRef, b: &PointRef) -> ApiResult<LineRef> {
        let l = LineRef {
            marking: a.marking,
            pair: PointPair::new(a.id(), b.id()),
        };
        self.line_id(&l)?;
        Ok(l)
    }

    pub fn lines(&self, marking: MarkingID) -> ApiResult<Vec<LineRef>> {
        Ok(self
            .marking(marking)?
            .lines()
            .map(|l| LineRef {
                marking,
                pair: l.pair,
            })
            .collect())
    }

    pub fn line_kind(&self, l: &LineRef) -> ApiResult<LineKind> {
        let id = self.line_id(l)?;
        self.marking(l.marking)?
            .line(id)
            .map(|x| x.kind)
            .ok_or(ApiError::NotFound(Missing::Line(*l)))
    }

    /// What removing the line would take with it
    pub fn line_dependences(&self, l: &LineRef) -> ApiResult<Dependences> {
        let id = self.line_id(l)?;
        Ok(self.marking(l.marking)?.line_dependences(id)?)
    }

    pub fn remove_line(&mut self, l: &LineRef) -> ApiResult<Dependences> {
        let id = self.line_id(l)?;
        Ok(self.marking_mut(l.marking)?.remove_line(id)?)
    }

    pub fn set_line_style(&mut self, l: &LineRef, style: Style) -> ApiResult<()> {
        let id = self.line_id(l)?;
        Ok(self.marking_mut(l.marking)?.set_line_style(id, style)?)
    }

    // Rules

    pub fn rules(&self, l: &LineRef) -> ApiResult<Vec<RuleRef>> {
        let id = self.line_id(l)?;
        let n = self
            .marking(l.marking)?
            .line(id)
            .map_or(0, |x| x.rules().len());
        Ok((0..n).map(|index| RuleRef { line: *l, index }).collect())
    }

    pub fn add_rule(&mut self, l: &LineRef, from: EdgeRef, to: EdgeRef, style: Style) -> ApiResult<RuleRef> {
        let id = self.line_id(l)?;
        let from = self.edge(l.marking, from)?;
        let to = self.edge(l.marking, to)?;
        let m = self.marking_mut(l.marking)?;
        let rule = m.add_rule(id, from, to, style)?;
        let index = m
            .line(id)
            .and_then(|x| x.rules().iter().position(|&r| r == rule))
            .unwrap_or(0);
        Ok(RuleRef { line: *l, index })
    }

    pub fn remove_rule(&mut self, r: &RuleRef) -> ApiResult<()> {
        let id = self.rule_id(r)?;
        Ok(self.marking_mut(r.line.marking)?.remove_rule(id)?)
    }

    pub fn rule_style(&self, r: &RuleRef) -> ApiResult<Style> {
        let id = self.rule_id(r)?;
        self.marking(r.line.marking)?
            .rule(id)
            .map(|x| x.style.clone())
            .ok_or(ApiError::NotFound(Missing::Rule(*r)))
    }

    pub fn is_overlapped(&self, r: &RuleRef) -> ApiResult<bool> {
        let id = self.rule_id(r)?;
        self.marking(r.line.marking)?
            .rule(id)
            .map(|x| x.is_overlapped)
            .ok_or(ApiError::NotFound(Missing::Rule(*r)))
    }

    pub fn set_rule_style(&mut self, r: &RuleRef, style: Style) -> ApiResult<()> {
        let id = self.rule_id(r)?;
        Ok(self.marking_mut(r.line.marking)?.set_rule_style(id, style)?)
    }

    pub fn rule_property(&self, r: &RuleRef, name: &str) -> ApiResult<PropValue> {
        Ok(self.rule_style(r)?.get(name)?)
    }

    /// Sets one property of the rule's style, a wrong name or value leaves it unchanged
    pub fn set_rule_property(&mut self, r: &RuleRef, name: &str, v: PropValue) -> ApiResult<()> {
        let id = self.rule_id(r)?;
        Ok(self
            .marking_mut(r.line.marking)?
            .edit_rule_style(id, |s| s.set(name, v))?)
    }

    /// Changes the style type of the rule, keeping the properties both types have
    pub fn set_rule_style_type(&mut self, r: &RuleRef, t: StyleType) -> ApiResult<()> {
        let mut style = self.templates.default_style(t);
        self.rule_style(r)?.copy_to(&mut style);
        self.set_rule_style(r, style)
    }

    // Crosswalks

    pub fn add_crosswalk(&mut self, a: &PointRef, b: &PointRef, style: Option<Style>) -> ApiResult<LineRef> {
        let pair = PointPair::new(a.id(), b.id());
        let style = style.unwrap_or_else(|| {
            self.templates
                .default_style_of(MarkingKind::Crosswalk)
        });
        self.marking_mut(a.marking)?.add_crosswalk(pair, Some(style))?;
        Ok(LineRef {
            marking: a.marking,
            pair,
        })
    }

    pub fn crosswalk_style(&self, l: &LineRef) -> ApiResult<Style> {
        let id = self.line_id(l)?;
        self.marking(l.marking)?
            .crosswalk_of_line(id)
            .map(|c| c.style.clone())
            .ok_or(ApiError::Marking(NotFound::Crosswalk(id).into()))
    }

    pub fn set_crosswalk_style(&mut self, l: &LineRef, style: Style) -> ApiResult<()> {
        let id = self.line_id(l)?;
        Ok(self.marking_mut(l.marking)?.set_crosswalk_style(id, style)?)
    }

    // Fillers

    pub fn add_filler(&mut self, points: &[PointRef], style: Option<Style>) -> ApiResult<FillerRef> {
        let marking = unwrap_ret!(
            points.first().map(|p| p.marking),
            Err(MarkingError::ContourIncomplete.into())
        );
        if let Some(p) = points.iter().find(|p| p.marking != marking) {
            return Err(ApiError::NotFound(Missing::Point(*p)));
        }
        let vertices = points.iter().map(|p| FillerVertex::Point(p.id())).collect();
        let style = style.unwrap_or_else(|| self.templates.default_style_of(MarkingKind::Filler));
        let id = self.marking_mut(marking)?.add_filler(vertices, Some(style))?;
        Ok(FillerRef { marking, id })
    }

    pub fn fillers(&self, marking: MarkingID) -> ApiResult<Vec<FillerRef>> {
        Ok(self
            .marking(marking)?
            .fillers()
            .map(|f| FillerRef { marking, id: f.id })
            .collect())
    }

    pub fn filler_style(&self, f: &FillerRef) -> ApiResult<Style> {
        self.marking(f.marking)?
            .filler(f.id)
            .map(|x| x.style.clone())
            .ok_or(ApiError::NotFound(Missing::Filler(*f)))
    }

    pub fn set_filler_style(&mut self, f: &FillerRef, style: Style) -> ApiResult<()> {
        let m = self.marking_mut(f.marking)?;
        m.set_filler_style(f.id, style).map_err(|e| match e {
            MarkingError::NotFound(_) => ApiError::NotFound(Missing::Filler(*f)),
            e => e.into(),
        })
    }

    pub fn remove_filler(&mut self, f: &FillerRef) -> ApiResult<()> {
        let m = self.marking_mut(f.marking)?;
        m.remove_filler(f.id)
            .map(|_| ())
            .map_err(|_| ApiError::NotFound(Missing::Filler(*f)))
    }

    // Whole marking

    pub fn clear(&mut self, marking: MarkingID) -> ApiResult<()> {
        self.marking_mut(marking)?.clear();
        Ok(())
    }

    pub fn reset_offsets(&mut self, marking: MarkingID) -> ApiResult<()> {
        self.marking_mut(marking)?.reset_offsets();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticRoadGraph;
    use geom::{vec2, Vec3};

    const N: MarkingID = MarkingID::Node(0);
    const E1: EntranceID = EntranceID(1);
    const E2: EntranceID = EntranceID(2);

    fn road() -> StaticRoadGraph {
        let mut g = StaticRoadGraph::default();
        g.add_node(0, Vec3::ZERO, &[(E1, vec2(1.0, 0.0)), (E2, vec2(0.0, 1.0))], 1);
        g
    }

    #[test]
    fn stale_refs_are_not_found() {
        let road = road();
        let templates = TemplateManager::new();
        let mut manager = MarkingManager::new();
        let mut api = MarkingApi::new(&mut manager, &road, &templates);

        let a = api.point(N, E1, PointKind::Enter, 1).unwrap();
        let b = api.point(N, E2, PointKind::Enter, 3).unwrap();
        let l = api.add_line(&a, &b, None).unwrap();
        assert_eq!(api.line_kind(&l).unwrap(), LineKind::Regular);
        assert_eq!(api.line(&b, &a).unwrap(), l);
        assert_eq!(api.rules(&l).unwrap().len(), 1);

        api.remove_line(&l).unwrap();
        assert_eq!(api.line_kind(&l), Err(ApiError::NotFound(Missing::Line(l))));

        assert!(matches!(
            api.point(N, E1, PointKind::Enter, 9),
            Err(ApiError::NotFound(Missing::Point(_)))
        ));
        assert_eq!(
            api.entrances(MarkingID::Segment(4)),
            Err(ApiError::NotFound(Missing::Marking(MarkingID::Segment(4))))
        );
    }

    #[test]
    fn property_edits_go_through_the_style() {
        let road = road();
        let templates = TemplateManager::new();
        let mut manager = MarkingManager::new();
        let mut api = MarkingApi::new(&mut manager, &road, &templates);

        let a = api.point(N, E1, PointKind::Enter, 1).unwrap();
        let b = api.point(N, E2, PointKind::Enter, 3).unwrap();
        let l = api.add_line(&a, &b, None).unwrap();
        let r = api.rules(&l).unwrap()[0];

        api.set_rule_property(&r, "Width", PropValue::Float(0.3)).unwrap();
        assert_eq!(api.rule_property(&r, "Width").unwrap(), PropValue::Float(0.3));
        assert!(matches!(
            api.set_rule_property(&r, "Nope", PropValue::Float(1.0)),
            Err(ApiError::Marking(MarkingError::Style(StyleError::UnknownProperty(_))))
        ));

        api.set_rule_style_type(&r, StyleType::RegularSolid).unwrap();
        let s = api.rule_style(&r).unwrap();
        assert_eq!(s.style_type(), StyleType::RegularSolid);
        assert_eq!(s.get("Width").unwrap(), PropValue::Float(0.3));
    }

    #[test]
    fn template_must_match_the_line() {
        let road = road();
        let mut templates = TemplateManager::new();
        let t = templates.add("zebra", StyleType::CrosswalkZebra.default_style());
        let mut manager = MarkingManager::new();
        let mut api = MarkingApi::new(&mut manager, &road, &templates);

        let a = api.point(N, E1, PointKind::Enter, 1).unwrap();
        let b = api.point(N, E2, PointKind::Enter, 3).unwrap();
        assert_eq!(
            api.add_line_with_template(&a, &b, t),
            Err(ApiError::TemplateMismatch(t))
        );
    }
}
