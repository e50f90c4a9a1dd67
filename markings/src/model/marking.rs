use super::rule;
use crate::{
    Crosswalk, Entrance, EntranceID, EntranceSource, Filler, FillerContour, FillerID,
    FillerVertex, LineID, LineKind, LineRule, MarkingError, MarkingID, MarkingKind, MarkingLine,
    MarkingResult, NotFound, PointID, PointKind, PointPair, PointPosition, PointState, RuleEdge,
    RuleID, Style, Trajectory, MAX_POINT_OFFSET,
};
use geom::Vec3;
use slotmapd::SlotMap;
use std::collections::{BTreeMap, BTreeSet};

/// Tangent length of regular line curves, relative to the chord
const LINE_SMOOTHNESS: f32 = 0.4;
const EDGE_EPS: f32 = 1e-3;
const MIN_REACH: f32 = 1.0;

/// What must be rebuilt before the marking is drawn again
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtySet {
    pub all: bool,
    pub lines: BTreeSet<LineID>,
    pub crosswalks: BTreeSet<LineID>,
    pub fillers: BTreeSet<FillerID>,
}

impl DirtySet {
    pub fn is_empty(&self) -> bool {
        !self.all && self.lines.is_empty() && self.crosswalks.is_empty() && self.fillers.is_empty()
    }
}

/// What removing a line or an entrance takes with it
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Dependences {
    pub lines: usize,
    /// Rules of other lines that used the line as an edge
    pub rules: usize,
    pub fillers: usize,
    pub crosswalks: usize,
    /// Crosswalk border references to the line
    pub borders: usize,
}

impl Dependences {
    pub fn total(&self) -> usize {
        self.lines + self.rules + self.fillers + self.crosswalks + self.borders
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl std::ops::AddAssign for Dependences {
    fn add_assign(&mut self, rhs: Self) {
        self.lines += rhs.lines;
        self.rules += rhs.rules;
        self.fillers += rhs.fillers;
        self.crosswalks += rhs.crosswalks;
        self.borders += rhs.borders;
    }
}

/// All the markings of one node or segment
pub struct Marking {
    pub(crate) id: MarkingID,
    /// Sorted by angle around the marking
    pub(crate) entrances: Vec<Entrance>,
    pub(crate) lines: SlotMap<LineID, MarkingLine>,
    pub(crate) pairs: BTreeMap<PointPair, LineID>,
    pub(crate) rules: SlotMap<RuleID, LineRule>,
    pub(crate) crosswalks: BTreeMap<LineID, Crosswalk>,
    pub(crate) fillers: SlotMap<FillerID, Filler>,
    pub(crate) dirty: DirtySet,
    pub(crate) changed: bool,
}

impl Marking {
    pub fn new(id: MarkingID, sources: Vec<EntranceSource>) -> Self {
        let mut m = Self::empty(id);
        m.update_entrances(sources);
        m
    }

    pub(crate) fn empty(id: MarkingID) -> Self {
        Self {
            id,
            entrances: vec![],
            lines: SlotMap::with_key(),
            pairs: BTreeMap::new(),
            rules: SlotMap::with_key(),
            crosswalks: BTreeMap::new(),
            fillers: SlotMap::with_key(),
            dirty: DirtySet {
                all: true,
                ..Default::default()
            },
            changed: true,
        }
    }

    pub fn id(&self) -> MarkingID {
        self.id
    }

    // Entrances and points

    /// Replaces the road geometry. Point states of entrances that survive are kept,
    /// lines and fillers whose points disappeared are removed with their dependents.
    pub fn update_entrances(&mut self, sources: Vec<EntranceSource>) -> Dependences {
        info!("update entrances of {:?}", self.id);

        let mut old: BTreeMap<EntranceID, Entrance> =
            self.entrances.drain(..).map(|e| (e.id, e)).collect();
        for source in sources {
            let e = match old.remove(&source.id) {
                Some(mut e) => {
                    e.set_source(source);
                    e
                }
                None => Entrance::new(source),
            };
            self.entrances.push(e);
        }
        self.entrances.sort_by(|a, b| {
            let aa = a.dir().map(geom::pseudo_angle).unwrap_or(0.0);
            let bb = b.dir().map(geom::pseudo_angle).unwrap_or(0.0);
            aa.total_cmp(&bb).then(a.id.cmp(&b.id))
        });
        self.update_reach();

        let mut deps = Dependences::default();
        let stale: Vec<LineID> = self
            .lines
            .values()
            .filter(|l| !l.pair.points().iter().all(|&p| self.contains_point(p)))
            .map(|l| l.id)
            .collect();
        for line in stale {
            deps += unwrap_cont!(self.remove_line_inner(line).ok());
            deps.lines += 1;
        }

        let stale_fillers: Vec<FillerID> = self
            .fillers
            .values()
            .filter(|f| {
                f.contour
                    .raw_vertices()
                    .iter()
                    .filter_map(FillerVertex::point)
                    .any(|p| !self.contains_point(p))
            })
            .map(|f| f.id)
            .collect();
        deps.fillers += stale_fillers.len();
        for f in stale_fillers {
            self.fillers.remove(f);
        }

        self.refresh_geometry();
        self.check_invariants();
        deps
    }

    /// How far normal points are pushed back: across the whole marking
    fn update_reach(&mut self) {
        let ends: Vec<(EntranceID, Vec3)> = self
            .entrances
            .iter()
            .filter_map(|e| Some((e.id, e.position()?)))
            .collect();
        for e in &mut self.entrances {
            let (Some(pos), Some(dir)) = (e.position(), e.dir()) else {
                continue;
            };
            let reach = ends
                .iter()
                .filter(|(id, _)| *id != e.id)
                .map(|(_, p)| (*p - pos).xy().dot(-dir))
                .fold(MIN_REACH, f32::max);
            e.set_reach(reach);
        }
    }

    /// Whether every entrance has road geometry
    pub fn is_resolved(&self) -> bool {
        self.entrances.iter().all(Entrance::is_resolved)
    }

    pub fn entrances(&self) -> &[Entrance] {
        &self.entrances
    }

    pub fn entrance(&self, id: EntranceID) -> Option<&Entrance> {
        self.entrances.iter().find(|e| e.id == id)
    }

    fn entrance_mut(&mut self, id: EntranceID) -> Option<&mut Entrance> {
        self.entrances.iter_mut().find(|e| e.id == id)
    }

    pub fn contains_point(&self, p: PointID) -> bool {
        self.entrance(p.entrance).map_or(false, |e| e.contains(p))
    }

    pub fn points(&self) -> impl Iterator<Item = PointID> + '_ {
        self.entrances.iter().flat_map(Entrance::points)
    }

    pub fn resolve(&self, p: PointID) -> Option<PointPosition> {
        self.entrance(p.entrance)?.resolve(p)
    }

    pub fn point_state(&self, p: PointID) -> Option<&PointState> {
        self.entrance(p.entrance)?.state(p)
    }

    /// Points that share their state with `p`
    fn state_siblings(p: PointID) -> [PointID; 3] {
        [
            p.with_kind(PointKind::Enter),
            p.with_kind(PointKind::Normal),
            p.with_kind(PointKind::Crosswalk),
        ]
    }

    fn edit_point(&mut self, p: PointID, f: impl FnOnce(&mut PointState)) -> MarkingResult<()> {
        if !self.contains_point(p) {
            return Err(NotFound::Point(p).into());
        }
        let e = self
            .entrance_mut(p.entrance)
            .ok_or(NotFound::Entrance(p.entrance))?;
        let state = e.state_mut(p).ok_or(MarkingError::NoPointState(p))?;
        f(state);
        self.point_moved(p);
        self.check_invariants();
        Ok(())
    }

    /// Moves a point along its entrance, clamped to `MAX_POINT_OFFSET`
    pub fn set_point_offset(&mut self, p: PointID, offset: f32) -> MarkingResult<()> {
        info!("set offset of {:?} to {}", p, offset);
        self.edit_point(p, |s| {
            s.offset = offset.clamp(-MAX_POINT_OFFSET, MAX_POINT_OFFSET)
        })
    }

    pub fn set_point_split(&mut self, p: PointID, split: bool, split_offset: f32) -> MarkingResult<()> {
        info!("set split of {:?} to {} ({})", p, split, split_offset);
        self.edit_point(p, |s| {
            s.split = split;
            s.split_offset = split_offset.clamp(0.0, MAX_POINT_OFFSET);
        })
    }

    /// Puts every point back on its lane border
    pub fn reset_offsets(&mut self) {
        info!("reset offsets of {:?}", self.id);
        for e in &mut self.entrances {
            e.reset_states();
        }
        self.refresh_geometry();
    }

    /// Invalidates what depends on the position of `p`
    fn point_moved(&mut self, p: PointID) {
        let siblings = Self::state_siblings(p);
        let moved: BTreeSet<LineID> = self
            .lines
            .values()
            .filter(|l| siblings.iter().any(|&s| l.pair.contains(s)))
            .map(|l| l.id)
            .collect();

        let mut lines = moved.clone();
        for r in self.rules.values() {
            if moved.iter().any(|&m| r.uses_line(m)) {
                lines.insert(r.line);
            }
        }
        for &l in &lines {
            self.update_overlaps(l);
        }

        let crosswalks: Vec<LineID> = self
            .crosswalks
            .values()
            .filter(|c| lines.contains(&c.line) || lines.iter().any(|&l| c.uses_border(l)))
            .map(|c| c.line)
            .collect();

        self.dirty.lines.extend(lines.iter().copied());
        self.dirty.crosswalks.extend(crosswalks);
        self.changed = true;

        let fillers: Vec<FillerID> = self
            .fillers
            .values()
            .filter(|f| {
                siblings.iter().any(|&s| f.contour.uses_point(s))
                    || lines
                        .iter()
                        .any(|&l| f.contour.uses_line(l) || f.contour.guided_by(l))
            })
            .map(|f| f.id)
            .collect();
        self.recompute_fillers(&fillers);
    }

    /// Recomputes everything derived from positions
    fn refresh_geometry(&mut self) {
        let lines: Vec<LineID> = self.lines.keys().collect();
        for l in lines {
            self.update_overlaps(l);
        }
        let fillers: Vec<FillerID> = self.fillers.keys().collect();
        self.recompute_fillers(&fillers);
        self.mark_all_dirty();
    }

    fn recompute_fillers(&mut self, ids: &[FillerID]) {
        for &id in ids {
            let Some(mut contour) = self.fillers.get(id).map(|f| f.contour.clone()) else {
                continue;
            };
            contour.recompute(self);
            if let Some(f) = self.fillers.get_mut(id) {
                f.contour = contour;
            }
            self.dirty.fillers.insert(id);
        }
        self.changed = true;
    }

    // Lines

    pub fn lines(&self) -> impl Iterator<Item = &MarkingLine> {
        self.lines.values()
    }

    pub fn line(&self, id: LineID) -> Option<&MarkingLine> {
        self.lines.get(id)
    }

    pub fn try_get_line(&self, pair: PointPair) -> Option<&MarkingLine> {
        self.lines.get(*self.pairs.get(&pair)?)
    }

    pub fn exists_line(&self, pair: PointPair) -> bool {
        self.pairs.contains_key(&pair)
    }

    pub fn lines_of_point(&self, p: PointID) -> impl Iterator<Item = &MarkingLine> {
        self.lines.values().filter(move |l| l.pair.contains(p))
    }

    /// The path of the line, from `pair.first()` to `pair.second()`
    pub fn line_trajectory(&self, id: LineID) -> Option<Trajectory> {
        let line = self.lines.get(id)?;
        self.pair_trajectory(line.pair, line.kind)
    }

    fn pair_trajectory(&self, pair: PointPair, kind: LineKind) -> Option<Trajectory> {
        let (a, b) = (pair.first(), pair.second());
        let ca = self.resolve(a)?;
        let cb = self.resolve(b)?;
        let ra = self.entrance(a.entrance)?.resolve_toward(a, cb.pos)?;
        let rb = self.entrance(b.entrance)?.resolve_toward(b, ca.pos)?;
        Some(match kind {
            LineKind::Stop | LineKind::Crosswalk | LineKind::Normal => {
                Trajectory::straight(ra.pos, rb.pos)
            }
            LineKind::Regular | LineKind::Lane => {
                Trajectory::curve(ra.pos, -ra.dir, rb.pos, rb.dir, LINE_SMOOTHNESS)
            }
        })
    }

    fn check_pair(&self, pair: PointPair) -> MarkingResult<LineKind> {
        if pair.is_degenerate() {
            return Err(MarkingError::SamePoint);
        }
        for p in pair.points() {
            if !self.contains_point(p) {
                return Err(NotFound::Point(p).into());
            }
        }
        if self.pairs.contains_key(&pair) {
            return Err(MarkingError::LineExists(pair));
        }
        LineKind::of_pair(pair).ok_or(MarkingError::PairNotAllowed(pair))
    }

    /// Adds a line of the kind the pair makes, with a single full-range rule (or a crosswalk).
    /// Without a style the kind's default style is used.
    pub fn add_line(&mut self, pair: PointPair, style: Option<Style>) -> MarkingResult<LineID> {
        let kind = self.check_pair(pair)?;
        let style = match style {
            Some(s) => {
                if s.kind() != kind.style_kind() {
                    return Err(MarkingError::StyleMismatch {
                        style: s.kind(),
                        target: kind.style_kind(),
                    });
                }
                s
            }
            None => Style::default_of(kind.style_kind()),
        };

        let id = self.lines.insert_with_key(|id| MarkingLine {
            id,
            pair,
            kind,
            rules: vec![],
        });
        self.pairs.insert(pair, id);
        info!("add {:?} line {:?} on {:?}", kind, id, pair);

        if kind.has_rules() {
            self.push_rule(id, RuleEdge::Start, RuleEdge::End, style);
        } else {
            let (left, right) = self.detect_borders(pair);
            self.crosswalks.insert(
                id,
                Crosswalk {
                    line: id,
                    style,
                    left_border: left,
                    right_border: right,
                },
            );
            self.dirty.crosswalks.insert(id);
        }
        if kind == LineKind::Regular {
            self.attach_border(id);
        }

        // the new line is a potential edge of every line it crosses
        let others: Vec<LineID> = self.lines.keys().filter(|&l| l != id).collect();
        for l in others {
            if self.edge_t(l, RuleEdge::Line(id)).is_some() {
                self.dirty.lines.insert(l);
            }
        }

        self.dirty.lines.insert(id);
        self.changed = true;
        self.check_invariants();
        Ok(id)
    }

    fn add_line_of_kind(
        &mut self,
        expected: LineKind,
        pair: PointPair,
        style: Option<Style>,
    ) -> MarkingResult<LineID> {
        if let Some(found) = LineKind::of_pair(pair) {
            if found != expected {
                return Err(MarkingError::WrongLineKind { expected, found });
            }
        }
        self.add_line(pair, style)
    }

    pub fn add_regular_line(&mut self, pair: PointPair, style: Option<Style>) -> MarkingResult<LineID> {
        self.add_line_of_kind(LineKind::Regular, pair, style)
    }

    pub fn add_stop_line(&mut self, pair: PointPair, style: Option<Style>) -> MarkingResult<LineID> {
        self.add_line_of_kind(LineKind::Stop, pair, style)
    }

    pub fn add_normal_line(&mut self, pair: PointPair, style: Option<Style>) -> MarkingResult<LineID> {
        self.add_line_of_kind(LineKind::Normal, pair, style)
    }

    pub fn add_lane_line(&mut self, pair: PointPair, style: Option<Style>) -> MarkingResult<LineID> {
        self.add_line_of_kind(LineKind::Lane, pair, style)
    }

    pub fn add_crosswalk(&mut self, pair: PointPair, style: Option<Style>) -> MarkingResult<LineID> {
        self.add_line_of_kind(LineKind::Crosswalk, pair, style)
    }

    /// Removes a line and everything that depends on it, returns what was removed
    pub fn remove_line(&mut self, id: LineID) -> MarkingResult<Dependences> {
        info!("remove line {:?}", id);
        let deps = self.remove_line_inner(id)?;
        self.check_invariants();
        Ok(deps)
    }

    fn remove_line_inner(&mut self, id: LineID) -> MarkingResult<Dependences> {
        let deps = self.line_dependences(id)?;
        let line = self.lines.remove(id).ok_or(NotFound::Line(id))?;
        self.pairs.remove(&line.pair);
        for r in &line.rules {
            self.rules.remove(*r);
        }
        self.crosswalks.remove(&id);
        self.dirty.lines.insert(id);
        self.dirty.crosswalks.insert(id);

        for c in self.crosswalks.values_mut() {
            if c.clear_border(id) > 0 {
                self.dirty.crosswalks.insert(c.line);
            }
        }

        let edge_rules: Vec<RuleID> = self
            .rules
            .values()
            .filter(|r| r.uses_line(id))
            .map(|r| r.id)
            .collect();
        let mut touched = BTreeSet::new();
        for r in edge_rules {
            let rule = unwrap_cont!(self.rules.remove(r));
            let l = unwrap_contlog!(
                self.lines.get_mut(rule.line),
                "rule {:?} belongs to no line",
                r
            );
            l.rules.retain(|&x| x != r);
            touched.insert(rule.line);
        }
        for l in touched {
            let kind = unwrap_cont!(self.lines.get(l)).kind;
            if self.lines[l].rules.is_empty() {
                self.push_rule(
                    l,
                    RuleEdge::Start,
                    RuleEdge::End,
                    Style::default_of(kind.style_kind()),
                );
            }
            self.update_overlaps(l);
            self.dirty.lines.insert(l);
        }

        let fillers: Vec<FillerID> = self
            .fillers
            .values()
            .filter(|f| f.contour.uses_line(id))
            .map(|f| f.id)
            .collect();
        for f in fillers {
            self.fillers.remove(f);
            self.dirty.fillers.insert(f);
        }
        let guided: Vec<FillerID> = self
            .fillers
            .values()
            .filter(|f| f.contour.guided_by(id))
            .map(|f| f.id)
            .collect();
        self.recompute_fillers(&guided);

        self.changed = true;
        Ok(deps)
    }

    /// What `remove_line` would take with the line, to warn before deleting
    pub fn line_dependences(&self, id: LineID) -> MarkingResult<Dependences> {
        if !self.lines.contains_key(id) {
            return Err(NotFound::Line(id).into());
        }
        let mut d = Dependences {
            rules: self.rules.values().filter(|r| r.uses_line(id)).count(),
            fillers: self
                .fillers
                .values()
                .filter(|f| f.contour.uses_line(id))
                .count(),
            crosswalks: self.crosswalks.contains_key(&id) as usize,
            ..Default::default()
        };
        for c in self.crosswalks.values() {
            d.borders += (c.left_border == Some(id)) as usize + (c.right_border == Some(id)) as usize;
        }
        Ok(d)
    }

    /// What removing every line touching the entrance would take
    pub fn dependences_of_entrance(&self, e: EntranceID) -> Dependences {
        let mut d = Dependences::default();
        for l in self.lines.values().filter(|l| l.pair.contains_entrance(e)) {
            d.lines += 1;
            if let Ok(x) = self.line_dependences(l.id) {
                d += x;
            }
        }
        d.fillers += self
            .fillers
            .values()
            .filter(|f| {
                f.contour
                    .raw_vertices()
                    .iter()
                    .filter_map(FillerVertex::point)
                    .any(|p| p.entrance == e)
            })
            .count();
        d
    }

    /// Applies a copy of `style` to every rule of the line, or to its crosswalk
    pub fn set_line_style(&mut self, id: LineID, style: Style) -> MarkingResult<()> {
        let line = self.lines.get(id).ok_or(NotFound::Line(id))?;
        let target = line.kind.style_kind();
        if style.kind() != target {
            return Err(MarkingError::StyleMismatch {
                style: style.kind(),
                target,
            });
        }
        info!("set style of line {:?} to {:?}", id, style.style_type());
        if let Some(c) = self.crosswalks.get_mut(&id) {
            c.style = style;
            self.dirty.crosswalks.insert(id);
        } else {
            for r in line.rules.clone() {
                if let Some(r) = self.rules.get_mut(r) {
                    r.style = style.clone();
                }
            }
            self.dirty.lines.insert(id);
        }
        self.changed = true;
        Ok(())
    }

    /// Replaces the rules of a line by a single full-range rule with the default style
    pub fn reset_line_rules(&mut self, id: LineID) -> MarkingResult<RuleID> {
        let line = self.lines.get_mut(id).ok_or(NotFound::Line(id))?;
        if !line.kind.has_rules() {
            return Err(MarkingError::NoRules(id));
        }
        info!("reset rules of line {:?}", id);
        let kind = line.kind;
        for r in std::mem::take(&mut line.rules) {
            self.rules.remove(r);
        }
        let r = self.push_rule(
            id,
            RuleEdge::Start,
            RuleEdge::End,
            Style::default_of(kind.style_kind()),
        );
        self.dirty.lines.insert(id);
        self.changed = true;
        Ok(r)
    }

    /// Removes every line, crosswalk and filler. Entrances and point states stay.
    pub fn clear(&mut self) {
        info!("clear {:?}", self.id);
        self.lines.clear();
        self.pairs.clear();
        self.rules.clear();
        self.crosswalks.clear();
        self.fillers.clear();
        self.mark_all_dirty();
    }

    // Rules

    pub fn rule(&self, id: RuleID) -> Option<&LineRule> {
        self.rules.get(id)
    }

    /// The rules of the line in drawing order
    pub fn rules_of(&self, line: LineID) -> impl Iterator<Item = &LineRule> {
        self.lines
            .get(line)
            .into_iter()
            .flat_map(|l| l.rules.iter())
            .filter_map(|&r| self.rules.get(r))
    }

    fn crossing(&self, line: LineID, other: LineID) -> Option<(f32, f32)> {
        let a = self.line_trajectory(line)?;
        let b = self.line_trajectory(other)?;
        a.intersect(&b)
            .into_iter()
            .find(|&(t, _)| t > EDGE_EPS && t < 1.0 - EDGE_EPS)
    }

    /// Parameter of an edge along the line, None if the edge doesn't cross it
    pub fn edge_t(&self, line: LineID, edge: RuleEdge) -> Option<f32> {
        match edge {
            RuleEdge::Start => Some(0.0),
            RuleEdge::End => Some(1.0),
            RuleEdge::Line(o) if o == line || !self.lines.contains_key(o) => None,
            RuleEdge::Line(o) => self.crossing(line, o).map(|x| x.0),
        }
    }

    /// Every position rules of the line can start or end at, sorted along the line
    pub fn rule_edges(&self, line: LineID) -> Vec<(RuleEdge, f32)> {
        if !self.lines.contains_key(line) {
            return vec![];
        }
        let mut v = vec![(RuleEdge::Start, 0.0)];
        for o in self.lines.keys() {
            if let Some(t) = self.edge_t(line, RuleEdge::Line(o)) {
                v.push((RuleEdge::Line(o), t));
            }
        }
        v.push((RuleEdge::End, 1.0));
        v.sort_by(|a, b| a.1.total_cmp(&b.1));
        v
    }

    /// Sorted parameters covered by the rule
    pub fn rule_range(&self, id: RuleID) -> Option<(f32, f32)> {
        let r = self.rules.get(id)?;
        let a = self.edge_t(r.line, r.from)?;
        let b = self.edge_t(r.line, r.to)?;
        Some(rule::ordered((a, b)))
    }

    fn push_rule(&mut self, line: LineID, from: RuleEdge, to: RuleEdge, style: Style) -> RuleID {
        let id = self.rules.insert_with_key(|id| LineRule {
            id,
            line,
            from,
            to,
            style,
            is_overlapped: false,
        });
        if let Some(l) = self.lines.get_mut(line) {
            l.rules.push(id);
        }
        id
    }

    fn rule_line(&self, id: RuleID) -> MarkingResult<&MarkingLine> {
        let r = self.rules.get(id).ok_or(NotFound::Rule(id))?;
        Ok(self.lines.get(r.line).ok_or(NotFound::Line(r.line))?)
    }

    fn check_range(&self, line: LineID, from: RuleEdge, to: RuleEdge) -> MarkingResult<()> {
        let a = self
            .edge_t(line, from)
            .ok_or(MarkingError::InvalidEdge(from))?;
        let b = self.edge_t(line, to).ok_or(MarkingError::InvalidEdge(to))?;
        if (a - b).abs() < EDGE_EPS {
            return Err(MarkingError::InvalidEdge(to));
        }
        Ok(())
    }

    fn check_rule_style(&self, line: &MarkingLine, style: &Style) -> MarkingResult<()> {
        if style.kind() != line.kind.style_kind() {
            return Err(MarkingError::StyleMismatch {
                style: style.kind(),
                target: line.kind.style_kind(),
            });
        }
        Ok(())
    }

    /// Adds a rule on top of the line's others
    pub fn add_rule(
        &mut self,
        line: LineID,
        from: RuleEdge,
        to: RuleEdge,
        style: Style,
    ) -> MarkingResult<RuleID> {
        let l = self.lines.get(line).ok_or(NotFound::Line(line))?;
        if !l.kind.has_rules() {
            return Err(MarkingError::NoRules(line));
        }
        self.check_rule_style(l, &style)?;
        self.check_range(line, from, to)?;

        let id = self.push_rule(line, from, to, style);
        info!("add rule {:?} on {:?} from {:?} to {:?}", id, line, from, to);
        self.rule_changed(line);
        Ok(id)
    }

    pub fn remove_rule(&mut self, id: RuleID) -> MarkingResult<()> {
        let line = self.rule_line(id)?;
        if line.rules.len() <= 1 {
            return Err(MarkingError::LastRule);
        }
        let line = line.id;
        info!("remove rule {:?} of {:?}", id, line);
        self.rules.remove(id);
        if let Some(l) = self.lines.get_mut(line) {
            l.rules.retain(|&r| r != id);
        }
        self.rule_changed(line);
        Ok(())
    }

    /// Cuts the rule in two at an interior edge. The new rule covers the part after the edge
    /// and comes right after the original in drawing order.
    pub fn split_rule(&mut self, id: RuleID, at: RuleEdge) -> MarkingResult<RuleID> {
        let line = self.rule_line(id)?.id;
        let (a, b) = self.rule_range(id).ok_or(NotFound::Rule(id))?;
        let t = self.edge_t(line, at).ok_or(MarkingError::InvalidEdge(at))?;
        if t <= a + EDGE_EPS || t >= b - EDGE_EPS {
            return Err(MarkingError::InvalidEdge(at));
        }

        let r = &self.rules[id];
        let (from, to) = (r.from, r.to);
        let ta = self.edge_t(line, from).unwrap_or(0.0);
        let tb = self.edge_t(line, to).unwrap_or(1.0);
        // keep the part from the low end on the original rule
        let (low, high) = if ta <= tb { (from, to) } else { (to, from) };
        let style = r.style.clone();

        if let Some(r) = self.rules.get_mut(id) {
            r.from = low;
            r.to = at;
        }
        let new = self.rules.insert_with_key(|nid| LineRule {
            id: nid,
            line,
            from: at,
            to: high,
            style,
            is_overlapped: false,
        });
        if let Some(l) = self.lines.get_mut(line) {
            let pos = l.rules.iter().position(|&r| r == id).map_or(l.rules.len(), |p| p + 1);
            l.rules.insert(pos, new);
        }
        info!("split rule {:?} at {:?} into {:?}", id, at, new);
        self.rule_changed(line);
        Ok(new)
    }

    pub fn set_rule_from(&mut self, id: RuleID, from: RuleEdge) -> MarkingResult<()> {
        let line = self.rule_line(id)?.id;
        let to = self.rules[id].to;
        self.check_range(line, from, to)?;
        if let Some(r) = self.rules.get_mut(id) {
            r.from = from;
        }
        self.rule_changed(line);
        Ok(())
    }

    pub fn set_rule_to(&mut self, id: RuleID, to: RuleEdge) -> MarkingResult<()> {
        let line = self.rule_line(id)?.id;
        let from = self.rules[id].from;
        self.check_range(line, from, to)?;
        if let Some(r) = self.rules.get_mut(id) {
            r.to = to;
        }
        self.rule_changed(line);
        Ok(())
    }

    pub fn set_rule_style(&mut self, id: RuleID, style: Style) -> MarkingResult<()> {
        let line = self.rule_line(id)?;
        self.check_rule_style(line, &style)?;
        let line = line.id;
        if let Some(r) = self.rules.get_mut(id) {
            r.style = style;
        }
        self.rule_changed(line);
        Ok(())
    }

    /// Edits the rule's style in place, the closure's error leaves it unchanged
    pub fn edit_rule_style<T>(
        &mut self,
        id: RuleID,
        f: impl FnOnce(&mut Style) -> Result<T, crate::StyleError>,
    ) -> MarkingResult<T> {
        let line = self.rule_line(id)?.id;
        let r = self.rules.get_mut(id).ok_or(NotFound::Rule(id))?;
        let mut style = r.style.clone();
        let v = f(&mut style)?;
        r.style = style;
        self.rule_changed(line);
        Ok(v)
    }

    /// Moves the rule to `index` in the line's drawing order, later rules are drawn on top
    pub fn move_rule(&mut self, id: RuleID, index: usize) -> MarkingResult<()> {
        let line = self.rule_line(id)?.id;
        let l = self.lines.get_mut(line).ok_or(NotFound::Line(line))?;
        l.rules.retain(|&r| r != id);
        let index = index.min(l.rules.len());
        l.rules.insert(index, id);
        self.rule_changed(line);
        Ok(())
    }

    fn rule_changed(&mut self, line: LineID) {
        self.update_overlaps(line);
        self.dirty.lines.insert(line);
        self.changed = true;
        self.check_invariants();
    }

    /// Flags the rules of the line sharing part of their range with another rule.
    /// Rules whose edges don't cross the line anymore take no part.
    fn update_overlaps(&mut self, line: LineID) {
        let ids: Vec<RuleID> = unwrap_ret!(self.lines.get(line)).rules.clone();
        let ranges: Vec<Option<(f32, f32)>> = ids.iter().map(|&r| self.rule_range(r)).collect();
        let valid: Vec<(f32, f32)> = ranges.iter().flatten().copied().collect();
        let mut flags = rule::overlaps(&valid).into_iter();
        for (id, range) in ids.into_iter().zip(ranges) {
            let o = range.is_some() && flags.next().unwrap_or(false);
            if let Some(r) = self.rules.get_mut(id) {
                r.is_overlapped = o;
            }
        }
    }

    // Crosswalks

    pub fn crosswalks(&self) -> impl Iterator<Item = &Crosswalk> {
        self.crosswalks.values()
    }

    pub fn crosswalk_of_line(&self, line: LineID) -> Option<&Crosswalk> {
        self.crosswalks.get(&line)
    }

    /// Enter points under the two ends of a crosswalk, lowest index first
    fn crosswalk_feet(pair: PointPair) -> [PointID; 2] {
        [
            pair.first().with_kind(PointKind::Enter),
            pair.second().with_kind(PointKind::Enter),
        ]
    }

    /// The regular lines starting from the feet of a crosswalk
    fn detect_borders(&self, pair: PointPair) -> (Option<LineID>, Option<LineID>) {
        let [l, r] = Self::crosswalk_feet(pair);
        let find = |p: PointID| {
            self.lines_of_point(p)
                .find(|x| x.kind == LineKind::Regular)
                .map(|x| x.id)
        };
        (find(l), find(r))
    }

    /// Gives a new regular line to the crosswalks missing a border at its ends
    fn attach_border(&mut self, line: LineID) {
        let pair = unwrap_ret!(self.lines.get(line)).pair;
        for c in self.crosswalks.values_mut() {
            let cpair = unwrap_cont!(self.lines.get(c.line)).pair;
            let [l, r] = Self::crosswalk_feet(cpair);
            let mut changed = false;
            if c.left_border.is_none() && pair.contains(l) {
                c.left_border = Some(line);
                changed = true;
            }
            if c.right_border.is_none() && pair.contains(r) {
                c.right_border = Some(line);
                changed = true;
            }
            if changed {
                self.dirty.crosswalks.insert(c.line);
            }
        }
    }

    pub fn set_crosswalk_borders(
        &mut self,
        line: LineID,
        left: Option<LineID>,
        right: Option<LineID>,
    ) -> MarkingResult<()> {
        let cpair = self.lines.get(line).ok_or(NotFound::Line(line))?.pair;
        if !self.crosswalks.contains_key(&line) {
            return Err(NotFound::Crosswalk(line).into());
        }
        let [l, r] = Self::crosswalk_feet(cpair);
        for (border, foot) in [(left, l), (right, r)] {
            let Some(b) = border else {
                continue;
            };
            let bl = self.lines.get(b).ok_or(NotFound::Line(b))?;
            if bl.kind != LineKind::Regular || !bl.pair.contains(foot) {
                return Err(MarkingError::InvalidBorder(b));
            }
        }
        info!("set borders of crosswalk {:?} to {:?} {:?}", line, left, right);
        if let Some(c) = self.crosswalks.get_mut(&line) {
            c.left_border = left;
            c.right_border = right;
        }
        self.dirty.crosswalks.insert(line);
        self.changed = true;
        Ok(())
    }

    // Fillers

    pub fn fillers(&self) -> impl Iterator<Item = &Filler> {
        self.fillers.values()
    }

    pub fn filler(&self, id: FillerID) -> Option<&Filler> {
        self.fillers.get(id)
    }

    /// Position of a filler vertex, None if its point or lines are gone
    pub fn vertex_position(&self, v: FillerVertex) -> Option<Vec3> {
        match v {
            FillerVertex::Point(p) => Some(self.resolve(p)?.pos),
            FillerVertex::Intersect(a, b) => {
                let (t, _) = self.vertex_crossing(a, b)?;
                Some(self.line_trajectory(a)?.position(t))
            }
        }
    }

    fn vertex_crossing(&self, a: LineID, b: LineID) -> Option<(f32, f32)> {
        if a == b {
            return None;
        }
        let ta = self.line_trajectory(a)?;
        let tb = self.line_trajectory(b)?;
        ta.intersect(&tb).into_iter().next()
    }

    /// The lines a vertex lies on, with its parameter along each
    pub fn vertex_lines(&self, v: FillerVertex) -> Vec<(LineID, f32)> {
        match v {
            FillerVertex::Point(p) => self
                .lines_of_point(p)
                .filter(|l| l.kind.has_rules())
                .map(|l| (l.id, if l.pair.first() == p { 0.0 } else { 1.0 }))
                .collect(),
            FillerVertex::Intersect(a, b) => match self.vertex_crossing(a, b) {
                Some((ta, tb)) => vec![(a, ta), (b, tb)],
                None => vec![],
            },
        }
    }

    pub fn add_filler(&mut self, vertices: Vec<FillerVertex>, style: Option<Style>) -> MarkingResult<FillerID> {
        let style = style.unwrap_or_else(|| Style::default_of(MarkingKind::Filler));
        if style.kind() != MarkingKind::Filler {
            return Err(MarkingError::StyleMismatch {
                style: style.kind(),
                target: MarkingKind::Filler,
            });
        }
        for v in &vertices {
            match *v {
                FillerVertex::Point(p) if !self.contains_point(p) => {
                    return Err(NotFound::Point(p).into())
                }
                FillerVertex::Intersect(a, b) => {
                    for l in [a, b] {
                        if !self.lines.contains_key(l) {
                            return Err(NotFound::Line(l).into());
                        }
                    }
                }
                _ => {}
            }
        }
        let contour = FillerContour::new(self, vertices);
        if !contour.is_complete() {
            return Err(MarkingError::ContourIncomplete);
        }
        let id = self.fillers.insert_with_key(|id| Filler { id, contour, style });
        info!("add filler {:?}", id);
        self.dirty.fillers.insert(id);
        self.changed = true;
        self.check_invariants();
        Ok(id)
    }

    pub fn remove_filler(&mut self, id: FillerID) -> MarkingResult<Filler> {
        let f = self.fillers.remove(id).ok_or(NotFound::Filler(id))?;
        info!("remove filler {:?}", id);
        self.dirty.fillers.insert(id);
        self.changed = true;
        Ok(f)
    }

    pub fn set_filler_style(&mut self, id: FillerID, style: Style) -> MarkingResult<()> {
        if style.kind() != MarkingKind::Filler {
            return Err(MarkingError::StyleMismatch {
                style: style.kind(),
                target: MarkingKind::Filler,
            });
        }
        let f = self.fillers.get_mut(id).ok_or(NotFound::Filler(id))?;
        f.style = style;
        self.dirty.fillers.insert(id);
        self.changed = true;
        Ok(())
    }

    pub fn set_crosswalk_style(&mut self, line: LineID, style: Style) -> MarkingResult<()> {
        if !self.crosswalks.contains_key(&line) {
            return Err(NotFound::Crosswalk(line).into());
        }
        self.set_line_style(line, style)
    }

    // Change tracking

    pub fn mark_all_dirty(&mut self) {
        self.dirty.all = true;
        self.changed = true;
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn take_dirty(&mut self) -> DirtySet {
        std::mem::take(&mut self.dirty)
    }

    /// Whether the marking changed since the last call
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }

    #[cfg(not(debug_assertions))]
    pub fn check_invariants(&self) {}

    #[cfg(debug_assertions)]
    pub fn check_invariants(&self) {
        assert_eq!(self.pairs.len(), self.lines.len());
        for line in self.lines.values() {
            assert_eq!(self.pairs.get(&line.pair), Some(&line.id));
            assert_eq!(LineKind::of_pair(line.pair), Some(line.kind));
            if line.kind.has_rules() {
                assert!(!line.rules.is_empty(), "line {:?} has no rules", line.id);
            } else {
                assert!(self.crosswalks.contains_key(&line.id));
            }
            for &r in &line.rules {
                let rule = self.rules.get(r).expect("rule does not exist");
                assert_eq!(rule.line, line.id);
                assert_eq!(rule.style.kind(), line.kind.style_kind());
            }
        }
        let n_rules: usize = self.lines.values().map(|l| l.rules.len()).sum();
        assert_eq!(n_rules, self.rules.len());

        for c in self.crosswalks.values() {
            assert!(self.lines.contains_key(c.line));
            for b in [c.left_border, c.right_border].into_iter().flatten() {
                assert!(self.lines.contains_key(b), "dangling border {:?}", b);
            }
        }
        for f in self.fillers.values() {
            for v in f.contour.raw_vertices() {
                if let FillerVertex::Intersect(a, b) = v {
                    assert!(self.lines.contains_key(*a) && self.lines.contains_key(*b));
                }
            }
        }
    }
}
