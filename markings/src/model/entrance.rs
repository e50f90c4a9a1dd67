use crate::{EntranceID, EntranceSource, PointID, PointKind, PointPosition};
use geom::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// User editable state of an enter point
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointState {
    /// Lateral shift from the lane border, along the entrance normal
    pub offset: f32,
    /// A split point resolves to two positions `split_offset` apart
    pub split: bool,
    pub split_offset: f32,
}

impl Default for PointState {
    fn default() -> Self {
        Self {
            offset: 0.0,
            split: false,
            split_offset: 0.5,
        }
    }
}

pub const MAX_POINT_OFFSET: f32 = 20.0;

/// One road end of a marking. Holds the road geometry last given by the road graph
/// and the per point state, positions are derived from both on demand.
#[derive(Clone, Debug)]
pub struct Entrance {
    pub id: EntranceID,
    source: Option<EntranceSource>,
    boundaries: Vec<f32>,
    lanes: Vec<f32>,
    states: Vec<PointState>,
    reach: f32,
}

impl Entrance {
    pub fn new(source: EntranceSource) -> Self {
        let mut e = Self::unresolved(source.id, vec![]);
        e.set_source(source);
        e
    }

    /// An entrance restored from a save, waiting for its geometry
    pub fn unresolved(id: EntranceID, states: Vec<PointState>) -> Self {
        Self {
            id,
            source: None,
            boundaries: vec![],
            lanes: vec![],
            states,
            reach: 0.0,
        }
    }

    /// Replaces the road geometry, keeping the state of the enter points that still exist
    pub fn set_source(&mut self, source: EntranceSource) {
        self.boundaries = source.boundaries();
        self.lanes = source.lane_centers();
        self.states.resize(self.boundaries.len(), PointState::default());
        self.source = Some(source);
    }

    pub fn source(&self) -> Option<&EntranceSource> {
        self.source.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.source.is_some()
    }

    pub fn position(&self) -> Option<Vec3> {
        self.source.as_ref().map(|s| s.position)
    }

    pub fn dir(&self) -> Option<Vec2> {
        self.source.as_ref().map(|s| s.dir)
    }

    pub fn road_half_width(&self) -> f32 {
        self.boundaries
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    pub(crate) fn set_reach(&mut self, reach: f32) {
        self.reach = reach;
    }

    pub fn reach(&self) -> f32 {
        self.reach
    }

    pub fn count(&self, kind: PointKind) -> u8 {
        let n = match kind {
            PointKind::Enter | PointKind::Normal | PointKind::Crosswalk => {
                if self.source.is_some() {
                    self.boundaries.len()
                } else {
                    self.states.len()
                }
            }
            PointKind::Lane => self.lanes.len(),
        };
        n.min(u8::MAX as usize) as u8
    }

    pub fn contains(&self, p: PointID) -> bool {
        p.entrance == self.id && p.index >= 1 && p.index <= self.count(p.kind)
    }

    pub fn points(&self) -> impl Iterator<Item = PointID> + '_ {
        [
            PointKind::Enter,
            PointKind::Normal,
            PointKind::Lane,
            PointKind::Crosswalk,
        ]
        .into_iter()
        .flat_map(move |kind| (1..=self.count(kind)).map(move |i| PointID::new(self.id, kind, i)))
    }

    pub fn states(&self) -> &[PointState] {
        &self.states
    }

    /// State of the enter point the given point derives from. Lane points have none.
    pub fn state(&self, p: PointID) -> Option<&PointState> {
        if p.kind == PointKind::Lane || p.index == 0 {
            return None;
        }
        self.states.get(p.index as usize - 1)
    }

    pub(crate) fn state_mut(&mut self, p: PointID) -> Option<&mut PointState> {
        if p.kind == PointKind::Lane || p.index == 0 {
            return None;
        }
        self.states.get_mut(p.index as usize - 1)
    }

    pub(crate) fn reset_states(&mut self) {
        for s in &mut self.states {
            *s = PointState::default();
        }
    }

    fn lateral(&self, p: PointID) -> Option<f32> {
        if !self.contains(p) {
            return None;
        }
        let i = p.index as usize - 1;
        match p.kind {
            PointKind::Lane => self.lanes.get(i).copied(),
            _ => Some(self.boundaries.get(i)? + self.states.get(i)?.offset),
        }
    }

    /// Position of a point, a pure function of the road geometry and the point state.
    /// Split points resolve to their center.
    pub fn resolve(&self, p: PointID) -> Option<PointPosition> {
        let source = self.source.as_ref()?;
        let lateral = self.lateral(p)?;
        let mut pos = source.at_lateral(lateral);
        if p.kind == PointKind::Normal {
            pos -= (source.dir * self.reach).z0();
        }
        Some(PointPosition {
            pos,
            dir: source.dir,
            normal: source.normal(),
        })
    }

    /// Like `resolve`, but a split enter point yields the half closest to `toward`
    pub fn resolve_toward(&self, p: PointID, toward: Vec3) -> Option<PointPosition> {
        let mut r = self.resolve(p)?;
        if p.kind != PointKind::Enter {
            return Some(r);
        }
        let state = self.state(p)?;
        if !state.split {
            return Some(r);
        }
        let half = (r.normal * (state.split_offset * 0.5)).z0();
        let a = r.pos + half;
        let b = r.pos - half;
        r.pos = if a.distance2(toward) <= b.distance2(toward) {
            a
        } else {
            b
        };
        Some(r)
    }
}
