use geom::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The road element a marking is attached to
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarkingID {
    Node(u32),
    Segment(u32),
}

/// Id of the road segment that feeds an entrance
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntranceID(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[repr(u8)]
pub enum LaneKind {
    Driving,
    Biking,
    Bus,
    Parking,
    Walking,
    Rail,
}

impl LaneKind {
    #[inline]
    pub fn vehicles(self) -> bool {
        matches!(self, LaneKind::Driving | LaneKind::Biking | LaneKind::Bus)
    }

    /// Lanes that lie on the carriageway and get enter points at their borders
    #[inline]
    pub fn on_carriageway(self) -> bool {
        !matches!(self, LaneKind::Walking | LaneKind::Rail)
    }

    #[inline]
    pub const fn width(self) -> f32 {
        match self {
            LaneKind::Driving | LaneKind::Biking | LaneKind::Bus => 3.5,
            LaneKind::Parking => 2.5,
            LaneKind::Walking => 2.0,
            LaneKind::Rail => 5.3,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneSource {
    pub kind: LaneKind,
    /// Lateral position of the lane center, measured along `dir.perpendicular()`
    pub offset: f32,
    pub width: f32,
    /// Whether traffic on the lane flows into the marking
    pub incoming: bool,
}

/// Geometry of one road end as seen from a node or segment, as provided by the road graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntranceSource {
    pub id: EntranceID,
    /// Center of the road end, on the pavement
    pub position: Vec3,
    /// Unit direction pointing away from the marking, along the road
    pub dir: Vec2,
    pub inverted: bool,
    pub lanes: Vec<LaneSource>,
}

const BOUNDARY_MERGE_DIST: f32 = 0.05;

impl EntranceSource {
    /// Axis along which the entrance's points are indexed
    pub fn normal(&self) -> Vec2 {
        if self.inverted {
            -self.dir.perpendicular()
        } else {
            self.dir.perpendicular()
        }
    }

    fn lateral(&self, offset: f32) -> f32 {
        if self.inverted {
            -offset
        } else {
            offset
        }
    }

    /// Sorted lateral positions of the lane borders on the carriageway
    pub fn boundaries(&self) -> Vec<f32> {
        let mut v: Vec<f32> = self
            .lanes
            .iter()
            .filter(|l| l.kind.on_carriageway())
            .flat_map(|l| {
                let c = self.lateral(l.offset);
                [c - l.width * 0.5, c + l.width * 0.5]
            })
            .collect();
        v.sort_by(f32::total_cmp);
        v.dedup_by(|a, b| (*a - *b).abs() < BOUNDARY_MERGE_DIST);
        v
    }

    /// Sorted lateral positions of the vehicle lane centers
    pub fn lane_centers(&self) -> Vec<f32> {
        let mut v: Vec<f32> = self
            .lanes
            .iter()
            .filter(|l| l.kind.vehicles())
            .map(|l| self.lateral(l.offset))
            .collect();
        v.sort_by(f32::total_cmp);
        v
    }

    pub fn half_width(&self) -> f32 {
        self.boundaries()
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    pub fn at_lateral(&self, lateral: f32) -> Vec3 {
        self.position + (self.normal() * lateral).z0()
    }
}

/// The road network the markings are laid over.
/// Implemented by the embedding application, queried when a marking is created or refreshed.
pub trait RoadGraph {
    fn entrances(&self, id: MarkingID) -> Option<Vec<EntranceSource>>;
}

/// A road graph that only knows about the entrances it was given.
/// Used by tools, tests and the headless runner.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StaticRoadGraph {
    markings: BTreeMap<MarkingID, Vec<EntranceSource>>,
}

impl RoadGraph for StaticRoadGraph {
    fn entrances(&self, id: MarkingID) -> Option<Vec<EntranceSource>> {
        self.markings.get(&id).cloned()
    }
}

impl StaticRoadGraph {
    pub fn insert(&mut self, id: MarkingID, entrances: Vec<EntranceSource>) {
        self.markings.insert(id, entrances);
    }

    pub fn remove(&mut self, id: MarkingID) -> Option<Vec<EntranceSource>> {
        self.markings.remove(&id)
    }

    pub fn get_mut(&mut self, id: MarkingID) -> Option<&mut Vec<EntranceSource>> {
        self.markings.get_mut(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = MarkingID> + '_ {
        self.markings.keys().copied()
    }

    /// Builds a two way road profile with `lanes_per_dir` driving lanes each way and a sidewalk on both sides
    pub fn road_profile(lanes_per_dir: u32) -> Vec<LaneSource> {
        let w = LaneKind::Driving.width();
        let n = lanes_per_dir as usize * 2;
        let hw = w * n as f32 * 0.5;
        let sw = LaneKind::Walking.width();

        let mut lanes = Vec::with_capacity(n + 2);
        lanes.push(LaneSource {
            kind: LaneKind::Walking,
            offset: -hw - sw * 0.5,
            width: sw,
            incoming: false,
        });
        for i in 0..n {
            lanes.push(LaneSource {
                kind: LaneKind::Driving,
                offset: -hw + w * (i as f32 + 0.5),
                width: w,
                incoming: i < n / 2,
            });
        }
        lanes.push(LaneSource {
            kind: LaneKind::Walking,
            offset: hw + sw * 0.5,
            width: sw,
            incoming: false,
        });
        lanes
    }

    /// Adds an intersection at `center` with one entrance per arm.
    /// Arm directions are normalized, entrances are pushed away from the center so that they don't overlap.
    pub fn add_node(
        &mut self,
        node: u32,
        center: Vec3,
        arms: &[(EntranceID, Vec2)],
        lanes_per_dir: u32,
    ) {
        let lanes = Self::road_profile(lanes_per_dir);
        let hw = LaneKind::Driving.width() * lanes_per_dir as f32;
        let radius = hw + 2.0;

        let entrances = arms
            .iter()
            .filter_map(|&(id, dir)| {
                let dir = dir.try_normalize()?;
                Some(EntranceSource {
                    id,
                    position: center + (dir * radius).z0(),
                    dir,
                    inverted: false,
                    lanes: lanes.clone(),
                })
            })
            .collect();

        self.insert(MarkingID::Node(node), entrances);
    }

    /// Adds a straight road segment between `from` and `to`, with an entrance at each end
    pub fn add_segment(
        &mut self,
        segment: u32,
        from: Vec3,
        to: Vec3,
        ids: (EntranceID, EntranceID),
        lanes_per_dir: u32,
    ) {
        let Some(dir) = (to - from).xy().try_normalize() else {
            return;
        };
        let lanes = Self::road_profile(lanes_per_dir);
        self.insert(
            MarkingID::Segment(segment),
            vec![
                EntranceSource {
                    id: ids.0,
                    position: from,
                    dir: -dir,
                    inverted: false,
                    lanes: lanes.clone(),
                },
                EntranceSource {
                    id: ids.1,
                    position: to,
                    dir,
                    inverted: true,
                    lanes,
                },
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::vec2;

    #[test]
    fn boundaries_skip_sidewalks() {
        let e = EntranceSource {
            id: EntranceID(0),
            position: Vec3::ZERO,
            dir: vec2(1.0, 0.0),
            inverted: false,
            lanes: StaticRoadGraph::road_profile(1),
        };
        let b = e.boundaries();
        assert_eq!(b.len(), 3);
        assert!((b[0] + 3.5).abs() < 1e-4);
        assert!(b[1].abs() < 1e-4);
        assert!((b[2] - 3.5).abs() < 1e-4);
        assert_eq!(e.lane_centers().len(), 2);
        assert!((e.half_width() - 3.5).abs() < 1e-4);
    }

    #[test]
    fn inverted_flips_axis() {
        let mut e = EntranceSource {
            id: EntranceID(0),
            position: Vec3::ZERO,
            dir: vec2(1.0, 0.0),
            inverted: false,
            lanes: StaticRoadGraph::road_profile(1),
        };
        let p = e.at_lateral(e.boundaries()[0]);
        e.inverted = true;
        let q = e.at_lateral(e.boundaries()[0]);
        assert!(p.is_close(q * -1.0, 1e-4));
    }
}
