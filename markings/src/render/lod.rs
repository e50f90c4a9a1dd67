use crate::render::{PartID, Primitive, RenderOwner};
use crate::{MarkingID, RenderConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which family of draw calls a primitive belongs to
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LodType {
    Dash,
    Mesh,
    Network,
    Prop,
    Tree,
}

impl LodType {
    pub const ALL: [LodType; 5] = [
        LodType::Dash,
        LodType::Mesh,
        LodType::Network,
        LodType::Prop,
        LodType::Tree,
    ];
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LodLevel {
    /// Drawn at any distance
    NoLod,
    /// Drawn close to the camera
    Lod0,
    /// Drawn far from the camera
    Lod1,
}

impl LodLevel {
    pub fn visible(self, near: bool) -> bool {
        match self {
            LodLevel::NoLod => true,
            LodLevel::Lod0 => near,
            LodLevel::Lod1 => !near,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LodPrimitive {
    pub level: LodLevel,
    pub primitive: Primitive,
}

impl LodPrimitive {
    pub fn new(level: LodLevel, primitive: Primitive) -> Self {
        Self { level, primitive }
    }

    pub fn no_lod(primitive: Primitive) -> Self {
        Self::new(LodLevel::NoLod, primitive)
    }
}

/// Sizes of a merged batch, computed before filling it so buffers are allocated once
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupData {
    pub vertices: usize,
    pub triangles: usize,
    pub objects: usize,
}

/// Far away primitives of one type merged into a single static draw
#[derive(Clone, Debug, PartialEq)]
pub struct MergedBatch {
    pub lod_type: LodType,
    pub data: GroupData,
    pub parts: Vec<Primitive>,
}

/// Receives what is visible this frame
pub trait DrawSink {
    fn draw(&mut self, owner: RenderOwner, primitive: &Primitive);
    fn draw_batch(&mut self, marking: MarkingID, batch: &MergedBatch);
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub primitives: usize,
    pub batches: usize,
    pub culled: usize,
}

impl std::ops::AddAssign for DrawStats {
    fn add_assign(&mut self, rhs: Self) {
        self.primitives += rhs.primitives;
        self.batches += rhs.batches;
        self.culled += rhs.culled;
    }
}

type Handle = (PartID, usize);

#[derive(Clone, Debug, Default)]
struct Buckets {
    no_lod: Vec<Handle>,
    lod0: Vec<Handle>,
    lod1: Vec<Handle>,
}

impl Buckets {
    fn get(&self, level: LodLevel) -> &[Handle] {
        match level {
            LodLevel::NoLod => &self.no_lod,
            LodLevel::Lod0 => &self.lod0,
            LodLevel::Lod1 => &self.lod1,
        }
    }

    fn get_mut(&mut self, level: LodLevel) -> &mut Vec<Handle> {
        match level {
            LodLevel::NoLod => &mut self.no_lod,
            LodLevel::Lod0 => &mut self.lod0,
            LodLevel::Lod1 => &mut self.lod1,
        }
    }
}

/// The primitives of a marking bucketed by type and level, plus the merged batches
/// of the types that support them.
#[derive(Clone, Debug, Default)]
pub struct RenderGroups {
    buckets: BTreeMap<LodType, Buckets>,
    batches: BTreeMap<LodType, MergedBatch>,
}

impl RenderGroups {
    pub fn build(parts: &BTreeMap<PartID, Vec<LodPrimitive>>, config: &RenderConfig) -> Self {
        let mut g = Self::default();
        for (&part, prims) in parts {
            for (i, p) in prims.iter().enumerate() {
                g.buckets
                    .entry(p.primitive.lod_type())
                    .or_default()
                    .get_mut(p.level)
                    .push((part, i));
            }
        }
        for &t in &config.batch_lod_types {
            let data = g.calculate_group_data(parts, t);
            if data.objects == 0 {
                continue;
            }
            let batch = g.populate_group_data(parts, t, data);
            g.batches.insert(t, batch);
        }
        g
    }

    fn far_handles(&self, t: LodType) -> impl Iterator<Item = &Handle> {
        self.buckets
            .get(&t)
            .into_iter()
            .flat_map(|b| b.no_lod.iter().chain(b.lod1.iter()))
    }

    /// Sizes of what would be merged for `t`: everything drawn far away,
    /// prefabs counted at their coarse level
    pub fn calculate_group_data(
        &self,
        parts: &BTreeMap<PartID, Vec<LodPrimitive>>,
        t: LodType,
    ) -> GroupData {
        let mut data = GroupData::default();
        for &(part, i) in self.far_handles(t) {
            let p = unwrap_cont!(parts.get(&part).and_then(|v| v.get(i)));
            let (v, tri) = match &p.primitive {
                Primitive::Network(n) => n.prefab.counts(1),
                Primitive::Prop(x) => x.prefab.counts(1),
                Primitive::Tree(x) => x.prefab.counts(1),
                other => other.counts(),
            };
            data.vertices += v;
            data.triangles += tri;
            data.objects += 1;
        }
        data
    }

    pub fn populate_group_data(
        &self,
        parts: &BTreeMap<PartID, Vec<LodPrimitive>>,
        t: LodType,
        data: GroupData,
    ) -> MergedBatch {
        let mut merged = Vec::with_capacity(data.objects);
        for &(part, i) in self.far_handles(t) {
            let p = unwrap_contlog!(
                parts.get(&part).and_then(|v| v.get(i)),
                "stale render handle {:?}",
                part
            );
            merged.push(p.primitive.clone());
        }
        MergedBatch {
            lod_type: t,
            data,
            parts: merged,
        }
    }

    pub fn batch(&self, t: LodType) -> Option<&MergedBatch> {
        self.batches.get(&t)
    }

    pub fn count(&self, t: LodType, level: LodLevel) -> usize {
        self.buckets.get(&t).map_or(0, |b| b.get(level).len())
    }

    /// Draws what is visible at `distance` from the camera.
    /// Primitives come out in generation order within each part, so later rules of a line
    /// cover earlier ones whatever their level or type.
    pub fn draw(
        &self,
        marking: MarkingID,
        parts: &BTreeMap<PartID, Vec<LodPrimitive>>,
        distance: f32,
        config: &RenderConfig,
        sink: &mut dyn DrawSink,
    ) -> DrawStats {
        let mut stats = DrawStats::default();
        if distance > config.max_render_distance {
            stats.culled = self
                .buckets
                .values()
                .map(|b| b.no_lod.len() + b.lod0.len() + b.lod1.len())
                .sum();
            return stats;
        }
        let near = distance <= config.lod_distance;

        if !near {
            for batch in self.batches.values() {
                sink.draw_batch(marking, batch);
                stats.batches += 1;
            }
        }

        for (&part, prims) in parts {
            for p in prims {
                if !near && self.batches.contains_key(&p.primitive.lod_type()) {
                    continue;
                }
                if !p.level.visible(near) {
                    stats.culled += 1;
                    continue;
                }
                sink.draw(RenderOwner { marking, part }, &p.primitive);
                stats.primitives += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DashMaterial, DashPart, MeshData, PrefabInfo, PropInstance};
    use crate::{FillerID, LineID};
    use geom::{vec2, Color, Vec3};

    #[derive(Default)]
    struct Recorder {
        drawn: Vec<Primitive>,
        batches: Vec<LodType>,
    }

    impl DrawSink for Recorder {
        fn draw(&mut self, _: RenderOwner, p: &Primitive) {
            self.drawn.push(p.clone());
        }

        fn draw_batch(&mut self, _: MarkingID, batch: &MergedBatch) {
            self.batches.push(batch.lod_type);
        }
    }

    fn dash(level: LodLevel, color: Color) -> LodPrimitive {
        LodPrimitive::new(
            level,
            Primitive::Dash(DashPart {
                pos: Vec3::ZERO,
                dir: vec2(1.0, 0.0),
                length: 1.0,
                width: 0.15,
                color,
                material: DashMaterial::Rectangle,
            }),
        )
    }

    fn lamp(level: LodLevel) -> LodPrimitive {
        LodPrimitive::new(
            level,
            Primitive::Prop(PropInstance {
                prefab: PrefabInfo::new("lamp", 1.0, vec![(24, 12), (8, 4)]),
                pos: Vec3::ZERO,
                angle: 0.0,
                tilt: 0.0,
                slope: 0.0,
                scale: 1.0,
                color: None,
            }),
        )
    }

    fn colors(r: &Recorder) -> Vec<Color> {
        r.drawn
            .iter()
            .filter_map(|p| p.dash().map(|d| d.color))
            .collect()
    }

    #[test]
    fn later_primitives_of_a_part_are_drawn_last() {
        let mut parts = BTreeMap::new();
        // a curved rule split per level, then a straight rule over it
        parts.insert(
            PartID::Line(LineID::default()),
            vec![
                dash(LodLevel::Lod0, Color::RED),
                dash(LodLevel::Lod0, Color::RED),
                dash(LodLevel::Lod1, Color::RED),
                LodPrimitive::no_lod(Primitive::Mesh(MeshData::default())),
                dash(LodLevel::NoLod, Color::WHITE),
            ],
        );
        let config = RenderConfig::default();
        let g = RenderGroups::build(&parts, &config);

        let mut near = Recorder::default();
        let stats = g.draw(MarkingID::Node(0), &parts, 0.0, &config, &mut near);
        assert_eq!(colors(&near), vec![Color::RED, Color::RED, Color::WHITE]);
        assert!(matches!(near.drawn[2], Primitive::Mesh(_)));
        assert_eq!(stats.primitives, 4);
        assert_eq!(stats.culled, 1);

        let mut far = Recorder::default();
        g.draw(MarkingID::Node(0), &parts, config.lod_distance + 1.0, &config, &mut far);
        assert_eq!(colors(&far), vec![Color::RED, Color::WHITE]);
    }

    #[test]
    fn far_instances_are_merged() {
        let mut parts = BTreeMap::new();
        parts.insert(
            PartID::Line(LineID::default()),
            vec![dash(LodLevel::NoLod, Color::WHITE), lamp(LodLevel::NoLod)],
        );
        parts.insert(
            PartID::Filler(FillerID::default()),
            vec![lamp(LodLevel::NoLod), lamp(LodLevel::Lod0)],
        );
        let config = RenderConfig::default();
        let g = RenderGroups::build(&parts, &config);

        assert_eq!(g.count(LodType::Prop, LodLevel::NoLod), 2);
        assert_eq!(g.count(LodType::Prop, LodLevel::Lod0), 1);
        assert!(g.batch(LodType::Dash).is_none());

        // the Lod0 lamp stays out, the others are counted at their coarse level
        let batch = g.batch(LodType::Prop).unwrap();
        assert_eq!(
            batch.data,
            GroupData {
                vertices: 16,
                triangles: 8,
                objects: 2
            }
        );
        assert_eq!(batch.parts.len(), 2);
        assert_eq!(g.calculate_group_data(&parts, LodType::Dash).vertices, 4);

        let mut mid = Recorder::default();
        let stats = g.draw(MarkingID::Node(0), &parts, config.lod_distance + 1.0, &config, &mut mid);
        assert_eq!(mid.batches, vec![LodType::Prop]);
        assert_eq!(colors(&mid), vec![Color::WHITE]);
        assert_eq!(mid.drawn.len(), 1);
        assert_eq!(stats.batches, 1);

        let mut near = Recorder::default();
        g.draw(MarkingID::Node(0), &parts, config.lod_distance, &config, &mut near);
        assert!(near.batches.is_empty());
        assert_eq!(near.drawn.len(), 4);
    }
}
