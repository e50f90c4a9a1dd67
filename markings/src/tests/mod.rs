#![allow(dead_code)]
#![cfg(test)]

use crate::api::MarkingApi;
use crate::render::{Assets, GenCtx, PrefabInfo};
use crate::{
    EntranceID, LineID, Marking, MarkingID, MarkingManager, PointID, PointPair, RenderConfig,
    StaticRoadGraph, TemplateManager,
};
use common::logger::MyLog;
use geom::{vec2, Vec3};

mod model;
mod persistence;

pub(crate) const NODE: MarkingID = MarkingID::Node(0);
pub(crate) const E1: EntranceID = EntranceID(1);
pub(crate) const E2: EntranceID = EntranceID(2);
pub(crate) const E3: EntranceID = EntranceID(3);
pub(crate) const E4: EntranceID = EntranceID(4);

/// A four way intersection at the origin: E1 east, E2 north, E3 west, E4 south.
/// One lane per direction, so every entrance has 3 enter points 3.5m apart
/// and the middle one sits on the road axis.
pub(crate) struct TestCtx {
    pub road: StaticRoadGraph,
    pub manager: MarkingManager,
    pub templates: TemplateManager,
    pub config: RenderConfig,
    pub assets: Assets,
}

impl TestCtx {
    pub(crate) fn new() -> Self {
        MyLog::init();

        let mut road = StaticRoadGraph::default();
        road.add_node(
            0,
            Vec3::ZERO,
            &[
                (E1, vec2(1.0, 0.0)),
                (E2, vec2(0.0, 1.0)),
                (E3, vec2(-1.0, 0.0)),
                (E4, vec2(0.0, -1.0)),
            ],
            1,
        );

        let mut assets = Assets::new();
        assets.add_prefab(PrefabInfo::new("lamp", 1.0, vec![(24, 12), (8, 4)]));

        Self {
            road,
            manager: MarkingManager::new(),
            templates: TemplateManager::new(),
            config: RenderConfig::default(),
            assets,
        }
    }

    pub(crate) fn marking(&mut self) -> &mut Marking {
        self.manager.get_or_create(NODE, &self.road).unwrap()
    }

    pub(crate) fn api(&mut self) -> MarkingApi<'_> {
        MarkingApi::new(&mut self.manager, &self.road, &self.templates)
    }

    pub(crate) fn line(&mut self, a: PointID, b: PointID) -> LineID {
        self.marking().add_line(PointPair::new(a, b), None).unwrap()
    }

    /// East-west line through the center
    pub(crate) fn axis_x(&mut self) -> LineID {
        self.line(PointID::enter(E1, 2), PointID::enter(E3, 2))
    }

    /// North-south line through the center
    pub(crate) fn axis_y(&mut self) -> LineID {
        self.line(PointID::enter(E2, 2), PointID::enter(E4, 2))
    }

    pub(crate) fn update(&mut self) -> usize {
        let ctx = GenCtx {
            config: &self.config,
            assets: &self.assets,
        };
        self.manager.update(&ctx)
    }
}
