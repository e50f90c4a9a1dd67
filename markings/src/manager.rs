use crate::render::{DrawSink, DrawStats, GenCtx, MarkingRenderData};
use crate::{
    Dependences, Marking, MarkingID, MarkingSubscribers, RenderConfig, RoadGraph,
    SerializedMarking, UpdateType,
};
use geom::Vec3;
use std::collections::BTreeMap;

/// Owns the markings of every node and segment and their generated primitives.
/// Markings are created lazily the first time a tool asks for one.
#[derive(Default)]
pub struct MarkingManager {
    markings: BTreeMap<MarkingID, Marking>,
    render: BTreeMap<MarkingID, MarkingRenderData>,
    subscribers: MarkingSubscribers,
}

impl MarkingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: MarkingID) -> Option<&Marking> {
        self.markings.get(&id)
    }

    pub fn get_mut(&mut self, id: MarkingID) -> Option<&mut Marking> {
        self.markings.get_mut(&id)
    }

    pub fn contains(&self, id: MarkingID) -> bool {
        self.markings.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = MarkingID> + '_ {
        self.markings.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marking> {
        self.markings.values()
    }

    pub fn len(&self) -> usize {
        self.markings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markings.is_empty()
    }

    /// The marking of a road element, created from the road graph if needed.
    /// None if the road graph doesn't know the element.
    pub fn get_or_create(&mut self, id: MarkingID, road: &dyn RoadGraph) -> Option<&mut Marking> {
        if !self.markings.contains_key(&id) {
            let sources = road.entrances(id)?;
            info!("create marking {:?} with {} entrances", id, sources.len());
            self.markings.insert(id, Marking::new(id, sources));
        }
        self.markings.get_mut(&id)
    }

    /// The road element's geometry changed. Lines whose points disappeared are removed.
    /// A road element the graph doesn't know anymore is released.
    pub fn on_road_updated(&mut self, id: MarkingID, road: &dyn RoadGraph) -> Dependences {
        let Some(sources) = road.entrances(id) else {
            self.on_road_released(id);
            return Dependences::default();
        };
        let m = unwrap_ret!(self.markings.get_mut(&id), Dependences::default());
        info!("road of {:?} updated", id);
        let deps = m.update_entrances(sources);
        self.subscribers.dispatch(UpdateType::Marking, id);
        deps
    }

    /// The road element was deleted, its marking goes with it
    pub fn on_road_released(&mut self, id: MarkingID) -> Option<Marking> {
        let m = self.markings.remove(&id)?;
        info!("release marking {:?}", id);
        self.render.remove(&id);
        self.subscribers.dispatch(UpdateType::Released, id);
        Some(m)
    }

    /// Adds a marking restored from a save, its entrances are refreshed from the road graph.
    /// Returns false and drops the marking when the road element doesn't exist anymore.
    pub fn insert_loaded(&mut self, mut marking: Marking, road: &dyn RoadGraph) -> bool {
        let id = marking.id();
        let Some(sources) = road.entrances(id) else {
            warn!("dropping loaded marking {:?}, its road element is gone", id);
            return false;
        };
        info!("insert loaded marking {:?}", id);
        marking.update_entrances(sources);
        marking.mark_all_dirty();
        self.render.remove(&id);
        self.markings.insert(id, marking);
        self.subscribers.dispatch(UpdateType::Marking, id);
        true
    }

    pub fn persisted(&self) -> Vec<SerializedMarking> {
        self.markings.values().map(Marking::to_persisted).collect()
    }

    /// Replaces every marking with the saved ones, returns how many were restored
    pub fn load(&mut self, docs: Vec<SerializedMarking>, road: &dyn RoadGraph) -> usize {
        self.clear();
        let mut n = 0;
        for doc in docs {
            if self.insert_loaded(Marking::from_persisted(doc), road) {
                n += 1;
            }
        }
        n
    }

    /// Drops every marking
    pub fn clear(&mut self) {
        info!("clear all markings");
        self.markings.clear();
        self.render.clear();
        self.subscribers.dispatch_clear();
    }

    pub fn subscribers(&self) -> &MarkingSubscribers {
        &self.subscribers
    }

    /// Lets subscribers know which markings were edited since the last call
    pub fn dispatch_changes(&mut self) {
        for (&id, m) in self.markings.iter_mut() {
            if m.take_changed() {
                self.subscribers.dispatch(UpdateType::Marking, id);
            }
        }
    }

    /// Rebuilds the primitives of the dirty markings, returns how many were rebuilt
    pub fn regenerate(&mut self, ctx: &GenCtx) -> usize {
        let mut n = 0;
        for (&id, m) in self.markings.iter_mut() {
            if !m.is_dirty() {
                continue;
            }
            let data = self.render.entry(id).or_default();
            if data.regenerate(m, ctx) {
                n += 1;
            }
        }
        n
    }

    /// Dispatches changes and rebuilds what they invalidated
    pub fn update(&mut self, ctx: &GenCtx) -> usize {
        self.dispatch_changes();
        self.regenerate(ctx)
    }

    pub fn render_data(&self, id: MarkingID) -> Option<&MarkingRenderData> {
        self.render.get(&id)
    }

    /// Draws every marking, nearest first
    pub fn draw(&self, camera: Vec3, config: &RenderConfig, sink: &mut dyn DrawSink) -> DrawStats {
        let mut order: Vec<(f32, MarkingID)> = self
            .render
            .iter()
            .map(|(&id, data)| (data.distance_to(camera), id))
            .collect();
        order.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut stats = DrawStats::default();
        for (_, id) in order {
            let data = unwrap_cont!(self.render.get(&id));
            stats += data.draw(id, camera, config, sink);
        }
        stats
    }
}
