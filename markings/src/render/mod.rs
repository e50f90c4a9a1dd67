//! Primitive generation and level of detail.
//!
//! Every styled part of a marking (a line with its rules, a crosswalk, a filler) is turned
//! into a list of [`LodPrimitive`]s. The lists are kept per part so that editing one line only
//! regenerates that line, and are bucketed into [`RenderGroups`] for drawing.

mod assets;
mod crosswalk;
mod dash;
mod filler;
mod line;
mod lod;
mod mesh;
mod network;
mod primitive;
mod scatter;
pub mod text;

pub use assets::*;
pub use crosswalk::*;
pub use dash::*;
pub use filler::*;
pub use line::*;
pub use lod::*;
pub use mesh::*;
pub use network::*;
pub use primitive::*;
pub use scatter::*;

use crate::{FillerID, LineID, LineKind, Marking, MarkingID, RenderConfig};
use geom::Vec3;
use std::collections::BTreeMap;

/// The styled part of a marking primitives are generated from
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartID {
    Line(LineID),
    Crosswalk(LineID),
    Filler(FillerID),
}

/// Who a drawn primitive belongs to
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderOwner {
    pub marking: MarkingID,
    pub part: PartID,
}

/// What primitive generation reads besides the marking itself
#[derive(Copy, Clone)]
pub struct GenCtx<'a> {
    pub config: &'a RenderConfig,
    pub assets: &'a dyn AssetProvider,
}

/// Generated primitives of one marking
#[derive(Default)]
pub struct MarkingRenderData {
    parts: BTreeMap<PartID, Vec<LodPrimitive>>,
    groups: RenderGroups,
    bounds: Option<(Vec3, Vec3)>,
}

impl MarkingRenderData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds what the marking reports as dirty. Returns whether anything was rebuilt.
    pub fn regenerate(&mut self, marking: &mut Marking, ctx: &GenCtx) -> bool {
        let dirty = marking.take_dirty();
        if dirty.is_empty() {
            return false;
        }

        if dirty.all {
            self.parts.clear();
            let lines: Vec<LineID> = marking.lines().map(|l| l.id).collect();
            for l in lines {
                self.generate_line(marking, l, ctx);
            }
            let fillers: Vec<FillerID> = marking.fillers().map(|f| f.id).collect();
            for f in fillers {
                self.generate_filler(marking, f, ctx);
            }
        } else {
            for &l in dirty.lines.iter().chain(dirty.crosswalks.iter()) {
                self.parts.remove(&PartID::Line(l));
                self.parts.remove(&PartID::Crosswalk(l));
                self.generate_line(marking, l, ctx);
            }
            for &f in &dirty.fillers {
                self.parts.remove(&PartID::Filler(f));
                self.generate_filler(marking, f, ctx);
            }
        }

        self.groups = RenderGroups::build(&self.parts, ctx.config);
        self.bounds = self.compute_bounds();
        log::debug!(
            "regenerated {:?}: {} parts, {} primitives",
            marking.id(),
            self.parts.len(),
            self.primitive_count()
        );
        true
    }

    fn generate_line(&mut self, marking: &Marking, l: LineID, ctx: &GenCtx) {
        let line = unwrap_ret!(marking.line(l));
        let (part, prims) = if line.kind == LineKind::Crosswalk {
            (PartID::Crosswalk(l), crosswalk_primitives(marking, l, ctx))
        } else {
            (PartID::Line(l), line_primitives(marking, l, ctx))
        };
        if !prims.is_empty() {
            self.parts.insert(part, prims);
        }
    }

    fn generate_filler(&mut self, marking: &Marking, f: FillerID, ctx: &GenCtx) {
        let filler = unwrap_ret!(marking.filler(f));
        let prims = filler_primitives(filler, ctx);
        if !prims.is_empty() {
            self.parts.insert(PartID::Filler(f), prims);
        }
    }

    fn compute_bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut it = self.primitives().map(|p| p.primitive.anchor());
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Distance from `p` to the box around the marking's primitives
    pub fn distance_to(&self, p: Vec3) -> f32 {
        let (lo, hi) = unwrap_ret!(self.bounds, f32::INFINITY);
        let clamped = p.max(lo).min(hi);
        clamped.distance(p)
    }

    /// Draws what is visible from `camera`
    pub fn draw(
        &self,
        id: MarkingID,
        camera: Vec3,
        config: &RenderConfig,
        sink: &mut dyn DrawSink,
    ) -> DrawStats {
        self.groups
            .draw(id, &self.parts, self.distance_to(camera), config, sink)
    }

    pub fn part(&self, part: PartID) -> &[LodPrimitive] {
        self.parts.get(&part).map_or(&[], |v| v.as_slice())
    }

    pub fn parts(&self) -> impl Iterator<Item = (PartID, &[LodPrimitive])> {
        self.parts.iter().map(|(&k, v)| (k, v.as_slice()))
    }

    pub fn primitives(&self) -> impl Iterator<Item = &LodPrimitive> {
        self.parts.values().flatten()
    }

    pub fn primitive_count(&self) -> usize {
        self.parts.values().map(Vec::len).sum()
    }

    pub fn groups(&self) -> &RenderGroups {
        &self.groups
    }

    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.bounds
    }
}
