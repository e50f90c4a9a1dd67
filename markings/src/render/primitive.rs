use crate::render::text::TextTexture;
use crate::render::{LodType, PrefabInfo};
use crate::Trajectory;
use derive_more::From;
use geom::{Color, Vec2, Vec3};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DashMaterial {
    Rectangle,
    /// Pointing along `dir`, base at the start of the dash
    Triangle,
}

/// A flat decal centered on `pos`, `length` along `dir` and `width` across
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DashPart {
    pub pos: Vec3,
    pub dir: Vec2,
    pub length: f32,
    pub width: f32,
    pub color: Color,
    pub material: DashMaterial,
}

impl DashPart {
    pub fn start(&self) -> Vec3 {
        self.pos - (self.dir * (self.length * 0.5)).z0()
    }

    pub fn end(&self) -> Vec3 {
        self.pos + (self.dir * (self.length * 0.5)).z0()
    }

    /// Rectangle corners counter-clockwise from the start right corner.
    /// Triangles use the first two and the tip is the center of the last two.
    pub fn corners(&self) -> [Vec3; 4] {
        let d = (self.dir * (self.length * 0.5)).z0();
        let n = (self.dir.perpendicular() * (self.width * 0.5)).z0();
        [
            self.pos - d - n,
            self.pos + d - n,
            self.pos + d + n,
            self.pos - d + n,
        ]
    }
}

/// A triangulated flat polygon
#[derive(Clone, Debug, PartialEq)]
pub struct AreaDecal {
    pub points: Vec<Vec3>,
    pub triangles: Vec<[u16; 3]>,
    pub color: Color,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub color: Color,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// One repetition of a road prefab bent along a piece of trajectory
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkPart {
    pub prefab: PrefabInfo,
    pub trajectory: Trajectory,
    pub shift: f32,
    pub elevation: f32,
    pub scale: f32,
    pub invert: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropInstance {
    pub prefab: PrefabInfo,
    pub pos: Vec3,
    /// Radians, around the vertical axis
    pub angle: f32,
    pub tilt: f32,
    pub slope: f32,
    pub scale: f32,
    /// None keeps the prefab's own colors
    pub color: Option<Color>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeInstance {
    pub prefab: PrefabInfo,
    pub pos: Vec3,
    pub angle: f32,
    pub tilt: f32,
    pub slope: f32,
    pub scale: f32,
}

/// A rasterized text laid on the pavement.
/// `dir` is the texture's x axis, `size` its extent in meters.
#[derive(Clone, Debug, PartialEq)]
pub struct TextDecal {
    pub pos: Vec3,
    pub dir: Vec2,
    pub size: Vec2,
    pub color: Color,
    pub texture: TextTexture,
}

/// Something the renderer can draw
#[derive(Clone, Debug, PartialEq, From)]
pub enum Primitive {
    Dash(DashPart),
    Area(AreaDecal),
    Mesh(MeshData),
    Network(NetworkPart),
    Prop(PropInstance),
    Tree(TreeInstance),
    Text(TextDecal),
}

impl Primitive {
    pub fn lod_type(&self) -> LodType {
        match self {
            Primitive::Dash(_) | Primitive::Area(_) | Primitive::Text(_) => LodType::Dash,
            Primitive::Mesh(_) => LodType::Mesh,
            Primitive::Network(_) => LodType::Network,
            Primitive::Prop(_) => LodType::Prop,
            Primitive::Tree(_) => LodType::Tree,
        }
    }

    /// Vertex and triangle counts once drawn, prefabs use their most detailed level
    pub fn counts(&self) -> (usize, usize) {
        match self {
            Primitive::Dash(d) => match d.material {
                DashMaterial::Rectangle => (4, 2),
                DashMaterial::Triangle => (3, 1),
            },
            Primitive::Area(a) => (a.points.len(), a.triangles.len()),
            Primitive::Mesh(m) => (m.vertices.len(), m.indices.len() / 3),
            Primitive::Text(_) => (4, 2),
            Primitive::Network(n) => n.prefab.counts(0),
            Primitive::Prop(p) => p.prefab.counts(0),
            Primitive::Tree(t) => t.prefab.counts(0),
        }
    }

    /// A point on the primitive, used for distance culling and bounds
    pub fn anchor(&self) -> Vec3 {
        match self {
            Primitive::Dash(d) => d.pos,
            Primitive::Area(a) => a.points.first().copied().unwrap_or(Vec3::ZERO),
            Primitive::Mesh(m) => m
                .vertices
                .first()
                .map(|v| v.position)
                .unwrap_or(Vec3::ZERO),
            Primitive::Network(n) => n.trajectory.position(0.5),
            Primitive::Prop(p) => p.pos,
            Primitive::Tree(t) => t.pos,
            Primitive::Text(t) => t.pos,
        }
    }

    pub fn dash(&self) -> Option<&DashPart> {
        match self {
            Primitive::Dash(d) => Some(d),
            _ => None,
        }
    }
}
