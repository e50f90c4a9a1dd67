use crate::render::{MeshData, MeshVertex};
use geom::{vec2, Color, Vec2, Vec3};

/// Accumulates triangles for a raised mesh (pavement strips, curbs, grass areas)
pub struct MeshBuilder {
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
    color: Color,
}

impl MeshBuilder {
    pub fn new(color: Color) -> Self {
        Self {
            vertices: vec![],
            indices: vec![],
            color,
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Pushes vertices and indices relative to the first pushed vertex
    #[inline(always)]
    pub fn extend_with(&mut self, f: impl FnOnce(&mut Vec<MeshVertex>, &mut dyn FnMut(u32))) {
        let offset = self.vertices.len() as u32;
        let indices = &mut self.indices;
        let mut x = move |index: u32| {
            indices.push(index + offset);
        };
        f(&mut self.vertices, &mut x);
    }

    /// a-b-c-d counter-clockwise seen from the normal
    pub fn quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3, normal: Vec3, uv_len: f32) {
        let color = self.color;
        self.extend_with(|vertices, add_idx| {
            let mut pvert = |p: Vec3, uv: Vec2| {
                vertices.push(MeshVertex {
                    position: p,
                    normal,
                    uv,
                    color,
                })
            };
            pvert(a, Vec2::ZERO);
            pvert(b, Vec2::x(uv_len));
            pvert(c, vec2(uv_len, 1.0));
            pvert(d, Vec2::y(1.0));

            add_idx(0);
            add_idx(1);
            add_idx(2);

            add_idx(0);
            add_idx(2);
            add_idx(3);
        });
    }

    /// A strip of `width` following `points`, raised by `elevation` with vertical sides
    pub fn ribbon(&mut self, points: &[Vec3], width: f32, elevation: f32) {
        if points.len() < 2 {
            return;
        }
        let hw = width * 0.5;
        let n = points.len();
        let mut left = Vec::with_capacity(n);
        let mut right = Vec::with_capacity(n);
        for i in 0..n {
            let prev = points[i.saturating_sub(1)];
            let next = points[(i + 1).min(n - 1)];
            let dir = unwrap_cont!((next - prev).xy().try_normalize());
            let nor = dir.perpendicular();
            left.push(points[i] + (nor * hw).z(elevation));
            right.push(points[i] + (-nor * hw).z(elevation));
        }

        let mut along = 0.0;
        for i in 0..left.len().saturating_sub(1) {
            let step = left[i].distance(left[i + 1]);
            self.quad(right[i], right[i + 1], left[i + 1], left[i], Vec3::Z, along + step);
            along += step;
        }

        if elevation > 0.0 {
            self.wall(&left, elevation, true);
            self.wall(&right, elevation, false);
            // end caps
            let down = Vec3::z(-elevation);
            if let (Some(&l), Some(&r)) = (left.first(), right.first()) {
                let nor = (l - r).xy().perpendicular().z0().try_normalize().unwrap_or(Vec3::Z);
                self.quad(l + down, r + down, r, l, nor, width);
            }
            if let (Some(&l), Some(&r)) = (left.last(), right.last()) {
                let nor = (r - l).xy().perpendicular().z0().try_normalize().unwrap_or(Vec3::Z);
                self.quad(r + down, l + down, l, r, nor, width);
            }
        }
    }

    /// Vertical faces below a raised outline, facing away from its interior.
    /// `interior_right` tells on which side the interior is when walking the outline.
    pub fn wall(&mut self, top: &[Vec3], height: f32, interior_right: bool) {
        let down = Vec3::z(-height);
        for w in top.windows(2) {
            let (a, b) = if interior_right { (w[1], w[0]) } else { (w[0], w[1]) };
            let nor = (b - a).xy().perpendicular().z0();
            let nor = -nor.try_normalize().unwrap_or(Vec3::Z);
            let len = a.distance(b);
            self.quad(a + down, b + down, b, a, nor, len);
        }
    }

    /// A flat triangulated cap at `elevation` above the outline points
    pub fn cap(&mut self, outline: &[Vec3], triangles: &[[usize; 3]], elevation: f32) {
        let color = self.color;
        self.extend_with(|vertices, add_idx| {
            for &p in outline {
                vertices.push(MeshVertex {
                    position: p.up(elevation),
                    normal: Vec3::Z,
                    uv: p.xy(),
                    color,
                });
            }
            for t in triangles {
                add_idx(t[0] as u32);
                add_idx(t[1] as u32);
                add_idx(t[2] as u32);
            }
        });
    }

    /// A raised closed polygon: top cap and walls all around
    pub fn prism(&mut self, outline: &[Vec3], triangles: &[[usize; 3]], elevation: f32) {
        self.cap(outline, triangles, elevation);
        if elevation <= 0.0 || outline.len() < 3 {
            return;
        }
        let mut ring: Vec<Vec3> = outline.iter().map(|p| p.up(elevation)).collect();
        if let Some(&first) = ring.first() {
            ring.push(first);
        }
        let ccw = geom::signed_area(&outline.iter().map(|p| p.xy()).collect::<Vec<_>>()) > 0.0;
        self.wall(&ring, elevation, !ccw);
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn build(self) -> MeshData {
        MeshData {
            vertices: self.vertices,
            indices: self.indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::vec3;

    #[test]
    fn flat_ribbon_has_no_walls() {
        let mut b = MeshBuilder::new(Color::WHITE);
        b.ribbon(&[Vec3::ZERO, vec3(5.0, 0.0, 0.0), vec3(10.0, 0.0, 0.0)], 1.0, 0.0);
        let m = b.build();
        assert_eq!(m.indices.len() / 3, 4);
        assert!(m.vertices.iter().all(|v| v.position.z == 0.0));
    }

    #[test]
    fn raised_ribbon_walls_face_out() {
        let mut b = MeshBuilder::new(Color::WHITE);
        b.ribbon(&[Vec3::ZERO, vec3(10.0, 0.0, 0.0)], 2.0, 0.2);
        let m = b.build();
        // top, two sides, two caps
        assert_eq!(m.indices.len() / 3, 10);
        for v in &m.vertices {
            if v.normal.z.abs() < 0.5 {
                let lateral = v.normal.xy().dot(v.position.xy() - geom::vec2(5.0, 0.0));
                assert!(lateral > 0.0, "{:?}", v);
            }
        }
    }
}
