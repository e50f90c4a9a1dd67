use crate::{LineID, Marking, PointID, Style, Trajectory};
use geom::{Polygon, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use slotmapd::new_key_type;

new_key_type! {
    pub struct FillerID;
}

/// Samples per meter when flattening curved contour edges
const CONTOUR_DETAIL: f32 = 0.5;

/// A user picked corner of a filler
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FillerVertex {
    Point(PointID),
    /// Where two lines cross
    Intersect(LineID, LineID),
}

impl FillerVertex {
    pub fn uses_line(&self, line: LineID) -> bool {
        match *self {
            FillerVertex::Point(_) => false,
            FillerVertex::Intersect(a, b) => a == line || b == line,
        }
    }

    pub fn point(&self) -> Option<PointID> {
        match *self {
            FillerVertex::Point(p) => Some(p),
            FillerVertex::Intersect(..) => None,
        }
    }
}

/// How the contour goes from one raw vertex to the next
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ContourEdge {
    Straight,
    /// Follows a part of a line, oriented from this vertex to the next
    Guide { line: LineID, trajectory: Trajectory },
}

/// The closed outline of a filler.
/// The raw vertices are what the user picked, the processed polygon is the outline
/// with curved edges flattened, used for triangulation and drawing.
#[derive(Clone, Debug, Default)]
pub struct FillerContour {
    raw: Vec<FillerVertex>,
    edges: Vec<ContourEdge>,
    processed: Vec<Vec3>,
    raw_to_processed: Vec<usize>,
    complete: bool,
}

impl FillerContour {
    pub fn new(marking: &Marking, vertices: Vec<FillerVertex>) -> Self {
        let mut c = Self {
            raw: vertices,
            ..Default::default()
        };
        c.recompute(marking);
        c
    }

    /// Appends a vertex and recomputes the outline
    pub fn push(&mut self, marking: &Marking, v: FillerVertex) {
        self.raw.push(v);
        self.recompute(marking);
    }

    /// Removes the last vertex, for interactive editing
    pub fn pop(&mut self, marking: &Marking) -> Option<FillerVertex> {
        let v = self.raw.pop();
        self.recompute(marking);
        v
    }

    pub fn recompute(&mut self, marking: &Marking) {
        self.edges.clear();
        self.processed.clear();
        self.raw_to_processed.clear();
        self.complete = false;

        let n = self.raw.len();
        let Some(positions) = self
            .raw
            .iter()
            .map(|&v| marking.vertex_position(v))
            .collect::<Option<Vec<Vec3>>>()
        else {
            return;
        };

        for i in 0..n {
            let j = (i + 1) % n;
            let edge = if n >= 2 {
                guide_between(marking, self.raw[i], self.raw[j])
            } else {
                ContourEdge::Straight
            };

            self.raw_to_processed.push(self.processed.len());
            self.processed.push(positions[i]);
            if let ContourEdge::Guide { trajectory, .. } = edge {
                if !trajectory.is_straight() {
                    let pts = trajectory.flatten_detail(CONTOUR_DETAIL);
                    let inner = pts.len().saturating_sub(1);
                    self.processed.extend(pts.into_iter().take(inner).skip(1));
                }
            }
            self.edges.push(edge);
        }

        self.complete = self.check_complete();
    }

    fn check_complete(&self) -> bool {
        if self.raw.len() < 3 {
            return false;
        }
        for (i, v) in self.raw.iter().enumerate() {
            if self.raw[i + 1..].contains(v) {
                return false;
            }
        }
        self.polygon().is_simple()
    }

    /// Closed with at least 3 vertices and no self intersection
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn raw_vertices(&self) -> &[FillerVertex] {
        &self.raw
    }

    pub fn edges(&self) -> &[ContourEdge] {
        &self.edges
    }

    pub fn processed(&self) -> &[Vec3] {
        &self.processed
    }

    pub fn polygon(&self) -> Polygon {
        Polygon::new(self.processed.iter().map(|p| p.xy()).collect())
    }

    pub fn height(&self) -> f32 {
        if self.processed.is_empty() {
            return 0.0;
        }
        self.processed.iter().map(|p| p.z).sum::<f32>() / self.processed.len() as f32
    }

    pub fn uses_line(&self, line: LineID) -> bool {
        self.raw.iter().any(|v| v.uses_line(line))
    }

    pub fn guided_by(&self, line: LineID) -> bool {
        self.edges
            .iter()
            .any(|e| matches!(e, ContourEdge::Guide { line: l, .. } if *l == line))
    }

    pub fn uses_point(&self, p: PointID) -> bool {
        self.raw.iter().any(|v| v.point() == Some(p))
    }

    /// Index in the processed outline of a raw vertex
    pub fn index_of_processed(&self, v: FillerVertex) -> Option<usize> {
        let i = self.raw.iter().position(|&x| x == v)?;
        self.raw_to_processed.get(i).copied()
    }

    /// The path between two processed vertices.
    /// If they are the ends of a raw edge, that edge's trajectory is returned.
    /// Otherwise a new guide is built between them that continues the outline coming
    /// from `other_a` into `a` and leaves `b` towards `other_b`.
    pub fn get_guide(&self, a: usize, b: usize, other_a: usize, other_b: usize) -> Option<Trajectory> {
        let n = self.processed.len();
        if a >= n || b >= n || other_a >= n || other_b >= n || a == b {
            return None;
        }
        let raw_n = self.raw.len();
        for (i, edge) in self.edges.iter().enumerate() {
            let s = self.raw_to_processed[i];
            let e = self.raw_to_processed[(i + 1) % raw_n];
            let t = match *edge {
                ContourEdge::Guide { trajectory, .. } => trajectory,
                ContourEdge::Straight => Trajectory::straight(self.processed[s], self.processed[e]),
            };
            if s == a && e == b {
                return Some(t);
            }
            if s == b && e == a {
                return Some(t.reversed());
            }
        }

        let pa = self.processed[a];
        let pb = self.processed[b];
        let dir_a = (pa - self.processed[other_a]).xy().try_normalize();
        let dir_b = (self.processed[other_b] - pb).xy().try_normalize();
        let chord = (pb - pa).xy().try_normalize().unwrap_or(Vec2::X);
        Some(Trajectory::curve(
            pa,
            dir_a.unwrap_or(chord),
            pb,
            dir_b.unwrap_or(chord),
            0.35,
        ))
    }
}

/// A common line on which both vertices lie makes the edge follow it
fn guide_between(marking: &Marking, a: FillerVertex, b: FillerVertex) -> ContourEdge {
    let la = marking.vertex_lines(a);
    let lb = marking.vertex_lines(b);
    for &(line, ta) in &la {
        let Some(&(_, tb)) = lb.iter().find(|(l, _)| *l == line) else {
            continue;
        };
        if (ta - tb).abs() < 1e-4 {
            continue;
        }
        let trajectory = unwrap_cont!(marking.line_trajectory(line));
        let cut = if ta < tb {
            trajectory.cut(ta, tb)
        } else {
            trajectory.cut(tb, ta).reversed()
        };
        return ContourEdge::Guide {
            line,
            trajectory: cut,
        };
    }
    ContourEdge::Straight
}

/// A styled area of a marking
#[derive(Clone, Debug)]
pub struct Filler {
    pub id: FillerID,
    pub contour: FillerContour,
    pub style: Style,
}
