use crate::EntranceID;
use geom::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PointKind {
    /// On a lane border of the entrance
    Enter,
    /// Enter point pushed back across the marking, for perpendicular lines
    Normal,
    /// On a lane center
    Lane,
    /// Same anchor as the enter point, only used by crosswalks
    Crosswalk,
}

/// Stable identity of a point: which entrance, which kind, and its 1-based index along the entrance.
/// The position is never stored here, see `Entrance::resolve`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointID {
    pub entrance: EntranceID,
    pub kind: PointKind,
    pub index: u8,
}

impl PointID {
    pub const fn new(entrance: EntranceID, kind: PointKind, index: u8) -> Self {
        Self {
            entrance,
            kind,
            index,
        }
    }

    pub const fn enter(entrance: EntranceID, index: u8) -> Self {
        Self::new(entrance, PointKind::Enter, index)
    }

    pub const fn normal(entrance: EntranceID, index: u8) -> Self {
        Self::new(entrance, PointKind::Normal, index)
    }

    pub const fn lane(entrance: EntranceID, index: u8) -> Self {
        Self::new(entrance, PointKind::Lane, index)
    }

    pub const fn crosswalk(entrance: EntranceID, index: u8) -> Self {
        Self::new(entrance, PointKind::Crosswalk, index)
    }

    /// The point with the same entrance and index but another kind
    pub fn with_kind(self, kind: PointKind) -> Self {
        Self { kind, ..self }
    }
}

/// Unordered pair of points, the identity of a line.
/// Stored sorted so that (a, b) and (b, a) compare and hash equal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[PointID; 2]", into = "[PointID; 2]")]
pub struct PointPair {
    first: PointID,
    second: PointID,
}

impl PointPair {
    pub fn new(a: PointID, b: PointID) -> Self {
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    #[inline]
    pub fn first(&self) -> PointID {
        self.first
    }

    #[inline]
    pub fn second(&self) -> PointID {
        self.second
    }

    pub fn points(&self) -> [PointID; 2] {
        [self.first, self.second]
    }

    pub fn contains(&self, p: PointID) -> bool {
        self.first == p || self.second == p
    }

    pub fn contains_entrance(&self, e: EntranceID) -> bool {
        self.first.entrance == e || self.second.entrance == e
    }

    /// The other end of the pair, None if `p` is not part of it
    pub fn other(&self, p: PointID) -> Option<PointID> {
        if self.first == p {
            Some(self.second)
        } else if self.second == p {
            Some(self.first)
        } else {
            None
        }
    }

    pub fn same_entrance(&self) -> bool {
        self.first.entrance == self.second.entrance
    }

    pub fn is_degenerate(&self) -> bool {
        self.first == self.second
    }
}

impl From<[PointID; 2]> for PointPair {
    fn from(v: [PointID; 2]) -> Self {
        PointPair::new(v[0], v[1])
    }
}

impl From<PointPair> for [PointID; 2] {
    fn from(p: PointPair) -> Self {
        p.points()
    }
}

/// A resolved point, recomputed from the entrance geometry each time it is needed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointPosition {
    pub pos: Vec3,
    /// Road direction at the point, pointing away from the marking
    pub dir: Vec2,
    /// Lateral axis of the entrance
    pub normal: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    fn pt(e: u8, k: u8, i: u8) -> PointID {
        let kind = match k % 4 {
            0 => PointKind::Enter,
            1 => PointKind::Normal,
            2 => PointKind::Lane,
            _ => PointKind::Crosswalk,
        };
        PointID::new(EntranceID(e as u32 % 4), kind, i % 8)
    }

    quickcheck! {
        fn pair_is_unordered(a: (u8, u8, u8), b: (u8, u8, u8)) -> bool {
            let a = pt(a.0, a.1, a.2);
            let b = pt(b.0, b.1, b.2);
            let p = PointPair::new(a, b);
            let q = PointPair::new(b, a);
            p == q && common::hash_u64(p) == common::hash_u64(q) && p.first() <= p.second()
        }
    }

    #[test]
    fn other_end() {
        let a = PointID::enter(EntranceID(1), 1);
        let b = PointID::enter(EntranceID(2), 3);
        let p = PointPair::new(b, a);
        assert_eq!(p.other(a), Some(b));
        assert_eq!(p.other(b), Some(a));
        assert_eq!(p.other(PointID::lane(EntranceID(1), 1)), None);
        assert!(!p.same_entrance());
    }
}
