use crate::{MarkingKind, PointKind, PointPair, RuleID};
use serde::{Deserialize, Serialize};
use slotmapd::new_key_type;

new_key_type! {
    pub struct LineID;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LineKind {
    /// Between enter points of two different entrances
    Regular,
    /// Between two enter points of the same entrance
    Stop,
    /// From an enter point to its own normal point
    Normal,
    /// Between lane centers of two different entrances
    Lane,
    /// Between two crosswalk points of the same entrance
    Crosswalk,
}

impl LineKind {
    /// The kind of line the pair makes, None if the points cannot be joined
    pub fn of_pair(pair: PointPair) -> Option<LineKind> {
        if pair.is_degenerate() {
            return None;
        }
        let (a, b) = (pair.first(), pair.second());
        let same = pair.same_entrance();
        use PointKind::*;
        Some(match (a.kind, b.kind) {
            (Enter, Enter) if same => LineKind::Stop,
            (Enter, Enter) => LineKind::Regular,
            (Enter, Normal) | (Normal, Enter) if same && a.index == b.index => LineKind::Normal,
            (Lane, Lane) if !same => LineKind::Lane,
            (Crosswalk, Crosswalk) if same => LineKind::Crosswalk,
            _ => return None,
        })
    }

    /// Which family of styles applies to the line
    pub fn style_kind(self) -> MarkingKind {
        match self {
            LineKind::Regular | LineKind::Normal | LineKind::Lane => MarkingKind::Regular,
            LineKind::Stop => MarkingKind::Stop,
            LineKind::Crosswalk => MarkingKind::Crosswalk,
        }
    }

    /// Crosswalk lines carry their style on the crosswalk aggregate instead of rules
    pub fn has_rules(self) -> bool {
        self != LineKind::Crosswalk
    }
}

/// A line of a marking, t = 0 at `pair.first()` and t = 1 at `pair.second()`
#[derive(Clone, Debug)]
pub struct MarkingLine {
    pub id: LineID,
    pub pair: PointPair,
    pub kind: LineKind,
    /// Rendering priority order, the last rule is drawn on top
    pub(crate) rules: Vec<RuleID>,
}

impl MarkingLine {
    pub fn rules(&self) -> &[RuleID] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntranceID, PointID};

    fn pair(a: PointID, b: PointID) -> PointPair {
        PointPair::new(a, b)
    }

    #[test]
    fn kinds_from_points() {
        let e1 = EntranceID(1);
        let e2 = EntranceID(2);
        assert_eq!(
            LineKind::of_pair(pair(PointID::enter(e1, 1), PointID::enter(e2, 2))),
            Some(LineKind::Regular)
        );
        assert_eq!(
            LineKind::of_pair(pair(PointID::enter(e1, 1), PointID::enter(e1, 3))),
            Some(LineKind::Stop)
        );
        assert_eq!(
            LineKind::of_pair(pair(PointID::normal(e1, 2), PointID::enter(e1, 2))),
            Some(LineKind::Normal)
        );
        assert_eq!(
            LineKind::of_pair(pair(PointID::normal(e1, 2), PointID::enter(e1, 1))),
            None
        );
        assert_eq!(
            LineKind::of_pair(pair(PointID::lane(e1, 1), PointID::lane(e2, 1))),
            Some(LineKind::Lane)
        );
        assert_eq!(
            LineKind::of_pair(pair(PointID::crosswalk(e2, 1), PointID::crosswalk(e2, 3))),
            Some(LineKind::Crosswalk)
        );
        assert_eq!(
            LineKind::of_pair(pair(PointID::crosswalk(e1, 1), PointID::crosswalk(e2, 3))),
            None
        );
        assert_eq!(
            LineKind::of_pair(pair(PointID::enter(e1, 1), PointID::enter(e1, 1))),
            None
        );
    }
}
