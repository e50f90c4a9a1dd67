use crate::{LineID, Style};
use serde::{Deserialize, Serialize};
use slotmapd::new_key_type;

new_key_type! {
    pub struct RuleID;
}

/// A position on a line where a rule may start or end
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleEdge {
    Start,
    End,
    /// Where another line crosses this one
    Line(LineID),
}

/// A styled range of a line
#[derive(Clone, Debug)]
pub struct LineRule {
    pub id: RuleID,
    pub line: LineID,
    pub from: RuleEdge,
    pub to: RuleEdge,
    pub style: Style,
    /// Another rule of the same line covers part of this one's range.
    /// Not an error: the rule later in the line's list is drawn on top.
    pub is_overlapped: bool,
}

impl LineRule {
    pub fn uses_line(&self, line: LineID) -> bool {
        self.from == RuleEdge::Line(line) || self.to == RuleEdge::Line(line)
    }
}

const OVERLAP_EPS: f32 = 1e-4;

/// Sorted (min, max) of a range given in any order
pub fn ordered(r: (f32, f32)) -> (f32, f32) {
    if r.0 <= r.1 {
        r
    } else {
        (r.1, r.0)
    }
}

/// For each range, whether any other range shares a part of positive length with it.
/// Ranges that only touch do not overlap.
pub fn overlaps(ranges: &[(f32, f32)]) -> Vec<bool> {
    let mut v = vec![false; ranges.len()];
    for i in 0..ranges.len() {
        let a = ordered(ranges[i]);
        for j in i + 1..ranges.len() {
            let b = ordered(ranges[j]);
            if a.1.min(b.1) - a.0.max(b.0) > OVERLAP_EPS {
                v[i] = true;
                v[j] = true;
            }
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_is_not_overlap() {
        assert_eq!(overlaps(&[(0.0, 0.5), (0.5, 1.0)]), vec![false, false]);
        assert_eq!(overlaps(&[(0.0, 0.6), (1.0, 0.5)]), vec![true, true]);
        assert_eq!(
            overlaps(&[(0.0, 0.2), (0.3, 0.4), (0.35, 1.0)]),
            vec![false, true, true]
        );
        assert_eq!(overlaps(&[(0.0, 1.0)]), vec![false]);
    }
}
