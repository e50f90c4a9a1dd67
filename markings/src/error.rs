use crate::{EntranceID, FillerID, LineID, LineKind, MarkingKind, PointID, PointPair, RuleEdge, RuleID};
use std::fmt::{Display, Formatter};

/// An entity that a mutation referenced but that does not exist (anymore)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NotFound {
    Entrance(EntranceID),
    Point(PointID),
    Line(LineID),
    Pair(PointPair),
    Rule(RuleID),
    Filler(FillerID),
    Crosswalk(LineID),
}

impl Display for NotFound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFound::Entrance(id) => write!(f, "entrance {:?}", id),
            NotFound::Point(id) => write!(f, "point {:?}", id),
            NotFound::Line(id) => write!(f, "line {:?}", id),
            NotFound::Pair(pair) => write!(f, "line on {:?}", pair),
            NotFound::Rule(id) => write!(f, "rule {:?}", id),
            NotFound::Filler(id) => write!(f, "filler {:?}", id),
            NotFound::Crosswalk(id) => write!(f, "crosswalk on {:?}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarkingError {
    #[error("{0} not found")]
    NotFound(NotFound),
    #[error("a line already exists on {0:?}")]
    LineExists(PointPair),
    #[error("both ends of the line are the same point")]
    SamePoint,
    #[error("points {0:?} cannot be joined by a line")]
    PairNotAllowed(PointPair),
    #[error("expected a {expected:?} line, the points make a {found:?} line")]
    WrongLineKind { expected: LineKind, found: LineKind },
    #[error("line {0:?} carries no rules")]
    NoRules(LineID),
    #[error("point {0:?} has no editable offset")]
    NoPointState(PointID),
    #[error("a {style:?} style cannot be used on a {target:?} marking")]
    StyleMismatch { style: MarkingKind, target: MarkingKind },
    #[error("filler contour is not complete")]
    ContourIncomplete,
    #[error("{0:?} is not an interior edge of the rule")]
    InvalidEdge(RuleEdge),
    #[error("rule {0:?} does not belong to line {1:?}")]
    RuleNotOnLine(RuleID, LineID),
    #[error("a line must keep at least one rule")]
    LastRule,
    #[error("line {0:?} cannot border this crosswalk")]
    InvalidBorder(LineID),
    #[error(transparent)]
    Style(#[from] StyleError),
}

impl From<NotFound> for MarkingError {
    fn from(x: NotFound) -> Self {
        MarkingError::NotFound(x)
    }
}

impl MarkingError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, MarkingError::NotFound(_))
    }
}

pub type MarkingResult<T> = Result<T, MarkingError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    #[error("unknown property {0}")]
    UnknownProperty(String),
    #[error("property {property} expects a {expected} value")]
    TypeMismatch {
        property: String,
        expected: &'static str,
    },
    #[error("value out of range for {0}")]
    OutOfRange(String),
}
