use super::props::prop;
use crate::style::{PropertyDef, StyleProps};
use geom::Color;
use serde::{Deserialize, Serialize};

pub const CROSSWALK_COLOR: Color = Color::new(0.533, 0.533, 0.533, 0.8);

/// Crosswalk already painted by the road itself, only reserves its width
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExistentCrosswalk {
    pub width: f32,
}

impl Default for ExistentCrosswalk {
    fn default() -> Self {
        Self { width: 3.0 }
    }
}

impl StyleProps for ExistentCrosswalk {
    const PROPERTIES: &'static [PropertyDef<Self>] =
        &[prop!("Width", Shape, float width [0.5, 20.0])];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZebraCrosswalk {
    pub color: Color,
    pub offset_before: f32,
    pub offset_after: f32,
    /// Depth of the crosswalk along the road
    pub width: f32,
    pub dash_length: f32,
    pub space_length: f32,
    /// Stripes follow the borders instead of staying perpendicular to the crosswalk line
    pub parallel: bool,
}

impl Default for ZebraCrosswalk {
    fn default() -> Self {
        Self {
            color: CROSSWALK_COLOR,
            offset_before: 0.25,
            offset_after: 0.25,
            width: 2.0,
            dash_length: 0.4,
            space_length: 0.6,
            parallel: true,
        }
    }
}

impl StyleProps for ZebraCrosswalk {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("OffsetBefore", Position, float offset_before [0.0, 10.0]),
        prop!("OffsetAfter", Position, float offset_after [0.0, 10.0]),
        prop!("Width", Shape, float width [0.5, 20.0]),
        prop!("DashLength", Shape, float dash_length [0.1, 10.0]),
        prop!("SpaceLength", Shape, float space_length [0.1, 10.0]),
        prop!("Parallel", Additional, bool parallel),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubleZebraCrosswalk {
    pub color: Color,
    pub offset_before: f32,
    pub offset_after: f32,
    pub width: f32,
    pub dash_length: f32,
    pub space_length: f32,
    pub parallel: bool,
    /// Gap between the two rows of stripes
    pub offset: f32,
}

impl Default for DoubleZebraCrosswalk {
    fn default() -> Self {
        Self {
            color: CROSSWALK_COLOR,
            offset_before: 0.25,
            offset_after: 0.25,
            width: 4.0,
            dash_length: 0.4,
            space_length: 0.6,
            parallel: true,
            offset: 0.3,
        }
    }
}

impl StyleProps for DoubleZebraCrosswalk {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("OffsetBefore", Position, float offset_before [0.0, 10.0]),
        prop!("OffsetAfter", Position, float offset_after [0.0, 10.0]),
        prop!("Width", Shape, float width [0.5, 20.0]),
        prop!("DashLength", Shape, float dash_length [0.1, 10.0]),
        prop!("SpaceLength", Shape, float space_length [0.1, 10.0]),
        prop!("Parallel", Additional, bool parallel),
        prop!("Offset", Shape, float offset [0.0, 10.0]),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelSolidLinesCrosswalk {
    pub color: Color,
    pub offset_before: f32,
    pub offset_after: f32,
    pub width: f32,
    pub line_width: f32,
}

impl Default for ParallelSolidLinesCrosswalk {
    fn default() -> Self {
        Self {
            color: CROSSWALK_COLOR,
            offset_before: 0.25,
            offset_after: 0.25,
            width: 2.0,
            line_width: 0.15,
        }
    }
}

impl StyleProps for ParallelSolidLinesCrosswalk {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("OffsetBefore", Position, float offset_before [0.0, 10.0]),
        prop!("OffsetAfter", Position, float offset_after [0.0, 10.0]),
        prop!("Width", Shape, float width [0.5, 20.0]),
        prop!("LineWidth", Shape, float line_width [0.05, 2.0]),
    ];
}

/// Two side lines with zebra stripes between them
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderCrosswalk {
    pub color: Color,
    pub offset_before: f32,
    pub offset_after: f32,
    pub width: f32,
    pub line_width: f32,
    pub dash_length: f32,
    pub space_length: f32,
}

impl Default for LadderCrosswalk {
    fn default() -> Self {
        Self {
            color: CROSSWALK_COLOR,
            offset_before: 0.25,
            offset_after: 0.25,
            width: 2.0,
            line_width: 0.15,
            dash_length: 0.4,
            space_length: 0.6,
        }
    }
}

impl StyleProps for LadderCrosswalk {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("OffsetBefore", Position, float offset_before [0.0, 10.0]),
        prop!("OffsetAfter", Position, float offset_after [0.0, 10.0]),
        prop!("Width", Shape, float width [0.5, 20.0]),
        prop!("LineWidth", Shape, float line_width [0.05, 2.0]),
        prop!("DashLength", Shape, float dash_length [0.1, 10.0]),
        prop!("SpaceLength", Shape, float space_length [0.1, 10.0]),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidCrosswalk {
    pub color: Color,
    pub offset_before: f32,
    pub offset_after: f32,
    pub width: f32,
}

impl Default for SolidCrosswalk {
    fn default() -> Self {
        Self {
            color: CROSSWALK_COLOR,
            offset_before: 0.25,
            offset_after: 0.25,
            width: 2.0,
        }
    }
}

impl StyleProps for SolidCrosswalk {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("OffsetBefore", Position, float offset_before [0.0, 10.0]),
        prop!("OffsetAfter", Position, float offset_after [0.0, 10.0]),
        prop!("Width", Shape, float width [0.5, 20.0]),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChessBoardCrosswalk {
    pub color: Color,
    pub offset_before: f32,
    pub offset_after: f32,
    pub square_side: f32,
    pub line_count: i32,
    pub invert: bool,
}

impl Default for ChessBoardCrosswalk {
    fn default() -> Self {
        Self {
            color: CROSSWALK_COLOR,
            offset_before: 0.25,
            offset_after: 0.25,
            square_side: 0.5,
            line_count: 2,
            invert: false,
        }
    }
}

impl StyleProps for ChessBoardCrosswalk {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("OffsetBefore", Position, float offset_before [0.0, 10.0]),
        prop!("OffsetAfter", Position, float offset_after [0.0, 10.0]),
        prop!("SquareSide", Shape, float square_side [0.1, 5.0]),
        prop!("LineCount", Shape, int line_count [1, 16]),
        prop!("Invert", Additional, bool invert),
    ];
}
