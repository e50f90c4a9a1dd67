use super::props::prop;
use crate::style::{PropertyDef, StyleProps};
use geom::Color;
use serde::{Deserialize, Serialize};

pub const FILLER_COLOR: Color = Color::new(0.533, 0.533, 0.533, 0.8);

/// Parallel stripes across the area, `angle` is relative to the longest contour edge
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeFiller {
    pub color: Color,
    pub width: f32,
    pub step: f32,
    pub angle: f32,
    /// Inset of the contour
    pub offset: f32,
}

impl Default for StripeFiller {
    fn default() -> Self {
        Self {
            color: FILLER_COLOR,
            width: 0.15,
            step: 1.0,
            angle: 45.0,
            offset: 0.0,
        }
    }
}

impl StyleProps for StripeFiller {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("Width", Shape, float width [0.05, 5.0]),
        prop!("Step", Shape, float step [0.1, 20.0]),
        prop!("Angle", Position, float angle [-90.0, 90.0]),
        prop!("Offset", Position, float offset [0.0, 10.0]),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridFiller {
    pub color: Color,
    pub width: f32,
    pub step: f32,
    pub angle: f32,
    pub offset: f32,
}

impl Default for GridFiller {
    fn default() -> Self {
        Self {
            color: FILLER_COLOR,
            width: 0.15,
            step: 1.0,
            angle: 0.0,
            offset: 0.0,
        }
    }
}

impl StyleProps for GridFiller {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("Width", Shape, float width [0.05, 5.0]),
        prop!("Step", Shape, float step [0.1, 20.0]),
        prop!("Angle", Position, float angle [-90.0, 90.0]),
        prop!("Offset", Position, float offset [0.0, 10.0]),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidFiller {
    pub color: Color,
    pub offset: f32,
}

impl Default for SolidFiller {
    fn default() -> Self {
        Self {
            color: FILLER_COLOR,
            offset: 0.0,
        }
    }
}

impl StyleProps for SolidFiller {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("Offset", Position, float offset [0.0, 10.0]),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChevronFiller {
    pub color: Color,
    pub width: f32,
    pub step: f32,
    /// Opening of the chevrons in degrees
    pub angle_between: f32,
    pub invert: bool,
    pub offset: f32,
}

impl Default for ChevronFiller {
    fn default() -> Self {
        Self {
            color: FILLER_COLOR,
            width: 0.15,
            step: 1.0,
            angle_between: 90.0,
            invert: false,
            offset: 0.0,
        }
    }
}

impl StyleProps for ChevronFiller {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("Width", Shape, float width [0.05, 5.0]),
        prop!("Step", Shape, float step [0.1, 20.0]),
        prop!("AngleBetween", Shape, float angle_between [30.0, 150.0]),
        prop!("Invert", Additional, bool invert),
        prop!("Offset", Position, float offset [0.0, 10.0]),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PavementFiller {
    pub elevation: f32,
    pub offset: f32,
}

impl Default for PavementFiller {
    fn default() -> Self {
        Self {
            elevation: 0.15,
            offset: 0.0,
        }
    }
}

impl StyleProps for PavementFiller {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Elevation", Shape, float elevation [0.0, 1.0]),
        prop!("Offset", Position, float offset [0.0, 10.0]),
    ];
}

/// Grass on a raised island with a curb of `curb_size`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassFiller {
    pub elevation: f32,
    pub curb_size: f32,
    pub offset: f32,
}

impl Default for GrassFiller {
    fn default() -> Self {
        Self {
            elevation: 0.15,
            curb_size: 0.3,
            offset: 0.0,
        }
    }
}

impl StyleProps for GrassFiller {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Elevation", Shape, float elevation [0.0, 1.0]),
        prop!("CurbSize", Shape, float curb_size [0.0, 2.0]),
        prop!("Offset", Position, float offset [0.0, 10.0]),
    ];
}
