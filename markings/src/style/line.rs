use super::props::prop;
use crate::style::{Alignment, ColorOption, Distribution, PropertyDef, StyleProps, TextDirection};
use geom::{vec2, Color, Vec2};
use serde::{Deserialize, Serialize};

pub const LINE_COLOR: Color = Color::new(0.533, 0.533, 0.533, 0.8);
pub const LINE_WIDTH: f32 = 0.15;
pub const STOP_WIDTH: f32 = 0.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidLine {
    pub color: Color,
    pub width: f32,
}

impl SolidLine {
    pub fn regular() -> Self {
        Self {
            color: LINE_COLOR,
            width: LINE_WIDTH,
        }
    }

    pub fn stop() -> Self {
        Self {
            color: LINE_COLOR,
            width: STOP_WIDTH,
        }
    }
}

impl Default for SolidLine {
    fn default() -> Self {
        Self::regular()
    }
}

impl StyleProps for SolidLine {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("Width", Shape, float width [0.05, 5.0]),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashedLine {
    pub color: Color,
    pub width: f32,
    pub dash_length: f32,
    pub space_length: f32,
}

impl DashedLine {
    pub fn regular() -> Self {
        Self {
            color: LINE_COLOR,
            width: LINE_WIDTH,
            dash_length: 1.5,
            space_length: 1.5,
        }
    }

    pub fn stop() -> Self {
        Self {
            width: STOP_WIDTH,
            dash_length: 0.6,
            space_length: 0.6,
            ..Self::regular()
        }
    }
}

impl Default for DashedLine {
    fn default() -> Self {
        Self::regular()
    }
}

impl StyleProps for DashedLine {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("Width", Shape, float width [0.05, 5.0]),
        prop!("DashLength", Shape, float dash_length [0.1, 100.0]),
        prop!("SpaceLength", Shape, float space_length [0.1, 100.0]),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubleSolidLine {
    pub color: Color,
    pub second_color: Color,
    pub use_second_color: bool,
    pub width: f32,
    /// Distance between the two line centers
    pub offset: f32,
    pub alignment: Alignment,
}

impl DoubleSolidLine {
    pub fn stop() -> Self {
        Self {
            width: STOP_WIDTH,
            offset: 0.6,
            ..Self::default()
        }
    }
}

impl Default for DoubleSolidLine {
    fn default() -> Self {
        Self {
            color: LINE_COLOR,
            second_color: LINE_COLOR,
            use_second_color: false,
            width: LINE_WIDTH,
            offset: 0.3,
            alignment: Alignment::Centre,
        }
    }
}

impl StyleProps for DoubleSolidLine {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("SecondColor", Main, color second_color),
        prop!("UseSecondColor", Main, bool use_second_color),
        prop!("Width", Shape, float width [0.05, 5.0]),
        prop!("Offset", Shape, float offset [0.05, 10.0]),
        prop!("Alignment", Position, enum alignment: Alignment),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoubleDashedLine {
    pub color: Color,
    pub second_color: Color,
    pub use_second_color: bool,
    pub width: f32,
    pub dash_length: f32,
    pub space_length: f32,
    pub offset: f32,
    pub alignment: Alignment,
}

impl Default for DoubleDashedLine {
    fn default() -> Self {
        Self {
            color: LINE_COLOR,
            second_color: LINE_COLOR,
            use_second_color: false,
            width: LINE_WIDTH,
            dash_length: 1.5,
            space_length: 1.5,
            offset: 0.3,
            alignment: Alignment::Centre,
        }
    }
}

impl StyleProps for DoubleDashedLine {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("SecondColor", Main, color second_color),
        prop!("UseSecondColor", Main, bool use_second_color),
        prop!("Width", Shape, float width [0.05, 5.0]),
        prop!("DashLength", Shape, float dash_length [0.1, 100.0]),
        prop!("SpaceLength", Shape, float space_length [0.1, 100.0]),
        prop!("Offset", Shape, float offset [0.05, 10.0]),
        prop!("Alignment", Position, enum alignment: Alignment),
    ];
}

/// A solid line next to a dashed one, `invert` swaps their sides
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidAndDashedLine {
    pub color: Color,
    pub second_color: Color,
    pub use_second_color: bool,
    pub width: f32,
    pub dash_length: f32,
    pub space_length: f32,
    pub offset: f32,
    pub invert: bool,
}

impl Default for SolidAndDashedLine {
    fn default() -> Self {
        Self {
            color: LINE_COLOR,
            second_color: LINE_COLOR,
            use_second_color: false,
            width: LINE_WIDTH,
            dash_length: 1.5,
            space_length: 1.5,
            offset: 0.3,
            invert: false,
        }
    }
}

impl StyleProps for SolidAndDashedLine {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("SecondColor", Main, color second_color),
        prop!("UseSecondColor", Main, bool use_second_color),
        prop!("Width", Shape, float width [0.05, 5.0]),
        prop!("DashLength", Shape, float dash_length [0.1, 100.0]),
        prop!("SpaceLength", Shape, float space_length [0.1, 100.0]),
        prop!("Offset", Shape, float offset [0.05, 10.0]),
        prop!("Invert", Position, bool invert),
    ];
}

/// Give way triangles
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharkTeethLine {
    pub color: Color,
    pub base: f32,
    pub height: f32,
    pub space: f32,
    /// Degrees
    pub angle: f32,
}

impl SharkTeethLine {
    pub fn stop() -> Self {
        Self {
            base: 0.5,
            height: 0.6,
            space: 0.3,
            ..Self::default()
        }
    }
}

impl Default for SharkTeethLine {
    fn default() -> Self {
        Self {
            color: LINE_COLOR,
            base: 0.3,
            height: 0.4,
            space: 0.2,
            angle: 0.0,
        }
    }
}

impl StyleProps for SharkTeethLine {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Color", Main, color color),
        prop!("Base", Shape, float base [0.1, 10.0]),
        prop!("Height", Shape, float height [0.1, 10.0]),
        prop!("Space", Shape, float space [0.0, 10.0]),
        prop!("Angle", Position, float angle [-60.0, 60.0]),
    ];
}

/// A raised pavement strip
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PavementLine {
    pub width: f32,
    pub elevation: f32,
}

impl Default for PavementLine {
    fn default() -> Self {
        Self {
            width: 1.0,
            elevation: 0.15,
        }
    }
}

impl StyleProps for PavementLine {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Width", Shape, float width [0.1, 20.0]),
        prop!("Elevation", Shape, float elevation [0.0, 1.0]),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropLine {
    pub prefab: Option<String>,
    pub color_option: ColorOption,
    pub color: Color,
    pub step: f32,
    /// Percent chance for each instance to be placed
    pub probability: i32,
    pub angle: Vec2,
    pub tilt: Vec2,
    pub slope: Vec2,
    pub shift: Vec2,
    pub scale: Vec2,
    pub elevation: Vec2,
    pub offset_before: f32,
    pub offset_after: f32,
    pub distribution: Distribution,
}

impl Default for PropLine {
    fn default() -> Self {
        Self {
            prefab: None,
            color_option: ColorOption::Original,
            color: Color::WHITE,
            step: 5.0,
            probability: 100,
            angle: Vec2::ZERO,
            tilt: Vec2::ZERO,
            slope: Vec2::ZERO,
            shift: Vec2::ZERO,
            scale: vec2(1.0, 1.0),
            elevation: Vec2::ZERO,
            offset_before: 0.0,
            offset_after: 0.0,
            distribution: Distribution::FixedSpaceFreeEnd,
        }
    }
}

impl StyleProps for PropLine {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Prefab", Prefab, prefab prefab),
        prop!("ColorOption", Main, enum color_option: ColorOption),
        prop!("Color", Main, color color),
        prop!("Step", Shape, float step [0.5, 100.0]),
        prop!("Probability", Shape, int probability [0, 100]),
        prop!("Angle", Position, range angle [-180.0, 180.0]),
        prop!("Tilt", Position, range tilt [-90.0, 90.0]),
        prop!("Slope", Position, range slope [-90.0, 90.0]),
        prop!("Shift", Position, range shift [-50.0, 50.0]),
        prop!("Scale", Shape, range scale [0.1, 5.0]),
        prop!("Elevation", Position, range elevation [-10.0, 10.0]),
        prop!("OffsetBefore", Position, float offset_before [0.0, 100.0]),
        prop!("OffsetAfter", Position, float offset_after [0.0, 100.0]),
        prop!("Distribution", Additional, enum distribution: Distribution),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeLine {
    pub prefab: Option<String>,
    pub step: f32,
    pub probability: i32,
    pub angle: Vec2,
    pub tilt: Vec2,
    pub slope: Vec2,
    pub shift: Vec2,
    pub scale: Vec2,
    pub elevation: Vec2,
    pub offset_before: f32,
    pub offset_after: f32,
    pub distribution: Distribution,
}

impl Default for TreeLine {
    fn default() -> Self {
        Self {
            prefab: None,
            step: 10.0,
            probability: 100,
            angle: vec2(-180.0, 180.0),
            tilt: Vec2::ZERO,
            slope: Vec2::ZERO,
            shift: Vec2::ZERO,
            scale: vec2(0.9, 1.1),
            elevation: Vec2::ZERO,
            offset_before: 0.0,
            offset_after: 0.0,
            distribution: Distribution::FixedSpaceFreeEnd,
        }
    }
}

impl StyleProps for TreeLine {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Prefab", Prefab, prefab prefab),
        prop!("Step", Shape, float step [1.0, 100.0]),
        prop!("Probability", Shape, int probability [0, 100]),
        prop!("Angle", Position, range angle [-180.0, 180.0]),
        prop!("Tilt", Position, range tilt [-90.0, 90.0]),
        prop!("Slope", Position, range slope [-90.0, 90.0]),
        prop!("Shift", Position, range shift [-50.0, 50.0]),
        prop!("Scale", Shape, range scale [0.1, 5.0]),
        prop!("Elevation", Position, range elevation [-10.0, 10.0]),
        prop!("OffsetBefore", Position, float offset_before [0.0, 100.0]),
        prop!("OffsetAfter", Position, float offset_after [0.0, 100.0]),
        prop!("Distribution", Additional, enum distribution: Distribution),
    ];
}

/// Repeats a network prefab's segment mesh along the line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkLine {
    pub prefab: Option<String>,
    pub shift: f32,
    pub elevation: f32,
    pub scale: f32,
    /// Target length of one repetition of the prefab
    pub repeat_distance: f32,
    pub offset_before: f32,
    pub offset_after: f32,
    pub invert: bool,
}

impl Default for NetworkLine {
    fn default() -> Self {
        Self {
            prefab: None,
            shift: 0.0,
            elevation: 0.0,
            scale: 1.0,
            repeat_distance: 64.0,
            offset_before: 0.0,
            offset_after: 0.0,
            invert: false,
        }
    }
}

impl StyleProps for NetworkLine {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Prefab", Prefab, prefab prefab),
        prop!("Shift", Position, float shift [-50.0, 50.0]),
        prop!("Elevation", Position, float elevation [-10.0, 10.0]),
        prop!("Scale", Shape, float scale [0.1, 5.0]),
        prop!("RepeatDistance", Shape, float repeat_distance [1.0, 256.0]),
        prop!("OffsetBefore", Position, float offset_before [0.0, 100.0]),
        prop!("OffsetAfter", Position, float offset_after [0.0, 100.0]),
        prop!("Invert", Additional, bool invert),
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLine {
    pub text: String,
    pub font: String,
    pub color: Color,
    pub scale: f32,
    /// (character spacing, line spacing) in pixels
    pub spacing: Vec2,
    pub direction: TextDirection,
    pub alignment: Alignment,
    pub shift: f32,
    /// Degrees
    pub angle: f32,
    /// Position along the rule range, 0 at its start
    pub offset: f32,
    /// Maximum text width in meters when word wrapping, 0 disables wrapping
    pub max_width: f32,
    pub word_wrap: bool,
    pub char_wrap: bool,
}

impl Default for TextLine {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: String::new(),
            color: LINE_COLOR,
            scale: 2.0,
            spacing: Vec2::ZERO,
            direction: TextDirection::LeftToRight,
            alignment: Alignment::Centre,
            shift: 0.0,
            angle: 0.0,
            offset: 0.5,
            max_width: 0.0,
            word_wrap: false,
            char_wrap: false,
        }
    }
}

impl StyleProps for TextLine {
    const PROPERTIES: &'static [PropertyDef<Self>] = &[
        prop!("Text", Text, text text),
        prop!("Font", Text, text font),
        prop!("Color", Main, color color),
        prop!("Scale", Shape, float scale [0.25, 20.0]),
        prop!("Spacing", Shape, vec2 spacing [-10.0, 50.0]),
        prop!("Direction", Text, enum direction: TextDirection),
        prop!("Alignment", Text, enum alignment: Alignment),
        prop!("Shift", Position, float shift [-50.0, 50.0]),
        prop!("Angle", Position, float angle [-180.0, 180.0]),
        prop!("Offset", Position, float offset [0.0, 1.0]),
        prop!("MaxWidth", Text, float max_width [0.0, 100.0]),
        prop!("WordWrap", Text, bool word_wrap),
        prop!("CharWrap", Text, bool char_wrap),
    ];
}
