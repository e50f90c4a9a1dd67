//! Typed style records. Every style variant is a plain struct with a static table of named
//! properties, so that templates, property editors and scripts can read and write any style
//! without knowing its concrete type.

mod crosswalk;
mod filler;
mod line;
mod props;
mod template;

pub use crosswalk::*;
pub use filler::*;
pub use line::*;
pub use props::{
    Alignment, Category, ColorOption, Distribution, PropType, PropValue, PropertyDef,
    PropertyInfo, StyleEnum, StyleProps, TextDirection,
};
pub use template::*;

use crate::StyleError;
use serde::{Deserialize, Serialize};

/// The kind of marking a style can be applied to
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarkingKind {
    Regular,
    Stop,
    Crosswalk,
    Filler,
}

macro_rules! styles {
    ($($variant:ident($props:ty) = $default:expr, $kind:ident, $label:literal;)+) => {
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        pub enum Style {
            $($variant($props),)+
        }

        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum StyleType {
            $($variant,)+
        }

        impl StyleType {
            pub const ALL: &'static [StyleType] = &[$(StyleType::$variant,)+];

            pub fn kind(self) -> MarkingKind {
                match self {
                    $(StyleType::$variant => MarkingKind::$kind,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $(StyleType::$variant => $label,)+
                }
            }

            /// A fresh copy of the canonical style of this type
            pub fn default_style(self) -> Style {
                match self {
                    $(StyleType::$variant => Style::$variant($default),)+
                }
            }
        }

        impl Style {
            pub fn style_type(&self) -> StyleType {
                match self {
                    $(Style::$variant(_) => StyleType::$variant,)+
                }
            }

            pub fn properties(&self) -> Vec<PropertyInfo> {
                match self {
                    $(Style::$variant(_) => {
                        <$props as StyleProps>::PROPERTIES.iter().map(PropertyInfo::from).collect()
                    })+
                }
            }

            pub fn get(&self, name: &str) -> Result<PropValue, StyleError> {
                match self {
                    $(Style::$variant(p) => p.get_prop(name),)+
                }
            }

            pub fn set(&mut self, name: &str, v: PropValue) -> Result<(), StyleError> {
                match self {
                    $(Style::$variant(p) => p.set_prop(name, v),)+
                }
            }
        }
    };
}

styles! {
    RegularSolid(SolidLine) = SolidLine::regular(), Regular, "Solid";
    RegularDashed(DashedLine) = DashedLine::regular(), Regular, "Dashed";
    RegularDoubleSolid(DoubleSolidLine) = DoubleSolidLine::default(), Regular, "Double solid";
    RegularDoubleDashed(DoubleDashedLine) = DoubleDashedLine::default(), Regular, "Double dashed";
    RegularSolidAndDashed(SolidAndDashedLine) = SolidAndDashedLine::default(), Regular, "Solid and dashed";
    RegularSharkTeeth(SharkTeethLine) = SharkTeethLine::default(), Regular, "Shark teeth";
    RegularPavement(PavementLine) = PavementLine::default(), Regular, "Pavement";
    RegularProp(PropLine) = PropLine::default(), Regular, "Props";
    RegularTree(TreeLine) = TreeLine::default(), Regular, "Trees";
    RegularNetwork(NetworkLine) = NetworkLine::default(), Regular, "Network";
    RegularText(TextLine) = TextLine::default(), Regular, "Text";

    StopSolid(SolidLine) = SolidLine::stop(), Stop, "Solid";
    StopDashed(DashedLine) = DashedLine::stop(), Stop, "Dashed";
    StopDoubleSolid(DoubleSolidLine) = DoubleSolidLine::stop(), Stop, "Double solid";
    StopSharkTeeth(SharkTeethLine) = SharkTeethLine::stop(), Stop, "Shark teeth";
    StopPavement(PavementLine) = PavementLine::default(), Stop, "Pavement";

    CrosswalkExistent(ExistentCrosswalk) = ExistentCrosswalk::default(), Crosswalk, "Existent";
    CrosswalkZebra(ZebraCrosswalk) = ZebraCrosswalk::default(), Crosswalk, "Zebra";
    CrosswalkDoubleZebra(DoubleZebraCrosswalk) = DoubleZebraCrosswalk::default(), Crosswalk, "Double zebra";
    CrosswalkParallelSolidLines(ParallelSolidLinesCrosswalk) = ParallelSolidLinesCrosswalk::default(), Crosswalk, "Parallel solid lines";
    CrosswalkLadder(LadderCrosswalk) = LadderCrosswalk::default(), Crosswalk, "Ladder";
    CrosswalkSolid(SolidCrosswalk) = SolidCrosswalk::default(), Crosswalk, "Solid";
    CrosswalkChessBoard(ChessBoardCrosswalk) = ChessBoardCrosswalk::default(), Crosswalk, "Chess board";

    FillerStripe(StripeFiller) = StripeFiller::default(), Filler, "Stripes";
    FillerGrid(GridFiller) = GridFiller::default(), Filler, "Grid";
    FillerSolid(SolidFiller) = SolidFiller::default(), Filler, "Solid";
    FillerChevron(ChevronFiller) = ChevronFiller::default(), Filler, "Chevron";
    FillerPavement(PavementFiller) = PavementFiller::default(), Filler, "Pavement";
    FillerGrass(GrassFiller) = GrassFiller::default(), Filler, "Grass";
}

impl StyleType {
    /// The type a new line, crosswalk or filler gets when no style is given
    pub fn default_of(kind: MarkingKind) -> StyleType {
        match kind {
            MarkingKind::Regular => StyleType::RegularDashed,
            MarkingKind::Stop => StyleType::StopSolid,
            MarkingKind::Crosswalk => StyleType::CrosswalkZebra,
            MarkingKind::Filler => StyleType::FillerStripe,
        }
    }

    pub fn of_kind(kind: MarkingKind) -> impl Iterator<Item = StyleType> {
        Self::ALL.iter().copied().filter(move |t| t.kind() == kind)
    }
}

impl Style {
    pub fn default_of(kind: MarkingKind) -> Style {
        StyleType::default_of(kind).default_style()
    }

    pub fn kind(&self) -> MarkingKind {
        self.style_type().kind()
    }

    /// Copies every property that `other` also has with the same name and type.
    /// Returns how many properties were copied.
    pub fn copy_to(&self, other: &mut Style) -> usize {
        let theirs = other.properties();
        let mut n = 0;
        for mine in self.properties() {
            if !theirs.iter().any(|p| p.name == mine.name && p.ty == mine.ty) {
                continue;
            }
            let v = unwrap_cont!(self.get(mine.name).ok());
            if other.set(mine.name, v).is_ok() {
                n += 1;
            }
        }
        n
    }

    /// Depth of a crosswalk along the road, including its offsets
    pub fn crosswalk_depth(&self) -> f32 {
        match self {
            Style::CrosswalkExistent(s) => s.width,
            Style::CrosswalkZebra(s) => s.offset_before + s.width + s.offset_after,
            Style::CrosswalkDoubleZebra(s) => s.offset_before + s.width + s.offset_after,
            Style::CrosswalkParallelSolidLines(s) => s.offset_before + s.width + s.offset_after,
            Style::CrosswalkLadder(s) => s.offset_before + s.width + s.offset_after,
            Style::CrosswalkSolid(s) => s.offset_before + s.width + s.offset_after,
            Style::CrosswalkChessBoard(s) => {
                s.offset_before + s.square_side * s.line_count as f32 + s.offset_after
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::Color;

    #[test]
    fn every_type_has_a_default_of_its_kind() {
        for &t in StyleType::ALL {
            let s = t.default_style();
            assert_eq!(s.style_type(), t);
            assert_eq!(s.kind(), t.kind());
            assert!(!s.properties().is_empty());
        }
        assert_eq!(StyleType::of_kind(MarkingKind::Stop).count(), 5);
        assert_eq!(StyleType::of_kind(MarkingKind::Crosswalk).count(), 7);
        assert_eq!(StyleType::of_kind(MarkingKind::Filler).count(), 6);
    }

    #[test]
    fn get_set_by_name() {
        let mut s = StyleType::RegularDashed.default_style();
        s.set("DashLength", PropValue::Float(3.0)).unwrap();
        assert_eq!(s.get("DashLength").unwrap(), PropValue::Float(3.0));

        // clamped to the property range
        s.set("Width", PropValue::Float(-1.0)).unwrap();
        assert_eq!(s.get("Width").unwrap(), PropValue::Float(0.05));

        assert!(matches!(
            s.set("Width", PropValue::Bool(true)),
            Err(StyleError::TypeMismatch { .. })
        ));
        assert!(matches!(
            s.get("Nope"),
            Err(StyleError::UnknownProperty(_))
        ));
    }

    #[test]
    fn enum_out_of_range() {
        let mut s = StyleType::RegularDoubleSolid.default_style();
        assert!(s.set("Alignment", PropValue::Enum(2)).is_ok());
        assert!(matches!(
            s.set("Alignment", PropValue::Enum(9)),
            Err(StyleError::OutOfRange(_))
        ));
    }

    #[test]
    fn copy_matching_properties() {
        let mut dashed = StyleType::RegularDashed.default_style();
        dashed.set("Color", PropValue::Color(Color::RED)).unwrap();
        dashed.set("Width", PropValue::Float(0.4)).unwrap();

        let mut double = StyleType::RegularDoubleDashed.default_style();
        let n = dashed.copy_to(&mut double);
        assert_eq!(n, 4);
        assert_eq!(double.get("Color").unwrap(), PropValue::Color(Color::RED));
        assert_eq!(double.get("Width").unwrap(), PropValue::Float(0.4));

        let mut grass = StyleType::FillerGrass.default_style();
        assert_eq!(dashed.copy_to(&mut grass), 0);
    }

    #[test]
    fn defaults_are_copies() {
        let mut a = StyleType::StopSolid.default_style();
        a.set("Width", PropValue::Float(2.0)).unwrap();
        let b = StyleType::StopSolid.default_style();
        assert_ne!(a, b);
    }
}
