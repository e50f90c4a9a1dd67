use crate::StyleError;
use geom::{Color, Vec2};
use serde::{Deserialize, Serialize};

/// The type of a style property, as shown to property editors and scripts
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropType {
    Float,
    Int,
    Bool,
    Color,
    Vec2,
    /// Index into the given variant names
    Enum(&'static [&'static str]),
    /// Optional asset name
    Prefab,
    Text,
}

impl PropType {
    pub fn name(&self) -> &'static str {
        match self {
            PropType::Float => "float",
            PropType::Int => "int",
            PropType::Bool => "bool",
            PropType::Color => "color",
            PropType::Vec2 => "vec2",
            PropType::Enum(_) => "enum",
            PropType::Prefab => "prefab",
            PropType::Text => "text",
        }
    }

    pub fn accepts(&self, v: &PropValue) -> bool {
        matches!(
            (self, v),
            (PropType::Float, PropValue::Float(_))
                | (PropType::Int, PropValue::Int(_))
                | (PropType::Bool, PropValue::Bool(_))
                | (PropType::Color, PropValue::Color(_))
                | (PropType::Vec2, PropValue::Vec2(_))
                | (PropType::Enum(_), PropValue::Enum(_))
                | (PropType::Prefab, PropValue::Prefab(_))
                | (PropType::Text, PropValue::Text(_))
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Color(Color),
    Vec2(Vec2),
    Enum(u8),
    Prefab(Option<String>),
    Text(String),
}

impl PropValue {
    pub fn as_float(&self) -> Option<f32> {
        match *self {
            PropValue::Float(x) => Some(x),
            PropValue::Int(x) => Some(x as f32),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match *self {
            PropValue::Color(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            PropValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

/// Grouping of properties in editors
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Main,
    Shape,
    Position,
    Additional,
    Text,
    Prefab,
}

/// One named property of a style record with its accessors.
/// `set` is only called with a value its `ty` accepts.
pub struct PropertyDef<S: 'static> {
    pub name: &'static str,
    pub category: Category,
    pub ty: PropType,
    pub get: fn(&S) -> PropValue,
    pub set: fn(&mut S, PropValue) -> Result<(), StyleError>,
}

pub trait StyleProps: Sized + 'static {
    const PROPERTIES: &'static [PropertyDef<Self>];

    fn property(name: &str) -> Option<&'static PropertyDef<Self>> {
        Self::PROPERTIES.iter().find(|d| d.name == name)
    }

    fn get_prop(&self, name: &str) -> Result<PropValue, StyleError> {
        let def =
            Self::property(name).ok_or_else(|| StyleError::UnknownProperty(name.to_string()))?;
        Ok((def.get)(self))
    }

    fn set_prop(&mut self, name: &str, v: PropValue) -> Result<(), StyleError> {
        let def =
            Self::property(name).ok_or_else(|| StyleError::UnknownProperty(name.to_string()))?;
        if !def.ty.accepts(&v) {
            return Err(StyleError::TypeMismatch {
                property: name.to_string(),
                expected: def.ty.name(),
            });
        }
        (def.set)(self, v)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: &'static str,
    pub category: Category,
    pub ty: PropType,
}

impl<S> From<&PropertyDef<S>> for PropertyInfo {
    fn from(d: &PropertyDef<S>) -> Self {
        Self {
            name: d.name,
            category: d.category,
            ty: d.ty,
        }
    }
}

/// Enums usable as style properties, stored as their variant index
pub trait StyleEnum: Copy + Sized {
    const NAMES: &'static [&'static str];

    fn index(self) -> u8;
    fn from_index(i: u8) -> Option<Self>;
}

macro_rules! style_enum {
    ($(#[$m:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$m])*
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl $crate::style::StyleEnum for $name {
            const NAMES: &'static [&'static str] = &[$(stringify!($variant)),+];

            fn index(self) -> u8 {
                self as u8
            }

            fn from_index(i: u8) -> Option<Self> {
                [$($name::$variant),+].get(i as usize).copied()
            }
        }
    };
}

style_enum!(
    /// Placement of a pair of lines or of text relative to the trajectory
    Alignment { Centre, Left, Right }
);
style_enum!(TextDirection { LeftToRight, TopToBottom, BottomToTop });
style_enum!(
    /// How scattered instances are spread between the two ends
    Distribution { FixedSpaceFreeEnd, FixedSpaceFixedEnd, DynamicSpaceFixedEnd }
);
style_enum!(ColorOption { Original, Custom, Random });

/// Builds a `PropertyDef` for a field of `Self`
macro_rules! prop {
    ($name:literal, $cat:ident, float $field:ident [$min:expr, $max:expr]) => {
        $crate::style::PropertyDef {
            name: $name,
            category: $crate::style::Category::$cat,
            ty: $crate::style::PropType::Float,
            get: |s: &Self| $crate::style::PropValue::Float(s.$field),
            set: |s: &mut Self, v: $crate::style::PropValue| {
                if let Some(x) = v.as_float() {
                    s.$field = x.clamp($min, $max);
                }
                Ok(())
            },
        }
    };
    ($name:literal, $cat:ident, int $field:ident [$min:expr, $max:expr]) => {
        $crate::style::PropertyDef {
            name: $name,
            category: $crate::style::Category::$cat,
            ty: $crate::style::PropType::Int,
            get: |s: &Self| $crate::style::PropValue::Int(s.$field as i32),
            set: |s: &mut Self, v: $crate::style::PropValue| {
                if let $crate::style::PropValue::Int(x) = v {
                    s.$field = x.clamp($min, $max) as _;
                }
                Ok(())
            },
        }
    };
    ($name:literal, $cat:ident, bool $field:ident) => {
        $crate::style::PropertyDef {
            name: $name,
            category: $crate::style::Category::$cat,
            ty: $crate::style::PropType::Bool,
            get: |s: &Self| $crate::style::PropValue::Bool(s.$field),
            set: |s: &mut Self, v: $crate::style::PropValue| {
                if let Some(x) = v.as_bool() {
                    s.$field = x;
                }
                Ok(())
            },
        }
    };
    ($name:literal, $cat:ident, color $field:ident) => {
        $crate::style::PropertyDef {
            name: $name,
            category: $crate::style::Category::$cat,
            ty: $crate::style::PropType::Color,
            get: |s: &Self| $crate::style::PropValue::Color(s.$field),
            set: |s: &mut Self, v: $crate::style::PropValue| {
                if let Some(c) = v.as_color() {
                    s.$field = c;
                }
                Ok(())
            },
        }
    };
    // a min/max pair, kept sorted
    ($name:literal, $cat:ident, range $field:ident [$min:expr, $max:expr]) => {
        $crate::style::PropertyDef {
            name: $name,
            category: $crate::style::Category::$cat,
            ty: $crate::style::PropType::Vec2,
            get: |s: &Self| $crate::style::PropValue::Vec2(s.$field),
            set: |s: &mut Self, v: $crate::style::PropValue| {
                if let $crate::style::PropValue::Vec2(r) = v {
                    let a = r.x.clamp($min, $max);
                    let b = r.y.clamp($min, $max);
                    s.$field = geom::vec2(a.min(b), a.max(b));
                }
                Ok(())
            },
        }
    };
    ($name:literal, $cat:ident, vec2 $field:ident [$min:expr, $max:expr]) => {
        $crate::style::PropertyDef {
            name: $name,
            category: $crate::style::Category::$cat,
            ty: $crate::style::PropType::Vec2,
            get: |s: &Self| $crate::style::PropValue::Vec2(s.$field),
            set: |s: &mut Self, v: $crate::style::PropValue| {
                if let $crate::style::PropValue::Vec2(r) = v {
                    s.$field = geom::vec2(r.x.clamp($min, $max), r.y.clamp($min, $max));
                }
                Ok(())
            },
        }
    };
    ($name:literal, $cat:ident, enum $field:ident : $ty:ty) => {
        $crate::style::PropertyDef {
            name: $name,
            category: $crate::style::Category::$cat,
            ty: $crate::style::PropType::Enum(<$ty as $crate::style::StyleEnum>::NAMES),
            get: |s: &Self| {
                $crate::style::PropValue::Enum($crate::style::StyleEnum::index(s.$field))
            },
            set: |s: &mut Self, v: $crate::style::PropValue| {
                if let $crate::style::PropValue::Enum(i) = v {
                    s.$field = <$ty as $crate::style::StyleEnum>::from_index(i)
                        .ok_or_else(|| $crate::StyleError::OutOfRange($name.to_string()))?;
                }
                Ok(())
            },
        }
    };
    ($name:literal, $cat:ident, prefab $field:ident) => {
        $crate::style::PropertyDef {
            name: $name,
            category: $crate::style::Category::$cat,
            ty: $crate::style::PropType::Prefab,
            get: |s: &Self| $crate::style::PropValue::Prefab(s.$field.clone()),
            set: |s: &mut Self, v: $crate::style::PropValue| {
                if let $crate::style::PropValue::Prefab(p) = v {
                    s.$field = p.filter(|p| !p.is_empty());
                }
                Ok(())
            },
        }
    };
    ($name:literal, $cat:ident, text $field:ident) => {
        $crate::style::PropertyDef {
            name: $name,
            category: $crate::style::Category::$cat,
            ty: $crate::style::PropType::Text,
            get: |s: &Self| $crate::style::PropValue::Text(s.$field.clone()),
            set: |s: &mut Self, v: $crate::style::PropValue| {
                if let $crate::style::PropValue::Text(t) = v {
                    s.$field = t;
                }
                Ok(())
            },
        }
    };
}

pub(crate) use prop;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_indices() {
        assert_eq!(Alignment::NAMES, &["Centre", "Left", "Right"]);
        assert_eq!(Alignment::from_index(2), Some(Alignment::Right));
        assert_eq!(Alignment::from_index(3), None);
        assert_eq!(Distribution::DynamicSpaceFixedEnd.index(), 2);
    }

    #[test]
    fn type_acceptance() {
        assert!(PropType::Float.accepts(&PropValue::Float(1.0)));
        assert!(!PropType::Float.accepts(&PropValue::Int(1)));
        assert!(PropType::Enum(TextDirection::NAMES).accepts(&PropValue::Enum(0)));
    }
}
