use crate::{MarkingKind, Style, StyleType};
use serde::{Deserialize, Serialize};
use slotmapd::{new_key_type, SlotMap};
use std::collections::BTreeMap;

new_key_type! {
    pub struct TemplateID;
}

/// A named style saved by the user
#[derive(Clone, Debug, PartialEq)]
pub struct StyleTemplate {
    pub id: TemplateID,
    pub name: String,
    pub style: Style,
}

impl StyleTemplate {
    pub fn style_type(&self) -> StyleType {
        self.style.style_type()
    }
}

/// Owns the templates, at most one of them is the default of each style type.
/// Constructed explicitly and passed to whoever needs default styles.
#[derive(Default)]
pub struct TemplateManager {
    templates: SlotMap<TemplateID, StyleTemplate>,
    defaults: BTreeMap<StyleType, TemplateID>,
}

defer_serialize!(TemplateManager, SerializedTemplates);

impl TemplateManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn unique_name(&self, name: &str) -> String {
        let taken = |n: &str| self.templates.values().any(|t| t.name == n);
        if !taken(name) {
            return name.to_string();
        }
        (2..)
            .map(|i| format!("{} ({})", name, i))
            .find(|n| !taken(n))
            .unwrap_or_else(|| name.to_string())
    }

    pub fn add(&mut self, name: &str, style: Style) -> TemplateID {
        let name = self.unique_name(name);
        info!("add template {} of type {:?}", name, style.style_type());
        self.templates
            .insert_with_key(|id| StyleTemplate { id, name, style })
    }

    pub fn remove(&mut self, id: TemplateID) -> Option<StyleTemplate> {
        let t = self.templates.remove(id)?;
        info!("remove template {}", t.name);
        if self.defaults.get(&t.style_type()) == Some(&id) {
            self.defaults.remove(&t.style_type());
        }
        Some(t)
    }

    pub fn rename(&mut self, id: TemplateID, name: &str) -> bool {
        if !self.templates.contains_key(id) {
            return false;
        }
        let name = self.unique_name(name);
        let t = unwrap_ret!(self.templates.get_mut(id), false);
        t.name = name;
        true
    }

    /// Replaces the template's style, the style type may change
    pub fn update_style(&mut self, id: TemplateID, style: Style) -> bool {
        let t = unwrap_ret!(self.templates.get_mut(id), false);
        let old_type = t.style_type();
        t.style = style;
        if old_type != t.style_type() && self.defaults.get(&old_type) == Some(&id) {
            self.defaults.remove(&old_type);
        }
        true
    }

    pub fn duplicate(&mut self, id: TemplateID) -> Option<TemplateID> {
        let t = self.templates.get(id)?;
        let (name, style) = (t.name.clone(), t.style.clone());
        Some(self.add(&name, style))
    }

    pub fn get(&self, id: TemplateID) -> Option<&StyleTemplate> {
        self.templates.get(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleTemplate> {
        self.templates.values()
    }

    pub fn of_type(&self, t: StyleType) -> impl Iterator<Item = &StyleTemplate> {
        self.templates.values().filter(move |x| x.style_type() == t)
    }

    /// Makes the template the default of its style type, or stops it being one
    pub fn set_default(&mut self, id: TemplateID, is_default: bool) -> bool {
        let t = unwrap_ret!(self.templates.get(id), false).style_type();
        if is_default {
            self.defaults.insert(t, id);
        } else if self.defaults.get(&t) == Some(&id) {
            self.defaults.remove(&t);
        }
        true
    }

    pub fn is_default(&self, id: TemplateID) -> bool {
        self.defaults.values().any(|&x| x == id)
    }

    pub fn default_template(&self, t: StyleType) -> Option<&StyleTemplate> {
        self.templates.get(*self.defaults.get(&t)?)
    }

    /// The default template's style if there is one, the canonical style otherwise.
    /// Always a copy.
    pub fn default_style(&self, t: StyleType) -> Style {
        match self.default_template(t) {
            Some(x) => x.style.clone(),
            None => t.default_style(),
        }
    }

    pub fn default_style_of(&self, kind: MarkingKind) -> Style {
        self.default_style(StyleType::default_of(kind))
    }

    /// A copy of the template's style, None if the template is gone or doesn't apply to `kind`
    pub fn style_for(&self, id: TemplateID, kind: MarkingKind) -> Option<Style> {
        let t = self.templates.get(id)?;
        if t.style.kind() != kind {
            return None;
        }
        Some(t.style.clone())
    }
}

#[derive(Default, Serialize, Deserialize)]
pub(crate) struct SerializedTemplates {
    templates: Vec<SerializedTemplate>,
}

#[derive(Serialize, Deserialize)]
struct SerializedTemplate {
    name: String,
    style: Style,
    is_default: bool,
}

impl From<&TemplateManager> for SerializedTemplates {
    fn from(m: &TemplateManager) -> Self {
        Self {
            templates: m
                .templates
                .values()
                .map(|t| SerializedTemplate {
                    name: t.name.clone(),
                    style: t.style.clone(),
                    is_default: m.is_default(t.id),
                })
                .collect(),
        }
    }
}

impl From<SerializedTemplates> for TemplateManager {
    fn from(s: SerializedTemplates) -> Self {
        let mut m = TemplateManager::default();
        for t in s.templates {
            let id = m.add(&t.name, t.style);
            if t.is_default {
                m.set_default(id, true);
            }
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropValue;
    use common::saveload::{Encoder, JSON};

    #[test]
    fn one_default_per_type() {
        let mut m = TemplateManager::new();
        let mut wide = StyleType::RegularSolid.default_style();
        wide.set("Width", PropValue::Float(0.5)).unwrap();
        let a = m.add("wide", wide.clone());
        let b = m.add("wide", StyleType::RegularSolid.default_style());
        assert_eq!(m.get(b).unwrap().name, "wide (2)");

        assert_eq!(
            m.default_style(StyleType::RegularSolid),
            StyleType::RegularSolid.default_style()
        );
        m.set_default(a, true);
        assert_eq!(m.default_style(StyleType::RegularSolid), wide);
        m.set_default(b, true);
        assert!(!m.is_default(a));
        assert!(m.is_default(b));

        m.remove(b);
        assert_eq!(
            m.default_style(StyleType::RegularSolid),
            StyleType::RegularSolid.default_style()
        );
    }

    #[test]
    fn style_for_checks_kind() {
        let mut m = TemplateManager::new();
        let id = m.add("zebra", StyleType::CrosswalkZebra.default_style());
        assert!(m.style_for(id, MarkingKind::Crosswalk).is_some());
        assert!(m.style_for(id, MarkingKind::Regular).is_none());
    }

    #[test]
    fn roundtrip_keeps_defaults() {
        let mut m = TemplateManager::new();
        let id = m.add("grid", StyleType::FillerGrid.default_style());
        m.add("other", StyleType::FillerSolid.default_style());
        m.set_default(id, true);

        let data = JSON::encode(&m).unwrap();
        let m2: TemplateManager = JSON::decode(&data).unwrap();
        assert_eq!(m2.len(), 2);
        let d = m2.default_template(StyleType::FillerGrid).unwrap();
        assert_eq!(d.name, "grid");
        assert!(m2.default_template(StyleType::FillerSolid).is_none());
    }
}
