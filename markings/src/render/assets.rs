use crate::render::text::{BuiltinFont, FontAtlas};
use common::FastMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the generator needs to know about a prefab: how long one repetition is and how
/// heavy it is to draw at each level of detail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrefabInfo {
    pub name: String,
    /// Length of one network segment along its axis, in meters
    pub length: f32,
    /// (vertices, triangles) per level of detail, most detailed first
    pub lods: Vec<(usize, usize)>,
}

impl PrefabInfo {
    pub fn new(name: impl Into<String>, length: f32, lods: Vec<(usize, usize)>) -> Self {
        Self {
            name: name.into(),
            length,
            lods,
        }
    }

    /// Stand-in used when a style references a prefab the host doesn't have
    pub fn fallback() -> Self {
        Self::new("fallback", 8.0, vec![(24, 12), (8, 4)])
    }

    /// Counts at `lod`, the coarsest level is used past the end
    pub fn counts(&self, lod: usize) -> (usize, usize) {
        self.lods
            .get(lod)
            .or_else(|| self.lods.last())
            .copied()
            .unwrap_or((0, 0))
    }
}

/// The host's assets as seen by primitive generation
pub trait AssetProvider {
    fn prefab(&self, name: &str) -> Option<&PrefabInfo>;
    fn font(&self, name: &str) -> Option<&dyn FontAtlas>;
    fn default_font(&self) -> &dyn FontAtlas;

    /// The prefab, or the fallback with a warning when it's missing
    fn prefab_or_fallback(&self, name: &str) -> PrefabInfo {
        match self.prefab(name) {
            Some(p) => p.clone(),
            None => {
                warn!("prefab {} not found, using the fallback", name);
                PrefabInfo::fallback()
            }
        }
    }

    /// The font, or the default one with a warning when it's not installed.
    /// An empty name asks for the default without warning.
    fn font_or_default(&self, name: &str) -> &dyn FontAtlas {
        if name.is_empty() {
            return self.default_font();
        }
        match self.font(name) {
            Some(f) => f,
            None => {
                warn!("font {} not installed, using the default font", name);
                self.default_font()
            }
        }
    }
}

/// In-memory assets, registered by the host at startup
pub struct Assets {
    prefabs: FastMap<String, PrefabInfo>,
    fonts: BTreeMap<String, Box<dyn FontAtlas>>,
    builtin: BuiltinFont,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            prefabs: FastMap::default(),
            fonts: BTreeMap::new(),
            builtin: BuiltinFont,
        }
    }
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_prefab(&mut self, prefab: PrefabInfo) {
        self.prefabs.insert(prefab.name.clone(), prefab);
    }

    pub fn add_font(&mut self, name: impl Into<String>, font: Box<dyn FontAtlas>) {
        self.fonts.insert(name.into(), font);
    }

    /// Sorted prefab names, for editors
    pub fn prefab_names(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.prefabs.keys().map(String::as_str).collect();
        v.sort_unstable();
        v
    }

    pub fn font_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(BuiltinFont::NAME).chain(self.fonts.keys().map(String::as_str))
    }
}

impl AssetProvider for Assets {
    fn prefab(&self, name: &str) -> Option<&PrefabInfo> {
        self.prefabs.get(name)
    }

    fn font(&self, name: &str) -> Option<&dyn FontAtlas> {
        if name == BuiltinFont::NAME {
            return Some(&self.builtin);
        }
        self.fonts.get(name).map(|f| &**f)
    }

    fn default_font(&self) -> &dyn FontAtlas {
        &self.builtin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_assets_fall_back() {
        let mut a = Assets::new();
        a.add_prefab(PrefabInfo::new("bollard", 1.0, vec![(40, 20)]));
        a.add_prefab(PrefabInfo::new("arch", 3.0, vec![(40, 20)]));
        assert_eq!(a.prefab_names(), vec!["arch", "bollard"]);
        assert_eq!(a.prefab_or_fallback("bollard").length, 1.0);
        assert_eq!(a.prefab_or_fallback("nope"), PrefabInfo::fallback());
        assert_eq!(a.font_or_default("Comic").name(), BuiltinFont::NAME);
        assert_eq!(a.font_or_default("").name(), BuiltinFont::NAME);
    }

    #[test]
    fn counts_past_last_lod() {
        let p = PrefabInfo::new("x", 1.0, vec![(10, 5), (4, 2)]);
        assert_eq!(p.counts(0), (10, 5));
        assert_eq!(p.counts(5), (4, 2));
    }
}
