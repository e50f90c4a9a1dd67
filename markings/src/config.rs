use crate::render::LodType;
use common::saveload::{Encoder, JSONPretty};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables of the primitive generation and LOD selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Markings further than this from the camera are not drawn at all
    pub max_render_distance: f32,
    /// LOD0 is drawn below this distance, LOD1 above
    pub lod_distance: f32,

    /// Curved solid parts are subdivided until the tangent turns less than this (degrees)
    pub min_angle: f32,
    pub min_length: f32,
    pub max_length: f32,
    pub lod1_min_angle: f32,
    pub lod1_max_length: f32,

    /// Tessellation step of curved meshes and contours, in samples per meter
    pub curve_detail: f32,

    pub filler_decal_max_vertices: usize,
    pub filler_split_max_vertices: usize,

    pub default_font: String,
    pub text_pixels_per_meter: f32,

    /// Lift applied to decals to avoid z-fighting with the pavement
    pub elevation_offset: f32,

    /// Groups that get merged into a static batch when far away
    pub batch_lod_types: Vec<LodType>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_render_distance: 1000.0,
            lod_distance: 300.0,
            min_angle: 5.0,
            min_length: 1.0,
            max_length: 10.0,
            lod1_min_angle: 15.0,
            lod1_max_length: 50.0,
            curve_detail: 0.2,
            filler_decal_max_vertices: 16,
            filler_split_max_vertices: 8,
            default_font: "builtin".to_string(),
            text_pixels_per_meter: 20.0,
            elevation_offset: 0.01,
            batch_lod_types: vec![LodType::Network, LodType::Prop, LodType::Tree],
        }
    }
}

impl RenderConfig {
    /// Loads the config at `stem`.json, falling back to defaults.
    /// The normalized config is written back so that new fields appear in the file.
    pub fn load(stem: impl AsRef<Path>) -> Self {
        let stem = stem.as_ref();
        let c = match JSONPretty::load::<RenderConfig>(stem) {
            Some(c) => c,
            None => {
                log::error!(
                    "could not load render config at {}, using defaults",
                    JSONPretty::filename(stem).display()
                );
                RenderConfig::default()
            }
        }
        .normalized();
        c.save(stem);
        c
    }

    pub fn save(&self, stem: impl AsRef<Path>) -> Option<()> {
        JSONPretty::save(self, stem)
    }

    /// Clamps values that would make generation degenerate
    pub fn normalized(mut self) -> Self {
        self.min_length = self.min_length.max(0.05);
        self.max_length = self.max_length.max(self.min_length);
        self.lod1_max_length = self.lod1_max_length.max(self.max_length);
        self.min_angle = self.min_angle.clamp(0.1, 90.0);
        self.lod1_min_angle = self.lod1_min_angle.clamp(self.min_angle, 90.0);
        self.curve_detail = self.curve_detail.clamp(0.01, 10.0);
        self.filler_split_max_vertices = self.filler_split_max_vertices.max(3);
        self.filler_decal_max_vertices = self
            .filler_decal_max_vertices
            .max(self.filler_split_max_vertices);
        self.text_pixels_per_meter = self.text_pixels_per_meter.max(1.0);
        self.lod_distance = self.lod_distance.min(self.max_render_distance);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_gets_defaults() {
        let c: RenderConfig = common::saveload::JSON::decode(br#"{"lod_distance": 120.0}"#).unwrap();
        assert_eq!(c.lod_distance, 120.0);
        assert_eq!(c.max_render_distance, 1000.0);
        assert_eq!(c.filler_decal_max_vertices, 16);
    }

    #[test]
    fn normalize_clamps() {
        let c = RenderConfig {
            min_length: -1.0,
            max_length: 0.0,
            filler_split_max_vertices: 1,
            ..Default::default()
        }
        .normalized();
        assert!(c.min_length > 0.0);
        assert!(c.max_length >= c.min_length);
        assert_eq!(c.filler_split_max_vertices, 3);
    }
}
