use crate::render::text::{FontAtlas, GlyphMetrics, LineMetrics};
use fontdue::{Font, FontSettings};

/// A TrueType/OpenType font rasterized with fontdue
pub struct FontdueAtlas {
    name: String,
    font: Font,
}

impl FontdueAtlas {
    pub fn from_bytes(name: impl Into<String>, data: &[u8]) -> Result<Self, &'static str> {
        let font = Font::from_bytes(data, FontSettings::default())?;
        Ok(Self {
            name: name.into(),
            font,
        })
    }

    /// Reads a font file, the file stem becomes the font name
    pub fn load(path: &std::path::Path) -> Option<Self> {
        let data = match std::fs::read(path) {
            Ok(d) => d,
            Err(e) => {
                log::error!("could not read font {}: {}", path.display(), e);
                return None;
            }
        };
        let name = path.file_stem()?.to_string_lossy().into_owned();
        match Self::from_bytes(name, &data) {
            Ok(f) => Some(f),
            Err(e) => {
                log::error!("could not parse font {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn convert(m: fontdue::Metrics) -> GlyphMetrics {
    GlyphMetrics {
        advance: m.advance_width,
        xmin: m.xmin,
        ymin: m.ymin,
        width: m.width,
        height: m.height,
    }
}

impl FontAtlas for FontdueAtlas {
    fn name(&self) -> &str {
        &self.name
    }

    fn line_metrics(&self, px: f32) -> LineMetrics {
        match self.font.horizontal_line_metrics(px) {
            Some(v) => LineMetrics {
                ascent: v.ascent,
                descent: v.descent.abs(),
                line_height: v.new_line_size.ceil(),
            },
            None => LineMetrics {
                ascent: px * 0.8,
                descent: px * 0.2,
                line_height: px,
            },
        }
    }

    fn metrics(&self, c: char, px: f32) -> GlyphMetrics {
        convert(self.font.metrics(c, px))
    }

    fn rasterize(&self, c: char, px: f32) -> (GlyphMetrics, Vec<u8>) {
        let (m, bitmap) = self.font.rasterize(c, px);
        (convert(m), bitmap)
    }
}
