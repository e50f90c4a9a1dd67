/// Placement of one glyph relative to the pen position, in pixels.
/// `ymin` is the offset of the bitmap's bottom row from the baseline, positive upward.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GlyphMetrics {
    pub advance: f32,
    pub xmin: i32,
    pub ymin: i32,
    pub width: usize,
    pub height: usize,
}

/// Vertical metrics of a font at a pixel size
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_height: f32,
}

/// A source of glyph coverage bitmaps
pub trait FontAtlas {
    fn name(&self) -> &str;
    fn line_metrics(&self, px: f32) -> LineMetrics;
    fn metrics(&self, c: char, px: f32) -> GlyphMetrics;
    /// Coverage of the glyph, row major, top row first, `width * height` bytes
    fn rasterize(&self, c: char, px: f32) -> (GlyphMetrics, Vec<u8>);
}

/// 5x7 bitmap font always available, used when a font is not installed
#[derive(Copy, Clone, Debug, Default)]
pub struct BuiltinFont;

const CELL_W: f32 = 6.0;
const CELL_H: f32 = 8.0;
const GLYPH_W: usize = 5;
const GLYPH_H: usize = 7;

impl BuiltinFont {
    pub const NAME: &'static str = "builtin";

    fn scale(px: f32) -> f32 {
        (px / CELL_H).max(0.125)
    }

    fn glyph(c: char) -> Option<[u8; GLYPH_H]> {
        let c = c.to_ascii_uppercase();
        Some(match c {
            ' ' | '\t' => return None,
            '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
            '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
            '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
            '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
            '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
            '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
            '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
            '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
            '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
            '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
            'A' => [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11],
            'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
            'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
            'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
            'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
            'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
            'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
            'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
            'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
            'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
            'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
            'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
            'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
            'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
            'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
            'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
            'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
            'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
            'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
            'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
            'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
            'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
            'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
            'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
            'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
            'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
            '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
            ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
            '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
            '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
            '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
            ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
            '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
            '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
            '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
            ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
            '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
            '=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
            '<' => [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02],
            '>' => [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08],
            '*' => [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00],
            _ => [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F],
        })
    }
}

impl FontAtlas for BuiltinFont {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn line_metrics(&self, px: f32) -> LineMetrics {
        let s = Self::scale(px);
        LineMetrics {
            ascent: GLYPH_H as f32 * s,
            descent: (CELL_H - GLYPH_H as f32) * s,
            line_height: CELL_H * s,
        }
    }

    fn metrics(&self, c: char, px: f32) -> GlyphMetrics {
        let s = Self::scale(px);
        let advance = CELL_W * s;
        if Self::glyph(c).is_none() {
            return GlyphMetrics {
                advance,
                ..Default::default()
            };
        }
        GlyphMetrics {
            advance,
            xmin: 0,
            ymin: 0,
            width: (GLYPH_W as f32 * s).ceil() as usize,
            height: (GLYPH_H as f32 * s).ceil() as usize,
        }
    }

    fn rasterize(&self, c: char, px: f32) -> (GlyphMetrics, Vec<u8>) {
        let m = self.metrics(c, px);
        let rows = unwrap_ret!(Self::glyph(c), (m, vec![]));
        let s = Self::scale(px);
        let mut bitmap = vec![0; m.width * m.height];
        for y in 0..m.height {
            let sy = ((y as f32 / s) as usize).min(GLYPH_H - 1);
            for x in 0..m.width {
                let sx = ((x as f32 / s) as usize).min(GLYPH_W - 1);
                if rows[sy] & (0x10 >> sx) != 0 {
                    bitmap[y * m.width + x] = 255;
                }
            }
        }
        (m, bitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scales_with_px() {
        let f = BuiltinFont;
        let (m, bmp) = f.rasterize('A', 16.0);
        assert_eq!((m.width, m.height), (10, 14));
        assert_eq!(bmp.len(), 140);
        // top row of 'A' is .XXX.
        assert_eq!(bmp[0], 0);
        assert_eq!(bmp[2], 255);

        let (m, bmp) = f.rasterize(' ', 16.0);
        assert_eq!(m.width, 0);
        assert!(bmp.is_empty());
        assert_eq!(m.advance, 12.0);
    }

    #[test]
    fn lowercase_maps_to_uppercase() {
        let f = BuiltinFont;
        assert_eq!(f.rasterize('q', 8.0), f.rasterize('Q', 8.0));
    }
}
