//! Lays out a string and rasterizes it into a single channel texture.
//! Text is split into runs, measured with the font metrics and broken greedily into lines.

mod font;
mod fontdue_atlas;

pub use font::*;
pub use fontdue_atlas::*;

use crate::style::Alignment;
use geom::{next_pow2_clamped, vec2, Vec2};

pub const MIN_TEXTURE_SIZE: u32 = 32;
pub const MAX_TEXTURE_SIZE: u32 = 1024;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    Whitespace,
    Newline,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub width: f32,
}

/// Ideographs and kana can break anywhere
pub fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF | 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xAC00..=0xD7AF | 0xF900..=0xFAFF)
}

/// Splits into text, whitespace and newline runs.
/// With `char_wrap`, every CJK character is its own run.
pub fn tokenize(text: &str, char_wrap: bool) -> Vec<(TokenKind, String)> {
    let mut tokens: Vec<(TokenKind, String)> = vec![];
    for c in text.chars() {
        let kind = match c {
            '\n' => TokenKind::Newline,
            '\r' => continue,
            c if c.is_whitespace() => TokenKind::Whitespace,
            _ => TokenKind::Text,
        };
        let alone = kind == TokenKind::Newline || (char_wrap && is_cjk(c));
        match tokens.last_mut() {
            Some((k, s)) if *k == kind && !alone && !(char_wrap && s.chars().any(is_cjk)) => {
                s.push(c)
            }
            _ => tokens.push((kind, c.to_string())),
        }
    }
    tokens
}

#[derive(Clone, Debug)]
pub struct TextParams<'a> {
    pub text: &'a str,
    /// Glyph size in pixels
    pub px: f32,
    /// (character, line) spacing in pixels
    pub spacing: Vec2,
    pub alignment: Alignment,
    /// Maximum line width in pixels, 0 for no limit
    pub max_width: f32,
    pub word_wrap: bool,
    pub char_wrap: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutLine {
    pub tokens: Vec<Token>,
    pub width: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayout {
    pub lines: Vec<LayoutLine>,
    pub width: f32,
    pub height: f32,
    pub line_height: f32,
    pub ascent: f32,
}

fn measure(font: &dyn FontAtlas, s: &str, px: f32, spacing: f32) -> f32 {
    s.chars().map(|c| font.metrics(c, px).advance + spacing).sum()
}

/// Greedy line breaking
pub fn layout(font: &dyn FontAtlas, p: &TextParams) -> TextLayout {
    let lm = font.line_metrics(p.px);
    let wrap = (p.word_wrap || p.char_wrap) && p.max_width > 0.0;

    let mut lines = vec![LayoutLine::default()];
    for (kind, text) in tokenize(p.text, p.char_wrap) {
        if kind == TokenKind::Newline {
            lines.push(LayoutLine::default());
            continue;
        }
        let width = measure(font, &text, p.px, p.spacing.x);
        let cur = lines.len() - 1;
        let line = &mut lines[cur];
        if kind == TokenKind::Whitespace && wrap && line.tokens.is_empty() && cur > 0 {
            continue;
        }
        if kind == TokenKind::Text
            && wrap
            && !line.tokens.is_empty()
            && line.width + width > p.max_width
        {
            while line
                .tokens
                .last()
                .map_or(false, |t| t.kind == TokenKind::Whitespace)
            {
                if let Some(t) = line.tokens.pop() {
                    line.width -= t.width;
                }
            }
            lines.push(LayoutLine::default());
        }
        let cur = lines.len() - 1;
        let line = &mut lines[cur];
        line.width += width;
        line.tokens.push(Token { kind, text, width });
    }

    let line_height = lm.line_height + p.spacing.y;
    let width = lines.iter().map(|l| l.width).fold(0.0, f32::max);
    let height = line_height * lines.len() as f32 - p.spacing.y.max(0.0);
    TextLayout {
        lines,
        width,
        height: height.max(0.0),
        line_height,
        ascent: lm.ascent,
    }
}

/// Single channel coverage texture, row major, top row first
#[derive(Clone, PartialEq)]
pub struct TextTexture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// Size of the text inside the texture, in pixels
    pub text_size: Vec2,
}

impl std::fmt::Debug for TextTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextTexture")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("text_size", &self.text_size)
            .finish()
    }
}

impl TextTexture {
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    /// Number of pixels with some coverage
    pub fn coverage(&self) -> usize {
        self.pixels.iter().filter(|&&p| p > 0).count()
    }
}

/// Lays out and rasterizes the text. Text too large for the biggest texture is scaled down.
/// Returns None for empty or blank text.
pub fn render_text(font: &dyn FontAtlas, p: &TextParams) -> Option<TextTexture> {
    if p.text.trim().is_empty() || p.px <= 0.0 {
        return None;
    }
    let mut params = p.clone();
    let mut lay = layout(font, &params);
    let biggest = lay.width.max(lay.height);
    if biggest > MAX_TEXTURE_SIZE as f32 {
        let f = MAX_TEXTURE_SIZE as f32 / biggest;
        params.px *= f;
        params.spacing = params.spacing * f;
        params.max_width *= f;
        lay = layout(font, &params);
    }
    if lay.width <= 0.0 {
        return None;
    }

    let tw = next_pow2_clamped(lay.width.ceil() as u32, MIN_TEXTURE_SIZE, MAX_TEXTURE_SIZE);
    let th = next_pow2_clamped(lay.height.ceil() as u32, MIN_TEXTURE_SIZE, MAX_TEXTURE_SIZE);
    let mut pixels = vec![0u8; (tw * th) as usize];

    // the text block is centered in the texture
    let ox = (tw as f32 - lay.width) * 0.5;
    let oy = (th as f32 - lay.height) * 0.5;

    for (i, line) in lay.lines.iter().enumerate() {
        let x0 = match params.alignment {
            Alignment::Left => 0.0,
            Alignment::Centre => (lay.width - line.width) * 0.5,
            Alignment::Right => lay.width - line.width,
        };
        let mut pen = ox + x0;
        let baseline = oy + lay.line_height * i as f32 + lay.ascent;
        for token in &line.tokens {
            for c in token.text.chars() {
                let (m, bitmap) = font.rasterize(c, params.px);
                let gx = (pen + m.xmin as f32).round() as i32;
                let gy = (baseline - m.ymin as f32 - m.height as f32).round() as i32;
                blit(&mut pixels, tw, th, gx, gy, &m, &bitmap);
                pen += m.advance + params.spacing.x;
            }
        }
    }

    Some(TextTexture {
        width: tw,
        height: th,
        pixels,
        text_size: vec2(lay.width, lay.height),
    })
}

fn blit(pixels: &mut [u8], tw: u32, th: u32, gx: i32, gy: i32, m: &GlyphMetrics, bitmap: &[u8]) {
    for y in 0..m.height {
        let py = gy + y as i32;
        if py < 0 || py >= th as i32 {
            continue;
        }
        for x in 0..m.width {
            let px = gx + x as i32;
            if px < 0 || px >= tw as i32 {
                continue;
            }
            let src = unwrap_cont!(bitmap.get(y * m.width + x));
            let dst = &mut pixels[(py as u32 * tw + px as u32) as usize];
            *dst = (*dst).max(*src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(text: &str) -> TextParams {
        TextParams {
            text,
            px: 8.0,
            spacing: Vec2::ZERO,
            alignment: Alignment::Left,
            max_width: 0.0,
            word_wrap: false,
            char_wrap: false,
        }
    }

    #[test]
    fn tokens() {
        let t = tokenize("BUS  LANE\nSLOW", false);
        let kinds: Vec<_> = t.iter().map(|x| x.0).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Text,
                TokenKind::Whitespace,
                TokenKind::Text,
                TokenKind::Newline,
                TokenKind::Text
            ]
        );
        assert_eq!(t[1].1, "  ");

        assert_eq!(tokenize("停止線", true).len(), 3);
        assert_eq!(tokenize("停止線", false).len(), 1);
    }

    #[test]
    fn word_wrap_breaks_greedily() {
        let mut p = params("AB CD EF");
        // builtin font at 8px advances 6px per char
        p.word_wrap = true;
        p.max_width = 30.0;
        let l = layout(&BuiltinFont, &p);
        assert_eq!(l.lines.len(), 2);
        assert_eq!(l.lines[0].width, 30.0);
        assert_eq!(l.lines[1].width, 12.0);
        assert_eq!(l.height, 16.0);

        p.word_wrap = false;
        let l = layout(&BuiltinFont, &p);
        assert_eq!(l.lines.len(), 1);
        assert_eq!(l.width, 48.0);
    }

    #[test]
    fn texture_is_pow2() {
        let t = render_text(&BuiltinFont, &params("STOP")).unwrap();
        assert_eq!((t.width, t.height), (32, 32));
        assert!(t.coverage() > 0);

        let mut p = params("SCHOOL");
        p.px = 16.0;
        let t = render_text(&BuiltinFont, &p).unwrap();
        assert_eq!((t.width, t.height), (128, 32));

        assert!(render_text(&BuiltinFont, &params("   ")).is_none());
    }

    #[test]
    fn huge_text_is_scaled_down() {
        let mut p = params("AVERYLONGWORD");
        p.px = 400.0;
        let t = render_text(&BuiltinFont, &p).unwrap();
        assert_eq!(t.width, MAX_TEXTURE_SIZE);
        assert!(t.text_size.x <= MAX_TEXTURE_SIZE as f32 + 1e-2);
    }
}
