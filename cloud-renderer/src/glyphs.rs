//! Glyph rasterization.
//!
//! A [`GlyphSource`] turns a word and a pixel size into a coverage mask. The
//! built-in bitmap font needs no files; an outline font is loaded from disk.

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use cloudword_core::RenderError;
use font8x8::{UnicodeFonts, BASIC_FONTS, GREEK_FONTS, LATIN_FONTS};
use std::path::Path;
use tracing::info;

const BITMAP_CELL: u32 = 8;

/// Per-pixel coverage, 0 (empty) to 255 (solid).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphMask {
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl GlyphMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage[(y * self.width + x) as usize]
    }

    /// Keep the stronger of the existing and new coverage.
    pub fn cover(&mut self, x: i64, y: i64, value: u8) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let index = (y as usize) * self.width as usize + x as usize;
        self.coverage[index] = self.coverage[index].max(value);
    }

    pub fn is_blank(&self) -> bool {
        self.coverage.iter().all(|&c| c == 0)
    }

    /// Quarter turn counter-clockwise, so horizontal text reads bottom to top.
    pub fn rotate_90(&self) -> Self {
        let mut rotated = GlyphMask::new(self.height, self.width);
        for y in 0..rotated.height {
            for x in 0..rotated.width {
                let value = self.get(self.width - 1 - y, x);
                rotated.coverage[(y * rotated.width + x) as usize] = value;
            }
        }
        rotated
    }
}

pub trait GlyphSource: Send + Sync {
    fn name(&self) -> &str;

    /// Coverage mask for `text` set `size` pixels tall.
    fn rasterize(&self, text: &str, size: f32) -> GlyphMask;
}

/// 8x8 public-domain bitmap glyphs, scaled nearest-neighbour.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFont;

impl BitmapFont {
    fn rows(c: char) -> [u8; 8] {
        BASIC_FONTS
            .get(c)
            .or_else(|| LATIN_FONTS.get(c))
            .or_else(|| GREEK_FONTS.get(c))
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8])
    }
}

impl GlyphSource for BitmapFont {
    fn name(&self) -> &str {
        "bitmap-8x8"
    }

    fn rasterize(&self, text: &str, size: f32) -> GlyphMask {
        let glyphs: Vec<[u8; 8]> = text.chars().map(Self::rows).collect();
        let scale = (size / BITMAP_CELL as f32).max(1.0 / BITMAP_CELL as f32);
        let cell = (BITMAP_CELL as f32 * scale).round().max(1.0) as u32;
        let mut mask = GlyphMask::new(cell * glyphs.len() as u32, cell);

        for (index, rows) in glyphs.iter().enumerate() {
            let origin = index as u32 * cell;
            for y in 0..cell {
                let row = rows[((y * BITMAP_CELL) / cell).min(BITMAP_CELL - 1) as usize];
                for x in 0..cell {
                    let bit = ((x * BITMAP_CELL) / cell).min(BITMAP_CELL - 1);
                    if row & (1 << bit) != 0 {
                        mask.cover(i64::from(origin + x), i64::from(y), 255);
                    }
                }
            }
        }
        mask
    }
}

/// TrueType / OpenType font read from disk.
pub struct OutlineFont {
    name: String,
    font: FontVec,
}

impl OutlineFont {
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let font_error = |reason: String| RenderError::FontLoad {
            path: path.display().to_string(),
            reason,
        };
        let bytes = std::fs::read(path).map_err(|e| font_error(e.to_string()))?;
        let font = FontVec::try_from_vec(bytes).map_err(|e| font_error(e.to_string()))?;

        info!("Loaded outline font from {}", path.display());
        Ok(Self {
            name: path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "outline".to_string()),
            font,
        })
    }
}

impl GlyphSource for OutlineFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn rasterize(&self, text: &str, size: f32) -> GlyphMask {
        let scale = PxScale::from(size.max(1.0));
        let scaled = self.font.as_scaled(scale);
        let ascent = scaled.ascent();

        let mut caret = 0.0f32;
        let mut previous: Option<GlyphId> = None;
        let mut glyphs = Vec::with_capacity(text.len());
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(caret, ascent)));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }

        let width = caret.ceil().max(1.0) as u32;
        let height = (ascent - scaled.descent()).ceil().max(1.0) as u32;
        let mut mask = GlyphMask::new(width, height);

        for glyph in glyphs {
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|x, y, coverage| {
                    let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                    mask.cover(
                        bounds.min.x as i64 + i64::from(x),
                        bounds.min.y as i64 + i64::from(y),
                        value,
                    );
                });
            }
        }
        mask
    }
}

/// Outline font when a path is configured, the bitmap font otherwise.
pub fn load_glyph_source(font_path: Option<&Path>) -> Result<Box<dyn GlyphSource>, RenderError> {
    match font_path {
        Some(path) => Ok(Box::new(OutlineFont::from_path(path)?)),
        None => Ok(Box::new(BitmapFont)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_dimensions_scale_with_size() {
        let font = BitmapFont;
        let small = font.rasterize("cat", 8.0);
        assert_eq!((small.width(), small.height()), (24, 8));

        let large = font.rasterize("cat", 32.0);
        assert_eq!((large.width(), large.height()), (96, 32));
        assert!(!large.is_blank());
    }

    #[test]
    fn test_bitmap_unknown_char_falls_back() {
        let mask = BitmapFont.rasterize("\u{4e2d}", 16.0);
        assert_eq!(mask.width(), 16);
        assert!(!mask.is_blank());
    }

    #[test]
    fn test_rotate_swaps_dimensions() {
        let mut mask = GlyphMask::new(3, 2);
        mask.cover(2, 0, 200);
        let rotated = mask.rotate_90();
        assert_eq!((rotated.width(), rotated.height()), (2, 3));
        assert_eq!(rotated.get(0, 0), 200);
        assert_eq!(rotated.get(1, 2), 0);
    }

    #[test]
    fn test_cover_ignores_out_of_bounds() {
        let mut mask = GlyphMask::new(2, 2);
        mask.cover(-1, 0, 255);
        mask.cover(0, 5, 255);
        assert!(mask.is_blank());
    }

    #[test]
    fn test_missing_font_file() {
        let result = OutlineFont::from_path(Path::new("/nonexistent/font.ttf"));
        assert!(matches!(result, Err(RenderError::FontLoad { .. })));
    }

    #[test]
    fn test_default_glyph_source_is_bitmap() {
        let source = load_glyph_source(None).unwrap();
        assert_eq!(source.name(), "bitmap-8x8");
    }
}
