//! Word cloud rasterization.
//!
//! ```ignore
//! let cloud = WordCloud::default();
//! let png = cloud.render_png(&frequencies, &RenderConfig::text_default())?;
//! ```

pub mod glyphs;
pub mod layout;
pub mod palette;

pub use glyphs::{load_glyph_source, BitmapFont, GlyphMask, GlyphSource, OutlineFont};
pub use layout::{layout_words, OccupancyMap, Orientation, PlacedWord};
pub use palette::{parse_color, Colormap};

use cloudword_core::{CoreError, RenderConfig, RenderError, TermFrequency};
use fastrand::Rng;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Largest accepted canvas edge.
pub const MAX_CANVAS_EDGE: u32 = 8192;

#[derive(Clone)]
pub struct WordCloud {
    glyphs: Arc<dyn GlyphSource>,
}

impl Default for WordCloud {
    fn default() -> Self {
        Self::new(Arc::new(BitmapFont))
    }
}

impl std::fmt::Debug for WordCloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordCloud")
            .field("glyphs", &self.glyphs.name())
            .finish()
    }
}

impl WordCloud {
    pub fn new(glyphs: Arc<dyn GlyphSource>) -> Self {
        Self { glyphs }
    }

    pub fn from_font_path(font_path: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Self::new(Arc::from(load_glyph_source(font_path)?)))
    }

    pub fn glyph_source(&self) -> &dyn GlyphSource {
        self.glyphs.as_ref()
    }

    /// Reject configurations that cannot render before doing any work.
    pub fn validate(config: &RenderConfig) -> Result<(Colormap, Rgb<u8>), RenderError> {
        if config.width == 0
            || config.height == 0
            || config.width > MAX_CANVAS_EDGE
            || config.height > MAX_CANVAS_EDGE
        {
            return Err(RenderError::InvalidCanvas {
                width: config.width,
                height: config.height,
            });
        }
        let colormap = Colormap::from_name(&config.colormap)?;
        let background = parse_color(&config.background)?;
        Ok((colormap, background))
    }

    pub fn render(
        &self,
        frequencies: &TermFrequency,
        config: &RenderConfig,
    ) -> Result<RenderedCloud, RenderError> {
        let (colormap, background) = Self::validate(config)?;
        if frequencies.is_empty() || config.max_words == 0 {
            return Err(RenderError::NoWords);
        }

        let mut rng = config
            .random_seed
            .map(Rng::with_seed)
            .unwrap_or_else(Rng::new);
        let words = frequencies.top_n(config.max_words);
        let placed = layout_words(&words, config, self.glyphs.as_ref(), &mut rng);

        let mut image = RgbImage::from_pixel(config.width, config.height, background);
        for word in &placed {
            let color = colormap.sample(rng.f32());
            draw_mask(&mut image, word, color);
        }

        info!(
            "Rendered {}x{} cloud with {} of {} words",
            config.width,
            config.height,
            placed.len(),
            words.len()
        );
        Ok(RenderedCloud {
            image,
            words: placed,
        })
    }

    pub fn render_png(
        &self,
        frequencies: &TermFrequency,
        config: &RenderConfig,
    ) -> Result<Vec<u8>, RenderError> {
        self.render(frequencies, config)?.encode_png()
    }
}

fn draw_mask(image: &mut RgbImage, word: &PlacedWord, color: Rgb<u8>) {
    for y in 0..word.mask.height() {
        for x in 0..word.mask.width() {
            let coverage = word.mask.get(x, y);
            let (px, py) = (word.x + x, word.y + y);
            if coverage == 0 || px >= image.width() || py >= image.height() {
                continue;
            }
            let alpha = f32::from(coverage) / 255.0;
            let pixel = image.get_pixel_mut(px, py);
            for channel in 0..3 {
                let blended = f32::from(pixel[channel]) * (1.0 - alpha)
                    + f32::from(color[channel]) * alpha;
                pixel[channel] = blended.round() as u8;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedCloud {
    pub image: RgbImage,
    pub words: Vec<PlacedWord>,
}

impl RenderedCloud {
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| RenderError::Encoding {
                reason: e.to_string(),
            })?;
        debug!("Encoded PNG of {} bytes", bytes.len());
        Ok(bytes)
    }

    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frequencies() -> TermFrequency {
        let mut frequencies = TermFrequency::new();
        for (term, count) in [
            ("volcano", 12),
            ("lava", 9),
            ("magma", 7),
            ("crater", 5),
            ("ash", 4),
            ("eruption", 3),
            ("basalt", 2),
            ("pumice", 1),
        ] {
            frequencies.add_count(term, count);
        }
        frequencies
    }

    #[test]
    fn test_png_has_configured_size() {
        let config = RenderConfig::default().with_size(320, 180).with_seed(42);
        let png = WordCloud::default()
            .render_png(&sample_frequencies(), &config)
            .unwrap();

        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 180));
    }

    #[test]
    fn test_at_most_max_words_distinct_words() {
        let config = RenderConfig::default()
            .with_size(400, 300)
            .with_max_words(4)
            .with_seed(9);
        let rendered = WordCloud::default()
            .render(&sample_frequencies(), &config)
            .unwrap();

        assert!(!rendered.words.is_empty());
        assert!(rendered.words.len() <= 4);
        let mut terms: Vec<&str> = rendered.words.iter().map(|w| w.term.as_str()).collect();
        terms.sort_unstable();
        terms.dedup();
        assert_eq!(terms.len(), rendered.words.len());
    }

    #[test]
    fn test_words_change_pixels_from_background() {
        let config = RenderConfig::default().with_background("black").with_seed(5);
        let rendered = WordCloud::default()
            .render(&sample_frequencies(), &config)
            .unwrap();
        assert!(rendered.image.pixels().any(|p| *p != Rgb([0, 0, 0])));
    }

    #[test]
    fn test_seeded_render_is_deterministic() {
        let config = RenderConfig::default().with_seed(11);
        let cloud = WordCloud::default();
        let first = cloud.render(&sample_frequencies(), &config).unwrap();
        let second = cloud.render(&sample_frequencies(), &config).unwrap();
        assert_eq!(first.image, second.image);
    }

    #[test]
    fn test_empty_frequencies_rejected() {
        let result = WordCloud::default().render(&TermFrequency::new(), &RenderConfig::default());
        assert!(matches!(result, Err(RenderError::NoWords)));
    }

    #[test]
    fn test_validation_errors() {
        let cloud = WordCloud::default();
        let frequencies = sample_frequencies();

        let bad_map = RenderConfig::default().with_colormap("sparkly");
        assert!(matches!(
            cloud.render(&frequencies, &bad_map),
            Err(RenderError::UnknownColormap { .. })
        ));

        let bad_bg = RenderConfig::default().with_background("#zzzzzz");
        assert!(matches!(
            cloud.render(&frequencies, &bad_bg),
            Err(RenderError::InvalidColor { .. })
        ));

        let bad_size = RenderConfig::default().with_size(0, 100);
        assert!(matches!(
            cloud.render(&frequencies, &bad_size),
            Err(RenderError::InvalidCanvas { .. })
        ));
    }

    #[test]
    fn test_save_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.png");
        let config = RenderConfig::default().with_seed(2);
        WordCloud::default()
            .render(&sample_frequencies(), &config)
            .unwrap()
            .save(&path)
            .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
