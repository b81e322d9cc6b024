//! Word placement.
//!
//! Occupied pixels live in a summed-area table so "is this box empty" is four
//! lookups. Each word is dropped at a uniformly random empty spot; when none
//! exists it is tried in the other orientation, then at a smaller size.

use cloudword_core::{RenderConfig, TermCount};
use fastrand::Rng;
use tracing::debug;

use crate::glyphs::{GlyphMask, GlyphSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    fn flipped(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlacedWord {
    pub term: String,
    pub count: u64,
    pub font_size: u32,
    pub x: u32,
    pub y: u32,
    pub orientation: Orientation,
    pub mask: GlyphMask,
}

/// Summed-area table over the canvas occupancy.
#[derive(Debug, Clone)]
pub struct OccupancyMap {
    width: u32,
    height: u32,
    occupied: Vec<bool>,
    sums: Vec<u32>,
}

impl OccupancyMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            occupied: vec![false; width as usize * height as usize],
            sums: vec![0; (width as usize + 1) * (height as usize + 1)],
        }
    }

    fn sum_index(&self, x: u32, y: u32) -> usize {
        y as usize * (self.width as usize + 1) + x as usize
    }

    /// Occupied pixels in the box `[x, x + w) x [y, y + h)`.
    pub fn occupied_in(&self, x: u32, y: u32, w: u32, h: u32) -> u32 {
        let (x1, y1) = (x + w, y + h);
        let total = self.sums[self.sum_index(x1, y1)] + self.sums[self.sum_index(x, y)];
        total - self.sums[self.sum_index(x1, y)] - self.sums[self.sum_index(x, y1)]
    }

    /// A random top-left corner where a `w` x `h` box is entirely free.
    pub fn find_position(&self, w: u32, h: u32, rng: &mut Rng) -> Option<(u32, u32)> {
        if w == 0 || h == 0 || w > self.width || h > self.height {
            return None;
        }
        let (max_x, max_y) = (self.width - w, self.height - h);

        // Reservoir sampling: one scan, every free corner equally likely.
        let mut chosen = None;
        let mut candidates = 0usize;
        for y in 0..=max_y {
            for x in 0..=max_x {
                if self.occupied_in(x, y, w, h) == 0 {
                    candidates += 1;
                    if rng.usize(..candidates) == 0 {
                        chosen = Some((x, y));
                    }
                }
            }
        }
        chosen
    }

    /// Mark every covered pixel of `mask` drawn at `(left, top)`.
    pub fn occupy(&mut self, mask: &GlyphMask, left: u32, top: u32) {
        let mut touched = false;
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                let (cx, cy) = (left + x, top + y);
                if mask.get(x, y) > 0 && cx < self.width && cy < self.height {
                    self.occupied[(cy * self.width + cx) as usize] = true;
                    touched = true;
                }
            }
        }
        if touched {
            self.rebuild_from(left, top);
        }
    }

    // Only rows and columns at or after the changed corner can move.
    fn rebuild_from(&mut self, left: u32, top: u32) {
        let stride = self.width as usize + 1;
        for y in top..self.height {
            let mut row_sum: u32 = (0..left)
                .map(|x| u32::from(self.occupied[(y * self.width + x) as usize]))
                .sum();
            for x in left..self.width {
                row_sum += u32::from(self.occupied[(y * self.width + x) as usize]);
                let above = self.sums[y as usize * stride + x as usize + 1];
                self.sums[(y as usize + 1) * stride + x as usize + 1] = above + row_sum;
            }
        }
    }
}

/// Place `words` (already ranked, heaviest first) on a canvas.
pub fn layout_words(
    words: &[TermCount],
    config: &RenderConfig,
    glyphs: &dyn GlyphSource,
    rng: &mut Rng,
) -> Vec<PlacedWord> {
    let Some(max_count) = words.iter().map(|w| w.count).max().filter(|&c| c > 0) else {
        return Vec::new();
    };

    let mut occupancy = OccupancyMap::new(config.width, config.height);
    let mut placed = Vec::new();
    let relative_scaling = config.relative_scaling.clamp(0.0, 1.0);
    let min_size = config.min_font_size.max(1);
    let margin = config.margin;

    let mut font_size = config
        .max_font_size
        .unwrap_or(config.height / 2)
        .max(min_size) as f32;
    let mut last_weight = 1.0f32;

    for word in words.iter().take(config.max_words) {
        let weight = word.count as f32 / max_count as f32;
        if relative_scaling > 0.0 {
            font_size *= relative_scaling * (weight / last_weight) + (1.0 - relative_scaling);
            font_size = font_size.round();
        }

        let mut orientation = if rng.f32() < config.prefer_horizontal {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let mut tried_other_orientation = false;

        let spot = loop {
            if font_size < min_size as f32 {
                break None;
            }
            let mut mask = rasterize(glyphs, &word.term, font_size, orientation);

            // Oversized words shrink straight to the canvas instead of stepping down.
            let fit = fit_ratio(&mask, margin, config.width, config.height);
            if fit < 1.0 {
                font_size = (font_size * fit).floor();
                if font_size < min_size as f32 {
                    break None;
                }
                mask = rasterize(glyphs, &word.term, font_size, orientation);
            }

            if let Some((x, y)) =
                occupancy.find_position(mask.width() + margin, mask.height() + margin, rng)
            {
                break Some((x + margin / 2, y + margin / 2, mask));
            }

            if !tried_other_orientation && config.prefer_horizontal < 1.0 {
                orientation = orientation.flipped();
                tried_other_orientation = true;
            } else {
                font_size -= (font_size / 10.0).floor().max(1.0);
                orientation = Orientation::Horizontal;
            }
        };

        let Some((x, y, mask)) = spot else {
            debug!("Canvas full at font size {}, stopping", font_size);
            break;
        };

        occupancy.occupy(&mask, x, y);
        debug!(
            "Placed '{}' at ({}, {}) size {} {:?}",
            word.term, x, y, font_size, orientation
        );
        placed.push(PlacedWord {
            term: word.term.clone(),
            count: word.count,
            font_size: font_size as u32,
            x,
            y,
            orientation,
            mask,
        });
        last_weight = weight;
    }

    placed
}

fn rasterize(
    glyphs: &dyn GlyphSource,
    term: &str,
    size: f32,
    orientation: Orientation,
) -> GlyphMask {
    let mask = glyphs.rasterize(term, size);
    match orientation {
        Orientation::Horizontal => mask,
        Orientation::Vertical => mask.rotate_90(),
    }
}

fn fit_ratio(mask: &GlyphMask, margin: u32, width: u32, height: u32) -> f32 {
    let ratio = |available: u32, needed: u32| {
        if needed > available {
            available.saturating_sub(margin) as f32 / needed.saturating_sub(margin).max(1) as f32
        } else {
            1.0
        }
    };
    ratio(width, mask.width() + margin).min(ratio(height, mask.height() + margin))
}
