//! Text measurement and glyph rasterization for the synthesizer.
//!
//! Rasterization goes through cosmic-text's swash cache, with rasterized
//! coverage masks held in an LRU keyed by grapheme. Measurement uses the
//! monospace cell model: advance is the grapheme's terminal column width
//! times the cell width measured from `"M"`.

use std::num::NonZeroUsize;

use compact_str::{CompactString, ToCompactString};
use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, SwashContent};
use lru::LruCache;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::{
    error::Error,
    frame::{FrameBuffer, Rgba},
};

const GLYPH_CACHE_CAP: NonZeroUsize = NonZeroUsize::new(512).unwrap();

/// Text backend the synthesizer draws through.
///
/// The production implementation is [`CosmicRaster`]; [`BlockRaster`] is a
/// font-free fallback with identical metrics behavior, also used by tests.
pub trait TextRaster {
    /// Height of one text line in pixels.
    fn line_height(&self) -> f32;

    /// Measured width of `text` in pixels.
    fn measure(&self, text: &str) -> f32;

    /// Draws `text` with its top-left corner at raster coordinates `(x, y)`.
    fn draw_text(&mut self, frame: &mut FrameBuffer, x: f32, y: f32, text: &str, color: Rgba);
}

/// A rasterized glyph coverage mask with its placement offsets.
#[derive(Debug, Clone)]
struct GlyphBitmap {
    left: i32,
    /// Distance from the baseline up to the bitmap's top edge.
    top: i32,
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

/// cosmic-text backed rasterizer using the system monospace family.
pub struct CosmicRaster {
    font_system: FontSystem,
    swash: SwashCache,
    glyphs: LruCache<CompactString, Option<GlyphBitmap>>,
    font_size: f32,
    line_height: f32,
    cell_width: f32,
    ascent: f32,
}

impl CosmicRaster {
    /// Creates a rasterizer for the given font size and line-height factor.
    ///
    /// Cell width and baseline are measured by shaping `"M"` in the system
    /// monospace family.
    ///
    /// # Errors
    /// Returns [`Error::Font`] when the font database contains no faces at
    /// all, in which case nothing could ever be rasterized.
    pub fn new(font_size: f32, line_height_factor: f32) -> Result<Self, Error> {
        let mut font_system = FontSystem::new();
        if font_system.db().faces().next().is_none() {
            return Err(Error::no_fonts_available());
        }

        let line_height = font_size * line_height_factor;
        let (cell_width, ascent) = measure_cell(&mut font_system, font_size, line_height);

        Ok(Self {
            font_system,
            swash: SwashCache::new(),
            glyphs: LruCache::new(GLYPH_CACHE_CAP),
            font_size,
            line_height,
            cell_width,
            ascent,
        })
    }

    fn rasterize(&mut self, grapheme: &str) -> Option<GlyphBitmap> {
        if let Some(cached) = self.glyphs.get(grapheme) {
            return cached.clone();
        }

        let bitmap = rasterize_grapheme(
            &mut self.font_system,
            &mut self.swash,
            grapheme,
            self.font_size,
            self.line_height,
        );
        self.glyphs
            .put(grapheme.to_compact_string(), bitmap.clone());
        bitmap
    }
}

impl TextRaster for CosmicRaster {
    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn measure(&self, text: &str) -> f32 {
        self.cell_width * text.width() as f32
    }

    fn draw_text(&mut self, frame: &mut FrameBuffer, x: f32, y: f32, text: &str, color: Rgba) {
        let mut pen_x = x;
        let ascent = self.ascent;
        let cell_width = self.cell_width;

        for grapheme in text.graphemes(true) {
            let advance = cell_width * grapheme.width().max(1) as f32;
            if !grapheme.trim().is_empty()
                && let Some(glyph) = self.rasterize(grapheme)
            {
                let gx = (pen_x + glyph.left as f32).round() as i32;
                let gy = (y + ascent - glyph.top as f32).round() as i32;
                frame.blend_mask(gx, gy, &glyph.coverage, glyph.width, glyph.height, color);
            }
            pen_x += advance;
        }
    }
}

/// Measures the monospace cell width and baseline by shaping `"M"`.
fn measure_cell(font_system: &mut FontSystem, font_size: f32, line_height: f32) -> (f32, f32) {
    let metrics = Metrics::new(font_size, line_height);
    let mut buffer = Buffer::new(font_system, metrics);
    buffer.set_size(font_system, Some(f32::MAX), Some(f32::MAX));
    buffer.set_text(
        font_system,
        "M",
        Attrs::new().family(Family::Monospace),
        Shaping::Advanced,
    );
    buffer.shape_until_scroll(font_system, false);

    let mut cell_width = font_size * 0.6;
    let mut ascent = font_size * 0.8;
    for run in buffer.layout_runs() {
        if let Some(glyph) = run.glyphs.first() {
            cell_width = glyph.w;
        }
        // line_y is the baseline offset from the top of the line box
        ascent = run.line_y;
    }
    (cell_width, ascent)
}

fn rasterize_grapheme(
    font_system: &mut FontSystem,
    swash: &mut SwashCache,
    grapheme: &str,
    font_size: f32,
    line_height: f32,
) -> Option<GlyphBitmap> {
    let metrics = Metrics::new(font_size, line_height);
    let mut buffer = Buffer::new(font_system, metrics);
    buffer.set_size(font_system, Some(f32::MAX), Some(f32::MAX));
    buffer.set_text(
        font_system,
        grapheme,
        Attrs::new().family(Family::Monospace),
        Shaping::Advanced,
    );
    buffer.shape_until_scroll(font_system, false);

    let physical = buffer
        .layout_runs()
        .next()
        .and_then(|run| run.glyphs.first().map(|g| g.physical((0.0, 0.0), 1.0)))?;

    let image = swash.get_image_uncached(font_system, physical.cache_key)?;
    if image.placement.width == 0 || image.placement.height == 0 {
        return None;
    }

    let coverage = match image.content {
        SwashContent::Mask => image.data,
        // color/subpixel content degrades to its alpha coverage
        SwashContent::Color | SwashContent::SubpixelMask => image
            .data
            .chunks_exact(4)
            .map(|px| px[3])
            .collect(),
    };

    Some(GlyphBitmap {
        left: image.placement.left,
        top: image.placement.top,
        width: image.placement.width,
        height: image.placement.height,
        coverage,
    })
}

/// Deterministic, font-free backend: every non-whitespace grapheme renders as
/// a filled cell block.
///
/// Used as the last-resort fallback when no fonts are installed, and by
/// synthesizer tests, which need exact metrics without a font database.
#[derive(Debug, Clone, Copy)]
pub struct BlockRaster {
    font_size: f32,
    line_height: f32,
    cell_width: f32,
}

impl BlockRaster {
    pub fn new(font_size: f32, line_height_factor: f32) -> Self {
        Self {
            font_size,
            line_height: font_size * line_height_factor,
            cell_width: font_size * 0.6,
        }
    }
}

impl TextRaster for BlockRaster {
    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn measure(&self, text: &str) -> f32 {
        self.cell_width * text.width() as f32
    }

    fn draw_text(&mut self, frame: &mut FrameBuffer, x: f32, y: f32, text: &str, color: Rgba) {
        let mut pen_x = x;
        for grapheme in text.graphemes(true) {
            let advance = self.cell_width * grapheme.width().max(1) as f32;
            if !grapheme.trim().is_empty() {
                frame.fill_rect(
                    (pen_x + 1.0).round() as i32,
                    (y + 1.0).round() as i32,
                    (advance - 2.0).max(1.0) as u32,
                    (self.font_size - 2.0).max(1.0) as u32,
                    color,
                );
            }
            pen_x += advance;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_raster_measures_by_column_width() {
        let raster = BlockRaster::new(16.0, 1.2);
        assert_eq!(raster.measure(""), 0.0);
        assert_eq!(raster.measure("abc"), 3.0 * 16.0 * 0.6);
        // fullwidth characters take two columns
        assert_eq!(raster.measure("あ"), 2.0 * 16.0 * 0.6);
    }

    #[test]
    fn block_raster_draws_only_non_whitespace() {
        let mut raster = BlockRaster::new(10.0, 1.2);
        let mut frame = FrameBuffer::new(40, 12);
        raster.draw_text(&mut frame, 0.0, 0.0, " x", [255; 4]);

        // first cell stays background, second carries the block
        assert_eq!(frame.pixel(2, 2), [0, 0, 0, 0]);
        assert_eq!(frame.pixel(8, 2), [255; 4]);
    }
}
