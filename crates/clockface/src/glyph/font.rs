//! Font-backed glyphs.
//!
//! Glyphs are shaped and rasterized with `cosmic-text` once per character
//! and kept for the lifetime of the factory. The shared font database is
//! loaded on first use.

use std::{
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
    sync::{Mutex, OnceLock, PoisonError},
};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache};
use log::{debug, info, trace, warn};

use clockface_core::{
    color::Color,
    draw::Pixmap,
    geometry::Rect,
    resource::{BlankResource, PixmapResource, ResourceRef},
};

use super::GlyphFactory;
use crate::{ClockError, config::FontConfig};

/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Share of the line above the baseline when the font reports no metrics.
const FALLBACK_ASCENT_FACTOR: f32 = 0.8;

struct FontContext {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl FontContext {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    }
}

static FONT_CONTEXT: OnceLock<Mutex<FontContext>> = OnceLock::new();

/// A glyph as shaped and rasterized, in device pixels.
struct RasterGlyph {
    pixmap: Option<Pixmap>,
    /// Ink bounds relative to the origin and baseline
    ink: Rect,
    advance: f32,
}

/// Glyphs rendered from a font family.
///
/// Glyphs are rasterized at `device_pixel_ratio` times the font size and
/// shown at the font size, so they stay sharp on high-density outputs.
#[derive(Debug)]
pub struct FontGlyphFactory {
    family: String,
    size: f32,
    color: Color,
    oversample: f32,
    ascent: f32,
    descent: f32,
    glyphs: RefCell<HashMap<char, Option<ResourceRef>>>,
}

impl FontGlyphFactory {
    /// Creates a factory for the configured font.
    ///
    /// # Arguments
    ///
    /// * `config` - Font family, size and color
    /// * `device_pixel_ratio` - Oversampling applied when rasterizing
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Font`] for a non-positive size and
    /// [`ClockError::Config`] for an invalid color.
    pub fn new(config: &FontConfig, device_pixel_ratio: f32) -> Result<Self, ClockError> {
        let size = config.size();
        if !(size.is_finite() && size > 0.0) {
            return Err(ClockError::Font(format!("Invalid font size {size}")));
        }
        let oversample = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };

        let mut factory = Self {
            family: config.family().to_string(),
            size,
            color: config.color()?,
            oversample,
            ascent: size * FALLBACK_ASCENT_FACTOR,
            descent: size * (LINE_HEIGHT_FACTOR - FALLBACK_ASCENT_FACTOR),
            glyphs: RefCell::new(HashMap::new()),
        };
        if let Some(ascent) = factory.measure_ascent() {
            factory.ascent = ascent;
            factory.descent = size * LINE_HEIGHT_FACTOR - ascent;
        }
        debug!(
            family = factory.family.as_str(),
            ascent = factory.ascent,
            descent = factory.descent;
            "Font glyph factory created"
        );
        Ok(factory)
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    fn family_attr(&self) -> Family<'_> {
        match self.family.as_str() {
            "sans-serif" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            "cursive" => Family::Cursive,
            "fantasy" => Family::Fantasy,
            name => Family::Name(name),
        }
    }

    fn metrics(&self) -> Metrics {
        let font_size = self.size * self.oversample;
        Metrics::new(font_size, font_size * LINE_HEIGHT_FACTOR)
    }

    /// Ascent of the font's first line, in logical units.
    fn measure_ascent(&self) -> Option<f32> {
        let mut context = lock_context();
        let font_system = &mut context.font_system;

        let mut buffer = Buffer::new(font_system, self.metrics());
        let mut buffer = buffer.borrow_with(font_system);
        let attrs = Attrs::new().family(self.family_attr());
        buffer.set_size(None, None);
        buffer.set_text("0", &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let ascent = buffer
            .layout_runs()
            .next()
            .map(|run| (run.line_y - run.line_top) / self.oversample);
        ascent.filter(|ascent| ascent.is_finite() && *ascent > 0.0)
    }

    fn rasterize(&self, ch: char) -> Option<RasterGlyph> {
        let mut context = lock_context();
        let FontContext {
            font_system,
            swash_cache,
        } = &mut *context;

        let mut text = [0; 4];
        let text = ch.encode_utf8(&mut text);

        let mut buffer = Buffer::new(font_system, self.metrics());
        let mut buffer = buffer.borrow_with(font_system);
        let attrs = Attrs::new().family(self.family_attr());
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let (advance, baseline) = {
            let run = buffer.layout_runs().next()?;
            if run.glyphs.is_empty() || run.glyphs.iter().any(|glyph| glyph.glyph_id == 0) {
                return None;
            }
            let advance = run
                .glyphs
                .last()
                .map_or(0.0, |glyph| glyph.x + glyph.w);
            (advance, run.line_y)
        };

        let [r, g, b, a] = self.color.to_rgba().map(|c| (c * 255.0).round() as u8);
        let mut spans = Vec::new();
        buffer.draw(
            swash_cache,
            cosmic_text::Color::rgba(r, g, b, a),
            |x, y, w, h, color| {
                if color.a() > 0 {
                    spans.push((x, y, w, h, color));
                }
            },
        );

        let Some((left, top, right, bottom)) = ink_bounds(&spans) else {
            return Some(RasterGlyph {
                pixmap: None,
                ink: Rect::default(),
                advance,
            });
        };

        let width = (right - left) as u32;
        let height = (bottom - top) as u32;
        let Some(mut pixmap) = Pixmap::new(width, height) else {
            warn!(ch:?, width, height; "Failed to allocate glyph bitmap");
            return None;
        };

        let stride = width as usize;
        let pixels = pixmap.pixels_mut();
        for (x, y, w, h, color) in spans {
            let pixel = tiny_skia::ColorU8::from_rgba(color.r(), color.g(), color.b(), color.a())
                .premultiply();
            for row in (y - top)..(y - top + h as i32) {
                for col in (x - left)..(x - left + w as i32) {
                    pixels[row as usize * stride + col as usize] = pixel;
                }
            }
        }

        Some(RasterGlyph {
            pixmap: Some(pixmap),
            ink: Rect::from_ltrb(
                left as f32,
                top as f32 - baseline,
                right as f32,
                bottom as f32 - baseline,
            ),
            advance,
        })
    }

    fn build_glyph(&self, ch: char) -> Option<ResourceRef> {
        let Some(raster) = self.rasterize(ch) else {
            debug!(ch:?, family = self.family.as_str(); "Font has no glyph");
            return None;
        };

        let scale = 1.0 / self.oversample;
        let advance_x = raster.advance * scale;
        let advance_y = self.line_height();
        let resource: ResourceRef = match raster.pixmap {
            Some(pixmap) => Rc::new(PixmapResource::new(
                Rc::new(pixmap),
                raster.ink.scale(scale),
                advance_x,
                advance_y,
            )),
            None => Rc::new(BlankResource::new(
                Rect::new(0.0, -self.ascent, advance_x, self.line_height()),
                advance_x,
                advance_y,
            )),
        };
        trace!(ch:?, rect:? = resource.rect(); "Glyph rasterized");
        Some(resource)
    }
}

impl GlyphFactory for FontGlyphFactory {
    fn glyph(&self, ch: char) -> Option<ResourceRef> {
        if let Some(glyph) = self.glyphs.borrow().get(&ch) {
            return glyph.clone();
        }
        let glyph = self.build_glyph(ch);
        self.glyphs.borrow_mut().insert(ch, glyph.clone());
        glyph
    }

    fn ascent(&self) -> f32 {
        self.ascent
    }

    fn descent(&self) -> f32 {
        self.descent
    }
}

fn lock_context() -> std::sync::MutexGuard<'static, FontContext> {
    FONT_CONTEXT
        .get_or_init(|| Mutex::new(FontContext::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Smallest box covering every span, as `(left, top, right, bottom)`.
fn ink_bounds(spans: &[(i32, i32, u32, u32, cosmic_text::Color)]) -> Option<(i32, i32, i32, i32)> {
    spans
        .iter()
        .filter(|(_, _, w, h, _)| *w > 0 && *h > 0)
        .map(|&(x, y, w, h, _)| (x, y, x + w as i32, y + h as i32))
        .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_size() {
        let config = FontConfig::new("sans-serif", 0.0, "black");
        assert!(matches!(
            FontGlyphFactory::new(&config, 1.0),
            Err(ClockError::Font(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_color() {
        let config = FontConfig::new("sans-serif", 12.0, "no-such-color");
        assert!(matches!(
            FontGlyphFactory::new(&config, 1.0),
            Err(ClockError::Config(_))
        ));
    }

    #[test]
    fn test_line_height_follows_font_size() {
        let config = FontConfig::new("sans-serif", 20.0, "black");
        let factory = FontGlyphFactory::new(&config, 2.0).unwrap();
        float_cmp::assert_approx_eq!(f32, factory.line_height(), 24.0, epsilon = 0.001);
        assert!(factory.ascent() > 0.0);
    }

    #[test]
    fn test_glyph_lookup_is_memoized() {
        let config = FontConfig::new("sans-serif", 12.0, "black");
        let factory = FontGlyphFactory::new(&config, 1.0).unwrap();
        let first = factory.glyph('1');
        let second = factory.glyph('1');
        match (first, second) {
            (Some(a), Some(b)) => assert!(Rc::ptr_eq(&a, &b)),
            (None, None) => {}
            _ => panic!("memoized lookup changed its answer"),
        }
    }

    #[test]
    fn test_ink_bounds() {
        let color = cosmic_text::Color::rgba(0, 0, 0, 255);
        let spans = [(1, -3, 2, 2, color), (4, 0, 1, 1, color), (9, 9, 0, 0, color)];
        assert_eq!(ink_bounds(&spans), Some((1, -3, 5, 1)));
        assert_eq!(ink_bounds(&[]), None);
    }
}
