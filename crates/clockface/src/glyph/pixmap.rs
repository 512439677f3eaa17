//! Image-backed glyphs.

use std::{collections::HashMap, fs, path::Path, rc::Rc};

use log::{debug, info};

use clockface_core::{
    draw::Pixmap,
    geometry::Rect,
    resource::{PixmapResource, ResourceRef},
};
use clockface_format::SEPARATOR;

use super::GlyphFactory;
use crate::{ClockError, config};

const SEPARATOR_STEM: &str = "s1";
const BLANK_SEPARATOR_STEM: &str = "s2";

/// Glyphs drawn from one image per character.
///
/// Each image sits on the baseline: its bottom edge is at `y = 0` and its
/// advances are its width and height. The ascent is the tallest image and the
/// descent is zero.
#[derive(Debug, Default)]
pub struct PixmapGlyphFactory {
    glyphs: HashMap<char, ResourceRef>,
    blank_separator: Option<ResourceRef>,
    ascent: f32,
}

impl PixmapGlyphFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the image shown for `ch` (builder style).
    pub fn with_glyph(mut self, ch: char, pixmap: Pixmap) -> Self {
        self.insert(ch, pixmap);
        self
    }

    /// Adds the image shown while the separator blinks off (builder style).
    pub fn with_blank_separator(mut self, pixmap: Pixmap) -> Self {
        self.blank_separator = Some(self.resource(pixmap));
        self
    }

    pub fn insert(&mut self, ch: char, pixmap: Pixmap) {
        let resource = self.resource(pixmap);
        self.glyphs.insert(ch, resource);
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Loads every `*.png` of `directory`.
    ///
    /// A file whose stem is a single character provides that character.
    /// `s1.png` provides the separator and `s2.png` the blank separator.
    /// Other files are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Io`] when the directory cannot be read and
    /// [`ClockError::Image`] when an image cannot be decoded.
    pub fn load_dir(directory: &Path) -> Result<Self, ClockError> {
        info!(directory:? = directory; "Loading glyph images");
        let mut factory = Self::new();

        for entry in fs::read_dir(directory)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("png") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let mut chars = stem.chars();
            match (stem, chars.next(), chars.next()) {
                (SEPARATOR_STEM, ..) => factory.insert(SEPARATOR, config::load_png(&path)?),
                (BLANK_SEPARATOR_STEM, ..) => {
                    factory = factory.with_blank_separator(config::load_png(&path)?);
                }
                (_, Some(ch), None) => factory.insert(ch, config::load_png(&path)?),
                _ => debug!(path:? = path; "Skipping unrecognized glyph image"),
            }
        }

        info!(glyphs = factory.len(); "Glyph images loaded");
        Ok(factory)
    }

    fn resource(&mut self, pixmap: Pixmap) -> ResourceRef {
        let width = pixmap.width() as f32;
        let height = pixmap.height() as f32;
        self.ascent = self.ascent.max(height);
        Rc::new(PixmapResource::new(
            Rc::new(pixmap),
            Rect::new(0.0, -height, width, height),
            width,
            height,
        ))
    }
}

impl GlyphFactory for PixmapGlyphFactory {
    fn glyph(&self, ch: char) -> Option<ResourceRef> {
        self.glyphs.get(&ch).cloned()
    }

    fn ascent(&self) -> f32 {
        self.ascent
    }

    fn descent(&self) -> f32 {
        0.0
    }

    fn blank_separator(&self) -> Option<ResourceRef> {
        self.blank_separator.clone()
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn pixmap(width: u32, height: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(width, height).unwrap();
        pixmap.fill(tiny_skia::Color::BLACK);
        pixmap
    }

    #[test]
    fn test_glyph_sits_on_baseline() {
        let factory = PixmapGlyphFactory::new().with_glyph('1', pixmap(4, 10));
        let glyph = factory.glyph('1').unwrap();

        assert_eq!(glyph.rect(), Rect::new(0.0, -10.0, 4.0, 10.0));
        assert_approx_eq!(f32, glyph.advance_x(), 4.0);
        assert_approx_eq!(f32, factory.ascent(), 10.0);
        assert_approx_eq!(f32, factory.line_height(), 10.0);
    }

    #[test]
    fn test_missing_glyph() {
        let factory = PixmapGlyphFactory::new().with_glyph('1', pixmap(4, 10));
        assert!(factory.glyph('2').is_none());
        assert!(factory.blank_separator().is_none());
    }

    #[test]
    fn test_ascent_is_tallest_image() {
        let factory = PixmapGlyphFactory::new()
            .with_glyph('1', pixmap(4, 10))
            .with_glyph(':', pixmap(2, 6))
            .with_blank_separator(pixmap(2, 12));
        assert_approx_eq!(f32, factory.ascent(), 12.0);
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        pixmap(3, 5).save_png(dir.path().join("7.png")).unwrap();
        pixmap(1, 5).save_png(dir.path().join("s1.png")).unwrap();
        pixmap(1, 5).save_png(dir.path().join("s2.png")).unwrap();
        pixmap(1, 5).save_png(dir.path().join("ignored.png")).unwrap();
        fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

        let factory = PixmapGlyphFactory::load_dir(dir.path()).unwrap();

        assert_eq!(factory.len(), 2);
        assert!(factory.glyph('7').is_some());
        assert!(factory.glyph(SEPARATOR).is_some());
        assert!(factory.blank_separator().is_some());
    }

    #[test]
    fn test_load_dir_rejects_bad_image() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1.png"), "not an image").unwrap();

        let result = PixmapGlyphFactory::load_dir(dir.path());
        assert!(matches!(result, Err(ClockError::Image(_))));
    }
}
