//! Character glyph resources.
//!
//! A [`GlyphFactory`] turns a character into a glyph [`ResourceRef`] whose
//! baseline sits at `y = 0`. Factories also report the nominal ascent and
//! descent of their glyph set, which lines use to keep a stable height.
//!
//! # Overview
//!
//! - [`FontGlyphFactory`] - Glyphs shaped and rasterized from a font
//! - [`PixmapGlyphFactory`] - Glyphs taken from images, one per character

mod font;
mod pixmap;

use std::{fmt, rc::Rc};

use clockface_core::resource::ResourceRef;

pub use font::FontGlyphFactory;
pub use pixmap::PixmapGlyphFactory;

/// Produces glyph resources for characters.
pub trait GlyphFactory: fmt::Debug {
    /// Returns the glyph for `ch`, or `None` when the glyph set lacks it.
    fn glyph(&self, ch: char) -> Option<ResourceRef>;

    /// Distance from the baseline to the top of a line
    fn ascent(&self) -> f32;

    /// Distance from the baseline to the bottom of a line
    fn descent(&self) -> f32;

    /// Glyph shown in place of the separator while it blinks off.
    ///
    /// Factories without a dedicated glyph return `None`; the separator is
    /// then hidden but keeps its geometry.
    fn blank_separator(&self) -> Option<ResourceRef> {
        None
    }

    fn line_height(&self) -> f32 {
        self.ascent() + self.descent()
    }
}

/// Shared handle to a glyph factory.
pub type GlyphFactoryRef = Rc<dyn GlyphFactory>;
